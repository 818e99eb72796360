//! Plan execution
//!
//! Walks an [`ExecutionPlan`] in order, skipping up-to-date tasks and
//! running the recipes of stale ones. The first failing step aborts the rest
//! of the plan; tasks that already ran keep their effects.

use crate::config::Layout;
use crate::error::{ExecutionError, Result};
use crate::runner::{
    interpolate, interpolate_list, referenced_variables, remove_paths, Context,
    EnvironmentBinding, ExecutionPlan, PreparedCommand, RuleStore, Step, StepRunner, Task,
};
use std::collections::HashMap;

/// What happened to a planned task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The recipe ran to completion
    Ran,
    /// The task was current and skipped
    UpToDate,
    /// The recipe was only printed
    DryRun,
}

/// Per-task outcomes of one execution, in plan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub tasks: Vec<(String, Outcome)>,
}

impl ExecutionReport {
    /// Outcome of a task, if it was reached
    pub fn outcome(&self, id: &str) -> Option<Outcome> {
        self.tasks
            .iter()
            .find(|(task, _)| task == id)
            .map(|(_, outcome)| *outcome)
    }

    /// Identifiers of the tasks whose recipes ran
    pub fn ran(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::Ran)
            .map(|(task, _)| task.as_str())
            .collect()
    }
}

/// Runs execution plans against one rule store
pub struct Executor<'a> {
    store: &'a RuleStore,
    layout: &'a Layout,
    binding: EnvironmentBinding<'a>,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a RuleStore, layout: &'a Layout, binding: EnvironmentBinding<'a>) -> Self {
        Executor {
            store,
            layout,
            binding,
        }
    }

    /// Execute `plan`, binding `args` to the final step of the requested task
    pub fn execute(
        &mut self,
        plan: &ExecutionPlan,
        args: &[String],
        runner: &mut dyn StepRunner,
        ctx: &Context,
    ) -> Result<ExecutionReport> {
        let store = self.store;
        let mut report = ExecutionReport::default();

        for planned in plan.tasks() {
            let task = store.get(&planned.id)?;

            if !planned.staleness.is_stale() {
                ctx.print_up_to_date(&task.id);
                report.tasks.push((task.id.clone(), Outcome::UpToDate));
                continue;
            }

            ctx.print_task_start(&task.id);
            ctx.print_debug(&format!("'{}' runs because: {}", task.id, planned.staleness));

            // Prerequisites never see the invocation's arguments
            let task_args = if task.id == plan.requested() { args } else { &[] };
            self.run_recipe(task, task_args, runner, ctx)?;

            ctx.print_task_complete(&task.id);
            let outcome = if ctx.dry_run {
                Outcome::DryRun
            } else {
                Outcome::Ran
            };
            report.tasks.push((task.id.clone(), outcome));
        }

        Ok(report)
    }

    fn run_recipe(
        &mut self,
        task: &Task,
        args: &[String],
        runner: &mut dyn StepRunner,
        ctx: &Context,
    ) -> Result<()> {
        let last = task.recipe.len().saturating_sub(1);

        for (index, step) in task.recipe.iter().enumerate() {
            let step_args = if index == last { args } else { &[] };

            match step {
                Step::Message(text) => {
                    ctx.print_info(&interpolate(text, &ctx.vars)?);
                }

                Step::Remove(patterns) => {
                    let patterns = interpolate_list(patterns, &ctx.vars)?;
                    ctx.print_command(&format!("remove {}", patterns.join(" ")));
                    if ctx.dry_run {
                        continue;
                    }

                    let removed = remove_paths(&self.layout.root, &patterns).map_err(
                        |(path, e)| ExecutionError::Remove {
                            task: task.id.clone(),
                            path,
                            error: e.to_string(),
                        },
                    )?;
                    for path in removed {
                        ctx.print_debug(&format!("Removed {}", path.display()));
                    }
                }

                Step::Command {
                    exec,
                    print,
                    quiet,
                    dir,
                } => {
                    let command =
                        self.prepare(task, exec, print, *quiet, dir.as_deref(), step_args, ctx)?;
                    self.run_command(&command, runner, ctx)?;
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn prepare(
        &mut self,
        task: &Task,
        exec: &str,
        print: &str,
        quiet: bool,
        dir: Option<&str>,
        args: &[String],
        ctx: &Context,
    ) -> Result<PreparedCommand> {
        let vars = self.command_vars(&[exec, print, dir.unwrap_or_default()], ctx)?;

        let dir = match dir {
            Some(dir) => self.layout.resolve(interpolate(dir, &vars)?),
            None => ctx.working_dir.clone(),
        };

        Ok(PreparedCommand {
            task: task.id.clone(),
            exec: interpolate(exec, &vars)?,
            print: interpolate(print, &vars)?,
            quiet,
            dir,
            args: args.to_vec(),
            env: vars,
        })
    }

    /// Context variables plus the paths of every tool the texts refer to
    fn command_vars(&mut self, texts: &[&str], ctx: &Context) -> Result<HashMap<String, String>> {
        let mut vars = ctx.vars.clone();

        for name in texts.iter().flat_map(|text| referenced_variables(text)) {
            if vars.contains_key(&name) || !self.binding.provides(&name) {
                continue;
            }

            match self.binding.path(&name) {
                Ok(path) => {
                    let path = path.display().to_string();
                    vars.insert(name, path);
                }
                // Nothing runs in a dry run, so a missing environment is not fatal
                Err(e) if ctx.dry_run => ctx.print_debug(&e.to_string()),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(vars)
    }

    fn run_command(
        &mut self,
        command: &PreparedCommand,
        runner: &mut dyn StepRunner,
        ctx: &Context,
    ) -> Result<()> {
        if !command.quiet {
            if command.args.is_empty() {
                ctx.print_command(&command.print);
            } else {
                ctx.print_command(&format!("{} {}", command.print, display_args(&command.args)));
            }
        }

        if ctx.dry_run {
            return Ok(());
        }

        let code = runner.run(command, ctx).map_err(|e| ExecutionError::Spawn {
            task: command.task.clone(),
            program: ctx.interpreter.first().cloned().unwrap_or_default(),
            error: e.to_string(),
        })?;

        if code != Some(0) {
            ctx.print_error(&format!("'{}' failed: {}", command.task, command.print));
            return Err(ExecutionError::RecipeFailure {
                task: command.task.clone(),
                code,
            }
            .into());
        }

        Ok(())
    }
}

/// Arguments as a shell would need them typed, for echoing
fn display_args(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            let plain = !arg.is_empty()
                && !arg
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\' | '$' | '`'));
            if plain {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', "'\\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
