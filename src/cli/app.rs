//! Main CLI application

use crate::config::{load_config, validate_config, Config, ConfigSource, Layout, Mode};
use crate::error::{ConfigError, MkrunError};
use crate::runner::{
    capture, resolve, Context, EnvironmentBinding, Executor, IsolatedEnvironments, RuleStore,
    ShellRunner, Verbosity,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// CLI application
pub struct App {
    /// Parsed configuration
    config: Config,
    /// Where the configuration came from
    source: ConfigSource,
}

impl App {
    /// Load the task file named on the command line, or discover one
    pub fn load(file: Option<PathBuf>) -> Result<Self, MkrunError> {
        let (config, source) = load_config(file.as_deref())?;
        validate_config(&config)?;

        Ok(App { config, source })
    }

    /// Project root of this run
    pub fn root(&self) -> PathBuf {
        self.source.root()
    }

    /// Run the application with already parsed command line arguments
    pub fn run(self, matches: &ArgMatches) -> Result<(), MkrunError> {
        let root = self.root();
        load_dotenv(&root)?;

        let verbosity = get_verbosity(matches);
        let mode = Mode::select(
            matches.get_one::<String>("python").map(String::as_str),
            &self.config.settings,
        );
        let layout = Layout::new(root.clone(), &self.config.settings);
        let vars = self.vars(&layout, &mode);
        let mut store = RuleStore::from_config(&self.config, &mode, &vars)?;

        if matches.get_flag("list") {
            print_tasks(&self.config, &store, &mode, verbosity);
            return Ok(());
        }

        let tokens: Vec<String> = matches
            .get_many::<String>("invocation")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let invocation = capture(&mut store, tokens)?;
        let plan = resolve(&store, &invocation.task, &layout)?;

        let mut ctx = Context::new()
            .with_working_dir(root)
            .with_vars(vars)
            .with_verbosity(verbosity)
            .with_dry_run(matches.get_flag("dry-run"));

        // Set interpreter if specified in config
        if let Some(interpreter) = &self.config.interpreter {
            ctx = ctx.with_interpreter(interpreter.clone());
        }

        ctx.print_debug(&format!(
            "Mode {}, plan: {}",
            mode,
            plan.ids().join(" -> ")
        ));

        let environments =
            IsolatedEnvironments::new(layout.env_dir.clone(), self.config.settings.tools.clone());
        let binding = EnvironmentBinding::new(&environments, mode.version());
        let mut executor = Executor::new(&store, &layout, binding);
        executor.execute(&plan, &invocation.args, &mut ShellRunner, &ctx)?;

        Ok(())
    }

    /// Variables visible to every recipe of this run
    fn vars(&self, layout: &Layout, mode: &Mode) -> HashMap<String, String> {
        let mut vars = layout.vars();
        vars.insert("mode".to_string(), mode.name().to_string());
        if let Some(version) = mode.version() {
            vars.insert("version".to_string(), version.to_string());
        }
        if let Some(name) = &self.config.name {
            vars.insert("name".to_string(), name.clone());
        }
        vars
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("mkrun")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A small rule-based task runner for package lifecycles")
        .after_help("Words after TASK are passed unchanged to the task's recipe.")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to the mkrun.yml task file"),
        )
        .arg(
            Arg::new("python")
                .long("python")
                .value_name("VERSION")
                .help("Interpreter version to work with (overrides the environment)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List the tasks available in the selected mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print the commands that would run without running them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(clap_complete::Shell))
                .help("Print a shell completion script"),
        )
        .arg(
            Arg::new("invocation")
                .value_name("TASK")
                .help("Task to run, followed by arguments for its recipe")
                .num_args(1..)
                .trailing_var_arg(true),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Load `.env` from the project root without overriding the environment
fn load_dotenv(root: &std::path::Path) -> Result<(), MkrunError> {
    let path = root.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenvy::from_path(&path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to load {}: {}", path.display(), e))
    })?;
    Ok(())
}

/// Print the visible tasks of the selected mode
///
/// Task descriptions are only shown in verbose mode.
fn print_tasks(config: &Config, store: &RuleStore, mode: &Mode, verbosity: Verbosity) {
    let title = config.name.as_deref().unwrap_or("mkrun");
    match mode.version() {
        Some(version) => println!("{} tasks ({} mode, version {}):", title.bold(), mode.name(), version),
        None => println!("{} tasks ({} mode):", title.bold(), mode.name()),
    }
    if let Some(usage) = &config.usage {
        println!("{}", usage);
    }
    println!();

    let width = store.visible().map(|t| t.id.len()).max().unwrap_or(0);
    for task in store.visible() {
        let usage = task.usage.as_deref().unwrap_or_default();
        println!("  {:<width$}  {}", task.id.green(), usage, width = width);

        if verbosity >= Verbosity::Verbose {
            if let Some(description) = &task.description {
                for line in description.lines() {
                    println!("  {:<width$}    {}", "", line.dimmed(), width = width);
                }
            }
        }
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), MkrunError> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<(), MkrunError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command();
    let matches = command.clone().get_matches_from(args);

    if let Some(shell) = matches.get_one::<clap_complete::Shell>("completions") {
        crate::cli::completion::print_completions(*shell, &mut command);
        return Ok(());
    }

    let app = App::load(matches.get_one::<PathBuf>("file").cloned())?;
    app.run(&matches)
}
