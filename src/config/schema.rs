//! Configuration validation
//!
//! This module provides validation logic for task files. Dependency cycles
//! are not checked here: they only matter for the task actually requested
//! and are reported by the resolver.

use crate::config::types::{Config, Step, TaskDef};
use crate::error::{ConfigError, ConfigResult};

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    for (name, tool) in &config.settings.tools {
        if tool.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "tool '{}' has an empty path",
                name
            )));
        }
    }

    let sections = [&config.tasks, &config.dev.tasks, &config.user.tasks];
    for tasks in sections {
        for (name, task) in tasks {
            validate_task(name, task)?;
        }
    }

    // Shared tasks may not be redeclared by either mode
    for mode_tasks in [&config.dev.tasks, &config.user.tasks] {
        if let Some(name) = mode_tasks.keys().find(|name| config.tasks.contains_key(*name)) {
            return Err(ConfigError::DuplicateTask(name.clone()));
        }
    }

    Ok(())
}

/// Validate a single task
pub fn validate_task(name: &str, task: &TaskDef) -> ConfigResult<()> {
    if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "invalid task name '{}': names must be non-empty and contain no whitespace",
            name
        )));
    }

    if !task.sources.is_empty() && task.output.is_none() {
        return Err(ConfigError::SourcesWithoutOutput(name.to_string()));
    }

    for pattern in &task.sources {
        glob::Pattern::new(pattern).map_err(|e| {
            ConfigError::Invalid(format!(
                "task '{}' has an invalid source pattern '{}': {}",
                name, pattern, e
            ))
        })?;
    }

    for step in &task.run {
        let empty = match step {
            Step::Command(exec) => exec.trim().is_empty(),
            Step::Detail(detail) => detail.exec.trim().is_empty(),
            Step::Remove(remove) => remove.remove.is_empty(),
            Step::Message(_) => false,
        };
        if empty {
            return Err(ConfigError::Invalid(format!(
                "task '{}' has an empty step",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn task_with_run(run: Vec<Step>) -> TaskDef {
        TaskDef {
            run,
            ..TaskDef::default()
        }
    }

    #[test]
    fn test_validate_sources_without_output() {
        let task = TaskDef {
            sources: vec!["src/*.py".to_string()],
            ..TaskDef::default()
        };

        let result = validate_task("dist", &task);
        assert!(matches!(result, Err(ConfigError::SourcesWithoutOutput(name)) if name == "dist"));
    }

    #[test]
    fn test_validate_invalid_source_pattern() {
        let task = TaskDef {
            output: Some("out".to_string()),
            sources: vec!["src/[".to_string()],
            ..TaskDef::default()
        };

        assert!(matches!(validate_task("build", &task), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_self_dependency_left_to_resolver() {
        let task = TaskDef {
            deps: vec!["loop".to_string()],
            run: vec![Step::Command("true".to_string())],
            ..TaskDef::default()
        };

        assert!(validate_task("loop", &task).is_ok());
    }

    #[test]
    fn test_validate_empty_step() {
        let task = task_with_run(vec![Step::Command("  ".to_string())]);
        assert!(validate_task("blank", &task).is_err());
    }

    #[test]
    fn test_validate_task_name() {
        let task = task_with_run(vec![Step::Command("true".to_string())]);
        assert!(validate_task("two words", &task).is_err());
        assert!(validate_task("", &task).is_err());
        assert!(validate_task("init-environment", &task).is_ok());
    }

    #[test]
    fn test_shared_task_redeclared_by_mode() {
        let config = parse_config(
            r#"
tasks:
  install:
    run: pip install .
user:
  tasks:
    install:
      run: pip install --user .
"#,
        )
        .unwrap();

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::DuplicateTask(name)) if name == "install"));
    }

    #[test]
    fn test_same_task_in_both_modes_is_fine() {
        let config = parse_config(
            r#"
dev:
  tasks:
    test:
      run: python -m unittest
user:
  tasks:
    test:
      run:
        message: no tests in user mode
"#,
        )
        .unwrap();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_interpreter_is_invalid() {
        let config = parse_config("interpreter: []\n").unwrap();
        assert!(matches!(validate_config(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_builtin_lifecycle() {
        let config = crate::config::builtin_config().unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_builtin_lifecycle_quotes_paths() {
        let config = crate::config::builtin_config().unwrap();
        let paths = [
            "${root}",
            "${build_dir}",
            "${dist_dir}",
            "${env_dir}",
            "${interpreter}",
            "${packager}",
        ];

        let sections = [&config.tasks, &config.dev.tasks, &config.user.tasks];
        for (name, task) in sections.into_iter().flatten() {
            for step in &task.run {
                let exec = match step {
                    Step::Command(exec) => exec,
                    Step::Detail(detail) => &detail.exec,
                    _ => continue,
                };
                for path in paths {
                    for (at, _) in exec.match_indices(path) {
                        let quotes = exec[..at].matches('"').count();
                        assert!(quotes % 2 == 1, "{} is unquoted in task '{}': {}", path, name, exec);
                    }
                }
            }
        }
    }
}
