//! Command execution
//!
//! This module runs the side-effecting parts of recipe steps: spawning
//! commands through the configured interpreter and removing paths.

use crate::runner::Context;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

/// A command step with placeholders already substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    /// Task the command belongs to (becomes `$0` when arguments are bound)
    pub task: String,
    /// Command text handed to the interpreter
    pub exec: String,
    /// Text echoed before running
    pub print: String,
    /// Suppress the echo
    pub quiet: bool,
    /// Working directory
    pub dir: PathBuf,
    /// Trailing invocation arguments bound to this command
    pub args: Vec<String>,
    /// Variables exported to the command's environment
    pub env: HashMap<String, String>,
}

/// Runs prepared commands
pub trait StepRunner {
    /// Run a command to completion and return its exit code
    ///
    /// `None` means the process ended without one (e.g. killed by a signal).
    fn run(&mut self, command: &PreparedCommand, ctx: &Context) -> io::Result<Option<i32>>;
}

/// Runs commands as `<interpreter...> <exec>` subprocesses
///
/// Bound arguments become the shell's positional parameters: the command
/// text is followed by `"$@"`, `$0` is the task name and `$1..` are the
/// arguments, so they arrive unchanged without any re-quoting. Trailing
/// whitespace and command separators are stripped first so `"$@"` always
/// continues the last command of the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    fn build(command: &PreparedCommand, ctx: &Context) -> io::Result<StdCommand> {
        let (program, interpreter_args) = ctx.interpreter.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no interpreter configured")
        })?;

        let mut cmd = StdCommand::new(program);
        cmd.args(interpreter_args);

        if command.args.is_empty() {
            cmd.arg(&command.exec);
        } else {
            cmd.arg(format!("{} \"$@\"", last_command(&command.exec)));
            cmd.arg(&command.task);
            cmd.args(&command.args);
        }

        cmd.current_dir(&command.dir)
            .envs(&command.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        Ok(cmd)
    }
}

impl StepRunner for ShellRunner {
    fn run(&mut self, command: &PreparedCommand, ctx: &Context) -> io::Result<Option<i32>> {
        let status = ShellRunner::build(command, ctx)?.status()?;
        Ok(status.code())
    }
}

/// Command text with trailing whitespace and `;` separators removed
fn last_command(exec: &str) -> &str {
    exec.trim_end_matches(|c: char| c.is_whitespace() || c == ';')
}

/// Remove each path matched by `patterns`, ignoring ones that do not exist
///
/// Patterns are globs resolved against `root`; a pattern that is not a valid
/// glob is treated as a literal path. Returns the paths removed.
pub fn remove_paths(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, (PathBuf, io::Error)> {
    let mut removed = Vec::new();

    for pattern in patterns {
        for path in expand(root, pattern) {
            let result = match fs::symlink_metadata(&path) {
                Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path),
                Ok(_) => fs::remove_file(&path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err((path, e)),
            }
        }
    }

    Ok(removed)
}

fn expand(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let literal = root.join(pattern);
    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        format!(
            "{}/{}",
            glob::Pattern::escape(&root.display().to_string()).trim_end_matches('/'),
            pattern
        )
    };

    match glob::glob(&full_pattern) {
        Ok(paths) => paths.flatten().collect(),
        Err(_) => vec![literal],
    }
}
