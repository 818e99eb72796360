//! Error types for mkrun

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code reserved for configuration and resolution errors
pub const RESOLUTION_EXIT_CODE: i32 = 2;

/// Exit code used when an isolated environment is missing
pub const ENVIRONMENT_EXIT_CODE: i32 = 3;

/// Result type alias for mkrun operations
pub type Result<T> = std::result::Result<T, MkrunError>;

/// Main error type for mkrun
#[derive(Error, Debug)]
pub enum MkrunError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while turning an invocation into a plan
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Recipe execution errors
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Environment selection errors
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MkrunError {
    /// Process exit code for this error
    ///
    /// Recipe failures propagate the failing step's code; configuration and
    /// resolution problems use [`RESOLUTION_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            MkrunError::Config(_) | MkrunError::Resolve(_) | MkrunError::Yaml(_) => {
                RESOLUTION_EXIT_CODE
            }
            MkrunError::Execution(ExecutionError::RecipeFailure { code, .. }) => match code {
                Some(0) | None => 1,
                Some(code) => *code,
            },
            MkrunError::Environment(_) => ENVIRONMENT_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' is declared more than once")]
    DuplicateTask(String),

    #[error("Task '{0}' lists sources but has no output to compare them with")]
    SourcesWithoutOutput(String),
}

/// Invocation and dependency resolution errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No task given")]
    MissingTask,

    #[error("Task '{name}' is not defined{}", required_by_suffix(.required_by))]
    UnknownTask { name: String, required_by: Option<String> },

    #[error("Circular dependency detected: {0}")]
    CyclicDependency(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task '{task}' failed with exit code {}", display_code(.code))]
    RecipeFailure { task: String, code: Option<i32> },

    #[error("Task '{task}' could not start '{program}': {error}")]
    Spawn {
        task: String,
        program: String,
        error: String,
    },

    #[error("Task '{task}' could not remove '{}': {error}", .path.display())]
    Remove {
        task: String,
        path: PathBuf,
        error: String,
    },
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    match required_by {
        Some(task) => format!(" (required by '{}')", task),
        None => String::new(),
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

/// Isolated environment lookup errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("No '{tool}' provisioned for version {version} (expected at {})", .path.display())]
    NotFound {
        tool: String,
        version: String,
        path: PathBuf,
    },

    #[error("Tool '{0}' is not provided by any environment")]
    UnknownTool(String),

    #[error("Tool '{0}' needs an interpreter version, but none was selected")]
    NoVersion(String),
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for environment lookups
pub type EnvironmentResult<T> = std::result::Result<T, EnvironmentError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
