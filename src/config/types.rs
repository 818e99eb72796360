//! Core configuration types
//!
//! This module defines the data structures that represent an mkrun.yml task file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Project name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Project usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Directory layout and environment settings
    #[serde(default)]
    pub settings: Settings,

    /// Tasks shared by every mode
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskDef>,

    /// Tasks only declared when an interpreter version is selected
    #[serde(default)]
    pub dev: ModeDef,

    /// Tasks only declared when no interpreter version is selected
    #[serde(default)]
    pub user: ModeDef,
}

/// Project-wide settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Directory holding intermediate build output
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Directory holding distributable archives
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    /// Directory holding isolated environments, one per version
    #[serde(default = "default_env_dir")]
    pub env_dir: String,

    /// Environment variable selecting the interpreter version
    #[serde(default = "default_version_var")]
    pub version_var: String,

    /// Version used when neither the CLI nor the environment selects one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,

    /// Tool names mapped to paths relative to an environment directory
    #[serde(default = "default_tools")]
    pub tools: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            build_dir: default_build_dir(),
            dist_dir: default_dist_dir(),
            env_dir: default_env_dir(),
            version_var: default_version_var(),
            default_version: None,
            tools: default_tools(),
        }
    }
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_env_dir() -> String {
    ".environments".to_string()
}

fn default_version_var() -> String {
    "PYTHON_VERSION".to_string()
}

fn default_tools() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("interpreter".to_string(), "bin/python".to_string()),
        ("packager".to_string(), "bin/pip".to_string()),
    ])
}

/// The task set of one mode
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModeDef {
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskDef>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskDef {
    /// Usage description for listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from listings)
    #[serde(default)]
    pub private: bool,

    /// Prerequisite task names, run first in order
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_string_list"
    )]
    pub deps: Vec<String>,

    /// Force the task to always run; defaults to true when there is no output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phony: Option<bool>,

    /// File produced by the task, compared by modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Glob patterns of files the output is built from
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_string_list"
    )]
    pub sources: Vec<String>,

    /// Recipe steps to execute
    #[serde(default, deserialize_with = "deserialize_steps")]
    pub run: Vec<Step>,
}

/// A recipe step
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Step {
    /// Simple string command
    Command(String),

    /// Command with additional options
    Detail(CommandDetail),

    /// Remove files or directories
    Remove(RemoveStep),

    /// Print an informational message
    Message(MessageStep),
}

/// Command with options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress the command echo
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Paths to delete; missing paths are ignored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoveStep {
    #[serde(deserialize_with = "deserialize_string_list")]
    pub remove: Vec<String>,
}

/// An informational message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageStep {
    pub message: String,
}

/// Custom deserializer for steps that handles both single values and arrays
fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string command
        Value::String(s) => Ok(vec![Step::Command(s)]),
        Value::Mapping(_) => {
            let step = Step::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![step])
        }
        // Array of steps
        Value::Sequence(seq) => {
            let mut steps = Vec::new();
            for item in seq {
                let step = Step::deserialize(item).map_err(D::Error::custom)?;
                steps.push(step);
            }
            Ok(steps)
        }
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}

/// Custom deserializer for lists that may be written as a single string
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| String::deserialize(item).map_err(D::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("expected a string or a list of strings")),
    }
}
