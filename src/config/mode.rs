//! Run mode selection

use crate::config::types::{Config, ModeDef, Settings};
use std::env;
use std::fmt;

/// Which task set a run uses, chosen once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// An interpreter version is selected; tasks run inside its isolated environment
    Dev { version: String },
    /// No version is selected; reduced, user-facing task set
    User,
}

impl Mode {
    /// Select the mode from, in order: the CLI value, the environment
    /// variable named by `settings.version_var`, `settings.default_version`.
    /// Empty values count as absent.
    pub fn select(cli_version: Option<&str>, settings: &Settings) -> Mode {
        let from_env = env::var(&settings.version_var).ok();

        [
            cli_version.map(str::to_string),
            from_env,
            settings.default_version.clone(),
        ]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .map_or(Mode::User, |version| Mode::Dev { version })
    }

    /// Selected interpreter version, if any
    pub fn version(&self) -> Option<&str> {
        match self {
            Mode::Dev { version } => Some(version),
            Mode::User => None,
        }
    }

    /// Short name used in messages and exposed as `${mode}`
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Dev { .. } => "dev",
            Mode::User => "user",
        }
    }

    /// The mode-specific task section of a configuration
    pub fn section<'a>(&self, config: &'a Config) -> &'a ModeDef {
        match self {
            Mode::Dev { .. } => &config.dev,
            Mode::User => &config.user,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dev { version } => write!(f, "dev ({})", version),
            Mode::User => write!(f, "user"),
        }
    }
}
