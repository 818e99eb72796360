//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, MkrunError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["mkrun.yml", "mkrun.yaml"];

/// Task file used when the project does not ship its own
pub const BUILTIN_LIFECYCLE: &str = include_str!("lifecycle.yml");

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A task file on disk
    File(PathBuf),
    /// The built-in lifecycle, rooted at the given directory
    Builtin(PathBuf),
}

impl ConfigSource {
    /// Project root: the directory holding the task file
    pub fn root(&self) -> PathBuf {
        match self {
            ConfigSource::File(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            ConfigSource::Builtin(root) => root.clone(),
        }
    }
}

/// Find the configuration file by searching `start_dir` and its parents
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, MkrunError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, MkrunError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse the built-in lifecycle task file
pub fn builtin_config() -> Result<Config, MkrunError> {
    parse_config(BUILTIN_LIFECYCLE)
}

/// Load the task file for this run
///
/// An explicit path must exist. Otherwise the current directory and its
/// parents are searched, and the built-in lifecycle is used when nothing is
/// found.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, ConfigSource), MkrunError> {
    if let Some(path) = explicit {
        let config = parse_config_file(path)?;
        return Ok((config, ConfigSource::File(absolute(path)?)));
    }

    let cwd = current_dir()?;
    match find_config_file_from(cwd.clone()) {
        Ok(path) => {
            let config = parse_config_file(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        Err(ConfigError::NotFound(_)) => Ok((builtin_config()?, ConfigSource::Builtin(cwd))),
        Err(e) => Err(e.into()),
    }
}

fn current_dir() -> ConfigResult<PathBuf> {
    env::current_dir()
        .map_err(|e| ConfigError::Invalid(format!("Failed to get current directory: {}", e)))
}

fn absolute(path: &Path) -> ConfigResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(current_dir()?.join(path))
    }
}
