//! Project directory layout
//!
//! Every path the resolver and executor touch is derived from a [`Layout`],
//! so a whole run can be pointed at a temporary directory.

use crate::config::types::Settings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Absolute project paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root; relative paths are resolved against it
    pub root: PathBuf,
    /// Intermediate build output
    pub build_dir: PathBuf,
    /// Distributable archives
    pub dist_dir: PathBuf,
    /// Isolated environments, one sub-directory per version
    pub env_dir: PathBuf,
}

impl Layout {
    /// Build a layout from the settings of a task file rooted at `root`
    pub fn new(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        let root = root.into();
        Layout {
            build_dir: root.join(&settings.build_dir),
            dist_dir: root.join(&settings.dist_dir),
            env_dir: root.join(&settings.env_dir),
            root,
        }
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Directory of the isolated environment for a version
    pub fn environment(&self, version: &str) -> PathBuf {
        self.env_dir.join(version)
    }

    /// Variables exposed to recipes as `${root}`, `${build_dir}`, ...
    pub fn vars(&self) -> HashMap<String, String> {
        [
            ("root", &self.root),
            ("build_dir", &self.build_dir),
            ("dist_dir", &self.dist_dir),
            ("env_dir", &self.env_dir),
        ]
        .into_iter()
        .map(|(key, path)| (key.to_string(), path.display().to_string()))
        .collect()
    }
}
