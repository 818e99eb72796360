//! Isolated environment selection
//!
//! Recipes refer to tools by logical name (`${interpreter}`, `${packager}`);
//! an [`EnvironmentSelector`] maps those names to executables inside the
//! environment provisioned for the selected interpreter version.

use crate::error::{EnvironmentError, EnvironmentResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Maps a logical tool name and a version to an executable
pub trait EnvironmentSelector {
    /// Whether `tool` is a name this selector knows about
    fn provides(&self, tool: &str) -> bool;

    /// Path of `tool` inside the environment for `version`
    ///
    /// Fails with [`EnvironmentError::NotFound`] when that environment has
    /// not been provisioned yet.
    fn resolve(&self, tool: &str, version: &str) -> EnvironmentResult<PathBuf>;
}

/// Environments laid out as `<root>/<version>/<tool path>`
#[derive(Debug, Clone)]
pub struct IsolatedEnvironments {
    root: PathBuf,
    tools: BTreeMap<String, String>,
}

impl IsolatedEnvironments {
    pub fn new(root: impl Into<PathBuf>, tools: BTreeMap<String, String>) -> Self {
        IsolatedEnvironments {
            root: root.into(),
            tools,
        }
    }

    /// Directory of the environment for a version
    pub fn environment(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }
}

impl EnvironmentSelector for IsolatedEnvironments {
    fn provides(&self, tool: &str) -> bool {
        self.tools.contains_key(tool)
    }

    fn resolve(&self, tool: &str, version: &str) -> EnvironmentResult<PathBuf> {
        let relative = self
            .tools
            .get(tool)
            .ok_or_else(|| EnvironmentError::UnknownTool(tool.to_string()))?;

        let path = self.environment(version).join(relative);
        if path.exists() {
            Ok(path)
        } else {
            Err(EnvironmentError::NotFound {
                tool: tool.to_string(),
                version: version.to_string(),
                path,
            })
        }
    }
}

/// Tool paths resolved for one invocation
///
/// Lookups are lazy so a provisioning task earlier in the plan can create
/// the environment before a later task needs it. Successful lookups are
/// cached for the rest of the invocation.
pub struct EnvironmentBinding<'a> {
    selector: &'a dyn EnvironmentSelector,
    version: Option<String>,
    resolved: HashMap<String, PathBuf>,
}

impl<'a> EnvironmentBinding<'a> {
    pub fn new(selector: &'a dyn EnvironmentSelector, version: Option<&str>) -> Self {
        EnvironmentBinding {
            selector,
            version: version.map(str::to_string),
            resolved: HashMap::new(),
        }
    }

    /// Whether `name` refers to a tool rather than an ordinary variable
    pub fn provides(&self, name: &str) -> bool {
        self.selector.provides(name)
    }

    /// Path of a tool, resolving it on first use
    pub fn path(&mut self, tool: &str) -> EnvironmentResult<&Path> {
        if !self.resolved.contains_key(tool) {
            let version = self
                .version
                .as_deref()
                .ok_or_else(|| EnvironmentError::NoVersion(tool.to_string()))?;
            let path = self.selector.resolve(tool, version)?;
            self.resolved.insert(tool.to_string(), path);
        }

        Ok(self.resolved[tool].as_path())
    }
}
