//! Rule store
//!
//! Holds every task known to one invocation, keyed by identifier.

use crate::config::{Config, Mode};
use crate::error::{ConfigError, ConfigResult, ResolveError, ResolveResult};
use crate::runner::Task;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// The declared (and synthesized) tasks of one run
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    tasks: BTreeMap<String, Task>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        RuleStore::default()
    }

    /// Build the store for one mode: shared tasks first, then the mode's own
    ///
    /// `vars` are used to interpolate task outputs and sources.
    pub fn from_config(
        config: &Config,
        mode: &Mode,
        vars: &HashMap<String, String>,
    ) -> ConfigResult<Self> {
        let mut store = RuleStore::new();

        for (id, def) in config.tasks.iter().chain(mode.section(config).tasks.iter()) {
            let task = Task::from_config(id.as_str(), def, vars).map_err(|e| {
                ConfigError::Invalid(format!("task '{}': {}", id, e))
            })?;
            store.declare(task)?;
        }

        Ok(store)
    }

    /// Declare a task
    ///
    /// Fails when a declared task already owns the identifier; a placeholder
    /// left by argument capture is replaced.
    pub fn declare(&mut self, task: Task) -> ConfigResult<()> {
        match self.tasks.entry(task.id.clone()) {
            Entry::Occupied(mut existing) => {
                if !existing.get().is_synthesized() {
                    return Err(ConfigError::DuplicateTask(task.id));
                }
                existing.insert(task);
            }
            Entry::Vacant(slot) => {
                slot.insert(task);
            }
        }
        Ok(())
    }

    /// Register a phony placeholder for `id` unless a task already has it
    ///
    /// Returns whether a placeholder was added.
    pub fn synthesize(&mut self, id: &str) -> bool {
        match self.tasks.entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Task::synthesized(id));
                true
            }
        }
    }

    /// Look up a task
    pub fn get(&self, id: &str) -> ResolveResult<&Task> {
        self.tasks.get(id).ok_or_else(|| ResolveError::UnknownTask {
            name: id.to_string(),
            required_by: None,
        })
    }

    /// Whether a task with this identifier exists
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of tasks, placeholders included
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Declared, non-private tasks in name order
    pub fn visible(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .values()
            .filter(|task| !task.private && !task.is_synthesized())
    }
}
