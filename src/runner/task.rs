//! Runtime task representation
//!
//! This module contains the tasks held by the rule store, converted from
//! their configuration form with paths already interpolated.

use crate::config;
use crate::error::InterpolationResult;
use crate::runner::{interpolate, interpolate_list};
use std::collections::HashMap;

/// How a task entered the rule store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared by a task file
    Declared,
    /// Placeholder registered for a trailing invocation word
    Synthesized,
}

/// Runtime task representation
#[derive(Debug, Clone)]
pub struct Task {
    /// Task identifier
    pub id: String,

    /// Usage description
    pub usage: Option<String>,

    /// Longer description
    pub description: Option<String>,

    /// Whether this task is hidden from listings
    pub private: bool,

    /// Prerequisite identifiers, in declaration order
    pub prerequisites: Vec<String>,

    /// Recipe steps
    pub recipe: Vec<Step>,

    /// Always considered stale
    pub phony: bool,

    /// File produced by the task, relative to the project root
    pub output: Option<String>,

    /// Glob patterns whose matches feed staleness
    pub sources: Vec<String>,

    /// Declared or synthesized
    pub origin: Origin,
}

impl Task {
    /// Create a new task from configuration
    ///
    /// `output` and `sources` are interpolated with `vars` here so the
    /// resolver only ever sees concrete paths. Recipe steps keep their
    /// placeholders until they run.
    pub fn from_config(
        id: impl Into<String>,
        def: &config::TaskDef,
        vars: &HashMap<String, String>,
    ) -> InterpolationResult<Self> {
        let output = def
            .output
            .as_deref()
            .map(|output| interpolate(output, vars))
            .transpose()?;

        Ok(Task {
            id: id.into(),
            usage: def.usage.clone(),
            description: def.description.clone(),
            private: def.private,
            prerequisites: def.deps.clone(),
            recipe: def.run.iter().map(Step::from_config).collect(),
            phony: def.phony.unwrap_or(output.is_none()),
            sources: interpolate_list(&def.sources, vars)?,
            output,
            origin: Origin::Declared,
        })
    }

    /// A phony, recipe-less placeholder for a trailing invocation word
    pub fn synthesized(id: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            usage: None,
            description: None,
            private: true,
            prerequisites: Vec::new(),
            recipe: Vec::new(),
            phony: true,
            output: None,
            sources: Vec::new(),
            origin: Origin::Synthesized,
        }
    }

    /// Create a declared phony task with the given prerequisites and recipe
    pub fn phony(id: impl Into<String>, prerequisites: &[&str], recipe: Vec<Step>) -> Self {
        Task {
            prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
            recipe,
            origin: Origin::Declared,
            private: false,
            ..Task::synthesized(id)
        }
    }

    /// Turn this task into a file-backed one producing `output`
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self.phony = false;
        self
    }

    /// Add source globs to a file-backed task
    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Whether the task was registered by argument capture
    pub fn is_synthesized(&self) -> bool {
        self.origin == Origin::Synthesized
    }
}

/// Runtime representation of a recipe step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A command run through the interpreter
    Command {
        exec: String,
        print: String,
        quiet: bool,
        dir: Option<String>,
    },

    /// Files or directories to delete
    Remove(Vec<String>),

    /// Informational message
    Message(String),
}

impl Step {
    /// Create from config
    pub fn from_config(config: &config::Step) -> Self {
        match config {
            config::Step::Command(exec) => Step::command(exec),
            config::Step::Detail(detail) => Step::Command {
                print: detail.print.clone().unwrap_or_else(|| detail.exec.clone()),
                exec: detail.exec.clone(),
                quiet: detail.quiet,
                dir: detail.dir.clone(),
            },
            config::Step::Remove(remove) => Step::Remove(remove.remove.clone()),
            config::Step::Message(message) => Step::Message(message.message.clone()),
        }
    }

    /// A plain command step
    pub fn command(exec: impl Into<String>) -> Self {
        let exec = exec.into();
        Step::Command {
            print: exec.clone(),
            exec,
            quiet: false,
            dir: None,
        }
    }
}
