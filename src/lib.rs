//! mkrun - a small rule-based task runner
//!
//! mkrun drives a package's test/dist/install lifecycle from a YAML task
//! file. Tasks form a dependency graph; file-backed tasks are skipped when
//! their output is newer than everything it depends on, phony tasks always
//! run, and any words after the task name are forwarded to its recipe.
//!
//! ```rust,ignore
//! use mkrun::config::{builtin_config, Layout, Mode};
//! use mkrun::runner::{capture, resolve, RuleStore};
//!
//! let config = builtin_config()?;
//! let mode = Mode::Dev { version: "3.12".into() };
//! let layout = Layout::new(".", &config.settings);
//! let mut store = RuleStore::from_config(&config, &mode, &layout.vars())?;
//! let invocation = capture(&mut store, ["test", "-v", "mymodule"])?;
//! let plan = resolve(&store, &invocation.task, &layout)?;
//! ```

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::{MkrunError, Result};

/// Current version of mkrun
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
