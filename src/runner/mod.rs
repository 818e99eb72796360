//! Task orchestration engine
//!
//! This module holds the rule store, argument capture, dependency
//! resolution, environment selection and plan execution.

pub mod capture;
pub mod command;
pub mod context;
pub mod environment;
pub mod executor;
pub mod interpolate;
pub mod resolve;
pub mod store;
pub mod task;

// Re-export main types
pub use capture::*;
pub use command::*;
pub use context::*;
pub use environment::*;
pub use executor::*;
pub use interpolate::*;
pub use resolve::*;
pub use store::*;
pub use task::*;
