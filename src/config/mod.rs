//! Configuration parsing and validation
//!
//! This module handles parsing of mkrun.yml task files, validation of their
//! structure, and the per-run settings derived from them (mode and layout).

pub mod layout;
pub mod mode;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use layout::*;
pub use mode::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
