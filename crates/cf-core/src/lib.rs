//! cf-core: shared error and configuration types.
//!
//! This crate is the foundational dependency for the other cf-* crates,
//! providing the unified error type and the configuration sections that
//! drive tool discovery, merging and single-clip audio operations.

pub mod config;
pub mod error;

// Re-export the most commonly used items at the crate root.
pub use config::{AudioConfig, Config, MergeConfig, ToolsConfig, TransitionKind};
pub use error::{Error, Result};
