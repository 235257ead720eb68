//! Unified error types for olestorage.
//!
//! Every structural problem in a container maps to one variant of [`Error`].
//! A missing entry during a named lookup is not an error; lookups return
//! `Ok(None)` for it.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
