//! Common types and utilities shared by the container reader.
//!
//! This module provides the byte-order aware field decoder and the crate's
//! error type.

// Submodule declarations
pub mod binary;
pub mod error;

// Re-exports for convenience
pub use binary::{BinaryError, ByteOrder, FieldDecoder};
pub use error::{Error, Result};
