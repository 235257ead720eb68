//! Error type for structured storage decoding.
use crate::common::binary::BinaryError;
use thiserror::Error;

/// Main error type for olestorage operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A field could not be decoded from a buffer
    #[error("Binary decoding error: {0}")]
    Binary(#[from] BinaryError),

    /// Bad magic or header geometry
    #[error("Invalid format: {0}")]
    Format(String),

    /// File is shorter than its header geometry implies
    #[error("Container truncated: {0}")]
    TruncatedContainer(String),

    /// A SAT, SSAT or DIFAT chain is cyclic, too long or out of range
    #[error("Corrupt allocation table: {0}")]
    CorruptAllocationTable(String),

    /// A directory tree link is out of range or the tree is too deep
    #[error("Corrupt directory: {0}")]
    CorruptDirectory(String),

    /// The sector chain holds fewer bytes than the entry declares
    #[error("Stream truncated: declared {declared} bytes, chain holds {assembled}")]
    StreamTruncated { declared: u64, assembled: u64 },

    /// The entry is neither a stream nor a storage
    #[error("Don't know how to open '{name}' (entry type {kind})")]
    UnsupportedEntryKind { name: String, kind: u8 },
}

impl Error {
    pub(crate) fn not_structured_storage() -> Self {
        Error::Format("Not a structured storage file".to_string())
    }
}

/// Result type for olestorage operations.
pub type Result<T> = std::result::Result<T, Error>;
