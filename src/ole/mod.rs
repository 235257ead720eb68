/// Constants for the compound file format
pub mod consts;

/// Header block decoding and sector geometry
mod header;

/// Positioned reads of whole sectors
mod sector;

/// SAT and SSAT loading plus chain walking
mod allocation;

/// Directory entries and the per-storage red-black trees
mod directory;

/// Stream handles and chain assembly
mod stream;

/// Storage listings and name lookup
mod storage;

/// Main container parsing implementation
mod file;

/// Knobs applied at open time
mod options;

/// Human-readable dumps of the control structures
pub mod dump;

#[cfg(test)]
mod test_support;


// Re-export public types for convenient access
pub use allocation::AllocationTable;
pub use directory::{Directory, DirectoryEntry, EntryKind, NodeColor};
pub use file::{OleStorage, is_ole_file};
pub use header::Header;
pub use options::{NameMatching, OpenOptions};
pub use storage::{Entry, Storage};
pub use stream::Stream;
