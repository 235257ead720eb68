//! Olestorage - A read-only decoder for OLE2 structured storage files
//!
//! Structured storage (the Compound File Binary Format) is the container
//! behind legacy Microsoft Office documents such as `.xls`, `.doc` and
//! `.ppt`. A container is a small file system inside one file: storages
//! act as directories and streams as files.
//!
//! # Features
//!
//! - **Both byte orders**: little- and big-endian containers
//! - **Any sector size**: 128 bytes to 64 KiB, including 4096-byte v4 files
//! - **Long and short streams**: sector chains through the SAT and mini
//!   sector chains through the SSAT
//! - **Bounded parsing**: cyclic chains and cyclic directory trees are
//!   reported as errors, never followed forever
//!
//! # Example - Reading the workbook stream of an .xls file
//!
//! ```no_run
//! use olestorage::ole::{Entry, OleStorage};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = OleStorage::open_path("report.xls")?;
//!
//! // List the top-level entries
//! for name in file.root().names() {
//!     println!("{}", name);
//! }
//!
//! if let Some(Entry::Stream(stream)) = file.root().open("Workbook")? {
//!     let bytes = stream.read()?;
//!     println!("Workbook: {} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Walking nested storages
//!
//! ```no_run
//! use olestorage::ole::OleStorage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = OleStorage::open_path("document.doc")?;
//! for path in file.list_streams()? {
//!     println!("{}", path.join("/"));
//! }
//! if let Some(data) = file.read_stream(&["ObjectPool", "_1234", "\u{1}Ole"])? {
//!     println!("{} bytes", data.len());
//! }
//! # Ok(())
//! # }
//! ```

/// Shared binary decoding and error types
pub mod common;

/// Structured storage container parsing
pub mod ole;

pub use common::{Error, Result};
pub use ole::{Entry, OleStorage, OpenOptions, Storage, Stream, is_ole_file};
