use super::allocation::{AllocationTable, load_sat, load_ssat};
use super::consts::*;
use super::directory::{Directory, DirectoryEntry, EntryKind};
use super::header::Header;
use super::options::OpenOptions;
use super::sector::SectorReader;
use super::storage::{Entry, Storage};
use super::stream::{read_long, read_short};
use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Main OLE file parser structure
///
/// Holds everything decoded at open time: header, SAT, SSAT, directory and
/// the mini stream container. Nothing changes after `open` succeeds; the
/// reader is only used to fetch stream bytes on demand. Storages and
/// streams borrow the container, so the reader sits in a `RefCell` and the
/// type is single-threaded.
#[derive(Debug)]
pub struct OleStorage<R> {
    header: Header,
    sat: AllocationTable,
    ssat: AllocationTable,
    directory: Directory,
    /// Top-level listing of the root storage
    root_children: Vec<u32>,
    /// Contents of the root entry's stream, where short streams live
    mini_stream: Option<Bytes>,
    options: OpenOptions,
    sectors: RefCell<SectorReader<R>>,
}

impl OleStorage<BufReader<File>> {
    /// Open and parse a container on disk.
    ///
    /// The file handle is owned by the returned value and closed when it is
    /// dropped, or right away if parsing fails.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_path_with_options(path, OpenOptions::default())
    }

    pub fn open_path_with_options(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening structured storage file");
        let file = File::open(path)?;
        Self::open_with_options(BufReader::new(file), options)
    }
}

impl OleStorage<Cursor<Bytes>> {
    /// Parse a container held in memory.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with_options(data, OpenOptions::default())
    }

    pub fn from_bytes_with_options(data: impl Into<Bytes>, options: OpenOptions) -> Result<Self> {
        Self::open_with_options(Cursor::new(data.into()), options)
    }
}

impl<R: Read + Seek> OleStorage<R> {
    /// Open and parse an OLE file from a reader
    ///
    /// # Arguments
    /// * `reader` - A reader that implements Read + Seek
    pub fn open(reader: R) -> Result<Self> {
        Self::open_with_options(reader, OpenOptions::default())
    }

    /// Parse header, SAT, SSAT, directory and mini stream, in that order.
    ///
    /// The first failing stage aborts the open with its own error.
    pub fn open_with_options(mut reader: R, options: OpenOptions) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let mut block = Vec::with_capacity(HEADER_SIZE);
        reader.by_ref().take(HEADER_SIZE as u64).read_to_end(&mut block)?;
        let header = Header::parse(&block, file_size)?;
        debug!(
            file_size,
            byte_order = %header.byte_order,
            sector_size = header.sector_size(),
            mini_sector_size = header.mini_sector_size(),
            mini_stream_cutoff = header.mini_stream_cutoff,
            sectors = header.sector_count,
            "parsed header"
        );

        let mut sectors = SectorReader::new(reader, &header);
        let sat = load_sat(&header, &mut sectors)?;
        let ssat = load_ssat(&header, &sat, &mut sectors)?;
        let directory = Directory::load(&header, &sat, &mut sectors)?;
        let root_children = directory.children(directory.root().child, options.max_tree_depth)?;

        let mini_stream = if options.load_mini_stream {
            let root = directory.root();
            let data = read_long(&sat, &mut sectors, root.start_sector, root.size)?;
            debug!(bytes = data.len(), "loaded mini stream");
            Some(Bytes::from(data))
        } else {
            None
        };

        Ok(OleStorage {
            header,
            sat,
            ssat,
            directory,
            root_children,
            mini_stream,
            options,
            sectors: RefCell::new(sectors),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn sat(&self) -> &AllocationTable {
        &self.sat
    }

    pub fn ssat(&self) -> &AllocationTable {
        &self.ssat
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// The mini stream container, if it was loaded.
    pub fn mini_stream(&self) -> Option<&[u8]> {
        self.mini_stream.as_deref()
    }

    pub fn file_size(&self) -> u64 {
        self.header.file_size
    }

    /// The top-level storage.
    pub fn root(&self) -> Storage<'_, R> {
        Storage::new(self, self.directory.root(), self.root_children.clone(), 0)
    }

    /// Get the root entry name
    pub fn root_name(&self) -> &str {
        &self.directory.root().name
    }

    /// Build the listing of a nested storage entry.
    pub(crate) fn storage_for<'a>(
        &'a self,
        entry: &'a DirectoryEntry,
        depth: usize,
    ) -> Result<Storage<'a, R>> {
        let bound = self.options.max_tree_depth.min(self.directory.len());
        if depth > bound {
            return Err(Error::CorruptDirectory(format!(
                "Storage '{}' nested deeper than {} levels",
                entry.name, bound
            )));
        }
        let children = self
            .directory
            .children(entry.child, self.options.max_tree_depth)?;
        Ok(Storage::new(self, entry, children, depth))
    }

    /// Read a chain of declared length through the SAT or the SSAT.
    pub(crate) fn read_chain(&self, start: i32, size: u64, short: bool) -> Result<Vec<u8>> {
        if short {
            read_short(
                &self.ssat,
                self.mini_stream(),
                self.header.mini_sector_size(),
                start,
                size,
            )
        } else {
            let mut sectors = self.sectors.borrow_mut();
            read_long(&self.sat, &mut sectors, start, size)
        }
    }

    /// Open an entry by path from the root storage.
    pub fn open_entry(&self, path: &[&str]) -> Result<Option<Entry<'_, R>>> {
        self.root().open_path(path)
    }

    /// Read a stream by path.
    ///
    /// Returns `Ok(None)` if the path does not name a stream.
    pub fn read_stream(&self, path: &[&str]) -> Result<Option<Vec<u8>>> {
        match self.open_entry(path)? {
            Some(Entry::Stream(stream)) => stream.read().map(Some),
            _ => Ok(None),
        }
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> Result<bool> {
        Ok(self.open_entry(path)?.is_some())
    }

    /// List all streams in the OLE file
    ///
    /// Returns a list of stream paths (as vectors of storage/stream names)
    /// in listing order, depth first.
    pub fn list_streams(&self) -> Result<Vec<Vec<String>>> {
        let mut streams = Vec::new();
        self.collect_streams(&self.root(), &mut Vec::new(), &mut streams)?;
        Ok(streams)
    }

    fn collect_streams(
        &self,
        storage: &Storage<'_, R>,
        path: &mut Vec<String>,
        streams: &mut Vec<Vec<String>>,
    ) -> Result<()> {
        for entry in storage.entries() {
            match entry.kind {
                EntryKind::Stream => {
                    let mut stream_path = path.clone();
                    stream_path.push(entry.name.clone());
                    streams.push(stream_path);
                },
                EntryKind::Storage => {
                    let nested = self.storage_for(entry, storage.depth() + 1)?;
                    path.push(entry.name.clone());
                    self.collect_streams(&nested, path, streams)?;
                    path.pop();
                },
                _ => {},
            }
        }
        Ok(())
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.sectors.into_inner().into_inner()
    }
}

/// Check if a file/data is an OLE file by checking magic bytes
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= HEADER_SIZE && &data[0..8] == MAGIC
}
