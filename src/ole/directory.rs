//! Directory entries and storage tree reconstruction.
//!
//! The directory is a flat array of 128-byte records. Each storage keeps its
//! children in a red-black tree whose links are indices into that array, so
//! the array is kept as an arena and trees are rebuilt by index.

use super::allocation::AllocationTable;
use super::consts::*;
use super::header::Header;
use super::sector::SectorReader;
use crate::common::binary::FieldDecoder;
use crate::common::error::{Error, Result};
use std::io::{Read, Seek};
use tracing::debug;

/// Object type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Empty,
    Storage,
    Stream,
    LockBytes,
    Property,
    Root,
    Unknown(u8),
}

impl EntryKind {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            STGTY_EMPTY => EntryKind::Empty,
            STGTY_STORAGE => EntryKind::Storage,
            STGTY_STREAM => EntryKind::Stream,
            STGTY_LOCKBYTES => EntryKind::LockBytes,
            STGTY_PROPERTY => EntryKind::Property,
            STGTY_ROOT => EntryKind::Root,
            other => EntryKind::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            EntryKind::Empty => STGTY_EMPTY,
            EntryKind::Storage => STGTY_STORAGE,
            EntryKind::Stream => STGTY_STREAM,
            EntryKind::LockBytes => STGTY_LOCKBYTES,
            EntryKind::Property => STGTY_PROPERTY,
            EntryKind::Root => STGTY_ROOT,
            EntryKind::Unknown(other) => other,
        }
    }
}

/// Red-black color of a tree node. Kept for dumps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeColor {
    Red,
    Black,
}

impl NodeColor {
    pub fn from_raw(raw: u8) -> Self {
        if raw == COLOR_RED {
            NodeColor::Red
        } else {
            NodeColor::Black
        }
    }
}

/// One decoded directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Position in the directory array
    pub sid: u32,
    pub name: String,
    pub kind: EntryKind,
    pub color: NodeColor,
    /// Left sibling in the parent's tree
    pub left: Option<u32>,
    /// Right sibling in the parent's tree
    pub right: Option<u32>,
    /// Root of this storage's own child tree
    pub child: Option<u32>,
    pub clsid: [u8; 16],
    pub state_bits: u32,
    /// FILETIME of creation
    pub created: u64,
    /// FILETIME of last modification
    pub modified: u64,
    /// First sector (or mini sector) of the stream
    pub start_sector: i32,
    /// Declared stream size in bytes
    pub size: u64,
}

/// Negative tree links mean "no node".
#[inline]
fn link(raw: i32) -> Option<u32> {
    (raw >= 0).then_some(raw as u32)
}

impl DirectoryEntry {
    /// Decode a 128-byte record found at position `sid`.
    pub fn parse(
        data: &[u8],
        sid: u32,
        decoder: FieldDecoder,
        sector_size: usize,
    ) -> Result<Self> {
        if data.len() < DIRENTRY_SIZE {
            return Err(Error::Format(format!(
                "Directory entry {} has {} bytes, expected {}",
                sid,
                data.len(),
                DIRENTRY_SIZE
            )));
        }

        // The length counts bytes including the terminating NUL
        let name_len = decoder.read_u16(data, OFFSET_ENTRY_NAME_LEN)? as usize;
        let name_bytes = name_len.saturating_sub(2).min(ENTRY_NAME_LEN) & !1;
        let name = decoder.read_utf16(data, 0, name_bytes)?;

        let mut clsid = [0u8; 16];
        clsid.copy_from_slice(&data[OFFSET_ENTRY_CLSID..OFFSET_ENTRY_CLSID + 16]);

        // Version 3 writers may leave garbage in the high dword
        let raw_size = decoder.read_u64(data, OFFSET_ENTRY_SIZE)?;
        let size = if sector_size == SECTOR_SIZE_V3 {
            raw_size & 0xFFFF_FFFF
        } else {
            raw_size
        };

        Ok(DirectoryEntry {
            sid,
            name,
            kind: EntryKind::from_raw(data[OFFSET_ENTRY_TYPE]),
            color: NodeColor::from_raw(data[OFFSET_ENTRY_COLOR]),
            left: link(decoder.read_i32(data, OFFSET_ENTRY_LEFT)?),
            right: link(decoder.read_i32(data, OFFSET_ENTRY_RIGHT)?),
            child: link(decoder.read_i32(data, OFFSET_ENTRY_CHILD)?),
            clsid,
            state_bits: decoder.read_u32(data, OFFSET_ENTRY_STATE_BITS)?,
            created: decoder.read_u64(data, OFFSET_ENTRY_CREATED)?,
            modified: decoder.read_u64(data, OFFSET_ENTRY_MODIFIED)?,
            start_sector: decoder.read_i32(data, OFFSET_ENTRY_START)?,
            size,
        })
    }

    #[inline]
    pub fn is_stream(&self) -> bool {
        self.kind == EntryKind::Stream
    }

    #[inline]
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, EntryKind::Storage | EntryKind::Root)
    }
}

/// Flat array of every directory entry in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// Read the directory chain and decode every record in it.
    pub fn load<R: Read + Seek>(
        header: &Header,
        sat: &AllocationTable,
        sectors: &mut SectorReader<R>,
    ) -> Result<Self> {
        let chain = sat.chain(header.first_dir_sector, sectors.sector_count() as usize)?;
        if chain.is_empty() {
            return Err(Error::Format(format!(
                "Directory chain starting at {} is empty",
                header.first_dir_sector
            )));
        }

        let mut raw = Vec::with_capacity(chain.len() * sectors.sector_size());
        for &id in &chain {
            sectors.append_sector(id, &mut raw)?;
        }

        let decoder = header.decoder();
        let entries = raw
            .chunks_exact(DIRENTRY_SIZE)
            .enumerate()
            .map(|(sid, record)| {
                DirectoryEntry::parse(record, sid as u32, decoder, header.sector_size())
            })
            .collect::<Result<Vec<_>>>()?;

        let directory = Self::from_entries(entries)?;
        debug!(
            sectors = chain.len(),
            entries = directory.len(),
            "loaded directory"
        );
        Ok(directory)
    }

    /// Wrap decoded entries; entry 0 must be the root storage.
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Result<Self> {
        match entries.first() {
            Some(root) if root.kind == EntryKind::Root => Ok(Self { entries }),
            Some(root) => Err(Error::Format(format!(
                "First directory entry has type {}, expected root storage",
                root.kind.raw()
            ))),
            None => Err(Error::Format("Directory holds no entries".to_string())),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.entries.get(sid as usize)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// The root storage entry.
    pub fn root(&self) -> &DirectoryEntry {
        &self.entries[0]
    }

    /// In-order listing (left, self, right) of the tree rooted at `root`.
    ///
    /// Recursion deeper than `max_depth` (or the entry count, whichever is
    /// smaller) fails with [`Error::CorruptDirectory`]; a well-formed tree
    /// can never be deeper than the number of entries.
    pub fn children(&self, root: Option<u32>, max_depth: usize) -> Result<Vec<u32>> {
        let bound = max_depth.min(self.entries.len());
        let mut listing = Vec::new();
        self.visit(root, 1, bound, &mut listing)?;
        Ok(listing)
    }

    fn visit(
        &self,
        node: Option<u32>,
        depth: usize,
        bound: usize,
        listing: &mut Vec<u32>,
    ) -> Result<()> {
        let Some(sid) = node else {
            return Ok(());
        };
        if depth > bound {
            return Err(Error::CorruptDirectory(format!(
                "Tree deeper than {} levels at entry {}",
                bound, sid
            )));
        }
        let entry = self.get(sid).ok_or_else(|| {
            Error::CorruptDirectory(format!(
                "Tree link {} out of range, directory holds {} entries",
                sid,
                self.entries.len()
            ))
        })?;

        self.visit(entry.left, depth + 1, bound, listing)?;
        listing.push(sid);
        self.visit(entry.right, depth + 1, bound, listing)
    }
}
