//! Storages: the directories of a structured storage file.

use super::directory::{DirectoryEntry, EntryKind};
use super::file::OleStorage;
use super::stream::Stream;
use crate::common::error::{Error, Result};
use std::io::{Read, Seek};

/// Result of opening a name inside a storage.
#[derive(Debug)]
pub enum Entry<'a, R> {
    Stream(Stream<'a, R>),
    Storage(Storage<'a, R>),
}

impl<'a, R> Entry<'a, R> {
    pub fn into_stream(self) -> Option<Stream<'a, R>> {
        match self {
            Entry::Stream(stream) => Some(stream),
            Entry::Storage(_) => None,
        }
    }

    pub fn into_storage(self) -> Option<Storage<'a, R>> {
        match self {
            Entry::Storage(storage) => Some(storage),
            Entry::Stream(_) => None,
        }
    }
}

/// Ordered listing of one storage's children.
///
/// The order is the in-order walk of the storage's red-black tree. Entries
/// are borrowed from the container's directory.
pub struct Storage<'a, R> {
    file: &'a OleStorage<R>,
    entry: &'a DirectoryEntry,
    children: Vec<u32>,
    depth: usize,
}

impl<'a, R: Read + Seek> Storage<'a, R> {
    pub(crate) fn new(
        file: &'a OleStorage<R>,
        entry: &'a DirectoryEntry,
        children: Vec<u32>,
        depth: usize,
    ) -> Self {
        Self {
            file,
            entry,
            children,
            depth,
        }
    }

    /// Directory entry of the storage itself.
    pub fn entry(&self) -> &'a DirectoryEntry {
        self.entry
    }

    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    /// Nesting level below the root storage (root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in listing order.
    pub fn entries(&self) -> impl Iterator<Item = &'a DirectoryEntry> + '_ {
        let directory = self.file.directory();
        self.children.iter().filter_map(move |&sid| directory.get(sid))
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.entries().map(|entry| entry.name.as_str()).collect()
    }

    /// First child whose name matches, by linear scan.
    pub fn find(&self, name: &str) -> Option<&'a DirectoryEntry> {
        let matching = self.file.options().name_matching;
        self.entries().find(|entry| matching.matches(&entry.name, name))
    }

    /// Open a child by name.
    ///
    /// Returns `Ok(None)` when no child has that name. Entries that are
    /// neither streams nor storages fail with
    /// [`Error::UnsupportedEntryKind`].
    pub fn open(&self, name: &str) -> Result<Option<Entry<'a, R>>> {
        let Some(entry) = self.find(name) else {
            return Ok(None);
        };
        match entry.kind {
            EntryKind::Stream => Ok(Some(Entry::Stream(Stream::new(self.file, entry)))),
            EntryKind::Storage => Ok(Some(Entry::Storage(
                self.file.storage_for(entry, self.depth + 1)?,
            ))),
            other => Err(Error::UnsupportedEntryKind {
                name: entry.name.clone(),
                kind: other.raw(),
            }),
        }
    }

    /// Open a nested entry one name at a time.
    ///
    /// Returns `Ok(None)` if a component is missing or a stream is found
    /// where a storage was expected. An empty path yields this storage.
    pub fn open_path(&self, path: &[&str]) -> Result<Option<Entry<'a, R>>> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(Some(Entry::Storage(self.clone())));
        };

        let mut current = self.clone();
        for &name in parents {
            match current.open(name)? {
                Some(Entry::Storage(storage)) => current = storage,
                Some(Entry::Stream(_)) | None => return Ok(None),
            }
        }
        current.open(last)
    }
}

impl<R> Clone for Storage<'_, R> {
    fn clone(&self) -> Self {
        Self {
            file: self.file,
            entry: self.entry,
            children: self.children.clone(),
            depth: self.depth,
        }
    }
}

impl<R> std::fmt::Debug for Storage<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("name", &self.entry.name)
            .field("children", &self.children)
            .field("depth", &self.depth)
            .finish()
    }
}
