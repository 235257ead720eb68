//! Stream assembly from sector and mini sector chains.

use super::allocation::AllocationTable;
use super::directory::DirectoryEntry;
use super::file::OleStorage;
use super::sector::SectorReader;
use crate::common::error::{Error, Result};
use std::io::{Read, Seek};
use tracing::trace;

/// Handle to a user stream. The bytes are read on demand.
pub struct Stream<'a, R> {
    file: &'a OleStorage<R>,
    entry: &'a DirectoryEntry,
    short: bool,
}

impl<'a, R: Read + Seek> Stream<'a, R> {
    pub(crate) fn new(file: &'a OleStorage<R>, entry: &'a DirectoryEntry) -> Self {
        let short = file.header().is_short_stream(entry.size);
        Self { file, entry, short }
    }

    /// Read the whole stream, exactly `len()` bytes.
    pub fn read(&self) -> Result<Vec<u8>> {
        self.file
            .read_chain(self.entry.start_sector, self.entry.size, self.short)
    }

    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    pub fn entry(&self) -> &'a DirectoryEntry {
        self.entry
    }

    /// Declared length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entry.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry.size == 0
    }

    /// True when the stream lives in the mini stream.
    #[inline]
    pub fn is_short(&self) -> bool {
        self.short
    }

    #[inline]
    pub fn start_sector(&self) -> i32 {
        self.entry.start_sector
    }
}

impl<R> std::fmt::Debug for Stream<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("name", &self.entry.name)
            .field("start_sector", &self.entry.start_sector)
            .field("size", &self.entry.size)
            .field("short", &self.short)
            .finish()
    }
}

/// Assemble a long stream by reading whole sectors along its SAT chain.
pub(crate) fn read_long<R: Read + Seek>(
    sat: &AllocationTable,
    sectors: &mut SectorReader<R>,
    start: i32,
    size: u64,
) -> Result<Vec<u8>> {
    let chain = sat.chain(start, sectors.sector_count() as usize)?;
    trace!(start, sectors = chain.len(), size, "reading long stream");

    let mut data = Vec::with_capacity(chain.len() * sectors.sector_size());
    for &id in &chain {
        sectors.append_sector(id, &mut data)?;
    }
    fit_to_size(data, size)
}

/// Assemble a short stream by slicing mini sectors out of the mini stream.
///
/// A window running past the end of the mini stream is clipped; a window
/// starting beyond it means the SSAT points outside the mini stream.
pub(crate) fn read_short(
    ssat: &AllocationTable,
    mini_stream: Option<&[u8]>,
    mini_sector_size: usize,
    start: i32,
    size: u64,
) -> Result<Vec<u8>> {
    let chain = ssat.chain(start, ssat.len())?;
    trace!(start, mini_sectors = chain.len(), size, "reading short stream");
    if chain.is_empty() {
        return fit_to_size(Vec::new(), size);
    }

    let mini_stream = match mini_stream {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return Err(Error::Format(
                "Short stream found but the container has no mini stream".to_string(),
            ));
        },
    };

    let mut data = Vec::with_capacity(chain.len() * mini_sector_size);
    for &id in &chain {
        let begin = id as usize * mini_sector_size;
        if begin >= mini_stream.len() {
            return Err(Error::CorruptAllocationTable(format!(
                "Mini sector {} starts past the {}-byte mini stream",
                id,
                mini_stream.len()
            )));
        }
        let end = (begin + mini_sector_size).min(mini_stream.len());
        data.extend_from_slice(&mini_stream[begin..end]);
    }
    fit_to_size(data, size)
}

/// Drop trailing slack, or fail if the chain held too little.
fn fit_to_size(mut data: Vec<u8>, size: u64) -> Result<Vec<u8>> {
    if (data.len() as u64) < size {
        return Err(Error::StreamTruncated {
            declared: size,
            assembled: data.len() as u64,
        });
    }
    data.truncate(size as usize);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::consts::ENDOFCHAIN;

    #[test]
    fn test_short_stream_concatenates_windows() {
        let mini: Vec<u8> = (0u8..32).collect();
        let ssat = AllocationTable::new(vec![2, ENDOFCHAIN, 1, ENDOFCHAIN]);
        let data = read_short(&ssat, Some(&mini), 8, 0, 20).unwrap();
        let mut expected: Vec<u8> = (0u8..8).collect();
        expected.extend(16u8..24);
        expected.extend(8u8..12);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_short_stream_clipped_window() {
        let mini = b"0123456789".to_vec();
        let ssat = AllocationTable::new(vec![ENDOFCHAIN]);
        assert_eq!(read_short(&ssat, Some(&mini), 64, 0, 10).unwrap(), mini);
        assert!(matches!(
            read_short(&ssat, Some(&mini), 64, 0, 11),
            Err(Error::StreamTruncated {
                declared: 11,
                assembled: 10
            })
        ));
    }

    #[test]
    fn test_short_stream_window_outside_mini_stream() {
        let mini = vec![0u8; 64];
        let ssat = AllocationTable::new(vec![ENDOFCHAIN, ENDOFCHAIN]);
        assert!(matches!(
            read_short(&ssat, Some(&mini), 64, 1, 10),
            Err(Error::CorruptAllocationTable(_))
        ));
    }

    #[test]
    fn test_short_stream_without_mini_stream() {
        let ssat = AllocationTable::new(vec![ENDOFCHAIN]);
        assert!(matches!(
            read_short(&ssat, None, 64, 0, 10),
            Err(Error::Format(_))
        ));
        // An empty stream never touches the mini stream
        assert!(read_short(&ssat, None, 64, ENDOFCHAIN, 0).unwrap().is_empty());
    }

    #[test]
    fn test_fit_to_size() {
        assert_eq!(fit_to_size(vec![1, 2, 3, 4], 2).unwrap(), vec![1, 2]);
        assert!(matches!(
            fit_to_size(vec![1, 2], 3),
            Err(Error::StreamTruncated { .. })
        ));
    }
}
