//! Random-access reads of whole sectors.

use super::header::Header;
use crate::common::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Reads sectors of a fixed size from the body of a container.
#[derive(Debug)]
pub struct SectorReader<R> {
    reader: R,
    sector_size: usize,
    header_region: u64,
    sector_count: u64,
}

impl<R: Read + Seek> SectorReader<R> {
    pub fn new(reader: R, header: &Header) -> Self {
        Self {
            reader,
            sector_size: header.sector_size(),
            header_region: header.header_region(),
            sector_count: header.sector_count,
        }
    }

    #[inline]
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    #[inline]
    pub fn sector_count(&self) -> u64 {
        self.sector_count
    }

    /// Read sector `id` into a fresh buffer.
    pub fn read_sector(&mut self, id: u32) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.sector_size);
        self.append_sector(id, &mut buffer)?;
        Ok(buffer)
    }

    /// Append the contents of sector `id` to `out`.
    ///
    /// Sectors past the end of the file are reported as a corrupt table,
    /// since only a table entry can point there.
    pub fn append_sector(&mut self, id: u32, out: &mut Vec<u8>) -> Result<()> {
        if id as u64 >= self.sector_count {
            return Err(Error::CorruptAllocationTable(format!(
                "Sector {} out of range, file holds {} sectors",
                id, self.sector_count
            )));
        }
        let position = self.header_region + id as u64 * self.sector_size as u64;
        self.reader.seek(SeekFrom::Start(position))?;

        let start = out.len();
        out.resize(start + self.sector_size, 0);
        self.reader.read_exact(&mut out[start..])?;
        Ok(())
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
