//! Container header parsing.
//!
//! The first 512 bytes of a structured storage file carry the magic, the
//! byte order, the sector geometry and the entry points of every table.

use super::consts::*;
use crate::common::binary::{ByteOrder, FieldDecoder};
use crate::common::error::{Error, Result};

/// Parsed container header, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// CLSID of the root storage as stored in the header (normally zero)
    pub clsid: [u8; 16],
    pub minor_version: u16,
    pub major_version: u16,
    pub byte_order: ByteOrder,
    /// Sector size is `1 << sector_shift`
    pub sector_shift: u16,
    /// Mini sector size is `1 << mini_sector_shift`
    pub mini_sector_shift: u16,
    /// Number of SAT sectors the writer declared
    pub num_sat_sectors: u32,
    pub first_dir_sector: i32,
    /// Streams strictly smaller than this live in the mini stream
    pub mini_stream_cutoff: u32,
    pub first_ssat_sector: i32,
    pub num_ssat_sectors: u32,
    pub first_difat_sector: i32,
    pub num_difat_sectors: u32,
    /// The 109 SAT sector slots embedded in the header, raw
    pub header_difat: Vec<i32>,
    /// Total file size in bytes
    pub file_size: u64,
    /// Number of whole sectors after the header region
    pub sector_count: u64,
}

impl Header {
    /// Parse the header block of a container of `file_size` bytes.
    ///
    /// `block` is whatever could be read from the start of the file, at most
    /// [`HEADER_SIZE`] bytes.
    pub fn parse(block: &[u8], file_size: u64) -> Result<Self> {
        if block.len() < MAGIC.len() || &block[..MAGIC.len()] != MAGIC {
            return Err(Error::not_structured_storage());
        }
        if block.len() < HEADER_SIZE || file_size < HEADER_SIZE as u64 {
            return Err(Error::TruncatedContainer(format!(
                "{} bytes is shorter than the {}-byte header",
                file_size.min(block.len() as u64),
                HEADER_SIZE
            )));
        }

        let mark = [block[OFFSET_BYTE_ORDER], block[OFFSET_BYTE_ORDER + 1]];
        let byte_order = ByteOrder::from_mark(mark).ok_or_else(|| {
            Error::Format(format!(
                "Invalid byte order mark {:02X} {:02X}",
                mark[0], mark[1]
            ))
        })?;
        let decoder = FieldDecoder::new(byte_order);

        let sector_shift = decoder.read_u16(block, OFFSET_SECTOR_SHIFT)?;
        let mini_sector_shift = decoder.read_u16(block, OFFSET_MINI_SECTOR_SHIFT)?;
        if !(MIN_SECTOR_SHIFT..=MAX_SECTOR_SHIFT).contains(&sector_shift) {
            return Err(Error::Format(format!(
                "Sector shift {} outside {}..={}",
                sector_shift, MIN_SECTOR_SHIFT, MAX_SECTOR_SHIFT
            )));
        }
        if !(MIN_MINI_SECTOR_SHIFT..=sector_shift).contains(&mini_sector_shift) {
            return Err(Error::Format(format!(
                "Mini sector shift {} outside {}..={}",
                mini_sector_shift, MIN_MINI_SECTOR_SHIFT, sector_shift
            )));
        }

        let mut clsid = [0u8; 16];
        clsid.copy_from_slice(&block[OFFSET_CLSID..OFFSET_CLSID + 16]);

        let header_difat = (0..HEADER_DIFAT_SLOTS)
            .map(|i| decoder.read_i32(block, OFFSET_HEADER_DIFAT + i * 4))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut header = Header {
            clsid,
            minor_version: decoder.read_u16(block, OFFSET_MINOR_VERSION)?,
            major_version: decoder.read_u16(block, OFFSET_MAJOR_VERSION)?,
            byte_order,
            sector_shift,
            mini_sector_shift,
            num_sat_sectors: decoder.read_u32(block, OFFSET_NUM_SAT_SECTORS)?,
            first_dir_sector: decoder.read_i32(block, OFFSET_FIRST_DIR_SECTOR)?,
            mini_stream_cutoff: decoder.read_u32(block, OFFSET_MINI_STREAM_CUTOFF)?,
            first_ssat_sector: decoder.read_i32(block, OFFSET_FIRST_SSAT_SECTOR)?,
            num_ssat_sectors: decoder.read_u32(block, OFFSET_NUM_SSAT_SECTORS)?,
            first_difat_sector: decoder.read_i32(block, OFFSET_FIRST_DIFAT_SECTOR)?,
            num_difat_sectors: decoder.read_u32(block, OFFSET_NUM_DIFAT_SECTORS)?,
            header_difat,
            file_size,
            sector_count: 0,
        };

        header.sector_count =
            file_size.saturating_sub(header.header_region()) / header.sector_size() as u64;
        if header.sector_count < MIN_SECTOR_COUNT {
            return Err(Error::TruncatedContainer(format!(
                "{} bytes hold {} sector(s) of {} bytes, need at least {}",
                file_size,
                header.sector_count,
                header.sector_size(),
                MIN_SECTOR_COUNT
            )));
        }

        Ok(header)
    }

    #[inline]
    pub fn sector_size(&self) -> usize {
        1usize << self.sector_shift
    }

    #[inline]
    pub fn mini_sector_size(&self) -> usize {
        1usize << self.mini_sector_shift
    }

    /// Bytes before sector 0: the header block padded to a whole sector.
    #[inline]
    pub fn header_region(&self) -> u64 {
        (HEADER_SIZE as u64).max(self.sector_size() as u64)
    }

    /// File offset of the first byte of sector `id`.
    #[inline]
    pub fn sector_offset(&self, id: u32) -> u64 {
        self.header_region() + id as u64 * self.sector_size() as u64
    }

    /// Decoder for the multi-byte fields of this container.
    #[inline]
    pub fn decoder(&self) -> FieldDecoder {
        FieldDecoder::new(self.byte_order)
    }

    /// True when a stream of `size` bytes is stored in the mini stream.
    #[inline]
    pub fn is_short_stream(&self, size: u64) -> bool {
        size < self.mini_stream_cutoff as u64
    }
}
