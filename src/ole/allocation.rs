//! Sector allocation tables (SAT and SSAT).
//!
//! Both tables map a sector index to the index of the next sector of the
//! same stream. The SAT covers regular sectors and is assembled from the
//! sectors listed in the header and the DIFAT chain. The SSAT covers mini
//! sectors and is itself an ordinary stream in the SAT.

use super::consts::ENDOFCHAIN;
use super::header::Header;
use super::sector::SectorReader;
use crate::common::error::{Error, Result};
use fixedbitset::FixedBitSet;
use std::io::{Read, Seek};
use tracing::{debug, trace, warn};

/// Chain-successor table for sectors or mini sectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationTable {
    entries: Vec<i32>,
}

impl AllocationTable {
    pub fn new(entries: Vec<i32>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successor of `index`, if the table covers it.
    #[inline]
    pub fn get(&self, index: usize) -> Option<i32> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[i32] {
        &self.entries
    }

    /// Follow the chain starting at `start` and return the visited indices.
    ///
    /// A negative `start` is an empty chain. The walk stops at the first
    /// negative successor. Indices at or beyond `limit` (or the table length)
    /// and revisited indices fail with
    /// [`Error::CorruptAllocationTable`], so a walk takes at most
    /// `min(limit, len)` steps.
    pub fn chain(&self, start: i32, limit: usize) -> Result<Vec<u32>> {
        let bound = limit.min(self.entries.len());
        let mut visited = FixedBitSet::with_capacity(bound);
        let mut chain = Vec::new();
        let mut current = start;

        while current >= 0 {
            let index = current as usize;
            if index >= bound {
                return Err(Error::CorruptAllocationTable(format!(
                    "Chain from {} reaches index {}, table covers {}",
                    start, index, bound
                )));
            }
            if visited.put(index) {
                return Err(Error::CorruptAllocationTable(format!(
                    "Chain from {} loops back to index {} after {} steps",
                    start,
                    index,
                    chain.len()
                )));
            }
            chain.push(index as u32);
            current = self.entries[index];
        }

        if current != ENDOFCHAIN && !chain.is_empty() {
            trace!(start, terminator = current, "chain ended on a non end-of-chain sentinel");
        }
        Ok(chain)
    }
}

/// Build the SAT from the header slots and the DIFAT chain.
pub fn load_sat<R: Read + Seek>(
    header: &Header,
    sectors: &mut SectorReader<R>,
) -> Result<AllocationTable> {
    let sector_count = sectors.sector_count();
    let check = |id: i32| -> Result<u32> {
        if id as u64 >= sector_count {
            return Err(Error::CorruptAllocationTable(format!(
                "SAT sector {} out of range, file holds {} sectors",
                id, sector_count
            )));
        }
        Ok(id as u32)
    };

    // Each sector may hold at most one slice of the SAT
    let mut listed = FixedBitSet::with_capacity(sector_count as usize);
    let mut sat_sectors: Vec<u32> = Vec::new();
    let mut push = |sat_sectors: &mut Vec<u32>, id: i32| -> Result<()> {
        let id = check(id)?;
        if listed.put(id as usize) {
            return Err(Error::CorruptAllocationTable(format!(
                "SAT sector {} listed twice",
                id
            )));
        }
        sat_sectors.push(id);
        Ok(())
    };

    for &id in header.header_difat.iter().filter(|&&id| id >= 0) {
        push(&mut sat_sectors, id)?;
    }

    let decoder = header.decoder();
    let mut visited = FixedBitSet::with_capacity(sector_count as usize);
    let mut difat_sectors = 0u32;
    let mut next = header.first_difat_sector;
    while next >= 0 {
        let id = check(next)?;
        if visited.put(id as usize) {
            return Err(Error::CorruptAllocationTable(format!(
                "DIFAT chain loops back to sector {}",
                id
            )));
        }
        let ids = decoder.read_i32_array(&sectors.read_sector(id)?)?;
        let (slots, tail) = ids.split_at(ids.len() - 1);
        for &slot in slots.iter().filter(|&&slot| slot >= 0) {
            push(&mut sat_sectors, slot)?;
        }
        next = tail[0];
        difat_sectors += 1;
    }

    if difat_sectors != header.num_difat_sectors {
        warn!(
            declared = header.num_difat_sectors,
            found = difat_sectors,
            "DIFAT sector count differs from header"
        );
    }
    if sat_sectors.len() as u64 != header.num_sat_sectors as u64 {
        warn!(
            declared = header.num_sat_sectors,
            found = sat_sectors.len(),
            "SAT sector count differs from header"
        );
    }

    let mut raw = Vec::with_capacity(sat_sectors.len() * sectors.sector_size());
    for &id in &sat_sectors {
        sectors.append_sector(id, &mut raw)?;
    }
    let sat = AllocationTable::new(decoder.read_i32_array(&raw)?);
    debug!(
        sat_sectors = sat_sectors.len(),
        difat_sectors,
        entries = sat.len(),
        "loaded SAT"
    );
    Ok(sat)
}

/// Build the SSAT by following its chain through the SAT.
pub fn load_ssat<R: Read + Seek>(
    header: &Header,
    sat: &AllocationTable,
    sectors: &mut SectorReader<R>,
) -> Result<AllocationTable> {
    let chain = sat.chain(header.first_ssat_sector, sectors.sector_count() as usize)?;
    if chain.len() as u64 != header.num_ssat_sectors as u64 {
        warn!(
            declared = header.num_ssat_sectors,
            found = chain.len(),
            "SSAT sector count differs from header"
        );
    }

    let mut raw = Vec::with_capacity(chain.len() * sectors.sector_size());
    for &id in &chain {
        sectors.append_sector(id, &mut raw)?;
    }
    let ssat = AllocationTable::new(header.decoder().read_i32_array(&raw)?);
    debug!(ssat_sectors = chain.len(), entries = ssat.len(), "loaded SSAT");
    Ok(ssat)
}
