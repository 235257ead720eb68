//! In-memory container images for tests.
//!
//! The builder lays out, in this order: long streams, the mini stream,
//! the SSAT, the directory, the SAT and finally any DIFAT sectors. Each
//! storage's children get a balanced tree whose in-order walk is the
//! insertion order.

use super::consts::*;
use crate::common::binary::ByteOrder;

struct Node {
    name: String,
    kind: u8,
    data: Vec<u8>,
    children: Vec<usize>,
    declared: Option<u64>,
}

pub(crate) struct ImageBuilder {
    order: ByteOrder,
    sector_shift: u16,
    mini_sector_shift: u16,
    cutoff: u32,
    header_difat_slots: usize,
    nodes: Vec<Node>,
}

/// A built image plus the layout needed to corrupt it on purpose.
pub(crate) struct Image {
    pub bytes: Vec<u8>,
    pub order: ByteOrder,
    pub sector_size: usize,
    pub header_region: usize,
    pub sat_sectors: Vec<u32>,
    pub difat_sectors: Vec<u32>,
    pub first_dir_sector: i32,
}

pub(crate) const ROOT: usize = 0;

fn encode_i32(order: ByteOrder, value: i32) -> [u8; 4] {
    match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    }
}

fn put_u16(order: ByteOrder, buf: &mut [u8], at: usize, value: u16) {
    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    buf[at..at + 2].copy_from_slice(&bytes);
}

fn put_i32(order: ByteOrder, buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&encode_i32(order, value));
}

fn put_u64(order: ByteOrder, buf: &mut [u8], at: usize, value: u64) {
    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };
    buf[at..at + 8].copy_from_slice(&bytes);
}

fn ids_to_bytes(order: ByteOrder, ids: &[i32]) -> Vec<u8> {
    ids.iter().flat_map(|&id| encode_i32(order, id)).collect()
}

/// Append `data` as a chain of whole units and return its first index.
fn allocate(units: &mut Vec<u8>, table: &mut Vec<i32>, unit: usize, data: &[u8]) -> i32 {
    if data.is_empty() {
        return ENDOFCHAIN;
    }
    let first = table.len();
    let count = data.len().div_ceil(unit);
    for i in 0..count {
        let chunk = &data[i * unit..((i + 1) * unit).min(data.len())];
        units.extend_from_slice(chunk);
        units.resize(units.len() + unit - chunk.len(), 0);
        table.push(if i + 1 == count {
            ENDOFCHAIN
        } else {
            (first + i + 1) as i32
        });
    }
    first as i32
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            order: ByteOrder::Little,
            sector_shift: 9,
            mini_sector_shift: 6,
            cutoff: 4096,
            header_difat_slots: HEADER_DIFAT_SLOTS,
            nodes: vec![Node {
                name: "Root Entry".to_string(),
                kind: STGTY_ROOT,
                data: Vec::new(),
                children: Vec::new(),
                declared: None,
            }],
        }
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn sector_shift(mut self, shift: u16) -> Self {
        self.sector_shift = shift;
        self
    }

    pub fn cutoff(mut self, cutoff: u32) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Use fewer than 109 header slots so the rest spill into DIFAT sectors.
    pub fn header_difat_slots(mut self, slots: usize) -> Self {
        self.header_difat_slots = slots.min(HEADER_DIFAT_SLOTS);
        self
    }

    pub fn add_node(&mut self, parent: usize, name: &str, kind: u8, data: &[u8]) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            data: data.to_vec(),
            children: Vec::new(),
            declared: None,
        });
        self.nodes[parent].children.push(index);
        index
    }

    pub fn add_stream(&mut self, parent: usize, name: &str, data: &[u8]) -> usize {
        self.add_node(parent, name, STGTY_STREAM, data)
    }

    pub fn add_storage(&mut self, parent: usize, name: &str) -> usize {
        self.add_node(parent, name, STGTY_STORAGE, &[])
    }

    /// Record a size different from the stream's actual data.
    pub fn declare_size(&mut self, node: usize, size: u64) {
        self.nodes[node].declared = Some(size);
    }

    pub fn build(&self) -> Image {
        let order = self.order;
        let sector_size = 1usize << self.sector_shift;
        let mini_sector_size = 1usize << self.mini_sector_shift;
        let ids_per_sector = sector_size / 4;

        let mut body = Vec::new();
        let mut sat: Vec<i32> = Vec::new();
        let mut mini = Vec::new();
        let mut ssat: Vec<i32> = Vec::new();
        let mut starts = vec![ENDOFCHAIN; self.nodes.len()];
        let mut sizes = vec![0u64; self.nodes.len()];

        for (index, node) in self.nodes.iter().enumerate().skip(1) {
            if node.kind == STGTY_STREAM && (node.data.len() as u64) < self.cutoff as u64 {
                if !node.data.is_empty() {
                    mini.resize(mini.len().div_ceil(mini_sector_size) * mini_sector_size, 0);
                    let first = ssat.len();
                    let count = node.data.len().div_ceil(mini_sector_size);
                    mini.extend_from_slice(&node.data);
                    for i in 0..count {
                        ssat.push(if i + 1 == count {
                            ENDOFCHAIN
                        } else {
                            (first + i + 1) as i32
                        });
                    }
                    starts[index] = first as i32;
                }
            } else {
                starts[index] = allocate(&mut body, &mut sat, sector_size, &node.data);
            }
            sizes[index] = node.data.len() as u64;
        }

        // Root entry: the mini stream container
        starts[ROOT] = allocate(&mut body, &mut sat, sector_size, &mini);
        sizes[ROOT] = mini.len() as u64;
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(size) = node.declared {
                sizes[index] = size;
            }
        }

        let mut first_ssat = ENDOFCHAIN;
        let mut num_ssat = 0;
        if !ssat.is_empty() {
            let mut ids = ssat.clone();
            ids.resize(ids.len().div_ceil(ids_per_sector) * ids_per_sector, FREESECT);
            num_ssat = ids.len() / ids_per_sector;
            first_ssat = allocate(&mut body, &mut sat, sector_size, &ids_to_bytes(order, &ids));
        }

        let directory = self.directory_bytes(&starts, &sizes, sector_size);
        let first_dir_sector = allocate(&mut body, &mut sat, sector_size, &directory);

        // Size the SAT so it also covers its own sectors and the DIFAT
        let data_sectors = sat.len();
        let slots = self.header_difat_slots;
        let (num_sat, num_difat) = (1..)
            .map(|fat: usize| {
                let spill = fat.saturating_sub(slots);
                (fat, spill.div_ceil(ids_per_sector - 1))
            })
            .find(|&(fat, difat)| fat * ids_per_sector >= data_sectors + fat + difat)
            .expect("SAT size converges");

        let sat_sectors: Vec<u32> = (0..num_sat).map(|i| (data_sectors + i) as u32).collect();
        let difat_sectors: Vec<u32> = (0..num_difat)
            .map(|i| (data_sectors + num_sat + i) as u32)
            .collect();
        sat.extend(std::iter::repeat_n(FATSECT, num_sat));
        sat.extend(std::iter::repeat_n(DIFSECT, num_difat));
        sat.resize(num_sat * ids_per_sector, FREESECT);
        body.extend(ids_to_bytes(order, &sat));

        let spilled: Vec<i32> = sat_sectors.iter().skip(slots).map(|&id| id as i32).collect();
        for (i, &id) in difat_sectors.iter().enumerate() {
            let mut ids: Vec<i32> = spilled
                .iter()
                .skip(i * (ids_per_sector - 1))
                .take(ids_per_sector - 1)
                .copied()
                .collect();
            ids.resize(ids_per_sector - 1, FREESECT);
            ids.push(
                difat_sectors
                    .get(i + 1)
                    .map_or(ENDOFCHAIN, |&next| next as i32),
            );
            debug_assert_eq!(body.len(), id as usize * sector_size);
            body.extend(ids_to_bytes(order, &ids));
        }

        let header_region = HEADER_SIZE.max(sector_size);
        let mut header = vec![0u8; header_region];
        header[..8].copy_from_slice(MAGIC);
        header[OFFSET_BYTE_ORDER..OFFSET_BYTE_ORDER + 2].copy_from_slice(&order.mark());
        put_u16(order, &mut header, OFFSET_MINOR_VERSION, 0x3E);
        put_u16(order, &mut header, OFFSET_MAJOR_VERSION, if sector_size == 4096 { 4 } else { 3 });
        put_u16(order, &mut header, OFFSET_SECTOR_SHIFT, self.sector_shift);
        put_u16(order, &mut header, OFFSET_MINI_SECTOR_SHIFT, self.mini_sector_shift);
        put_i32(order, &mut header, OFFSET_NUM_SAT_SECTORS, num_sat as i32);
        put_i32(order, &mut header, OFFSET_FIRST_DIR_SECTOR, first_dir_sector);
        put_i32(order, &mut header, OFFSET_MINI_STREAM_CUTOFF, self.cutoff as i32);
        put_i32(order, &mut header, OFFSET_FIRST_SSAT_SECTOR, first_ssat);
        put_i32(order, &mut header, OFFSET_NUM_SSAT_SECTORS, num_ssat as i32);
        put_i32(
            order,
            &mut header,
            OFFSET_FIRST_DIFAT_SECTOR,
            difat_sectors.first().map_or(ENDOFCHAIN, |&id| id as i32),
        );
        put_i32(order, &mut header, OFFSET_NUM_DIFAT_SECTORS, num_difat as i32);
        for slot in 0..HEADER_DIFAT_SLOTS {
            let id = if slot < slots {
                sat_sectors.get(slot).map_or(FREESECT, |&id| id as i32)
            } else {
                FREESECT
            };
            put_i32(order, &mut header, OFFSET_HEADER_DIFAT + slot * 4, id);
        }

        let mut bytes = header;
        bytes.extend(body);
        Image {
            bytes,
            order,
            sector_size,
            header_region,
            sat_sectors,
            difat_sectors,
            first_dir_sector,
        }
    }

    fn directory_bytes(&self, starts: &[i32], sizes: &[u64], sector_size: usize) -> Vec<u8> {
        let order = self.order;
        let count = self.nodes.len();
        let mut left = vec![NOSTREAM; count];
        let mut right = vec![NOSTREAM; count];
        let mut child = vec![NOSTREAM; count];

        fn link(children: &[usize], left: &mut [i32], right: &mut [i32]) -> i32 {
            if children.is_empty() {
                return NOSTREAM;
            }
            let mid = children.len() / 2;
            let node = children[mid];
            left[node] = link(&children[..mid], left, right);
            right[node] = link(&children[mid + 1..], left, right);
            node as i32
        }
        for (index, node) in self.nodes.iter().enumerate() {
            child[index] = link(&node.children, &mut left, &mut right);
        }

        let per_sector = sector_size / DIRENTRY_SIZE;
        let records = count.div_ceil(per_sector.max(1)) * per_sector.max(1);
        let mut out = vec![0u8; records * DIRENTRY_SIZE];
        for record in 0..records {
            let buf = &mut out[record * DIRENTRY_SIZE..(record + 1) * DIRENTRY_SIZE];
            for offset in [OFFSET_ENTRY_LEFT, OFFSET_ENTRY_RIGHT, OFFSET_ENTRY_CHILD] {
                put_i32(order, buf, offset, NOSTREAM);
            }
            let Some(node) = self.nodes.get(record) else {
                continue;
            };
            let units: Vec<u16> = node.name.encode_utf16().take(31).collect();
            for (i, &unit) in units.iter().enumerate() {
                put_u16(order, buf, i * 2, unit);
            }
            put_u16(order, buf, OFFSET_ENTRY_NAME_LEN, ((units.len() + 1) * 2) as u16);
            buf[OFFSET_ENTRY_TYPE] = node.kind;
            buf[OFFSET_ENTRY_COLOR] = COLOR_BLACK;
            put_i32(order, buf, OFFSET_ENTRY_LEFT, left[record]);
            put_i32(order, buf, OFFSET_ENTRY_RIGHT, right[record]);
            put_i32(order, buf, OFFSET_ENTRY_CHILD, child[record]);
            put_i32(order, buf, OFFSET_ENTRY_START, starts[record]);
            put_u64(order, buf, OFFSET_ENTRY_SIZE, sizes[record]);
        }
        out
    }
}

impl Image {
    /// Overwrite one SAT entry in place.
    pub fn set_sat_entry(&mut self, index: usize, value: i32) {
        let ids_per_sector = self.sector_size / 4;
        let sector = self.sat_sectors[index / ids_per_sector] as usize;
        let at = self.header_region + sector * self.sector_size + (index % ids_per_sector) * 4;
        self.bytes[at..at + 4].copy_from_slice(&encode_i32(self.order, value));
    }

    /// Overwrite one i32 field of the header block.
    pub fn set_header_field(&mut self, offset: usize, value: i32) {
        self.bytes[offset..offset + 4].copy_from_slice(&encode_i32(self.order, value));
    }

    /// Overwrite slot `slot` of the `index`-th DIFAT sector. The last slot
    /// is the link to the next DIFAT sector.
    pub fn set_difat_entry(&mut self, index: usize, slot: usize, value: i32) {
        let sector = self.difat_sectors[index] as usize;
        let at = self.header_region + sector * self.sector_size + slot * 4;
        self.bytes[at..at + 4].copy_from_slice(&encode_i32(self.order, value));
    }

    /// Overwrite one i32 field of a directory record in the first
    /// directory sector.
    pub fn set_entry_field(&mut self, sid: usize, offset: usize, value: i32) {
        let at = self.header_region
            + self.first_dir_sector as usize * self.sector_size
            + sid * DIRENTRY_SIZE
            + offset;
        self.bytes[at..at + 4].copy_from_slice(&encode_i32(self.order, value));
    }
}
