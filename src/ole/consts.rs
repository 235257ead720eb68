/// Magic bytes that should be at the beginning of every OLE file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the on-disk header block in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Default sector size for version 3 (512 bytes)
pub const SECTOR_SIZE_V3: usize = 512;

/// Number of SAT sector slots embedded in the header (at offset 0x4C)
pub const HEADER_DIFAT_SLOTS: usize = 109;

/// Smallest accepted sector shift (128-byte sectors)
pub const MIN_SECTOR_SHIFT: u16 = 7;
/// Largest accepted sector shift (64 KiB sectors)
pub const MAX_SECTOR_SHIFT: u16 = 16;
/// Smallest accepted mini sector shift
pub const MIN_MINI_SECTOR_SHIFT: u16 = 2;

/// Fewest sectors a container may hold after its header region
pub const MIN_SECTOR_COUNT: u64 = 2;

// Header field offsets
pub const OFFSET_CLSID: usize = 0x08;
pub const OFFSET_MINOR_VERSION: usize = 0x18;
pub const OFFSET_MAJOR_VERSION: usize = 0x1A;
pub const OFFSET_BYTE_ORDER: usize = 0x1C;
pub const OFFSET_SECTOR_SHIFT: usize = 0x1E;
pub const OFFSET_MINI_SECTOR_SHIFT: usize = 0x20;
pub const OFFSET_NUM_SAT_SECTORS: usize = 0x2C;
pub const OFFSET_FIRST_DIR_SECTOR: usize = 0x30;
pub const OFFSET_MINI_STREAM_CUTOFF: usize = 0x38;
pub const OFFSET_FIRST_SSAT_SECTOR: usize = 0x3C;
pub const OFFSET_NUM_SSAT_SECTORS: usize = 0x40;
pub const OFFSET_FIRST_DIFAT_SECTOR: usize = 0x44;
pub const OFFSET_NUM_DIFAT_SECTORS: usize = 0x48;
pub const OFFSET_HEADER_DIFAT: usize = 0x4C;

// Sector IDs, stored signed as they are on disk
/// Unallocated sector
pub const FREESECT: i32 = -1;
/// End of a virtual stream chain
pub const ENDOFCHAIN: i32 = -2;
/// Denotes a SAT sector in the SAT
pub const FATSECT: i32 = -3;
/// Denotes a DIFAT sector in the SAT
pub const DIFSECT: i32 = -4;

/// Unallocated directory entry / empty tree link
pub const NOSTREAM: i32 = -1;

// Object types in storage
/// Empty directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is an ILockBytes object
pub const STGTY_LOCKBYTES: u8 = 3;
/// Element is an IPropertyStorage object
pub const STGTY_PROPERTY: u8 = 4;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Node colors of the directory red-black trees
pub const COLOR_RED: u8 = 0;
pub const COLOR_BLACK: u8 = 1;

// Directory entry field offsets
pub const ENTRY_NAME_LEN: usize = 64;
pub const OFFSET_ENTRY_NAME_LEN: usize = 0x40;
pub const OFFSET_ENTRY_TYPE: usize = 0x42;
pub const OFFSET_ENTRY_COLOR: usize = 0x43;
pub const OFFSET_ENTRY_LEFT: usize = 0x44;
pub const OFFSET_ENTRY_RIGHT: usize = 0x48;
pub const OFFSET_ENTRY_CHILD: usize = 0x4C;
pub const OFFSET_ENTRY_CLSID: usize = 0x50;
pub const OFFSET_ENTRY_STATE_BITS: usize = 0x60;
pub const OFFSET_ENTRY_CREATED: usize = 0x64;
pub const OFFSET_ENTRY_MODIFIED: usize = 0x6C;
pub const OFFSET_ENTRY_START: usize = 0x74;
pub const OFFSET_ENTRY_SIZE: usize = 0x78;
