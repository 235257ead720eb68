//! Human-readable dumps of container control information.

use super::directory::{DirectoryEntry, NodeColor};
use super::file::OleStorage;
use std::fmt::Write as _;
use std::io::{self, Read, Seek, Write};

/// Space-separated upper-case hex codes, e.g. `D0 CF 11 `.
pub fn show_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for byte in bytes {
        let _ = write!(out, "{:02X} ", byte);
    }
    out
}

/// Printable ASCII as is, everything else as a `<XX>` code token.
pub fn show_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if (32..=126).contains(&code) {
            out.push(ch);
        } else {
            let _ = write!(out, "<{:02X}>", code);
        }
    }
    out
}

/// Format CLSID as a human-readable string
///
/// All-zero CLSIDs format as an empty string.
pub fn format_clsid(bytes: &[u8; 16]) -> String {
    if bytes.iter().all(|&b| b == 0) {
        return String::new();
    }

    // Format as: XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX
    format!(
        "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u16::from_le_bytes([bytes[4], bytes[5]]),
        u16::from_le_bytes([bytes[6], bytes[7]]),
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15],
    )
}

fn dump_entry(out: &mut impl Write, entry: &DirectoryEntry) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(70))?;
    writeln!(out, "        sid: {}", entry.sid)?;
    writeln!(out, "       name: {}", show_unicode(&entry.name))?;
    writeln!(out, "       type: {}", entry.kind.raw())?;
    let color = match entry.color {
        NodeColor::Red => "red",
        NodeColor::Black => "black",
    };
    writeln!(out, "      color: {}", color)?;
    writeln!(out, "       left: {}", link(entry.left))?;
    writeln!(out, "      right: {}", link(entry.right))?;
    writeln!(out, "       root: {}", link(entry.child))?;
    let clsid = format_clsid(&entry.clsid);
    if !clsid.is_empty() {
        writeln!(out, "      clsid: {}", clsid)?;
    }
    writeln!(out, "      start: {}", entry.start_sector)?;
    writeln!(out, "       size: {}", entry.size)
}

fn link(sid: Option<u32>) -> String {
    sid.map_or_else(|| "-1".to_string(), |sid| sid.to_string())
}

impl<R: Read + Seek> OleStorage<R> {
    /// Write the header fields, table sizes and every directory entry.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        let header = self.header();
        writeln!(out, "   magic ID: {}", show_bytes(super::consts::MAGIC))?;
        writeln!(out, "        UID: {}", show_bytes(&header.clsid))?;
        writeln!(out, "   revision: {}", header.minor_version)?;
        writeln!(out, "    version: {}", header.major_version)?;
        writeln!(out, " byte order: {}", header.byte_order)?;
        writeln!(out, "sector size: {}", header.sector_size())?;
        writeln!(out, "   short ss: {}", header.mini_sector_size())?;
        writeln!(out, " stab sects: {}", header.num_sat_sectors)?;
        writeln!(out, "  dir start: {}", header.first_dir_sector)?;
        writeln!(out, "  min ssize: {}", header.mini_stream_cutoff)?;
        writeln!(out, " first ssts: {}", header.first_ssat_sector)?;
        writeln!(out, "   num ssts: {}", header.num_ssat_sectors)?;
        writeln!(out, "  first mts: {}", header.first_difat_sector)?;
        writeln!(out, "    num mts: {}", header.num_difat_sectors)?;
        writeln!(out, "    sectors: {}", header.sector_count)?;
        writeln!(out, "   sat size: {}", self.sat().len())?;
        writeln!(out, "  ssat size: {}", self.ssat().len())?;
        writeln!(out, "    dir len: {}", self.directory().len())?;
        for entry in self.directory().entries() {
            dump_entry(out, entry)?;
        }
        Ok(())
    }
}
