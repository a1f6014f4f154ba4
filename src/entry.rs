//! SMBIOS and DMI entry points: detection, validation and the table
//! coordinates they announce.

use std::fmt;

use bytes::Buf;

use crate::util::checksum;
use crate::{Error, ErrorKind, Result};

/// The offset at which binary dumps store the structure table.
pub const DUMP_TABLE_OFFSET: u64 = 32;

/// The newest SMBIOS version whose structures are fully decoded.
pub const SUPPORTED_VERSION: Version = Version {
    major: 3,
    minor: 2,
    revision: 0,
};

/// An SMBIOS specification version. Versions order by major, minor, then
/// revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl Version {
    /// Creates a Version from its components.
    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Version {
            major,
            minor,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Where a structure table lives and what it should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    /// Physical address of the table.
    pub address: u64,

    /// Announced table length in bytes; a maximum for SMBIOS 3 entry points.
    pub length: u32,

    /// Announced number of structures, or 0 when not announced.
    pub count: u16,

    /// The SMBIOS version in effect, after fixups.
    pub version: Version,

    /// Stop walking at the End of Table structure.
    pub stop_at_eot: bool,
}

/// Provides access to common information for SMBIOS entry points, including the
/// SMBIOS version in use and the location and size of the SMBIOS table in
/// system memory.
pub trait EntryPoint {
    /// Provides the address of the SMBIOS table in system memory and its size
    /// in bytes.
    fn table(&self) -> (u64, u32);

    /// Provides the SMBIOS version announced by this entry point.
    fn version(&self) -> Version;

    /// Provides the number of structures in the table, or 0 if the entry
    /// point does not announce it.
    fn structure_count(&self) -> u16;
}

/// Possible entry point types and their contained structures.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryPointType {
    /// A 32-bit SMBIOS 2.x entry point.
    Bits32(Bits32),

    /// A 64-bit SMBIOS 3.x entry point.
    Bits64(Bits64),

    /// A legacy DMI entry point without an SMBIOS header.
    Legacy(Legacy),
}

impl EntryPointType {
    /// Returns the entry point behind this type.
    pub fn entry_point(&self) -> &dyn EntryPoint {
        match *self {
            EntryPointType::Bits32(ref ep) => ep,
            EntryPointType::Bits64(ref ep) => ep,
            EntryPointType::Legacy(ref ep) => ep,
        }
    }

    /// Returns the coordinates of the structure table.
    pub fn table_info(&self) -> TableInfo {
        let ep = self.entry_point();
        let (address, length) = ep.table();

        TableInfo {
            address,
            length,
            count: ep.structure_count(),
            version: ep.version(),
            stop_at_eot: match *self {
                EntryPointType::Bits64(_) => true,
                _ => false,
            },
        }
    }

    /// Returns the "present" line announcing this entry point.
    pub fn banner(&self) -> String {
        let v = self.entry_point().version();
        match *self {
            EntryPointType::Bits64(_) => {
                format!("SMBIOS {}.{}.{} present.", v.major, v.minor, v.revision)
            }
            EntryPointType::Bits32(_) => format!("SMBIOS {}.{} present.", v.major, v.minor),
            EntryPointType::Legacy(_) => format!("Legacy DMI {}.{} present.", v.major, v.minor),
        }
    }

    /// Returns a copy of the raw entry point `buf` with its table address
    /// changed to `address` and its checksums recomputed, as stored at the
    /// start of a binary dump.
    pub fn relocated(&self, buf: &[u8], address: u64) -> Vec<u8> {
        match *self {
            EntryPointType::Bits64(ref ep) => {
                let mut out = buf[..usize::from(ep.length)].to_vec();
                out[0x10..0x18].copy_from_slice(&address.to_le_bytes());
                fix_checksum(&mut out, 0x05);
                out
            }
            EntryPointType::Bits32(ref ep) => {
                let length = usize::from(ep.length);
                let mut out = buf[..length.max(0x1f)].to_vec();
                out[0x18..0x1c].copy_from_slice(&(address as u32).to_le_bytes());
                fix_checksum(&mut out[0x10..0x1f], 0x05);
                if length > 0x04 {
                    fix_checksum(&mut out[..length], 0x04);
                }
                out
            }
            EntryPointType::Legacy(_) => {
                let mut out = buf[..0x0f].to_vec();
                out[0x08..0x0c].copy_from_slice(&(address as u32).to_le_bytes());
                fix_checksum(&mut out, 0x05);
                out
            }
        }
    }
}

// Sets buf[at] so the whole buffer sums to zero.
fn fix_checksum(buf: &mut [u8], at: usize) {
    buf[at] = 0;
    let sum = buf.iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
    buf[at] = 0u8.wrapping_sub(sum);
}

/// Parses and validates the entry point at the start of `buf`.
///
/// `buf` may extend past the entry point, as when scanning memory, or be
/// exactly as long as it, as when read from sysfs.
pub fn parse_entry_point(buf: &[u8]) -> Result<EntryPointType> {
    if buf.starts_with(b"_SM3_") {
        return Ok(EntryPointType::Bits64(parse_64bit(buf)?));
    }

    if buf.starts_with(b"_SM_") {
        return Ok(EntryPointType::Bits32(parse_32bit(buf)?));
    }

    if buf.starts_with(b"_DMI_") {
        return Ok(EntryPointType::Legacy(parse_legacy(buf)?));
    }

    Err(Error::Internal(ErrorKind::EntryPointNotFound))
}

impl EntryPoint for Bits32 {
    fn table(&self) -> (u64, u32) {
        (
            u64::from(self.structure_table_address),
            u32::from(self.structure_table_length),
        )
    }

    fn version(&self) -> Version {
        Version::new(self.major, self.minor, 0)
    }

    fn structure_count(&self) -> u16 {
        self.number_structures
    }
}

/// Contains the information found in a 32-bit SMBIOS entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Bits32 {
    pub checksum: u8,
    pub length: u8,
    pub major: u8,
    pub minor: u8,
    pub max_structure_size: u16,
    pub entry_point_revision: u8,
    pub formatted_area: [u8; 5],
    pub intermediate_checksum: u8,
    pub structure_table_length: u16,
    pub structure_table_address: u32,
    pub number_structures: u16,
    pub bcd_revision: u8,
}

fn parse_32bit(buf: &[u8]) -> Result<Bits32> {
    // Some firmware announces a length too short to cover the intermediate
    // anchor; only the announced bytes are checksummed, but all 0x1F are read.
    if buf.len() < 0x1f {
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    let length = buf[0x05];
    if length > 0x20 {
        warn!(
            "Entry point length too large ({} bytes, expected {}).",
            length, 0x1f
        );
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    if buf.len() < usize::from(length) {
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    if !checksum(&buf[..usize::from(length)])
        || &buf[0x10..0x15] != b"_DMI_"
        || !checksum(&buf[0x10..0x1f])
    {
        return Err(Error::Internal(ErrorKind::BadChecksum));
    }

    let mut cursor = &buf[..0x1f];

    // Skip the anchor string.
    cursor.advance(4);

    let checksum = cursor.get_u8();
    let length = cursor.get_u8();
    let mut major = cursor.get_u8();
    let mut minor = cursor.get_u8();
    let max_structure_size = cursor.get_u16_le();
    let entry_point_revision = cursor.get_u8();

    let mut formatted_area = [0; 5];
    cursor.copy_to_slice(&mut formatted_area);

    // Skip the intermediate anchor string.
    cursor.advance(5);

    let intermediate_checksum = cursor.get_u8();
    let structure_table_length = cursor.get_u16_le();
    let structure_table_address = cursor.get_u32_le();
    let number_structures = cursor.get_u16_le();
    let bcd_revision = cursor.get_u8();

    // Some BIOS vendors report the version in decimal.
    let fixed = match (major, minor) {
        (2, 0x1f) | (2, 0x21) => Some(3),
        (2, 0x33) => Some(6),
        _ => None,
    };
    if let Some(fixed) = fixed {
        warn!("SMBIOS version fixup (2.{} -> 2.{}).", minor, fixed);
        major = 2;
        minor = fixed;
    }

    Ok(Bits32 {
        checksum,
        length,
        major,
        minor,
        max_structure_size,
        entry_point_revision,
        formatted_area,
        intermediate_checksum,
        structure_table_length,
        structure_table_address,
        number_structures,
        bcd_revision,
    })
}

impl EntryPoint for Bits64 {
    fn table(&self) -> (u64, u32) {
        (self.structure_table_address, self.structure_table_max_size)
    }

    fn version(&self) -> Version {
        Version::new(self.major, self.minor, self.revision)
    }

    fn structure_count(&self) -> u16 {
        0
    }
}

/// Contains the information found in a 64-bit SMBIOS entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Bits64 {
    pub checksum: u8,
    pub length: u8,
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    pub entry_point_revision: u8,
    pub reserved: u8,
    pub structure_table_max_size: u32,
    pub structure_table_address: u64,
}

fn parse_64bit(buf: &[u8]) -> Result<Bits64> {
    if buf.len() < 0x18 {
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    let length = buf[0x06];
    if length > 0x20 {
        warn!(
            "Entry point length too large ({} bytes, expected {}).",
            length, 0x18
        );
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    if length < 0x18 || buf.len() < usize::from(length) {
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    if !checksum(&buf[..usize::from(length)]) {
        return Err(Error::Internal(ErrorKind::BadChecksum));
    }

    let mut cursor = &buf[..0x18];

    // Skip the anchor string.
    cursor.advance(5);

    Ok(Bits64 {
        checksum: cursor.get_u8(),
        length: cursor.get_u8(),
        major: cursor.get_u8(),
        minor: cursor.get_u8(),
        revision: cursor.get_u8(),
        entry_point_revision: cursor.get_u8(),
        reserved: cursor.get_u8(),
        structure_table_max_size: cursor.get_u32_le(),
        structure_table_address: cursor.get_u64_le(),
    })
}

impl EntryPoint for Legacy {
    fn table(&self) -> (u64, u32) {
        (
            u64::from(self.structure_table_address),
            u32::from(self.structure_table_length),
        )
    }

    fn version(&self) -> Version {
        Version::new(self.bcd_revision >> 4, self.bcd_revision & 0x0f, 0)
    }

    fn structure_count(&self) -> u16 {
        self.number_structures
    }
}

/// Contains the information found in a legacy DMI entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Legacy {
    pub checksum: u8,
    pub structure_table_length: u16,
    pub structure_table_address: u32,
    pub number_structures: u16,
    pub bcd_revision: u8,
}

fn parse_legacy(buf: &[u8]) -> Result<Legacy> {
    if buf.len() < 0x0f {
        return Err(Error::Internal(ErrorKind::InvalidEntryPoint));
    }

    if !checksum(&buf[..0x0f]) {
        return Err(Error::Internal(ErrorKind::BadChecksum));
    }

    let mut cursor = &buf[..0x0f];

    // Skip the anchor string.
    cursor.advance(5);

    Ok(Legacy {
        checksum: cursor.get_u8(),
        structure_table_length: cursor.get_u16_le(),
        structure_table_address: cursor.get_u32_le(),
        number_structures: cursor.get_u16_le(),
        bcd_revision: cursor.get_u8(),
    })
}

/// Scans a copy of the 0xF0000-0xFFFFF BIOS area for an entry point,
/// preferring SMBIOS 3 over SMBIOS 2 and legacy DMI.
///
/// Returns the offset of the entry point within `mem` along with it.
pub fn find_entry_point(mem: &[u8]) -> Result<(usize, EntryPointType)> {
    // Candidates must leave room for a 32 byte entry point.
    let last = mem.len().saturating_sub(0x20);

    for offset in (0..=last).step_by(PARAGRAPH_SIZE) {
        if mem[offset..].starts_with(b"_SM3_") {
            match parse_64bit(&mem[offset..]) {
                Ok(ep) => return Ok((offset, EntryPointType::Bits64(ep))),
                Err(err) => debug!("skipping SMBIOS 3 anchor at {:#x}: {}", offset, err),
            }
        }
    }

    let mut offset = 0;
    while offset + 0x10 <= mem.len() {
        let candidate = &mem[offset..];

        if offset <= last && candidate.starts_with(b"_SM_") {
            match parse_32bit(candidate) {
                Ok(ep) => return Ok((offset, EntryPointType::Bits32(ep))),
                Err(err) => debug!("skipping SMBIOS anchor at {:#x}: {}", offset, err),
            }
        } else if candidate.starts_with(b"_DMI_") {
            match parse_legacy(candidate) {
                Ok(ep) => return Ok((offset, EntryPointType::Legacy(ep))),
                Err(err) => debug!("skipping DMI anchor at {:#x}: {}", offset, err),
            }
        }

        offset += PARAGRAPH_SIZE;
    }

    Err(Error::Internal(ErrorKind::EntryPointNotFound))
}

/// The physical address at which the entry point scan starts.
pub const START_ADDRESS: u64 = 0x000f_0000;

/// The size of the entry point scan window.
pub const SCAN_LENGTH: usize = 0x1_0000;

const PARAGRAPH_SIZE: usize = 16;
