//! Configuration for a decode pass.

use std::fmt;
use std::path::PathBuf;

use crate::{Error, ErrorKind, Result};

/// The physical memory device read when no firmware file interface exists.
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";

/// Controls what a decode pass reads and what it displays.
#[derive(Debug, Clone)]
pub struct Options {
    /// The device or file read for physical memory.
    pub devmem: PathBuf,

    /// Suppresses banners, handle lines, references and unknown structures.
    pub quiet: bool,

    /// Dumps every structure as hex instead of decoding it.
    pub dump: bool,

    /// Restricts output to the listed structure types.
    pub types: Option<TypeFilter>,

    /// Restricts output to the structure with this handle.
    pub handle: Option<u16>,

    /// Prints a single string field instead of decoded structures.
    pub string: Option<StringQuery>,

    /// Skips the sysfs firmware tables and scans memory directly.
    pub no_sysfs: bool,

    /// Reads the entry point and table from a binary dump file.
    pub from_dump: Option<PathBuf>,

    /// Writes the entry point and table to a binary dump file.
    pub dump_bin: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            devmem: PathBuf::from(DEFAULT_MEM_DEVICE),
            quiet: false,
            dump: false,
            types: None,
            handle: None,
            string: None,
            no_sysfs: false,
            from_dump: None,
            dump_bin: None,
        }
    }
}

impl Options {
    /// Reports whether a structure of `header_type` with `handle` should be
    /// displayed.
    pub fn displays(&self, header_type: u8, handle: u16) -> bool {
        if let Some(ref types) = self.types {
            if !types.contains(header_type) {
                return false;
            }
        }

        if let Some(want) = self.handle {
            if want != handle {
                return false;
            }
        }

        // Inactive and end-of-table markers carry no information.
        if self.quiet && (header_type == 126 || header_type == 127) {
            return false;
        }

        self.string.is_none()
    }
}

/// Type keywords accepted by TypeFilter::parse and the structure types they
/// stand for.
pub const TYPE_KEYWORDS: &[(&str, &[u8])] = &[
    ("bios", &[0, 13]),
    ("system", &[1, 12, 15, 23, 32]),
    ("baseboard", &[2, 10, 41]),
    ("chassis", &[3]),
    ("processor", &[4]),
    ("memory", &[5, 6, 16, 17]),
    ("cache", &[7]),
    ("connector", &[8]),
    ("slot", &[9]),
];

/// A set of structure types to display.
#[derive(Clone)]
pub struct TypeFilter([bool; 256]);

impl TypeFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        TypeFilter([false; 256])
    }

    /// Adds `header_type` to the filter.
    pub fn insert(&mut self, header_type: u8) {
        self.0[usize::from(header_type)] = true;
    }

    /// Reports whether `header_type` is part of the filter.
    pub fn contains(&self, header_type: u8) -> bool {
        self.0[usize::from(header_type)]
    }

    /// Adds the types named by `arg` to the filter: a type keyword, or
    /// numbers from 0 to 255 separated by commas or spaces.
    pub fn parse(&mut self, arg: &str) -> Result<()> {
        let arg = arg.trim();

        if let Some(&(_, types)) = TYPE_KEYWORDS.iter().find(|(k, _)| k.eq_ignore_ascii_case(arg)) {
            for &t in types {
                self.insert(t);
            }
            return Ok(());
        }

        let mut any = false;
        for part in arg.split(|c| c == ',' || c == ' ').filter(|p| !p.is_empty()) {
            let t = parse_number(part)
                .filter(|&n| n <= 0xff)
                .ok_or_else(|| invalid(format!("invalid type keyword: {}", part)))?;

            self.insert(t as u8);
            any = true;
        }

        if !any {
            return Err(invalid(format!("invalid type keyword: {}", arg)));
        }

        Ok(())
    }
}

impl Default for TypeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set()
            .entries((0..=255u8).filter(|&t| self.contains(t)))
            .finish()
    }
}

/// A single string field selected for display across all matching
/// structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringQuery {
    /// The keyword naming the field, if selected by keyword.
    pub keyword: Option<&'static str>,

    /// The structure type holding the field.
    pub header_type: u8,

    /// The offset of the field within the structure, or the OEM string
    /// number for type 11.
    pub offset: u8,
}

/// String keywords accepted by StringQuery::keyword, with the structure type
/// and field offset each one reads.
pub const STRING_KEYWORDS: &[(&str, u8, u8)] = &[
    ("bios-vendor", 0, 0x04),
    ("bios-version", 0, 0x05),
    ("bios-release-date", 0, 0x08),
    ("system-manufacturer", 1, 0x04),
    ("system-product-name", 1, 0x05),
    ("system-version", 1, 0x06),
    ("system-serial-number", 1, 0x07),
    ("system-uuid", 1, 0x08),
    ("system-family", 1, 0x1a),
    ("baseboard-manufacturer", 2, 0x04),
    ("baseboard-product-name", 2, 0x05),
    ("baseboard-version", 2, 0x06),
    ("baseboard-serial-number", 2, 0x07),
    ("baseboard-asset-tag", 2, 0x08),
    ("chassis-manufacturer", 3, 0x04),
    ("chassis-type", 3, 0x05),
    ("chassis-version", 3, 0x06),
    ("chassis-serial-number", 3, 0x07),
    ("chassis-asset-tag", 3, 0x08),
    ("processor-family", 4, 0x06),
    ("processor-manufacturer", 4, 0x07),
    ("processor-version", 4, 0x10),
    ("processor-frequency", 4, 0x16),
];

impl StringQuery {
    /// Looks up a string keyword such as "system-uuid".
    pub fn keyword(name: &str) -> Result<Self> {
        STRING_KEYWORDS
            .iter()
            .find(|(k, _, _)| k.eq_ignore_ascii_case(name.trim()))
            .map(|&(k, header_type, offset)| StringQuery {
                keyword: Some(k),
                header_type,
                offset,
            })
            .ok_or_else(|| {
                let valid: Vec<&str> = STRING_KEYWORDS.iter().map(|(k, _, _)| *k).collect();
                invalid(format!(
                    "invalid string keyword: {}\nValid string keywords are:\n  {}",
                    name,
                    valid.join("\n  ")
                ))
            })
    }

    /// Selects OEM string `n` from the OEM Strings structure; 0 selects the
    /// number of OEM strings instead.
    pub fn oem(n: u8) -> Self {
        StringQuery {
            keyword: None,
            header_type: 11,
            offset: n,
        }
    }

    /// Parses an --oem-string argument: a string number from 1 to 255 or
    /// "count".
    pub fn parse_oem(arg: &str) -> Result<Self> {
        if arg.trim().eq_ignore_ascii_case("count") {
            return Ok(Self::oem(0));
        }

        match parse_number(arg) {
            Some(n) if n >= 1 && n <= 0xff => Ok(Self::oem(n as u8)),
            _ => Err(invalid(format!("invalid OEM string number: {}", arg))),
        }
    }
}

/// Parses a decimal or 0x-prefixed hexadecimal number.
pub fn parse_number(arg: &str) -> Option<u32> {
    let arg = arg.trim();
    if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }

    arg.parse().ok()
}

fn invalid(msg: String) -> Error {
    Error::Internal(ErrorKind::InvalidOption(msg))
}
