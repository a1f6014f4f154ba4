//! Decodes System Management BIOS (SMBIOS) and Desktop Management Interface
//! (DMI) tables into human-readable text, along with the legacy BIOS anchor
//! structures found next to them in low memory.
//!
//! A decode pass locates an entry point, reads the structure table it
//! announces and walks it, writing every selected structure to an
//! [`Output`](output/trait.Output.html) sink:
//!
//! ```no_run
//! use dmidecode::options::Options;
//! use dmidecode::output::TextOutput;
//!
//! let stdout = std::io::stdout();
//! let mut out = TextOutput::new(stdout.lock());
//! dmidecode::run(&Options::default(), &mut out)?;
//! out.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

extern crate byteorder;
extern crate bytes;
#[macro_use]
extern crate log;

use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::result;

pub mod biosdecode;
pub mod decode;
pub mod entry;
pub mod memory;
pub mod options;
pub mod output;
pub mod ownership;
pub mod structure;
pub mod table;
pub mod util;
pub mod vpd;

use crate::entry::{EntryPointType, TableInfo};
use crate::memory::{ByteSource, DevMem};
use crate::options::Options;
use crate::output::Output;

/// The version reported in banners and by --version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Specifies the different classes of errors which may occur.
#[derive(Debug)]
pub enum Error {
    /// Indicates an error occurred while performing file I/O.
    Io(io::Error),

    /// Indicates an error produced by this library.
    Internal(ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "IO error: {}", err),
            Error::Internal(ref err) => write!(f, "internal SMBIOS error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Internal(ref err) => Some(err),
        }
    }
}

/// Specifies certain internal error conditions which may occur when dealing
/// with SMBIOS data.
#[derive(Debug)]
pub enum ErrorKind {
    /// No SMBIOS entry point was detected.
    EntryPointNotFound,

    /// An SMBIOS entry point was detected, but it could not be successfully
    /// parsed.
    InvalidEntryPoint,

    /// An entry point failed checksum validation.
    BadChecksum,

    /// A byte source returned fewer bytes than requested.
    ShortRead { wanted: usize, got: usize },

    /// The structure table announced by an entry point could not be read.
    TableUnreadable,

    /// A configuration value could not be parsed.
    InvalidOption(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::EntryPointNotFound => write!(f, "entry point not found"),
            ErrorKind::InvalidEntryPoint => write!(f, "invalid entry point"),
            ErrorKind::BadChecksum => write!(f, "bad checksum"),
            ErrorKind::ShortRead { wanted, got } => {
                write!(f, "short read: wanted {} bytes, got {}", wanted, got)
            }
            ErrorKind::TableUnreadable => write!(f, "structure table unreadable"),
            ErrorKind::InvalidOption(ref msg) => write!(f, "{}", msg),
        }
    }
}

impl error::Error for ErrorKind {
    fn cause(&self) -> Option<&dyn error::Error> {
        None
    }
}

/// A Result type specialized use with for an Error.
pub type Result<T> = result::Result<T, Error>;

// Predetermined locations where SMBIOS information can be found.
const SYS_ENTRY_FILE: &str = "/sys/firmware/dmi/tables/smbios_entry_point";
const SYS_TABLE_FILE: &str = "/sys/firmware/dmi/tables/DMI";
const EFI_SYSTAB_FILES: &[&str] = &["/sys/firmware/efi/systab", "/proc/efi/systab"];

// Entry points never exceed this many bytes.
const ENTRY_POINT_SIZE: usize = 0x20;

/// Where a structure table is read from once its entry point is known.
#[derive(Debug, Clone, Copy)]
enum TableSource<'a> {
    /// Physical memory, at the address the entry point announces.
    Memory,

    /// The sysfs table file, which starts with the table.
    Sysfs,

    /// A binary dump file, at the address the entry point announces.
    Dump(&'a Path),
}

/// Runs one decode pass configured by `opts`, writing everything it finds to
/// `out`.
///
/// Sources are tried in order: a binary dump if requested, then the sysfs
/// firmware tables, then the EFI system table, then a scan of physical
/// memory. Returns whether an entry point was found. Failing to read the
/// table an entry point announces is logged and does not fail the pass.
pub fn run(opts: &Options, out: &mut dyn Output) -> Result<bool> {
    let mut opts = opts.clone();
    if opts.string.is_some() {
        opts.quiet = true;
    }
    let opts = &opts;

    if !opts.quiet {
        out.comment(format_args!("dmidecode {}", VERSION));
    }

    let found = if let Some(ref path) = opts.from_dump {
        from_dump(path, opts, out)?
    } else {
        from_system(opts, out)?
    };

    if !found && !opts.quiet {
        out.comment(format_args!("No SMBIOS nor DMI entry point found, sorry."));
    }

    Ok(found)
}

fn from_dump(path: &Path, opts: &Options, out: &mut dyn Output) -> Result<bool> {
    if !opts.quiet {
        out.info(format_args!(
            "Reading SMBIOS/DMI data from file {}.",
            path.display()
        ));
    }

    let head = memory::read_file(path, 0, ENTRY_POINT_SIZE)?;
    match entry::parse_entry_point(&head) {
        Ok(ep) => decode_entry_point(&ep, &head, TableSource::Dump(path), opts, out),
        Err(err) => {
            debug!("no entry point in {}: {}", path.display(), err);
            Ok(false)
        }
    }
}

fn from_system(opts: &Options, out: &mut dyn Output) -> Result<bool> {
    if !opts.no_sysfs {
        if let Ok(head) = memory::read_file(SYS_ENTRY_FILE, 0, ENTRY_POINT_SIZE) {
            if !opts.quiet {
                out.info(format_args!("Getting SMBIOS data from sysfs."));
            }

            match entry::parse_entry_point(&head) {
                Ok(ep) => {
                    if decode_entry_point(&ep, &head, TableSource::Sysfs, opts, out)? {
                        return Ok(true);
                    }
                }
                Err(err) => debug!("no entry point in {}: {}", SYS_ENTRY_FILE, err),
            }

            if !opts.quiet {
                out.info(format_args!("Failed to get SMBIOS data from sysfs."));
            }
        }
    }

    if let Some((kind, address)) = efi_entry_point()? {
        if !opts.quiet {
            out.comment(format_args!("{} entry point at 0x{:08x}", kind, address));
            out.info(format_args!(
                "Found SMBIOS entry point in EFI, reading table from {}.",
                opts.devmem.display()
            ));
        }

        let head = DevMem::open(&opts.devmem)?.read(address, ENTRY_POINT_SIZE)?;

        // EFI only publishes SMBIOS entry points, never legacy DMI ones.
        return match entry::parse_entry_point(&head) {
            Ok(EntryPointType::Legacy(_)) => Ok(false),
            Ok(ep) => decode_entry_point(&ep, &head, TableSource::Memory, opts, out),
            Err(err) => {
                debug!("no entry point at {:#x}: {}", address, err);
                Ok(false)
            }
        };
    }

    if !opts.quiet {
        out.info(format_args!(
            "Scanning {} for entry point.",
            opts.devmem.display()
        ));
    }

    let mem = DevMem::open(&opts.devmem)?.read(entry::START_ADDRESS, entry::SCAN_LENGTH)?;
    match entry::find_entry_point(&mem) {
        Ok((offset, ep)) => {
            debug!(
                "found entry point at {:#x}",
                entry::START_ADDRESS + offset as u64
            );
            decode_entry_point(&ep, &mem[offset..], TableSource::Memory, opts, out)
        }
        Err(err) => {
            debug!("memory scan: {}", err);
            Ok(false)
        }
    }
}

// Looks up the SMBIOS entry point address published in the EFI system table.
// Returns None when the system has no EFI interface.
fn efi_entry_point() -> Result<Option<(String, u64)>> {
    for &path in EFI_SYSTAB_FILES {
        let systab = match fs::read_to_string(path) {
            Ok(systab) => systab,
            Err(_) => continue,
        };

        return match parse_systab(&systab) {
            Some((kind, address)) => Ok(Some((kind.to_string(), address))),
            None => {
                error!("{}: SMBIOS entry point missing", path);
                Err(Error::Internal(ErrorKind::EntryPointNotFound))
            }
        };
    }

    Ok(None)
}

// Finds the first SMBIOS3= or SMBIOS= line of an EFI system table.
fn parse_systab(systab: &str) -> Option<(&str, u64)> {
    systab.lines().find_map(|line| {
        let mut parts = line.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();

        if key != "SMBIOS3" && key != "SMBIOS" {
            return None;
        }

        let address = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok()?,
            None => value.parse().ok()?,
        };

        Some((key, address))
    })
}

// Reads and decodes the table behind a valid entry point. Always reports the
// entry point as found; table read failures are only logged.
fn decode_entry_point(
    ep: &EntryPointType,
    raw: &[u8],
    source: TableSource,
    opts: &Options,
    out: &mut dyn Output,
) -> Result<bool> {
    if !opts.quiet {
        out.info(format_args!("{}", ep.banner()));
    }

    let info = ep.table_info();
    decode_table(&info, source, opts, out)?;

    if let Some(ref path) = opts.dump_bin {
        let crafted = ep.relocated(raw, entry::DUMP_TABLE_OFFSET);
        if !opts.quiet {
            out.comment(format_args!(
                "Writing {} bytes to {}.",
                crafted.len(),
                path.display()
            ));
        }
        memory::write_dump(path, 0, &crafted, true)?;
    }

    Ok(true)
}

fn decode_table(
    info: &TableInfo,
    source: TableSource,
    opts: &Options,
    out: &mut dyn Output,
) -> Result<()> {
    if !opts.quiet {
        if info.version > entry::SUPPORTED_VERSION {
            out.comment(format_args!(
                "SMBIOS implementations newer than version {} are not",
                entry::SUPPORTED_VERSION
            ));
            out.comment(format_args!(
                "fully supported by this version of dmidecode."
            ));
        }

        if opts.types.is_none() {
            if info.count != 0 {
                out.info(format_args!(
                    "{} structures occupying {} bytes.",
                    info.count, info.length
                ));
            }
            if let TableSource::Memory | TableSource::Sysfs = source {
                out.info(format_args!("Table at 0x{:08X}.", info.address));
            }
        }
        out.separator();
    }

    let buf = match read_table(info, source, opts) {
        Ok(buf) => buf,
        Err(err) => {
            error!("Failed to read table, sorry: {}", err);
            return Ok(());
        }
    };

    if let Some(ref path) = opts.dump_bin {
        if !opts.quiet {
            out.comment(format_args!(
                "Writing {} bytes to {}.",
                buf.len(),
                path.display()
            ));
        }
        return memory::write_dump(path, entry::DUMP_TABLE_OFFSET, &buf, false);
    }

    let summary = table::walk(&buf, info, opts, out);
    debug!(
        "visited {} structures in {} bytes",
        summary.structures, summary.consumed
    );

    Ok(())
}

fn read_table(info: &TableInfo, source: TableSource, opts: &Options) -> Result<Vec<u8>> {
    let len = info.length as usize;

    // Files may be shorter than announced: SMBIOS 3 only announces a maximum
    // size, and the kernel truncates tables it fails to parse.
    let buf = match source {
        TableSource::Memory => return DevMem::open(&opts.devmem)?.read(info.address, len),
        TableSource::Sysfs => memory::read_file(SYS_TABLE_FILE, 0, len)?,
        TableSource::Dump(path) => memory::read_file(path, info.address, len)?,
    };

    if buf.is_empty() && len != 0 {
        return Err(Error::Internal(ErrorKind::TableUnreadable));
    }

    if !opts.quiet && info.count != 0 && buf.len() != len {
        warn!(
            "Wrong DMI structures length: {} bytes announced, only {} bytes available.",
            len,
            buf.len()
        );
    }

    Ok(buf)
}
