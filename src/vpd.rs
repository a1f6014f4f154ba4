//! Decodes the IBM/Lenovo Vital Product Data record found in the BIOS area
//! of older ThinkPad and xSeries machines.

use crate::output::Output;
use crate::util::checksum;

/// The physical address at which the VPD scan starts.
pub const START_ADDRESS: u64 = 0x000f_0000;

/// The size of the VPD scan window.
pub const SCAN_LENGTH: usize = 0x1_0000;

const ANCHOR: &[u8] = b"\xaa\x55VPD";
const PARAGRAPH_SIZE: usize = 16;

static PRODUCTS: &[(&str, &str)] = &[
    ("HR", "Thinkpad 650E"),
    ("HV", "Thinkpad 760C/CD/L/LD"),
    ("HX", "Thinkpad 760E/ED/X/XD/XL or 765/L/D (9385XGA)"),
    ("HY", "Thinkpad 760E/EL/ELD (9320SVGA)"),
    ("HZ", "Thinkpad 760ED/EL (9385SVGA)"),
    ("I0", "Thinkpad 560"),
    ("I1", "Thinkpad 380/D/E/ED or 385D/ED"),
    ("I4", "Thinkpad 535/E"),
    ("I5", "Thinkpad 365X/XD"),
    ("I7", "Thinkpad 770"),
    ("I8", "Thinkpad 560X"),
    ("I9", "Thinkpad 310/E or 315D/ED (Please report!)"),
    ("IA", "Thinkpad 535X"),
    ("IB", "Thinkpad 600"),
    ("IC", "Thinkpad 380X/XD or 385XD"),
    ("ID", "Thinkpad 770/E/ED"),
    ("IE", "Thinkpad 560Z"),
    ("IF", "Thinkpad 380X/XD or 385XD"),
    ("IG", "Thinkpad 380Z"),
    ("IH", "Thinkpad 600E"),
    ("II", "Thinkpad 770X/XD"),
    ("IJ", "Thinkpad 390 or i17xx"),
    ("IK", "Thinkpad i14xx"),
    ("IL", "Thinkpad 390"),
    ("IM", "Thinkpad 570"),
    ("IN", "Thinkpad 600E"),
    ("IO", "Thinkpad 770X"),
    ("IQ", "Thinkpad 390E"),
    ("IR", "Thinkpad 240"),
    ("IS", "Thinkpad 390X"),
    ("IT", "Thinkpad 600X"),
    ("IU", "Thinkpad 570E"),
    ("IV", "Thinkpad A20p"),
    ("IW", "Thinkpad A20m"),
    ("IX", "Thinkpad i1400 or i1500"),
    ("IY", "Thinkpad T20"),
    ("IZ", "Thinkpad X20 or X21"),
    ("KQ", "Thinkpad i1200 or i1300"),
    ("KR", "Thinkpad i1400 or i1500"),
    ("KS", "Thinkpad 240X"),
    ("KT", "Thinkpad i1400 or i1500"),
    ("KU", "Thinkpad A21e"),
    ("KV", "Transnote"),
    ("KW", "Thinkpad i1200 or i1300"),
    ("KX", "Thinkpad A21m or A22m"),
    ("KY", "Thinkpad A21p or A22p"),
    ("KZ", "Thinkpad T21"),
    ("RE", "eServer xSeries 445"),
    ("TT", "eServer xSeries 330"),
    ("10", "Thinkpad A21e or A22e"),
    ("11", "Thinkpad 240Z"),
    ("13", "Thinkpad A22m"),
    ("15", "Thinkpad i1200"),
    ("16", "Thinkpad T22"),
    ("17", "Thinkpad i1200"),
    ("18", "Thinkpad S30"),
    ("1A", "Thinkpad T23"),
    ("1B", "Thinkpad A22e"),
    ("1C", "Thinkpad R30"),
    ("1D", "Thinkpad X22, X23 or X24"),
    ("1E", "Thinkpad A30/p"),
    ("1F", "Thinkpad R31"),
    ("1G", "Thinkpad A31/p"),
    ("1I", "Thinkpad T30"),
    ("1K", "Thinkpad X30"),
    ("1M", "Thinkpad R32"),
    ("1N", "Thinkpad A31/p"),
    ("1O", "Thinkpad R40"),
    ("1P", "Thinkpad R40"),
    ("1Q", "Thinkpad X31"),
    ("1R", "Thinkpad T40, T41, R50 or R50p"),
    ("1S", "Thinkpad R40e"),
    ("1T", "Thinkpad G40"),
    ("20", "Netvista 6823"),
];

/// Returns the product name for the two-character prefix of a BIOS build ID.
pub fn product_name(build_id: &[u8]) -> &'static str {
    PRODUCTS
        .iter()
        .find(|(id, _)| build_id.starts_with(id.as_bytes()))
        .map_or("Unknown, please report!", |&(_, name)| name)
}

// Printable characters are kept, other non-NUL bytes become '.' and NULs
// are dropped.
fn entry(buf: &[u8]) -> String {
    buf.iter()
        .filter(|&&b| b != 0)
        .map(|&b| if (32..127).contains(&b) { b as char } else { '.' })
        .collect()
}

fn ascii(buf: &[u8]) -> String {
    buf.iter()
        .map(|&b| if (32..127).contains(&b) { b as char } else { '.' })
        .collect()
}

fn print_entry(out: &mut dyn Output, name: &str, buf: &[u8]) {
    out.info(format_args!("{}: {}", name, entry(buf)));
}

/// Validates and prints one VPD record. With `dump`, the record is shown
/// as hex and text instead of decoded.
///
/// Returns false if the record is too short to be a VPD record.
pub fn decode(p: &[u8], dump: bool, out: &mut dyn Output) -> bool {
    if p.len() < 0x30 || p[5] < 0x30 {
        return false;
    }

    // xSeries records are longer and checksum everything; others leave the
    // first 13 bytes out. A few otherwise valid records fail both.
    let long_ok = p[5] >= 0x46 && p.len() >= 0x46 && checksum(&p[..0x46]);
    if !long_ok && !checksum(&p[0x0d..0x30]) {
        out.info(format_args!("Bad checksum! Please report."));
    }

    if dump {
        for (i, row) in p.chunks(16).enumerate() {
            let hex: Vec<String> = row.iter().map(|b| format!("{:02X}", b)).collect();
            out.info(format_args!(
                "{:02X}: {:<47}     {}",
                i * 16,
                hex.join(" "),
                ascii(row)
            ));
        }
        return true;
    }

    print_entry(out, "BIOS Build ID", &p[0x0d..0x16]);
    out.info(format_args!("Product Name: {}", product_name(&p[0x0d..])));
    print_entry(out, "Box Serial Number", &p[0x16..0x1d]);
    print_entry(out, "Motherboard Serial Number", &p[0x1d..0x28]);
    print_entry(out, "Machine Type/Model", &p[0x28..0x2f]);

    if p[5] < 0x45 || p.len() < 0x45 {
        return true;
    }

    print_entry(out, "BIOS Release Date", &p[0x30..0x38]);
    print_entry(out, "Default Flash Image File Name", &p[0x38..0x45]);

    true
}

/// Scans `mem`, a copy of physical memory starting at `base`, for VPD
/// records on paragraph boundaries and prints every one found.
///
/// Returns the number of records printed.
pub fn scan(mem: &[u8], base: u64, dump: bool, out: &mut dyn Output) -> usize {
    let mut found = 0;

    for offset in (0..mem.len()).step_by(PARAGRAPH_SIZE) {
        if !mem[offset..].starts_with(ANCHOR) || mem.len() < offset + 6 {
            continue;
        }

        let len = usize::from(mem[offset + 5]);
        match mem.get(offset..offset + len) {
            Some(p) => {
                debug!("VPD record at {:#x}", base + offset as u64);
                if decode(p, dump, out) {
                    found += 1;
                }
            }
            None => debug!("VPD record at {:#x} overruns the window", base + offset as u64),
        }
    }

    found
}
