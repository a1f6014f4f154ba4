//! Decodes the legacy BIOS anchor structures found in the 0xE0000-0xFFFFF
//! window: SMBIOS and DMI entry points, SYSID, PnP, ACPI RSDP, Sony, BIOS32
//! and PCI IRQ routing tables.

use byteorder::{ByteOrder, LE};

use crate::output::Output;
use crate::util::{self, checksum};

/// The physical address at which the anchor scan starts.
pub const START_ADDRESS: u64 = 0x000e_0000;

/// The size of the anchor scan window.
pub const SCAN_LENGTH: usize = 0x2_0000;

const LAST_ADDRESS: u64 = 0x000f_ffff;
const PARAGRAPH_SIZE: usize = 16;

/// Describes one kind of anchored structure.
struct Anchor {
    anchor: &'static [u8],

    /// The lowest address the anchor may appear at.
    low_address: u64,

    /// Returns the structure length announced by its first paragraph.
    length: fn(&[u8]) -> usize,

    /// Validates and prints the structure; false if it is not valid.
    decode: fn(&[u8], &mut dyn Output) -> bool,
}

static ANCHORS: &[Anchor] = &[
    Anchor {
        anchor: b"_SM_",
        low_address: 0xf_0000,
        length: smbios_length,
        decode: smbios,
    },
    Anchor {
        anchor: b"_DMI_",
        low_address: 0xf_0000,
        length: dmi_length,
        decode: dmi,
    },
    Anchor {
        anchor: b"_SYSID_",
        low_address: 0xe_0000,
        length: sysid_length,
        decode: sysid,
    },
    Anchor {
        anchor: b"$PnP",
        low_address: 0xf_0000,
        length: pnp_length,
        decode: pnp,
    },
    Anchor {
        anchor: b"RSD PTR ",
        low_address: 0xe_0000,
        length: acpi_length,
        decode: acpi,
    },
    Anchor {
        anchor: b"$SNY",
        low_address: 0xe_0000,
        length: sony_length,
        decode: sony,
    },
    Anchor {
        anchor: b"_32_",
        low_address: 0xe_0000,
        length: bios32_length,
        decode: bios32,
    },
    Anchor {
        anchor: b"$PIR",
        low_address: 0xf_0000,
        length: pir_length,
        decode: pir,
    },
];

/// Scans `mem`, a copy of physical memory starting at `base`, for anchored
/// structures on paragraph boundaries and prints every valid one.
///
/// Returns the number of structures printed.
pub fn scan(mem: &[u8], base: u64, out: &mut dyn Output) -> usize {
    let mut found = 0;
    let mut offset = 0;

    while offset + PARAGRAPH_SIZE <= mem.len() && base + (offset as u64) < LAST_ADDRESS {
        let address = base + offset as u64;
        let paragraph = &mem[offset..offset + PARAGRAPH_SIZE];

        for entry in ANCHORS {
            if !paragraph.starts_with(entry.anchor) || address < entry.low_address {
                continue;
            }

            let len = (entry.length)(paragraph);
            if address + (len as u64) > LAST_ADDRESS + 1 {
                continue;
            }

            let p = match mem.get(offset..offset + len) {
                Some(p) => p,
                None => continue,
            };

            if (entry.decode)(p, out) {
                found += 1;
                // Skip the paragraphs the structure covers.
                offset += (len.saturating_sub(1) >> 4) << 4;
            }
        }

        offset += PARAGRAPH_SIZE;
    }

    found
}

fn smbios_length(p: &[u8]) -> usize {
    // Some firmware announces 0x1E for a 0x1F byte entry point.
    match p[0x05] {
        0x1e => 0x1f,
        n => usize::from(n),
    }
}

fn smbios(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 0x1f
        || !checksum(&p[..usize::from(p[0x05]).min(p.len())])
        || &p[0x10..0x15] != b"_DMI_"
        || !checksum(&p[0x10..0x1f])
    {
        return false;
    }

    out.info(format_args!("SMBIOS {}.{} present.", p[0x06], p[0x07]));
    out.attr(
        "Structure Table Length",
        format_args!("{} bytes", LE::read_u16(&p[0x16..])),
    );
    out.attr(
        "Structure Table Address",
        format_args!("0x{:08X}", LE::read_u32(&p[0x18..])),
    );
    out.attr(
        "Number Of Structures",
        format_args!("{}", LE::read_u16(&p[0x1c..])),
    );
    out.attr(
        "Maximum Structure Size",
        format_args!("{} bytes", LE::read_u16(&p[0x08..])),
    );

    true
}

fn dmi_length(_: &[u8]) -> usize {
    0x0f
}

fn dmi(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 0x0f || !checksum(p) {
        return false;
    }

    out.info(format_args!(
        "Legacy DMI {}.{} present.",
        p[0x0e] >> 4,
        p[0x0e] & 0x0f
    ));
    out.attr(
        "Structure Table Length",
        format_args!("{} bytes", LE::read_u16(&p[0x06..])),
    );
    out.attr(
        "Structure Table Address",
        format_args!("0x{:08X}", LE::read_u32(&p[0x08..])),
    );
    out.attr(
        "Number Of Structures",
        format_args!("{}", LE::read_u16(&p[0x0c..])),
    );

    true
}

fn sysid_length(p: &[u8]) -> usize {
    usize::from(LE::read_u16(&p[0x08..]))
}

fn sysid(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 0x11 || !checksum(p) {
        return false;
    }

    out.info(format_args!("SYSID present."));
    out.attr("Revision", format_args!("{}", p[0x10]));
    out.attr(
        "Structure Table Address",
        format_args!("0x{:08X}", LE::read_u32(&p[0x0a..])),
    );
    out.attr(
        "Number Of Structures",
        format_args!("{}", LE::read_u16(&p[0x0e..])),
    );

    true
}

fn pnp_length(p: &[u8]) -> usize {
    usize::from(p[0x05])
}

fn pnp(p: &[u8], out: &mut dyn Output) -> bool {
    const NOTIFICATIONS: &[&str] = &["Not Supported", "Polling", "Asynchronous", "Unknown"];

    if p.len() < 0x21 || !checksum(p) {
        return false;
    }

    let control = LE::read_u16(&p[0x06..]) & 0x03;

    out.info(format_args!("PNP BIOS {}.{} present.", p[0x04] >> 4, p[0x04] & 0x0f));
    out.attr(
        "Event Notification",
        format_args!("{}", NOTIFICATIONS[usize::from(control)]),
    );
    if control == 0x01 {
        out.attr(
            "Event Notification Flag Address",
            format_args!("0x{:08X}", LE::read_u32(&p[0x09..])),
        );
    }
    out.attr(
        "Real Mode 16-bit Code Address",
        format_args!(
            "{:04X}:{:04X}",
            LE::read_u16(&p[0x0f..]),
            LE::read_u16(&p[0x0d..])
        ),
    );
    out.attr(
        "Real Mode 16-bit Data Address",
        format_args!("{:04X}:0000", LE::read_u16(&p[0x1b..])),
    );
    out.attr(
        "16-bit Protected Mode Code Address",
        format_args!(
            "0x{:08X}",
            LE::read_u32(&p[0x13..]).wrapping_add(u32::from(LE::read_u16(&p[0x11..])))
        ),
    );
    out.attr(
        "16-bit Protected Mode Data Address",
        format_args!("0x{:08X}", LE::read_u32(&p[0x1d..])),
    );

    // A compressed EISA identifier: three 5-bit letters and a product number.
    if LE::read_u32(&p[0x17..]) != 0 {
        out.attr(
            "OEM Device Identifier",
            format_args!(
                "{}{}{}{:02X}{:02X}",
                char::from(0x40 + ((p[0x17] >> 2) & 0x1f)),
                char::from(0x40 + ((p[0x17] & 0x03) << 3) + ((p[0x18] >> 5) & 0x07)),
                char::from(0x40 + (p[0x18] & 0x1f)),
                p[0x19],
                p[0x20]
            ),
        );
    }

    true
}

fn acpi_length(p: &[u8]) -> usize {
    if p[15] == 2 {
        36
    } else {
        20
    }
}

fn acpi(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 20 || !checksum(&p[..20]) {
        return false;
    }

    let revision = match p[15] {
        0 => " 1.0",
        2 => " 2.0",
        _ => "",
    };

    out.info(format_args!("ACPI{} present.", revision));
    out.attr("OEM Identifier", format_args!("{}", util::sanitize(&p[9..15])));
    out.attr(
        "RSD Table 32-bit Address",
        format_args!("0x{:08X}", LE::read_u32(&p[16..])),
    );

    // ACPI 2.0 extends the structure with its own length and checksum.
    if p.len() < 36 {
        return true;
    }

    let len = LE::read_u32(&p[20..]) as usize;
    if len > p.len() || !checksum(&p[..len]) {
        return false;
    }
    if len < 32 {
        return true;
    }

    out.attr(
        "XSD Table 64-bit Address",
        format_args!("0x{:016X}", LE::read_u64(&p[24..])),
    );

    true
}

fn sony_length(p: &[u8]) -> usize {
    usize::from(p[0x05])
}

fn sony(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 0x06 || !checksum(p) {
        return false;
    }

    out.info(format_args!("Sony system detected."));

    true
}

fn bios32_length(p: &[u8]) -> usize {
    usize::from(p[0x09]) << 4
}

fn bios32(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 0x0a || !checksum(p) {
        return false;
    }

    out.info(format_args!("BIOS32 Service Directory present."));
    out.attr("Revision", format_args!("{}", p[0x08]));
    out.attr(
        "Calling Interface Address",
        format_args!("0x{:08X}", LE::read_u32(&p[0x04..])),
    );

    true
}

fn pir_length(p: &[u8]) -> usize {
    usize::from(LE::read_u16(&p[6..]))
}

fn pir_irqs(code: u16) -> String {
    if code == 0 {
        return "None".to_string();
    }

    (0..16u16)
        .filter(|&i| code & (1 << i) != 0)
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn pir_slot_number(code: u8) -> String {
    match code {
        0 => "on-board".to_string(),
        n => format!("slot number {}", n),
    }
}

fn pir(p: &[u8], out: &mut dyn Output) -> bool {
    if p.len() < 32 || !checksum(p) {
        return false;
    }

    out.info(format_args!("PCI Interrupt Routing {}.{} present.", p[5], p[4]));
    out.attr(
        "Router ID",
        format_args!("{:02x}:{:02x}.{:1x}", p[8], p[9] >> 3, p[9] & 0x07),
    );
    out.attr(
        "Exclusive IRQs",
        format_args!("{}", pir_irqs(LE::read_u16(&p[10..]))),
    );
    if LE::read_u32(&p[12..]) != 0 {
        out.attr(
            "Compatible Router",
            format_args!("{:04x}:{:04x}", LE::read_u16(&p[12..]), LE::read_u16(&p[14..])),
        );
    }
    if LE::read_u32(&p[16..]) != 0 {
        out.attr(
            "Miniport Data",
            format_args!("0x{:08X}", LE::read_u32(&p[16..])),
        );
    }

    // Slot entries follow the 32 byte header, 16 bytes each.
    for (i, slot) in p[32..].chunks_exact(16).enumerate() {
        out.attr(
            &format!("Slot Entry {}", i + 1),
            format_args!(
                "ID {:02x}:{:02x}, {}",
                slot[0],
                slot[1] >> 3,
                pir_slot_number(slot[14])
            ),
        );
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::StringOutput;

    // Sets p[at] so the first `len` bytes of p sum to zero.
    fn seal(p: &mut [u8], at: usize, len: usize) {
        p[at] = 0;
        let sum = p[..len].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
        p[at] = 0u8.wrapping_sub(sum);
    }

    fn scan_window(structures: &[(u64, &[u8])]) -> String {
        let mut mem = vec![0u8; SCAN_LENGTH];
        for &(address, p) in structures {
            let offset = (address - START_ADDRESS) as usize;
            mem[offset..offset + p.len()].copy_from_slice(p);
        }

        let mut out = StringOutput::new();
        scan(&mem, START_ADDRESS, &mut out);
        out.into_string()
    }

    #[test]
    fn smbios_and_dmi_anchors() {
        #[rustfmt::skip]
        let mut p = [
            b'_', b'S', b'M', b'_',
            0x00,
            0x1f,
            0x02, 0x08,
            0xd4, 0x01,
            0x00,
            0x00, 0x00, 0x00, 0x00, 0x00,
            b'_', b'D', b'M', b'I', b'_',
            0x00,
            0x5f, 0x0f,
            0x00, 0x90, 0xf0, 0x7a,
            0x43, 0x00,
            0x28,
        ];
        seal(&mut p[0x10..], 0x05, 0x0f);
        seal(&mut p, 0x04, 0x1f);

        let text = scan_window(&[(0xf_0000, &p)]);

        // The intermediate _DMI_ anchor shares the entry point's second
        // paragraph and is skipped along with it.
        assert_eq!(
            text,
            "SMBIOS 2.8 present.\n\
             \tStructure Table Length: 3935 bytes\n\
             \tStructure Table Address: 0x7AF09000\n\
             \tNumber Of Structures: 67\n\
             \tMaximum Structure Size: 468 bytes\n"
        );
    }

    #[test]
    fn smbios_anchor_below_window_ignored() {
        #[rustfmt::skip]
        let mut p = [
            b'_', b'D', b'M', b'I', b'_',
            0x00,
            0x20, 0x00,
            0x00, 0x00, 0x0f, 0x00,
            0x02, 0x00,
            0x21,
        ];
        seal(&mut p, 0x05, 0x0f);

        assert_eq!(scan_window(&[(0xe_8000, &p)]), "");
        assert_eq!(
            scan_window(&[(0xf_8000, &p)]),
            "Legacy DMI 2.1 present.\n\
             \tStructure Table Length: 32 bytes\n\
             \tStructure Table Address: 0x000F0000\n\
             \tNumber Of Structures: 2\n"
        );
    }

    #[test]
    fn acpi_rsdp() {
        let mut p = [0u8; 36];
        p[..8].copy_from_slice(b"RSD PTR ");
        p[9..15].copy_from_slice(b"LENOVO");
        p[15] = 2;
        p[16..20].copy_from_slice(&0x7ffe_0000u32.to_le_bytes());
        p[20..24].copy_from_slice(&36u32.to_le_bytes());
        p[24..32].copy_from_slice(&0x7ffe_0100u64.to_le_bytes());
        seal(&mut p, 8, 20);
        seal(&mut p, 32, 36);

        assert_eq!(
            scan_window(&[(0xe_0000, &p)]),
            "ACPI 2.0 present.\n\
             \tOEM Identifier: LENOVO\n\
             \tRSD Table 32-bit Address: 0x7FFE0000\n\
             \tXSD Table 64-bit Address: 0x000000007FFE0100\n"
        );
    }

    #[test]
    fn pir_table() {
        let mut p = [0u8; 48];
        p[..4].copy_from_slice(b"$PIR");
        p[4] = 0x00;
        p[5] = 0x01;
        p[6..8].copy_from_slice(&48u16.to_le_bytes());
        p[8] = 0x00;
        p[9] = 0xf8;
        p[10..12].copy_from_slice(&0x0c00u16.to_le_bytes());
        p[12..16].copy_from_slice(&[0x86, 0x80, 0x10, 0x3a]);
        p[32] = 0x00;
        p[33] = 0x08;
        p[46] = 0x02;
        seal(&mut p, 31, 48);

        assert_eq!(
            scan_window(&[(0xf_1000, &p)]),
            "PCI Interrupt Routing 1.0 present.\n\
             \tRouter ID: 00:1f.0\n\
             \tExclusive IRQs: 10 11\n\
             \tCompatible Router: 8086:3a10\n\
             \tSlot Entry 1: ID 00:01, slot number 2\n"
        );
    }

    #[test]
    fn pnp_identifier() {
        let mut p = [0u8; 0x21];
        p[..4].copy_from_slice(b"$PnP");
        p[0x04] = 0x10;
        p[0x05] = 0x21;
        p[0x0d..0x0f].copy_from_slice(&0x1234u16.to_le_bytes());
        p[0x0f..0x11].copy_from_slice(&0xf000u16.to_le_bytes());
        p[0x1b..0x1d].copy_from_slice(&0x0040u16.to_le_bytes());
        // "PNP" compressed, product 0C
        p[0x17] = 0x41;
        p[0x18] = 0xd0;
        p[0x19] = 0x0c;
        seal(&mut p, 0x08, 0x21);

        let text = scan_window(&[(0xf_2000, &p)]);

        assert!(text.starts_with("PNP BIOS 1.0 present.\n\tEvent Notification: Not Supported\n"));
        assert!(text.contains("\tReal Mode 16-bit Code Address: F000:1234\n"));
        assert!(text.ends_with("\tOEM Device Identifier: PNP0C00\n"));
    }

    #[test]
    fn bad_checksums_rejected() {
        let mut p = [0u8; 0x10];
        p[..4].copy_from_slice(b"_32_");
        p[0x09] = 0x01;
        p[0x0a] = 0x01;

        assert_eq!(scan_window(&[(0xe_4000, &p)]), "");

        seal(&mut p, 0x0a, 0x10);
        assert_eq!(
            scan_window(&[(0xe_4000, &p)]),
            "BIOS32 Service Directory present.\n\
             \tRevision: 0\n\
             \tCalling Interface Address: 0x00000000\n"
        );
    }
}
