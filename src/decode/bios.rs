//! BIOS Information (type 0) and BIOS Language Information (type 13).

use super::{bits, Context, OUT_OF_SPEC};
use crate::structure::Structure;

const CHARACTERISTICS: &[&str] = &[
    "ISA is supported",
    "MCA is supported",
    "EISA is supported",
    "PCI is supported",
    "PC Card (PCMCIA) is supported",
    "PNP is supported",
    "APM is supported",
    "BIOS is upgradeable",
    "BIOS shadowing is allowed",
    "VLB is supported",
    "ESCD support is available",
    "Boot from CD is supported",
    "Selectable boot is supported",
    "BIOS ROM is socketed",
    "Boot from PC Card (PCMCIA) is supported",
    "EDD is supported",
    "Japanese floppy for NEC 9800 1.2 MB is supported (int 13h)",
    "Japanese floppy for Toshiba 1.2 MB is supported (int 13h)",
    "5.25\"/360 kB floppy services are supported (int 13h)",
    "5.25\"/1.2 MB floppy services are supported (int 13h)",
    "3.5\"/720 kB floppy services are supported (int 13h)",
    "3.5\"/2.88 MB floppy services are supported (int 13h)",
    "Print screen service is supported (int 5h)",
    "8042 keyboard services are supported (int 9h)",
    "Serial services are supported (int 14h)",
    "Printer services are supported (int 17h)",
    "CGA/mono video services are supported (int 10h)",
    "NEC PC-98",
];

const CHARACTERISTICS_X1: &[&str] = &[
    "ACPI is supported",
    "USB legacy is supported",
    "AGP is supported",
    "I2O boot is supported",
    "LS-120 boot is supported",
    "ATAPI Zip drive boot is supported",
    "IEEE 1394 boot is supported",
    "Smart battery is supported",
];

const CHARACTERISTICS_X2: &[&str] = &[
    "BIOS boot specification is supported",
    "Function key-initiated network boot is supported",
    "Targeted content distribution is supported",
    "UEFI is supported",
    "System is a virtual machine",
];

pub fn bios(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;

    out.attr("Vendor", format_args!("{}", s.string_at(0x04)));
    out.attr("Version", format_args!("{}", s.string_at(0x05)));
    out.attr("Release Date", format_args!("{}", s.string_at(0x08)));

    // IA-64 systems have no BIOS and report a zero base address.
    let segment = s.word(0x06);
    if segment != 0 {
        out.attr("Address", format_args!("0x{:04X}0", segment));
        out.attr(
            "Runtime Size",
            format_args!("{}", runtime_size((0x10000 - u32::from(segment)) << 4)),
        );
    }

    let extended = if s.length() < 0x1a { 16 } else { s.word(0x18) };
    out.attr("ROM Size", format_args!("{}", rom_size(s.byte(0x09), extended)));

    out.list_start("Characteristics", None);
    let code = s.qword(0x0a);
    if code & (1 << 3) != 0 {
        out.list_item(format_args!("BIOS characteristics not supported"));
    } else {
        for name in bits(CHARACTERISTICS, 4, code) {
            out.list_item(format_args!("{}", name));
        }
    }

    if s.length() >= 0x13 {
        for name in bits(CHARACTERISTICS_X1, 0, u64::from(s.byte(0x12))) {
            out.list_item(format_args!("{}", name));
        }
    }
    if s.length() >= 0x14 {
        for name in bits(CHARACTERISTICS_X2, 0, u64::from(s.byte(0x13))) {
            out.list_item(format_args!("{}", name));
        }
    }
    out.list_end();

    if s.length() < 0x18 {
        return;
    }

    if s.byte(0x14) != 0xff && s.byte(0x15) != 0xff {
        out.attr(
            "BIOS Revision",
            format_args!("{}.{}", s.byte(0x14), s.byte(0x15)),
        );
    }
    if s.byte(0x16) != 0xff && s.byte(0x17) != 0xff {
        out.attr(
            "Firmware Revision",
            format_args!("{}.{}", s.byte(0x16), s.byte(0x17)),
        );
    }
}

fn runtime_size(code: u32) -> String {
    if code & 0x3ff != 0 {
        format!("{} bytes", code)
    } else {
        format!("{} kB", code >> 10)
    }
}

fn rom_size(code: u8, extended: u16) -> String {
    if code != 0xff {
        return format!("{} kB", (u32::from(code) + 1) << 6);
    }

    let unit = match extended >> 14 {
        0 => "MB",
        1 => "GB",
        _ => OUT_OF_SPEC,
    };

    format!("{} {}", extended & 0x3fff, unit)
}

pub fn languages(s: &Structure, ctx: &mut Context) {
    if ctx.at_least(2, 1) {
        let format = if s.byte(0x05) & 0x01 != 0 {
            "Abbreviated"
        } else {
            "Long"
        };
        ctx.out.attr("Language Description Format", format_args!("{}", format));
    }

    let count = s.byte(0x04);
    ctx.out.list_start("Installable Languages", Some(format_args!("{}", count)));
    for i in 1..=count {
        ctx.out.list_item(format_args!("{}", s.string(i)));
    }
    ctx.out.list_end();

    ctx.out.attr(
        "Currently Installed Language",
        format_args!("{}", s.string_at(0x15)),
    );
}
