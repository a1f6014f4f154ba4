//! Port connectors (type 8), system slots (type 9) and on-board devices
//! (types 10 and 41).

use super::{bits, lookup, segment_bus_func, Context, OUT_OF_SPEC};
use crate::structure::Structure;

fn connector_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "None",
        "Centronics",
        "Mini Centronics",
        "Proprietary",
        "DB-25 male",
        "DB-25 female",
        "DB-15 male",
        "DB-15 female",
        "DB-9 male",
        "DB-9 female",
        "RJ-11",
        "RJ-45",
        "50 Pin MiniSCSI",
        "Mini DIN",
        "Micro DIN",
        "PS/2",
        "Infrared",
        "HP-HIL",
        "Access Bus (USB)",
        "SSA SCSI",
        "Circular DIN-8 male",
        "Circular DIN-8 female",
        "On Board IDE",
        "On Board Floppy",
        "9 Pin Dual Inline (pin 10 cut)",
        "25 Pin Dual Inline (pin 26 cut)",
        "50 Pin Dual Inline",
        "68 Pin Dual Inline",
        "On Board Sound Input From CD-ROM",
        "Mini Centronics Type-14",
        "Mini Centronics Type-26",
        "Mini Jack (headphones)",
        "BNC",
        "IEEE 1394",
        "SAS/SATA Plug Receptacle",
        "USB Type-C Receptacle",
    ];
    const TYPES_0XA0: &[&str] = &["PC-98", "PC-98 Hireso", "PC-H98", "PC-98 Note", "PC-98 Full"];

    match code {
        0xa0..=0xa4 => lookup(TYPES_0XA0, 0xa0, u32::from(code)),
        0xff => "Other",
        _ => lookup(TYPES, 0x00, u32::from(code)),
    }
}

fn port_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "None",
        "Parallel Port XT/AT Compatible",
        "Parallel Port PS/2",
        "Parallel Port ECP",
        "Parallel Port EPP",
        "Parallel Port ECP/EPP",
        "Serial Port XT/AT Compatible",
        "Serial Port 16450 Compatible",
        "Serial Port 16550 Compatible",
        "Serial Port 16550A Compatible",
        "SCSI Port",
        "MIDI Port",
        "Joystick Port",
        "Keyboard Port",
        "Mouse Port",
        "SSA SCSI",
        "USB",
        "Firewire (IEEE P1394)",
        "PCMCIA Type I",
        "PCMCIA Type II",
        "PCMCIA Type III",
        "Cardbus",
        "Access Bus Port",
        "SCSI II",
        "SCSI Wide",
        "PC-98",
        "PC-98 Hireso",
        "PC-H98",
        "Video Port",
        "Audio Port",
        "Modem Port",
        "Network Port",
        "SATA",
        "SAS",
    ];

    match code {
        0xa0 => "8251 Compatible",
        0xa1 => "8251 FIFO Compatible",
        0xff => "Other",
        _ => lookup(TYPES, 0x00, u32::from(code)),
    }
}

pub fn port(s: &Structure, ctx: &mut Context) {
    ctx.out.attr(
        "Internal Reference Designator",
        format_args!("{}", s.string_at(0x04)),
    );
    ctx.out.attr(
        "Internal Connector Type",
        format_args!("{}", connector_type(s.byte(0x05))),
    );
    ctx.out.attr(
        "External Reference Designator",
        format_args!("{}", s.string_at(0x06)),
    );
    ctx.out.attr(
        "External Connector Type",
        format_args!("{}", connector_type(s.byte(0x07))),
    );
    ctx.out.attr("Port Type", format_args!("{}", port_type(s.byte(0x08))));
}

fn slot_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "ISA",
        "MCA",
        "EISA",
        "PCI",
        "PC Card (PCMCIA)",
        "VLB",
        "Proprietary",
        "Processor Card",
        "Proprietary Memory Card",
        "I/O Riser Card",
        "NuBus",
        "PCI-66",
        "AGP",
        "AGP 2x",
        "AGP 4x",
        "PCI-X",
        "AGP 8x",
        "M.2 Socket 1-DP",
        "M.2 Socket 1-SD",
        "M.2 Socket 2",
        "M.2 Socket 3",
        "MXM Type I",
        "MXM Type II",
        "MXM Type III",
        "MXM Type III-HE",
        "MXM Type IV",
        "MXM 3.0 Type A",
        "MXM 3.0 Type B",
        "PCI Express 2 SFF-8639",
        "PCI Express 3 SFF-8639",
        "PCI Express Mini 52-pin with bottom-side keep-outs",
        "PCI Express Mini 52-pin without bottom-side keep-outs",
        "PCI Express Mini 76-pin",
    ];
    const TYPES_0XA0: &[&str] = &[
        "PC-98/C20",
        "PC-98/C24",
        "PC-98/E",
        "PC-98/Local Bus",
        "PC-98/Card",
        "PCI Express",
        "PCI Express x1",
        "PCI Express x2",
        "PCI Express x4",
        "PCI Express x8",
        "PCI Express x16",
        "PCI Express 2",
        "PCI Express 2 x1",
        "PCI Express 2 x2",
        "PCI Express 2 x4",
        "PCI Express 2 x8",
        "PCI Express 2 x16",
        "PCI Express 3",
        "PCI Express 3 x1",
        "PCI Express 3 x2",
        "PCI Express 3 x4",
        "PCI Express 3 x8",
        "PCI Express 3 x16",
    ];

    if code >= 0xa0 {
        lookup(TYPES_0XA0, 0xa0, u32::from(code))
    } else {
        lookup(TYPES, 0x01, u32::from(code))
    }
}

/// The bus width prefix of a slot type; empty for "Other" and "Unknown".
fn slot_bus_width(code: u8) -> &'static str {
    const WIDTHS: &[&str] = &[
        "", "", "8-bit ", "16-bit ", "32-bit ", "64-bit ", "128-bit ", "x1 ", "x2 ", "x4 ",
        "x8 ", "x12 ", "x16 ", "x32 ",
    ];

    lookup(WIDTHS, 0x01, u32::from(code))
}

fn slot_id(s: &Structure, ctx: &mut Context) {
    let (id1, id2) = (s.byte(0x09), s.byte(0x0a));

    match s.byte(0x05) {
        0x04 | 0x05 | 0x06 | 0x0e..=0x13 | 0x1f..=0x23 | 0xa5..=0xb6 => {
            ctx.out.attr("ID", format_args!("{}", id1));
        }
        0x07 => ctx.out.attr("ID", format_args!("Adapter {}, Socket {}", id1, id2)),
        _ => {}
    }
}

fn slot_characteristics(code1: u8, code2: u8, ctx: &mut Context) {
    const CHARACTERISTICS1: &[&str] = &[
        "5.0 V is provided",
        "3.3 V is provided",
        "Opening is shared",
        "PC Card-16 is supported",
        "Cardbus is supported",
        "Zoom Video is supported",
        "Modem ring resume is supported",
    ];
    const CHARACTERISTICS2: &[&str] = &[
        "PME signal is supported",
        "Hot-plug devices are supported",
        "SMBus signal is supported",
        "PCIe slot bifurcation is supported",
    ];

    if code1 & 0x01 != 0 {
        ctx.out.list_start("Characteristics", Some(format_args!("Unknown")));
        return;
    }
    if code1 & 0xfe == 0 && code2 & 0x07 == 0 {
        ctx.out.list_start("Characteristics", Some(format_args!("None")));
        return;
    }

    ctx.out.list_start("Characteristics", None);
    let set = bits(CHARACTERISTICS1, 1, u64::from(code1))
        .into_iter()
        .chain(bits(CHARACTERISTICS2, 0, u64::from(code2)));
    for name in set {
        ctx.out.list_item(format_args!("{}", name));
    }
    ctx.out.list_end();
}

pub fn slot(s: &Structure, ctx: &mut Context) {
    const USAGE: &[&str] = &["Other", "Unknown", "Available", "In Use", "Unavailable"];
    const LENGTHS: &[&str] = &["Other", "Unknown", "Short", "Long"];

    ctx.out.attr("Designation", format_args!("{}", s.string_at(0x04)));

    let width = slot_bus_width(s.byte(0x06));
    ctx.out.attr("Type", format_args!("{}{}", width, slot_type(s.byte(0x05))));
    ctx.out.attr(
        "Current Usage",
        format_args!("{}", lookup(USAGE, 0x01, u32::from(s.byte(0x07)))),
    );
    ctx.out.attr(
        "Length",
        format_args!("{}", lookup(LENGTHS, 0x01, u32::from(s.byte(0x08)))),
    );
    slot_id(s, ctx);

    let code2 = if s.length() < 0x0d { 0 } else { s.byte(0x0c) };
    slot_characteristics(s.byte(0x0b), code2, ctx);
    if s.length() < 0x11 {
        return;
    }

    segment_bus_func(s, 0x0d, ctx.out);
}

/// Names an on-board device type, shared by types 10 and 41.
fn device_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Video",
        "SCSI Controller",
        "Ethernet",
        "Token Ring",
        "Sound",
        "PATA Controller",
        "SATA Controller",
        "SAS Controller",
    ];

    lookup(TYPES, 0x01, u32::from(code & 0x7f))
}

fn device_status(code: u8) -> &'static str {
    if code & 0x80 != 0 {
        "Enabled"
    } else {
        "Disabled"
    }
}

pub fn on_board_devices(s: &Structure, ctx: &mut Context) {
    let count = (s.length() - 0x04) / 2;

    for i in 0..count {
        if count == 1 {
            ctx.out.handle_name("On Board Device Information");
        } else {
            ctx.out.handle_name(&format!("On Board Device {} Information", i + 1));
        }

        let code = s.byte(0x04 + 2 * i);
        ctx.out.attr("Type", format_args!("{}", device_type(code)));
        ctx.out.attr("Status", format_args!("{}", device_status(code)));
        ctx.out.attr("Description", format_args!("{}", s.string_at(0x05 + 2 * i)));
    }
}

pub fn onboard_device(s: &Structure, ctx: &mut Context) {
    let code = s.byte(0x05);

    ctx.out.attr("Reference Designation", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr("Type", format_args!("{}", device_type(code)));
    ctx.out.attr("Status", format_args!("{}", device_status(code)));
    ctx.out.attr("Type Instance", format_args!("{}", s.byte(0x06)));
    segment_bus_func(s, 0x07, ctx.out);
}
