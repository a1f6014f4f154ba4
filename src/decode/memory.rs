//! Memory structures: controllers and modules (types 5 and 6), arrays and
//! devices (types 16 and 17), error reports (types 18 and 33), address
//! mappings (types 19 and 20) and channels (type 37).

use super::{bit_list, bits, lookup, memory_size, Context};
use super::processor::{module_speed, voltage};
use crate::structure::Structure;

const MODULE_TYPES: &[&str] = &[
    "Other",
    "Unknown",
    "Standard",
    "FPM",
    "EDO",
    "Parity",
    "ECC",
    "SIMM",
    "DIMM",
    "Burst EDO",
    "SDRAM",
];

const EC_CAPABILITIES: &[&str] = &[
    "Other",
    "Unknown",
    "None",
    "Single-bit Error Correcting",
    "Double-bit Error Correcting",
    "Error Scrubbing",
];

fn interleave(code: u8) -> &'static str {
    const INTERLEAVE: &[&str] = &[
        "Other",
        "Unknown",
        "One-way Interleave",
        "Two-way Interleave",
        "Four-way Interleave",
        "Eight-way Interleave",
        "Sixteen-way Interleave",
    ];

    lookup(INTERLEAVE, 0x01, u32::from(code))
}

pub fn controller(s: &Structure, ctx: &mut Context) {
    const METHODS: &[&str] = &[
        "Other",
        "Unknown",
        "None",
        "8-bit Parity",
        "32-bit ECC",
        "64-bit ECC",
        "128-bit ECC",
        "CRC",
    ];
    const SPEEDS: &[&str] = &["Other", "Unknown", "70 ns", "60 ns", "50 ns"];

    let out = &mut *ctx.out;
    let module_size = 1u32 << (s.byte(0x08) & 0x1f);
    let count = s.byte(0x0e);

    out.attr(
        "Error Detecting Method",
        format_args!("{}", lookup(METHODS, 0x01, u32::from(s.byte(0x04)))),
    );
    bit_list(
        out,
        "Error Correcting Capabilities",
        EC_CAPABILITIES,
        0,
        u64::from(s.byte(0x05)),
    );
    out.attr("Supported Interleave", format_args!("{}", interleave(s.byte(0x06))));
    out.attr("Current Interleave", format_args!("{}", interleave(s.byte(0x07))));
    out.attr("Maximum Memory Module Size", format_args!("{} MB", module_size));
    out.attr(
        "Maximum Total Memory Size",
        format_args!("{} MB", u32::from(count).wrapping_mul(module_size)),
    );
    bit_list(out, "Supported Speeds", SPEEDS, 0, u64::from(s.word(0x09)));
    bit_list(out, "Supported Memory Types", MODULE_TYPES, 0, u64::from(s.word(0x0b)));
    out.attr("Memory Module Voltage", format_args!("{}", voltage(s.byte(0x0d))));

    let slots = usize::from(count);
    if s.length() < 0x0f + slots * 2 {
        return;
    }

    out.list_start("Associated Memory Slots", Some(format_args!("{}", count)));
    for i in 0..slots {
        out.list_item(format_args!("0x{:04X}", s.word(0x0f + 2 * i)));
    }
    out.list_end();
    if s.length() < 0x10 + slots * 2 {
        return;
    }

    bit_list(
        out,
        "Enabled Error Correcting Capabilities",
        EC_CAPABILITIES,
        0,
        u64::from(s.byte(0x0f + slots * 2)),
    );
}

fn module_connections(code: u8) -> String {
    if code == 0xff {
        return "None".to_string();
    }

    let mut parts = Vec::new();
    if code & 0xf0 != 0xf0 {
        parts.push((code >> 4).to_string());
    }
    if code & 0x0f != 0x0f {
        parts.push((code & 0x0f).to_string());
    }

    parts.join(" ")
}

fn module_size(code: u8) -> String {
    let size = match code & 0x7f {
        0x7d => "Not Determinable".to_string(),
        0x7e => "Disabled".to_string(),
        0x7f => return "Not Installed".to_string(),
        n => format!("{} MB", 1u64 << n),
    };

    if code & 0x80 != 0 {
        format!("{} (Double-bank Connection)", size)
    } else {
        format!("{} (Single-bank Connection)", size)
    }
}

pub fn module(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;

    out.attr("Socket Designation", format_args!("{}", s.string_at(0x04)));
    out.attr("Bank Connections", format_args!("{}", module_connections(s.byte(0x05))));
    out.attr("Current Speed", format_args!("{}", module_speed(s.byte(0x06))));

    let types = bits(MODULE_TYPES, 0, u64::from(s.word(0x07)));
    if types.is_empty() {
        out.attr("Type", format_args!("None"));
    } else {
        out.attr("Type", format_args!("{}", types.join(" ")));
    }

    out.attr("Installed Size", format_args!("{}", module_size(s.byte(0x09))));
    out.attr("Enabled Size", format_args!("{}", module_size(s.byte(0x0a))));

    let error = s.byte(0x0b);
    if error & (1 << 2) != 0 {
        out.list_start("Error Status", Some(format_args!("See Event Log")));
    } else if error & 0x03 == 0 {
        out.list_start("Error Status", Some(format_args!("OK")));
    } else {
        out.list_start("Error Status", None);
        if error & 0x01 != 0 {
            out.list_item(format_args!("Uncorrectable Errors"));
        }
        if error & 0x02 != 0 {
            out.list_item(format_args!("Correctable Errors"));
        }
        out.list_end();
    }
}

fn error_handle(code: u16) -> String {
    match code {
        0xfffe => "Not Provided".to_string(),
        0xffff => "No Error".to_string(),
        n => format!("0x{:04X}", n),
    }
}

pub fn array(s: &Structure, ctx: &mut Context) {
    const LOCATIONS: &[&str] = &[
        "Other",
        "Unknown",
        "System Board Or Motherboard",
        "ISA Add-on Card",
        "EISA Add-on Card",
        "PCI Add-on Card",
        "MCA Add-on Card",
        "PCMCIA Add-on Card",
        "Proprietary Add-on Card",
        "NuBus",
    ];
    const LOCATIONS_0XA0: &[&str] = &[
        "PC-98/C20 Add-on Card",
        "PC-98/C24 Add-on Card",
        "PC-98/E Add-on Card",
        "PC-98/Local Bus Add-on Card",
    ];
    const USES: &[&str] = &[
        "Other",
        "Unknown",
        "System Memory",
        "Video Memory",
        "Flash Memory",
        "Non-volatile RAM",
        "Cache Memory",
    ];
    const EC_TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "None",
        "Parity",
        "Single-bit ECC",
        "Multi-bit ECC",
        "CRC",
    ];

    let location = match s.byte(0x04) {
        code @ 0xa0..=0xa3 => lookup(LOCATIONS_0XA0, 0xa0, u32::from(code)),
        code => lookup(LOCATIONS, 0x01, u32::from(code)),
    };

    let capacity = match s.dword(0x07) {
        0x8000_0000 if s.length() < 0x17 => "Unknown".to_string(),
        0x8000_0000 => memory_size(s.qword(0x0f), 0),
        kb => memory_size(u64::from(kb), 1),
    };

    ctx.out.attr("Location", format_args!("{}", location));
    ctx.out.attr("Use", format_args!("{}", lookup(USES, 0x01, u32::from(s.byte(0x05)))));
    ctx.out.attr(
        "Error Correction Type",
        format_args!("{}", lookup(EC_TYPES, 0x01, u32::from(s.byte(0x06)))),
    );
    ctx.out.attr("Maximum Capacity", format_args!("{}", capacity));
    if !ctx.quiet {
        ctx.out.attr(
            "Error Information Handle",
            format_args!("{}", error_handle(s.word(0x0b))),
        );
    }
    ctx.out.attr("Number Of Devices", format_args!("{}", s.word(0x0d)));
}

fn device_width(code: u16) -> String {
    match code {
        0 | 0xffff => "Unknown".to_string(),
        n => format!("{} bits", n),
    }
}

fn device_size(code: u16) -> String {
    match code {
        0 => "No Module Installed".to_string(),
        0xffff => "Unknown".to_string(),
        n if n & 0x8000 != 0 => format!("{} kB", n & 0x7fff),
        n => format!("{} MB", n),
    }
}

fn device_extended_size(code: u32) -> String {
    let code = code & 0x7fff_ffff;

    if code & 0x3ff != 0 {
        format!("{} MB", code)
    } else if code & 0xf_fc00 != 0 {
        format!("{} GB", code >> 10)
    } else {
        format!("{} TB", code >> 20)
    }
}

fn device_set(code: u8) -> String {
    match code {
        0 => "None".to_string(),
        0xff => "Unknown".to_string(),
        n => n.to_string(),
    }
}

fn device_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "DRAM",
        "EDRAM",
        "VRAM",
        "SRAM",
        "RAM",
        "ROM",
        "Flash",
        "EEPROM",
        "FEPROM",
        "EPROM",
        "CDRAM",
        "3DRAM",
        "SDRAM",
        "SGRAM",
        "RDRAM",
        "DDR",
        "DDR2",
        "DDR2 FB-DIMM",
        "Reserved",
        "Reserved",
        "Reserved",
        "DDR3",
        "FBD2",
        "DDR4",
        "LPDDR",
        "LPDDR2",
        "LPDDR3",
        "LPDDR4",
    ];

    lookup(TYPES, 0x01, u32::from(code))
}

/// Joins the labels of bits 1 and up, or "None" when none of them is set.
fn flag_words(names: &[&'static str], code: u16) -> String {
    if code & 0xfffe == 0 {
        return "None".to_string();
    }

    bits(names, 1, u64::from(code)).join(" ")
}

fn device_speed(code: u16) -> String {
    match code {
        0 => "Unknown".to_string(),
        n => format!("{} MT/s", n),
    }
}

fn device_voltage(code: u16) -> String {
    let volts = f64::from(code) / 1000.0;

    match code {
        0 => "Unknown".to_string(),
        n if n % 100 != 0 => format!("{} V", volts),
        _ => format!("{:.1} V", volts),
    }
}

fn manufacturer_id(code: u16) -> String {
    match code {
        0 => "Unknown".to_string(),
        n => format!("Bank {}, Hex 0x{:02X}", (n & 0x7f) + 1, n >> 8),
    }
}

fn product_id(code: u16) -> String {
    match code {
        0 => "Unknown".to_string(),
        n => format!("0x{:04X}", n),
    }
}

fn region_size(code: u64) -> String {
    match code {
        0xffff_ffff_ffff_ffff => "Unknown".to_string(),
        0 => "None".to_string(),
        n => memory_size(n, 0),
    }
}

pub fn device(s: &Structure, ctx: &mut Context) {
    const FORM_FACTORS: &[&str] = &[
        "Other",
        "Unknown",
        "SIMM",
        "SIP",
        "Chip",
        "DIP",
        "ZIP",
        "Proprietary Card",
        "DIMM",
        "TSOP",
        "Row Of Chips",
        "RIMM",
        "SODIMM",
        "SRIMM",
        "FB-DIMM",
    ];
    const TYPE_DETAILS: &[&str] = &[
        "Other",
        "Unknown",
        "Fast-paged",
        "Static Column",
        "Pseudo-static",
        "RAMBus",
        "Synchronous",
        "CMOS",
        "EDO",
        "Window DRAM",
        "Cache DRAM",
        "Non-Volatile",
        "Registered (Buffered)",
        "Unbuffered (Unregistered)",
        "LRDIMM",
    ];
    const TECHNOLOGIES: &[&str] = &[
        "Other",
        "Unknown",
        "DRAM",
        "NVDIMM-N",
        "NVDIMM-F",
        "NVDIMM-P",
        "Intel persistent memory",
    ];
    const MODES: &[&str] = &[
        "Other",
        "Unknown",
        "Volatile memory",
        "Byte-accessible persistent memory",
        "Block-accessible persistent memory",
    ];

    let out = &mut *ctx.out;
    let len = s.length();

    if !ctx.quiet {
        out.attr("Array Handle", format_args!("0x{:04X}", s.word(0x04)));
        out.attr(
            "Error Information Handle",
            format_args!("{}", error_handle(s.word(0x06))),
        );
    }
    out.attr("Total Width", format_args!("{}", device_width(s.word(0x08))));
    out.attr("Data Width", format_args!("{}", device_width(s.word(0x0a))));

    let size = if len >= 0x20 && s.word(0x0c) == 0x7fff {
        device_extended_size(s.dword(0x1c))
    } else {
        device_size(s.word(0x0c))
    };
    out.attr("Size", format_args!("{}", size));
    out.attr(
        "Form Factor",
        format_args!("{}", lookup(FORM_FACTORS, 0x01, u32::from(s.byte(0x0e)))),
    );
    out.attr("Set", format_args!("{}", device_set(s.byte(0x0f))));
    out.attr("Locator", format_args!("{}", s.string_at(0x10)));
    out.attr("Bank Locator", format_args!("{}", s.string_at(0x11)));
    out.attr("Type", format_args!("{}", device_type(s.byte(0x12))));
    out.attr("Type Detail", format_args!("{}", flag_words(TYPE_DETAILS, s.word(0x13))));
    if len < 0x17 {
        return;
    }

    out.attr("Speed", format_args!("{}", device_speed(s.word(0x15))));
    if len < 0x1b {
        return;
    }

    out.attr("Manufacturer", format_args!("{}", s.string_at(0x17)));
    out.attr("Serial Number", format_args!("{}", s.string_at(0x18)));
    out.attr("Asset Tag", format_args!("{}", s.string_at(0x19)));
    out.attr("Part Number", format_args!("{}", s.string_at(0x1a)));
    if len < 0x1c {
        return;
    }

    match s.byte(0x1b) & 0x0f {
        0 => out.attr("Rank", format_args!("Unknown")),
        n => out.attr("Rank", format_args!("{}", n)),
    }
    if len < 0x22 {
        return;
    }

    out.attr("Configured Memory Speed", format_args!("{}", device_speed(s.word(0x20))));
    if len < 0x28 {
        return;
    }

    out.attr("Minimum Voltage", format_args!("{}", device_voltage(s.word(0x22))));
    out.attr("Maximum Voltage", format_args!("{}", device_voltage(s.word(0x24))));
    out.attr("Configured Voltage", format_args!("{}", device_voltage(s.word(0x26))));
    if len < 0x34 {
        return;
    }

    out.attr(
        "Memory Technology",
        format_args!("{}", lookup(TECHNOLOGIES, 0x01, u32::from(s.byte(0x28)))),
    );
    out.attr(
        "Memory Operating Mode Capability",
        format_args!("{}", flag_words(MODES, s.word(0x29))),
    );
    out.attr("Firmware Version", format_args!("{}", s.string_at(0x2b)));
    out.attr("Module Manufacturer ID", format_args!("{}", manufacturer_id(s.word(0x2c))));
    out.attr("Module Product ID", format_args!("{}", product_id(s.word(0x2e))));
    out.attr(
        "Memory Subsystem Controller Manufacturer ID",
        format_args!("{}", manufacturer_id(s.word(0x30))),
    );
    out.attr(
        "Memory Subsystem Controller Product ID",
        format_args!("{}", product_id(s.word(0x32))),
    );

    let regions = [
        (0x3c, 0x34, "Non-Volatile Size"),
        (0x44, 0x3c, "Volatile Size"),
        (0x4c, 0x44, "Cache Size"),
        (0x54, 0x4c, "Logical Size"),
    ];
    for &(min, offset, name) in &regions {
        if len < min {
            return;
        }
        out.attr(name, format_args!("{}", region_size(s.qword(offset))));
    }
}

fn error_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "OK",
        "Bad Read",
        "Parity Error",
        "Single-bit Error",
        "Double-bit Error",
        "Multi-bit Error",
        "Nibble Error",
        "Checksum Error",
        "CRC Error",
        "Corrected Single-bit Error",
        "Corrected Error",
        "Uncorrectable Error",
    ];

    lookup(TYPES, 0x01, u32::from(code))
}

/// Emits the fields shared by 32-bit and 64-bit memory error reports.
fn error_common(s: &Structure, ctx: &mut Context) {
    const GRANULARITY: &[&str] = &["Other", "Unknown", "Device Level", "Memory Partition Level"];
    const OPERATIONS: &[&str] = &["Other", "Unknown", "Read", "Write", "Partial Write"];

    ctx.out.attr("Type", format_args!("{}", error_type(s.byte(0x04))));
    ctx.out.attr(
        "Granularity",
        format_args!("{}", lookup(GRANULARITY, 0x01, u32::from(s.byte(0x05)))),
    );
    ctx.out.attr(
        "Operation",
        format_args!("{}", lookup(OPERATIONS, 0x01, u32::from(s.byte(0x06)))),
    );

    match s.dword(0x07) {
        0 => ctx.out.attr("Vendor Syndrome", format_args!("Unknown")),
        n => ctx.out.attr("Vendor Syndrome", format_args!("0x{:08X}", n)),
    }
}

fn error_address_32(code: u32) -> String {
    match code {
        0x8000_0000 => "Unknown".to_string(),
        n => format!("0x{:08X}", n),
    }
}

fn error_address_64(code: u64) -> String {
    match code {
        0x8000_0000_0000_0000 => "Unknown".to_string(),
        n => format!("0x{:016X}", n),
    }
}

pub fn error_32(s: &Structure, ctx: &mut Context) {
    error_common(s, ctx);

    ctx.out.attr("Memory Array Address", format_args!("{}", error_address_32(s.dword(0x0b))));
    ctx.out.attr("Device Address", format_args!("{}", error_address_32(s.dword(0x0f))));
    ctx.out.attr("Resolution", format_args!("{}", error_address_32(s.dword(0x13))));
}

pub fn error_64(s: &Structure, ctx: &mut Context) {
    error_common(s, ctx);

    ctx.out.attr("Memory Array Address", format_args!("{}", error_address_64(s.qword(0x0b))));
    ctx.out.attr("Device Address", format_args!("{}", error_address_64(s.qword(0x13))));
    ctx.out.attr("Resolution", format_args!("{}", error_address_32(s.dword(0x1b))));
}

/// Emits the address range shared by types 19 and 20. Extended 64-bit
/// addresses are used when the 32-bit start address reads all ones.
fn mapped_range(s: &Structure, extended_min: usize, extended_offset: usize, ctx: &mut Context) {
    let start = s.dword(0x04);
    let end = s.dword(0x08);

    if s.length() >= extended_min && start == 0xffff_ffff {
        let start = s.qword(extended_offset);
        let end = s.qword(extended_offset + 8);

        ctx.out.attr("Starting Address", format_args!("0x{:016X}k", start));
        ctx.out.attr("Ending Address", format_args!("0x{:016X}k", end));
        if start == end {
            ctx.out.attr("Range Size", format_args!("Invalid"));
        } else {
            let size = memory_size(end.wrapping_sub(start).wrapping_add(1), 0);
            ctx.out.attr("Range Size", format_args!("{}", size));
        }
        return;
    }

    ctx.out.attr(
        "Starting Address",
        format_args!("0x{:08X}{:03X}", start >> 2, (start & 0x3) << 10),
    );
    ctx.out.attr(
        "Ending Address",
        format_args!("0x{:08X}{:03X}", end >> 2, ((end & 0x3) << 10) + 0x3ff),
    );
    match end.wrapping_sub(start).wrapping_add(1) {
        0 => ctx.out.attr("Range Size", format_args!("Invalid")),
        kb => ctx.out.attr("Range Size", format_args!("{}", memory_size(u64::from(kb), 1))),
    }
}

pub fn array_mapped_address(s: &Structure, ctx: &mut Context) {
    mapped_range(s, 0x1f, 0x0f, ctx);

    if !ctx.quiet {
        ctx.out.attr("Physical Array Handle", format_args!("0x{:04X}", s.word(0x0c)));
    }
    ctx.out.attr("Partition Width", format_args!("{}", s.byte(0x0e)));
}

pub fn device_mapped_address(s: &Structure, ctx: &mut Context) {
    mapped_range(s, 0x23, 0x13, ctx);

    if !ctx.quiet {
        ctx.out.attr("Physical Device Handle", format_args!("0x{:04X}", s.word(0x0c)));
        ctx.out.attr(
            "Memory Array Mapped Address Handle",
            format_args!("0x{:04X}", s.word(0x0e)),
        );
    }

    match s.byte(0x10) {
        0 => ctx.out.attr("Partition Row Position", format_args!("{}", super::OUT_OF_SPEC)),
        0xff => ctx.out.attr("Partition Row Position", format_args!("Unknown")),
        n => ctx.out.attr("Partition Row Position", format_args!("{}", n)),
    }

    for &(offset, name) in &[(0x11, "Interleave Position"), (0x12, "Interleaved Data Depth")] {
        match s.byte(offset) {
            0 => {}
            0xff => ctx.out.attr(name, format_args!("Unknown")),
            n => ctx.out.attr(name, format_args!("{}", n)),
        }
    }
}

pub fn channel(s: &Structure, ctx: &mut Context) {
    const TYPES: &[&str] = &["Other", "Unknown", "RamBus", "SyncLink"];

    let count = s.byte(0x06);

    ctx.out.attr("Type", format_args!("{}", lookup(TYPES, 0x01, u32::from(s.byte(0x04)))));
    ctx.out.attr("Maximal Load", format_args!("{}", s.byte(0x05)));
    ctx.out.attr("Devices", format_args!("{}", count));
    if s.length() < 0x07 + 3 * usize::from(count) {
        return;
    }

    for i in 1..=usize::from(count) {
        let base = 0x07 + 3 * (i - 1);
        ctx.out.attr(&format!("Device {} Load", i), format_args!("{}", s.byte(base)));
        if !ctx.quiet {
            ctx.out.attr(
                &format!("Device {} Handle", i),
                format_args!("0x{:04X}", s.word(base + 1)),
            );
        }
    }
}
