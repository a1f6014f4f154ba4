//! System-level structures: system, base board and chassis identification,
//! free-form strings, event log, reset, security and boot status.

use super::{bcd_range, lookup, structure_type, Context, OUT_OF_SPEC};
use crate::entry::Version;
use crate::structure::Structure;
use crate::util;

/// Formats a system UUID. Since SMBIOS 2.6 the first three fields are
/// little-endian.
pub fn uuid(p: &[u8], version: Version) -> String {
    if p.iter().all(|&b| b == 0xff) {
        return "Not Present".to_string();
    }
    if p.iter().all(|&b| b == 0x00) {
        return "Not Settable".to_string();
    }

    let order: [usize; 16] = if version >= Version::new(2, 6, 0) {
        [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15]
    } else {
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
    };

    let mut s = String::with_capacity(36);
    for (i, &idx) in order.iter().enumerate() {
        if i == 4 || i == 6 || i == 8 || i == 10 {
            s.push('-');
        }
        s.push_str(&format!("{:02x}", p[idx]));
    }

    s
}

fn wake_up_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Reserved",
        "Other",
        "Unknown",
        "APM Timer",
        "Modem Ring",
        "LAN Remote",
        "Power Switch",
        "PCI PME#",
        "AC Power Restored",
    ];

    lookup(TYPES, 0x00, u32::from(code))
}

pub fn system(s: &Structure, ctx: &mut Context) {
    ctx.out.attr("Manufacturer", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr("Product Name", format_args!("{}", s.string_at(0x05)));
    ctx.out.attr("Version", format_args!("{}", s.string_at(0x06)));
    ctx.out.attr("Serial Number", format_args!("{}", s.string_at(0x07)));
    if s.length() < 0x19 {
        return;
    }

    if let Some(p) = s.field(0x08, 16) {
        ctx.out.attr("UUID", format_args!("{}", uuid(p, ctx.version)));
    }
    ctx.out.attr("Wake-up Type", format_args!("{}", wake_up_type(s.byte(0x18))));
    if s.length() < 0x1b {
        return;
    }

    ctx.out.attr("SKU Number", format_args!("{}", s.string_at(0x19)));
    ctx.out.attr("Family", format_args!("{}", s.string_at(0x1a)));
}

/// Names a base board type, also used for chassis contained elements.
pub fn base_board_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Unknown",
        "Other",
        "Server Blade",
        "Connectivity Switch",
        "System Management Module",
        "Processor Module",
        "I/O Module",
        "Memory Module",
        "Daughter Board",
        "Motherboard",
        "Processor+Memory Module",
        "Processor+I/O Module",
        "Interconnect Board",
    ];

    lookup(TYPES, 0x01, u32::from(code))
}

pub fn base_board(s: &Structure, ctx: &mut Context) {
    const FEATURES: &[&str] = &[
        "Board is a hosting board",
        "Board requires at least one daughter board",
        "Board is removable",
        "Board is replaceable",
        "Board is hot swappable",
    ];

    ctx.out.attr("Manufacturer", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr("Product Name", format_args!("{}", s.string_at(0x05)));
    ctx.out.attr("Version", format_args!("{}", s.string_at(0x06)));
    ctx.out.attr("Serial Number", format_args!("{}", s.string_at(0x07)));
    if s.length() < 0x09 {
        return;
    }

    ctx.out.attr("Asset Tag", format_args!("{}", s.string_at(0x08)));
    if s.length() < 0x0a {
        return;
    }

    super::bit_list(ctx.out, "Features", FEATURES, 0, u64::from(s.byte(0x09)));
    if s.length() < 0x0e {
        return;
    }

    ctx.out.attr("Location In Chassis", format_args!("{}", s.string_at(0x0a)));
    if !ctx.quiet {
        ctx.out.attr("Chassis Handle", format_args!("0x{:04X}", s.word(0x0b)));
    }
    ctx.out.attr("Type", format_args!("{}", base_board_type(s.byte(0x0d))));

    let count = s.byte(0x0e);
    if s.length() < 0x0f + usize::from(count) * 2 || ctx.quiet {
        return;
    }

    ctx.out.list_start("Contained Object Handles", Some(format_args!("{}", count)));
    for i in 0..usize::from(count) {
        ctx.out.list_item(format_args!("0x{:04X}", s.word(0x0f + 2 * i)));
    }
    ctx.out.list_end();
}

/// Names a chassis type; bit 7 of the code is the lock bit and is ignored.
pub fn chassis_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Desktop",
        "Low Profile Desktop",
        "Pizza Box",
        "Mini Tower",
        "Tower",
        "Portable",
        "Laptop",
        "Notebook",
        "Hand Held",
        "Docking Station",
        "All In One",
        "Sub Notebook",
        "Space-saving",
        "Lunch Box",
        "Main Server Chassis",
        "Expansion Chassis",
        "Sub Chassis",
        "Bus Expansion Chassis",
        "Peripheral Chassis",
        "RAID Chassis",
        "Rack Mount Chassis",
        "Sealed-case PC",
        "Multi-system",
        "CompactPCI",
        "AdvancedTCA",
        "Blade",
        "Blade Enclosing",
        "Tablet",
        "Convertible",
        "Detachable",
        "IoT Gateway",
        "Embedded PC",
        "Mini PC",
        "Stick PC",
    ];

    lookup(TYPES, 0x01, u32::from(code & 0x7f))
}

fn chassis_state(code: u8) -> &'static str {
    const STATES: &[&str] = &[
        "Other",
        "Unknown",
        "Safe",
        "Warning",
        "Critical",
        "Non-recoverable",
    ];

    lookup(STATES, 0x01, u32::from(code))
}

fn chassis_security_status(code: u8) -> &'static str {
    const STATUS: &[&str] = &[
        "Other",
        "Unknown",
        "None",
        "External Interface Locked Out",
        "External Interface Enabled",
    ];

    lookup(STATUS, 0x01, u32::from(code))
}

pub fn chassis(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;

    out.attr("Manufacturer", format_args!("{}", s.string_at(0x04)));
    out.attr("Type", format_args!("{}", chassis_type(s.byte(0x05))));
    out.attr(
        "Lock",
        format_args!(
            "{}",
            if s.byte(0x05) & 0x80 != 0 {
                "Present"
            } else {
                "Not Present"
            }
        ),
    );
    out.attr("Version", format_args!("{}", s.string_at(0x06)));
    out.attr("Serial Number", format_args!("{}", s.string_at(0x07)));
    out.attr("Asset Tag", format_args!("{}", s.string_at(0x08)));
    if s.length() < 0x0d {
        return;
    }

    out.attr("Boot-up State", format_args!("{}", chassis_state(s.byte(0x09))));
    out.attr("Power Supply State", format_args!("{}", chassis_state(s.byte(0x0a))));
    out.attr("Thermal State", format_args!("{}", chassis_state(s.byte(0x0b))));
    out.attr(
        "Security Status",
        format_args!("{}", chassis_security_status(s.byte(0x0c))),
    );
    if s.length() < 0x11 {
        return;
    }

    out.attr("OEM Information", format_args!("0x{:08X}", s.dword(0x0d)));
    if s.length() < 0x13 {
        return;
    }

    match s.byte(0x11) {
        0 => out.attr("Height", format_args!("Unspecified")),
        n => out.attr("Height", format_args!("{} U", n)),
    }
    match s.byte(0x12) {
        0 => out.attr("Number Of Power Cords", format_args!("Unspecified")),
        n => out.attr("Number Of Power Cords", format_args!("{}", n)),
    }
    if s.length() < 0x15 {
        return;
    }

    let count = usize::from(s.byte(0x13));
    let len = usize::from(s.byte(0x14));
    if s.length() < 0x15 + count * len {
        return;
    }

    out.list_start("Contained Elements", Some(format_args!("{}", count)));
    if len >= 0x03 {
        for i in 0..count {
            let base = 0x15 + i * len;
            let code = s.byte(base);
            let kind = if code & 0x80 != 0 {
                structure_type(code & 0x7f)
            } else {
                base_board_type(code & 0x7f)
            };

            let (min, max) = (s.byte(base + 1), s.byte(base + 2));
            if min == max {
                out.list_item(format_args!("{} ({})", kind, min));
            } else {
                out.list_item(format_args!("{} ({}-{})", kind, min, max));
            }
        }
    }
    out.list_end();

    if s.length() < 0x16 + count * len {
        return;
    }

    out.attr("SKU Number", format_args!("{}", s.string_at(0x15 + count * len)));
}

pub fn oem_strings(s: &Structure, ctx: &mut Context) {
    for i in 1..=s.byte(0x04) {
        ctx.out.attr(&format!("String {}", i), format_args!("{}", s.string(i)));
    }
}

pub fn configuration_options(s: &Structure, ctx: &mut Context) {
    for i in 1..=s.byte(0x04) {
        ctx.out.attr(&format!("Option {}", i), format_args!("{}", s.string(i)));
    }
}

pub fn group_associations(s: &Structure, ctx: &mut Context) {
    let count = (s.length() - 0x05) / 3;

    ctx.out.attr("Name", format_args!("{}", s.string_at(0x04)));
    ctx.out.list_start("Items", Some(format_args!("{}", count)));
    for i in 0..count {
        let base = 0x05 + 3 * i;
        ctx.out.list_item(format_args!(
            "0x{:04X} ({})",
            s.word(base + 1),
            structure_type(s.byte(base))
        ));
    }
    ctx.out.list_end();
}

fn event_log_method(code: u8) -> &'static str {
    const METHODS: &[&str] = &[
        "Indexed I/O, one 8-bit index port, one 8-bit data port",
        "Indexed I/O, two 8-bit index ports, one 8-bit data port",
        "Indexed I/O, one 16-bit index port, one 8-bit data port",
        "Memory-mapped physical 32-bit address",
        "General-purpose non-volatile data functions",
    ];

    if code >= 0x80 {
        return "OEM-specific";
    }

    lookup(METHODS, 0x00, u32::from(code))
}

fn event_log_address(method: u8, s: &Structure) -> String {
    match method {
        0x00..=0x02 => format!("Index 0x{:04X}, Data 0x{:04X}", s.word(0x10), s.word(0x12)),
        0x03 => format!("0x{:08X}", s.dword(0x10)),
        0x04 => format!("0x{:04X}", s.word(0x10)),
        _ => "Unknown".to_string(),
    }
}

fn event_log_header_format(code: u8) -> &'static str {
    match code {
        0x00 => "No Header",
        0x01 => "Type 1",
        0x80..=0xff => "OEM-specific",
        _ => OUT_OF_SPEC,
    }
}

fn event_log_descriptor_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "",
        "Single-bit ECC memory error",
        "Multi-bit ECC memory error",
        "Parity memory error",
        "Bus timeout",
        "I/O channel block",
        "Software NMI",
        "POST memory resize",
        "POST error",
        "PCI parity error",
        "PCI system error",
        "CPU failure",
        "EISA failsafe timer timeout",
        "Correctable memory log disabled",
        "Logging disabled",
        "",
        "System limit exceeded",
        "Asynchronous hardware timer expired",
        "System configuration information",
        "Hard disk information",
        "System reconfigured",
        "Uncorrectable CPU-complex error",
        "Log area reset/cleared",
        "System boot",
    ];

    match code {
        0x80..=0xfe => "OEM-specific",
        0xff => "End of log",
        _ => match lookup(TYPES, 0x00, u32::from(code)) {
            "" => OUT_OF_SPEC,
            name => name,
        },
    }
}

fn event_log_descriptor_format(code: u8) -> &'static str {
    const FORMATS: &[&str] = &[
        "None",
        "Handle",
        "Multiple-event",
        "Multiple-event handle",
        "POST results bitmap",
        "System management",
        "Multiple-event system management",
    ];

    if code >= 0x80 {
        return "OEM-specific";
    }

    lookup(FORMATS, 0x00, u32::from(code))
}

pub fn event_log(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;

    let header_start = s.word(0x06);
    let data_start = s.word(0x08);

    out.attr("Area Length", format_args!("{} bytes", s.word(0x04)));
    out.attr("Header Start Offset", format_args!("0x{:04X}", header_start));

    let header_len = i32::from(data_start) - i32::from(header_start);
    if header_len != 0 {
        out.attr(
            "Header Length",
            format_args!(
                "{} byte{}",
                header_len as u32,
                if header_len > 1 { "s" } else { "" }
            ),
        );
    }

    out.attr("Data Start Offset", format_args!("0x{:04X}", data_start));

    let method = s.byte(0x0a);
    out.attr("Access Method", format_args!("{}", event_log_method(method)));
    out.attr("Access Address", format_args!("{}", event_log_address(method, s)));

    let status = s.byte(0x0b);
    out.attr(
        "Status",
        format_args!(
            "{}, {}",
            if status & 0x01 != 0 { "Valid" } else { "Invalid" },
            if status & 0x02 != 0 { "Full" } else { "Not Full" }
        ),
    );
    out.attr("Change Token", format_args!("0x{:08X}", s.dword(0x0c)));
    if s.length() < 0x17 {
        return;
    }

    out.attr(
        "Header Format",
        format_args!("{}", event_log_header_format(s.byte(0x14))),
    );

    let count = usize::from(s.byte(0x15));
    let len = usize::from(s.byte(0x16));
    out.attr("Supported Log Type Descriptors", format_args!("{}", count));
    if s.length() < 0x17 + count * len || len < 0x02 {
        return;
    }

    for i in 0..count {
        let base = 0x17 + i * len;
        out.attr(
            &format!("Descriptor {}", i + 1),
            format_args!("{}", event_log_descriptor_type(s.byte(base))),
        );
        out.attr(
            &format!("Data Format {}", i + 1),
            format_args!("{}", event_log_descriptor_format(s.byte(base + 1))),
        );
    }
}

pub fn pointing_device(s: &Structure, ctx: &mut Context) {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Mouse",
        "Track Ball",
        "Track Point",
        "Glide Point",
        "Touch Pad",
        "Touch Screen",
        "Optical Sensor",
    ];
    const INTERFACES: &[&str] = &[
        "Other",
        "Unknown",
        "Serial",
        "PS/2",
        "Infrared",
        "HIP-HIL",
        "Bus Mouse",
        "ADB (Apple Desktop Bus)",
    ];
    const INTERFACES_0XA0: &[&str] = &["Bus Mouse DB-9", "Bus Mouse Micro DIN", "USB"];

    let interface = match s.byte(0x05) {
        code @ 0xa0..=0xa2 => lookup(INTERFACES_0XA0, 0xa0, u32::from(code)),
        code => lookup(INTERFACES, 0x01, u32::from(code)),
    };

    ctx.out.attr("Type", format_args!("{}", lookup(TYPES, 0x01, u32::from(s.byte(0x04)))));
    ctx.out.attr("Interface", format_args!("{}", interface));
    ctx.out.attr("Buttons", format_args!("{}", s.byte(0x06)));
}

pub fn reset(s: &Structure, ctx: &mut Context) {
    const BOOT_OPTIONS: &[&str] = &[OUT_OF_SPEC, "Operating System", "System Utilities", "Do Not Reboot"];

    fn count(code: u16) -> String {
        match code {
            0xffff => "Unknown".to_string(),
            n => n.to_string(),
        }
    }

    fn timer(code: u16) -> String {
        match code {
            0xffff => "Unknown".to_string(),
            n => format!("{} min", n),
        }
    }

    let out = &mut *ctx.out;
    let caps = s.byte(0x04);

    out.attr("Status", format_args!("{}", if caps & 0x01 != 0 { "Enabled" } else { "Disabled" }));

    let watchdog = caps & (1 << 5) != 0;
    out.attr(
        "Watchdog Timer",
        format_args!("{}", if watchdog { "Present" } else { "Not Present" }),
    );
    if !watchdog {
        return;
    }

    out.attr("Boot Option", format_args!("{}", BOOT_OPTIONS[usize::from((caps >> 1) & 0x3)]));
    out.attr(
        "Boot Option On Limit",
        format_args!("{}", BOOT_OPTIONS[usize::from((caps >> 3) & 0x3)]),
    );
    out.attr("Reset Count", format_args!("{}", count(s.word(0x05))));
    out.attr("Reset Limit", format_args!("{}", count(s.word(0x07))));
    out.attr("Timer Interval", format_args!("{}", timer(s.word(0x09))));
    out.attr("Timeout", format_args!("{}", timer(s.word(0x0b))));
}

pub fn hardware_security(s: &Structure, ctx: &mut Context) {
    const STATUS: &[&str] = &["Disabled", "Enabled", "Not Implemented", "Unknown"];

    let code = s.byte(0x04);
    let status = |shift: u8| STATUS[usize::from((code >> shift) & 0x3)];

    ctx.out.attr("Power-On Password Status", format_args!("{}", status(6)));
    ctx.out.attr("Keyboard Password Status", format_args!("{}", status(4)));
    ctx.out.attr("Administrator Password Status", format_args!("{}", status(2)));
    ctx.out.attr("Front Panel Reset Status", format_args!("{}", status(0)));
}

pub fn power_controls(s: &Structure, ctx: &mut Context) {
    // Month, day, hour, minute and second, in BCD.
    let fields = [
        (s.byte(0x04), 0x01, 0x12, ""),
        (s.byte(0x05), 0x01, 0x31, "-"),
        (s.byte(0x06), 0x00, 0x23, " "),
        (s.byte(0x07), 0x00, 0x59, ":"),
        (s.byte(0x08), 0x00, 0x59, ":"),
    ];

    let mut next = String::new();
    for &(value, low, high, sep) in &fields {
        next.push_str(sep);
        if bcd_range(value, low, high) {
            next.push_str(&format!("{:02X}", value));
        } else {
            next.push('*');
        }
    }

    ctx.out.attr("Next Scheduled Power-on", format_args!("{}", next));
}

pub fn remote_access(s: &Structure, ctx: &mut Context) {
    let flags = s.byte(0x05);
    let state = |bit: u8| if flags & (1 << bit) != 0 { "Enabled" } else { "Disabled" };

    ctx.out.attr("Manufacturer Name", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr("Inbound Connection", format_args!("{}", state(0)));
    ctx.out.attr("Outbound Connection", format_args!("{}", state(1)));
}

pub fn boot_integrity(s: &Structure, ctx: &mut Context) {
    let entry = s.dword(0x08);

    ctx.out.attr(
        "Checksum",
        format_args!("{}", if util::checksum(s.data()) { "OK" } else { "Invalid" }),
    );
    ctx.out.attr(
        "16-bit Entry Point Address",
        format_args!("{:04X}:{:04X}", entry >> 16, entry & 0xffff),
    );
    ctx.out.attr("32-bit Entry Point Address", format_args!("0x{:08X}", s.dword(0x0c)));
}

pub fn boot(s: &Structure, ctx: &mut Context) {
    const STATUS: &[&str] = &[
        "No errors detected",
        "No bootable media",
        "Operating system failed to load",
        "Firmware-detected hardware failure",
        "Operating system-detected hardware failure",
        "User-requested boot",
        "System security violation",
        "Previously-requested image",
        "System watchdog timer expired",
    ];

    let status = match s.byte(0x0a) {
        128..=191 => "OEM-specific",
        192..=255 => "Product-specific",
        code => lookup(STATUS, 0, u32::from(code)),
    };

    ctx.out.attr("Status", format_args!("{}", status));
}

pub fn additional_information(s: &Structure, ctx: &mut Context) {
    let count = s.byte(0x04);
    let mut offset = 0x05;

    for i in 1..=count {
        ctx.out.handle_name(&format!("Additional Information {}", i));

        if s.length() < offset + 1 {
            break;
        }
        let length = usize::from(s.byte(offset));
        if length < 0x05 || s.length() < offset + length {
            break;
        }

        ctx.out.attr("Referenced Handle", format_args!("0x{:04x}", s.word(offset + 0x01)));
        ctx.out.attr("Referenced Offset", format_args!("0x{:02x}", s.byte(offset + 0x03)));
        ctx.out.attr("String", format_args!("{}", s.string_at(offset + 0x04)));

        let value = match length - 0x05 {
            1 => format!("0x{:02x}", s.byte(offset + 0x05)),
            2 => format!("0x{:04x}", s.word(offset + 0x05)),
            4 => format!("0x{:08x}", s.dword(offset + 0x05)),
            _ => "Unexpected size".to_string(),
        };
        ctx.out.attr("Value", format_args!("{}", value));

        offset += length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::{render, render_with, V32};

    #[rustfmt::skip]
    const UUID: [u8; 16] = [
        0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66,
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];

    #[test]
    fn uuid_byte_order() {
        assert_eq!(
            uuid(&UUID, Version::new(2, 6, 0)),
            "00112233-4455-6677-8899-aabbccddeeff"
        );
        assert_eq!(
            uuid(&UUID, Version::new(2, 5, 0)),
            "33221100-5544-7766-8899-aabbccddeeff"
        );
        assert_eq!(uuid(&[0xff; 16], V32), "Not Present");
        assert_eq!(uuid(&[0x00; 16], V32), "Not Settable");
    }

    #[test]
    fn system_information() {
        #[rustfmt::skip]
        let mut raw = vec![
            0x01, 0x1b, 0x01, 0x00,
            0x01, 0x02, 0x00, 0x03,
        ];
        raw.extend_from_slice(&UUID);
        raw.extend_from_slice(&[0x06, 0x00, 0x04]);
        raw.extend_from_slice(b"Acme\0Rocket\0SN1\0Skates\0\0");

        let want = "System Information\n\
            \tManufacturer: Acme\n\
            \tProduct Name: Rocket\n\
            \tVersion: Not Specified\n\
            \tSerial Number: SN1\n\
            \tUUID: 00112233-4455-6677-8899-aabbccddeeff\n\
            \tWake-up Type: Power Switch\n\
            \tSKU Number: Not Specified\n\
            \tFamily: Skates\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn base_board_handles_hidden_when_quiet() {
        #[rustfmt::skip]
        let raw = [
            0x02, 0x13, 0x02, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x00,
            0x09,
            0x00, 0x03, 0x00, 0x0a, 0x02,
            0x10, 0x00, 0x11, 0x00,
            b'B', b'o', b'a', b'r', b'd', 0x00,
            0x00,
        ];

        let want = "Base Board Information\n\
            \tManufacturer: Board\n\
            \tProduct Name: Not Specified\n\
            \tVersion: Not Specified\n\
            \tSerial Number: Not Specified\n\
            \tAsset Tag: Not Specified\n\
            \tFeatures:\n\
            \t\tBoard is a hosting board\n\
            \t\tBoard is replaceable\n\
            \tLocation In Chassis: Not Specified\n\
            \tChassis Handle: 0x0003\n\
            \tType: Motherboard\n\
            \tContained Object Handles: 2\n\
            \t\t0x0010\n\
            \t\t0x0011\n\
            \n";

        assert_eq!(render(&raw, V32), want);

        let quiet = render_with(&raw, V32, true);
        assert!(!quiet.contains("Chassis Handle"));
        assert!(!quiet.contains("Contained Object Handles"));
    }

    #[test]
    fn chassis_elements_and_sku() {
        #[rustfmt::skip]
        let raw = [
            0x03, 0x1c, 0x03, 0x00,
            0x01, 0x97, 0x00, 0x00, 0x00,
            0x03, 0x03, 0x03, 0x03,
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0x02, 0x03,
            0x05, 0x01, 0x02,
            0x91, 0x01, 0x01,
            0x02,
            b'C', b'o', 0x00,
            b'S', b'K', b'U', 0x00,
            0x00,
        ];

        let want = "Chassis Information\n\
            \tManufacturer: Co\n\
            \tType: Rack Mount Chassis\n\
            \tLock: Present\n\
            \tVersion: Not Specified\n\
            \tSerial Number: Not Specified\n\
            \tAsset Tag: Not Specified\n\
            \tBoot-up State: Safe\n\
            \tPower Supply State: Safe\n\
            \tThermal State: Safe\n\
            \tSecurity Status: None\n\
            \tOEM Information: 0x00000000\n\
            \tHeight: 2 U\n\
            \tNumber Of Power Cords: Unspecified\n\
            \tContained Elements: 2\n\
            \t\tSystem Management Module (1-2)\n\
            \t\tMemory Device (1)\n\
            \tSKU Number: SKU\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn event_log_descriptors() {
        #[rustfmt::skip]
        let raw = [
            0x0f, 0x1b, 0x0f, 0x00,
            0x00, 0x10, 0x00, 0x00, 0x10, 0x00,
            0x03, 0x01,
            0x78, 0x56, 0x34, 0x12,
            0x00, 0x00, 0x0f, 0x00,
            0x01, 0x02, 0x02,
            0x01, 0x00,
            0xff, 0x00,
            0x00, 0x00,
        ];

        let want = "System Event Log\n\
            \tArea Length: 4096 bytes\n\
            \tHeader Start Offset: 0x0000\n\
            \tHeader Length: 16 bytes\n\
            \tData Start Offset: 0x0010\n\
            \tAccess Method: Memory-mapped physical 32-bit address\n\
            \tAccess Address: 0x000F0000\n\
            \tStatus: Valid, Not Full\n\
            \tChange Token: 0x12345678\n\
            \tHeader Format: Type 1\n\
            \tSupported Log Type Descriptors: 2\n\
            \tDescriptor 1: Single-bit ECC memory error\n\
            \tData Format 1: None\n\
            \tDescriptor 2: End of log\n\
            \tData Format 2: None\n\
            \n";

        assert_eq!(render(&raw, V32), want);
        assert_eq!(event_log_descriptor_type(0x0f), OUT_OF_SPEC);
    }

    #[test]
    fn system_reset_without_watchdog() {
        let raw = [0x17, 0x0d, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x00];

        assert_eq!(
            render(&raw, V32),
            "System Reset\n\tStatus: Enabled\n\tWatchdog Timer: Not Present\n\n"
        );
    }

    #[test]
    fn system_reset_with_watchdog() {
        #[rustfmt::skip]
        let raw = [
            0x17, 0x0d, 0x00, 0x00,
            0x22,
            0xff, 0xff, 0x03, 0x00, 0x05, 0x00, 0xff, 0xff,
            0x00, 0x00,
        ];

        let want = "System Reset\n\
            \tStatus: Disabled\n\
            \tWatchdog Timer: Present\n\
            \tBoot Option: Operating System\n\
            \tBoot Option On Limit: <OUT OF SPEC>\n\
            \tReset Count: Unknown\n\
            \tReset Limit: 3\n\
            \tTimer Interval: 5 min\n\
            \tTimeout: Unknown\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn power_controls_bcd() {
        let raw = [0x19, 0x09, 0x00, 0x00, 0x12, 0x31, 0x23, 0x5a, 0x00, 0x00, 0x00];

        assert_eq!(
            render(&raw, V32),
            "System Power Controls\n\tNext Scheduled Power-on: 12-31 23:*:00\n\n"
        );
    }

    #[test]
    fn hardware_security_status() {
        let raw = [0x18, 0x05, 0x00, 0x00, 0b0110_1100, 0x00, 0x00];

        let want = "Hardware Security\n\
            \tPower-On Password Status: Enabled\n\
            \tKeyboard Password Status: Not Implemented\n\
            \tAdministrator Password Status: Unknown\n\
            \tFront Panel Reset Status: Disabled\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn additional_information_entries() {
        #[rustfmt::skip]
        let raw = [
            0x28, 0x0e, 0x00, 0x00,
            0x02,
            0x06, 0x01, 0x00, 0x05, 0x01, 0xab,
            0x05, 0x02, 0x00,
            b'X', 0x00,
            0x00,
        ];

        let want = "Additional Information 1\n\
            \tReferenced Handle: 0x0001\n\
            \tReferenced Offset: 0x05\n\
            \tString: X\n\
            \tValue: 0xab\n\
            Additional Information 2\n\
            \n";

        assert_eq!(render(&raw, V32), want);
        assert_eq!(render_with(&raw, V32, true), "");
    }

    #[test]
    fn boot_status_ranges() {
        let raw = [0x20, 0x0b, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0xc0, 0x00, 0x00];

        assert_eq!(render(&raw, V32), "System Boot Information\n\tStatus: Product-specific\n\n");
    }
}
