//! Power and environmental structures: portable batteries (type 22),
//! voltage, temperature and current probes (types 26, 28 and 29), cooling
//! devices (type 27) and power supplies (type 39).

use super::{lookup, Context};
use crate::structure::Structure;

/// Probe readings use this value when they are not known.
const UNKNOWN_READING: u16 = 0x8000;

fn battery_chemistry(code: u8) -> &'static str {
    const CHEMISTRY: &[&str] = &[
        "Other",
        "Unknown",
        "Lead Acid",
        "Nickel Cadmium",
        "Nickel Metal Hydride",
        "Lithium Ion",
        "Zinc Air",
        "Lithium Polymer",
    ];

    lookup(CHEMISTRY, 0x01, u32::from(code))
}

pub fn battery(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;
    // Smart Battery Data Specification fields replace some of the string
    // fields on newer structures when those are left unset.
    let sbds = s.length() >= 0x1a;

    out.attr("Location", format_args!("{}", s.string_at(0x04)));
    out.attr("Manufacturer", format_args!("{}", s.string_at(0x05)));
    if s.byte(0x06) != 0 || !sbds {
        out.attr("Manufacture Date", format_args!("{}", s.string_at(0x06)));
    }
    if s.byte(0x07) != 0 || !sbds {
        out.attr("Serial Number", format_args!("{}", s.string_at(0x07)));
    }
    out.attr("Name", format_args!("{}", s.string_at(0x08)));
    if s.byte(0x09) != 0x02 || !sbds {
        out.attr("Chemistry", format_args!("{}", battery_chemistry(s.byte(0x09))));
    }

    let multiplier = if s.length() < 0x16 { 1 } else { u32::from(s.byte(0x15)) };
    match s.word(0x0a) {
        0 => out.attr("Design Capacity", format_args!("Unknown")),
        n => out.attr("Design Capacity", format_args!("{} mWh", u32::from(n) * multiplier)),
    }
    match s.word(0x0c) {
        0 => out.attr("Design Voltage", format_args!("Unknown")),
        n => out.attr("Design Voltage", format_args!("{} mV", n)),
    }
    out.attr("SBDS Version", format_args!("{}", s.string_at(0x0e)));
    match s.byte(0x0f) {
        0xff => out.attr("Maximum Error", format_args!("Unknown")),
        n => out.attr("Maximum Error", format_args!("{}%", n)),
    }
    if !sbds {
        return;
    }

    if s.byte(0x07) == 0 {
        out.attr("SBDS Serial Number", format_args!("{:04X}", s.word(0x10)));
    }
    if s.byte(0x06) == 0 {
        let date = s.word(0x12);
        out.attr(
            "SBDS Manufacture Date",
            format_args!(
                "{}-{:02}-{:02}",
                1980 + u32::from(date >> 9),
                (date >> 5) & 0x0f,
                date & 0x1f
            ),
        );
    }
    if s.byte(0x09) == 0x02 {
        out.attr("SBDS Chemistry", format_args!("{}", s.string_at(0x14)));
    }
    out.attr("OEM-specific Information", format_args!("0x{:08X}", s.dword(0x16)));
}

fn probe_status(code: u8) -> &'static str {
    const STATUS: &[&str] = &[
        "Other",
        "Unknown",
        "OK",
        "Non-critical",
        "Critical",
        "Non-recoverable",
    ];

    lookup(STATUS, 0x01, u32::from(code))
}

const PROBE_LOCATIONS: &[&str] = &[
    "Other",
    "Unknown",
    "Processor",
    "Disk",
    "Peripheral Bay",
    "System Management Module",
    "Motherboard",
    "Memory Module",
    "Processor Module",
    "Power Unit",
    "Add-in Card",
    "Front Panel Board",
    "Back Panel Board",
    "Power System Board",
    "Drive Back Plane",
];

/// How one kind of probe scales its readings.
struct Probe {
    /// Number of location codes the probe type defines.
    locations: usize,

    /// Formats a signed reading, tolerance or nominal value.
    value: fn(i16) -> String,

    /// Formats the unsigned resolution.
    resolution: fn(u16) -> String,
}

fn reading(code: u16, format: fn(i16) -> String) -> String {
    if code == UNKNOWN_READING {
        "Unknown".to_string()
    } else {
        format(code as i16)
    }
}

/// Decodes the layout shared by voltage, temperature and current probes.
fn probe(s: &Structure, ctx: &mut Context, probe: &Probe) {
    let out = &mut *ctx.out;
    let location = s.byte(0x05);

    out.attr("Description", format_args!("{}", s.string_at(0x04)));
    out.attr(
        "Location",
        format_args!(
            "{}",
            lookup(&PROBE_LOCATIONS[..probe.locations], 0x01, u32::from(location & 0x1f))
        ),
    );
    out.attr("Status", format_args!("{}", probe_status(location >> 5)));
    out.attr("Maximum Value", format_args!("{}", reading(s.word(0x06), probe.value)));
    out.attr("Minimum Value", format_args!("{}", reading(s.word(0x08), probe.value)));

    let resolution = match s.word(0x0a) {
        UNKNOWN_READING => "Unknown".to_string(),
        n => (probe.resolution)(n),
    };
    out.attr("Resolution", format_args!("{}", resolution));
    out.attr("Tolerance", format_args!("{}", reading(s.word(0x0c), probe.value)));
    match s.word(0x0e) {
        UNKNOWN_READING => out.attr("Accuracy", format_args!("Unknown")),
        n => out.attr("Accuracy", format_args!("{:.2}%", f32::from(n) / 100.0)),
    }
    out.attr("OEM-specific Information", format_args!("0x{:08X}", s.dword(0x10)));
    if s.length() < 0x16 {
        return;
    }

    out.attr("Nominal Value", format_args!("{}", reading(s.word(0x14), probe.value)));
}

pub fn voltage_probe(s: &Structure, ctx: &mut Context) {
    probe(
        s,
        ctx,
        &Probe {
            locations: 0x0b,
            value: |v| format!("{:.3} V", f32::from(v) / 1000.0),
            resolution: |v| format!("{:.1} mV", f32::from(v) / 10.0),
        },
    );
}

pub fn temperature_probe(s: &Structure, ctx: &mut Context) {
    probe(
        s,
        ctx,
        &Probe {
            locations: 0x0f,
            value: |v| format!("{:.1} deg C", f32::from(v) / 10.0),
            resolution: |v| format!("{:.3} deg C", f32::from(v) / 1000.0),
        },
    );
}

pub fn current_probe(s: &Structure, ctx: &mut Context) {
    probe(
        s,
        ctx,
        &Probe {
            locations: 0x0b,
            value: |v| format!("{:.3} A", f32::from(v) / 1000.0),
            resolution: |v| format!("{:.1} mA", f32::from(v) / 10.0),
        },
    );
}

fn cooling_device_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Fan",
        "Centrifugal Blower",
        "Chip Fan",
        "Cabinet Fan",
        "Power Supply Fan",
        "Heat Pipe",
        "Integrated Refrigeration",
    ];
    const TYPES_0X10: &[&str] = &["Active Cooling", "Passive Cooling"];

    match code {
        0x10..=0x11 => lookup(TYPES_0X10, 0x10, u32::from(code)),
        _ => lookup(TYPES, 0x01, u32::from(code)),
    }
}

pub fn cooling_device(s: &Structure, ctx: &mut Context) {
    let out = &mut *ctx.out;

    let probe = s.word(0x04);
    if !ctx.quiet && probe != 0xffff {
        out.attr("Temperature Probe Handle", format_args!("0x{:04X}", probe));
    }
    out.attr("Type", format_args!("{}", cooling_device_type(s.byte(0x06) & 0x1f)));
    out.attr("Status", format_args!("{}", probe_status(s.byte(0x06) >> 5)));
    if s.byte(0x07) != 0 {
        out.attr("Cooling Unit Group", format_args!("{}", s.byte(0x07)));
    }
    out.attr("OEM-specific Information", format_args!("0x{:08X}", s.dword(0x08)));
    if s.length() < 0x0e {
        return;
    }

    match s.word(0x0c) {
        UNKNOWN_READING => out.attr("Nominal Speed", format_args!("Unknown Or Non-rotating")),
        n => out.attr("Nominal Speed", format_args!("{} rpm", n)),
    }
    if s.length() < 0x0f {
        return;
    }

    out.attr("Description", format_args!("{}", s.string_at(0x0e)));
}

pub fn power_supply(s: &Structure, ctx: &mut Context) {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Linear",
        "Switching",
        "Battery",
        "UPS",
        "Converter",
        "Regulator",
    ];
    const STATUS: &[&str] = &["Other", "Unknown", "OK", "Non-critical", "Critical"];
    const SWITCHING: &[&str] = &[
        "Other",
        "Unknown",
        "Manual",
        "Auto-switch",
        "Wide Range",
        "N/A",
    ];

    let out = &mut *ctx.out;

    if s.byte(0x04) != 0 {
        out.attr("Power Unit Group", format_args!("{}", s.byte(0x04)));
    }
    out.attr("Location", format_args!("{}", s.string_at(0x05)));
    out.attr("Name", format_args!("{}", s.string_at(0x06)));
    out.attr("Manufacturer", format_args!("{}", s.string_at(0x07)));
    out.attr("Serial Number", format_args!("{}", s.string_at(0x08)));
    out.attr("Asset Tag", format_args!("{}", s.string_at(0x09)));
    out.attr("Model Part Number", format_args!("{}", s.string_at(0x0a)));
    out.attr("Revision", format_args!("{}", s.string_at(0x0b)));
    match s.word(0x0c) {
        UNKNOWN_READING => out.attr("Max Power Capacity", format_args!("Unknown")),
        n => out.attr("Max Power Capacity", format_args!("{} W", n)),
    }

    let flags = u32::from(s.word(0x0e));
    if flags & (1 << 1) != 0 {
        out.attr(
            "Status",
            format_args!("Present, {}", lookup(STATUS, 0x01, (flags >> 7) & 0x07)),
        );
    } else {
        out.attr("Status", format_args!("Not Present"));
    }
    out.attr("Type", format_args!("{}", lookup(TYPES, 0x01, (flags >> 10) & 0x0f)));
    out.attr(
        "Input Voltage Range Switching",
        format_args!("{}", lookup(SWITCHING, 0x01, (flags >> 3) & 0x0f)),
    );
    out.attr(
        "Plugged",
        format_args!("{}", if flags & (1 << 2) != 0 { "No" } else { "Yes" }),
    );
    out.attr(
        "Hot Replaceable",
        format_args!("{}", if flags & 1 != 0 { "Yes" } else { "No" }),
    );
    if s.length() < 0x16 || ctx.quiet {
        return;
    }

    let handles = [
        (0x10, "Input Voltage Probe Handle"),
        (0x12, "Cooling Device Handle"),
        (0x14, "Input Current Probe Handle"),
    ];
    for &(offset, name) in &handles {
        let handle = s.word(offset);
        if handle != 0xffff {
            out.attr(name, format_args!("0x{:04X}", handle));
        }
    }
}
