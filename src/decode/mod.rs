//! Per-type SMBIOS structure decoders and the registry which dispatches
//! structures to them.

use crate::entry::Version;
use crate::output::Output;
use crate::structure::Structure;
use crate::util;

mod bios;
mod connectors;
mod management;
mod memory;
pub mod oem;
mod processor;
mod sensors;
mod system;

pub use self::management::fix_device_length;

/// Rendered for enumerated codes without a defined meaning.
pub const OUT_OF_SPEC: &str = "<OUT OF SPEC>";

/// State shared by every decoder during one pass over a table.
pub struct Context<'a> {
    /// Where decoded attributes are written.
    pub out: &'a mut dyn Output,

    /// The SMBIOS version announced by the entry point.
    pub version: Version,

    /// Suppresses handle references and unknown structures.
    pub quiet: bool,

    /// Vendor-specific state, set from the System Information structure.
    pub oem: oem::State,
}

impl<'a> Context<'a> {
    /// Creates a Context for a new pass over a table.
    pub fn new(out: &'a mut dyn Output, version: Version, quiet: bool) -> Self {
        Context {
            out,
            version,
            quiet,
            oem: oem::State::default(),
        }
    }

    /// Reports whether the table version is at least `major.minor`.
    pub fn at_least(&self, major: u8, minor: u8) -> bool {
        self.version >= Version::new(major, minor, 0)
    }
}

/// Decodes one structure's fields into its context's output.
pub type DecodeFn = fn(&Structure, &mut Context);

/// Describes how to decode one structure type.
pub struct Decoder {
    /// The structure type handled.
    pub header_type: u8,

    /// The name line printed before the fields, if the decoder does not
    /// print its own.
    pub name: Option<&'static str>,

    /// Structures shorter than this display only their name.
    pub min_length: usize,

    /// Decodes the fields.
    pub decode: DecodeFn,
}

macro_rules! decoder {
    ($t:expr, $name:expr, $min:expr, $f:path) => {
        Decoder {
            header_type: $t,
            name: $name,
            min_length: $min,
            decode: $f,
        }
    };
}

/// Every standard structure type this crate decodes.
pub static DECODERS: &[Decoder] = &[
    decoder!(0, Some("BIOS Information"), 0x12, bios::bios),
    decoder!(1, Some("System Information"), 0x08, system::system),
    decoder!(2, Some("Base Board Information"), 0x08, system::base_board),
    decoder!(3, Some("Chassis Information"), 0x09, system::chassis),
    decoder!(4, Some("Processor Information"), 0x1a, processor::processor),
    decoder!(5, Some("Memory Controller Information"), 0x0f, memory::controller),
    decoder!(6, Some("Memory Module Information"), 0x0c, memory::module),
    decoder!(7, Some("Cache Information"), 0x0f, processor::cache),
    decoder!(8, Some("Port Connector Information"), 0x09, connectors::port),
    decoder!(9, Some("System Slot Information"), 0x0c, connectors::slot),
    decoder!(10, None, 0x04, connectors::on_board_devices),
    decoder!(11, Some("OEM Strings"), 0x05, system::oem_strings),
    decoder!(12, Some("System Configuration Options"), 0x05, system::configuration_options),
    decoder!(13, Some("BIOS Language Information"), 0x16, bios::languages),
    decoder!(14, Some("Group Associations"), 0x05, system::group_associations),
    decoder!(15, Some("System Event Log"), 0x14, system::event_log),
    decoder!(16, Some("Physical Memory Array"), 0x0f, memory::array),
    decoder!(17, Some("Memory Device"), 0x15, memory::device),
    decoder!(18, Some("32-bit Memory Error Information"), 0x17, memory::error_32),
    decoder!(19, Some("Memory Array Mapped Address"), 0x0f, memory::array_mapped_address),
    decoder!(20, Some("Memory Device Mapped Address"), 0x13, memory::device_mapped_address),
    decoder!(21, Some("Built-in Pointing Device"), 0x07, system::pointing_device),
    decoder!(22, Some("Portable Battery"), 0x10, sensors::battery),
    decoder!(23, Some("System Reset"), 0x0d, system::reset),
    decoder!(24, Some("Hardware Security"), 0x05, system::hardware_security),
    decoder!(25, Some("System Power Controls"), 0x09, system::power_controls),
    decoder!(26, Some("Voltage Probe"), 0x14, sensors::voltage_probe),
    decoder!(27, Some("Cooling Device"), 0x0c, sensors::cooling_device),
    decoder!(28, Some("Temperature Probe"), 0x14, sensors::temperature_probe),
    decoder!(29, Some("Electrical Current Probe"), 0x14, sensors::current_probe),
    decoder!(30, Some("Out-of-band Remote Access"), 0x06, system::remote_access),
    decoder!(31, Some("Boot Integrity Services Entry Point"), 0x1c, system::boot_integrity),
    decoder!(32, Some("System Boot Information"), 0x0b, system::boot),
    decoder!(33, Some("64-bit Memory Error Information"), 0x1f, memory::error_64),
    decoder!(34, Some("Management Device"), 0x0b, management::device),
    decoder!(35, Some("Management Device Component"), 0x0b, management::component),
    decoder!(36, Some("Management Device Threshold Data"), 0x10, management::threshold),
    decoder!(37, Some("Memory Channel"), 0x07, memory::channel),
    decoder!(38, Some("IPMI Device Information"), 0x10, management::ipmi),
    decoder!(39, Some("System Power Supply"), 0x10, sensors::power_supply),
    decoder!(40, None, 0x0b, system::additional_information),
    decoder!(41, Some("Onboard Device"), 0x0b, connectors::onboard_device),
    decoder!(42, Some("Management Controller Host Interface"), 0x00, management::host_interface),
    decoder!(43, Some("TPM Device"), 0x1b, management::tpm),
    decoder!(126, Some("Inactive"), 0x00, nothing),
    decoder!(127, Some("End Of Table"), 0x00, nothing),
];

fn nothing(_: &Structure, _: &mut Context) {}

/// Returns the decoder for a standard structure type.
pub fn find(header_type: u8) -> Option<&'static Decoder> {
    DECODERS
        .binary_search_by_key(&header_type, |d| d.header_type)
        .ok()
        .map(|i| &DECODERS[i])
}

/// Decodes a structure, falling back to vendor decoders and then to a hex
/// dump for types without a decoder.
pub fn decode_structure(s: &Structure, ctx: &mut Context) {
    if let Some(decoder) = find(s.header.header_type) {
        // Additional information is only shown outside quiet mode.
        if ctx.quiet && decoder.header_type == 40 && s.length() >= decoder.min_length {
            return;
        }

        if let Some(name) = decoder.name {
            ctx.out.handle_name(name);
        }
        if s.length() >= decoder.min_length {
            (decoder.decode)(s, ctx);
        }
        ctx.out.separator();
        return;
    }

    if oem::decode(s, ctx) {
        ctx.out.separator();
        return;
    }

    if ctx.quiet {
        return;
    }

    ctx.out.handle_name(if s.header.header_type >= 128 {
        "OEM-specific Type"
    } else {
        "Unknown Type"
    });
    dump(s, ctx.out, false);
    ctx.out.separator();
}

/// Writes a structure's formatted area and strings as hex.
///
/// With `raw_strings`, each string is also shown as hex including its
/// terminating NUL, followed by its sanitized text in quotes.
pub fn dump(s: &Structure, out: &mut dyn Output, raw_strings: bool) {
    out.list_start("Header and Data", None);
    for row in util::hex_rows(s.data()) {
        out.list_item(format_args!("{}", row));
    }
    out.list_end();

    if !s.has_strings() {
        return;
    }

    out.list_start("Strings", None);
    for raw in s.strings() {
        if raw_strings {
            let mut with_nul = raw.to_vec();
            with_nul.push(0);
            for row in util::hex_rows(&with_nul) {
                out.list_item(format_args!("{}", row));
            }
            out.list_item(format_args!("\"{}\"", util::sanitize(raw)));
        } else {
            out.list_item(format_args!("{}", util::sanitize(raw)));
        }
    }
    out.list_end();
}

/// Prints the single field selected by a string query.
pub fn print_string(s: &Structure, header_type: u8, offset: u8, ctx: &mut Context) {
    if header_type == 11 {
        if s.length() < 5 || offset > s.byte(0x04) {
            error!("No OEM string number {}", offset);
            return;
        }

        if offset == 0 {
            ctx.out.info(format_args!("{}", s.byte(0x04)));
        } else {
            ctx.out.info(format_args!("{}", s.string(offset)));
        }
        return;
    }

    let offset = usize::from(offset);
    if offset >= s.length() {
        return;
    }

    match (header_type, offset) {
        (1, 0x08) => match s.field(offset, 16) {
            Some(uuid) => {
                let uuid = system::uuid(uuid, ctx.version);
                ctx.out.info(format_args!("{}", uuid));
            }
            None => {}
        },
        (3, 0x05) => {
            let kind = system::chassis_type(s.byte(offset));
            ctx.out.info(format_args!("{}", kind));
        }
        (4, 0x06) => {
            let family = processor::family(s, ctx.version);
            ctx.out.info(format_args!("{}", family));
        }
        (4, 0x16) => {
            let speed = processor::frequency(s.word(offset));
            ctx.out.info(format_args!("{}", speed));
        }
        _ => ctx.out.info(format_args!("{}", s.string_at(offset))),
    }
}

/// Looks up `code` in a table of labels starting at code `first`.
pub fn lookup(table: &[&'static str], first: u32, code: u32) -> &'static str {
    code.checked_sub(first)
        .and_then(|i| table.get(i as usize))
        .cloned()
        .unwrap_or(OUT_OF_SPEC)
}

/// Returns the labels of the bits set in `code`, where `names[0]` labels
/// bit `first`. Bits with an empty label are reserved and never reported.
pub fn bits(names: &[&'static str], first: u32, code: u64) -> Vec<&'static str> {
    names
        .iter()
        .enumerate()
        .filter(|&(i, name)| !name.is_empty() && code & (1u64 << (first as usize + i)) != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Emits a list attribute holding the labels of the bits set in `code`, or
/// "None" when no labelled bit is set.
pub fn bit_list(out: &mut dyn Output, name: &str, names: &[&'static str], first: u32, code: u64) {
    let set = bits(names, first, code);
    if set.is_empty() {
        out.list_start(name, Some(format_args!("None")));
        return;
    }

    out.list_start(name, None);
    for label in set {
        out.list_item(format_args!("{}", label));
    }
    out.list_end();
}

/// Returns the name of a standard structure type.
pub fn structure_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "BIOS",
        "System",
        "Base Board",
        "Chassis",
        "Processor",
        "Memory Controller",
        "Memory Module",
        "Cache",
        "Port Connector",
        "System Slots",
        "On Board Devices",
        "OEM Strings",
        "System Configuration Options",
        "BIOS Language",
        "Group Associations",
        "System Event Log",
        "Physical Memory Array",
        "Memory Device",
        "32-bit Memory Error",
        "Memory Array Mapped Address",
        "Memory Device Mapped Address",
        "Built-in Pointing Device",
        "Portable Battery",
        "System Reset",
        "Hardware Security",
        "System Power Controls",
        "Voltage Probe",
        "Cooling Device",
        "Temperature Probe",
        "Electrical Current Probe",
        "Out-of-band Remote Access",
        "Boot Integrity Services",
        "System Boot",
        "64-bit Memory Error",
        "Management Device",
        "Management Device Component",
        "Management Device Threshold Data",
        "Memory Channel",
        "IPMI Device",
        "Power Supply",
        "Additional Information",
        "Onboard Device",
        "Management Controller Host Interface",
        "TPM Device",
    ];

    if code >= 128 {
        return "OEM-specific";
    }

    lookup(TYPES, 0, u32::from(code))
}

/// Formats a memory size, choosing the largest unit that keeps the value
/// exact. `shift` is 0 when `code` counts bytes and 1 when it counts
/// kilobytes.
pub fn memory_size(code: u64, shift: usize) -> String {
    const UNITS: &[&str] = &["bytes", "kB", "MB", "GB", "TB", "PB", "EB", "ZB"];

    // Split into 10 bit chunks; usually only one or two adjacent chunks
    // are non-zero.
    let mut split = [0u64; 7];
    for (i, chunk) in split.iter_mut().enumerate() {
        *chunk = if i == 6 {
            code >> 60
        } else {
            (code >> (10 * i)) & 0x3ff
        };
    }

    let mut i = 6;
    while i > 0 && split[i] == 0 {
        i -= 1;
    }

    let capacity = if i > 0 && split[i - 1] != 0 {
        i -= 1;
        split[i] + (split[i + 1] << 10)
    } else {
        split[i]
    };

    format!("{} {}", capacity, UNITS[i + shift])
}

/// Reports whether `value` is a valid BCD number between `low` and `high`.
pub fn bcd_range(value: u8, low: u8, high: u8) -> bool {
    if value > 0x99 || (value & 0x0f) > 0x09 {
        return false;
    }

    value >= low && value <= high
}

/// Formats a PCI segment/bus/device/function address, unless all of its
/// fields read as "not provided".
pub fn segment_bus_func(s: &Structure, offset: usize, out: &mut dyn Output) {
    let segment = s.word(offset);
    let bus = s.byte(offset + 2);
    let devfn = s.byte(offset + 3);

    if !(segment == 0xffff && bus == 0xff && devfn == 0xff) {
        out.attr(
            "Bus Address",
            format_args!(
                "{:04x}:{:02x}:{:02x}.{:x}",
                segment,
                bus,
                devfn >> 3,
                devfn & 0x7
            ),
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::output::StringOutput;
    use crate::structure::parse_header;

    /// Decodes `raw` as one structure and returns the text produced.
    pub fn render(raw: &[u8], version: Version) -> String {
        render_with(raw, version, false)
    }

    /// Like render, optionally in quiet mode.
    pub fn render_with(raw: &[u8], version: Version, quiet: bool) -> String {
        let header = parse_header(raw).expect("expected valid header");
        let s = Structure::new(header, raw);

        let mut out = StringOutput::new();
        {
            let mut ctx = Context::new(&mut out, version, quiet);
            decode_structure(&s, &mut ctx);
        }

        out.into_string()
    }

    pub const V32: Version = Version::new(3, 2, 0);

    #[test]
    fn registry_is_sorted_and_unique() {
        for pair in DECODERS.windows(2) {
            assert!(pair[0].header_type < pair[1].header_type);
        }
        assert!(find(44).is_none());
        assert!(find(125).is_none());
        for d in DECODERS {
            let found = find(d.header_type).map(|f| f.header_type);
            assert_eq!(found, Some(d.header_type));
        }
    }

    #[test]
    fn short_structure_prints_name_only() {
        // A Memory Device too short for any field.
        let got = render(&[17, 0x10, 0x00, 0x11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], V32);
        assert_eq!(got, "Memory Device\n\n");
    }

    #[test]
    fn unknown_type_dumps_hex() {
        #[rustfmt::skip]
        let raw = [
            200, 0x16, 0x34, 0x12,
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
            0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11,
            b'o', b'e', b'm', 0x00,
            0x00,
        ];

        let want = "OEM-specific Type\n\
            \tHeader and Data:\n\
            \t\tC8 16 34 12 00 01 02 03 04 05 06 07 08 09 0A 0B\n\
            \t\t0C 0D 0E 0F 10 11\n\
            \tStrings:\n\
            \t\toem\n\
            \n";

        assert_eq!(render(&raw, V32), want);
        assert_eq!(render_with(&raw, V32, true), "");
    }

    #[test]
    fn unknown_low_type_named_unknown() {
        let got = render(&[100, 0x05, 0x00, 0x00, 0xab, 0x00, 0x00], V32);
        assert_eq!(got, "Unknown Type\n\tHeader and Data:\n\t\t64 05 00 00 AB\n\n");
    }

    #[test]
    fn dump_raw_strings() {
        let raw = [1, 0x04, 0x00, 0x00, b'a', 0x01, 0x00, 0x00];
        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);

        let mut out = StringOutput::new();
        dump(&s, &mut out, true);

        assert_eq!(
            out.as_str(),
            "\tHeader and Data:\n\t\t01 04 00 00\n\tStrings:\n\t\t61 01 00\n\t\t\"a.\"\n"
        );
    }

    #[test]
    fn lookup_ranges() {
        let table = ["Other", "Unknown"];
        assert_eq!(lookup(&table, 1, 1), "Other");
        assert_eq!(lookup(&table, 1, 2), "Unknown");
        assert_eq!(lookup(&table, 1, 0), OUT_OF_SPEC);
        assert_eq!(lookup(&table, 1, 3), OUT_OF_SPEC);
    }

    #[test]
    fn memory_size_units() {
        assert_eq!(memory_size(0, 0), "0 bytes");
        assert_eq!(memory_size(512, 0), "512 bytes");
        assert_eq!(memory_size(16 * 1024 * 1024, 1), "16 GB");
        assert_eq!(memory_size(1536, 1), "1536 kB");
        assert_eq!(memory_size(0x1_0000_0000, 0), "4 GB");
        assert_eq!(memory_size(u64::from(u32::max_value()) + 1, 1), "4 TB");
    }

    #[test]
    fn bcd_ranges() {
        assert!(bcd_range(0x12, 0x01, 0x12));
        assert!(!bcd_range(0x13, 0x01, 0x12));
        assert!(!bcd_range(0x1a, 0x00, 0x99));
        assert!(!bcd_range(0xa0, 0x00, 0xff));
    }

    #[test]
    fn bit_list_none() {
        let mut out = StringOutput::new();
        bit_list(&mut out, "Features", &["A", "B"], 0, 0x04);
        bit_list(&mut out, "Features", &["A", "B"], 0, 0x02);

        assert_eq!(out.as_str(), "\tFeatures: None\n\tFeatures:\n\t\tB\n");
    }
}
