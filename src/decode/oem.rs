//! Vendor-specific structures, decoded once the system manufacturer is
//! known from the System Information structure.

use super::Context;
use crate::structure::Structure;
use crate::util;

/// Vendors with at least one decodable OEM structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Vendor {
    #[default]
    Unknown,
    Acer,
    Hp,
    Hpe,
    Ibm,
    Lenovo,
}

/// Vendor decoding state for one pass over a table.
#[derive(Debug, Default)]
pub struct State {
    vendor: Vendor,

    /// Numbers HP NIC records which carry no identifier of their own.
    nic_counter: u8,
}

impl State {
    /// Remembers the system manufacturer. Trailing spaces are ignored and
    /// unknown manufacturers leave the vendor unchanged.
    pub fn set_vendor(&mut self, manufacturer: &str) {
        let vendor = match manufacturer.trim_end_matches(' ') {
            "Acer" => Vendor::Acer,
            "HP" | "Hewlett-Packard" => Vendor::Hp,
            "HPE" | "Hewlett Packard Enterprise" => Vendor::Hpe,
            "IBM" => Vendor::Ibm,
            "LENOVO" => Vendor::Lenovo,
            _ => return,
        };

        debug!("decoding OEM structures for vendor {:?}", vendor);
        self.vendor = vendor;
    }

    /// The vendor in effect.
    pub fn vendor(&self) -> Vendor {
        self.vendor
    }
}

/// Decodes a structure type the standard does not define, returning false
/// when the current vendor has no decoder for it.
pub fn decode(s: &Structure, ctx: &mut Context) -> bool {
    match ctx.oem.vendor {
        Vendor::Acer => acer(s, ctx),
        Vendor::Hp | Vendor::Hpe => hp(s, ctx),
        Vendor::Ibm | Vendor::Lenovo => ibm_lenovo(s, ctx),
        Vendor::Unknown => false,
    }
}

fn yes_no(set: bool) -> &'static str {
    if set {
        "Yes"
    } else {
        "No"
    }
}

fn acer(s: &Structure, ctx: &mut Context) -> bool {
    if s.header.header_type != 170 {
        return false;
    }

    let out = &mut *ctx.out;
    out.handle_name("Acer Hotkey Function");
    if s.length() < 0x0f {
        return true;
    }

    let cap = s.word(0x04);
    out.attr("Function bitmap for Communication Button", format_args!("0x{:04x}", cap));
    out.subattr("WiFi", format_args!("{}", yes_no(cap & 0x0001 != 0)));
    out.subattr("3G", format_args!("{}", yes_no(cap & 0x0040 != 0)));
    out.subattr("WiMAX", format_args!("{}", yes_no(cap & 0x0080 != 0)));
    out.subattr("Bluetooth", format_args!("{}", yes_no(cap & 0x0800 != 0)));

    let buttons = [
        (0x06, "Application"),
        (0x08, "Media"),
        (0x0a, "Display"),
        (0x0c, "Others"),
    ];
    for &(offset, button) in &buttons {
        out.attr(
            &format!("Function bitmap for {} Button", button),
            format_args!("0x{:04x}", s.word(offset)),
        );
    }
    out.attr("Communication Function Key Number", format_args!("{}", s.byte(0x0e)));

    true
}

/// Prints one HP NIC record. An `id` of 0xFF takes the next counter value.
fn hp_nic(ctx: &mut Context, id: u8, bus: u8, dev: u8, mac: &[u8]) {
    let id = if id == 0xff {
        ctx.oem.nic_counter = ctx.oem.nic_counter.wrapping_add(1);
        ctx.oem.nic_counter
    } else {
        id
    };
    let name = format!("NIC {}", id);

    match (bus, dev) {
        (0x00, 0x00) => ctx.out.attr(&name, format_args!("Disabled")),
        (0xff, 0xff) => ctx.out.attr(&name, format_args!("Not Installed")),
        _ => {
            let mac = mac
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(":");
            ctx.out.attr(
                &name,
                format_args!(
                    "PCI device {:02x}:{:02x}.{:x}, MAC address {}",
                    bus,
                    dev >> 3,
                    dev & 7,
                    mac
                ),
            );
        }
    }
}

fn hp(s: &Structure, ctx: &mut Context) -> bool {
    let company = if ctx.oem.vendor == Vendor::Hp { "HP" } else { "HPE" };

    match s.header.header_type {
        204 => {
            let out = &mut *ctx.out;
            out.handle_name(&format!("{} ProLiant System/Rack Locator", company));
            if s.length() < 0x0b {
                return true;
            }

            out.attr("Rack Name", format_args!("{}", s.string_at(0x04)));
            out.attr("Enclosure Name", format_args!("{}", s.string_at(0x05)));
            out.attr("Enclosure Model", format_args!("{}", s.string_at(0x06)));
            out.attr("Enclosure Serial", format_args!("{}", s.string_at(0x0a)));
            out.attr("Enclosure Bays", format_args!("{}", s.byte(0x08)));
            out.attr("Server Bay", format_args!("{}", s.string_at(0x07)));
            out.attr("Bays Filled", format_args!("{}", s.byte(0x09)));
        }
        t @ 209 | t @ 221 => {
            let kind = if t == 221 {
                "BIOS iSCSI NIC PCI and MAC Information"
            } else {
                "BIOS PXE NIC PCI and MAC Information"
            };
            ctx.out.handle_name(&format!("{} {}", company, kind));

            // Eight byte records of device/function, bus and MAC address.
            let mut nic = 1u8;
            let mut offset = 4;
            while s.length() >= offset + 8 {
                let mac = s.field(offset + 2, 6).unwrap_or(&[]);
                hp_nic(ctx, nic, s.byte(offset + 1), s.byte(offset), mac);
                nic = nic.wrapping_add(1);
                offset += 8;
            }
        }
        233 => {
            ctx.out
                .handle_name(&format!("{} BIOS PXE NIC PCI and MAC Information", company));
            if s.length() < 0x0e {
                return true;
            }

            // Short records carry no port number.
            let id = if s.length() > 0x28 { s.byte(0x28) } else { 0xff };
            let mac = s.field(0x08, 6).unwrap_or(&[]);
            hp_nic(ctx, id, s.byte(0x06), s.byte(0x07), mac);
        }
        212 => {
            let out = &mut *ctx.out;
            out.handle_name(&format!("{} 64-bit CRU Information", company));
            if s.length() < 0x18 {
                return true;
            }

            let signature = s.dword(0x04);
            match s.field(0x04, 4) {
                Some(text) if util::is_printable(text) => out.attr(
                    "Signature",
                    format_args!("0x{:08x} ({})", signature, String::from_utf8_lossy(text)),
                ),
                _ => out.attr("Signature", format_args!("0x{:08x}", signature)),
            }

            // "$CRU"
            if signature == 0x5552_4324 {
                let address = s.qword(0x08).wrapping_add(u64::from(s.dword(0x14)));
                out.attr("Physical Address", format_args!("0x{:016x}", address));
                out.attr("Length", format_args!("0x{:08x}", s.dword(0x10)));
            }
        }
        219 => {
            let out = &mut *ctx.out;
            out.handle_name(&format!("{} ProLiant Information", company));
            if s.length() < 0x08 {
                return true;
            }

            out.attr("Power Features", format_args!("0x{:08x}", s.dword(0x04)));
            if s.length() < 0x0c {
                return true;
            }

            out.attr("Omega Features", format_args!("0x{:08x}", s.dword(0x08)));
            if s.length() < 0x14 {
                return true;
            }

            let features = s.dword(0x10);
            out.attr("Misc. Features", format_args!("0x{:08x}", features));
            out.subattr("iCRU", format_args!("{}", yes_no(features & 0x0001 != 0)));
            out.subattr("UEFI", format_args!("{}", yes_no(features & 0x1400 != 0)));
        }
        _ => return false,
    }

    true
}

fn ibm_lenovo(s: &Structure, ctx: &mut Context) -> bool {
    let out = &mut *ctx.out;

    match s.header.header_type {
        131 => {
            // Other type 131 layouts exist; only the TVT one is known.
            if s.length() != 0x16 || s.string(1).value() != Some("TVT-Enablement") {
                return false;
            }

            out.handle_name("ThinkVantage Technologies");
            out.attr("Version", format_args!("{}", s.byte(0x04)));
            let diagnostics = if s.byte(0x14) & 0x80 != 0 { "Available" } else { "No" };
            out.attr("Diagnostics", format_args!("{}", diagnostics));
        }
        135 => {
            if s.length() < 0x0a || s.field(0x04, 2) != Some(&b"TP"[..]) {
                return false;
            }
            if (s.byte(0x06), s.byte(0x07), s.byte(0x08)) != (0x07, 0x03, 0x01) {
                return false;
            }

            out.handle_name("ThinkPad Device Presence Detection");
            let reader = if s.byte(0x09) & 0x01 != 0 { "Present" } else { "No" };
            out.attr("Fingerprint Reader", format_args!("{}", reader));
        }
        140 => {
            if s.length() < 0x0f || s.field(0x04, 6) != Some(&b"LENOVO"[..]) {
                return false;
            }
            if (s.byte(0x0a), s.byte(0x0b), s.byte(0x0c)) != (0x0b, 0x07, 0x01) {
                return false;
            }

            out.handle_name("ThinkPad Embedded Controller Program");
            out.attr("Version ID", format_args!("{}", s.string(1)));
            out.attr("Release Date", format_args!("{}", s.string(2)));
        }
        _ => return false,
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_structure, tests::V32};
    use crate::output::StringOutput;
    use crate::structure::parse_header;

    /// Decodes `raw` with the system vendor set to `vendor`.
    fn render_for(vendor: &str, raws: &[&[u8]]) -> String {
        let mut out = StringOutput::new();
        {
            let mut ctx = Context::new(&mut out, V32, false);
            ctx.oem.set_vendor(vendor);
            for raw in raws {
                let s = Structure::new(parse_header(raw).expect("expected valid header"), raw);
                decode_structure(&s, &mut ctx);
            }
        }

        out.into_string()
    }

    #[test]
    fn vendor_matching() {
        let mut state = State::default();
        assert_eq!(state.vendor(), Vendor::Unknown);

        state.set_vendor("Hewlett-Packard   ");
        assert_eq!(state.vendor(), Vendor::Hp);

        state.set_vendor("Contoso");
        assert_eq!(state.vendor(), Vendor::Hp);

        state.set_vendor("HPE");
        assert_eq!(state.vendor(), Vendor::Hpe);
    }

    #[test]
    fn hp_pxe_nic_records() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xd1, 0x14, 0x00, 0xd1,
            0x08, 0x02, 0x00, 0x1b, 0x21, 0xaa, 0xbb, 0xcc,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let want = "HPE BIOS PXE NIC PCI and MAC Information\n\
            \tNIC 1: PCI device 02:01.0, MAC address 00:1B:21:AA:BB:CC\n\
            \tNIC 2: Disabled\n\
            \n";

        assert_eq!(render_for("HPE", &[raw]), want);
    }

    #[test]
    fn hp_nic_counter_without_port() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xe9, 0x0e, 0x00, 0xe9,
            0x00, 0x00, 0xff, 0xff,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let want = "HP BIOS PXE NIC PCI and MAC Information\n\
            \tNIC 1: Not Installed\n\
            \n\
            HP BIOS PXE NIC PCI and MAC Information\n\
            \tNIC 2: Not Installed\n\
            \n";

        assert_eq!(render_for("HP", &[raw, raw]), want);
    }

    #[test]
    fn acer_hotkeys() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xaa, 0x0f, 0x00, 0xaa,
            0x41, 0x08, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00,
            0x05,
            0x00, 0x00,
        ];

        let want = "Acer Hotkey Function\n\
            \tFunction bitmap for Communication Button: 0x0841\n\
            \t\tWiFi: Yes\n\
            \t\t3G: Yes\n\
            \t\tWiMAX: No\n\
            \t\tBluetooth: Yes\n\
            \tFunction bitmap for Application Button: 0x0001\n\
            \tFunction bitmap for Media Button: 0x0002\n\
            \tFunction bitmap for Display Button: 0x0003\n\
            \tFunction bitmap for Others Button: 0x0004\n\
            \tCommunication Function Key Number: 5\n\
            \n";

        assert_eq!(render_for("Acer ", &[raw]), want);
    }

    #[test]
    fn lenovo_requires_signature() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x87, 0x0a, 0x00, 0x87,
            b'T', b'P', 0x07, 0x03, 0x01, 0x01,
            0x00, 0x00,
        ];

        assert_eq!(
            render_for("LENOVO", &[raw]),
            "ThinkPad Device Presence Detection\n\tFingerprint Reader: Present\n\n"
        );

        // Without a known vendor the structure is dumped.
        assert!(render_for("Contoso", &[raw]).starts_with("OEM-specific Type\n"));

        let mut unsigned = raw.to_vec();
        unsigned[0x05] = b'X';
        assert!(render_for("LENOVO", &[&unsigned[..]]).starts_with("OEM-specific Type\n"));
    }
}
