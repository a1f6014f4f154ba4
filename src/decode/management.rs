//! Management hardware: management devices and their components and
//! thresholds (types 34 to 36), IPMI devices (type 38), management
//! controller host interfaces (type 42) and TPM devices (type 43).

use std::net::{Ipv4Addr, Ipv6Addr};

use super::{lookup, Context, OUT_OF_SPEC};
use crate::structure::Structure;
use crate::util;

/// Some boards report type 34 structures with a length of 0x10 instead of
/// 0x0B, which hides the first characters of the device description. When
/// the extra bytes are printable text, shorten the structure so they are
/// read back as strings.
pub fn fix_device_length<'a>(s: Structure<'a>, display: bool, quiet: bool) -> Structure<'a> {
    if s.length() != 0x10 {
        return s;
    }

    match s.field(0x0b, 0x10 - 0x0b) {
        Some(hidden) if util::is_printable(hidden) => {
            if display && !quiet {
                warn!("Invalid entry length ({}). Fixed up to {}.", 0x10, 0x0b);
            }
            s.with_length(0x0b)
        }
        _ => s,
    }
}

pub fn device(s: &Structure, ctx: &mut Context) {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "LM75",
        "LM78",
        "LM79",
        "LM80",
        "LM81",
        "ADM9240",
        "DS1780",
        "MAX1617",
        "GL518SM",
        "W83781D",
        "HT82H791",
    ];
    const ADDRESS_TYPES: &[&str] = &["Other", "Unknown", "I/O Port", "Memory", "SMBus"];

    let out = &mut *ctx.out;

    out.attr("Description", format_args!("{}", s.string_at(0x04)));
    out.attr("Type", format_args!("{}", lookup(TYPES, 0x01, u32::from(s.byte(0x05)))));
    out.attr("Address", format_args!("0x{:08X}", s.dword(0x06)));
    out.attr(
        "Address Type",
        format_args!("{}", lookup(ADDRESS_TYPES, 0x01, u32::from(s.byte(0x0a)))),
    );
}

pub fn component(s: &Structure, ctx: &mut Context) {
    ctx.out.attr("Description", format_args!("{}", s.string_at(0x04)));
    if ctx.quiet {
        return;
    }

    ctx.out.attr("Management Device Handle", format_args!("0x{:04X}", s.word(0x05)));
    ctx.out.attr("Component Handle", format_args!("0x{:04X}", s.word(0x07)));
    if s.word(0x09) != 0xffff {
        ctx.out.attr("Threshold Handle", format_args!("0x{:04X}", s.word(0x09)));
    }
}

pub fn threshold(s: &Structure, ctx: &mut Context) {
    const THRESHOLDS: &[(usize, &str)] = &[
        (0x04, "Lower Non-critical Threshold"),
        (0x06, "Upper Non-critical Threshold"),
        (0x08, "Lower Critical Threshold"),
        (0x0a, "Upper Critical Threshold"),
        (0x0c, "Lower Non-recoverable Threshold"),
        (0x0e, "Upper Non-recoverable Threshold"),
    ];

    for &(offset, name) in THRESHOLDS {
        let value = s.word(offset);
        if value != 0x8000 {
            ctx.out.attr(name, format_args!("{}", value as i16));
        }
    }
}

fn ipmi_base_address(s: &Structure, interface: u8) -> String {
    // SSIF exposes an SMBus slave address instead of a register address.
    if interface == 0x04 {
        return format!("0x{:02X} (SMBus)", s.byte(0x08) >> 1);
    }

    let lsb = if s.length() < 0x11 {
        0
    } else {
        u64::from((s.byte(0x10) >> 4) & 1)
    };
    let address = s.qword(0x08);
    let space = if address & 1 != 0 { "I/O" } else { "Memory-mapped" };

    format!("0x{:016X} ({})", (address & !1) | lsb, space)
}

pub fn ipmi(s: &Structure, ctx: &mut Context) {
    const INTERFACES: &[&str] = &[
        "Unknown",
        "KCS (Keyboard Control Style)",
        "SMIC (Server Management Interface Chip)",
        "BT (Block Transfer)",
        "SSIF (SMBus System Interface)",
    ];
    const SPACING: &[&str] = &[
        "Successive Byte Boundaries",
        "32-bit Boundaries",
        "16-byte Boundaries",
    ];

    let out = &mut *ctx.out;
    let interface = s.byte(0x04);

    out.attr(
        "Interface Type",
        format_args!("{}", lookup(INTERFACES, 0x00, u32::from(interface))),
    );
    out.attr(
        "Specification Version",
        format_args!("{}.{}", s.byte(0x05) >> 4, s.byte(0x05) & 0x0f),
    );
    out.attr("I2C Slave Address", format_args!("0x{:02x}", s.byte(0x06) >> 1));
    match s.byte(0x07) {
        0xff => out.attr("NV Storage Device", format_args!("Not Present")),
        n => out.attr("NV Storage Device Address", format_args!("{}", n)),
    }
    out.attr("Base Address", format_args!("{}", ipmi_base_address(s, interface)));
    if s.length() < 0x12 {
        return;
    }

    let info = s.byte(0x10);
    if interface != 0x04 {
        out.attr(
            "Register Spacing",
            format_args!("{}", lookup(SPACING, 0x00, u32::from(info >> 6))),
        );
        if info & (1 << 3) != 0 {
            let polarity = if info & (1 << 1) != 0 { "Active High" } else { "Active Low" };
            let trigger = if info & 1 != 0 { "Level" } else { "Edge" };
            out.attr("Interrupt Polarity", format_args!("{}", polarity));
            out.attr("Interrupt Trigger Mode", format_args!("{}", trigger));
        }
    }
    if s.byte(0x11) != 0 {
        out.attr("Interrupt Number", format_args!("{}", s.byte(0x11)));
    }
}

fn host_interface_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &[
        "KCS: Keyboard Controller Style",
        "8250 UART Register Compatible",
        "16450 UART Register Compatible",
        "16550/16550A UART Register Compatible",
        "16650/16650A UART Register Compatible",
        "16750/16750A UART Register Compatible",
        "16850/16850A UART Register Compatible",
    ];

    match code {
        0x02..=0x08 => lookup(TYPES, 0x02, u32::from(code)),
        0x00..=0x3f => "MCTP",
        0x40 => "Network",
        0xf0 => "OEM",
        _ => OUT_OF_SPEC,
    }
}

pub fn host_interface(s: &Structure, ctx: &mut Context) {
    if !ctx.at_least(3, 2) {
        // Older layouts carry a variable length part with no length field,
        // so only the interface type and an OEM vendor can be decoded.
        if s.length() < 0x05 {
            return;
        }
        ctx.out.attr(
            "Interface Type",
            format_args!("{}", host_interface_type(s.byte(0x04))),
        );
        if s.length() >= 0x09 && s.byte(0x04) == 0xf0 {
            ctx.out.attr(
                "Vendor ID",
                format_args!(
                    "0x{:02X}{:02X}{:02X}{:02X}",
                    s.byte(0x05),
                    s.byte(0x06),
                    s.byte(0x07),
                    s.byte(0x08)
                ),
            );
        }
        return;
    }

    if s.length() < 0x0b {
        return;
    }

    let specific = usize::from(s.byte(0x05));
    let mut total = specific + 0x06;
    if total > s.length() {
        return;
    }

    let interface = s.byte(0x04);
    ctx.out.attr("Host Interface Type", format_args!("{}", host_interface_type(interface)));
    if interface != 0x40 {
        return;
    }

    if specific != 0 {
        network_device(s, specific, ctx);
    }

    // The protocol record count follows the interface specific data.
    total += 1;
    if total > s.length() {
        warn!(
            "Total read length {} exceeds total structure length {}",
            total,
            s.length()
        );
        return;
    }

    let count = s.byte(specific + 0x06);
    let mut record = specific + 0x07;
    for _ in 0..count {
        let length = usize::from(s.byte(record + 1));
        total += length + 2;
        if total > s.length() {
            warn!(
                "Total read length {} exceeds total structure length {}",
                total,
                s.length()
            );
            return;
        }

        protocol_record(s, record, ctx);
        record += length + 2;
    }
}

/// Decodes the device descriptor of a network host interface.
fn network_device(s: &Structure, specific: usize, ctx: &mut Context) {
    let kind = s.byte(0x06);
    let name = match kind {
        0x02 => "USB",
        0x03 => "PCI/PCIe",
        0x80..=0xff => "OEM",
        _ => OUT_OF_SPEC,
    };
    ctx.out.attr("Device Type", format_args!("{}", name));

    let out = &mut *ctx.out;
    match kind {
        0x02 if specific >= 5 => {
            out.subattr("idVendor", format_args!("0x{:04x}", s.word(0x07)));
            out.subattr("idProduct", format_args!("0x{:04x}", s.word(0x09)));
        }
        0x03 if specific >= 9 => {
            out.subattr("VendorID", format_args!("0x{:04x}", s.word(0x07)));
            out.subattr("DeviceID", format_args!("0x{:04x}", s.word(0x09)));
            out.subattr("SubVendorID", format_args!("0x{:04x}", s.word(0x0b)));
            out.subattr("SubDeviceID", format_args!("0x{:04x}", s.word(0x0d)));
        }
        0x04 if specific >= 5 => {
            out.subattr(
                "Vendor ID",
                format_args!(
                    "0x{:02x}:0x{:02x}:0x{:02x}:0x{:02x}",
                    s.byte(0x07),
                    s.byte(0x08),
                    s.byte(0x09),
                    s.byte(0x0a)
                ),
            );
        }
        _ => {}
    }
}

fn assignment_type(code: u8) -> &'static str {
    const TYPES: &[&str] = &["Unknown", "Static", "DHCP", "AutoConf", "Host Selected"];

    lookup(TYPES, 0x00, u32::from(code))
}

fn address_format(code: u8) -> &'static str {
    const FORMATS: &[&str] = &["Unknown", "IPv4", "IPv6"];

    lookup(FORMATS, 0x00, u32::from(code))
}

fn ip_address(s: &Structure, offset: usize, format: u8) -> String {
    match (format, s.field(offset, 16)) {
        (0x01, Some(b)) => Ipv4Addr::new(b[0], b[1], b[2], b[3]).to_string(),
        (0x02, Some(b)) => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(b);
            Ipv6Addr::from(octets).to_string()
        }
        _ => OUT_OF_SPEC.to_string(),
    }
}

/// Decodes one protocol record starting at `record`. Only Redfish over IP
/// records carry decodable data.
fn protocol_record(s: &Structure, record: usize, ctx: &mut Context) {
    const PROTOCOLS: &[&str] = &["Reserved", "Reserved", "IPMI", "MCTP", "Redfish over IP"];
    const REDFISH_MIN_LENGTH: usize = 91;

    let id = s.byte(record);
    let length = usize::from(s.byte(record + 1));
    let data = record + 2;
    let out = &mut *ctx.out;

    let protocol = match id {
        0xf0 => "OEM",
        _ => lookup(PROTOCOLS, 0x00, u32::from(id)),
    };
    out.subattr("Protocol ID", format_args!("{:02x} ({})", id, protocol));
    if id != 0x04 || length < REDFISH_MIN_LENGTH {
        return;
    }

    // Service UUIDs are always little-endian in this record.
    if let Some(uuid) = s.field(data, 16) {
        let uuid = super::system::uuid(uuid, crate::entry::Version::new(3, 1, 1));
        out.subattr("Service UUID", format_args!("{}", uuid));
    }

    let host_assignment = s.byte(data + 16);
    let host_format = s.byte(data + 17);
    out.subattr("Host IP Assignment Type", format_args!("{}", assignment_type(host_assignment)));
    out.subattr("Host IP Address Format", format_args!("{}", address_format(host_format)));
    if host_assignment == 0x01 || host_assignment == 0x03 {
        let family = address_format(host_format);
        out.subattr(
            &format!("{} Address", family),
            format_args!("{}", ip_address(s, data + 18, host_format)),
        );
        out.subattr(
            &format!("{} Mask", family),
            format_args!("{}", ip_address(s, data + 34, host_format)),
        );
    }

    let service_discovery = s.byte(data + 50);
    let service_format = s.byte(data + 51);
    out.subattr(
        "Redfish Service IP Discovery Type",
        format_args!("{}", assignment_type(service_discovery)),
    );
    out.subattr(
        "Redfish Service IP Address Format",
        format_args!("{}", address_format(service_format)),
    );
    if service_discovery == 0x01 || service_discovery == 0x03 {
        let family = address_format(service_format);
        out.subattr(
            &format!("{} Redfish Service Address", family),
            format_args!("{}", ip_address(s, data + 52, service_format)),
        );
        out.subattr(
            &format!("{} Redfish Service Mask", family),
            format_args!("{}", ip_address(s, data + 68, service_format)),
        );
        out.subattr("Redfish Service Port", format_args!("{}", s.word(data + 84)));
        out.subattr("Redfish Service Vlan", format_args!("{}", s.dword(data + 86)));
    }

    let name_length = usize::from(s.byte(data + 90));
    let hostname = if name_length + REDFISH_MIN_LENGTH > length {
        OUT_OF_SPEC.to_string()
    } else {
        s.field(data + REDFISH_MIN_LENGTH, name_length)
            .map(|name| {
                let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
                util::sanitize(&name[..end])
            })
            .unwrap_or_else(|| OUT_OF_SPEC.to_string())
    };
    out.subattr("Redfish Service Hostname", format_args!("{}", hostname));
}

fn tpm_vendor_id(s: &Structure) -> String {
    let id = s.field(0x04, 4).unwrap_or(&[]);
    let end = id.iter().position(|&b| b == 0).unwrap_or(id.len());

    util::sanitize(&id[..end])
}

pub fn tpm(s: &Structure, ctx: &mut Context) {
    const CHARACTERISTICS: &[&str] = &[
        "Family configurable via firmware update",
        "Family configurable via platform software support",
        "Family configurable via OEM proprietary mechanism",
    ];

    let out = &mut *ctx.out;
    let major = s.byte(0x08);

    out.attr("Vendor ID", format_args!("{}", tpm_vendor_id(s)));
    out.attr("Specification Version", format_args!("{}.{}", major, s.byte(0x09)));
    match major {
        0x01 => out.attr(
            "Firmware Revision",
            format_args!("{}.{}", s.byte(0x0c), s.byte(0x0d)),
        ),
        0x02 => {
            let revision = s.dword(0x0a);
            out.attr(
                "Firmware Revision",
                format_args!("{}.{}", revision >> 16, revision & 0xffff),
            );
        }
        _ => {}
    }
    out.attr("Description", format_args!("{}", s.string_at(0x12)));

    out.list_start("Characteristics", None);
    let code = s.qword(0x13);
    if code & (1 << 2) != 0 {
        out.list_item(format_args!("TPM Device characteristics not supported"));
    } else {
        for name in super::bits(CHARACTERISTICS, 3, code) {
            out.list_item(format_args!("{}", name));
        }
    }
    out.list_end();
    if s.length() < 0x1f {
        return;
    }

    out.attr("OEM-specific Information", format_args!("0x{:08X}", s.dword(0x1b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::{render, render_with, V32};
    use crate::entry::Version;
    use crate::structure::parse_header;

    #[test]
    fn management_device_length_fixup() {
        #[rustfmt::skip]
        let raw = [
            0x22, 0x10, 0x00, 0x22,
            0x01, 0x03, 0x00, 0x00, 0x00, 0x00, 0x03,
            b'L', b'M', b'7', b'8', b'-',
            b'A', 0x00,
            0x00,
        ];

        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);
        let fixed = fix_device_length(s, true, false);
        assert_eq!(fixed.length(), 0x0b);
        assert_eq!(fixed.string(1).to_string(), "LM78-A");

        // Binary hidden bytes are left alone.
        let mut binary = raw;
        binary[0x0c] = 0x01;
        let s = Structure::new(parse_header(&binary).expect("expected valid header"), &binary);
        assert_eq!(fix_device_length(s, true, false).length(), 0x10);
    }

    #[test]
    fn management_device_fields() {
        #[rustfmt::skip]
        let raw = [
            0x22, 0x0b, 0x00, 0x22,
            0x01, 0x04, 0x2e, 0x00, 0x00, 0x00, 0x05,
            b'L', b'M', b'7', b'8', 0x00,
            0x00,
        ];

        let want = "Management Device\n\
            \tDescription: LM78\n\
            \tType: LM78\n\
            \tAddress: 0x0000002E\n\
            \tAddress Type: SMBus\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn threshold_skips_unknown() {
        #[rustfmt::skip]
        let raw = [
            0x24, 0x10, 0x00, 0x00,
            0xf6, 0xff, 0x00, 0x80, 0x00, 0x80, 0x64, 0x00, 0x00, 0x80, 0x00, 0x80,
            0x00, 0x00,
        ];

        let want = "Management Device Threshold Data\n\
            \tLower Non-critical Threshold: -10\n\
            \tUpper Critical Threshold: 100\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn ipmi_kcs_interface() {
        #[rustfmt::skip]
        let raw = [
            0x26, 0x12, 0x00, 0x26,
            0x01, 0x20, 0x20, 0xff,
            0xa3, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x09, 0x00,
            0x00, 0x00,
        ];

        let want = "IPMI Device Information\n\
            \tInterface Type: KCS (Keyboard Control Style)\n\
            \tSpecification Version: 2.0\n\
            \tI2C Slave Address: 0x10\n\
            \tNV Storage Device: Not Present\n\
            \tBase Address: 0x0000000000000CA2 (I/O)\n\
            \tRegister Spacing: Successive Byte Boundaries\n\
            \tInterrupt Polarity: Active Low\n\
            \tInterrupt Trigger Mode: Level\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[rustfmt::skip]
    fn redfish_host_interface() -> Vec<u8> {
        let mut record = vec![0u8; 91];
        record[16] = 0x01;
        record[17] = 0x01;
        record[18..22].copy_from_slice(&[169, 254, 0, 2]);
        record[34..38].copy_from_slice(&[255, 255, 0, 0]);
        record[50] = 0x02;
        record[51] = 0x01;
        record[90] = 3;
        record.extend_from_slice(b"bmc");

        let mut raw = vec![
            0x2a, 0x00, 0x00, 0x2a,
            0x40, 0x09,
            0x03, 0x86, 0x80, 0x34, 0x12, 0x00, 0x00, 0x00, 0x00,
            0x01,
            0x04, record.len() as u8,
        ];
        raw.extend_from_slice(&record);
        raw[1] = raw.len() as u8;
        raw.extend_from_slice(&[0x00, 0x00]);
        raw
    }

    #[test]
    fn host_interface_redfish_record() {
        let want = "Management Controller Host Interface\n\
            \tHost Interface Type: Network\n\
            \tDevice Type: PCI/PCIe\n\
            \t\tVendorID: 0x8086\n\
            \t\tDeviceID: 0x1234\n\
            \t\tSubVendorID: 0x0000\n\
            \t\tSubDeviceID: 0x0000\n\
            \t\tProtocol ID: 04 (Redfish over IP)\n\
            \t\tService UUID: Not Settable\n\
            \t\tHost IP Assignment Type: Static\n\
            \t\tHost IP Address Format: IPv4\n\
            \t\tIPv4 Address: 169.254.0.2\n\
            \t\tIPv4 Mask: 255.255.0.0\n\
            \t\tRedfish Service IP Discovery Type: DHCP\n\
            \t\tRedfish Service IP Address Format: IPv4\n\
            \t\tRedfish Service Hostname: bmc\n\
            \n";

        assert_eq!(render(&redfish_host_interface(), V32), want);
    }

    #[test]
    fn host_interface_truncated_record() {
        let mut raw = redfish_host_interface();
        // Claim a longer record than the structure holds.
        raw[0x11] = 0xf0;

        let got = render(&raw, V32);
        assert!(got.contains("\tHost Interface Type: Network\n"));
        assert!(!got.contains("Protocol ID"));
    }

    #[test]
    fn host_interface_before_3_2() {
        #[rustfmt::skip]
        let raw = [
            0x2a, 0x09, 0x00, 0x2a,
            0xf0, 0x00, 0x00, 0x01, 0x57,
            0x00, 0x00,
        ];

        let want = "Management Controller Host Interface\n\
            \tInterface Type: OEM\n\
            \tVendor ID: 0x00000157\n\
            \n";

        assert_eq!(render(&raw, Version::new(3, 1, 0)), want);
    }

    #[test]
    fn tpm_device() {
        #[rustfmt::skip]
        let raw = [
            0x2b, 0x1f, 0x00, 0x2b,
            b'I', b'F', b'X', 0x00,
            0x02, 0x00,
            0x07, 0x00, 0x3e, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01,
            0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            b'T', b'P', b'M', b' ', b'2', b'.', b'0', 0x00,
            0x00,
        ];

        let want = "TPM Device\n\
            \tVendor ID: IFX\n\
            \tSpecification Version: 2.0\n\
            \tFirmware Revision: 62.7\n\
            \tDescription: TPM 2.0\n\
            \tCharacteristics:\n\
            \t\tFamily configurable via firmware update\n\
            \tOEM-specific Information: 0x00000000\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn component_handles_hidden_when_quiet() {
        #[rustfmt::skip]
        let raw = [
            0x23, 0x0b, 0x00, 0x00,
            0x01, 0x22, 0x00, 0x1a, 0x00, 0xff, 0xff,
            b'C', b'P', b'U', 0x00,
            0x00,
        ];

        let loud = render(&raw, V32);
        assert!(loud.contains("\tComponent Handle: 0x001A\n"));
        assert!(!loud.contains("Threshold Handle"));
        assert_eq!(
            render_with(&raw, V32, true),
            "Management Device Component\n\tDescription: CPU\n\n"
        );
    }
}
