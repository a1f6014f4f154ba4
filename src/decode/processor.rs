//! Processor Information (type 4) and Cache Information (type 7).

use super::{bit_list, bits, lookup, Context, OUT_OF_SPEC};
use crate::entry::Version;
use crate::structure::Structure;

/// Processor family codes, sorted for binary search. 0xBE is ambiguous and
/// resolved from the manufacturer string instead.
static FAMILIES: &[(u16, &str)] = &[
    (0x01, "Other"),
    (0x02, "Unknown"),
    (0x03, "8086"),
    (0x04, "80286"),
    (0x05, "80386"),
    (0x06, "80486"),
    (0x07, "8087"),
    (0x08, "80287"),
    (0x09, "80387"),
    (0x0a, "80487"),
    (0x0b, "Pentium"),
    (0x0c, "Pentium Pro"),
    (0x0d, "Pentium II"),
    (0x0e, "Pentium MMX"),
    (0x0f, "Celeron"),
    (0x10, "Pentium II Xeon"),
    (0x11, "Pentium III"),
    (0x12, "M1"),
    (0x13, "M2"),
    (0x14, "Celeron M"),
    (0x15, "Pentium 4 HT"),
    (0x18, "Duron"),
    (0x19, "K5"),
    (0x1a, "K6"),
    (0x1b, "K6-2"),
    (0x1c, "K6-3"),
    (0x1d, "Athlon"),
    (0x1e, "AMD29000"),
    (0x1f, "K6-2+"),
    (0x20, "Power PC"),
    (0x21, "Power PC 601"),
    (0x22, "Power PC 603"),
    (0x23, "Power PC 603+"),
    (0x24, "Power PC 604"),
    (0x25, "Power PC 620"),
    (0x26, "Power PC x704"),
    (0x27, "Power PC 750"),
    (0x28, "Core Duo"),
    (0x29, "Core Duo Mobile"),
    (0x2a, "Core Solo Mobile"),
    (0x2b, "Atom"),
    (0x2c, "Core M"),
    (0x2d, "Core m3"),
    (0x2e, "Core m5"),
    (0x2f, "Core m7"),
    (0x30, "Alpha"),
    (0x31, "Alpha 21064"),
    (0x32, "Alpha 21066"),
    (0x33, "Alpha 21164"),
    (0x34, "Alpha 21164PC"),
    (0x35, "Alpha 21164a"),
    (0x36, "Alpha 21264"),
    (0x37, "Alpha 21364"),
    (0x38, "Turion II Ultra Dual-Core Mobile M"),
    (0x39, "Turion II Dual-Core Mobile M"),
    (0x3a, "Athlon II Dual-Core M"),
    (0x3b, "Opteron 6100"),
    (0x3c, "Opteron 4100"),
    (0x3d, "Opteron 6200"),
    (0x3e, "Opteron 4200"),
    (0x3f, "FX"),
    (0x40, "MIPS"),
    (0x41, "MIPS R4000"),
    (0x42, "MIPS R4200"),
    (0x43, "MIPS R4400"),
    (0x44, "MIPS R4600"),
    (0x45, "MIPS R10000"),
    (0x46, "C-Series"),
    (0x47, "E-Series"),
    (0x48, "A-Series"),
    (0x49, "G-Series"),
    (0x4a, "Z-Series"),
    (0x4b, "R-Series"),
    (0x4c, "Opteron 4300"),
    (0x4d, "Opteron 6300"),
    (0x4e, "Opteron 3300"),
    (0x4f, "FirePro"),
    (0x50, "SPARC"),
    (0x51, "SuperSPARC"),
    (0x52, "MicroSPARC II"),
    (0x53, "MicroSPARC IIep"),
    (0x54, "UltraSPARC"),
    (0x55, "UltraSPARC II"),
    (0x56, "UltraSPARC IIi"),
    (0x57, "UltraSPARC III"),
    (0x58, "UltraSPARC IIIi"),
    (0x60, "68040"),
    (0x61, "68xxx"),
    (0x62, "68000"),
    (0x63, "68010"),
    (0x64, "68020"),
    (0x65, "68030"),
    (0x66, "Athlon X4"),
    (0x67, "Opteron X1000"),
    (0x68, "Opteron X2000"),
    (0x69, "Opteron A-Series"),
    (0x6a, "Opteron X3000"),
    (0x6b, "Zen"),
    (0x70, "Hobbit"),
    (0x78, "Crusoe TM5000"),
    (0x79, "Crusoe TM3000"),
    (0x7a, "Efficeon TM8000"),
    (0x80, "Weitek"),
    (0x82, "Itanium"),
    (0x83, "Athlon 64"),
    (0x84, "Opteron"),
    (0x85, "Sempron"),
    (0x86, "Turion 64"),
    (0x87, "Dual-Core Opteron"),
    (0x88, "Athlon 64 X2"),
    (0x89, "Turion 64 X2"),
    (0x8a, "Quad-Core Opteron"),
    (0x8b, "Third-Generation Opteron"),
    (0x8c, "Phenom FX"),
    (0x8d, "Phenom X4"),
    (0x8e, "Phenom X2"),
    (0x8f, "Athlon X2"),
    (0x90, "PA-RISC"),
    (0x91, "PA-RISC 8500"),
    (0x92, "PA-RISC 8000"),
    (0x93, "PA-RISC 7300LC"),
    (0x94, "PA-RISC 7200"),
    (0x95, "PA-RISC 7100LC"),
    (0x96, "PA-RISC 7100"),
    (0xa0, "V30"),
    (0xa1, "Quad-Core Xeon 3200"),
    (0xa2, "Dual-Core Xeon 3000"),
    (0xa3, "Quad-Core Xeon 5300"),
    (0xa4, "Dual-Core Xeon 5100"),
    (0xa5, "Dual-Core Xeon 5000"),
    (0xa6, "Dual-Core Xeon LV"),
    (0xa7, "Dual-Core Xeon ULV"),
    (0xa8, "Dual-Core Xeon 7100"),
    (0xa9, "Quad-Core Xeon 5400"),
    (0xaa, "Quad-Core Xeon"),
    (0xab, "Dual-Core Xeon 5200"),
    (0xac, "Dual-Core Xeon 7200"),
    (0xad, "Quad-Core Xeon 7300"),
    (0xae, "Quad-Core Xeon 7400"),
    (0xaf, "Multi-Core Xeon 7400"),
    (0xb0, "Pentium III Xeon"),
    (0xb1, "Pentium III Speedstep"),
    (0xb2, "Pentium 4"),
    (0xb3, "Xeon"),
    (0xb4, "AS400"),
    (0xb5, "Xeon MP"),
    (0xb6, "Athlon XP"),
    (0xb7, "Athlon MP"),
    (0xb8, "Itanium 2"),
    (0xb9, "Pentium M"),
    (0xba, "Celeron D"),
    (0xbb, "Pentium D"),
    (0xbc, "Pentium EE"),
    (0xbd, "Core Solo"),
    (0xbf, "Core 2 Duo"),
    (0xc0, "Core 2 Solo"),
    (0xc1, "Core 2 Extreme"),
    (0xc2, "Core 2 Quad"),
    (0xc3, "Core 2 Extreme Mobile"),
    (0xc4, "Core 2 Duo Mobile"),
    (0xc5, "Core 2 Solo Mobile"),
    (0xc6, "Core i7"),
    (0xc7, "Dual-Core Celeron"),
    (0xc8, "IBM390"),
    (0xc9, "G4"),
    (0xca, "G5"),
    (0xcb, "ESA/390 G6"),
    (0xcc, "z/Architecture"),
    (0xcd, "Core i5"),
    (0xce, "Core i3"),
    (0xcf, "Core i9"),
    (0xd2, "C7-M"),
    (0xd3, "C7-D"),
    (0xd4, "C7"),
    (0xd5, "Eden"),
    (0xd6, "Multi-Core Xeon"),
    (0xd7, "Dual-Core Xeon 3xxx"),
    (0xd8, "Quad-Core Xeon 3xxx"),
    (0xd9, "Nano"),
    (0xda, "Dual-Core Xeon 5xxx"),
    (0xdb, "Quad-Core Xeon 5xxx"),
    (0xdd, "Dual-Core Xeon 7xxx"),
    (0xde, "Quad-Core Xeon 7xxx"),
    (0xdf, "Multi-Core Xeon 7xxx"),
    (0xe0, "Multi-Core Xeon 3400"),
    (0xe4, "Opteron 3000"),
    (0xe5, "Sempron II"),
    (0xe6, "Embedded Opteron Quad-Core"),
    (0xe7, "Phenom Triple-Core"),
    (0xe8, "Turion Ultra Dual-Core Mobile"),
    (0xe9, "Turion Dual-Core Mobile"),
    (0xea, "Athlon Dual-Core"),
    (0xeb, "Sempron SI"),
    (0xec, "Phenom II"),
    (0xed, "Athlon II"),
    (0xee, "Six-Core Opteron"),
    (0xef, "Sempron M"),
    (0xfa, "i860"),
    (0xfb, "i960"),
    (0x100, "ARMv7"),
    (0x101, "ARMv8"),
    (0x104, "SH-3"),
    (0x105, "SH-4"),
    (0x118, "ARM"),
    (0x119, "StrongARM"),
    (0x12c, "6x86"),
    (0x12d, "MediaGX"),
    (0x12e, "MII"),
    (0x140, "WinChip"),
    (0x15e, "DSP"),
    (0x1f4, "Video Processor"),
];

const FLAGS: &[&str] = &[
    "FPU (Floating-point unit on-chip)",
    "VME (Virtual mode extension)",
    "DE (Debugging extension)",
    "PSE (Page size extension)",
    "TSC (Time stamp counter)",
    "MSR (Model specific registers)",
    "PAE (Physical address extension)",
    "MCE (Machine check exception)",
    "CX8 (CMPXCHG8 instruction supported)",
    "APIC (On-chip APIC hardware supported)",
    "",
    "SEP (Fast system call)",
    "MTRR (Memory type range registers)",
    "PGE (Page global enable)",
    "MCA (Machine check architecture)",
    "CMOV (Conditional move instruction supported)",
    "PAT (Page attribute table)",
    "PSE-36 (36-bit page size extension)",
    "PSN (Processor serial number present and enabled)",
    "CLFSH (CLFLUSH instruction supported)",
    "",
    "DS (Debug store)",
    "ACPI (ACPI supported)",
    "MMX (MMX technology supported)",
    "FXSR (FXSAVE and FXSTOR instructions supported)",
    "SSE (Streaming SIMD extensions)",
    "SSE2 (Streaming SIMD extensions 2)",
    "SS (Self-snoop)",
    "HTT (Multi-threading)",
    "TM (Thermal monitor supported)",
    "",
    "PBE (Pending break enabled)",
];

fn manufacturer_is(s: &Structure, name: &str) -> bool {
    match s.string_at(0x07).value() {
        Some(m) => {
            m.contains(name)
                || m.get(..name.len())
                    .map_or(false, |prefix| prefix.eq_ignore_ascii_case(name))
        }
        None => false,
    }
}

/// The processor family code, taken from the 16-bit field when the byte
/// field defers to it.
fn family_code(s: &Structure) -> u16 {
    if s.byte(0x06) == 0xfe && s.length() >= 0x2a {
        s.word(0x28)
    } else {
        u16::from(s.byte(0x06))
    }
}

/// Names the processor family of a Processor Information structure.
pub fn family(s: &Structure, version: Version) -> &'static str {
    // 0x30 meant Pentium Pro for Intel in SMBIOS 2.0.
    if version.major == 2
        && version.minor == 0
        && s.byte(0x06) == 0x30
        && s.length() >= 0x08
        && manufacturer_is(s, "Intel")
    {
        return "Pentium Pro";
    }

    let code = family_code(s);
    if code == 0xbe {
        if s.length() >= 0x08 {
            if manufacturer_is(s, "Intel") {
                return "Core 2";
            }
            if manufacturer_is(s, "AMD") {
                return "K7";
            }
        }

        return "Core 2 or K7";
    }

    FAMILIES
        .binary_search_by_key(&code, |&(c, _)| c)
        .map(|i| FAMILIES[i].1)
        .unwrap_or(OUT_OF_SPEC)
}

enum Signature {
    Intel,
    Amd,
}

/// Emits the raw processor ID followed by its decoded signature and flags,
/// for the families where the ID is known to hold CPUID data.
fn processor_id(s: &Structure, ctx: &mut Context) {
    let id = s.field(0x08, 8).unwrap_or(&[0; 8]);
    ctx.out.attr(
        "ID",
        format_args!(
            "{:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X}",
            id[0], id[1], id[2], id[3], id[4], id[5], id[6], id[7]
        ),
    );

    let code = family_code(s);
    let eax = s.dword(0x08);
    let edx = s.dword(0x0c);
    let dx = s.word(0x08);

    let sig = match code {
        // 80386 has its own signature format.
        0x05 => {
            ctx.out.attr(
                "Signature",
                format_args!(
                    "Type {}, Family {}, Major Stepping {}, Minor Stepping {}",
                    dx >> 12,
                    (dx >> 8) & 0xf,
                    (dx >> 4) & 0xf,
                    dx & 0xf
                ),
            );
            return;
        }
        // Only some 80486 support CPUID.
        0x06 => {
            if (dx & 0x0f00) == 0x0400
                && ((dx & 0x00f0) == 0x0040 || (dx & 0x00f0) >= 0x0070)
                && (dx & 0x000f) >= 0x0003
            {
                Signature::Intel
            } else {
                ctx.out.attr(
                    "Signature",
                    format_args!(
                        "Type {}, Family {}, Model {}, Stepping {}",
                        (dx >> 12) & 0x3,
                        (dx >> 8) & 0xf,
                        (dx >> 4) & 0xf,
                        dx & 0xf
                    ),
                );
                return;
            }
        }
        0x100..=0x101 | 0x118..=0x119 => {
            // MIDR; all zeroes before SMBIOS 3.1.0.
            let midr = eax;
            if midr != 0 {
                ctx.out.attr(
                    "Signature",
                    format_args!(
                        "Implementor 0x{:02x}, Variant 0x{:x}, Architecture {}, Part 0x{:03x}, Revision {}",
                        midr >> 24,
                        (midr >> 20) & 0xf,
                        (midr >> 16) & 0xf,
                        (midr >> 4) & 0xfff,
                        midr & 0xf
                    ),
                );
            }
            return;
        }
        0x0b..=0x15
        | 0x28..=0x2f
        | 0xa1..=0xb3
        | 0xb5
        | 0xb9..=0xc7
        | 0xcd..=0xcf
        | 0xd2..=0xdb
        | 0xdd..=0xe0 => Signature::Intel,
        0x18..=0x1d
        | 0x1f
        | 0x38..=0x3f
        | 0x46..=0x4f
        | 0x66..=0x6b
        | 0x83..=0x8f
        | 0xb6..=0xb7
        | 0xe4..=0xef => Signature::Amd,
        // Family "Other" or "Unknown": guess from the version string.
        0x01 | 0x02 => {
            let version = s.string_at(0x10);
            let version = version.value().unwrap_or("");
            if version.starts_with("Pentium III MMX")
                || version.starts_with("Intel(R) Core(TM)2")
                || version.starts_with("Intel(R) Pentium(R)")
                || version == "Genuine Intel(R) CPU U1400"
            {
                Signature::Intel
            } else if version.starts_with("AMD Athlon(TM)")
                || version.starts_with("AMD Opteron(tm)")
                || version.starts_with("Dual-Core AMD Opteron(tm)")
            {
                Signature::Amd
            } else {
                return;
            }
        }
        _ => return,
    };

    match sig {
        Signature::Intel => ctx.out.attr(
            "Signature",
            format_args!(
                "Type {}, Family {}, Model {}, Stepping {}",
                (eax >> 12) & 0x3,
                ((eax >> 20) & 0xff) + ((eax >> 8) & 0x0f),
                ((eax >> 12) & 0xf0) + ((eax >> 4) & 0x0f),
                eax & 0xf
            ),
        ),
        Signature::Amd => {
            let extended = (eax >> 8) & 0xf == 0xf;
            ctx.out.attr(
                "Signature",
                format_args!(
                    "Family {}, Model {}, Stepping {}",
                    ((eax >> 8) & 0xf) + if extended { (eax >> 20) & 0xff } else { 0 },
                    ((eax >> 4) & 0xf) | if extended { (eax >> 12) & 0xf0 } else { 0 },
                    eax & 0xf
                ),
            );
        }
    }

    bit_list(ctx.out, "Flags", FLAGS, 0, u64::from(edx));
}

/// Formats a processor or memory module voltage code.
pub fn voltage(code: u8) -> String {
    const LEGACY: &[&str] = &["5.0 V", "3.3 V", "2.9 V"];

    if code & 0x80 != 0 {
        return format!("{:.1} V", f64::from(code & 0x7f) / 10.0);
    }

    // Only reserved bits set reads the same as none set.
    let names = bits(LEGACY, 0, u64::from(code));
    if names.is_empty() {
        return "Unknown".to_string();
    }

    names.join(" ")
}

/// Formats a processor clock frequency in MHz.
pub fn frequency(code: u16) -> String {
    match code {
        0 => "Unknown".to_string(),
        n => format!("{} MHz", n),
    }
}

fn status(code: u8) -> &'static str {
    const STATUS: &[&str] = &[
        "Unknown",
        "Enabled",
        "Disabled By User",
        "Disabled By BIOS",
        "Idle",
        OUT_OF_SPEC,
        OUT_OF_SPEC,
        "Other",
    ];

    STATUS[usize::from(code & 0x07)]
}

fn upgrade(code: u8) -> &'static str {
    const UPGRADES: &[&str] = &[
        "Other",
        "Unknown",
        "Daughter Board",
        "ZIF Socket",
        "Replaceable Piggy Back",
        "None",
        "LIF Socket",
        "Slot 1",
        "Slot 2",
        "370-pin Socket",
        "Slot A",
        "Slot M",
        "Socket 423",
        "Socket A (Socket 462)",
        "Socket 478",
        "Socket 754",
        "Socket 940",
        "Socket 939",
        "Socket mPGA604",
        "Socket LGA771",
        "Socket LGA775",
        "Socket S1",
        "Socket AM2",
        "Socket F (1207)",
        "Socket LGA1366",
        "Socket G34",
        "Socket AM3",
        "Socket C32",
        "Socket LGA1156",
        "Socket LGA1567",
        "Socket PGA988A",
        "Socket BGA1288",
        "Socket rPGA988B",
        "Socket BGA1023",
        "Socket BGA1224",
        "Socket BGA1155",
        "Socket LGA1356",
        "Socket LGA2011",
        "Socket FS1",
        "Socket FS2",
        "Socket FM1",
        "Socket FM2",
        "Socket LGA2011-3",
        "Socket LGA1356-3",
        "Socket LGA1150",
        "Socket BGA1168",
        "Socket BGA1234",
        "Socket BGA1364",
        "Socket AM4",
        "Socket LGA1151",
        "Socket BGA1356",
        "Socket BGA1440",
        "Socket BGA1515",
        "Socket LGA3647-1",
        "Socket SP3",
        "Socket SP3r2",
        "Socket LGA2066",
        "Socket BGA1392",
        "Socket BGA1510",
        "Socket BGA1528",
    ];

    lookup(UPGRADES, 0x01, u32::from(code))
}

fn cache_handle(code: u16, level: &str, version: Version) -> String {
    if code != 0xffff {
        return format!("0x{:04X}", code);
    }

    if version >= Version::new(2, 3, 0) {
        "Not Provided".to_string()
    } else {
        format!("No {} Cache", level)
    }
}

/// Reads a count which defers to a 16-bit field when it reads 0xFF and the
/// structure is long enough to hold one.
fn count(s: &Structure, offset: usize, wide: usize) -> u16 {
    match s.byte(offset) {
        0xff if s.length() >= wide + 2 => s.word(wide),
        n => u16::from(n),
    }
}

pub fn processor(s: &Structure, ctx: &mut Context) {
    const TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "Central Processor",
        "Math Processor",
        "DSP Processor",
        "Video Processor",
    ];
    const CHARACTERISTICS: &[&str] = &[
        "64-bit capable",
        "Multi-Core",
        "Hardware Thread",
        "Execute Protection",
        "Enhanced Virtualization",
        "Power/Performance Control",
    ];

    ctx.out.attr("Socket Designation", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr("Type", format_args!("{}", lookup(TYPES, 0x01, u32::from(s.byte(0x05)))));
    ctx.out.attr("Family", format_args!("{}", family(s, ctx.version)));
    ctx.out.attr("Manufacturer", format_args!("{}", s.string_at(0x07)));
    processor_id(s, ctx);
    ctx.out.attr("Version", format_args!("{}", s.string_at(0x10)));
    ctx.out.attr("Voltage", format_args!("{}", voltage(s.byte(0x11))));
    ctx.out.attr("External Clock", format_args!("{}", frequency(s.word(0x12))));
    ctx.out.attr("Max Speed", format_args!("{}", frequency(s.word(0x14))));
    ctx.out.attr("Current Speed", format_args!("{}", frequency(s.word(0x16))));

    let socket = s.byte(0x18);
    if socket & (1 << 6) != 0 {
        ctx.out.attr("Status", format_args!("Populated, {}", status(socket)));
    } else {
        ctx.out.attr("Status", format_args!("Unpopulated"));
    }
    ctx.out.attr("Upgrade", format_args!("{}", upgrade(s.byte(0x19))));
    if s.length() < 0x20 {
        return;
    }

    if !ctx.quiet {
        for (i, level) in ["L1", "L2", "L3"].iter().enumerate() {
            let handle = cache_handle(s.word(0x1a + 2 * i), level, ctx.version);
            ctx.out.attr(&format!("{} Cache Handle", level), format_args!("{}", handle));
        }
    }
    if s.length() < 0x23 {
        return;
    }

    ctx.out.attr("Serial Number", format_args!("{}", s.string_at(0x20)));
    ctx.out.attr("Asset Tag", format_args!("{}", s.string_at(0x21)));
    ctx.out.attr("Part Number", format_args!("{}", s.string_at(0x22)));
    if s.length() < 0x28 {
        return;
    }

    if s.byte(0x23) != 0 {
        ctx.out.attr("Core Count", format_args!("{}", count(s, 0x23, 0x2a)));
    }
    if s.byte(0x24) != 0 {
        ctx.out.attr("Core Enabled", format_args!("{}", count(s, 0x24, 0x2c)));
    }
    if s.byte(0x25) != 0 {
        ctx.out.attr("Thread Count", format_args!("{}", count(s, 0x25, 0x2e)));
    }
    bit_list(
        ctx.out,
        "Characteristics",
        CHARACTERISTICS,
        2,
        u64::from(s.word(0x26)),
    );
}

/// Formats a memory module or cache speed in nanoseconds.
pub fn module_speed(code: u8) -> String {
    match code {
        0 => "Unknown".to_string(),
        n => format!("{} ns", n),
    }
}

fn cache_size(code: u16) -> String {
    if code & 0x8000 != 0 {
        format!("{} kB", u32::from(code & 0x7fff) << 6)
    } else {
        format!("{} kB", code)
    }
}

fn cache_size_2(code: u32) -> String {
    if code & 0x8000_0000 != 0 {
        let code = code & 0x7fff_ffff;
        if code >= 0x8000 {
            format!("{} MB", code >> 4)
        } else {
            format!("{} kB", code << 6)
        }
    } else if code & 0x8000 != 0 {
        format!("{} kB", (code & 0x7fff) << 6)
    } else {
        format!("{} kB", code)
    }
}

const SRAM_TYPES: &[&str] = &[
    "Other",
    "Unknown",
    "Non-burst",
    "Burst",
    "Pipeline Burst",
    "Synchronous",
    "Asynchronous",
];

pub fn cache(s: &Structure, ctx: &mut Context) {
    const MODES: &[&str] = &[
        "Write Through",
        "Write Back",
        "Varies With Memory Address",
        "Unknown",
    ];
    const LOCATIONS: &[&str] = &["Internal", "External", OUT_OF_SPEC, "Unknown"];
    const EC_TYPES: &[&str] = &[
        "Other",
        "Unknown",
        "None",
        "Parity",
        "Single-bit ECC",
        "Multi-bit ECC",
    ];
    const SYSTEM_TYPES: &[&str] = &["Other", "Unknown", "Instruction", "Data", "Unified"];
    const ASSOCIATIVITY: &[&str] = &[
        "Other",
        "Unknown",
        "Direct Mapped",
        "2-way Set-associative",
        "4-way Set-associative",
        "Fully Associative",
        "8-way Set-associative",
        "16-way Set-associative",
        "12-way Set-associative",
        "24-way Set-associative",
        "32-way Set-associative",
        "48-way Set-associative",
        "64-way Set-associative",
        "20-way Set-associative",
    ];

    let config = s.word(0x05);

    ctx.out.attr("Socket Designation", format_args!("{}", s.string_at(0x04)));
    ctx.out.attr(
        "Configuration",
        format_args!(
            "{}, {}, Level {}",
            if config & 0x0080 != 0 { "Enabled" } else { "Disabled" },
            if config & 0x0008 != 0 { "Socketed" } else { "Not Socketed" },
            (config & 0x0007) + 1
        ),
    );
    ctx.out.attr(
        "Operational Mode",
        format_args!("{}", MODES[usize::from((config >> 8) & 0x0003)]),
    );
    ctx.out.attr(
        "Location",
        format_args!("{}", LOCATIONS[usize::from((config >> 5) & 0x0003)]),
    );

    let installed = if s.length() >= 0x1b {
        cache_size_2(s.dword(0x17))
    } else {
        cache_size(s.word(0x09))
    };
    let maximum = if s.length() >= 0x17 {
        cache_size_2(s.dword(0x13))
    } else {
        cache_size(s.word(0x07))
    };
    ctx.out.attr("Installed Size", format_args!("{}", installed));
    ctx.out.attr("Maximum Size", format_args!("{}", maximum));

    bit_list(
        ctx.out,
        "Supported SRAM Types",
        SRAM_TYPES,
        0,
        u64::from(s.word(0x0b)),
    );

    let installed_type = bits(SRAM_TYPES, 0, u64::from(s.word(0x0d)));
    if installed_type.is_empty() {
        ctx.out.attr("Installed SRAM Type", format_args!("None"));
    } else {
        ctx.out.attr("Installed SRAM Type", format_args!("{}", installed_type.join(" ")));
    }
    if s.length() < 0x13 {
        return;
    }

    ctx.out.attr("Speed", format_args!("{}", module_speed(s.byte(0x0f))));
    ctx.out.attr(
        "Error Correction Type",
        format_args!("{}", lookup(EC_TYPES, 0x01, u32::from(s.byte(0x10)))),
    );
    ctx.out.attr(
        "System Type",
        format_args!("{}", lookup(SYSTEM_TYPES, 0x01, u32::from(s.byte(0x11)))),
    );
    ctx.out.attr(
        "Associativity",
        format_args!("{}", lookup(ASSOCIATIVITY, 0x01, u32::from(s.byte(0x12)))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::{render, render_with, V32};
    use crate::structure::parse_header;

    #[rustfmt::skip]
    fn processor_fixture() -> Vec<u8> {
        let mut raw = vec![
            0x04, 0x2a, 0x04, 0x00,
            0x01, 0x03, 0xb3, 0x02,
            // CPUID EAX and EDX.
            0x54, 0x06, 0x05, 0x00, 0xff, 0xfb, 0xeb, 0xbf,
            0x03, 0x8b,
            0x64, 0x00, 0x40, 0x0e, 0xd0, 0x07,
            0x41, 0x36,
            0x00, 0x01, 0x01, 0x01, 0xff, 0xff,
            0x00, 0x00, 0x00,
            0x10, 0x10, 0x20,
            0xfc, 0x00,
            0xb3, 0x00,
        ];
        raw.extend_from_slice(b"CPU0\0Intel(R) Corporation\0Intel(R) Xeon(R) Gold\0\0");
        raw
    }

    #[test]
    fn processor_information() {
        let want = "Processor Information\n\
            \tSocket Designation: CPU0\n\
            \tType: Central Processor\n\
            \tFamily: Xeon\n\
            \tManufacturer: Intel(R) Corporation\n\
            \tID: 54 06 05 00 FF FB EB BF\n\
            \tSignature: Type 0, Family 6, Model 85, Stepping 4\n\
            \tFlags:\n\
            \t\tFPU (Floating-point unit on-chip)\n\
            \t\tVME (Virtual mode extension)\n\
            \t\tDE (Debugging extension)\n\
            \t\tPSE (Page size extension)\n\
            \t\tTSC (Time stamp counter)\n\
            \t\tMSR (Model specific registers)\n\
            \t\tPAE (Physical address extension)\n\
            \t\tMCE (Machine check exception)\n\
            \t\tCX8 (CMPXCHG8 instruction supported)\n\
            \t\tAPIC (On-chip APIC hardware supported)\n\
            \t\tSEP (Fast system call)\n\
            \t\tMTRR (Memory type range registers)\n\
            \t\tPGE (Page global enable)\n\
            \t\tMCA (Machine check architecture)\n\
            \t\tCMOV (Conditional move instruction supported)\n\
            \t\tPAT (Page attribute table)\n\
            \t\tPSE-36 (36-bit page size extension)\n\
            \t\tCLFSH (CLFLUSH instruction supported)\n\
            \t\tDS (Debug store)\n\
            \t\tACPI (ACPI supported)\n\
            \t\tMMX (MMX technology supported)\n\
            \t\tFXSR (FXSAVE and FXSTOR instructions supported)\n\
            \t\tSSE (Streaming SIMD extensions)\n\
            \t\tSSE2 (Streaming SIMD extensions 2)\n\
            \t\tSS (Self-snoop)\n\
            \t\tHTT (Multi-threading)\n\
            \t\tTM (Thermal monitor supported)\n\
            \t\tPBE (Pending break enabled)\n\
            \tVersion: Intel(R) Xeon(R) Gold\n\
            \tVoltage: 1.1 V\n\
            \tExternal Clock: 100 MHz\n\
            \tMax Speed: 3648 MHz\n\
            \tCurrent Speed: 2000 MHz\n\
            \tStatus: Populated, Enabled\n\
            \tUpgrade: Socket LGA3647-1\n\
            \tL1 Cache Handle: 0x0100\n\
            \tL2 Cache Handle: 0x0101\n\
            \tL3 Cache Handle: Not Provided\n\
            \tSerial Number: Not Specified\n\
            \tAsset Tag: Not Specified\n\
            \tPart Number: Not Specified\n\
            \tCore Count: 16\n\
            \tCore Enabled: 16\n\
            \tThread Count: 32\n\
            \tCharacteristics:\n\
            \t\t64-bit capable\n\
            \t\tMulti-Core\n\
            \t\tHardware Thread\n\
            \t\tExecute Protection\n\
            \t\tEnhanced Virtualization\n\
            \t\tPower/Performance Control\n\
            \n";

        assert_eq!(render(&processor_fixture(), V32), want);
    }

    #[test]
    fn processor_cache_handles_hidden_when_quiet() {
        let got = render_with(&processor_fixture(), V32, true);

        assert!(!got.contains("Cache Handle"));
        assert!(got.contains("Core Count: 16"));
    }

    #[test]
    fn processor_short_revision() {
        let mut raw = processor_fixture();
        raw[1] = 0x1a;
        raw.truncate(0x1a);
        raw.extend_from_slice(b"CPU0\0Intel(R) Corporation\0Intel(R) Xeon(R) Gold\0\0");

        let got = render(&raw, V32);
        assert!(!got.contains("Cache Handle"));
        assert!(!got.contains("Serial Number"));
        assert!(got.ends_with("\tUpgrade: Socket LGA3647-1\n\n"));
    }

    #[test]
    fn processor_characteristics_none() {
        let mut raw = processor_fixture();
        raw[0x26] = 0x02;

        assert!(render(&raw, V32).contains("\tCharacteristics: None\n"));
    }

    #[test]
    fn family_special_cases() {
        let mut raw = processor_fixture();

        raw[0x06] = 0xbe;
        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);
        assert_eq!(family(&s, V32), "Core 2");

        raw[0x07] = 0x00;
        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);
        assert_eq!(family(&s, V32), "Core 2 or K7");

        raw[0x06] = 0xfe;
        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);
        assert_eq!(family(&s, V32), "Xeon");

        raw[0x06] = 0x17;
        let s = Structure::new(parse_header(&raw).expect("expected valid header"), &raw);
        assert_eq!(family(&s, V32), OUT_OF_SPEC);
    }

    #[test]
    fn voltages() {
        assert_eq!(voltage(0x8b), "1.1 V");
        assert_eq!(voltage(0x03), "5.0 V 3.3 V");
        assert_eq!(voltage(0x00), "Unknown");
        assert_eq!(voltage(0x08), "Unknown");
        assert_eq!(voltage(0x0a), "3.3 V");

        let mut raw = processor_fixture();
        raw[0x11] = 0x08;
        assert!(render(&raw, V32).contains("\tVoltage: Unknown\n"));
    }

    #[test]
    fn cache_information() {
        #[rustfmt::skip]
        let raw = [
            0x07, 0x1b, 0x00, 0x01,
            0x01, 0x81, 0x01,
            0x00, 0x04, 0x00, 0x04,
            0x20, 0x00, 0x20, 0x00,
            0x00, 0x05, 0x05, 0x07,
            0x00, 0x04, 0x00, 0x00,
            0x00, 0x04, 0x00, 0x00,
            b'L', b'2', 0x00,
            0x00,
        ];

        let want = "Cache Information\n\
            \tSocket Designation: L2\n\
            \tConfiguration: Enabled, Not Socketed, Level 2\n\
            \tOperational Mode: Write Back\n\
            \tLocation: Internal\n\
            \tInstalled Size: 1024 kB\n\
            \tMaximum Size: 1024 kB\n\
            \tSupported SRAM Types:\n\
            \t\tSynchronous\n\
            \tInstalled SRAM Type: Synchronous\n\
            \tSpeed: Unknown\n\
            \tError Correction Type: Single-bit ECC\n\
            \tSystem Type: Unified\n\
            \tAssociativity: 8-way Set-associative\n\
            \n";

        assert_eq!(render(&raw, V32), want);
    }

    #[test]
    fn cache_sizes() {
        assert_eq!(cache_size(0x8010), "1024 kB");
        assert_eq!(cache_size_2(0x8000_0400), "65536 kB");
        assert_eq!(cache_size_2(0x8000_8000), "2048 MB");
    }
}
