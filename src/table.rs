//! Walks an SMBIOS structure table and dispatches each structure for display.

use crate::decode::{self, Context};
use crate::entry::TableInfo;
use crate::options::Options;
use crate::output::Output;
use crate::structure::{parse_header, Structure};

/// What a walk over a structure table visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Structures visited, including a truncated last one.
    pub structures: usize,

    /// Offset just past the last structure visited. May exceed the table
    /// length when the last structure is truncated.
    pub consumed: usize,

    /// The announced structure count was not met. Never set in quiet mode.
    pub count_mismatch: bool,

    /// The structures did not end at the announced table length. Never set
    /// in quiet mode.
    pub length_mismatch: bool,
}

/// Walks the structure table in `buf`, writing every structure selected by
/// `opts` to `out`.
///
/// `buf` may be shorter than `table.length` announces; the walk never reads
/// past its end. Inconsistencies between the table and the entry point are
/// reported through the log unless in quiet mode.
pub fn walk(buf: &[u8], table: &TableInfo, opts: &Options, out: &mut dyn Output) -> Summary {
    let count = usize::from(table.count);
    let mut quiet = opts.quiet;
    let mut ctx = Context::new(out, table.version, quiet);

    let mut visited = 0;
    let mut cursor = 0;

    while (visited < count || count == 0) && cursor + 4 <= buf.len() {
        let header = match parse_header(&buf[cursor..]) {
            Some(header) => header,
            None => break,
        };
        let display = opts.displays(header.header_type, header.handle);

        // Without a valid length the next structure cannot be located.
        if header.length < 4 {
            if !quiet {
                warn!(
                    "Invalid entry length ({}). DMI table is broken! Stop.",
                    header.length
                );
                quiet = true;
            }
            break;
        }
        visited += 1;

        if quiet && header.header_type == 127 {
            break;
        }

        if display && (!quiet || opts.dump) {
            ctx.out.handle(&header);
        }

        let mut next = cursor + usize::from(header.length);
        while next + 1 < buf.len() && (buf[next] != 0 || buf[next + 1] != 0) {
            next += 1;
        }
        next += 2;

        if next > buf.len() {
            if display && !quiet {
                ctx.out.struct_err(format_args!("<TRUNCATED>"));
                ctx.out.separator();
            }
            cursor = next;
            break;
        }

        let mut s = Structure::new(header, &buf[cursor..next]);

        if header.header_type == 1 && s.length() >= 5 {
            if let Some(vendor) = s.string(s.byte(0x04)).value() {
                ctx.oem.set_vendor(vendor);
            }
        }

        if header.header_type == 34 {
            s = decode::fix_device_length(s, display, quiet);
        }

        if display {
            if opts.dump {
                decode::dump(&s, ctx.out, true);
                ctx.out.separator();
            } else {
                decode::decode_structure(&s, &mut ctx);
            }
        } else if let Some(query) = opts.string {
            if query.header_type == header.header_type {
                decode::print_string(&s, query.header_type, query.offset, &mut ctx);
            }
        }

        cursor = next;

        if header.header_type == 127 && table.stop_at_eot {
            break;
        }
    }

    // SMBIOS 3 entry points announce a maximum length and no count.
    let length = table.length as usize;
    let count_mismatch = !quiet && count != 0 && visited != count;
    let length_mismatch = !quiet && (cursor > length || (count != 0 && cursor < length));

    if count_mismatch {
        warn!(
            "Wrong DMI structures count: {} announced, only {} decoded.",
            count, visited
        );
    }
    if length_mismatch {
        warn!(
            "Wrong DMI structures length: {} bytes announced, structures occupy {} bytes.",
            length, cursor
        );
    }

    Summary {
        structures: visited,
        consumed: cursor,
        count_mismatch,
        length_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Version;
    use crate::options::TypeFilter;
    use crate::output::StringOutput;
    use proptest::prelude::*;

    #[rustfmt::skip]
    const MEMORY_DEVICE: &[u8] = &[
        0x11, 0x15, 0x00, 0x11,
        0x00, 0x10,
        0xfe, 0xff,
        0x40, 0x00,
        0x40, 0x00,
        0x00, 0x20,
        0x09,
        0x00,
        0x01,
        0x02,
        0x1a,
        0x80, 0x00,
        b'D', b'I', b'M', b'M', b'0', 0x00,
        b'B', b'A', b'N', b'K', b'0', 0x00,
        0x00,
    ];

    #[rustfmt::skip]
    const INACTIVE: &[u8] = &[
        0x7e, 0x04, 0x20, 0x00,
        0x00, 0x00,
    ];

    #[rustfmt::skip]
    const END_OF_TABLE: &[u8] = &[
        0x7f, 0x04, 0xfe, 0xff,
        0x00, 0x00,
    ];

    fn table(structures: &[&[u8]]) -> Vec<u8> {
        structures.iter().flat_map(|s| s.iter().cloned()).collect()
    }

    fn info(buf: &[u8], count: u16, stop_at_eot: bool) -> TableInfo {
        TableInfo {
            address: 0,
            length: buf.len() as u32,
            count,
            version: Version::new(3, 2, 0),
            stop_at_eot,
        }
    }

    fn run(buf: &[u8], table: &TableInfo, opts: &Options) -> (Summary, String) {
        let mut out = StringOutput::new();
        let summary = walk(buf, table, opts, &mut out);

        (summary, out.into_string())
    }

    #[test]
    fn memory_device_locators() {
        let buf = table(&[MEMORY_DEVICE, END_OF_TABLE]);
        let (summary, text) = run(&buf, &info(&buf, 2, false), &Options::default());

        assert_eq!(summary.structures, 2);
        assert_eq!(summary.consumed, buf.len());
        assert!(!summary.count_mismatch);
        assert!(!summary.length_mismatch);
        assert!(text.starts_with("Handle 0x1100, DMI type 17, 21 bytes\nMemory Device\n"));
        assert!(text.contains("\tLocator: DIMM0\n"));
        assert!(text.contains("\tBank Locator: BANK0\n"));
        assert!(text.ends_with("Handle 0xFFFE, DMI type 127, 4 bytes\nEnd Of Table\n\n"));
    }

    #[test]
    fn count_mismatch_stops_at_buffer_end() {
        let buf = table(&[INACTIVE, INACTIVE, INACTIVE, INACTIVE]);
        let (summary, text) = run(&buf, &info(&buf, 5, false), &Options::default());

        assert_eq!(summary.structures, 4);
        assert_eq!(summary.consumed, 24);
        assert!(summary.count_mismatch);
        assert!(!summary.length_mismatch);
        assert_eq!(text.matches("Inactive\n").count(), 4);

        let opts = Options {
            quiet: true,
            ..Options::default()
        };
        let (summary, _) = run(&buf, &info(&buf, 5, false), &opts);
        assert_eq!(summary.structures, 4);
        assert!(!summary.count_mismatch);
        assert!(!summary.length_mismatch);
    }

    #[test]
    fn length_mismatch_reported() {
        let buf = table(&[INACTIVE, INACTIVE]);
        let mut announced = info(&buf, 2, false);
        announced.length = 20;

        let (summary, _) = run(&buf, &announced, &Options::default());
        assert_eq!(summary.consumed, 12);
        assert!(!summary.count_mismatch);
        assert!(summary.length_mismatch);
    }

    #[test]
    fn announced_count_limits_walk() {
        let buf = table(&[INACTIVE, INACTIVE, INACTIVE]);
        let (summary, _) = run(&buf, &info(&buf, 2, false), &Options::default());

        assert_eq!(summary.structures, 2);
        assert_eq!(summary.consumed, 12);
        assert!(!summary.count_mismatch);
        assert!(summary.length_mismatch);
    }

    #[test]
    fn truncated_structure() {
        #[rustfmt::skip]
        let buf = [
            0x80, 0x20, 0x00, 0x01,
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
        ];
        let (summary, text) = run(&buf, &info(&buf, 0, false), &Options::default());

        assert_eq!(summary.structures, 1);
        assert!(summary.consumed > buf.len());
        assert_eq!(
            text,
            "Handle 0x0100, DMI type 128, 32 bytes\n\t<TRUNCATED>\n\n"
        );
    }

    #[test]
    fn short_entry_stops_walk() {
        let buf = table(&[INACTIVE, &[0x00, 0x02, 0x00, 0x00, 0x00, 0x00], INACTIVE]);
        let (summary, text) = run(&buf, &info(&buf, 0, false), &Options::default());

        assert_eq!(summary.structures, 1);
        assert_eq!(summary.consumed, 6);
        assert_eq!(text.matches("Inactive\n").count(), 1);
    }

    #[test]
    fn end_of_table_marker() {
        let buf = table(&[INACTIVE, END_OF_TABLE, INACTIVE]);

        let (summary, _) = run(&buf, &info(&buf, 0, true), &Options::default());
        assert_eq!(summary.structures, 2);

        let (summary, _) = run(&buf, &info(&buf, 0, false), &Options::default());
        assert_eq!(summary.structures, 3);

        let opts = Options {
            quiet: true,
            ..Options::default()
        };
        let (summary, text) = run(&buf, &info(&buf, 0, false), &opts);
        assert_eq!(summary.structures, 2);
        assert_eq!(text, "");
    }

    #[test]
    fn dump_mode() {
        let opts = Options {
            dump: true,
            ..Options::default()
        };
        let (_, text) = run(INACTIVE, &info(INACTIVE, 1, false), &opts);

        assert_eq!(
            text,
            "Handle 0x0020, DMI type 126, 4 bytes\n\tHeader and Data:\n\t\t7E 04 20 00\n\n"
        );
    }

    #[test]
    fn vendor_set_from_hidden_system_information() {
        #[rustfmt::skip]
        let system: &[u8] = &[
            0x01, 0x08, 0x01, 0x00,
            0x01, 0x00, 0x00, 0x00,
            b'A', b'c', b'e', b'r', 0x00,
            0x00,
        ];
        #[rustfmt::skip]
        let hotkeys: &[u8] = &[
            0xaa, 0x0f, 0x00, 0xaa,
            0x41, 0x08, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00,
            0x05,
            0x00, 0x00,
        ];

        let mut types = TypeFilter::new();
        types.insert(170);
        let opts = Options {
            quiet: true,
            types: Some(types),
            ..Options::default()
        };

        let buf = table(&[system, hotkeys]);
        let (_, text) = run(&buf, &info(&buf, 2, false), &opts);

        assert!(text.starts_with("Acer Hotkey Function\n"));
        assert!(!text.contains("System Information"));
    }

    #[test]
    fn single_string_query() {
        #[rustfmt::skip]
        let system: &[u8] = &[
            0x01, 0x08, 0x01, 0x00,
            0x01, 0x02, 0x00, 0x00,
            b'A', b'c', b'm', b'e', 0x00,
            b'R', b'o', b'a', b'd', b'r', b'u', b'n', b'n', b'e', b'r', 0x00,
            0x00,
        ];

        let opts = Options {
            quiet: true,
            string: Some(
                crate::options::StringQuery::keyword("system-product-name")
                    .expect("expected valid keyword"),
            ),
            ..Options::default()
        };

        let buf = table(&[system, system]);
        let (_, text) = run(&buf, &info(&buf, 2, false), &opts);

        assert_eq!(text, "Roadrunner\nRoadrunner\n");
    }

    proptest! {
        #[test]
        fn walk_stays_in_bounds(
            buf in proptest::collection::vec(any::<u8>(), 0..512),
            count in 0u16..16,
            quiet in any::<bool>(),
            stop_at_eot in any::<bool>(),
        ) {
            let opts = Options { quiet, ..Options::default() };
            let (summary, _) = run(&buf, &info(&buf, count, stop_at_eot), &opts);

            if count != 0 {
                prop_assert!(summary.structures <= usize::from(count));
            }
            prop_assert!(summary.consumed <= buf.len() + 2 + 255);
        }

        #[test]
        fn walk_stops_at_double_nul(
            body in proptest::collection::vec(1u8..=255, 0..64),
        ) {
            // One structure whose strings never terminate, followed by one
            // which does.
            let mut buf = vec![0x80, 0x04, 0x00, 0x00];
            buf.extend_from_slice(&body);
            buf.extend_from_slice(&[0x00, 0x00]);
            buf.extend_from_slice(INACTIVE);

            let (summary, _) = run(&buf, &info(&buf, 0, false), &Options::default());

            prop_assert_eq!(summary.structures, 2);
            prop_assert_eq!(summary.consumed, buf.len());
        }
    }
}
