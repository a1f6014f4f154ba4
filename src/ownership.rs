//! Reads the ownership tag of Compaq machines, located through the `32OS`
//! directory in the BIOS area.

use byteorder::{ByteOrder, LE};

use crate::memory::ByteSource;
use crate::Result;

/// The physical address at which the directory scan starts.
pub const START_ADDRESS: u64 = 0x000e_0000;

/// The size of the directory scan window.
pub const SCAN_LENGTH: usize = 0x2_0000;

const ANCHOR: &[u8] = b"32OS";
const ENTRY_SIZE: usize = 10;
const TAG_SIZE: usize = 0x50;
const PARAGRAPH_SIZE: usize = 16;

/// Looks up the ownership tag address in a `32OS` directory.
///
/// Every directory entry must start with '$' and three upper-case letters;
/// a malformed directory is logged and yields None, as does one without an
/// `$ERB` entry.
pub fn tag_address(p: &[u8]) -> Option<u32> {
    let count = usize::from(*p.get(4)?);
    let entries = p.get(5..5 + count * ENTRY_SIZE)?;

    for e in entries.chunks_exact(ENTRY_SIZE) {
        if e[0] != b'$' || !e[1..4].iter().all(u8::is_ascii_uppercase) {
            warn!(
                "Abnormal Entry! Please report. [{:02x} {:02x} {:02x} {:02x}]",
                e[0], e[1], e[2], e[3]
            );
            return None;
        }
    }

    entries
        .chunks_exact(ENTRY_SIZE)
        .find(|e| e.starts_with(b"$ERB"))
        .map(|e| LE::read_u32(&e[4..8]))
}

/// Renders a raw ownership tag: trailing spaces and NULs are chopped and
/// control characters replaced by '?'. Returns None for an empty tag.
pub fn tag_text(buf: &[u8]) -> Option<String> {
    let end = buf.iter().rposition(|&b| b != b' ' && b != 0)? + 1;

    // The tag is Latin-1.
    Some(
        buf[..end]
            .iter()
            .map(|&b| match b {
                0..=31 | 127..=159 => '?',
                b => char::from(b),
            })
            .collect(),
    )
}

/// Scans `mem`, a copy of physical memory starting at `base`, for the first
/// `32OS` directory naming an ownership tag, and reads the tag through
/// `source`.
///
/// Returns the rendered tag, or None if no directory names one or the tag
/// is empty.
pub fn find(mem: &[u8], source: &mut dyn ByteSource) -> Result<Option<String>> {
    for offset in (0..mem.len()).step_by(PARAGRAPH_SIZE) {
        if !mem[offset..].starts_with(ANCHOR) || mem.len() < offset + 5 {
            continue;
        }

        let len = usize::from(mem[offset + 4]) * ENTRY_SIZE + 5;
        let address = match mem.get(offset..offset + len).and_then(tag_address) {
            Some(address) => address,
            None => continue,
        };

        debug!("ownership tag at {:#x}", address);
        let tag = source.read(u64::from(address), TAG_SIZE)?;

        return Ok(tag_text(&tag));
    }

    Ok(None)
}
