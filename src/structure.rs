//! SMBIOS structure headers, fixed field access and string tables.

use std::fmt;

use byteorder::{ByteOrder, LE};
use bytes::Buf;

use crate::util;

/// The fixed header shared by every structure in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub header_type: u8,
    pub length: u8,
    pub handle: u16,
}

/// Parses the 4 byte header at the start of `buf`, or returns None if the
/// buffer is truncated.
pub fn parse_header(buf: &[u8]) -> Option<Header> {
    if buf.len() < 4 {
        return None;
    }

    let mut buf = &buf[..4];
    Some(Header {
        header_type: buf.get_u8(),
        length: buf.get_u8(),
        handle: buf.get_u16_le(),
    })
}

/// The result of resolving a string reference from a structure's fixed
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmiString {
    /// Index 0: the field was deliberately left empty.
    NotSpecified,

    /// The index points past the end of the string table.
    BadIndex,

    /// A sanitized copy of the referenced string.
    Value(String),
}

impl DmiString {
    /// Returns the string value if one was found.
    pub fn value(&self) -> Option<&str> {
        match *self {
            DmiString::Value(ref s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DmiString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DmiString::NotSpecified => write!(f, "Not Specified"),
            DmiString::BadIndex => write!(f, "<BAD INDEX>"),
            DmiString::Value(ref s) => write!(f, "{}", s),
        }
    }
}

/// A read-only view of one SMBIOS structure inside a table buffer: its
/// header, its formatted area and its string table.
#[derive(Debug, Clone, Copy)]
pub struct Structure<'a> {
    pub header: Header,
    raw: &'a [u8],
}

impl<'a> Structure<'a> {
    /// Creates a view over `raw`, which must span from the header to the end
    /// of the string table's double NUL terminator.
    pub fn new(header: Header, raw: &'a [u8]) -> Self {
        Structure { header, raw }
    }

    /// Returns a copy of this view with the formatted area shortened to
    /// `length`, turning the trailing bytes into string table content.
    pub fn with_length(self, length: u8) -> Self {
        Structure {
            header: Header { length, ..self.header },
            raw: self.raw,
        }
    }

    /// The length of the formatted area, header included.
    pub fn length(&self) -> usize {
        usize::from(self.header.length).min(self.raw.len())
    }

    /// The formatted area, header included.
    pub fn data(&self) -> &'a [u8] {
        &self.raw[..self.length()]
    }

    /// The string table, double NUL terminator included.
    pub fn string_table(&self) -> &'a [u8] {
        &self.raw[self.length()..]
    }

    /// The whole structure as it appears in the table.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Reports whether the string table holds any string.
    pub fn has_strings(&self) -> bool {
        self.string_table().iter().take(2).any(|&b| b != 0)
    }

    /// Reads the byte at `offset`, or zero past the formatted area.
    pub fn byte(&self, offset: usize) -> u8 {
        self.data().get(offset).cloned().unwrap_or(0)
    }

    /// Reads the little-endian word at `offset`, or zero past the formatted
    /// area.
    pub fn word(&self, offset: usize) -> u16 {
        self.field(offset, 2).map_or(0, LE::read_u16)
    }

    /// Reads the little-endian double word at `offset`, or zero past the
    /// formatted area.
    pub fn dword(&self, offset: usize) -> u32 {
        self.field(offset, 4).map_or(0, LE::read_u32)
    }

    /// Reads the little-endian quad word at `offset`, or zero past the
    /// formatted area.
    pub fn qword(&self, offset: usize) -> u64 {
        self.field(offset, 8).map_or(0, LE::read_u64)
    }

    /// Returns `len` bytes of the formatted area starting at `offset`.
    pub fn field(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data().get(offset..offset.checked_add(len)?)
    }

    /// Resolves the string referenced by the byte at `offset`.
    pub fn string_at(&self, offset: usize) -> DmiString {
        self.string(self.byte(offset))
    }

    /// Resolves 1-based string `index` and returns a sanitized copy.
    pub fn string(&self, index: u8) -> DmiString {
        if index == 0 {
            return DmiString::NotSpecified;
        }

        match self.raw_string(index) {
            Some(s) => DmiString::Value(util::sanitize(s)),
            None => DmiString::BadIndex,
        }
    }

    /// Resolves 1-based string `index` without sanitizing it.
    ///
    /// The scan never leaves the string table, even when the double NUL
    /// terminator is missing.
    pub fn raw_string(&self, index: u8) -> Option<&'a [u8]> {
        if index == 0 {
            return None;
        }

        let mut rest = self.string_table();
        for _ in 1..index {
            match rest.iter().position(|&b| b == 0) {
                // A NUL at the start of a string ends the table.
                Some(0) | None => return None,
                Some(n) => rest = &rest[n + 1..],
            }
        }

        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }

        Some(&rest[..end])
    }

    /// Iterates over the raw strings in the string table.
    pub fn strings(&self) -> Strings<'a> {
        Strings {
            rest: self.string_table(),
        }
    }
}

/// An iterator over the raw strings of a structure's string table.
pub struct Strings<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Strings<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.rest.iter().position(|&b| b == 0).unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }

        let s = &self.rest[..end];
        self.rest = &self.rest[(end + 1).min(self.rest.len())..];
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn structure(raw: &[u8]) -> Structure {
        let header = parse_header(raw).expect("expected valid header");
        Structure::new(header, raw)
    }

    #[test]
    fn parse_header_ok() {
        let got = parse_header(&[17, 0x15, 0x34, 0x12, 0xff]).expect("expected valid header");

        let want = Header {
            header_type: 17,
            length: 0x15,
            handle: 0x1234,
        };

        assert_eq!(want, got);
    }

    #[test]
    fn parse_header_truncated() {
        assert_eq!(parse_header(&[17, 0x15, 0x34]), None);
    }

    #[test]
    fn string_lookup() {
        #[rustfmt::skip]
        let s = structure(&[
            127, 0x06, 0x01, 0x00,
            0x01, 0x02,
            b'a', b'b', b'c', b'd', 0x00,
            b'1', b'\t', b'3', 0x00,
            0x00,
        ]);

        assert_eq!(s.string(0), DmiString::NotSpecified);
        assert_eq!(s.string(1), DmiString::Value("abcd".to_string()));
        assert_eq!(s.string(2), DmiString::Value("1.3".to_string()));
        assert_eq!(s.string(3), DmiString::BadIndex);
        assert_eq!(s.string_at(4).to_string(), "abcd");
        assert_eq!(s.raw_string(2), Some(&b"1\t3"[..]));

        let all: Vec<&[u8]> = s.strings().collect();
        assert_eq!(all, vec![&b"abcd"[..], &b"1\t3"[..]]);
        assert!(s.has_strings());
    }

    #[test]
    fn string_lookup_no_strings() {
        let s = structure(&[127, 0x04, 0x01, 0x00, 0x00, 0x00]);

        assert_eq!(s.string(1), DmiString::BadIndex);
        assert_eq!(s.string(1).to_string(), "<BAD INDEX>");
        assert_eq!(s.strings().count(), 0);
        assert!(!s.has_strings());
    }

    #[test]
    fn string_lookup_unterminated() {
        // A corrupt table without the double NUL must not be over-read.
        let s = structure(&[127, 0x04, 0x01, 0x00, b'x', b'y']);

        assert_eq!(s.string(1), DmiString::Value("xy".to_string()));
        assert_eq!(s.string(2), DmiString::BadIndex);
    }

    #[test]
    fn fields_past_length_read_zero() {
        let s = structure(&[4, 0x06, 0x00, 0x00, 0x34, 0x12, 0xff, 0xff, 0x00, 0x00]);

        assert_eq!(s.word(4), 0x1234);
        assert_eq!(s.byte(6), 0);
        assert_eq!(s.word(5), 0);
        assert_eq!(s.dword(4), 0);
        assert_eq!(s.field(4, 3), None);
    }

    #[test]
    fn shortened_length_exposes_strings() {
        let s = structure(&[34, 0x07, 0x00, 0x00, 0x00, b'A', b'B', 0x00, 0x00]).with_length(5);

        assert_eq!(s.length(), 5);
        assert_eq!(s.string(1), DmiString::Value("AB".to_string()));
    }

    proptest! {
        #[test]
        fn string_zero_is_not_specified(tail in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut raw = vec![1, 0x04, 0x00, 0x00];
            raw.extend(tail);

            prop_assert_eq!(structure(&raw).string(0), DmiString::NotSpecified);
        }

        #[test]
        fn string_past_count_is_bad_index(
            strings in proptest::collection::vec("[a-zA-Z0-9 ]{1,8}", 0..6),
            extra in 1u8..10,
        ) {
            let mut raw = vec![1, 0x04, 0x00, 0x00];
            for s in &strings {
                raw.extend_from_slice(s.as_bytes());
                raw.push(0);
            }
            raw.extend_from_slice(&[0, 0]);

            let s = structure(&raw);
            let index = strings.len() as u8 + extra;
            prop_assert_eq!(s.string(index), DmiString::BadIndex);

            for (i, want) in strings.iter().enumerate() {
                prop_assert_eq!(s.string(i as u8 + 1), DmiString::Value(want.clone()));
            }
        }

        #[test]
        fn string_scan_stays_in_bounds(
            raw in proptest::collection::vec(any::<u8>(), 4..48),
            index in any::<u8>(),
        ) {
            let s = structure(&raw);
            if let Some(found) = s.raw_string(index) {
                prop_assert!(found.len() <= s.string_table().len());
            }
        }
    }
}
