//! Small helpers shared by the entry point, table and legacy decoders.

/// Reports whether the bytes in `buf` sum to zero, modulo 256.
///
/// An empty buffer trivially passes.
pub fn checksum(buf: &[u8]) -> bool {
    buf.iter().fold(0u8, |sum, b| sum.wrapping_add(*b)) == 0
}

/// Reports whether every byte in `buf` is a printable ASCII character.
pub fn is_printable(buf: &[u8]) -> bool {
    buf.iter().all(|b| (32..127).contains(b))
}

/// Replaces control characters and DEL with '.', as done for every string
/// pulled out of firmware before it is displayed.
pub fn sanitize(buf: &[u8]) -> String {
    buf.iter()
        .map(|&b| if b < 32 || b == 127 { '.' } else { b as char })
        .collect()
}

/// Formats `buf` as rows of at most 16 upper-case hex bytes separated by
/// spaces.
pub fn hex_rows(buf: &[u8]) -> Vec<String> {
    buf.chunks(16)
        .map(|row| {
            row.iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn checksum_empty_ok() {
        assert!(checksum(&[]));
    }

    #[test]
    fn checksum_wraps() {
        assert!(checksum(&[0x80, 0x80]));
        assert!(!checksum(&[0x80, 0x7f]));
    }

    #[test]
    fn sanitize_control_characters() {
        assert_eq!(sanitize(b"a\tb\x7fc"), "a.b.c");
        assert_eq!(sanitize(b"Intel(R)"), "Intel(R)");
    }

    #[test]
    fn hex_rows_split_at_sixteen() {
        let buf: Vec<u8> = (0..18).collect();
        let rows = hex_rows(&buf);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F");
        assert_eq!(rows[1], "10 11");
    }

    proptest! {
        #[test]
        fn checksum_forced_valid(mut buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let sum = buf.iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
            buf.push(0u8.wrapping_sub(sum));
            prop_assert!(checksum(&buf));
        }

        #[test]
        fn checksum_forced_invalid(
            mut buf in proptest::collection::vec(any::<u8>(), 0..64),
            skew in 1u8..=255,
        ) {
            let sum = buf.iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
            buf.push(0u8.wrapping_sub(sum).wrapping_add(skew));
            prop_assert!(!checksum(&buf));
        }

        #[test]
        fn checksum_matches_modular_sum(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let sum: u32 = buf.iter().map(|&b| u32::from(b)).sum();
            prop_assert_eq!(checksum(&buf), sum % 256 == 0);
        }

        #[test]
        fn sanitize_is_always_printable(buf in proptest::collection::vec(1u8..128, 0..64)) {
            prop_assert!(is_printable(sanitize(&buf).as_bytes()));
        }
    }
}
