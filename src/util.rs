use std::fmt::Write;

/// Uppercase hex dump of raw key bytes, used in error messages.
pub fn debug_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Printable rendering of raw key bytes: ASCII graphic characters as-is,
/// everything else as `\xNN`.
pub fn format_bytes_as_str(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b if b.is_ascii_graphic() || b == b' ' => out.push(b as char),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump() {
        assert_eq!(debug_hex(&[0x7D, 0x12, 0x34, 0x00]), "7D123400");
        assert_eq!(debug_hex(&[]), "");
    }

    #[test]
    fn printable() {
        assert_eq!(format_bytes_as_str(b"ab\x00\xff"), r#""ab\x00\xff""#);
        assert_eq!(format_bytes_as_str(b"a\"b"), r#""a\"b""#);
    }
}
