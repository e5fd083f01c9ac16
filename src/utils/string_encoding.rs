// src/utils/string_encoding.rs

/// Encode `s` into exactly `width` bytes: truncated on a char boundary when
/// too long, NUL-padded when too short.
pub fn encode_fixed_string(s: &str, width: usize) -> Vec<u8> {
    let mut end = s.len().min(width);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut bytes = Vec::with_capacity(width);
    bytes.extend_from_slice(&s.as_bytes()[..end]);
    bytes.resize(width, 0);
    bytes
}

/// Decode a NUL-padded field, dropping the trailing padding.
pub fn decode_fixed_string_lossy(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
