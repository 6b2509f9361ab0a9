//! Text decoding across a small ordered set of encodings.

/// Try to decode raw bytes as text: UTF-8, then UTF-16 (LE, BE, honoring a
/// BOM when present), then Latin-1 as the permissive last resort.
///
/// Returns `None` only when the bytes cannot be interpreted by any of the
/// encodings (odd-length UTF-16 with invalid surrogates and so on) — in
/// practice Latin-1 accepts anything, so `None` means the input was empty.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(s.to_string());
    }

    if let Some(s) = decode_utf16(bytes) {
        return Some(s);
    }

    // Latin-1: every byte maps to the code point of the same value.
    Some(bytes.iter().map(|&b| b as char).collect())
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    // BOM decides the byte order; default to little-endian like the
    // platforms that produce BOM-less UTF-16 files usually do.
    let (payload, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };

    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}
