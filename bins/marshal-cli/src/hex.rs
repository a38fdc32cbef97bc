//! Hex text helpers for `--hex` output and `--hex-input`.

pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode hex digits; ASCII whitespace between pairs is skipped.
pub fn decode(text: &[u8]) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = text.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| match (nibble(pair[0]), nibble(pair[1])) {
            (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
            _ => Err(format!("invalid hex digit in pair {i}: {:?}", String::from_utf8_lossy(pair))),
        })
        .collect()
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_lowercase() {
        assert_eq!(encode(&[0x00, 0x7b, 0xff]), "007bff");
    }

    #[test]
    fn decodes_with_whitespace() {
        assert_eq!(decode(b"7B 53\n01 00").unwrap(), vec![0x7b, 0x53, 0x01, 0x00]);
    }

    #[test]
    fn rejects_bad_digits() {
        assert!(decode(b"7").is_err());
        assert!(decode(b"zz").is_err());
    }
}
