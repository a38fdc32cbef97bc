//! Single-byte tags of the marshal wire format.
//!
//! Every encoded value starts with exactly one of these ASCII bytes.

/// Tag byte identifying a value's variant on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = b'N',
    True = b'T',
    False = b'F',
    Int32 = b'i',
    /// Two 4-byte halves, low word first. Decode only.
    Int64 = b'I',
    Float64 = b'g',
    ByteString = b's',
    Unicode = b'u',
    /// UnicodeString payload that also registers in the intern table.
    Interned = b't',
    /// 4-byte index into the intern table.
    StringRef = b'R',
    /// Decoded like `List`. Decode only.
    Tuple = b'(',
    List = b'[',
    Dict = b'{',
    /// Closes a `Dict`. Never a standalone value.
    DictEnd = b'0',
}

impl Tag {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let tag = match byte {
            b'N' => Tag::Null,
            b'T' => Tag::True,
            b'F' => Tag::False,
            b'i' => Tag::Int32,
            b'I' => Tag::Int64,
            b'g' => Tag::Float64,
            b's' => Tag::ByteString,
            b'u' => Tag::Unicode,
            b't' => Tag::Interned,
            b'R' => Tag::StringRef,
            b'(' => Tag::Tuple,
            b'[' => Tag::List,
            b'{' => Tag::Dict,
            b'0' => Tag::DictEnd,
            _ => return None,
        };
        Some(tag)
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Human-readable name, used by diagnostics and the inspector.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::True => "true",
            Tag::False => "false",
            Tag::Int32 => "int32",
            Tag::Int64 => "int64",
            Tag::Float64 => "float64",
            Tag::ByteString => "bytes",
            Tag::Unicode => "unicode",
            Tag::Interned => "interned",
            Tag::StringRef => "string-ref",
            Tag::Tuple => "tuple",
            Tag::List => "list",
            Tag::Dict => "dict",
            Tag::DictEnd => "dict-end",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' ({})", self.byte() as char, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_byte() {
        for byte in 0..=u8::MAX {
            if let Some(tag) = Tag::from_byte(byte) {
                assert_eq!(tag.byte(), byte);
            }
        }
        assert_eq!(Tag::from_byte(b'f'), None);
        assert_eq!(Tag::from_byte(b'?'), None);
    }
}
