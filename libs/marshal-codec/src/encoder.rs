use marshal_api::{CodecConfig, InternPolicy, MarshalError, Tag, Value};

use crate::cursor::ByteWriter;
use crate::intern::{Interned, Interner};

/// Serializes `Value` trees into the tagged wire format.
///
/// Depth-first, pre-order: tag, payload, then children in order. One
/// encoder produces one message; its intern state spans every value
/// written into it.
pub struct Encoder {
    writer: ByteWriter,
    interner: Interner,
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            writer: ByteWriter::new(config.byte_order),
            interner: Interner::new(),
            config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    /// Append one complete value to the message.
    pub fn write(&mut self, value: &Value<'_>) -> Result<(), MarshalError> {
        self.write_value(value, 0)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    pub(crate) fn writer_mut(&mut self) -> &mut ByteWriter {
        &mut self.writer
    }

    /// Write a value that sits `depth` containers deep in the message.
    pub(crate) fn write_nested(&mut self, value: &Value<'_>, depth: usize) -> Result<(), MarshalError> {
        self.write_value(value, depth)
    }

    fn write_value(&mut self, value: &Value<'_>, depth: usize) -> Result<(), MarshalError> {
        match value {
            Value::Null => self.writer.write_u8(Tag::Null.byte()),
            Value::Bool(true) => self.writer.write_u8(Tag::True.byte()),
            Value::Bool(false) => self.writer.write_u8(Tag::False.byte()),
            Value::Int32(n) => {
                self.writer.write_u8(Tag::Int32.byte());
                self.writer.write_i32(*n);
            }
            Value::Float64(n) => {
                self.writer.write_u8(Tag::Float64.byte());
                self.writer.write_f64(*n);
            }
            Value::ByteString(bytes) => {
                self.writer.write_u8(Tag::ByteString.byte());
                self.writer.write_prefixed(bytes)?;
            }
            Value::UnicodeString(s) => {
                let intern = self.config.intern == InternPolicy::AllStrings;
                self.write_unicode(s, intern)?;
            }
            Value::Array(items) => {
                self.enter(depth)?;
                self.writer.write_u8(Tag::List.byte());
                self.writer.write_len(items.len())?;
                for item in items {
                    self.write_value(item, depth + 1)?;
                }
            }
            Value::Map(pairs) => {
                self.enter(depth)?;
                self.writer.write_u8(Tag::Dict.byte());
                for (key, value) in pairs {
                    self.write_key(key, depth + 1)?;
                    self.write_value(value, depth + 1)?;
                }
                self.writer.write_u8(Tag::DictEnd.byte());
            }
        }
        Ok(())
    }

    fn write_key(&mut self, key: &Value<'_>, depth: usize) -> Result<(), MarshalError> {
        match key {
            Value::UnicodeString(s) if self.config.intern != InternPolicy::Never => {
                self.write_unicode(s, true)
            }
            other => self.write_value(other, depth),
        }
    }

    fn write_unicode(&mut self, s: &str, intern: bool) -> Result<(), MarshalError> {
        if !intern {
            self.writer.write_u8(Tag::Unicode.byte());
            return self.writer.write_prefixed(s.as_bytes());
        }
        match self.interner.intern(s)? {
            Interned::Defined(index) => {
                tracing::trace!(index, len = s.len(), "interned string definition");
                self.writer.write_u8(Tag::Interned.byte());
                self.writer.write_prefixed(s.as_bytes())
            }
            Interned::Existing(index) => {
                self.writer.write_u8(Tag::StringRef.byte());
                self.writer.write_u32(index);
                Ok(())
            }
        }
    }

    fn enter(&self, depth: usize) -> Result<(), MarshalError> {
        if depth >= self.config.max_depth {
            return Err(MarshalError::DepthLimitExceeded { limit: self.config.max_depth });
        }
        Ok(())
    }
}

/// Encode with the default configuration (host byte order, no interning).
pub fn encode(value: &Value<'_>) -> Result<Vec<u8>, MarshalError> {
    encode_with(value, &CodecConfig::default())
}

pub fn encode_with(value: &Value<'_>, config: &CodecConfig) -> Result<Vec<u8>, MarshalError> {
    let mut encoder = Encoder::new(*config);
    encoder.write(value)?;
    let bytes = encoder.finish();
    tracing::debug!(bytes = bytes.len(), byte_order = %config.byte_order, "encoded value");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marshal_api::ByteOrder;

    fn le() -> CodecConfig {
        CodecConfig::default().with_byte_order(ByteOrder::little_endian())
    }

    #[test]
    fn scalars_are_tagged() {
        assert_eq!(encode(&Value::Null).unwrap(), b"N");
        assert_eq!(encode(&Value::Bool(true)).unwrap(), b"T");
        assert_eq!(encode(&Value::Bool(false)).unwrap(), b"F");
        assert_eq!(encode_with(&Value::Int32(1), &le()).unwrap(), b"i\x01\x00\x00\x00");
    }

    #[test]
    fn bool_is_not_an_int() {
        assert_ne!(encode(&Value::Bool(true)).unwrap(), encode(&Value::Int32(1)).unwrap());
        assert_ne!(encode(&Value::Bool(false)).unwrap(), encode(&Value::Int32(0)).unwrap());
    }

    #[test]
    fn int32_boundary_uses_float_beyond_range() {
        let max = encode_with(&Value::from_i64(i32::MAX as i64), &le()).unwrap();
        assert_eq!(max, b"i\xff\xff\xff\x7f");

        let over = encode_with(&Value::from_i64(1 << 31), &le()).unwrap();
        assert_eq!(over[0], b'g');
        assert_eq!(over.len(), 9);
        assert_eq!(&over[1..], &2147483648f64.to_le_bytes());

        let under = encode_with(&Value::from_i64(-(1 << 31) - 1), &le()).unwrap();
        assert_eq!(under[0], b'g');
        assert_eq!(&under[1..], &(-2147483649f64).to_le_bytes());
    }

    #[test]
    fn map_has_terminator_and_no_count() {
        let map = Value::Map(vec![(Value::from("a"), Value::Null)]);
        assert_eq!(encode_with(&map, &le()).unwrap(), b"{u\x01\x00\x00\x00aN0");
        assert_eq!(encode(&Value::Map(vec![])).unwrap(), b"{0");
    }

    #[test]
    fn map_keys_policy_interns_repeated_keys() {
        let row = |n| Value::Map(vec![(Value::from("id"), Value::Int32(n))]);
        let value = Value::Array(vec![row(1), row(2)]);
        let cfg = le().with_intern(InternPolicy::MapKeys);
        let bytes = encode_with(&value, &cfg).unwrap();
        assert_eq!(
            bytes,
            b"[\x02\x00\x00\x00{t\x02\x00\x00\x00idi\x01\x00\x00\x000{R\x00\x00\x00\x00i\x02\x00\x00\x000"
        );
    }

    #[test]
    fn map_keys_policy_leaves_values_alone() {
        let value = Value::Map(vec![(Value::from("k"), Value::from("k"))]);
        let cfg = le().with_intern(InternPolicy::MapKeys);
        assert_eq!(
            encode_with(&value, &cfg).unwrap(),
            b"{t\x01\x00\x00\x00ku\x01\x00\x00\x00k0"
        );
    }

    #[test]
    fn all_strings_policy_references_values_too() {
        let value = Value::Array(vec![Value::from("x"), Value::from("x")]);
        let cfg = le().with_intern(InternPolicy::AllStrings);
        assert_eq!(
            encode_with(&value, &cfg).unwrap(),
            b"[\x02\x00\x00\x00t\x01\x00\x00\x00xR\x00\x00\x00\x00"
        );
    }

    #[test]
    fn nesting_beyond_limit_is_rejected() {
        let mut value = Value::Null;
        for _ in 0..4 {
            value = Value::Array(vec![value]);
        }
        let cfg = CodecConfig::default().with_max_depth(3);
        assert_eq!(encode_with(&value, &cfg), Err(MarshalError::DepthLimitExceeded { limit: 3 }));
        assert!(encode_with(&value, &cfg.with_max_depth(4)).is_ok());
    }
}
