use std::borrow::Cow;

use marshal_api::{CodecConfig, MarshalError, Tag, Value};

use crate::cursor::ByteReader;
use crate::intern::InternTable;

/// Parses one tagged value out of a borrowed buffer.
///
/// Strings and byte strings borrow from the input. Interned definitions
/// are recorded in a table that lives exactly as long as this decoder.
pub struct Decoder<'a> {
    reader: ByteReader<'a>,
    table: InternTable<'a>,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8], config: &CodecConfig) -> Self {
        Self {
            reader: ByteReader::new(bytes, config.byte_order),
            table: InternTable::new(),
            max_depth: config.max_depth,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Number of interned strings defined so far in this message.
    pub fn interned(&self) -> usize {
        self.table.len()
    }

    /// Read the next complete value.
    pub fn read_value(&mut self) -> Result<Value<'a>, MarshalError> {
        self.parse(0)
    }

    fn parse(&mut self, depth: usize) -> Result<Value<'a>, MarshalError> {
        let offset = self.reader.position();
        let tag = self.reader.read_u8()?;
        self.parse_tagged(tag, offset, depth)
    }

    fn parse_tagged(
        &mut self,
        byte: u8,
        offset: usize,
        depth: usize,
    ) -> Result<Value<'a>, MarshalError> {
        let Some(tag) = Tag::from_byte(byte) else {
            return Err(MarshalError::UnknownTag { tag: byte, offset });
        };
        match tag {
            Tag::Null => Ok(Value::Null),
            Tag::True => Ok(Value::Bool(true)),
            Tag::False => Ok(Value::Bool(false)),
            Tag::Int32 => Ok(Value::Int32(self.reader.read_i32()?)),
            Tag::Int64 => self.parse_int64(),
            Tag::Float64 => Ok(Value::Float64(self.reader.read_f64()?)),
            Tag::ByteString => Ok(Value::ByteString(Cow::Borrowed(self.reader.read_prefixed()?))),
            Tag::Unicode => Ok(Value::UnicodeString(Cow::Borrowed(self.reader.read_str()?))),
            Tag::Interned => {
                let s = self.reader.read_str()?;
                self.table.push(s)?;
                Ok(Value::UnicodeString(Cow::Borrowed(s)))
            }
            Tag::StringRef => {
                let index = self.reader.read_u32()?;
                Ok(Value::UnicodeString(Cow::Borrowed(self.table.resolve(index)?)))
            }
            Tag::List | Tag::Tuple => self.parse_list(depth),
            Tag::Dict => self.parse_dict(depth),
            // Only meaningful where `parse_dict` expects a key.
            Tag::DictEnd => Err(MarshalError::UnknownTag { tag: byte, offset }),
        }
    }

    /// `I` carries a full 64-bit integer. It is classified by value like any
    /// other number: Int32 when it fits, Float64 otherwise, which rounds
    /// magnitudes past 2^53 to the nearest representable double.
    fn parse_int64(&mut self) -> Result<Value<'a>, MarshalError> {
        Ok(Value::from_i64(self.reader.read_i64_halves()?))
    }

    fn parse_list(&mut self, depth: usize) -> Result<Value<'a>, MarshalError> {
        self.enter(depth)?;
        let count = self.reader.read_u32()? as usize;
        // Every element takes at least one byte.
        let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
        for _ in 0..count {
            items.push(self.parse(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Value<'a>, MarshalError> {
        self.enter(depth)?;
        let mut pairs = Vec::new();
        loop {
            let offset = self.reader.position();
            let tag = self.reader.read_u8()?;
            if tag == Tag::DictEnd.byte() {
                break;
            }
            let key = self.parse_tagged(tag, offset, depth + 1)?;
            let value = self.parse(depth + 1)?;
            pairs.push((key, value));
        }
        Ok(Value::Map(pairs))
    }

    fn enter(&self, depth: usize) -> Result<(), MarshalError> {
        if depth >= self.max_depth {
            return Err(MarshalError::DepthLimitExceeded { limit: self.max_depth });
        }
        Ok(())
    }
}

/// Decode with the default configuration. Trailing bytes are ignored.
pub fn decode(bytes: &[u8]) -> Result<Value<'_>, MarshalError> {
    decode_with(bytes, &CodecConfig::default())
}

pub fn decode_with<'a>(bytes: &'a [u8], config: &CodecConfig) -> Result<Value<'a>, MarshalError> {
    decode_prefix(bytes, config).map(|(value, _)| value)
}

/// Decode the leading value and report how many bytes it occupied.
pub fn decode_prefix<'a>(
    bytes: &'a [u8],
    config: &CodecConfig,
) -> Result<(Value<'a>, usize), MarshalError> {
    let mut decoder = Decoder::new(bytes, config);
    let value = decoder.read_value()?;
    let consumed = decoder.position();
    tracing::debug!(
        consumed,
        total = bytes.len(),
        interned = decoder.interned(),
        byte_order = %config.byte_order,
        "decoded value"
    );
    Ok((value, consumed))
}

/// Decode a buffer that must hold exactly one value.
pub fn decode_exact<'a>(bytes: &'a [u8], config: &CodecConfig) -> Result<Value<'a>, MarshalError> {
    let (value, consumed) = decode_prefix(bytes, config)?;
    match bytes.len() - consumed {
        0 => Ok(value),
        count => Err(MarshalError::TrailingBytes { count }),
    }
}
