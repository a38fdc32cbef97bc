//! Columnar result envelope: one column's rows as `{ name: [v0, v1, ...] }`.
//!
//! Rows are encoded into the output buffer as they arrive; the row count
//! is back-patched when the envelope is finished. The bytes are identical
//! to encoding the equivalent `Map` tree in one pass.

use std::borrow::Cow;

use marshal_api::{CodecConfig, MarshalError, Tag, Value};

use crate::decoder::decode_exact;
use crate::encoder::Encoder;

/// Nesting used by the envelope itself: the map and the row array.
const ENVELOPE_DEPTH: usize = 2;

/// Incremental builder for a single-column envelope.
///
/// Dropping it (or calling `discard`) emits nothing; only `finish` produces
/// bytes, so an aborted query never yields a partial envelope.
pub struct ColumnEnvelope {
    encoder: Encoder,
    count_offset: usize,
    rows: usize,
    failed: Option<MarshalError>,
}

impl ColumnEnvelope {
    /// Begin an envelope. The column name keeps its raw-byte form.
    pub fn new(name: &[u8], config: CodecConfig) -> Result<Self, MarshalError> {
        if config.max_depth < ENVELOPE_DEPTH {
            return Err(MarshalError::DepthLimitExceeded { limit: config.max_depth });
        }
        let mut encoder = Encoder::new(config);
        encoder.writer_mut().write_u8(Tag::Dict.byte());
        encoder.write(&Value::ByteString(Cow::Borrowed(name)))?;
        let writer = encoder.writer_mut();
        writer.write_u8(Tag::List.byte());
        let count_offset = writer.len();
        writer.write_u32(0);
        Ok(Self { encoder, count_offset, rows: 0, failed: None })
    }

    /// Rows accepted so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Encode one row value.
    ///
    /// A failed row poisons the envelope: later pushes and `finish` return
    /// the same error.
    pub fn push(&mut self, value: &Value<'_>) -> Result<(), MarshalError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.rows == u32::MAX as usize {
            return Err(self.fail(MarshalError::LengthOverflow { len: self.rows + 1 }));
        }
        match self.encoder.write_nested(value, ENVELOPE_DEPTH) {
            Ok(()) => {
                self.rows += 1;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: MarshalError) -> MarshalError {
        self.failed = Some(err.clone());
        err
    }

    /// Close the row array and the map, returning the envelope bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, MarshalError> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        let rows = self.rows as u32;
        let writer = self.encoder.writer_mut();
        writer.patch_u32(self.count_offset, rows);
        writer.write_u8(Tag::DictEnd.byte());
        let bytes = self.encoder.finish();
        tracing::debug!(rows, bytes = bytes.len(), "column envelope finished");
        Ok(bytes)
    }

    /// Abandon the envelope without producing output.
    pub fn discard(self) {
        tracing::warn!(rows = self.rows, "column envelope discarded");
    }

    /// Build an envelope from a fallible row stream.
    ///
    /// The first row error (or encode error) discards everything gathered so far.
    pub fn collect<'v, I, E>(name: &[u8], rows: I, config: CodecConfig) -> Result<Vec<u8>, E>
    where
        I: IntoIterator<Item = Result<Value<'v>, E>>,
        E: From<MarshalError>,
    {
        let mut envelope = ColumnEnvelope::new(name, config)?;
        for row in rows {
            let pushed = match row {
                Ok(value) => envelope.push(&value).map_err(E::from),
                Err(err) => Err(err),
            };
            if let Err(err) = pushed {
                envelope.discard();
                return Err(err);
            }
        }
        Ok(envelope.finish()?)
    }
}

/// One-shot envelope with the default configuration.
pub fn marshal_column(name: &[u8], values: &[Value<'_>]) -> Result<Vec<u8>, MarshalError> {
    marshal_column_with(name, values, &CodecConfig::default())
}

pub fn marshal_column_with(
    name: &[u8],
    values: &[Value<'_>],
    config: &CodecConfig,
) -> Result<Vec<u8>, MarshalError> {
    let mut envelope = ColumnEnvelope::new(name, *config)?;
    for value in values {
        envelope.push(value)?;
    }
    envelope.finish()
}

/// A parsed column envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedColumn<'a> {
    pub name: Cow<'a, [u8]>,
    pub values: Vec<Value<'a>>,
}

impl DecodedColumn<'_> {
    /// Column name as text, replacing invalid UTF-8.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Parse and validate an envelope. Any deviation from the single-pair
/// `{ name: [rows] }` shape, or leftover bytes, makes the whole result
/// unavailable.
pub fn parse_column<'a>(bytes: &'a [u8], config: &CodecConfig) -> Result<DecodedColumn<'a>, MarshalError> {
    let value = decode_exact(bytes, config)?;
    let pairs = match value {
        Value::Map(pairs) => pairs,
        other => {
            return Err(MarshalError::MalformedEnvelope(format!(
                "expected a map, got {}",
                other.tag().name()
            )));
        }
    };
    let mut pairs = pairs.into_iter();
    let (key, rows) = match (pairs.next(), pairs.next()) {
        (Some(pair), None) => pair,
        (None, _) => return Err(MarshalError::MalformedEnvelope("empty map".into())),
        (Some(_), Some(_)) => {
            return Err(MarshalError::MalformedEnvelope("more than one column".into()));
        }
    };
    let name = match key {
        Value::ByteString(b) => b,
        Value::UnicodeString(Cow::Borrowed(s)) => Cow::Borrowed(s.as_bytes()),
        Value::UnicodeString(Cow::Owned(s)) => Cow::Owned(s.into_bytes()),
        other => {
            return Err(MarshalError::MalformedEnvelope(format!(
                "column name must be a string, got {}",
                other.tag().name()
            )));
        }
    };
    match rows {
        Value::Array(values) => Ok(DecodedColumn { name, values }),
        other => Err(MarshalError::MalformedEnvelope(format!(
            "rows must be an array, got {}",
            other.tag().name()
        ))
        .with_context(format!("column '{}'", String::from_utf8_lossy(&name)))),
    }
}
