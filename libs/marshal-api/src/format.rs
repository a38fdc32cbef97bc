use crate::config::CodecConfig;
use crate::error::MarshalError;
use crate::value::Value;

/// Runtime serializer: performs `bytes ↔ Value`.
///
/// - `deserialize()` parses one marshalled value. Uses `Cow::Borrowed`
///   for strings/bytes (zero-copy references into the source buffer).
/// - `serialize()` assembles a `Value` tree back into wire bytes.
///
/// Implementations carry their `CodecConfig`; nothing is process-global.
pub trait ValueSerializer: Send + Sync {
    fn deserialize<'a>(&self, bytes: &'a [u8]) -> Result<Value<'a>, MarshalError>;
    fn serialize(&self, value: &Value<'_>) -> Result<Vec<u8>, MarshalError>;
    fn config(&self) -> &CodecConfig;
}
