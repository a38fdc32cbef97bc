use std::sync::Arc;

use marshal_api::{CodecConfig, MarshalError, Value, ValueSerializer};

use crate::decoder::decode_with;
use crate::encoder::encode_with;

/// `ValueSerializer` backed by this crate's encoder and decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarshalSerializer {
    config: CodecConfig,
}

impl MarshalSerializer {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn shared(config: CodecConfig) -> Arc<dyn ValueSerializer> {
        Arc::new(Self::new(config))
    }
}

impl ValueSerializer for MarshalSerializer {
    fn deserialize<'a>(&self, bytes: &'a [u8]) -> Result<Value<'a>, MarshalError> {
        decode_with(bytes, &self.config)
    }

    fn serialize(&self, value: &Value<'_>) -> Result<Vec<u8>, MarshalError> {
        encode_with(value, &self.config)
    }

    fn config(&self) -> &CodecConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marshal_api::ByteOrder;

    #[test]
    fn serializers_with_different_orders_coexist() {
        let native = MarshalSerializer::shared(CodecConfig::default());
        let reversed =
            MarshalSerializer::shared(CodecConfig::default().with_byte_order(ByteOrder::Reversed));
        let value = Value::Int32(0x01020304);

        let a = native.serialize(&value).unwrap();
        let b = reversed.serialize(&value).unwrap();
        assert_ne!(a, b);
        assert_eq!(native.deserialize(&a).unwrap(), value);
        assert_eq!(reversed.deserialize(&b).unwrap(), value);
        assert_eq!(reversed.config().byte_order, ByteOrder::Reversed);
    }
}
