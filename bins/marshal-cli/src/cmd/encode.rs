use marshal_api::{CodecConfig, Value};

use crate::config::EncodeArgs;
use crate::error::CliError;

pub fn run(args: &EncodeArgs, codec: &CodecConfig) -> Result<(), CliError> {
    let json = super::read_json(&args.input)?;
    let bytes = encode_json(&json, codec)?;
    tracing::info!(bytes = bytes.len(), byte_order = %codec.byte_order, "encoded");
    super::write_bytes(&bytes, args.hex)
}

fn encode_json(json: &serde_json::Value, codec: &CodecConfig) -> Result<Vec<u8>, CliError> {
    let value = Value::from_json(json)?;
    Ok(marshal_codec::encode_with(&value, codec)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marshal_api::{ByteOrder, MarshalError};
    use serde_json::json;

    fn le() -> CodecConfig {
        CodecConfig::default().with_byte_order(ByteOrder::little_endian())
    }

    #[test]
    fn object_is_encoded_with_sorted_keys() {
        let bytes = encode_json(&json!({"b": 1, "a": null}), &le()).unwrap();
        assert_eq!(bytes, b"{u\x01\x00\x00\x00aNu\x01\x00\x00\x00bi\x01\x00\x00\x000");
    }

    #[test]
    fn bad_bytes_escape_is_a_codec_error() {
        let err = encode_json(&json!({"$bytes": 1}), &le()).unwrap_err();
        assert!(matches!(err, CliError::Marshal(MarshalError::UnsupportedValue(_))), "{err}");
    }
}
