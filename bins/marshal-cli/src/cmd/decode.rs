use std::io::Write;

use marshal_api::CodecConfig;

use crate::config::DecodeArgs;
use crate::error::CliError;

pub fn run(args: &DecodeArgs, codec: &CodecConfig) -> Result<(), CliError> {
    let bytes = super::read_buffer(&args.input, args.hex_input)?;
    let json = decode_json(&bytes, args, codec)?;

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &json)?;
    writeln!(out)?;
    Ok(())
}

/// `--envelope` yields `{"column": name, "values": [...]}`; otherwise the
/// decoded value itself.
fn decode_json(
    bytes: &[u8],
    args: &DecodeArgs,
    codec: &CodecConfig,
) -> Result<serde_json::Value, CliError> {
    if args.envelope {
        let column = marshal_codec::parse_column(bytes, codec)?;
        tracing::info!(column = %column.name_lossy(), rows = column.values.len(), "decoded envelope");
        let mut map = serde_json::Map::with_capacity(2);
        map.insert("column".into(), column.name_lossy().into_owned().into());
        map.insert("values".into(), serde_json::to_value(&column.values)?);
        return Ok(serde_json::Value::Object(map));
    }
    if args.strict {
        return Ok(serde_json::to_value(marshal_codec::decode_exact(bytes, codec)?)?);
    }
    let (value, consumed) = marshal_codec::decode_prefix(bytes, codec)?;
    if consumed < bytes.len() {
        tracing::warn!(trailing = bytes.len() - consumed, "ignoring trailing bytes");
    }
    Ok(serde_json::to_value(value)?)
}
