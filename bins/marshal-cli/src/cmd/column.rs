use marshal_api::{CodecConfig, MarshalError, Value};
use marshal_codec::ColumnEnvelope;

use crate::config::ColumnArgs;
use crate::error::CliError;

pub fn run(args: &ColumnArgs, codec: &CodecConfig) -> Result<(), CliError> {
    let json = super::read_json(&args.input)?;
    let bytes = build_column(&args.name, &json, codec)?;
    super::write_bytes(&bytes, args.hex)
}

/// Rows come from a JSON array; each element is classified independently,
/// so one unclassifiable row aborts the whole envelope.
fn build_column(
    name: &str,
    json: &serde_json::Value,
    codec: &CodecConfig,
) -> Result<Vec<u8>, CliError> {
    let serde_json::Value::Array(rows) = json else {
        return Err(CliError::Input("column input must be a JSON array of row values".into()));
    };

    let values = rows.iter().enumerate().map(|(i, row)| {
        Value::from_json(row).map_err(|e: MarshalError| e.with_context(format!("row {i}")))
    });
    let bytes = ColumnEnvelope::collect(name.as_bytes(), values, *codec)?;
    tracing::info!(column = %name, rows = rows.len(), bytes = bytes.len(), "built envelope");
    Ok(bytes)
}
