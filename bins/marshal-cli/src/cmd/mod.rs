pub mod column;
pub mod decode;
pub mod encode;
pub mod inspect;

use std::io::{Read, Write};

use crate::config::InputArgs;
use crate::error::CliError;

/// Read the whole input: a file when given, stdin otherwise.
pub fn read_input(args: &InputArgs) -> Result<Vec<u8>, CliError> {
    let bytes = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            buf
        }
    };
    tracing::debug!(bytes = bytes.len(), source = args.input.as_deref().unwrap_or("stdin"), "read input");
    Ok(bytes)
}

/// Read a marshal buffer, optionally given as hex text (whitespace ignored).
pub fn read_buffer(args: &InputArgs, hex_input: bool) -> Result<Vec<u8>, CliError> {
    let raw = read_input(args)?;
    if !hex_input {
        return Ok(raw);
    }
    crate::hex::decode(&raw).map_err(CliError::Hex)
}

pub fn read_json(args: &InputArgs) -> Result<serde_json::Value, CliError> {
    let raw = read_input(args)?;
    Ok(serde_json::from_slice(&raw)?)
}

pub fn write_bytes(bytes: &[u8], as_hex: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if as_hex {
        writeln!(out, "{}", crate::hex::encode(bytes))?;
    } else {
        out.write_all(bytes)?;
    }
    out.flush()?;
    Ok(())
}
