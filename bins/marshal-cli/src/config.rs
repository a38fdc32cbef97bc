use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use marshal_api::{ByteOrder, CodecConfig, InternPolicy};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "marshal", about = "Encode, decode and inspect marshal buffers")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// JSON → marshal bytes
    Encode(EncodeArgs),
    /// Marshal bytes → JSON
    Decode(DecodeArgs),
    /// JSON array of rows → single-column envelope
    Column(ColumnArgs),
    /// Annotated tag-by-tag dump of a marshal buffer
    Inspect(InspectArgs),
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Path to TOML config file
    #[arg(long, global = true, default_value = "marshal.toml", env = "MARSHAL_CONFIG")]
    pub config: String,

    /// Byte order for multi-byte fields: native | reversed
    #[arg(long, global = true)]
    pub byte_order: Option<ByteOrder>,

    /// Encoder interning: never | map_keys | all_strings
    #[arg(long, global = true)]
    pub intern: Option<InternPolicy>,

    /// Maximum container nesting
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Input file (stdin when omitted)
    #[arg(long, short)]
    pub input: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write hex text instead of raw bytes
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Clone, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Input is hex text
    #[arg(long)]
    pub hex_input: bool,

    /// Reject trailing bytes after the value
    #[arg(long)]
    pub strict: bool,

    /// Validate the input as a single-column envelope
    #[arg(long)]
    pub envelope: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ColumnArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Column name (kept as raw bytes)
    #[arg(long)]
    pub name: String,

    /// Write hex text instead of raw bytes
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Input is hex text
    #[arg(long)]
    pub hex_input: bool,
}

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub codec: CodecSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct CodecSection {
    pub byte_order: Option<ByteOrder>,
    pub intern: Option<InternPolicy>,
    pub max_depth: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|e| CliError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }

    pub fn parse(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Codec settings after merging: defaults < config file < CLI flags.
///
/// A missing config file is fine; an unreadable or invalid one is not.
pub fn effective_codec(args: &GlobalArgs) -> Result<CodecConfig, CliError> {
    let file = if std::path::Path::new(&args.config).exists() {
        FileConfig::load(&args.config)?
    } else {
        FileConfig::default()
    };
    let merged = merge(&file.codec, args);
    tracing::debug!(
        config = %args.config,
        byte_order = %merged.byte_order,
        intern = %merged.intern,
        max_depth = merged.max_depth,
        "effective codec config"
    );
    Ok(merged)
}

fn merge(file: &CodecSection, args: &GlobalArgs) -> CodecConfig {
    let defaults = CodecConfig::default();
    CodecConfig {
        byte_order: args.byte_order.or(file.byte_order).unwrap_or(defaults.byte_order),
        intern: args.intern.or(file.intern).unwrap_or(defaults.intern),
        max_depth: args.max_depth.or(file.max_depth).unwrap_or(defaults.max_depth),
    }
}
