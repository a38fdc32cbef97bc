use serde::{Deserialize, Serialize};

use crate::byte_order::ByteOrder;
use crate::error::MarshalError;

/// Which strings the encoder interns.
///
/// The decoder always understands interned definitions and references;
/// this only controls what the encoder emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternPolicy {
    /// Plain `u` payloads only.
    #[default]
    Never,
    /// Intern UnicodeString map keys; repeated keys become references.
    MapKeys,
    /// Intern every UnicodeString.
    AllStrings,
}

impl std::fmt::Display for InternPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternPolicy::Never => f.write_str("never"),
            InternPolicy::MapKeys => f.write_str("map_keys"),
            InternPolicy::AllStrings => f.write_str("all_strings"),
        }
    }
}

impl std::str::FromStr for InternPolicy {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(InternPolicy::Never),
            "map_keys" | "map-keys" => Ok(InternPolicy::MapKeys),
            "all_strings" | "all-strings" | "all" => Ok(InternPolicy::AllStrings),
            other => Err(MarshalError::UnsupportedValue(format!(
                "intern policy must be \"never\", \"map_keys\" or \"all_strings\", got {other:?}"
            ))),
        }
    }
}

/// Codec configuration, passed to every encoder and decoder at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub byte_order: ByteOrder,
    pub intern: InternPolicy,
    /// Maximum container nesting accepted by the decoder and produced by the encoder.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 512;

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Native,
            intern: InternPolicy::Never,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_intern(mut self, intern: InternPolicy) -> Self {
        self.intern = intern;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: CodecConfig = serde_json::from_str(r#"{"intern": "map_keys"}"#).unwrap();
        assert_eq!(cfg.byte_order, ByteOrder::Native);
        assert_eq!(cfg.intern, InternPolicy::MapKeys);
        assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn byte_order_accepts_aliases() {
        let cfg: CodecConfig = serde_json::from_str(r#"{"byte_order": "swapped"}"#).unwrap();
        assert_eq!(cfg.byte_order, ByteOrder::Reversed);
    }

    #[test]
    fn policy_parses_from_flag_text() {
        assert_eq!("all".parse::<InternPolicy>().unwrap(), InternPolicy::AllStrings);
        assert_eq!("map-keys".parse::<InternPolicy>().unwrap(), InternPolicy::MapKeys);
        assert!("sometimes".parse::<InternPolicy>().is_err());
    }
}
