use std::fmt;

/// Coarse category of a codec error.
///
/// Hosts use it to decide what to surface: a truncated buffer usually means
/// a transport problem, a format error means corrupted or foreign data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input ended before a field was complete.
    Truncated,
    /// Input is structurally invalid.
    Format,
    /// A value cannot be represented on the wire.
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Truncated => f.write_str("truncated"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Error returned by every encode and decode operation.
///
/// The first error aborts the whole traversal; no partial value is ever
/// returned alongside it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    #[error("unexpected end of input: need {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("unknown tag byte 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("invalid UTF-8 in string at offset {offset}: {source}")]
    InvalidEncoding {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("interned string reference {index} out of range (table has {len} entries)")]
    BadReference { index: u32, len: usize },

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("nesting deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },

    #[error("length {len} does not fit a 4-byte prefix")]
    LengthOverflow { len: usize },

    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

impl MarshalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarshalError::UnexpectedEof { .. } => ErrorKind::Truncated,
            MarshalError::UnsupportedValue(_) | MarshalError::LengthOverflow { .. } => {
                ErrorKind::Unsupported
            }
            MarshalError::UnknownTag { .. }
            | MarshalError::InvalidEncoding { .. }
            | MarshalError::BadReference { .. }
            | MarshalError::DepthLimitExceeded { .. }
            | MarshalError::TrailingBytes { .. }
            | MarshalError::MalformedEnvelope(_) => ErrorKind::Format,
        }
    }

    /// Add context to the error.
    ///
    /// Only message-carrying variants change; structured variants keep
    /// their fields so callers can still match on them.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            MarshalError::UnsupportedValue(msg) => {
                MarshalError::UnsupportedValue(format!("{ctx}: {msg}"))
            }
            MarshalError::MalformedEnvelope(msg) => {
                MarshalError::MalformedEnvelope(format!("{ctx}: {msg}"))
            }
            other => other,
        }
    }
}
