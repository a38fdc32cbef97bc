//! Encoder, decoder and column envelope for the marshal wire format.
//!
//! All entry points take a `CodecConfig`; byte order and interning are
//! per-call settings, never process state.

pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod envelope;
pub mod intern;
pub mod serializer;

pub use decoder::{decode, decode_exact, decode_prefix, decode_with, Decoder};
pub use encoder::{encode, encode_with, Encoder};
pub use envelope::{marshal_column, marshal_column_with, parse_column, ColumnEnvelope, DecodedColumn};
pub use serializer::MarshalSerializer;

pub use marshal_api::{ByteOrder, CodecConfig, InternPolicy, MarshalError, Tag, Value};
