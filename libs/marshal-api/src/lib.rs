pub mod byte_order;
pub mod config;
pub mod error;
pub mod format;
pub mod json;
pub mod tag;
pub mod value;

pub use byte_order::ByteOrder;
pub use config::{CodecConfig, InternPolicy};
pub use error::{ErrorKind, MarshalError};
pub use format::ValueSerializer;
pub use tag::Tag;
pub use value::Value;
