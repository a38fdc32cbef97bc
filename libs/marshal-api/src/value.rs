use std::borrow::Cow;

use crate::tag::Tag;

/// Canonical value representation, shared by encoder and decoder.
///
/// Strategy by type:
/// - Scalars (Int32, Float64, Bool): eager, fixed width on the wire
/// - ByteString, UnicodeString: `Cow` (borrowed from the input buffer when decoding)
/// - Array, Map: recursive, children owned outright
///
/// Interned strings never appear here: the decoder resolves both the
/// definition and later references to plain `UnicodeString` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int32(i32),
    Float64(f64),

    /// Raw bytes, not necessarily UTF-8 (e.g. column names from schema metadata).
    ByteString(Cow<'a, [u8]>),
    /// Text; UTF-8 on the wire.
    UnicodeString(Cow<'a, str>),

    Array(Vec<Value<'a>>),
    /// Insertion-ordered pairs. Keys are usually strings, but any value is allowed.
    Map(Vec<(Value<'a>, Value<'a>)>),
}

impl<'a> Value<'a> {
    /// Classify an integer: Int32 when it fits, Float64 otherwise.
    pub fn from_i64(n: i64) -> Value<'static> {
        match i32::try_from(n) {
            Ok(n) => Value::Int32(n),
            Err(_) => Value::Float64(n as f64),
        }
    }

    pub fn from_u64(n: u64) -> Value<'static> {
        match i32::try_from(n) {
            Ok(n) => Value::Int32(n),
            Err(_) => Value::Float64(n as f64),
        }
    }

    /// Classify a number by value: integral and within the Int32 range
    /// becomes Int32, anything else stays Float64.
    pub fn from_f64(n: f64) -> Value<'static> {
        if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
            Value::Int32(n as i32)
        } else {
            Value::Float64(n)
        }
    }

    pub fn bytes(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Value::ByteString(bytes.into())
    }

    pub fn string(s: impl Into<Cow<'a, str>>) -> Self {
        Value::UnicodeString(s.into())
    }

    /// Tag the encoder writes for this value (without interning).
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(true) => Tag::True,
            Value::Bool(false) => Tag::False,
            Value::Int32(_) => Tag::Int32,
            Value::Float64(_) => Tag::Float64,
            Value::ByteString(_) => Tag::ByteString,
            Value::UnicodeString(_) => Tag::Unicode,
            Value::Array(_) => Tag::List,
            Value::Map(_) => Tag::Dict,
        }
    }

    /// Detach the tree from any borrowed input buffer.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(b),
            Value::Int32(n) => Value::Int32(n),
            Value::Float64(n) => Value::Float64(n),
            Value::ByteString(b) => Value::ByteString(Cow::Owned(b.into_owned())),
            Value::UnicodeString(s) => Value::UnicodeString(Cow::Owned(s.into_owned())),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of either numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(n) => Some(*n as f64),
            Value::Float64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::UnicodeString(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of either string variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(b) => Some(b),
            Value::UnicodeString(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value<'a>, Value<'a>)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// First map entry whose string key (either string variant) equals `key`.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_bytes() == Some(key.as_bytes()))
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value<'static> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value<'static> {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value<'static> {
    fn from(n: i64) -> Self {
        Value::from_i64(n)
    }
}

impl From<f64> for Value<'static> {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::UnicodeString(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'static> {
    fn from(s: String) -> Self {
        Value::UnicodeString(Cow::Owned(s))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(b: &'a [u8]) -> Self {
        Value::ByteString(Cow::Borrowed(b))
    }
}

impl From<Vec<u8>> for Value<'static> {
    fn from(b: Vec<u8>) -> Self {
        Value::ByteString(Cow::Owned(b))
    }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(items: Vec<Value<'a>>) -> Self {
        Value::Array(items)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<'a, V: Into<Value<'a>>> FromIterator<V> for Value<'a> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_classified_by_magnitude() {
        assert_eq!(Value::from_i64(i32::MAX as i64), Value::Int32(i32::MAX));
        assert_eq!(Value::from_i64(i32::MIN as i64), Value::Int32(i32::MIN));
        assert_eq!(Value::from_i64(1 << 31), Value::Float64(2147483648.0));
        assert_eq!(Value::from_i64(-(1 << 31) - 1), Value::Float64(-2147483649.0));
        assert_eq!(Value::from_u64(u64::MAX), Value::Float64(u64::MAX as f64));
    }

    #[test]
    fn floats_are_classified_by_value() {
        assert_eq!(Value::from_f64(3.0), Value::Int32(3));
        assert_eq!(Value::from_f64(1.5), Value::Float64(1.5));
        assert_eq!(Value::from_f64(2147483648.0), Value::Float64(2147483648.0));
        assert!(matches!(Value::from_f64(f64::NAN), Value::Float64(n) if n.is_nan()));
        assert_eq!(Value::from_f64(f64::INFINITY), Value::Float64(f64::INFINITY));
    }

    #[test]
    fn map_lookup_matches_either_string_variant() {
        let map = Value::Map(vec![
            (Value::bytes(&b"f"[..]), Value::Int32(1)),
            (Value::from("g"), Value::Int32(2)),
        ]);
        assert_eq!(map.get("f"), Some(&Value::Int32(1)));
        assert_eq!(map.get("g"), Some(&Value::Int32(2)));
        assert_eq!(map.get("h"), None);
        assert_eq!(Value::Null.get("f"), None);
    }

    #[test]
    fn into_owned_preserves_structure() {
        let buf = String::from("borrowed");
        let value = Value::Array(vec![Value::from(buf.as_str()), Value::Null]);
        let owned: Value<'static> = value.into_owned();
        drop(buf);
        assert_eq!(owned, Value::Array(vec![Value::from("borrowed".to_string()), Value::Null]));
    }

    #[test]
    fn collects_into_array() {
        let value: Value = [1, 2, 3].into_iter().collect();
        assert_eq!(value.tag(), Tag::List);
        assert_eq!(value.as_array().map(<[_]>::len), Some(3));
    }
}
