//! Bridge between host JSON values and the marshal value model.
//!
//! JSON has no byte-string type, so raw bytes travel as the escape object
//! `{"$bytes": "<base64>"}` in both directions.

use std::borrow::Cow;

use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::MarshalError;
use crate::value::Value;

pub const BYTES_KEY: &str = "$bytes";

impl Value<'static> {
    /// Classify a host JSON value into exactly one marshal variant.
    ///
    /// - numbers follow the value-driven Int32/Float64 rule
    /// - object keys are emitted in ascending byte order
    /// - `{"$bytes": "<base64>"}` becomes a ByteString; any other use of the
    ///   `$bytes` key is rejected with `UnsupportedValue`
    pub fn from_json(json: &serde_json::Value) -> Result<Self, MarshalError> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => classify_number(n),
            serde_json::Value::String(s) => Ok(Value::UnicodeString(Cow::Owned(s.clone()))),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            serde_json::Value::Object(map) => {
                if map.contains_key(BYTES_KEY) {
                    return bytes_from_escape(map);
                }
                let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = Value::from_json(value).map_err(|e| e.with_context(key))?;
                    pairs.push((Value::UnicodeString(Cow::Owned(key.clone())), value));
                }
                Ok(Value::Map(pairs))
            }
        }
    }
}

fn classify_number(n: &serde_json::Number) -> Result<Value<'static>, MarshalError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from_i64(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from_u64(u));
    }
    n.as_f64()
        .map(Value::from_f64)
        .ok_or_else(|| MarshalError::UnsupportedValue(format!("number {n} has no f64 form")))
}

fn bytes_from_escape(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<Value<'static>, MarshalError> {
    if map.len() != 1 {
        return Err(MarshalError::UnsupportedValue(format!(
            "{BYTES_KEY} object must have exactly one key, got {}",
            map.len()
        )));
    }
    let encoded = map
        .get(BYTES_KEY)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            MarshalError::UnsupportedValue(format!("{BYTES_KEY} must be a base64 string"))
        })?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| MarshalError::UnsupportedValue(format!("{BYTES_KEY}: {e}")))?;
    Ok(Value::ByteString(Cow::Owned(bytes)))
}

impl Value<'_> {
    /// Render as host JSON. Lossy only where JSON is: non-finite floats
    /// become null and non-string map keys use their JSON text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int32(n) => serde_json::Value::from(*n),
            Value::Float64(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::ByteString(b) => bytes_escape(b),
            Value::UnicodeString(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) => items.iter().map(Value::to_json).collect(),
            Value::Map(pairs) => {
                let mut map = serde_json::Map::with_capacity(pairs.len());
                for (k, v) in pairs {
                    map.insert(key_text(k).into_owned(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

fn bytes_escape(bytes: &[u8]) -> serde_json::Value {
    let mut map = serde_json::Map::with_capacity(1);
    map.insert(
        BYTES_KEY.to_string(),
        serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(bytes)),
    );
    serde_json::Value::Object(map)
}

/// JSON object key for a map key value.
///
/// Byte-string keys (column names) are shown as text, replacing invalid
/// UTF-8 sequences.
fn key_text<'v>(key: &'v Value<'_>) -> Cow<'v, str> {
    match key {
        Value::UnicodeString(s) => Cow::Borrowed(s.as_ref()),
        Value::ByteString(b) => String::from_utf8_lossy(b),
        other => Cow::Owned(other.to_json().to_string()),
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int32(n) => serializer.serialize_i32(*n),
            Value::Float64(n) => serializer.serialize_f64(*n),
            Value::ByteString(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    BYTES_KEY,
                    &base64::engine::general_purpose::STANDARD.encode(b),
                )?;
                map.end()
            }
            Value::UnicodeString(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(key_text(k).as_ref(), v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_by_bytes() {
        let value = Value::from_json(&json!({"is": 0, "This": 4, "a": "x"})).unwrap();
        let keys: Vec<&str> = value
            .as_map()
            .unwrap()
            .iter()
            .filter_map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["This", "a", "is"]);
    }

    #[test]
    fn numbers_use_value_driven_classification() {
        let value = Value::from_json(&json!([1, 2147483647, 2147483648i64, 1.5, 4.0])).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Int32(1),
                Value::Int32(i32::MAX),
                Value::Float64(2147483648.0),
                Value::Float64(1.5),
                Value::Int32(4),
            ])
        );
    }

    #[test]
    fn bytes_escape_round_trips() {
        let json = json!({"$bytes": "dGVzdA=="});
        let value = Value::from_json(&json).unwrap();
        assert_eq!(value, Value::ByteString(Cow::Owned(b"test".to_vec())));
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn malformed_bytes_escape_is_unsupported() {
        for bad in [json!({"$bytes": 5}), json!({"$bytes": "!!"}), json!({"$bytes": "", "x": 1})] {
            let err = Value::from_json(&bad).unwrap_err();
            assert!(matches!(err, MarshalError::UnsupportedValue(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn serialize_matches_to_json() {
        let value = Value::Map(vec![
            (Value::bytes(&b"f"[..]), Value::Array(vec![Value::Int32(1000000), Value::Null])),
            (Value::Int32(7), Value::Float64(f64::NAN)),
        ]);
        let via_serde = serde_json::to_value(&value).unwrap();
        assert_eq!(via_serde, value.to_json());
        assert_eq!(via_serde, json!({"f": [1000000, null], "7": null}));
    }
}
