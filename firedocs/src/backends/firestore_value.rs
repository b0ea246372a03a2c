//! Conversion between plain JSON and Firestore's typed value encoding

use super::service;
use crate::error::{BackendErrorKind, FiredocsError, Result};
use serde_json::{json, Map, Value};

/// Encode a JSON value as a Firestore `Value`
///
/// Integers beyond the signed 64-bit range are rejected rather than stored
/// as lossy doubles.
pub fn to_firestore(value: &Value) -> Result<Value> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else if n.is_u64() {
                return Err(FiredocsError::invalid_arguments(format!(
                    "integer {n} does not fit in a 64-bit signed Firestore integer"
                )));
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items.iter().map(to_firestore).collect::<Result<Vec<_>>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_fields(map)? } }),
    };
    Ok(encoded)
}

/// Encode a JSON object as a Firestore `fields` map
pub fn to_fields(map: &Map<String, Value>) -> Result<Map<String, Value>> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), to_firestore(value)?)))
        .collect()
}

fn malformed(message: String) -> FiredocsError {
    FiredocsError::backend(service::FIRESTORE, BackendErrorKind::Internal, message)
}

/// Decode a Firestore `Value` into plain JSON
///
/// Timestamps, references and bytes become strings; geo points become
/// `{"latitude", "longitude"}` objects.
pub fn from_firestore(value: &Value) -> Result<Value> {
    let Some(object) = value.as_object() else {
        return Err(malformed(format!("expected a typed value, got {value}")));
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Err(malformed("empty typed value".to_string()));
    };

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            inner.clone()
        }
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| malformed(format!("bad integerValue '{s}': {e}")))?,
            Value::Number(_) => inner.clone(),
            other => return Err(malformed(format!("bad integerValue {other}"))),
        },
        // NaN and the infinities arrive as strings and have no JSON number form
        "doubleValue" => inner.clone(),
        "geoPointValue" => json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": inner.get("longitude").cloned().unwrap_or(json!(0.0)),
        }),
        "arrayValue" => {
            let items = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(from_firestore)
                    .collect::<Result<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Value::Array(items)
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(fields)) => from_fields(fields)?,
                _ => Map::new(),
            };
            Value::Object(fields)
        }
        other => return Err(malformed(format!("unsupported value type '{other}'"))),
    };
    Ok(decoded)
}

/// Decode a Firestore `fields` map into a JSON object
pub fn from_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), from_firestore(value)?)))
        .collect()
}

/// Quote a top-level field name for use in an update mask
pub fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric());
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_nested_document() {
        let data = json!({
            "name": "Ana",
            "age": 31,
            "score": 4.5,
            "active": true,
            "tags": ["a", 1],
            "address": {"city": "Lisbon"},
            "nickname": null,
        });
        let fields = to_fields(data.as_object().unwrap()).unwrap();

        assert_eq!(fields["name"], json!({"stringValue": "Ana"}));
        assert_eq!(fields["age"], json!({"integerValue": "31"}));
        assert_eq!(fields["score"], json!({"doubleValue": 4.5}));
        assert_eq!(fields["active"], json!({"booleanValue": true}));
        assert_eq!(fields["nickname"], json!({"nullValue": null}));
        assert_eq!(
            fields["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}, {"integerValue": "1"}]}})
        );
        assert_eq!(
            fields["address"],
            json!({"mapValue": {"fields": {"city": {"stringValue": "Lisbon"}}}})
        );

        let decoded = from_fields(&fields).unwrap();
        assert_eq!(Value::Object(decoded), data);
    }

    #[test]
    fn test_decode_server_only_types() {
        let fields = json!({
            "created": {"timestampValue": "2024-01-02T03:04:05Z"},
            "owner": {"referenceValue": "projects/p/databases/(default)/documents/users/u1"},
            "where": {"geoPointValue": {"latitude": 38.7, "longitude": -9.1}},
            "empty_list": {"arrayValue": {}},
            "empty_map": {"mapValue": {}},
        });
        let decoded = from_fields(fields.as_object().unwrap()).unwrap();

        assert_eq!(decoded["created"], json!("2024-01-02T03:04:05Z"));
        assert_eq!(decoded["where"], json!({"latitude": 38.7, "longitude": -9.1}));
        assert_eq!(decoded["empty_list"], json!([]));
        assert_eq!(decoded["empty_map"], json!({}));
    }

    #[test]
    fn test_decode_rejects_unknown_types() {
        assert!(from_firestore(&json!({"mysteryValue": 1})).is_err());
        assert!(from_firestore(&json!({"integerValue": "twelve"})).is_err());
        assert!(from_firestore(&json!("bare")).is_err());
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("display_name"), "display_name");
        assert_eq!(field_path("first name"), "`first name`");
        assert_eq!(field_path("1st"), "`1st`");
        assert_eq!(field_path("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_encode_rejects_integers_beyond_int64() {
        let data = json!({"big": {"values": [u64::MAX]}});
        let error = to_fields(data.as_object().unwrap()).unwrap_err();
        assert!(matches!(error, FiredocsError::InvalidArguments(_)), "{error}");
        assert!(error.to_string().contains("18446744073709551615"), "{error}");

        let fields = to_fields(json!({"max": i64::MAX}).as_object().unwrap()).unwrap();
        assert_eq!(fields["max"], json!({"integerValue": i64::MAX.to_string()}));
    }
}
