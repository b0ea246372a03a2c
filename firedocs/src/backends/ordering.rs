//! Realtime Database query ordering
//!
//! Children are ordered by key, by their own value, or by the value of a
//! nested child. Values sort by type first (null, false, true, numbers,
//! strings, objects), then within the type; equal values fall back to key
//! order. Keys that parse as 32-bit integers sort numerically before all other
//! keys, which sort lexicographically.

use super::path::DatabasePath;
use crate::error::{FiredocsError, Result};
use serde_json::{Map, Value};
use std::cmp::Ordering;

static NULL: Value = Value::Null;

/// How the children of a location are ordered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// `$key`
    Key,
    /// `$value`
    Value,
    /// A child path such as `age` or `address/city`
    Child(DatabasePath),
}

impl OrderBy {
    /// Parse an order-by argument
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "$key" => Ok(Self::Key),
            "$value" => Ok(Self::Value),
            "" => Err(FiredocsError::invalid_arguments("order_by may not be empty")),
            other if other.starts_with('$') => Err(FiredocsError::invalid_arguments(format!(
                "unsupported order_by '{other}'; use $key, $value or a child path"
            ))),
            other => {
                let path = DatabasePath::parse(other)?;
                if path.is_root() {
                    return Err(FiredocsError::invalid_arguments(
                        "order_by child path may not be empty",
                    ));
                }
                Ok(Self::Child(path))
            }
        }
    }

    /// The `orderBy` query parameter value, JSON-quoted as the REST API expects
    pub fn to_query_param(&self) -> String {
        let name = match self {
            Self::Key => "$key".to_string(),
            Self::Value => "$value".to_string(),
            Self::Child(path) => path.to_string(),
        };
        Value::String(name).to_string()
    }

    fn sort_value<'a>(&self, child: &'a Value) -> &'a Value {
        match self {
            Self::Key => &NULL,
            Self::Value => child,
            Self::Child(path) => path
                .segments()
                .iter()
                .try_fold(child, |node, segment| child_of(node, segment))
                .unwrap_or(&NULL),
        }
    }
}

fn child_of<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) | Value::Object(_) => 5,
    }
}

/// Compare two values the way the tree store orders them
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Compare two keys the way the tree store orders them
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<i32>(), b.parse::<i32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Order the children of `value` and keep the first `limit` of them
///
/// Objects and arrays come back as an object whose key order is the query
/// order. Any other value, including null, is returned unchanged.
pub fn order_children(value: Value, order_by: Option<&OrderBy>, limit: Option<usize>) -> Value {
    let mut children: Vec<(String, Value)> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => return other,
    };

    let order_by = order_by.cloned().unwrap_or(OrderBy::Key);
    children.sort_by(|(ka, va), (kb, vb)| {
        compare_values(order_by.sort_value(va), order_by.sort_value(vb))
            .then_with(|| compare_keys(ka, kb))
    });

    if let Some(limit) = limit {
        children.truncate(limit);
    }

    Value::Object(children.into_iter().collect::<Map<String, Value>>())
}
