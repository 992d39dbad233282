//! Column values
//!
//! `Value` is the dynamically typed cell exchanged with the store: it is what
//! statement parameters are bound as and what result rows carry back.
//!
//! ## Equality
//!
//! Different variants are never equal (`Int(1) != Float(1.0)`), and `List`
//! is not `Set` even with the same elements. Float equality is IEEE-754.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single column value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null / unset column
    Null,
    /// `boolean`
    Bool(bool),
    /// `int`, `bigint`, `counter`
    Int(i64),
    /// `float`, `double`
    Float(f64),
    /// `text`, `varchar`, `ascii`
    Text(String),
    /// `blob`
    Blob(Vec<u8>),
    /// `uuid`, `timeuuid`
    Uuid(Uuid),
    /// `timestamp`
    Timestamp(DateTime<Utc>),
    /// `list<...>`
    List(Vec<Value>),
    /// `set<...>`
    Set(Vec<Value>),
    /// `map<text, ...>`
    Map(BTreeMap<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// CQL-ish type name, used in decode error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "bigint",
            Value::Float(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert into a typed Rust value
    ///
    /// Returns the original value back on mismatch so the caller can report it.
    pub fn decode<T: FromValue>(self) -> std::result::Result<T, Value> {
        T::from_value(self)
    }
}

/// Conversion from a column value into a Rust type
pub trait FromValue: Sized {
    /// Convert, handing the value back if its variant does not fit
    fn from_value(value: Value) -> std::result::Result<Self, Value>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Text(s) => Ok(s),
            // timeuuid / uuid columns are commonly mapped to string identifiers
            Value::Uuid(u) => Ok(u.to_string()),
            other => Err(other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Int(i) => i32::try_from(i).map_err(|_| Value::Int(i)),
            other => Err(other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Uuid(u) => Ok(u),
            Value::Text(s) => Uuid::parse_str(&s).map_err(|_| Value::Text(s)),
            other => Err(other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            // Unset collections come back as null.
            Value::Null => Ok(Vec::new()),
            Value::List(items) | Value::Set(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(T::from_value(item)?);
                }
                Ok(out)
            }
            other => Err(other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
