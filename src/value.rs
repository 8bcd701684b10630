//! Scalar values and records exchanged with the host ORM and remote fetchers.
//!
//! A [`Record`] is an ordered field map used both for a parent model's
//! attributes and for a single row returned by a remote API. Values are a
//! small closed set of scalars; nested JSON is rejected on conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Scalar field value
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL/JSON null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the inner string, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// Floats compare by bit pattern so that `Value` can be used as a hash key
// during raw key deduplication.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Error converting JSON payloads into records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The JSON row was not an object
    NotAnObject(String),
    /// A field held an array or object
    NestedValue { field: String },
    /// A number could not be represented as `i64` or `f64`
    UnsupportedNumber { field: String, number: String },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::NotAnObject(kind) => {
                write!(f, "Expected a JSON object for a record, got {kind}")
            }
            ValueError::NestedValue { field } => {
                write!(f, "Field {field} holds a nested value; records only carry scalars")
            }
            ValueError::UnsupportedNumber { field, number } => {
                write!(f, "Field {field} holds an unsupported number: {number}")
            }
        }
    }
}

impl std::error::Error for ValueError {}

/// Ordered mapping from field name to scalar value
///
/// Field order is insertion order. Inserting an existing field replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Look up a field; `None` when the field is absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(field, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = ValueError;

    /// Convert one JSON object (an API row) into a record
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        let object = match json {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => return Err(ValueError::NotAnObject("null".to_string())),
            serde_json::Value::Bool(_) => return Err(ValueError::NotAnObject("bool".to_string())),
            serde_json::Value::Number(_) => {
                return Err(ValueError::NotAnObject("number".to_string()))
            }
            serde_json::Value::String(_) => {
                return Err(ValueError::NotAnObject("string".to_string()))
            }
            serde_json::Value::Array(_) => {
                return Err(ValueError::NotAnObject("array".to_string()))
            }
        };

        let mut record = Record::new();
        for (field, value) in object {
            let scalar = match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Value::Int(i)
                    } else if let Some(f) = n.as_f64() {
                        Value::Float(f)
                    } else {
                        return Err(ValueError::UnsupportedNumber {
                            field,
                            number: n.to_string(),
                        });
                    }
                }
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(ValueError::NestedValue { field });
                }
            };
            record.insert(field, scalar);
        }
        Ok(record)
    }
}
