//! Key values and dictionary key normalization.
//!
//! A [`KeyValue`] is what a relation sends to the remote fetcher: either one
//! scalar or a composite, ordered field → scalar mapping. A [`DictionaryKey`]
//! is the normalized string used to index fetched records and to look them up
//! again for each parent.
//!
//! # Normalization
//!
//! - Strings and numbers are stringified: strings as-is, integers in decimal,
//!   floats with no fractional part like the matching integer (`1.0` → `"1"`).
//!   In case-insensitive mode strings are lower-cased first. Integer `1` and
//!   string `"1"` therefore share a dictionary key, which is what lets an
//!   integer primary key match an API that returns ids as strings.
//! - Booleans render as `true` / `false` but keep their own key class, so
//!   `true` never matches the string `"true"`.
//! - Composites normalize each component the same way and encode them as a
//!   JSON array in the configured field order, e.g. `["2","100"]`; boolean
//!   components stay JSON booleans (`["2",true]`). Field names are not part of
//!   the key, so a parent key `(tenant_id, id)` pairs positionally with a
//!   foreign key `(tenant_id, user_id)`.

use crate::model::RemoteModel;
use crate::relation::identity::Identity;
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A key sent to the remote fetcher
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    /// Single-field key
    Single(Value),
    /// Composite key in configured field order; never holds a null
    Composite(Vec<(String, Value)>),
}

impl KeyValue {
    /// Look up one component by field name
    ///
    /// For a single key the field name is ignored.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            KeyValue::Single(value) => Some(value),
            KeyValue::Composite(parts) => parts
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value),
        }
    }

    /// Component values in key order
    pub fn values(&self) -> Vec<&Value> {
        match self {
            KeyValue::Single(value) => vec![value],
            KeyValue::Composite(parts) => parts.iter().map(|(_, value)| value).collect(),
        }
    }

    /// Rename composite components positionally to `fields`
    ///
    /// Parent keys are collected under the local field names; the fetcher
    /// receives them under the foreign field names so it can query the API
    /// directly. Single keys are returned unchanged.
    pub fn relabel(self, fields: &Identity) -> KeyValue {
        match self {
            KeyValue::Single(value) => KeyValue::Single(value),
            KeyValue::Composite(parts) => KeyValue::Composite(
                parts
                    .into_iter()
                    .zip(fields.iter())
                    .map(|((_, value), field)| (field.to_string(), value))
                    .collect(),
            ),
        }
    }

    /// Normalize into a [`DictionaryKey`]
    pub fn normalize(&self, case_insensitive: bool) -> DictionaryKey {
        normalize(self, case_insensitive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum KeyClass {
    Text,
    Bool,
    Composite,
}

/// Normalized key used for result indexing and lookup
///
/// Two keys are equal only when both their class (text, boolean, composite)
/// and their rendered text agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DictionaryKey {
    class: KeyClass,
    text: String,
}

impl DictionaryKey {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DictionaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn normalize_text(value: &Value, case_insensitive: bool) -> String {
    match value {
        Value::String(s) if case_insensitive => s.to_lowercase(),
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            format!("{}", *f as i64)
        }
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        // Null keys are filtered before normalization.
        Value::Null => String::new(),
    }
}

fn normalize_component(value: &Value, case_insensitive: bool) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        other => serde_json::Value::String(normalize_text(other, case_insensitive)),
    }
}

/// Build the dictionary key for a key value
///
/// # Example
///
/// ```
/// use lifeguard_remote::{normalize, KeyValue, Value};
///
/// let key = KeyValue::Single(Value::String("ABC".into()));
/// assert_eq!(normalize(&key, true).as_str(), "abc");
/// assert_eq!(normalize(&KeyValue::Single(Value::Int(123)), false).as_str(), "123");
/// ```
pub fn normalize(key: &KeyValue, case_insensitive: bool) -> DictionaryKey {
    match key {
        KeyValue::Single(value) => DictionaryKey {
            class: if matches!(value, Value::Bool(_)) {
                KeyClass::Bool
            } else {
                KeyClass::Text
            },
            text: normalize_text(value, case_insensitive),
        },
        KeyValue::Composite(parts) => {
            let components = parts
                .iter()
                .map(|(_, value)| normalize_component(value, case_insensitive))
                .collect();
            DictionaryKey {
                class: KeyClass::Composite,
                text: serde_json::Value::Array(components).to_string(),
            }
        }
    }
}

/// Build a parent's key value from its local key fields
///
/// Returns `None` when any field is null or absent.
pub fn parent_key<M: RemoteModel + ?Sized>(parent: &M, fields: &Identity) -> Option<KeyValue> {
    key_from(|field| parent.get_field(field), fields)
}

/// Build a fetched record's key value from its foreign key fields
///
/// Returns `None` when any field is missing from the record. A present field
/// holding null is treated the same way, since null never identifies a parent.
pub fn record_key(record: &Record, fields: &Identity) -> Option<KeyValue> {
    key_from(|field| record.get(field), fields)
}

fn key_from<'a, F>(get: F, fields: &Identity) -> Option<KeyValue>
where
    F: Fn(&str) -> Option<&'a Value>,
{
    let present = |field: &str| get(field).filter(|value| !value.is_null()).cloned();

    if fields.is_composite() {
        let parts = fields
            .iter()
            .map(|field| present(field).map(|value| (field.to_string(), value)))
            .collect::<Option<Vec<_>>>()?;
        Some(KeyValue::Composite(parts))
    } else {
        let field = fields.iter().next()?;
        present(field).map(KeyValue::Single)
    }
}
