//! Identity enum for representing single and composite key fields
//!
//! This module provides the `Identity` enum which can represent either a single field
//! or a composite key consisting of multiple fields. This is used by `RemoteRelationDef`
//! to describe both the local (parent) key and the foreign (fetched record) key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Represents a key made of one or more record fields
///
/// Field order is significant: composite keys are built, normalized and paired
/// with the other side of the relation in this order.
///
/// # Example
///
/// ```
/// use lifeguard_remote::Identity;
///
/// let single = Identity::from("user_id");
/// assert_eq!(single.arity(), 1);
///
/// let composite = Identity::from(["tenant_id", "user_id"]);
/// assert_eq!(composite.arity(), 2);
/// assert!(composite.is_composite());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Single field identifier
    Unary(String),
    /// Two field identifiers (composite key)
    Binary(String, String),
    /// Three field identifiers (composite key)
    Ternary(String, String, String),
    /// Four or more field identifiers (composite key)
    Many(Vec<String>),
}

impl Identity {
    /// Build an identity from an ordered list of field names, picking the
    /// narrowest variant.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        match fields.len() {
            1 => Self::Unary(fields.remove(0)),
            2 => {
                let b = fields.remove(1);
                let a = fields.remove(0);
                Self::Binary(a, b)
            }
            3 => {
                let c = fields.remove(2);
                let b = fields.remove(1);
                let a = fields.remove(0);
                Self::Ternary(a, b, c)
            }
            _ => Self::Many(fields),
        }
    }

    /// Get the arity (number of fields) for this identity
    pub fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_, _) => 2,
            Self::Ternary(_, _, _) => 3,
            Self::Many(vec) => vec.len(),
        }
    }

    /// `true` when keys built from this identity are composite mappings
    ///
    /// Decided by arity, not variant: a `Many` holding a single field builds
    /// the same scalar keys as the equivalent `Unary`.
    pub fn is_composite(&self) -> bool {
        self.arity() > 1
    }

    /// Iterate over field names in key order
    pub fn iter(&self) -> BorrowedIdentityIter<'_> {
        BorrowedIdentityIter {
            identity: self,
            index: 0,
        }
    }

    /// Check if this identity contains a specific field
    pub fn contains(&self, field: &str) -> bool {
        self.iter().any(|f| f == field)
    }

    fn get(&self, index: usize) -> Option<&str> {
        let field = match (self, index) {
            (Self::Unary(a), 0) | (Self::Binary(a, _), 0) | (Self::Ternary(a, _, _), 0) => a,
            (Self::Binary(_, b), 1) | (Self::Ternary(_, b, _), 1) => b,
            (Self::Ternary(_, _, c), 2) => c,
            (Self::Many(vec), i) => return vec.get(i).map(String::as_str),
            _ => return None,
        };
        Some(field.as_str())
    }
}

impl Default for Identity {
    /// Local keys default to `id`
    fn default() -> Self {
        Self::Unary("id".to_string())
    }
}

/// Iterator over field names in an `Identity`
pub struct BorrowedIdentityIter<'a> {
    identity: &'a Identity,
    index: usize,
}

impl<'a> Iterator for BorrowedIdentityIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.identity.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.identity.arity().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BorrowedIdentityIter<'_> {}

/// Conversion into an `Identity`
pub trait IntoIdentity {
    fn into_identity(self) -> Identity;
}

impl IntoIdentity for Identity {
    fn into_identity(self) -> Identity {
        self
    }
}

impl IntoIdentity for &str {
    fn into_identity(self) -> Identity {
        Identity::Unary(self.to_string())
    }
}

impl IntoIdentity for String {
    fn into_identity(self) -> Identity {
        Identity::Unary(self)
    }
}

impl<const N: usize> IntoIdentity for [&str; N] {
    fn into_identity(self) -> Identity {
        Identity::from_fields(self)
    }
}

impl IntoIdentity for Vec<String> {
    fn into_identity(self) -> Identity {
        Identity::from_fields(self)
    }
}

impl IntoIdentity for Vec<&str> {
    fn into_identity(self) -> Identity {
        Identity::from_fields(self)
    }
}

impl From<&str> for Identity {
    fn from(field: &str) -> Self {
        field.into_identity()
    }
}

impl From<String> for Identity {
    fn from(field: String) -> Self {
        field.into_identity()
    }
}

impl<const N: usize> From<[&str; N]> for Identity {
    fn from(fields: [&str; N]) -> Self {
        fields.into_identity()
    }
}

impl From<Vec<String>> for Identity {
    fn from(fields: Vec<String>) -> Self {
        fields.into_identity()
    }
}

impl From<Vec<&str>> for Identity {
    fn from(fields: Vec<&str>) -> Self {
        fields.into_identity()
    }
}

// Configuration accepts either `"user_id"` or `["tenant_id", "user_id"]`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IdentityRepr {
    Single(String),
    List(Vec<String>),
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Identity::Unary(field) => IdentityRepr::Single(field.clone()),
            other => IdentityRepr::List(other.iter().map(str::to_string).collect()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IdentityRepr::deserialize(deserializer)? {
            IdentityRepr::Single(field) => Ok(Identity::Unary(field)),
            IdentityRepr::List(fields) if fields.is_empty() => Err(serde::de::Error::custom(
                "key field list must name at least one field",
            )),
            IdentityRepr::List(fields) => Ok(Identity::from_fields(fields)),
        }
    }
}
