//! Host model abstraction.
//!
//! The relation core never owns parent models. It reads key fields through
//! [`RemoteModel::get_field`] and hands loaded results back through
//! [`RemoteModel::set_relation`]. [`Model`] is a ready-made implementation
//! for hosts that keep attributes in a [`Record`].

use crate::value::{Record, Value};
use std::collections::HashMap;

/// Value attached to a parent for one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    /// Has-one result; `None` when nothing matched
    One(Option<Record>),
    /// Has-many result; empty when nothing matched
    Many(Vec<Record>),
}

impl RelationValue {
    /// The single related record, for has-one relations
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            RelationValue::One(record) => record.as_ref(),
            RelationValue::Many(_) => None,
        }
    }

    /// The related records, for has-many relations
    pub fn as_many(&self) -> &[Record] {
        match self {
            RelationValue::Many(records) => records,
            RelationValue::One(_) => &[],
        }
    }

    /// Consume into the has-one shape; a `Many` yields its first record
    pub fn into_one(self) -> Option<Record> {
        match self {
            RelationValue::One(record) => record,
            RelationValue::Many(records) => records.into_iter().next(),
        }
    }

    /// Consume into the has-many shape
    pub fn into_many(self) -> Vec<Record> {
        match self {
            RelationValue::Many(records) => records,
            RelationValue::One(record) => record.into_iter().collect(),
        }
    }

    /// `true` for `One(None)` and `Many([])`
    pub fn is_empty(&self) -> bool {
        match self {
            RelationValue::One(record) => record.is_none(),
            RelationValue::Many(records) => records.is_empty(),
        }
    }
}

/// Trait implemented by parent models that carry remote relations
pub trait RemoteModel {
    /// Read a field; `None` when the field does not exist
    fn get_field(&self, field: &str) -> Option<&Value>;

    /// Attach a loaded relation value under `relation`
    fn set_relation(&mut self, relation: &str, value: RelationValue);
}

/// Record-backed model with a slot per loaded relation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub attributes: Record,
    relations: HashMap<String, RelationValue>,
}

impl Model {
    pub fn new(attributes: Record) -> Self {
        Self {
            attributes,
            relations: HashMap::new(),
        }
    }

    /// A previously attached relation value, if the relation was loaded
    pub fn relation(&self, name: &str) -> Option<&RelationValue> {
        self.relations.get(name)
    }

    /// `true` once the relation has been loaded (even when it is empty)
    pub fn relation_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }
}

impl From<Record> for Model {
    fn from(attributes: Record) -> Self {
        Model::new(attributes)
    }
}

impl RemoteModel for Model {
    fn get_field(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    fn set_relation(&mut self, relation: &str, value: RelationValue) {
        self.relations.insert(relation.to_string(), value);
    }
}
