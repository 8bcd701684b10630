//! Matching indexed results back onto parent models.
//!
//! Each parent's local key is normalized and looked up in the index built
//! from the fetch response. Every parent receives exactly one
//! [`RemoteModel::set_relation`] call per pass: the match, or the relation
//! kind's default when the parent has no key or nothing matched.

use crate::model::{RelationValue, RemoteModel};
use crate::relation::identity::Identity;
use crate::relation::index::{ManyIndex, OneIndex};
use crate::relation::key::parent_key;

/// Attach has-one results; unmatched parents get `One(None)`
pub fn match_one<M: RemoteModel>(
    parents: &mut [M],
    relation: &str,
    index: &OneIndex,
    local_key: &Identity,
    case_insensitive: bool,
) {
    for parent in parents.iter_mut() {
        let found = parent_key(&*parent, local_key)
            .and_then(|key| index.get(&key.normalize(case_insensitive)))
            .cloned();
        parent.set_relation(relation, RelationValue::One(found));
    }
}

/// Attach has-many results; unmatched parents get an empty `Many`
pub fn match_many<M: RemoteModel>(
    parents: &mut [M],
    relation: &str,
    index: &ManyIndex,
    local_key: &Identity,
    case_insensitive: bool,
) {
    for parent in parents.iter_mut() {
        let found = parent_key(&*parent, local_key)
            .and_then(|key| index.get(&key.normalize(case_insensitive)))
            .cloned()
            .unwrap_or_default();
        parent.set_relation(relation, RelationValue::Many(found));
    }
}
