//! Key collection over a batch of parent models.

use crate::model::RemoteModel;
use crate::relation::identity::Identity;
use crate::relation::key::{parent_key, KeyValue};
use std::collections::HashSet;

/// Collect the distinct, non-null key values of `parents`
///
/// Keys are deduplicated by raw value (case-insensitive relations still send
/// `"ABC"` and `"abc"` separately) and returned in first-seen order. Parents
/// whose key is null, or whose composite key has any null field, contribute
/// nothing. An empty result means there is nothing to fetch.
pub fn collect_keys<M: RemoteModel>(parents: &[M], fields: &Identity) -> Vec<KeyValue> {
    let mut seen: HashSet<KeyValue> = HashSet::with_capacity(parents.len());
    let mut keys = Vec::new();

    for parent in parents {
        let Some(key) = parent_key(parent, fields) else {
            continue;
        };
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    keys
}
