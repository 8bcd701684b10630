//! Result indexing for fetched records.
//!
//! Fetched records are keyed by their foreign key fields. Records missing a
//! foreign key field are dropped from the index without error.

use crate::relation::identity::Identity;
use crate::relation::key::{record_key, DictionaryKey};
use crate::value::Record;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Has-one index: the first fetched record for a key wins
pub type OneIndex = HashMap<DictionaryKey, Record>;

/// Has-many index: every fetched record for a key, in response order
pub type ManyIndex = HashMap<DictionaryKey, Vec<Record>>;

fn keyed(
    records: Vec<Record>,
    foreign_key: &Identity,
    case_insensitive: bool,
) -> impl Iterator<Item = (DictionaryKey, Record)> + '_ {
    records.into_iter().filter_map(move |record| {
        match record_key(&record, foreign_key) {
            Some(key) => Some((key.normalize(case_insensitive), record)),
            None => {
                log::debug!(
                    "Dropping fetched record without foreign key {:?}",
                    foreign_key
                );
                None
            }
        }
    })
}

/// Index fetched records for a has-one relation
///
/// When the response holds several records with the same dictionary key, the
/// first one is kept and later duplicates are ignored.
pub fn index_one(records: Vec<Record>, foreign_key: &Identity, case_insensitive: bool) -> OneIndex {
    let mut index = OneIndex::with_capacity(records.len());
    for (key, record) in keyed(records, foreign_key, case_insensitive) {
        if let Entry::Vacant(slot) = index.entry(key) {
            slot.insert(record);
        }
    }
    index
}

/// Index fetched records for a has-many relation
pub fn index_many(records: Vec<Record>, foreign_key: &Identity, case_insensitive: bool) -> ManyIndex {
    let mut index = ManyIndex::new();
    for (key, record) in keyed(records, foreign_key, case_insensitive) {
        index.entry(key).or_default().push(record);
    }
    index
}
