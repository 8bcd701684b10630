//! Eager loading for remote relations.
//!
//! This module loads an API-backed relation for a whole batch of parents with
//! a single fetch, the remote counterpart of a `selectinload` strategy:
//!
//! 1. Collect the distinct, non-null local keys of all parents
//! 2. Call the relation's fetcher once with those keys
//! 3. Index the returned records by their foreign key
//! 4. Attach the match (or the relation's default) to every parent
//!
//! # Example
//!
//! ```
//! use lifeguard_remote::{load_remote, FetchError, Identity, KeyValue, Model, Record, RemoteRelationDef};
//!
//! let profile = RemoteRelationDef::has_one("profile", "user_id")
//!     .with_fetcher(|keys: &[KeyValue], _fk: &Identity| -> Result<Vec<Record>, FetchError> {
//!         // A real fetcher would call the API with `keys`.
//!         Ok(vec![Record::new().with("user_id", 1).with("name", "John")])
//!     })
//!     .build()?;
//!
//! let mut users = vec![
//!     Model::new(Record::new().with("id", 1)),
//!     Model::new(Record::new().with("id", 2)),
//! ];
//! load_remote(&mut users, &profile)?;
//!
//! assert!(users[0].relation("profile").unwrap().as_one().is_some());
//! assert!(users[1].relation("profile").unwrap().is_empty());
//! # Ok::<(), lifeguard_remote::RelationError>(())
//! ```

use crate::model::RemoteModel;
use crate::relation::collector::collect_keys;
use crate::relation::def::{RelationType, RemoteRelationDef};
use crate::relation::error::RelationError;
use crate::relation::index::{index_many, index_one};
use crate::relation::key::KeyValue;
use crate::relation::matcher::{match_many, match_one};
use crate::value::Record;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use std::time::Instant;

/// Call the relation's fetcher once for `keys`
///
/// `keys` must be non-empty; callers short-circuit the empty case before
/// asking for the fetcher so that a relation without one never fails when
/// there is nothing to fetch.
pub(crate) fn fetch_keys(
    def: &RemoteRelationDef,
    keys: Vec<KeyValue>,
) -> Result<Vec<Record>, RelationError> {
    let fetcher = def.fetcher()?;

    let keys: Vec<KeyValue> = keys
        .into_iter()
        .map(|key| key.relabel(def.foreign_key()))
        .collect();

    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::remote_fetch_span(def.name(), keys.len()).entered();

    #[cfg(feature = "metrics")]
    let start = Instant::now();

    let result = fetcher.fetch(&keys, def.foreign_key());

    #[cfg(feature = "metrics")]
    METRICS.record_fetch(def.name(), keys.len(), start.elapsed());

    match result {
        Ok(records) => {
            log::debug!(
                "Relation {}: fetched {} record(s) for {} key(s)",
                def.name(),
                records.len(),
                keys.len()
            );
            Ok(records)
        }
        Err(source) => {
            #[cfg(feature = "metrics")]
            METRICS.record_fetch_error(def.name());
            log::warn!("Relation {}: fetch failed: {}", def.name(), source);
            Err(RelationError::Fetch {
                relation: def.name().to_string(),
                source,
            })
        }
    }
}

/// Load a remote relation for every parent with a single fetch
///
/// Every parent receives exactly one `set_relation` call on success. If no
/// parent has a usable key, the fetcher is not called (and need not be
/// attached) and every parent gets the default. If the fetch fails, no
/// parent is touched and the error is returned.
pub fn load_remote<M: RemoteModel>(
    parents: &mut [M],
    def: &RemoteRelationDef,
) -> Result<(), RelationError> {
    if parents.is_empty() {
        return Ok(());
    }

    let keys = collect_keys(parents, def.local_key());
    if keys.is_empty() {
        log::debug!(
            "Relation {}: no usable keys among {} parent(s), skipping fetch",
            def.name(),
            parents.len()
        );
        for parent in parents.iter_mut() {
            parent.set_relation(def.name(), def.rel_type().default_value());
        }
        return Ok(());
    }

    let records = fetch_keys(def, keys)?;
    let ci = def.is_case_insensitive();

    match def.rel_type() {
        RelationType::HasOne => {
            let index = index_one(records, def.foreign_key(), ci);
            match_one(parents, def.name(), &index, def.local_key(), ci);
        }
        RelationType::HasMany => {
            let index = index_many(records, def.foreign_key(), ci);
            match_many(parents, def.name(), &index, def.local_key(), ci);
        }
    }

    Ok(())
}

/// Load several remote relations over the same batch
///
/// Relations are loaded in order, one fetch each. The first failure stops
/// the pass; relations loaded before it stay attached.
pub fn load_remote_all<M: RemoteModel>(
    parents: &mut [M],
    defs: &[RemoteRelationDef],
) -> Result<(), RelationError> {
    for def in defs {
        load_remote(parents, def)?;
    }
    Ok(())
}
