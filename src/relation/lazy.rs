//! Lazy loading for remote relations.
//!
//! A [`RemoteLazyLoader`] resolves one relation for one parent on demand.
//! Nothing is fetched until [`RemoteLazyLoader::load`] is called, and nothing
//! is fetched at all when the parent's own key is null.
//!
//! # Example
//!
//! ```
//! use lifeguard_remote::{FetchError, Identity, KeyValue, Model, Record, RemoteLazyLoader, RemoteRelationDef};
//!
//! let posts = RemoteRelationDef::has_many("posts", "user_id")
//!     .with_fetcher(|_: &[KeyValue], _: &Identity| -> Result<Vec<Record>, FetchError> {
//!         Ok(vec![Record::new().with("user_id", 1).with("title", "Hello")])
//!     })
//!     .build()?;
//!
//! let user = Model::new(Record::new().with("id", 1));
//! let loaded = RemoteLazyLoader::new(&user, &posts).load()?;
//! assert_eq!(loaded.as_many().len(), 1);
//! # Ok::<(), lifeguard_remote::RelationError>(())
//! ```

use crate::model::{RelationValue, RemoteModel};
use crate::relation::def::{RelationType, RemoteRelationDef};
use crate::relation::eager::fetch_keys;
use crate::relation::error::RelationError;
use crate::relation::index::{index_many, index_one};
use crate::relation::key::parent_key;
use crate::value::Record;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// A lazy loader for one remote relation of one parent
pub struct RemoteLazyLoader<'a, M: ?Sized> {
    /// The parent entity to load the relation for
    entity: &'a M,
    /// The relation to resolve
    def: &'a RemoteRelationDef,
}

impl<'a, M> RemoteLazyLoader<'a, M>
where
    M: RemoteModel + ?Sized,
{
    pub fn new(entity: &'a M, def: &'a RemoteRelationDef) -> Self {
        Self { entity, def }
    }

    /// Resolve the relation
    ///
    /// Returns the relation's default without calling the fetcher when the
    /// parent's key is null or incomplete.
    pub fn load(&self) -> Result<RelationValue, RelationError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::lazy_resolve_span(self.def.name()).entered();

        let Some(key) = parent_key(self.entity, self.def.local_key()) else {
            log::debug!(
                "Relation {}: parent key is null, skipping fetch",
                self.def.name()
            );
            return Ok(self.def.rel_type().default_value());
        };

        let ci = self.def.is_case_insensitive();
        let lookup = key.normalize(ci);
        let records = fetch_keys(self.def, vec![key])?;

        let value = match self.def.rel_type() {
            RelationType::HasOne => {
                let mut index = index_one(records, self.def.foreign_key(), ci);
                RelationValue::One(index.remove(&lookup))
            }
            RelationType::HasMany => {
                let mut index = index_many(records, self.def.foreign_key(), ci);
                RelationValue::Many(index.remove(&lookup).unwrap_or_default())
            }
        };
        Ok(value)
    }
}

/// Resolve a has-one relation for a single parent
///
/// The lazy counterpart of [`load_remote`](crate::relation::eager::load_remote).
pub fn resolve_one<M: RemoteModel + ?Sized>(
    parent: &M,
    def: &RemoteRelationDef,
) -> Result<Option<Record>, RelationError> {
    RemoteLazyLoader::new(parent, def).load().map(RelationValue::into_one)
}

/// Resolve a has-many relation for a single parent
pub fn resolve_many<M: RemoteModel + ?Sized>(
    parent: &M,
    def: &RemoteRelationDef,
) -> Result<Vec<Record>, RelationError> {
    RemoteLazyLoader::new(parent, def).load().map(RelationValue::into_many)
}
