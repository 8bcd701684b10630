//! Remote relation definitions.
//!
//! A [`RemoteRelationDef`] describes one API-backed relation: its kind, the
//! key fields on both sides, case sensitivity and the fetcher that talks to
//! the API.
//!
//! # Example
//!
//! ```
//! use lifeguard_remote::{FetchError, Identity, KeyValue, Record, RemoteRelationDef};
//!
//! let posts = RemoteRelationDef::has_many("posts", "user_id")
//!     .local_key("id")
//!     .with_fetcher(|keys: &[KeyValue], _fk: &Identity| -> Result<Vec<Record>, FetchError> {
//!         Ok(keys
//!             .iter()
//!             .map(|k| Record::new().with("user_id", k.values()[0].clone()))
//!             .collect())
//!     })
//!     .build()
//!     .unwrap();
//! assert_eq!(posts.name(), "posts");
//! ```

use crate::model::RelationValue;
use crate::relation::error::{FetchError, RelationError};
use crate::relation::identity::{Identity, IntoIdentity};
use crate::relation::key::KeyValue;
use crate::value::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Type of relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// At most one related record per parent
    #[default]
    HasOne,
    /// Zero or more related records per parent
    HasMany,
}

impl RelationType {
    /// Value attached when a parent has no key or nothing matched
    pub fn default_value(self) -> RelationValue {
        match self {
            RelationType::HasOne => RelationValue::One(None),
            RelationType::HasMany => RelationValue::Many(Vec::new()),
        }
    }
}

/// Caller-supplied function that loads related records from an API
///
/// `keys` is deduplicated and null-free. Composite keys are labeled with the
/// foreign key field names. The fetcher may return records in any order, for
/// any subset of the keys, with any extra payload fields.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, keys: &[KeyValue], foreign_key: &Identity) -> Result<Vec<Record>, FetchError>;
}

impl<F> RemoteFetcher for F
where
    F: Fn(&[KeyValue], &Identity) -> Result<Vec<Record>, FetchError> + Send + Sync,
{
    fn fetch(&self, keys: &[KeyValue], foreign_key: &Identity) -> Result<Vec<Record>, FetchError> {
        self(keys, foreign_key)
    }
}

/// Recognized relation options, as read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationOptions {
    #[serde(default)]
    pub kind: RelationType,
    pub foreign_key: Identity,
    #[serde(default)]
    pub local_key: Identity,
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Relation definition for an API-backed relation
#[derive(Clone)]
pub struct RemoteRelationDef {
    name: String,
    rel_type: RelationType,
    foreign_key: Identity,
    local_key: Identity,
    case_insensitive: bool,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl fmt::Debug for RemoteRelationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRelationDef")
            .field("name", &self.name)
            .field("rel_type", &self.rel_type)
            .field("foreign_key", &self.foreign_key)
            .field("local_key", &self.local_key)
            .field("case_insensitive", &self.case_insensitive)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl RemoteRelationDef {
    /// Start a definition; the local key defaults to `id`
    pub fn new(
        name: impl Into<String>,
        rel_type: RelationType,
        foreign_key: impl IntoIdentity,
    ) -> RemoteRelationBuilder {
        RemoteRelationBuilder {
            def: RemoteRelationDef {
                name: name.into(),
                rel_type,
                foreign_key: foreign_key.into_identity(),
                local_key: Identity::default(),
                case_insensitive: false,
                fetcher: None,
            },
        }
    }

    pub fn has_one(name: impl Into<String>, foreign_key: impl IntoIdentity) -> RemoteRelationBuilder {
        Self::new(name, RelationType::HasOne, foreign_key)
    }

    pub fn has_many(name: impl Into<String>, foreign_key: impl IntoIdentity) -> RemoteRelationBuilder {
        Self::new(name, RelationType::HasMany, foreign_key)
    }

    /// Start a definition from configured options
    pub fn from_options(name: impl Into<String>, options: RelationOptions) -> RemoteRelationBuilder {
        Self::new(name, options.kind, options.foreign_key)
            .local_key(options.local_key)
            .case_insensitive(options.case_insensitive)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rel_type(&self) -> RelationType {
        self.rel_type
    }

    pub fn foreign_key(&self) -> &Identity {
        &self.foreign_key
    }

    pub fn local_key(&self) -> &Identity {
        &self.local_key
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// The attached fetcher, or [`RelationError::MissingFetcher`]
    pub fn fetcher(&self) -> Result<&dyn RemoteFetcher, RelationError> {
        self.fetcher
            .as_deref()
            .ok_or_else(|| RelationError::MissingFetcher {
                relation: self.name.clone(),
            })
    }

    /// Attach or replace the fetcher on an existing definition
    pub fn set_fetcher<F: RemoteFetcher + 'static>(&mut self, fetcher: F) {
        self.fetcher = Some(Arc::new(fetcher));
    }

    fn validate(&self) -> Result<(), RelationError> {
        let local = self.local_key.arity();
        let foreign = self.foreign_key.arity();
        if local == 0 || foreign == 0 {
            return Err(RelationError::EmptyKey {
                relation: self.name.clone(),
            });
        }
        if local != foreign {
            return Err(RelationError::KeyArityMismatch {
                relation: self.name.clone(),
                local,
                foreign,
            });
        }
        Ok(())
    }
}

/// Builder for [`RemoteRelationDef`]
#[derive(Debug)]
pub struct RemoteRelationBuilder {
    def: RemoteRelationDef,
}

impl RemoteRelationBuilder {
    pub fn local_key(mut self, local_key: impl IntoIdentity) -> Self {
        self.def.local_key = local_key.into_identity();
        self
    }

    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.def.case_insensitive = value;
        self
    }

    pub fn with_fetcher<F: RemoteFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.def.set_fetcher(fetcher);
        self
    }

    /// Validate key arities and finish the definition
    ///
    /// A missing fetcher is not a build error; it is reported only when a
    /// fetch is actually needed.
    pub fn build(self) -> Result<RemoteRelationDef, RelationError> {
        self.def.validate()?;
        Ok(self.def)
    }
}
