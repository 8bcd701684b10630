//! Remote relation module for API-backed relationships.
//!
//! This module loads relationships whose data lives behind an external API
//! instead of a database join:
//! - has_one: at most one related record per parent
//! - has_many: zero or more related records per parent
//!
//! # Architecture
//!
//! - **Identity**: single and composite key field lists
//! - **Key**: key values and dictionary key normalization
//! - **Collector**: distinct key collection over a batch of parents
//! - **Index**: fetched records keyed for O(1) lookup
//! - **Matcher**: attaching matches or defaults to parents
//! - **Eager / Lazy**: the batch and single-parent entry points

// Identity types
pub mod identity;
#[doc(inline)]
pub use identity::{BorrowedIdentityIter, Identity, IntoIdentity};

// Keys
pub mod key;
#[doc(inline)]
pub use key::{normalize, DictionaryKey, KeyValue};

// Relation definitions
pub mod def;
#[doc(inline)]
pub use def::{RelationOptions, RelationType, RemoteFetcher, RemoteRelationBuilder, RemoteRelationDef};

pub mod error;
#[doc(inline)]
pub use error::{FetchError, RelationError};

pub mod collector;
pub mod index;
pub mod matcher;
#[doc(inline)]
pub use collector::collect_keys;
#[doc(inline)]
pub use index::{index_many, index_one, ManyIndex, OneIndex};
#[doc(inline)]
pub use matcher::{match_many, match_one};

// Loading strategies
pub mod eager;
pub mod lazy;
#[doc(inline)]
pub use eager::{load_remote, load_remote_all};
#[doc(inline)]
pub use lazy::{resolve_many, resolve_one, RemoteLazyLoader};
