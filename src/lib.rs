//! # Lifeguard Remote
//!
//! API-backed relations for Lifeguard models. A relation's records come from
//! a caller-supplied fetch function instead of a join, while keeping lazy and
//! eager (batch) loading semantics: a batch of N parents costs one fetch, not N.
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard) for the ORM this plugs into.

pub mod config;
pub mod metrics;
pub mod model;
pub mod relation;
pub mod value;

pub use crate::config::RelationsConfig;
pub use model::{Model, RelationValue, RemoteModel};
pub use relation::{
    collect_keys, index_many, index_one, load_remote, load_remote_all, match_many, match_one,
    normalize, resolve_many, resolve_one, DictionaryKey, FetchError, Identity, IntoIdentity,
    KeyValue, ManyIndex, OneIndex, RelationError, RelationOptions, RelationType,
    RemoteFetcher, RemoteLazyLoader, RemoteRelationBuilder, RemoteRelationDef,
};
pub use value::{Record, Value, ValueError};
