//! Error types for remote relation loading.

use std::fmt;

/// Boxed error returned by a remote fetcher
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for remote relation operations
#[derive(Debug)]
pub enum RelationError {
    /// A fetch was required but the relation has no fetcher attached
    MissingFetcher { relation: String },
    /// Local and foreign key field lists have different lengths
    KeyArityMismatch {
        relation: String,
        local: usize,
        foreign: usize,
    },
    /// A key field list names no fields
    EmptyKey { relation: String },
    /// The fetcher failed; `source` is the fetcher's own error, untouched
    Fetch { relation: String, source: FetchError },
}

impl RelationError {
    /// Name of the relation the error belongs to
    pub fn relation(&self) -> &str {
        match self {
            RelationError::MissingFetcher { relation }
            | RelationError::KeyArityMismatch { relation, .. }
            | RelationError::EmptyKey { relation }
            | RelationError::Fetch { relation, .. } => relation,
        }
    }

    /// Take back the fetcher's original error, if this is a fetch failure
    pub fn into_fetch_error(self) -> Option<FetchError> {
        match self {
            RelationError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::MissingFetcher { relation } => {
                write!(f, "Relation {relation} has no fetch function")
            }
            RelationError::KeyArityMismatch {
                relation,
                local,
                foreign,
            } => write!(
                f,
                "Relation {relation}: local key has {local} field(s) but foreign key has {foreign}"
            ),
            RelationError::EmptyKey { relation } => {
                write!(f, "Relation {relation}: key field list is empty")
            }
            RelationError::Fetch { relation, source } => {
                write!(f, "Relation {relation}: fetch failed: {source}")
            }
        }
    }
}

impl std::error::Error for RelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelationError::Fetch { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
