//! Repository layer over the document store.
//!
//! # Responsibility
//! - Map typed entities to and from store documents.
//! - Isolate collection names and document keys from the workspace engine.
//!
//! # Invariants
//! - Repositories hold nothing but a borrow of the store.
//! - Repositories never validate business invariants (duplicate `order`,
//!   variant shape); that is the workspace engine's job.
//! - Not-found on update/delete is reported as `false`, not as an error.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod block_repo;
pub mod stats_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for typed persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    /// Document exists but does not map onto the typed entity.
    Mapping {
        collection: &'static str,
        id: String,
        message: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Mapping {
                collection,
                id,
                message,
            } => write!(f, "cannot map `{collection}` document `{id}`: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Mapping { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
