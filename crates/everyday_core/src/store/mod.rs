//! Document store adapter over the embedded SQLite file.
//!
//! # Responsibility
//! - Persist schemaless JSON documents grouped into named collections.
//! - Offer by-key lookup, substring search, insert/update/delete and lazy
//!   whole-collection enumeration.
//! - Keep SQL details inside the storage boundary so repositories only see
//!   documents.
//!
//! # Invariants
//! - Every document is a JSON object carrying a string `_id`.
//! - `(collection, _id)` is unique.
//! - Not-found on update/delete is reported as `false`, never as an error.
//! - A malformed stored body fails only its own item during enumeration.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod document;
mod document_store;

pub use document::{Document, ID_FIELD};
pub use document_store::{DocumentCursor, DocumentStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Connection bootstrap or SQLite failure.
    Db(DbError),
    /// Insert hit an id that already exists in the collection.
    DuplicateKey { collection: String, id: String },
    /// Stored body cannot be decoded into a document.
    MalformedDocument {
        collection: String,
        id: String,
        message: String,
    },
    /// Outgoing value cannot be represented as a document.
    InvalidDocument(String),
    /// Write attempted through a read-only store.
    ReadOnly,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey { collection, id } => {
                write!(f, "document `{id}` already exists in `{collection}`")
            }
            Self::MalformedDocument {
                collection,
                id,
                message,
            } => write!(f, "malformed document `{id}` in `{collection}`: {message}"),
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
            Self::ReadOnly => write!(f, "document store is opened read-only"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
