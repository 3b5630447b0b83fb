//! SQLite-backed document store and lazy cursors.
//!
//! # Invariants
//! - One store owns exactly one connection; repositories borrow the store.
//! - Cursors page by `rowid`, so enumeration order is insertion order and a
//!   cursor never holds a statement open between pages.

use super::document::Document;
use super::{StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, open_db_read_only};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const CURSOR_PAGE_SIZE: i64 = 64;

/// Embedded document database holding any number of named collections.
pub struct DocumentStore {
    conn: Connection,
    path: Option<PathBuf>,
    read_only: bool,
}

impl DocumentStore {
    /// Opens (and creates when absent) a writable store file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        Ok(Self {
            conn: open_db(path)?,
            path: Some(path.to_path_buf()),
            read_only: false,
        })
    }

    /// Opens an existing store file without write access.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        Ok(Self {
            conn: open_db_read_only(path)?,
            path: Some(path.to_path_buf()),
            read_only: true,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            path: None,
            read_only: false,
        })
    }

    /// Backing file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body
                 FROM documents
                 WHERE collection = ?1
                   AND doc_id = ?2;",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Document::parse_stored(collection, id.to_string(), &body).map(Some),
            None => Ok(None),
        }
    }

    pub fn exists(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM documents
                WHERE collection = ?1
                  AND doc_id = ?2
            );",
            params![collection, id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    pub fn count(&self, collection: &str) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Inserts a new document; an existing id is a `DuplicateKey` error.
    pub fn insert(&self, collection: &str, document: &Document) -> StoreResult<()> {
        self.ensure_writable()?;
        let body = document.to_json()?;

        let result = self.conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);",
            params![collection, document.id(), body],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    id: document.id().to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces the body of an existing document. Returns `false` when absent.
    pub fn update(&self, collection: &str, document: &Document) -> StoreResult<bool> {
        self.ensure_writable()?;
        let body = document.to_json()?;

        let changed = self.conn.execute(
            "UPDATE documents
             SET
                body = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?1
               AND doc_id = ?2;",
            params![collection, document.id(), body],
        )?;
        Ok(changed > 0)
    }

    /// Deletes a document by id. Returns `false` when absent.
    pub fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.ensure_writable()?;

        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![collection, id],
        )?;
        Ok(changed > 0)
    }

    /// Lazily enumerates every document of a collection in insertion order.
    pub fn find_all(&self, collection: &str) -> DocumentCursor<'_> {
        DocumentCursor::new(&self.conn, collection, None)
    }

    /// Lazily enumerates documents whose top-level `field` contains `substring`.
    ///
    /// Matching follows SQLite `LIKE`: ASCII case-insensitive, with `%`, `_`
    /// and `\` in `substring` taken literally. Bodies that are not valid JSON
    /// never match.
    pub fn find_containing(
        &self,
        collection: &str,
        field: &str,
        substring: &str,
    ) -> DocumentCursor<'_> {
        let filter = ContainsFilter {
            json_path: format!("$.{field}"),
            pattern: format!("%{}%", escape_like(substring)),
        };
        DocumentCursor::new(&self.conn, collection, Some(filter))
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ContainsFilter {
    json_path: String,
    pattern: String,
}

struct RawDocument {
    doc_id: String,
    body: String,
}

/// Lazy, paged sequence of documents from one collection.
///
/// Yields one `Err` per malformed body and keeps going; a SQLite failure while
/// fetching a page is yielded once and ends the sequence.
pub struct DocumentCursor<'s> {
    conn: &'s Connection,
    collection: String,
    filter: Option<ContainsFilter>,
    last_rowid: i64,
    page: VecDeque<RawDocument>,
    finished: bool,
}

impl<'s> DocumentCursor<'s> {
    fn new(conn: &'s Connection, collection: &str, filter: Option<ContainsFilter>) -> Self {
        Self {
            conn,
            collection: collection.to_string(),
            filter,
            last_rowid: 0,
            page: VecDeque::new(),
            finished: false,
        }
    }

    fn fetch_page(&mut self) -> StoreResult<()> {
        let mut sql = String::from(
            "SELECT rowid, doc_id, body
             FROM documents
             WHERE collection = ?
               AND rowid > ?",
        );
        let mut bind_values: Vec<Value> = vec![
            Value::Text(self.collection.clone()),
            Value::Integer(self.last_rowid),
        ];

        if let Some(filter) = &self.filter {
            sql.push_str(
                " AND (CASE WHEN json_valid(body) THEN json_extract(body, ?) END) LIKE ? ESCAPE '\\'",
            );
            bind_values.push(Value::Text(filter.json_path.clone()));
            bind_values.push(Value::Text(filter.pattern.clone()));
        }

        sql.push_str(" ORDER BY rowid ASC LIMIT ?");
        bind_values.push(Value::Integer(CURSOR_PAGE_SIZE));

        let conn = self.conn;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut fetched = 0_i64;

        while let Some(row) = rows.next()? {
            let rowid: i64 = row.get(0)?;
            self.last_rowid = rowid;
            self.page.push_back(RawDocument {
                doc_id: row.get(1)?,
                body: row.get(2)?,
            });
            fetched += 1;
        }

        if fetched < CURSOR_PAGE_SIZE {
            self.finished = true;
        }
        Ok(())
    }
}

impl Iterator for DocumentCursor<'_> {
    type Item = StoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.finished {
            if let Err(err) = self.fetch_page() {
                self.finished = true;
                return Some(Err(err));
            }
        }

        let raw = self.page.pop_front()?;
        Some(Document::parse_stored(
            &self.collection,
            raw.doc_id,
            &raw.body,
        ))
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
