//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file, read-only file, or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a writable connection.
//!
//! # Invariants
//! - Writable file connections run in WAL mode so that several handles on the
//!   same file can read while one writes.
//! - Writable connections have migrations fully applied.
//! - Read-only connections are never written, not even by migrations.

use super::migrations::{apply_migrations, ensure_current};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// Creates the file and its parent directory when they do not exist yet.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    if let Err(err) = ensure_parent_dir(path) {
        log_open_failure("file", started_at, "db_dir_failed", &err);
        return Err(err);
    }

    let mut conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            let err = DbError::from(err);
            log_open_failure("file", started_at, "db_open_failed", &err);
            return Err(err);
        }
    };

    match bootstrap_connection(&mut conn, true) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            log_open_failure("file", started_at, "db_bootstrap_failed", &err);
            Err(err)
        }
    }
}

/// Opens an existing SQLite database file without write access.
///
/// The file must exist and carry the latest schema version.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=read_only");

    let conn = match Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    ) {
        Ok(conn) => conn,
        Err(err) => {
            let err = DbError::from(err);
            log_open_failure("read_only", started_at, "db_open_failed", &err);
            return Err(err);
        }
    };

    let checked = conn
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(DbError::from)
        .and_then(|()| ensure_current(&conn));
    match checked {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=read_only duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            log_open_failure("read_only", started_at, "db_schema_mismatch", &err);
            Err(err)
        }
    }
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let mut conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            let err = DbError::from(err);
            log_open_failure("memory", started_at, "db_open_failed", &err);
            return Err(err);
        }
    };

    match bootstrap_connection(&mut conn, false) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            log_open_failure("memory", started_at, "db_bootstrap_failed", &err);
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, wal: bool) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if wal {
        // journal_mode answers with a row, so it cannot go through execute_batch.
        let _mode: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    }
    apply_migrations(conn)?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
        path: parent.to_path_buf(),
        source,
    })
}

fn log_open_failure(mode: &str, started_at: Instant, error_code: &str, err: &DbError) {
    error!(
        "event=db_open module=db status=error mode={} duration_ms={} error_code={} error={}",
        mode,
        started_at.elapsed().as_millis(),
        error_code,
        err
    );
}
