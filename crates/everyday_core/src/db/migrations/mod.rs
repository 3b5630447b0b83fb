//! Schema versions of the document store file.
//!
//! # Invariants
//! - Versions in [`STEPS`] are strictly increasing, starting at 1.
//! - `PRAGMA user_version` equals the last applied step.
//! - All pending steps commit in one transaction or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_documents.sql"),
}];

/// Where a store file stands relative to this build's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaState {
    Current,
    Behind { found: u32 },
}

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings a writable connection up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let SchemaState::Behind { found } = schema_state(conn)? else {
        return Ok(());
    };

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > found) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found,
        latest_version()
    );
    Ok(())
}

/// Accepts only connections already at [`latest_version`]; never writes.
pub fn ensure_current(conn: &Connection) -> DbResult<()> {
    match schema_state(conn)? {
        SchemaState::Current => Ok(()),
        SchemaState::Behind { found } => Err(DbError::SchemaNotInitialized {
            db_version: found,
            expected_version: latest_version(),
        }),
    }
}

fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }
    if found == latest {
        Ok(SchemaState::Current)
    } else {
        Ok(SchemaState::Behind { found })
    }
}
