//! Crash-recovery merge from a last-known-good backup.
//!
//! # Responsibility
//! - Copy block documents missing from the live store out of the backup.
//! - Restore the stats record when the live store has none.
//! - Report per-document outcomes without aborting on single failures.
//!
//! # Invariants
//! - Block documents are copied raw, never through typed mapping, so schema
//!   drift in the backup does not block recovery.
//! - Documents already present in the live store are never touched.
//! - A stats failure never fails the run.

use crate::config::StoreConfig;
use crate::repo::block_repo::BLOCKS_COLLECTION;
use crate::repo::stats_repo::{DocumentStatsRepository, StatsRepository};
use crate::repo::RepoResult;
use crate::store::{DocumentStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Fatal recovery errors; per-document problems are reported, not raised.
#[derive(Debug)]
pub enum RecoveryError {
    /// No backup file at the expected location.
    BackupMissing(PathBuf),
    /// Either store could not be opened or enumerated.
    Store(StoreError),
}

impl Display for RecoveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackupMissing(path) => write!(f, "backup file not found at `{}`", path.display()),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecoveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BackupMissing(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for RecoveryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One backup document that could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryFailure {
    pub id: String,
    pub message: String,
}

/// Outcome summary of one recovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Backup blocks inserted into the live store.
    pub recovered: usize,
    /// Backup blocks that could not be read or inserted.
    pub failed: usize,
    /// Backup blocks already present in the live store.
    pub skipped: usize,
    /// Whether the stats record was restored from the backup.
    pub stats_recovered: bool,
    pub failures: Vec<RecoveryFailure>,
}

/// Recovers the live store from its sibling backup file.
///
/// The backup is opened read-only; the live store is created when absent.
pub fn run_recovery(config: &StoreConfig) -> RecoveryResult<RecoveryReport> {
    let backup_path = config.backup_path();
    if !backup_path.is_file() {
        error!("event=recovery module=recovery status=error error_code=backup_missing");
        return Err(RecoveryError::BackupMissing(backup_path));
    }

    let backup = DocumentStore::open_read_only(&backup_path)?;
    let live = DocumentStore::open(config.db_path())?;
    merge_stores(&backup, &live)
}

/// Inserts every backup block absent from `live`, then best-effort restores
/// the stats record.
pub fn merge_stores(backup: &DocumentStore, live: &DocumentStore) -> RecoveryResult<RecoveryReport> {
    let started_at = Instant::now();
    info!(
        "event=recovery module=recovery status=start backup_blocks={}",
        backup.count(BLOCKS_COLLECTION)?
    );

    let mut report = RecoveryReport::default();
    for item in backup.find_all(BLOCKS_COLLECTION) {
        let document = match item {
            Ok(document) => document,
            Err(StoreError::MalformedDocument { id, message, .. }) => {
                record_failure(&mut report, id, message);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let copied = live.exists(BLOCKS_COLLECTION, document.id()).and_then(|exists| {
            if exists {
                return Ok(false);
            }
            live.insert(BLOCKS_COLLECTION, &document).map(|()| true)
        });
        match copied {
            Ok(true) => report.recovered += 1,
            Ok(false) => report.skipped += 1,
            Err(err) => record_failure(&mut report, document.id().to_string(), err.to_string()),
        }
    }

    report.stats_recovered = match recover_stats(backup, live) {
        Ok(recovered) => recovered,
        Err(err) => {
            warn!(
                "event=recovery_stats module=recovery status=error error={}",
                err
            );
            false
        }
    };

    info!(
        "event=recovery module=recovery status=ok recovered={} failed={} skipped={} stats_recovered={} duration_ms={}",
        report.recovered,
        report.failed,
        report.skipped,
        report.stats_recovered,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn recover_stats(backup: &DocumentStore, live: &DocumentStore) -> RepoResult<bool> {
    let live_repo = DocumentStatsRepository::new(live);
    if live_repo.count_stats()? > 0 {
        return Ok(false);
    }

    let Some(stats) = DocumentStatsRepository::new(backup).find_first_stats()? else {
        return Ok(false);
    };
    live_repo.insert_stats(&stats)?;
    Ok(true)
}

fn record_failure(report: &mut RecoveryReport, id: String, message: String) {
    warn!(
        "event=recovery_item module=recovery status=error doc_id={} error={}",
        id, message
    );
    report.failed += 1;
    report.failures.push(RecoveryFailure { id, message });
}
