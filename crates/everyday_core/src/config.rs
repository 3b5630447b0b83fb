//! Store locations and workspace tuning.
//!
//! # Responsibility
//! - Resolve the per-user data directory and the files derived from it.
//! - Carry engine tuning values so nothing reads process-global state.
//!
//! # Invariants
//! - The backup store is always a sibling of the live store.

use crate::model::block::DEFAULT_SECTION;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "EVERYDAY_DATA_DIR";

const APP_DIR_NAME: &str = "EveryDay";
const DB_FILE_STEM: &str = "everyday";
const DB_FILE_EXTENSION: &str = "db";
const BACKUP_SUFFIX: &str = "_corrupted_backup";
const LOG_DIR_NAME: &str = "logs";

/// Maximum number of blocks materialized for one section.
pub const DEFAULT_LOAD_CAP: usize = 50;

/// File locations for one EveryDay installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_dir: PathBuf,
}

impl StoreConfig {
    /// Uses an explicit data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolves the data directory from `EVERYDAY_DATA_DIR`, falling back to
    /// the platform application-data directory.
    pub fn resolve() -> Self {
        let override_dir = std::env::var(DATA_DIR_ENV).ok();
        Self::new(resolve_data_dir(override_dir.as_deref(), dirs::data_dir()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Live store file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{DB_FILE_STEM}.{DB_FILE_EXTENSION}"))
    }

    /// Last-known-good copy used by recovery.
    pub fn backup_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{DB_FILE_STEM}{BACKUP_SUFFIX}.{DB_FILE_EXTENSION}"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

/// Engine tuning values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceOptions {
    /// Display-time bound on the loaded window; not a storage limit.
    pub load_cap: usize,
    /// Section active right after open.
    pub initial_section: String,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            load_cap: DEFAULT_LOAD_CAP,
            initial_section: DEFAULT_SECTION.to_string(),
        }
    }
}

fn resolve_data_dir(override_dir: Option<&str>, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(raw) = override_dir {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    platform_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{resolve_data_dir, StoreConfig};
    use std::path::PathBuf;

    #[test]
    fn override_wins_over_platform_dir() {
        let dir = resolve_data_dir(Some(" /tmp/everyday "), Some(PathBuf::from("/data")));
        assert_eq!(dir, PathBuf::from("/tmp/everyday"));
    }

    #[test]
    fn blank_override_falls_back_to_platform_dir() {
        let dir = resolve_data_dir(Some("  "), Some(PathBuf::from("/data")));
        assert_eq!(dir, PathBuf::from("/data/EveryDay"));
    }

    #[test]
    fn backup_is_sibling_of_live_store() {
        let config = StoreConfig::new("/data/EveryDay");
        assert_eq!(config.db_path(), PathBuf::from("/data/EveryDay/everyday.db"));
        assert_eq!(
            config.backup_path(),
            PathBuf::from("/data/EveryDay/everyday_corrupted_backup.db")
        );
        assert_eq!(config.backup_path().parent(), config.db_path().parent());
    }
}
