//! Core persistence and ordering engine for EveryDay.
//! This crate is the single source of truth for workspace invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod recovery;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{StoreConfig, WorkspaceOptions, DEFAULT_LOAD_CAP};
pub use logging::{default_log_level, init_logging, init_logging_for, logging_status};
pub use model::block::{Block, BlockId, BlockKind, BlockValidationError, DEFAULT_SECTION};
pub use model::stats::ActivityStats;
pub use recovery::{merge_stores, run_recovery, RecoveryError, RecoveryReport};
pub use repo::block_repo::{BlockRepository, DocumentBlockRepository, BLOCKS_COLLECTION};
pub use repo::stats_repo::{DocumentStatsRepository, StatsRepository, STATS_COLLECTION};
pub use repo::{RepoError, RepoResult};
pub use service::bootstrap::WorkspaceHandle;
pub use service::streak::{apply_activity, Clock, StreakUpdate, SystemClock};
pub use service::workspace_service::{WorkspaceError, WorkspaceResult, WorkspaceService};
pub use store::{Document, DocumentCursor, DocumentStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
