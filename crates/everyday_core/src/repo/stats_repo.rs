//! Activity statistics repository contracts and document-store implementation.
//!
//! # Invariants
//! - `get_stats` creates the singleton record when the collection is empty.
//! - The first record in insertion order is the canonical one.

use crate::model::stats::ActivityStats;
use crate::repo::{RepoError, RepoResult};
use crate::store::{Document, DocumentStore};

/// Collection holding the stats record.
pub const STATS_COLLECTION: &str = "userstats";

/// Repository interface for the activity statistics record.
pub trait StatsRepository {
    /// Returns the stats record, inserting a fresh one when absent.
    fn get_stats(&self) -> RepoResult<ActivityStats>;
    /// Returns the first stats record without creating one.
    fn find_first_stats(&self) -> RepoResult<Option<ActivityStats>>;
    fn insert_stats(&self, stats: &ActivityStats) -> RepoResult<()>;
    fn update_stats(&self, stats: &ActivityStats) -> RepoResult<bool>;
    fn count_stats(&self) -> RepoResult<u64>;
}

/// Stats repository borrowing a shared document store.
pub struct DocumentStatsRepository<'s> {
    store: &'s DocumentStore,
}

impl<'s> DocumentStatsRepository<'s> {
    pub fn new(store: &'s DocumentStore) -> Self {
        Self { store }
    }
}

impl StatsRepository for DocumentStatsRepository<'_> {
    fn get_stats(&self) -> RepoResult<ActivityStats> {
        if let Some(stats) = self.find_first_stats()? {
            return Ok(stats);
        }

        let stats = ActivityStats::new();
        self.insert_stats(&stats)?;
        Ok(stats)
    }

    fn find_first_stats(&self) -> RepoResult<Option<ActivityStats>> {
        match self.store.find_all(STATS_COLLECTION).next() {
            Some(document) => Ok(Some(stats_from_document(&document?)?)),
            None => Ok(None),
        }
    }

    fn insert_stats(&self, stats: &ActivityStats) -> RepoResult<()> {
        let document = Document::from_entity(stats)?;
        self.store.insert(STATS_COLLECTION, &document)?;
        Ok(())
    }

    fn update_stats(&self, stats: &ActivityStats) -> RepoResult<bool> {
        let document = Document::from_entity(stats)?;
        Ok(self.store.update(STATS_COLLECTION, &document)?)
    }

    fn count_stats(&self) -> RepoResult<u64> {
        Ok(self.store.count(STATS_COLLECTION)?)
    }
}

/// Maps a raw `userstats` document onto the typed record.
pub fn stats_from_document(document: &Document) -> RepoResult<ActivityStats> {
    document
        .to_entity::<ActivityStats>()
        .map_err(|err| RepoError::Mapping {
            collection: STATS_COLLECTION,
            id: document.id().to_string(),
            message: err.to_string(),
        })
}
