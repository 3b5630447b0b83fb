//! Activity statistics model.
//!
//! # Invariants
//! - `longest_streak >= current_streak` after every streak update.
//! - `last_activity_date` has no time component.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of the stats record.
pub type StatsId = Uuid;

/// Singleton record tracking consecutive active days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    #[serde(rename = "_id")]
    pub id: StatsId,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
}

impl ActivityStats {
    /// Creates an empty record with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
        }
    }
}

impl Default for ActivityStats {
    fn default() -> Self {
        Self::new()
    }
}
