//! Daily streak computation.
//!
//! # Invariants
//! - Repeated activity on the same calendar day leaves the record unchanged.
//! - `longest_streak` never decreases.

use crate::model::stats::ActivityStats;
use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
pub trait Clock: Send {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}

/// What one activity did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Today was already counted; nothing to persist.
    AlreadyCounted,
    /// Yesterday was active; the streak grew by one.
    Extended,
    /// First activity ever, or a gap of more than one day.
    Restarted,
}

impl StreakUpdate {
    pub fn changed(self) -> bool {
        !matches!(self, Self::AlreadyCounted)
    }
}

/// Records one activity on `today`.
pub fn apply_activity(stats: &mut ActivityStats, today: NaiveDate) -> StreakUpdate {
    if stats.last_activity_date == Some(today) {
        return StreakUpdate::AlreadyCounted;
    }

    let update = if stats.last_activity_date.is_some()
        && stats.last_activity_date == today.pred_opt()
    {
        stats.current_streak = stats.current_streak.saturating_add(1);
        StreakUpdate::Extended
    } else {
        stats.current_streak = 1;
        StreakUpdate::Restarted
    };

    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
    stats.last_activity_date = Some(today);
    update
}

/// Short label shown next to the section picker.
pub fn streak_label(stats: &ActivityStats) -> String {
    format!("🔥 {}", stats.current_streak)
}

#[cfg(test)]
mod tests {
    use super::{apply_activity, streak_label, StreakUpdate};
    use crate::model::stats::ActivityStats;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn first_activity_starts_streak_at_one() {
        let mut stats = ActivityStats::new();
        assert_eq!(apply_activity(&mut stats, day(10)), StreakUpdate::Restarted);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.last_activity_date, Some(day(10)));
    }

    #[test]
    fn same_day_is_idempotent() {
        let mut stats = ActivityStats::new();
        apply_activity(&mut stats, day(10));
        let before = stats.clone();

        assert_eq!(
            apply_activity(&mut stats, day(10)),
            StreakUpdate::AlreadyCounted
        );
        assert_eq!(stats, before);
    }

    #[test]
    fn consecutive_day_extends_and_raises_longest() {
        let mut stats = ActivityStats {
            current_streak: 4,
            longest_streak: 4,
            last_activity_date: Some(day(9)),
            ..ActivityStats::new()
        };

        assert_eq!(apply_activity(&mut stats, day(10)), StreakUpdate::Extended);
        assert_eq!(stats.current_streak, 5);
        assert_eq!(stats.longest_streak, 5);
    }

    #[test]
    fn gap_resets_current_but_keeps_longest() {
        let mut stats = ActivityStats {
            current_streak: 7,
            longest_streak: 9,
            last_activity_date: Some(day(1)),
            ..ActivityStats::new()
        };

        assert_eq!(apply_activity(&mut stats, day(10)), StreakUpdate::Restarted);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 9);
    }

    #[test]
    fn extends_across_month_boundary() {
        let mut stats = ActivityStats {
            current_streak: 2,
            longest_streak: 2,
            last_activity_date: NaiveDate::from_ymd_opt(2026, 2, 28),
            ..ActivityStats::new()
        };

        assert_eq!(apply_activity(&mut stats, day(1)), StreakUpdate::Extended);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn label_shows_current_streak() {
        let stats = ActivityStats {
            current_streak: 12,
            ..ActivityStats::new()
        };
        assert_eq!(streak_label(&stats), "🔥 12");
    }
}
