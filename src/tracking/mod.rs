//! Daily checklist tracking — medication intake and health activities.
//!
//! Both subsystems share the same shape: a fixed set of labeled slots per
//! (user, date), seeded lazily with a default status, a completion rate per
//! day, and a coarse bucket used by clients for coloring.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::dates::DateError;
use crate::db::DatabaseError;

pub mod health;
pub mod medication;

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Log not found: {0}")]
    NotFound(i64),

    #[error("Log {0} belongs to another user")]
    Forbidden(i64),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Coarse adherence rating for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceBucket {
    Good,
    Warn,
    Bad,
    /// The day has no checklist items at all.
    None,
}

/// One history entry, newest day first in responses.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub rate: u32,
}

/// Completion percentage, rounded. A day without items rates 0.
pub fn day_rate(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

pub fn rate_bucket(done: usize, total: usize) -> AdherenceBucket {
    if total == 0 {
        return AdherenceBucket::None;
    }
    match day_rate(done, total) {
        r if r >= 80 => AdherenceBucket::Good,
        r if r >= 50 => AdherenceBucket::Warn,
        _ => AdherenceBucket::Bad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_rounds_to_whole_percent() {
        assert_eq!(day_rate(0, 4), 0);
        assert_eq!(day_rate(1, 4), 25);
        assert_eq!(day_rate(2, 3), 67);
        assert_eq!(day_rate(3, 3), 100);
        assert_eq!(day_rate(0, 0), 0);
    }

    #[test]
    fn bucket_thresholds() {
        assert_eq!(rate_bucket(4, 4), AdherenceBucket::Good);
        assert_eq!(rate_bucket(4, 5), AdherenceBucket::Good); // exactly 80
        assert_eq!(rate_bucket(2, 4), AdherenceBucket::Warn); // exactly 50
        assert_eq!(rate_bucket(3, 4), AdherenceBucket::Warn);
        assert_eq!(rate_bucket(1, 4), AdherenceBucket::Bad);
        assert_eq!(rate_bucket(0, 4), AdherenceBucket::Bad);
        assert_eq!(rate_bucket(0, 0), AdherenceBucket::None);
    }

    #[test]
    fn bucket_serializes_snake_case() {
        let json = serde_json::to_string(&AdherenceBucket::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let json = serde_json::to_string(&AdherenceBucket::None).unwrap();
        assert_eq!(json, "\"none\"");
    }
}
