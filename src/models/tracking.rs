use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{ActivityStatus, IntakeStatus};

/// One medication checklist slot for a (user, date). Four are seeded per
/// day: morning, lunch, evening, bedtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: i64,
    pub owner_id: i64,
    pub log_date: NaiveDate,
    pub label: String,
    pub status: IntakeStatus,
    pub intake_datetime: Option<NaiveDateTime>,
}

/// One health checklist slot for a (user, date): water, walk, stretch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthLog {
    pub id: i64,
    pub owner_id: i64,
    pub log_date: NaiveDate,
    pub label: String,
    pub status: ActivityStatus,
}
