//! Medication checklist: four intake slots per day, rated by how many were
//! taken.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::dates;
use crate::db::repository;
use crate::models::enums::IntakeStatus;
use crate::models::MedicationLog;

use super::{day_rate, rate_bucket, AdherenceBucket, DaySummary, TrackingError};

/// A full day view, returned by the day endpoint and after every log update.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationDay {
    pub date: NaiveDate,
    pub rate: u32,
    pub bucket: AdherenceBucket,
    pub items: Vec<MedicationLog>,
}

/// Per-day adherence over a date range, newest day first. Every day in the
/// range is seeded on the way through, so the result always covers the full
/// range.
pub fn history(
    conn: &Connection,
    owner_id: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<DaySummary>, TrackingError> {
    let (start, end) = dates::normalize_from_to(from, to)?;

    let mut items = Vec::new();
    for date in dates::date_range_inclusive(start, end)? {
        repository::seed_medication_day(conn, owner_id, date)?;
        let logs = repository::get_medication_day(conn, owner_id, date)?;
        let taken = taken_count(&logs);
        items.push(DaySummary {
            date,
            rate: day_rate(taken, logs.len()),
        });
    }
    items.reverse();
    Ok(items)
}

/// Seed-then-read one day.
pub fn day(conn: &Connection, owner_id: i64, date: NaiveDate) -> Result<MedicationDay, TrackingError> {
    repository::seed_medication_day(conn, owner_id, date)?;
    let logs = repository::get_medication_day(conn, owner_id, date)?;
    Ok(build_day(date, logs))
}

/// Change one slot's status. `taken` stamps the intake time with the current
/// local time; any other status clears it. Returns the recomputed day.
pub fn set_status(
    conn: &Connection,
    owner_id: i64,
    log_id: i64,
    status: IntakeStatus,
) -> Result<MedicationDay, TrackingError> {
    let log = repository::get_medication_log(conn, log_id)?
        .ok_or(TrackingError::NotFound(log_id))?;
    if log.owner_id != owner_id {
        return Err(TrackingError::Forbidden(log_id));
    }

    let intake_datetime = match status {
        IntakeStatus::Taken => Some(chrono::Local::now().naive_local()),
        _ => None,
    };
    repository::update_medication_log(conn, log_id, &status, intake_datetime)?;
    tracing::debug!(log_id, status = status.as_str(), "medication log updated");

    let logs = repository::get_medication_day(conn, owner_id, log.log_date)?;
    Ok(build_day(log.log_date, logs))
}

fn taken_count(logs: &[MedicationLog]) -> usize {
    logs.iter()
        .filter(|l| l.status == IntakeStatus::Taken)
        .count()
}

fn build_day(date: NaiveDate, items: Vec<MedicationLog>) -> MedicationDay {
    let taken = taken_count(&items);
    MedicationDay {
        date,
        rate: day_rate(taken, items.len()),
        bucket: rate_bucket(taken, items.len()),
        items,
    }
}
