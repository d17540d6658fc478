//! Health checklist: three activity slots per day (water, walk, stretch).
//! Same behavior as the medication checklist minus the intake timestamp.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::dates;
use crate::db::repository;
use crate::models::enums::ActivityStatus;
use crate::models::HealthLog;

use super::{day_rate, rate_bucket, AdherenceBucket, DaySummary, TrackingError};

#[derive(Debug, Clone, Serialize)]
pub struct HealthDay {
    pub date: NaiveDate,
    pub rate: u32,
    pub bucket: AdherenceBucket,
    pub items: Vec<HealthLog>,
}

pub fn history(
    conn: &Connection,
    owner_id: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<DaySummary>, TrackingError> {
    let (start, end) = dates::normalize_from_to(from, to)?;

    let mut items = Vec::new();
    for date in dates::date_range_inclusive(start, end)? {
        repository::seed_health_day(conn, owner_id, date)?;
        let logs = repository::get_health_day(conn, owner_id, date)?;
        let done = done_count(&logs);
        items.push(DaySummary {
            date,
            rate: day_rate(done, logs.len()),
        });
    }
    items.reverse();
    Ok(items)
}

pub fn day(conn: &Connection, owner_id: i64, date: NaiveDate) -> Result<HealthDay, TrackingError> {
    repository::seed_health_day(conn, owner_id, date)?;
    let logs = repository::get_health_day(conn, owner_id, date)?;
    Ok(build_day(date, logs))
}

pub fn set_status(
    conn: &Connection,
    owner_id: i64,
    log_id: i64,
    status: ActivityStatus,
) -> Result<HealthDay, TrackingError> {
    let log = repository::get_health_log(conn, log_id)?.ok_or(TrackingError::NotFound(log_id))?;
    if log.owner_id != owner_id {
        return Err(TrackingError::Forbidden(log_id));
    }

    repository::update_health_log(conn, log_id, &status)?;
    tracing::debug!(log_id, status = status.as_str(), "health log updated");

    let logs = repository::get_health_day(conn, owner_id, log.log_date)?;
    Ok(build_day(log.log_date, logs))
}

fn done_count(logs: &[HealthLog]) -> usize {
    logs.iter()
        .filter(|l| l.status == ActivityStatus::Done)
        .count()
}

fn build_day(date: NaiveDate, items: Vec<HealthLog>) -> HealthDay {
    let done = done_count(&items);
    HealthDay {
        date,
        rate: day_rate(done, items.len()),
        bucket: rate_bucket(done, items.len()),
        items,
    }
}
