use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::{ActivityStatus, IntakeStatus};
use crate::models::{HealthLog, MedicationLog};

use super::parse_datetime;

/// Default medication checklist, one slot per label per (user, date).
pub const MEDICATION_LABELS: &[&str] = &["morning", "lunch", "evening", "bedtime"];

/// Default health checklist.
pub const HEALTH_LABELS: &[&str] = &["water", "walk", "stretch"];

/// Idempotent day seed: creates missing slots, never touches existing ones.
/// `INSERT OR IGNORE` against UNIQUE(owner, date, label) makes concurrent
/// seeds safe.
pub fn seed_medication_day(
    conn: &Connection,
    owner_id: i64,
    date: NaiveDate,
) -> Result<(), DatabaseError> {
    for label in MEDICATION_LABELS {
        conn.execute(
            "INSERT OR IGNORE INTO medication_logs (owner_id, log_date, label, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, date.to_string(), label, IntakeStatus::Skipped.as_str()],
        )?;
    }
    Ok(())
}

pub fn seed_health_day(
    conn: &Connection,
    owner_id: i64,
    date: NaiveDate,
) -> Result<(), DatabaseError> {
    for label in HEALTH_LABELS {
        conn.execute(
            "INSERT OR IGNORE INTO health_logs (owner_id, log_date, label, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, date.to_string(), label, ActivityStatus::Skipped.as_str()],
        )?;
    }
    Ok(())
}

pub fn get_medication_day(
    conn: &Connection,
    owner_id: i64,
    date: NaiveDate,
) -> Result<Vec<MedicationLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, log_date, label, status, intake_datetime
         FROM medication_logs WHERE owner_id = ?1 AND log_date = ?2 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![owner_id, date.to_string()], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(medication_log_from_row(row?)?);
    }
    Ok(logs)
}

pub fn get_medication_log(
    conn: &Connection,
    log_id: i64,
) -> Result<Option<MedicationLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, log_date, label, status, intake_datetime
         FROM medication_logs WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![log_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    });

    match result {
        Ok(row) => Ok(Some(medication_log_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_medication_log(
    conn: &Connection,
    log_id: i64,
    status: &IntakeStatus,
    intake_datetime: Option<NaiveDateTime>,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE medication_logs SET status = ?2, intake_datetime = ?3 WHERE id = ?1",
        params![
            log_id,
            status.as_str(),
            intake_datetime.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "MedicationLog".into(),
            id: log_id.to_string(),
        });
    }
    Ok(())
}

pub fn get_health_day(
    conn: &Connection,
    owner_id: i64,
    date: NaiveDate,
) -> Result<Vec<HealthLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, log_date, label, status
         FROM health_logs WHERE owner_id = ?1 AND log_date = ?2 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![owner_id, date.to_string()], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(health_log_from_row(row?)?);
    }
    Ok(logs)
}

pub fn get_health_log(conn: &Connection, log_id: i64) -> Result<Option<HealthLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, log_date, label, status FROM health_logs WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![log_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok(row) => Ok(Some(health_log_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_health_log(
    conn: &Connection,
    log_id: i64,
    status: &ActivityStatus,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE health_logs SET status = ?2 WHERE id = ?1",
        params![log_id, status.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "HealthLog".into(),
            id: log_id.to_string(),
        });
    }
    Ok(())
}

type MedicationLogRow = (i64, i64, String, String, String, Option<String>);

fn medication_log_from_row(row: MedicationLogRow) -> Result<MedicationLog, DatabaseError> {
    let (id, owner_id, log_date, label, status, intake) = row;
    Ok(MedicationLog {
        id,
        owner_id,
        log_date: NaiveDate::parse_from_str(&log_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        label,
        status: IntakeStatus::from_str(&status)?,
        intake_datetime: intake.as_deref().and_then(parse_datetime),
    })
}

type HealthLogRow = (i64, i64, String, String, String);

fn health_log_from_row(row: HealthLogRow) -> Result<HealthLog, DatabaseError> {
    let (id, owner_id, log_date, label, status) = row;
    Ok(HealthLog {
        id,
        owner_id,
        log_date: NaiveDate::parse_from_str(&log_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        label,
        status: ActivityStatus::from_str(&status)?,
    })
}
