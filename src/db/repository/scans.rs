use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::ScanStatus;
use crate::models::ScanDocument;

use super::{now_text, parse_datetime};

/// Create a scan in `uploaded` state and return its fresh id.
pub fn insert_scan(
    conn: &Connection,
    owner_id: i64,
    file_path: Option<&str>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO scans (owner_id, status, file_path, drug_names, created_at)
         VALUES (?1, ?2, ?3, '[]', ?4)",
        params![owner_id, ScanStatus::Uploaded.as_str(), file_path, now_text()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_scan(conn: &Connection, scan_id: i64) -> Result<Option<ScanDocument>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, status, file_path, analyzed_at, document_date, diagnosis,
         drug_names, raw_text, raw_payload, created_at
         FROM scans WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![scan_id], |row| {
        Ok(ScanRow {
            id: row.get::<_, i64>(0)?,
            owner_id: row.get::<_, i64>(1)?,
            status: row.get::<_, String>(2)?,
            file_path: row.get::<_, Option<String>>(3)?,
            analyzed_at: row.get::<_, Option<String>>(4)?,
            document_date: row.get::<_, Option<String>>(5)?,
            diagnosis: row.get::<_, Option<String>>(6)?,
            drug_names: row.get::<_, String>(7)?,
            raw_text: row.get::<_, Option<String>>(8)?,
            raw_payload: row.get::<_, Option<String>>(9)?,
            created_at: row.get::<_, String>(10)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(scan_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Conditionally move a scan to `to` when its current status is one of
/// `allowed_from`. Returns `false` when the scan is missing or another
/// request moved it first — the caller decides which error that is.
pub fn transition_scan(
    conn: &Connection,
    scan_id: i64,
    to: &ScanStatus,
    allowed_from: &[ScanStatus],
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "UPDATE scans SET status = ?1 WHERE id = ?2 AND status IN ({})",
        status_list(allowed_from)
    );
    let rows = conn.execute(&sql, params![to.as_str(), scan_id])?;
    Ok(rows > 0)
}

/// Write a successful analysis: parsed fields + `analyzed_at`, guarded on
/// the scan still being `processing`.
pub fn store_analysis_success(
    conn: &Connection,
    scan_id: i64,
    document_date: Option<NaiveDate>,
    diagnosis: Option<&str>,
    drug_names: &[String],
    raw_text: &str,
    raw_payload: &serde_json::Value,
) -> Result<bool, DatabaseError> {
    let drugs_json = serde_json::to_string(drug_names)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let rows = conn.execute(
        "UPDATE scans SET status = ?1, analyzed_at = ?2, document_date = ?3, diagnosis = ?4,
         drug_names = ?5, raw_text = ?6, raw_payload = ?7
         WHERE id = ?8 AND status = ?9",
        params![
            ScanStatus::Done.as_str(),
            now_text(),
            document_date.map(|d| d.to_string()),
            diagnosis,
            drugs_json,
            raw_text,
            raw_payload.to_string(),
            scan_id,
            ScanStatus::Processing.as_str(),
        ],
    )?;
    Ok(rows > 0)
}

/// Write merged correction values and move the scan to `updated`.
/// The caller has already merged client-provided fields over the stored ones.
pub fn store_correction(
    conn: &Connection,
    scan_id: i64,
    document_date: Option<NaiveDate>,
    diagnosis: Option<&str>,
    drug_names: &[String],
) -> Result<bool, DatabaseError> {
    let drugs_json = serde_json::to_string(drug_names)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let rows = conn.execute(
        &format!(
            "UPDATE scans SET status = ?1, document_date = ?2, diagnosis = ?3, drug_names = ?4
             WHERE id = ?5 AND status IN ({})",
            status_list(ScanStatus::CORRECT_FROM)
        ),
        params![
            ScanStatus::Updated.as_str(),
            document_date.map(|d| d.to_string()),
            diagnosis,
            drugs_json,
            scan_id,
        ],
    )?;
    Ok(rows > 0)
}

/// Terminal transition executed inside the commit transaction.
pub fn mark_scan_saved(conn: &Connection, scan_id: i64) -> Result<bool, DatabaseError> {
    transition_scan(conn, scan_id, &ScanStatus::Saved, ScanStatus::SAVE_FROM)
}

// Status values are compile-time literals, so splicing them into the IN
// list is injection-safe.
fn status_list(statuses: &[ScanStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

struct ScanRow {
    id: i64,
    owner_id: i64,
    status: String,
    file_path: Option<String>,
    analyzed_at: Option<String>,
    document_date: Option<String>,
    diagnosis: Option<String>,
    drug_names: String,
    raw_text: Option<String>,
    raw_payload: Option<String>,
    created_at: String,
}

fn scan_from_row(row: ScanRow) -> Result<ScanDocument, DatabaseError> {
    let drug_names: Vec<String> = serde_json::from_str(&row.drug_names)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    Ok(ScanDocument {
        id: row.id,
        owner_id: row.owner_id,
        status: ScanStatus::from_str(&row.status)?,
        file_path: row.file_path,
        analyzed_at: row.analyzed_at.as_deref().and_then(parse_datetime),
        document_date: row
            .document_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        diagnosis: row.diagnosis,
        drug_names,
        raw_text: row.raw_text,
        raw_payload: row
            .raw_payload
            .as_deref()
            .and_then(|p| serde_json::from_str(p).ok()),
        created_at: parse_datetime(&row.created_at).unwrap_or_default(),
    })
}
