use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{NewPrescription, Prescription};

use super::{now_text, parse_datetime};

pub fn insert_prescription(
    conn: &Connection,
    new: &NewPrescription,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (owner_id, disease_id, drug_id, dose_count, dose_amount,
         dose_unit, start_date, end_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new.owner_id,
            new.disease_id,
            new.drug_id,
            new.dose_count,
            new.dose_amount,
            new.dose_unit,
            new.start_date.map(|d| d.to_string()),
            new.end_date.map(|d| d.to_string()),
            now_text(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_prescription(
    conn: &Connection,
    id: i64,
) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, disease_id, drug_id, dose_count, dose_amount, dose_unit,
         start_date, end_date, created_at
         FROM prescriptions WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok(PrescriptionRow {
            id: row.get::<_, i64>(0)?,
            owner_id: row.get::<_, i64>(1)?,
            disease_id: row.get::<_, Option<i64>>(2)?,
            drug_id: row.get::<_, Option<i64>>(3)?,
            dose_count: row.get::<_, Option<i64>>(4)?,
            dose_amount: row.get::<_, Option<String>>(5)?,
            dose_unit: row.get::<_, Option<String>>(6)?,
            start_date: row.get::<_, Option<String>>(7)?,
            end_date: row.get::<_, Option<String>>(8)?,
            created_at: row.get::<_, String>(9)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(prescription_from_row(row))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count_prescriptions_for_owner(
    conn: &Connection,
    owner_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE owner_id = ?1",
        params![owner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct PrescriptionRow {
    id: i64,
    owner_id: i64,
    disease_id: Option<i64>,
    drug_id: Option<i64>,
    dose_count: Option<i64>,
    dose_amount: Option<String>,
    dose_unit: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    created_at: String,
}

fn prescription_from_row(row: PrescriptionRow) -> Prescription {
    Prescription {
        id: row.id,
        owner_id: row.owner_id,
        disease_id: row.disease_id,
        drug_id: row.drug_id,
        dose_count: row.dose_count,
        dose_amount: row.dose_amount,
        dose_unit: row.dose_unit,
        start_date: row
            .start_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        end_date: row
            .end_date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        created_at: parse_datetime(&row.created_at).unwrap_or_default(),
    }
}
