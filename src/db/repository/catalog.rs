use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{Disease, Drug};

/// Atomic lookup-or-create by natural key. UNIQUE(name) plus
/// `ON CONFLICT DO NOTHING` keeps concurrent saves from creating duplicate
/// master rows; the follow-up select always finds exactly one.
pub fn upsert_disease_by_name(conn: &Connection, name: &str) -> Result<Disease, DatabaseError> {
    conn.execute(
        "INSERT INTO diseases (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;

    let mut stmt =
        conn.prepare("SELECT id, name, icd_code, description FROM diseases WHERE name = ?1")?;
    let disease = stmt.query_row(params![name], |row| {
        Ok(Disease {
            id: row.get(0)?,
            name: row.get(1)?,
            icd_code: row.get(2)?,
            description: row.get(3)?,
        })
    })?;
    Ok(disease)
}

pub fn upsert_drug_by_name(conn: &Connection, name: &str) -> Result<Drug, DatabaseError> {
    conn.execute(
        "INSERT INTO drugs (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;

    let mut stmt = conn.prepare("SELECT id, name, manufacturer FROM drugs WHERE name = ?1")?;
    let drug = stmt.query_row(params![name], |row| {
        Ok(Drug {
            id: row.get(0)?,
            name: row.get(1)?,
            manufacturer: row.get(2)?,
        })
    })?;
    Ok(drug)
}
