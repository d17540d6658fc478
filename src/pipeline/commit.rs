//! Records commit for a confirmed scan.
//!
//! Everything the save produces — tracking days, master rows, prescriptions,
//! and the terminal status transition — happens in one transaction. A scan
//! is either fully reconciled into the records or not at all; there is no
//! partially-saved state to clean up.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::{repository, DatabaseError};
use crate::models::{NewPrescription, ScanDocument};
use crate::pipeline::scan::PipelineError;

/// What a commit created — used for logging and asserted on in tests.
#[derive(Debug)]
pub struct CommitOutcome {
    pub disease_id: Option<i64>,
    pub prescription_ids: Vec<i64>,
}

/// Reconcile a confirmed scan into the owner's records:
///
/// 1. seed medication and health tracking days for the document date
/// 2. upsert the disease master row when a diagnosis is present
/// 3. upsert one drug master row per extracted name, with a placeholder
///    prescription (1 dose of "1 unit", start = end = document date)
/// 4. move the scan to `saved`
///
/// Step 4 is guarded on the scan still being savable, so a concurrent save
/// rolls back here instead of double-writing prescriptions.
pub fn commit_scan(
    conn: &mut Connection,
    scan: &ScanDocument,
    document_date: NaiveDate,
) -> Result<CommitOutcome, PipelineError> {
    let tx = conn.transaction().map_err(DatabaseError::from)?;

    repository::seed_medication_day(&tx, scan.owner_id, document_date)?;
    repository::seed_health_day(&tx, scan.owner_id, document_date)?;

    let disease_id = match scan.diagnosis.as_deref() {
        Some(name) if !name.is_empty() => Some(repository::upsert_disease_by_name(&tx, name)?.id),
        _ => None,
    };

    let mut prescription_ids = Vec::with_capacity(scan.drug_names.len());
    for name in &scan.drug_names {
        let drug = repository::upsert_drug_by_name(&tx, name)?;
        let id = repository::insert_prescription(
            &tx,
            &NewPrescription {
                owner_id: scan.owner_id,
                disease_id,
                drug_id: Some(drug.id),
                dose_count: Some(1),
                dose_amount: Some("1".to_string()),
                dose_unit: Some("unit".to_string()),
                start_date: Some(document_date),
                end_date: Some(document_date),
            },
        )?;
        prescription_ids.push(id);
    }

    if !repository::mark_scan_saved(&tx, scan.id)? {
        return Err(PipelineError::InvalidState(format!(
            "scan {} can no longer be saved",
            scan.id
        )));
    }

    tx.commit().map_err(DatabaseError::from)?;
    Ok(CommitOutcome {
        disease_id,
        prescription_ids,
    })
}
