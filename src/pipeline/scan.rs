//! Scan orchestrator: upload → analyze (OCR) → correct → save.
//!
//! Status moves only through the transition table on `ScanStatus`, and every
//! move is a conditional update in the database, so two requests racing on
//! the same scan cannot both win. The OCR call itself runs on the blocking
//! pool; no database connection is held while it is in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::sqlite::open_database;
use crate::db::{repository, DatabaseError};
use crate::files::{self, FileError};
use crate::models::enums::ScanStatus;
use crate::models::{ScanCorrection, ScanDocument};
use crate::ocr::{parse_ocr_result, ClovaOcrClient, OcrClient, OcrError};
use crate::{config, dates};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while driving a scan through the workflow.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan not found: {0}")]
    NotFound(i64),

    #[error("Scan {0} belongs to another user")]
    Forbidden(i64),

    /// The requested operation is not allowed from the scan's current status.
    #[error("{0}")]
    InvalidState(String),

    /// Client-supplied data failed validation.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Upload(#[from] FileError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// What a successful save produced.
#[derive(Debug)]
pub struct SaveOutcome {
    /// The scan, re-read in its terminal `saved` state.
    pub scan: ScanDocument,
    /// Tracking date seeded in both checklists.
    pub seeded_date: NaiveDate,
    pub commit: crate::pipeline::commit::CommitOutcome,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives scans through their lifecycle. The OCR client is injected, so the
/// whole workflow is testable without a provider account.
pub struct ScanPipeline {
    db_path: PathBuf,
    uploads_dir: PathBuf,
    ocr: Arc<dyn OcrClient + Send + Sync>,
}

impl ScanPipeline {
    pub fn new(
        db_path: PathBuf,
        uploads_dir: PathBuf,
        ocr: Arc<dyn OcrClient + Send + Sync>,
    ) -> Self {
        Self {
            db_path,
            uploads_dir,
            ocr,
        }
    }

    fn open(&self) -> Result<Connection, PipelineError> {
        Ok(open_database(&self.db_path)?)
    }

    /// Validate and store an upload, then create its scan in `uploaded`.
    /// Rejected files are never written, and no scan row is created for them.
    pub fn upload(
        &self,
        user_id: i64,
        original_name: &str,
        contents: &[u8],
    ) -> Result<ScanDocument, PipelineError> {
        let stored = files::store_upload(&self.uploads_dir, user_id, original_name, contents)?;

        let conn = self.open()?;
        let stored_path = stored.to_string_lossy();
        let scan_id = repository::insert_scan(&conn, user_id, Some(stored_path.as_ref()))?;
        tracing::info!(scan_id, user_id, "scan uploaded");
        load_owned(&conn, scan_id, user_id)
    }

    pub fn get(&self, user_id: i64, scan_id: i64) -> Result<ScanDocument, PipelineError> {
        let conn = self.open()?;
        load_owned(&conn, scan_id, user_id)
    }

    /// Run OCR on the stored file and persist the parsed result.
    ///
    /// The scan is moved to `processing` first; when the provider call or
    /// parsing fails the scan lands in `failed` (from which analysis may be
    /// retried) and the provider error is returned to the caller.
    pub async fn analyze(&self, user_id: i64, scan_id: i64) -> Result<ScanDocument, PipelineError> {
        let file_path = {
            let conn = self.open()?;
            let scan = load_owned(&conn, scan_id, user_id)?;
            let file_path = scan.file_path.clone().ok_or_else(|| {
                PipelineError::InvalidState(format!("scan {scan_id} has no stored file"))
            })?;

            let moved = repository::transition_scan(
                &conn,
                scan_id,
                &ScanStatus::Processing,
                ScanStatus::ANALYZE_FROM,
            )?;
            if !moved {
                return Err(PipelineError::InvalidState(format!(
                    "analysis cannot start from status '{}'",
                    scan.status.as_str()
                )));
            }
            PathBuf::from(file_path)
        };

        tracing::info!(scan_id, "scan analysis started");
        let ocr = Arc::clone(&self.ocr);
        let ocr_result = match tokio::task::spawn_blocking(move || ocr.analyze(&file_path)).await {
            Ok(result) => result.map_err(PipelineError::from),
            Err(e) => Err(PipelineError::Task(e.to_string())),
        };

        let conn = self.open()?;
        let raw = match ocr_result {
            Ok(raw) => raw,
            Err(e) => {
                repository::transition_scan(
                    &conn,
                    scan_id,
                    &ScanStatus::Failed,
                    &[ScanStatus::Processing],
                )?;
                tracing::warn!(scan_id, error = %e, "scan analysis failed");
                return Err(e);
            }
        };

        let parsed = parse_ocr_result(&raw);
        let wrote = repository::store_analysis_success(
            &conn,
            scan_id,
            parsed.document_date,
            parsed.diagnosis.as_deref(),
            &parsed.drug_names,
            &parsed.full_text,
            &parsed.raw_payload,
        )?;
        if !wrote {
            return Err(PipelineError::InvalidState(format!(
                "scan {scan_id} left processing during analysis"
            )));
        }

        tracing::info!(
            scan_id,
            has_date = parsed.document_date.is_some(),
            text_length = parsed.full_text.len(),
            "scan analysis complete"
        );
        load_owned(&conn, scan_id, user_id)
    }

    /// Apply a manual correction over the stored result. Only fields the
    /// client sent are replaced; the scan moves to `updated`.
    pub fn correct(
        &self,
        user_id: i64,
        scan_id: i64,
        correction: &ScanCorrection,
    ) -> Result<ScanDocument, PipelineError> {
        let conn = self.open()?;
        let scan = load_owned(&conn, scan_id, user_id)?;
        if !scan.status.can_correct() {
            return Err(PipelineError::InvalidState(format!(
                "result cannot be corrected from status '{}'",
                scan.status.as_str()
            )));
        }

        let document_date = match correction.document_date.as_deref() {
            Some(raw) => Some(
                dates::parse_date(raw).map_err(|e| PipelineError::Validation(e.to_string()))?,
            ),
            None => scan.document_date,
        };
        let diagnosis = correction.diagnosis.clone().or_else(|| scan.diagnosis.clone());
        let drug_names = correction
            .drug_names
            .clone()
            .unwrap_or_else(|| scan.drug_names.clone());

        let wrote = repository::store_correction(
            &conn,
            scan_id,
            document_date,
            diagnosis.as_deref(),
            &drug_names,
        )?;
        if !wrote {
            return Err(PipelineError::InvalidState(format!(
                "scan {scan_id} changed state during correction"
            )));
        }

        tracing::info!(scan_id, "scan result corrected");
        load_owned(&conn, scan_id, user_id)
    }

    /// Commit a confirmed scan into the records (see `commit_scan`) and
    /// return it in its terminal `saved` state.
    pub fn save(&self, user_id: i64, scan_id: i64) -> Result<SaveOutcome, PipelineError> {
        let mut conn = self.open()?;
        let scan = load_owned(&conn, scan_id, user_id)?;
        if !scan.status.can_save() {
            return Err(PipelineError::InvalidState(format!(
                "scan cannot be saved from status '{}'",
                scan.status.as_str()
            )));
        }
        let document_date = scan.document_date.ok_or_else(|| {
            PipelineError::Validation(
                "scan has no document date; correct the result before saving".to_string(),
            )
        })?;

        let commit = crate::pipeline::commit::commit_scan(&mut conn, &scan, document_date)?;
        tracing::info!(
            scan_id,
            document_date = %document_date,
            prescriptions = commit.prescription_ids.len(),
            "scan saved to records"
        );
        let scan = load_owned(&conn, scan_id, user_id)?;
        Ok(SaveOutcome {
            scan,
            seeded_date: document_date,
            commit,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_owned(
    conn: &Connection,
    scan_id: i64,
    user_id: i64,
) -> Result<ScanDocument, PipelineError> {
    let scan = repository::get_scan(conn, scan_id)?.ok_or(PipelineError::NotFound(scan_id))?;
    if scan.owner_id != user_id {
        return Err(PipelineError::Forbidden(scan_id));
    }
    Ok(scan)
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Stand-in used when the provider env vars are absent at startup. The
/// server still boots and tracking keeps working; every analysis request
/// fails with a configuration error until the vars are set.
struct UnconfiguredOcr;

impl OcrClient for UnconfiguredOcr {
    fn analyze(&self, _file_path: &Path) -> Result<serde_json::Value, OcrError> {
        Err(OcrError::NotConfigured(
            "MEDISCAN_OCR_URL and MEDISCAN_OCR_SECRET",
        ))
    }
}

/// Build a `ScanPipeline` with the production OCR client, falling back to
/// `UnconfiguredOcr` when the environment is incomplete.
pub fn build_pipeline(db_path: PathBuf, uploads_dir: PathBuf) -> ScanPipeline {
    let ocr: Arc<dyn OcrClient + Send + Sync> = match ClovaOcrClient::from_env() {
        Ok(client) => {
            tracing::info!(timeout_secs = config::OCR_TIMEOUT_SECS, "OCR client ready");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "OCR provider not configured; analysis will fail");
            Arc::new(UnconfiguredOcr)
        }
    };
    ScanPipeline::new(db_path, uploads_dir, ocr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
