//! Scan endpoints — upload, analysis, correction, save.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::models::enums::ScanStatus;
use crate::models::{ScanCorrection, ScanDocument};

/// Minimal response for operations that only move a scan between states.
#[derive(Serialize)]
pub struct ScanStatusResponse {
    pub scan_id: i64,
    pub status: ScanStatus,
}

/// Full extraction view, returned by GET and after corrections.
#[derive(Serialize)]
pub struct ScanResultResponse {
    pub scan_id: i64,
    pub status: ScanStatus,
    pub analyzed_at: Option<chrono::NaiveDateTime>,
    pub document_date: Option<chrono::NaiveDate>,
    pub diagnosis: Option<String>,
    pub drug_names: Vec<String>,
}

impl From<ScanDocument> for ScanResultResponse {
    fn from(scan: ScanDocument) -> Self {
        Self {
            scan_id: scan.id,
            status: scan.status,
            analyzed_at: scan.analyzed_at,
            document_date: scan.document_date,
            diagnosis: scan.diagnosis,
            drug_names: scan.drug_names,
        }
    }
}

/// `POST /api/v1/scans/upload` — store a prescription image, create its scan.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ScanStatusResponse>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::Validation("File part has no filename".into()))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read file data: {e}")))?;
            file = Some((name, bytes.to_vec()));
        }
    }

    let (name, bytes) = file.ok_or_else(|| ApiError::Validation("Missing 'file' part".into()))?;

    let scan = ctx.pipeline.upload(user.id, &name, &bytes)?;
    Ok((
        StatusCode::CREATED,
        Json(ScanStatusResponse {
            scan_id: scan.id,
            status: scan.status,
        }),
    ))
}

/// `POST /api/v1/scans/:scan_id/analyze` — run OCR, store extracted fields.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(scan_id): Path<i64>,
) -> Result<Json<ScanStatusResponse>, ApiError> {
    let scan = ctx.pipeline.analyze(user.id, scan_id).await?;
    Ok(Json(ScanStatusResponse {
        scan_id: scan.id,
        status: scan.status,
    }))
}

/// `GET /api/v1/scans/:scan_id` — current status and extracted fields.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(scan_id): Path<i64>,
) -> Result<Json<ScanResultResponse>, ApiError> {
    let scan = ctx.pipeline.get(user.id, scan_id)?;
    Ok(Json(scan.into()))
}

/// `PATCH /api/v1/scans/:scan_id/result` — apply a manual correction.
pub async fn correct(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(scan_id): Path<i64>,
    Json(correction): Json<ScanCorrection>,
) -> Result<Json<ScanResultResponse>, ApiError> {
    let scan = ctx.pipeline.correct(user.id, scan_id, &correction)?;
    Ok(Json(scan.into()))
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub scan_id: i64,
    pub saved: bool,
    pub seeded_date: chrono::NaiveDate,
    pub created_prescriptions: usize,
}

/// `POST /api/v1/scans/:scan_id/save` — reconcile into prescriptions and
/// tracking days.
pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(scan_id): Path<i64>,
) -> Result<Json<SaveResponse>, ApiError> {
    let outcome = ctx.pipeline.save(user.id, scan_id)?;
    Ok(Json(SaveResponse {
        scan_id: outcome.scan.id,
        saved: true,
        seeded_date: outcome.seeded_date,
        created_prescriptions: outcome.commit.prescription_ids.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_scan() -> ScanDocument {
        ScanDocument {
            id: 7,
            owner_id: 1,
            status: ScanStatus::Done,
            file_path: Some("/tmp/rx.jpg".into()),
            analyzed_at: None,
            document_date: NaiveDate::from_ymd_opt(2026, 2, 19),
            diagnosis: None,
            drug_names: vec![],
            raw_text: Some("처방일자 2026.02.19".into()),
            raw_payload: None,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    #[test]
    fn result_response_serializes_dates_as_iso() {
        let response: ScanResultResponse = sample_scan().into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["scan_id"], 7);
        assert_eq!(json["status"], "done");
        assert_eq!(json["document_date"], "2026-02-19");
        assert!(json["diagnosis"].is_null());
        assert_eq!(json["drug_names"], serde_json::json!([]));
    }

    #[test]
    fn result_response_never_exposes_raw_payload() {
        let response: ScanResultResponse = sample_scan().into();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("raw_text").is_none());
        assert!(json.get("raw_payload").is_none());
        assert!(json.get("file_path").is_none());
    }
}
