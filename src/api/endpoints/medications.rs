//! Medication checklist endpoints.

use axum::extract::{Path, Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::dates;
use crate::db::open_database;
use crate::models::enums::IntakeStatus;
use crate::tracking::medication::{self, MedicationDay};
use crate::tracking::DaySummary;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub items: Vec<DaySummary>,
}

/// `GET /api/v1/medications/history` — per-day adherence, newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conn = open_database(&ctx.db_path)?;
    let items = medication::history(&conn, user.id, query.from.as_deref(), query.to.as_deref())?;
    Ok(Json(HistoryResponse { items }))
}

/// `GET /api/v1/medications/days/:date` — one day's checklist, seeded on read.
pub async fn day(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(date): Path<String>,
) -> Result<Json<MedicationDay>, ApiError> {
    let date = dates::parse_date(&date)?;
    let conn = open_database(&ctx.db_path)?;
    Ok(Json(medication::day(&conn, user.id, date)?))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Serialize)]
pub struct LogUpdateResponse {
    pub log_id: i64,
    pub updated: bool,
    pub day: MedicationDay,
}

/// `PATCH /api/v1/medications/logs/:log_id` — set one slot's status and
/// return the recomputed day.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(log_id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<LogUpdateResponse>, ApiError> {
    let status: IntakeStatus = update
        .status
        .parse()
        .map_err(|_| ApiError::Validation(format!("Unknown intake status: {}", update.status)))?;

    let conn = open_database(&ctx.db_path)?;
    let day = medication::set_status(&conn, user.id, log_id, status)?;
    Ok(Json(LogUpdateResponse {
        log_id,
        updated: true,
        day,
    }))
}
