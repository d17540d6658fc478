//! Health checklist endpoints — same shapes as medications, without the
//! intake timestamp.

use axum::extract::{Path, Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::dates;
use crate::db::open_database;
use crate::models::enums::ActivityStatus;
use crate::tracking::health::{self, HealthDay};
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

/// `GET /api/v1/health/history` — per-day completion, newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conn = open_database(&ctx.db_path)?;
    let items = health::history(&conn, user.id, query.from.as_deref(), query.to.as_deref())?;
    Ok(Json(HistoryResponse { items }))
}

/// `GET /api/v1/health/days/:date` — one day's checklist, seeded on read.
pub async fn day(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(date): Path<String>,
) -> Result<Json<HealthDay>, ApiError> {
    let date = dates::parse_date(&date)?;
    let conn = open_database(&ctx.db_path)?;
    Ok(Json(health::day(&conn, user.id, date)?))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Serialize)]
pub struct LogUpdateResponse {
    pub log_id: i64,
    pub updated: bool,
    pub day: HealthDay,
}

/// `PATCH /api/v1/health/logs/:log_id` — set one slot's status and return
/// the recomputed day.
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(log_id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<LogUpdateResponse>, ApiError> {
    let status: ActivityStatus = update
        .status
        .parse()
        .map_err(|_| ApiError::Validation(format!("Unknown activity status: {}", update.status)))?;

    let conn = open_database(&ctx.db_path)?;
    let day = health::set_status(&conn, user.id, log_id, status)?;
    Ok(Json(LogUpdateResponse {
        log_id,
        updated: true,
        day,
    }))
}
