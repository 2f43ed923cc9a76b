//! Adherence log endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::adherence::{adherence_history, upsert_daily_summary};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{AdherenceLog, AdherenceReport};

/// `POST /api/adherence_log`: record (or overwrite) one day's summary.
pub async fn record(
    State(ctx): State<ApiContext>,
    Json(report): Json<AdherenceReport>,
) -> Result<Json<AdherenceLog>, ApiError> {
    if report.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".into()));
    }

    let conn = ctx.core.db()?;
    Ok(Json(upsert_daily_summary(&conn, report)?))
}

/// `GET /api/adherence_log/:user_id`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AdherenceLog>>, ApiError> {
    let conn = ctx.core.db()?;
    Ok(Json(adherence_history(&conn, &user_id)?))
}
