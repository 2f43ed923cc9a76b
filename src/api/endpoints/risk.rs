//! Risk assessment endpoint.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::RiskAssessment;
use crate::risk::assess_risk;

/// `GET /api/risk/:user_id`: missed-dose risk band for a profile.
pub async fn assess(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let conn = ctx.core.db()?;
    Ok(Json(assess_risk(&conn, &user_id)?))
}
