//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `"live"` when uploads reach the vision model, `"demo"` otherwise.
    pub extraction: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`: liveness and extraction mode.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let extraction = if ctx.core.extraction_live() { "live" } else { "demo" };

    Ok(Json(HealthResponse {
        status: "ok",
        extraction,
        version: crate::config::APP_VERSION,
    }))
}
