//! Profile endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{Profile, ProfileInput};

/// `POST /api/profile`: create or update a profile by identifier.
pub async fn upsert(
    State(ctx): State<ApiContext>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    if input.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Profile id is required".into()));
    }
    if input.age.is_some_and(|age| age < 0) {
        return Err(ApiError::BadRequest("Age cannot be negative".into()));
    }

    let conn = ctx.core.db()?;
    let profile = db::upsert_profile(&conn, &input)?;
    tracing::info!(user_id = %profile.id, is_senior = profile.is_senior, "Profile saved");
    Ok(Json(profile))
}

/// `GET /api/profiles/:user_id`: read one profile.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let conn = ctx.core.db()?;
    db::get_profile(&conn, &user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Profile '{user_id}' not found")))
}
