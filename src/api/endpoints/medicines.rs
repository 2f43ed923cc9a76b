//! Medicine CRUD endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{Medicine, MedicineInput, MedicineUpdate};

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: i64,
}

/// `GET /api/medicines/:user_id`: all medicines for a profile.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Medicine>>, ApiError> {
    let conn = ctx.core.db()?;
    Ok(Json(db::list_medicines_for_user(&conn, &user_id)?))
}

/// `POST /api/medicines`: add one medicine to an existing profile.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<MedicineInput>,
) -> Result<Json<Medicine>, ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Medicine name is required".into()));
    }

    let conn = ctx.core.db()?;
    let medicine = db::insert_medicine(&conn, &input)?;
    tracing::info!(id = medicine.id, user_id = %medicine.user_id, "Medicine added");
    Ok(Json(medicine))
}

/// `PATCH /api/medicines/:id`: merge the provided fields into a medicine.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(update): Json<MedicineUpdate>,
) -> Result<Json<Medicine>, ApiError> {
    let conn = ctx.core.db()?;
    let medicine = db::update_medicine(&conn, id, update)?;
    tracing::debug!(id, status = %medicine.status, "Medicine updated");
    Ok(Json(medicine))
}

/// `DELETE /api/medicines/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conn = ctx.core.db()?;
    db::delete_medicine(&conn, id)?;
    tracing::info!(id, "Medicine deleted");
    Ok(Json(DeleteResponse {
        message: "Medicine deleted successfully",
        id,
    }))
}
