//! Prescription upload endpoint.
//!
//! `POST /api/prescriptions/upload` takes a multipart form with a `profile_id`
//! text field and a `file` image field, then runs the ingestion pipeline on a
//! blocking thread (the vision call uses a blocking HTTP client).

use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::prescription::{ingest_prescription, IngestOutcome, PrescriptionUpload};

/// Upper bound on the request body, multipart overhead included.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// `POST /api/prescriptions/upload`: extract medicines from a prescription
/// image. Returns the created medicines, or the demo list when no extraction
/// credential is configured.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<IngestOutcome>, ApiError> {
    let mut profile_id: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "profile_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable profile_id: {e}")))?;
                profile_id = Some(text.trim().to_string());
            }
            "file" => {
                let filename = field.file_name().unwrap_or("prescription").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let profile_id =
        profile_id.ok_or_else(|| ApiError::BadRequest("Missing 'profile_id' field".into()))?;
    let (filename, content_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".into()))?;

    let upload = PrescriptionUpload {
        profile_id,
        bytes,
        filename,
        content_type,
    };

    let core = ctx.core.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        ingest_prescription(core.db_mutex(), core.reader(), upload)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Ingestion task failed: {e}")))??;

    Ok(Json(outcome))
}
