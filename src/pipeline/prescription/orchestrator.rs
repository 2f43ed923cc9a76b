use std::sync::Mutex;

use rusqlite::Connection;

use super::fallback::{select_mode, ExtractionMode};
use super::parser::parse_extraction_response;
use super::types::{IngestOutcome, PrescriptionUpload};
use super::vision::PrescriptionReader;
use super::writer::persist_candidates;
use super::PrescriptionError;
use crate::db;

/// Run one prescription upload through the pipeline.
///
/// Without a reader (no credential) the demo list is returned and nothing
/// else happens. Otherwise the target profile must exist, the image is sent
/// to the vision model, the answer is parsed and each candidate is stored.
/// The database lock is released while the vision call is in flight.
pub fn ingest_prescription(
    store: &Mutex<Connection>,
    reader: Option<&PrescriptionReader>,
    upload: PrescriptionUpload,
) -> Result<IngestOutcome, PrescriptionError> {
    let _span = tracing::info_span!(
        "ingest_prescription",
        profile_id = %upload.profile_id,
        filename = %upload.filename,
        size = upload.bytes.len(),
    )
    .entered();

    let reader = match (select_mode(reader.is_some(), &upload.filename), reader) {
        (ExtractionMode::Proceed, Some(reader)) => reader,
        (ExtractionMode::Demo(items), _) => return Ok(IngestOutcome::Demo(items)),
        (ExtractionMode::Proceed, None) => {
            return Err(PrescriptionError::ExtractionFailed(
                "no extraction client configured".into(),
            ))
        }
    };

    {
        let conn = store.lock().map_err(|_| PrescriptionError::LockPoisoned)?;
        if upload.profile_id.trim().is_empty() || !db::profile_exists(&conn, &upload.profile_id)? {
            return Err(PrescriptionError::ProfileUnavailable(format!(
                "profile '{}' does not exist, create a profile first",
                upload.profile_id
            )));
        }
    }

    if upload.bytes.is_empty() {
        return Err(PrescriptionError::UnreadableFile("file is empty".into()));
    }

    let raw = reader.read(&upload.bytes, &upload.content_type)?;
    let candidates = parse_extraction_response(&raw).inspect_err(|e| {
        tracing::error!(error = %e, response_len = raw.len(), "Extraction output rejected");
    })?;

    if candidates.is_empty() {
        tracing::info!("Prescription illegible, no medicines extracted");
    }

    let conn = store.lock().map_err(|_| PrescriptionError::LockPoisoned)?;
    let created = persist_candidates(&conn, &upload.profile_id, candidates)?;
    Ok(IngestOutcome::Created(created))
}
