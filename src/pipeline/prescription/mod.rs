//! Prescription ingestion: uploaded image → extracted text → normalized
//! candidates → medicine records.
//!
//! Stages, leaves first:
//! - `fallback`: demo results when no service credential is configured
//! - `vision`: the external vision-model call (encoding, prompt, transport)
//! - `parser`: fence stripping, JSON parsing, schedule/flag normalization
//! - `writer`: one medicine record per candidate
//! - `orchestrator`: wires the stages together per upload

pub mod types;
pub mod fallback;
pub mod vision;
pub mod parser;
pub mod writer;
pub mod orchestrator;

pub use types::*;
pub use fallback::*;
pub use vision::*;
pub use parser::*;
pub use writer::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("No profile available: {0}")]
    ProfileUnavailable(String),

    #[error("Uploaded file could not be read: {0}")]
    UnreadableFile(String),

    #[error("Extraction service failed: {0}")]
    ExtractionFailed(String),

    #[error("Extraction output is not a medicine list: {0}")]
    ExtractionFormat(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Database lock poisoned")]
    LockPoisoned,
}
