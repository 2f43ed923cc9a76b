use serde::{Deserialize, Serialize};

use super::PrescriptionError;
use crate::models::{Medicine, MedicineStatus};

/// A normalized, not-yet-persisted medicine parsed from extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineCandidate {
    pub name: String,
    pub dosage: String,
    pub is_antibiotic: bool,
    pub times: Vec<String>,
    pub status: MedicineStatus,
}

/// Fixed result returned in demo mode. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoMedicine {
    pub name: String,
    pub is_antibiotic: bool,
}

/// Raw upload as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct PrescriptionUpload {
    pub profile_id: String,
    pub bytes: Vec<u8>,
    /// Original filename; may be empty.
    pub filename: String,
    /// Declared MIME type; may be empty.
    pub content_type: String,
}

/// What an upload produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    /// No credential configured: fixed demo list, nothing stored.
    Demo(Vec<DemoMedicine>),
    /// Medicines created for the target profile, in extraction order.
    Created(Vec<Medicine>),
}

/// Transport to a vision-capable chat model (allows mocking).
///
/// Implementations send one user turn made of `prompt` plus one image given
/// as a `data:` URL, and return the first response's text content.
pub trait VisionClient: Send + Sync {
    fn chat_with_image(
        &self,
        prompt: &str,
        image_data_url: &str,
        max_tokens: u32,
    ) -> Result<String, PrescriptionError>;
}
