use serde::Deserialize;

use super::types::MedicineCandidate;
use super::PrescriptionError;
use crate::models::MedicineStatus;

const UNKNOWN_MEDICINE_NAME: &str = "Unknown";

/// Frequency marker that selects the twice-daily schedule. Case-sensitive.
const TWICE_DAILY_MARKER: &str = "Twice";
const ONCE_DAILY_TIMES: &[&str] = &["08:00"];
const TWICE_DAILY_TIMES: &[&str] = &["08:00", "20:00"];

/// One element of the model's JSON array, before defaults are applied.
#[derive(Debug, Deserialize)]
struct RawExtractedMedicine {
    name: Option<String>,
    dosage: Option<String>,
    frequency: Option<String>,
    is_antibiotic: Option<bool>,
}

/// Parse the vision model's answer into normalized medicine candidates.
///
/// Output order follows the model's array. An empty array (the "illegible"
/// answer) yields no candidates; anything that is not a JSON array of
/// medicine objects is an `ExtractionFormat` error.
pub fn parse_extraction_response(raw: &str) -> Result<Vec<MedicineCandidate>, PrescriptionError> {
    let body = strip_code_fences(raw);

    let items: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| PrescriptionError::ExtractionFormat(e.to_string()))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw: RawExtractedMedicine = serde_json::from_value(value).map_err(|e| {
                PrescriptionError::ExtractionFormat(format!("item {index}: {e}"))
            })?;
            Ok(normalize(raw))
        })
        .collect()
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` opener and a trailing
/// closing fence, if present.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn normalize(raw: RawExtractedMedicine) -> MedicineCandidate {
    MedicineCandidate {
        name: raw.name.unwrap_or_else(|| UNKNOWN_MEDICINE_NAME.to_string()),
        dosage: raw.dosage.unwrap_or_default(),
        is_antibiotic: raw.is_antibiotic.unwrap_or(false),
        times: schedule_for_frequency(raw.frequency.as_deref()),
        status: MedicineStatus::Pending,
    }
}

/// Coarse dose-schedule inference: "Twice" anywhere in the frequency means
/// 08:00 and 20:00, everything else collapses to once daily at 08:00.
pub fn schedule_for_frequency(frequency: Option<&str>) -> Vec<String> {
    let times = match frequency {
        Some(f) if f.contains(TWICE_DAILY_MARKER) => TWICE_DAILY_TIMES,
        _ => ONCE_DAILY_TIMES,
    };
    times.iter().map(|t| t.to_string()).collect()
}
