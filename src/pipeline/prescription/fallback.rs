//! Demo-mode selection for uploads when no extraction credential is set.
//!
//! Keeps the system demonstrable offline. Never calls the vision service and
//! never touches the database.

use super::types::DemoMedicine;

/// Filename marker (case-insensitive) that selects the antibiotic demo set.
const DEMO_ANTIBIOTIC_MARKER: &str = "demo1";

const DEMO_ANTIBIOTIC_SET: &[(&str, bool)] = &[("Amoxicillin", true), ("Paracetamol", false)];
const DEMO_DEFAULT_SET: &[(&str, bool)] = &[("Paracetamol", false), ("Ibuprofen", false)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Credential present: run the real extraction path.
    Proceed,
    /// No credential: return this fixed list instead.
    Demo(Vec<DemoMedicine>),
}

/// Decide between live extraction and the demo list.
pub fn select_mode(credential_present: bool, filename: &str) -> ExtractionMode {
    if credential_present {
        return ExtractionMode::Proceed;
    }

    tracing::warn!(
        filename,
        "Extraction service credential is missing, returning demo prescription"
    );
    ExtractionMode::Demo(demo_medicines(filename))
}

/// Fixed demo list for a filename.
pub fn demo_medicines(filename: &str) -> Vec<DemoMedicine> {
    let set = if filename.to_lowercase().contains(DEMO_ANTIBIOTIC_MARKER) {
        DEMO_ANTIBIOTIC_SET
    } else {
        DEMO_DEFAULT_SET
    };

    set.iter()
        .map(|(name, is_antibiotic)| DemoMedicine {
            name: (*name).to_string(),
            is_antibiotic: *is_antibiotic,
        })
        .collect()
}
