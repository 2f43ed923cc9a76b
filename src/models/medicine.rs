use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::MedicineStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub is_antibiotic: bool,
    pub status: MedicineStatus,
    pub urgent: bool,
    /// Daily dosing schedule as `HH:MM` strings, in order.
    pub times: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new medicine, from direct input or from the ingestion pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicineInput {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub is_antibiotic: bool,
    #[serde(default)]
    pub status: MedicineStatus,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub times: Vec<String>,
}

/// Partial update; `None` means "leave as is".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub status: Option<MedicineStatus>,
    pub urgent: Option<bool>,
    pub times: Option<Vec<String>>,
}

impl MedicineUpdate {
    pub fn apply_to(self, medicine: &mut Medicine) {
        if let Some(name) = self.name {
            medicine.name = name;
        }
        if let Some(dosage) = self.dosage {
            medicine.dosage = dosage;
        }
        if let Some(status) = self.status {
            medicine.status = status;
        }
        if let Some(urgent) = self.urgent {
            medicine.urgent = urgent;
        }
        if let Some(times) = self.times {
            medicine.times = times;
        }
    }
}
