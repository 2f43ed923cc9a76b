use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Age from which a patient is treated as a senior.
pub const SENIOR_AGE: i64 = 60;

/// Senior status is always derived from age, never stored independently.
pub fn is_senior_age(age: i64) -> bool {
    age >= SENIOR_AGE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Identifier issued by the external auth provider.
    pub id: String,
    pub full_name: Option<String>,
    pub age: i64,
    pub gender: Option<String>,
    pub is_senior: bool,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload. Absent fields leave stored values untouched on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub id: String,
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}
