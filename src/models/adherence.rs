use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::RiskLevel;

/// Daily aggregate: one row per (user_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdherenceLog {
    pub id: i64,
    pub user_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub all_taken: bool,
    pub total_meds: i64,
    pub taken_meds: i64,
    pub updated_at: DateTime<Utc>,
}

/// A client's report of one day's dosing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdherenceReport {
    pub user_id: String,
    pub date: String,
    pub all_taken: bool,
    pub total_meds: i64,
    pub taken_meds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub user_id: String,
    pub total_doses: u64,
    pub missed_doses: u64,
    pub risk_level: RiskLevel,
}
