//! Missed-dose risk assessment.
//!
//! A missed dose is one expected dose not taken on a reported day:
//! `max(total_meds - taken_meds, 0)`, summed over the profile's entire
//! adherence history.

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::{RiskAssessment, RiskLevel};

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub fn assess_risk(conn: &Connection, user_id: &str) -> Result<RiskAssessment, RiskError> {
    if !db::profile_exists(conn, user_id)? {
        return Err(RiskError::ProfileNotFound(user_id.to_string()));
    }

    let (total_doses, missed_doses) = db::dose_totals(conn, user_id)?;
    let risk_level = RiskLevel::from_missed(missed_doses);

    tracing::debug!(user_id, total_doses, missed_doses, risk = %risk_level, "Risk assessed");

    Ok(RiskAssessment {
        user_id: user_id.to_string(),
        total_doses,
        missed_doses,
        risk_level,
    })
}
