//! Daily adherence summaries.
//!
//! Clients report one aggregate per profile per calendar day. A later
//! report for the same day replaces the earlier one.

use chrono::NaiveDate;
use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::{AdherenceLog, AdherenceReport};

#[derive(Error, Debug)]
pub enum AdherenceError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Record a day's dosing summary, overwriting any earlier report for the
/// same (profile, date). Counts are stored as reported.
pub fn upsert_daily_summary(
    conn: &Connection,
    mut report: AdherenceReport,
) -> Result<AdherenceLog, AdherenceError> {
    let date = NaiveDate::parse_from_str(report.date.trim(), "%Y-%m-%d")
        .map_err(|_| AdherenceError::InvalidDate(report.date.clone()))?;
    report.date = date.format("%Y-%m-%d").to_string();

    let log = db::upsert_adherence_log(conn, &report)?;
    tracing::info!(
        user_id = %log.user_id,
        date = %log.date,
        total = log.total_meds,
        taken = log.taken_meds,
        "Adherence summary recorded"
    );
    Ok(log)
}

/// All daily summaries for a profile, oldest first.
pub fn adherence_history(conn: &Connection, user_id: &str) -> Result<Vec<AdherenceLog>, AdherenceError> {
    Ok(db::list_adherence_logs(conn, user_id)?)
}
