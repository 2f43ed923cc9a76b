use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{AdherenceLog, AdherenceReport};

const ADHERENCE_COLUMNS: &str =
    "id, user_id, date, all_taken, total_meds, taken_meds, updated_at";

pub fn find_adherence_log(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<Option<AdherenceLog>, DatabaseError> {
    let log = conn
        .query_row(
            &format!(
                "SELECT {ADHERENCE_COLUMNS} FROM adherence_log
                 WHERE user_id = ?1 AND date = ?2 ORDER BY id LIMIT 1"
            ),
            params![user_id, date],
            adherence_from_row,
        )
        .optional()?;
    Ok(log)
}

/// Look up the (user, date) aggregate and overwrite it, or insert a new one.
///
/// Both steps run in one transaction; callers must not race two writers on
/// the same (user, date).
pub fn upsert_adherence_log(
    conn: &Connection,
    report: &AdherenceReport,
) -> Result<AdherenceLog, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let now = Utc::now();

    let id = match find_adherence_log(&tx, &report.user_id, &report.date)? {
        Some(existing) => {
            tx.execute(
                "UPDATE adherence_log
                 SET all_taken = ?2, total_meds = ?3, taken_meds = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    existing.id,
                    report.all_taken,
                    report.total_meds,
                    report.taken_meds,
                    now,
                ],
            )?;
            existing.id
        }
        None => {
            tx.execute(
                "INSERT INTO adherence_log (user_id, date, all_taken, total_meds, taken_meds, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    report.user_id,
                    report.date,
                    report.all_taken,
                    report.total_meds,
                    report.taken_meds,
                    now,
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    let log = tx
        .query_row(
            &format!("SELECT {ADHERENCE_COLUMNS} FROM adherence_log WHERE id = ?1"),
            params![id],
            adherence_from_row,
        )?;
    tx.commit()?;
    Ok(log)
}

pub fn list_adherence_logs(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<AdherenceLog>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ADHERENCE_COLUMNS} FROM adherence_log WHERE user_id = ?1 ORDER BY date, id"
    ))?;
    let rows = stmt.query_map(params![user_id], adherence_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Sum of expected doses and of missed doses (`total - taken`, floored at 0
/// per day) across a user's whole history.
///
/// Counts are stored as reported, so the sums saturate instead of
/// overflowing.
pub fn dose_totals(conn: &Connection, user_id: &str) -> Result<(u64, u64), DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT total_meds, taken_meds FROM adherence_log WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut total: u64 = 0;
    let mut missed: u64 = 0;
    for row in rows {
        let (total_meds, taken_meds) = row?;
        total = total.saturating_add(total_meds.max(0) as u64);
        missed = missed.saturating_add(total_meds.saturating_sub(taken_meds).max(0) as u64);
    }
    Ok((total, missed))
}

fn adherence_from_row(row: &rusqlite::Row<'_>) -> Result<AdherenceLog, rusqlite::Error> {
    Ok(AdherenceLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        all_taken: row.get(3)?,
        total_meds: row.get(4)?,
        taken_meds: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
