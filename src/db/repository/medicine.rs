use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::profile::profile_exists;
use crate::db::DatabaseError;
use crate::models::{Medicine, MedicineInput, MedicineStatus, MedicineUpdate};

const MEDICINE_COLUMNS: &str =
    "id, user_id, name, dosage, is_antibiotic, status, urgent, times, created_at";

/// Insert one medicine for an existing profile and return the stored record.
pub fn insert_medicine(conn: &Connection, input: &MedicineInput) -> Result<Medicine, DatabaseError> {
    if !profile_exists(conn, &input.user_id)? {
        return Err(DatabaseError::not_found("Profile", &input.user_id));
    }

    conn.execute(
        "INSERT INTO medicines (user_id, name, dosage, is_antibiotic, status, urgent, times, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.user_id,
            input.name,
            input.dosage.as_deref().unwrap_or(""),
            input.is_antibiotic,
            input.status.as_str(),
            input.urgent,
            serde_json::to_string(&input.times)?,
            Utc::now(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_medicine(conn, id)?.ok_or_else(|| DatabaseError::not_found("Medicine", id))
}

pub fn get_medicine(conn: &Connection, id: i64) -> Result<Option<Medicine>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
            params![id],
            medicine_row_from_rusqlite,
        )
        .optional()?;
    row.map(medicine_from_row).transpose()
}

pub fn list_medicines_for_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE user_id = ?1 ORDER BY id"
    ))?;

    let rows = stmt.query_map(params![user_id], medicine_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row?)?);
    }
    Ok(meds)
}

/// Merge the provided fields into an existing medicine.
pub fn update_medicine(
    conn: &Connection,
    id: i64,
    update: MedicineUpdate,
) -> Result<Medicine, DatabaseError> {
    let mut medicine =
        get_medicine(conn, id)?.ok_or_else(|| DatabaseError::not_found("Medicine", id))?;
    update.apply_to(&mut medicine);

    conn.execute(
        "UPDATE medicines SET name = ?2, dosage = ?3, status = ?4, urgent = ?5, times = ?6
         WHERE id = ?1",
        params![
            id,
            medicine.name,
            medicine.dosage,
            medicine.status.as_str(),
            medicine.urgent,
            serde_json::to_string(&medicine.times)?,
        ],
    )?;
    Ok(medicine)
}

pub fn delete_medicine(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM medicines WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Medicine", id));
    }
    Ok(())
}

// Internal row type for Medicine mapping
struct MedicineRow {
    id: i64,
    user_id: String,
    name: String,
    dosage: String,
    is_antibiotic: bool,
    status: String,
    urgent: bool,
    times: String,
    created_at: DateTime<Utc>,
}

fn medicine_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicineRow, rusqlite::Error> {
    Ok(MedicineRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        is_antibiotic: row.get(4)?,
        status: row.get(5)?,
        urgent: row.get(6)?,
        times: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn medicine_from_row(row: MedicineRow) -> Result<Medicine, DatabaseError> {
    Ok(Medicine {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        dosage: row.dosage,
        is_antibiotic: row.is_antibiotic,
        status: MedicineStatus::from_str(&row.status)?,
        urgent: row.urgent,
        times: serde_json::from_str(&row.times)?,
        created_at: row.created_at,
    })
}
