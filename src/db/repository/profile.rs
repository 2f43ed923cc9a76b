use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{is_senior_age, Profile, ProfileInput};

const PROFILE_COLUMNS: &str = "id, full_name, age, gender, is_senior, created_at";

pub fn get_profile(conn: &Connection, id: &str) -> Result<Option<Profile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id],
            profile_from_row,
        )
        .optional()?;
    Ok(profile)
}

pub fn profile_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)",
        params![id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

/// Create or update a profile keyed on its external identifier.
///
/// On update only the provided fields change; `is_senior` is recomputed
/// whenever an age is supplied.
pub fn upsert_profile(conn: &Connection, input: &ProfileInput) -> Result<Profile, DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    match get_profile(&tx, &input.id)? {
        Some(mut existing) => {
            if let Some(age) = input.age {
                existing.age = age;
                existing.is_senior = is_senior_age(age);
            }
            if let Some(name) = &input.full_name {
                existing.full_name = Some(name.clone());
            }
            if let Some(gender) = &input.gender {
                existing.gender = Some(gender.clone());
            }
            tx.execute(
                "UPDATE profiles SET full_name = ?2, age = ?3, gender = ?4, is_senior = ?5
                 WHERE id = ?1",
                params![
                    existing.id,
                    existing.full_name,
                    existing.age,
                    existing.gender,
                    existing.is_senior,
                ],
            )?;
        }
        None => {
            let age = input.age.unwrap_or(0);
            tx.execute(
                "INSERT INTO profiles (id, full_name, age, gender, is_senior, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.id,
                    input.full_name,
                    age,
                    input.gender,
                    is_senior_age(age),
                    Utc::now(),
                ],
            )?;
        }
    }

    let profile = get_profile(&tx, &input.id)?
        .ok_or_else(|| DatabaseError::not_found("Profile", &input.id))?;
    tx.commit()?;
    Ok(profile)
}

fn profile_from_row(row: &rusqlite::Row<'_>) -> Result<Profile, rusqlite::Error> {
    Ok(Profile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        is_senior: row.get(4)?,
        created_at: row.get(5)?,
    })
}
