use rusqlite::Connection;

use super::types::MedicineCandidate;
use crate::db::{self, DatabaseError};
use crate::models::{Medicine, MedicineInput};

/// Create one medicine per candidate for `user_id`, in order.
///
/// Each insert commits on its own: a failure part-way leaves the earlier
/// records in place. No deduplication against existing medicines, so a
/// repeated upload of the same prescription creates duplicates.
pub fn persist_candidates(
    conn: &Connection,
    user_id: &str,
    candidates: Vec<MedicineCandidate>,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut created = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let input = MedicineInput {
            user_id: user_id.to_string(),
            name: candidate.name,
            dosage: Some(candidate.dosage),
            is_antibiotic: candidate.is_antibiotic,
            status: candidate.status,
            urgent: false,
            times: candidate.times,
        };
        created.push(db::insert_medicine(conn, &input)?);
    }

    tracing::info!(user_id, count = created.len(), "Persisted extracted medicines");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{MedicineStatus, ProfileInput};

    fn candidate(name: &str, times: &[&str]) -> MedicineCandidate {
        MedicineCandidate {
            name: name.into(),
            dosage: "250mg".into(),
            is_antibiotic: name == "Amoxicillin",
            times: times.iter().map(|t| t.to_string()).collect(),
            status: MedicineStatus::Pending,
        }
    }

    fn db_with_profile(id: &str) -> Connection {
        let conn = open_memory_database().unwrap();
        db::upsert_profile(&conn, &ProfileInput { id: id.into(), age: Some(67), ..Default::default() })
            .unwrap();
        conn
    }

    #[test]
    fn creates_one_record_per_candidate_in_order() {
        let conn = db_with_profile("u1");
        let created = persist_candidates(
            &conn,
            "u1",
            vec![
                candidate("Amoxicillin", &["08:00"]),
                candidate("Metformin", &["08:00", "20:00"]),
            ],
        )
        .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].name, "Amoxicillin");
        assert!(created[0].is_antibiotic);
        assert_eq!(created[1].times, vec!["08:00", "20:00"]);
        assert!(created.iter().all(|m| m.user_id == "u1" && !m.urgent));
        assert!(created[1].id > created[0].id);
    }

    #[test]
    fn repeated_batches_create_duplicates() {
        let conn = db_with_profile("u1");
        let batch = vec![candidate("Paracetamol", &["08:00"])];
        persist_candidates(&conn, "u1", batch.clone()).unwrap();
        persist_candidates(&conn, "u1", batch).unwrap();

        let all = db::list_medicines_for_user(&conn, "u1").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, all[1].name);
    }

    #[test]
    fn empty_batch_creates_nothing() {
        let conn = db_with_profile("u1");
        assert!(persist_candidates(&conn, "u1", vec![]).unwrap().is_empty());
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = persist_candidates(&conn, "ghost", vec![candidate("X", &["08:00"])]).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
