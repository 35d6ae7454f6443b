use rusqlite::{params, Connection};

use super::{optional, server_timestamp};
use crate::db::DatabaseError;
use crate::models::{MedicationItem, MedicationRecord, MedicationSchedule};

/// Replace the user's medication schedule (one document per user).
pub fn save_medications(
    conn: &Connection,
    user_id: &str,
    schedule: &MedicationSchedule,
) -> Result<MedicationRecord, DatabaseError> {
    let items_json =
        serde_json::to_string(&schedule.items).map_err(|e| DatabaseError::InvalidJson {
            field: "medications.items".into(),
            reason: e.to_string(),
        })?;
    let now = server_timestamp();
    conn.execute(
        "INSERT INTO medications (user_id, items, timestamp) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET items = excluded.items, timestamp = excluded.timestamp",
        params![user_id, items_json, now],
    )?;
    Ok(MedicationRecord {
        user_id: user_id.to_string(),
        items: schedule.items.clone(),
        timestamp: now,
    })
}

pub fn get_medications(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<MedicationRecord>, DatabaseError> {
    let row = optional(conn.query_row(
        "SELECT items, timestamp FROM medications WHERE user_id = ?1",
        params![user_id],
        |row| Ok((row.get::<_, String>(0)?, row.get(1)?)),
    ))?;

    row.map(|(items_json, timestamp)| {
        let items: Vec<MedicationItem> =
            serde_json::from_str(&items_json).map_err(|e| DatabaseError::InvalidJson {
                field: "medications.items".into(),
                reason: e.to_string(),
            })?;
        Ok(MedicationRecord {
            user_id: user_id.to_string(),
            items,
            timestamp,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn item(name: &str) -> MedicationItem {
        MedicationItem {
            name: name.into(),
            dose: Some("10mg".into()),
            times: vec!["08:00".into()],
            taken: false,
        }
    }

    #[test]
    fn save_replaces_previous_schedule() {
        let conn = open_memory_database().unwrap();
        save_medications(&conn, "u1", &MedicationSchedule { items: vec![item("A"), item("B")] }).unwrap();
        save_medications(&conn, "u1", &MedicationSchedule { items: vec![item("C")] }).unwrap();

        let stored = get_medications(&conn, "u1").unwrap().unwrap();
        assert_eq!(stored.items, vec![item("C")]);
    }

    #[test]
    fn missing_schedule_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_medications(&conn, "u1").unwrap().is_none());
    }

    #[test]
    fn corrupt_items_surface_invalid_json() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO medications (user_id, items, timestamp) VALUES ('u1', 'not json', '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();
        let err = get_medications(&conn, "u1").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidJson { .. }));
    }
}
