use rusqlite::{params, Connection};
use uuid::Uuid;

use super::server_timestamp;
use crate::db::DatabaseError;
use crate::models::{MoodEntry, MoodRecord};

/// Mood entries are append-only.
pub fn insert_mood(
    conn: &Connection,
    user_id: &str,
    entry: &MoodEntry,
) -> Result<MoodRecord, DatabaseError> {
    let record = MoodRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        entry: entry.clone(),
        timestamp: server_timestamp(),
    };
    conn.execute(
        "INSERT INTO mood_entries (id, user_id, mood, score, note, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id,
            record.user_id,
            entry.mood,
            entry.score,
            entry.note,
            record.timestamp,
        ],
    )?;
    Ok(record)
}

pub fn recent_moods(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> Result<Vec<MoodRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, mood, score, note, timestamp FROM mood_entries
         WHERE user_id = ?1
         ORDER BY timestamp DESC, rowid DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit as i64], |row| {
        Ok(MoodRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            entry: MoodEntry {
                mood: row.get(2)?,
                score: row.get(3)?,
                note: row.get(4)?,
            },
            timestamp: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn entry(mood: &str, score: u8) -> MoodEntry {
        MoodEntry {
            mood: mood.into(),
            score,
            note: None,
        }
    }

    #[test]
    fn entries_accumulate_newest_first() {
        let conn = open_memory_database().unwrap();
        insert_mood(&conn, "u1", &entry("calm", 7)).unwrap();
        insert_mood(&conn, "u1", &entry("tired", 4)).unwrap();

        let moods = recent_moods(&conn, "u1", 10).unwrap();
        assert_eq!(moods.len(), 2);
        assert_eq!(moods[0].entry.mood, "tired");
    }

    #[test]
    fn score_out_of_range_rejected_by_schema() {
        let conn = open_memory_database().unwrap();
        assert!(insert_mood(&conn, "u1", &entry("wild", 11)).is_err());
    }
}
