use rusqlite::{params, Connection};

use super::{optional, server_timestamp};
use crate::db::DatabaseError;
use crate::models::{WaterIntake, WaterIntakeRecord, DEFAULT_WATER_GOAL};

/// Merge-upsert today's water document for `user_id`. A missing goal
/// keeps the stored one (or the default on first write).
pub fn save_water_intake(
    conn: &Connection,
    user_id: &str,
    intake: &WaterIntake,
) -> Result<WaterIntakeRecord, DatabaseError> {
    conn.execute(
        "INSERT INTO water_intake (user_id, date, glasses, goal, timestamp)
         VALUES (?1, ?2, ?3, COALESCE(?4, ?5), ?6)
         ON CONFLICT(user_id) DO UPDATE SET
            date = excluded.date,
            glasses = excluded.glasses,
            goal = COALESCE(?4, water_intake.goal),
            timestamp = excluded.timestamp",
        params![
            user_id,
            intake.date,
            intake.glasses,
            intake.goal,
            DEFAULT_WATER_GOAL,
            server_timestamp(),
        ],
    )?;
    get_water_intake(conn, user_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "WaterIntake".into(),
        id: user_id.into(),
    })
}

pub fn get_water_intake(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<WaterIntakeRecord>, DatabaseError> {
    optional(conn.query_row(
        "SELECT user_id, date, glasses, goal, timestamp FROM water_intake WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(WaterIntakeRecord {
                user_id: row.get(0)?,
                date: row.get(1)?,
                glasses: row.get(2)?,
                goal: row.get(3)?,
                timestamp: row.get(4)?,
            })
        },
    ))
}
