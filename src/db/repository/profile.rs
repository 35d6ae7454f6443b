use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{optional, server_timestamp};
use crate::db::DatabaseError;
use crate::models::UserProfile;

/// Merge-upsert the profile document for `user_id`. An absent gender
/// keeps whatever was stored before.
pub fn save_profile(
    conn: &Connection,
    user_id: &str,
    profile: &UserProfile,
) -> Result<NaiveDateTime, DatabaseError> {
    let now = server_timestamp();
    conn.execute(
        "INSERT INTO profiles (user_id, name, age, height, weight, gender, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(user_id) DO UPDATE SET
            name = excluded.name,
            age = excluded.age,
            height = excluded.height,
            weight = excluded.weight,
            gender = COALESCE(excluded.gender, profiles.gender),
            timestamp = excluded.timestamp",
        params![
            user_id,
            profile.name,
            profile.age,
            profile.height,
            profile.weight,
            profile.gender,
            now,
        ],
    )?;
    Ok(now)
}

pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
    optional(conn.query_row(
        "SELECT name, age, height, weight, gender FROM profiles WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(UserProfile {
                name: row.get(0)?,
                age: row.get(1)?,
                height: row.get(2)?,
                weight: row.get(3)?,
                gender: row.get(4)?,
            })
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn profile(age: u32, gender: Option<&str>) -> UserProfile {
        UserProfile {
            name: "Ada".into(),
            age,
            height: 170.0,
            weight: 65.0,
            gender: gender.map(String::from),
        }
    }

    #[test]
    fn missing_profile_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_profile(&conn, "u1").unwrap().is_none());
    }

    #[test]
    fn save_then_get() {
        let conn = open_memory_database().unwrap();
        save_profile(&conn, "u1", &profile(34, Some("female"))).unwrap();
        assert_eq!(get_profile(&conn, "u1").unwrap(), Some(profile(34, Some("female"))));
    }

    #[test]
    fn second_save_merges_over_first() {
        let conn = open_memory_database().unwrap();
        save_profile(&conn, "u1", &profile(34, Some("female"))).unwrap();
        save_profile(&conn, "u1", &profile(35, None)).unwrap();

        let stored = get_profile(&conn, "u1").unwrap().unwrap();
        assert_eq!(stored.age, 35);
        assert_eq!(stored.gender.as_deref(), Some("female"));
    }

    #[test]
    fn profiles_are_scoped_per_user() {
        let conn = open_memory_database().unwrap();
        save_profile(&conn, "u1", &profile(34, None)).unwrap();
        assert!(get_profile(&conn, "u2").unwrap().is_none());
    }
}
