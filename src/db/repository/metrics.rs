use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{optional, parse_column, server_timestamp};
use crate::db::DatabaseError;
use crate::models::{HealthMetrics, MetricsRecord};

const METRICS_COLUMNS: &str =
    "id, user_id, heart_rate, sleep_hours, steps, stress_level, activity_level, timestamp";

fn metrics_from_row(row: &Row<'_>) -> rusqlite::Result<MetricsRecord> {
    let activity: Option<String> = row.get(6)?;
    Ok(MetricsRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        metrics: HealthMetrics {
            heart_rate: row.get(2)?,
            sleep_hours: row.get(3)?,
            steps: row.get(4)?,
            stress_level: row.get(5)?,
            activity_level: activity.map(|raw| parse_column(6, raw)).transpose()?,
        },
        timestamp: row.get(7)?,
    })
}

/// Append one metrics reading.
pub fn insert_metrics(
    conn: &Connection,
    user_id: &str,
    metrics: &HealthMetrics,
) -> Result<MetricsRecord, DatabaseError> {
    let record = MetricsRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        metrics: metrics.clone(),
        timestamp: server_timestamp(),
    };
    conn.execute(
        &format!("INSERT INTO health_metrics ({METRICS_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            record.id,
            record.user_id,
            metrics.heart_rate,
            metrics.sleep_hours,
            metrics.steps,
            metrics.stress_level,
            metrics.activity_level.map(|a| a.as_str()),
            record.timestamp,
        ],
    )?;
    Ok(record)
}

/// Most recent readings first.
pub fn recent_metrics(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> Result<Vec<MetricsRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {METRICS_COLUMNS} FROM health_metrics
         WHERE user_id = ?1
         ORDER BY timestamp DESC, rowid DESC
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![user_id, limit as i64], metrics_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Latest reading recorded on `day`, if any.
pub fn latest_metrics_on(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
) -> Result<Option<MetricsRecord>, DatabaseError> {
    optional(conn.query_row(
        &format!(
            "SELECT {METRICS_COLUMNS} FROM health_metrics
             WHERE user_id = ?1 AND date(timestamp) = ?2
             ORDER BY timestamp DESC, rowid DESC
             LIMIT 1"
        ),
        params![user_id, day],
        metrics_from_row,
    ))
}

pub fn latest_metrics_today(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<MetricsRecord>, DatabaseError> {
    latest_metrics_on(conn, user_id, server_timestamp().date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::ActivityLevel;

    fn reading(heart_rate: u32) -> HealthMetrics {
        HealthMetrics {
            heart_rate: Some(heart_rate),
            sleep_hours: Some(7.5),
            steps: Some(6000),
            stress_level: Some(4),
            activity_level: Some(ActivityLevel::Moderate),
        }
    }

    #[test]
    fn insert_assigns_id_and_timestamp() {
        let conn = open_memory_database().unwrap();
        let record = insert_metrics(&conn, "u1", &reading(70)).unwrap();
        assert!(!record.id.is_empty());
        assert_eq!(record.user_id, "u1");
    }

    #[test]
    fn latest_today_returns_most_recent() {
        let conn = open_memory_database().unwrap();
        insert_metrics(&conn, "u1", &reading(70)).unwrap();
        insert_metrics(&conn, "u1", &reading(82)).unwrap();

        let latest = latest_metrics_today(&conn, "u1").unwrap().unwrap();
        assert_eq!(latest.metrics.heart_rate, Some(82));
        assert_eq!(latest.metrics.activity_level, Some(ActivityLevel::Moderate));
    }

    #[test]
    fn latest_on_other_day_is_none() {
        let conn = open_memory_database().unwrap();
        insert_metrics(&conn, "u1", &reading(70)).unwrap();
        let long_ago = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert!(latest_metrics_on(&conn, "u1", long_ago).unwrap().is_none());
    }

    #[test]
    fn recent_metrics_ordered_and_limited() {
        let conn = open_memory_database().unwrap();
        for hr in [60, 65, 70] {
            insert_metrics(&conn, "u1", &reading(hr)).unwrap();
        }
        insert_metrics(&conn, "u2", &reading(99)).unwrap();

        let recent = recent_metrics(&conn, "u1", 2).unwrap();
        let rates: Vec<_> = recent.iter().map(|r| r.metrics.heart_rate).collect();
        assert_eq!(rates, vec![Some(70), Some(65)]);
    }

    #[test]
    fn partial_reading_round_trips_nulls() {
        let conn = open_memory_database().unwrap();
        let partial = HealthMetrics {
            steps: Some(1200),
            ..Default::default()
        };
        insert_metrics(&conn, "u1", &partial).unwrap();
        let stored = recent_metrics(&conn, "u1", 1).unwrap().remove(0);
        assert_eq!(stored.metrics, partial);
    }
}
