//! Per-collection write endpoints.
//!
//! - `POST /api/metrics`: append a health metrics reading
//! - `POST /api/mood`: append a mood entry
//! - `PUT /api/water`: merge today's water intake
//! - `PUT /api/medications`: replace the medication schedule
//!
//! Inputs are validated before they reach the store; the store stamps
//! the timestamp.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::{
    HealthMetrics, MedicationRecord, MedicationSchedule, MetricsRecord, MoodEntry, MoodRecord,
    WaterIntake, WaterIntakeRecord,
};

/// `POST /api/metrics`
pub async fn add_metrics(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(metrics): Json<HealthMetrics>,
) -> Result<(StatusCode, Json<MetricsRecord>), ApiError> {
    metrics.validate()?;
    let conn = ctx.core.db()?;
    let record = db::insert_metrics(&conn, &user.uid, &metrics)?;
    tracing::debug!(uid = %user.uid, id = %record.id, "Metrics recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /api/mood`
pub async fn add_mood(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(entry): Json<MoodEntry>,
) -> Result<(StatusCode, Json<MoodRecord>), ApiError> {
    entry.validate()?;
    let conn = ctx.core.db()?;
    let record = db::insert_mood(&conn, &user.uid, &entry)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/water`
pub async fn save_water(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(intake): Json<WaterIntake>,
) -> Result<Json<WaterIntakeRecord>, ApiError> {
    intake.validate()?;
    let conn = ctx.core.db()?;
    Ok(Json(db::save_water_intake(&conn, &user.uid, &intake)?))
}

/// `PUT /api/medications`
pub async fn save_medications(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(schedule): Json<MedicationSchedule>,
) -> Result<Json<MedicationRecord>, ApiError> {
    schedule.validate()?;
    let conn = ctx.core.db()?;
    Ok(Json(db::save_medications(&conn, &user.uid, &schedule)?))
}
