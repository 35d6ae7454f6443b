//! `GET /api/dashboard`: everything the home screen shows in one call.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::insights::{self, HealthInsight};
use crate::models::{
    MedicationRecord, MetricsRecord, MoodRecord, UserProfile, WaterIntakeRecord,
};

const RECENT_MOODS: usize = 7;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub profile: Option<UserProfile>,
    pub bmi: Option<f64>,
    pub today: Option<MetricsRecord>,
    pub insights: Vec<HealthInsight>,
    pub water: Option<WaterIntakeRecord>,
    pub medications: Option<MedicationRecord>,
    pub recent_moods: Vec<MoodRecord>,
}

pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let conn = ctx.core.db()?;

    let profile = db::get_profile(&conn, &user.uid)?;
    let recent = db::recent_metrics(&conn, &user.uid, 2)?;
    let insights = recent
        .first()
        .map(|latest| insights::derive_insights(&latest.metrics, recent.get(1).map(|r| &r.metrics)))
        .unwrap_or_default();

    Ok(Json(DashboardResponse {
        bmi: profile.as_ref().and_then(UserProfile::bmi),
        profile,
        today: db::latest_metrics_today(&conn, &user.uid)?,
        insights,
        water: db::get_water_intake(&conn, &user.uid)?,
        medications: db::get_medications(&conn, &user.uid)?,
        recent_moods: db::recent_moods(&conn, &user.uid, RECENT_MOODS)?,
    }))
}
