//! Profile endpoints.
//!
//! - `GET /api/profile`: stored profile, if registered
//! - `PUT /api/profile`: register or update (merge-upsert)
//!
//! A saved profile is also cached in the device-local store.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::UserProfile;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: Option<UserProfile>,
}

#[derive(Serialize)]
pub struct SavedProfileResponse {
    pub profile: UserProfile,
    pub saved_at: NaiveDateTime,
}

/// `GET /api/profile`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let conn = ctx.core.db()?;
    let profile = db::get_profile(&conn, &user.uid)?;
    Ok(Json(ProfileResponse { profile }))
}

/// `PUT /api/profile`
pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<SavedProfileResponse>, ApiError> {
    profile.validate()?;

    let saved_at = {
        let conn = ctx.core.db()?;
        db::save_profile(&conn, &user.uid, &profile)?
    };
    ctx.core.local_store().save_profile(&profile)?;
    tracing::info!(uid = %user.uid, "Profile saved");

    Ok(Json(SavedProfileResponse { profile, saved_at }))
}
