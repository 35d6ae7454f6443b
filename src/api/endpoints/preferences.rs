//! Theme preference endpoints, backed by the device-local store.
//!
//! - `GET /api/preferences/theme`
//! - `PUT /api/preferences/theme`
//! - `POST /api/preferences/theme/toggle`

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::enums::Theme;

#[derive(Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

/// `GET /api/preferences/theme`
pub async fn get_theme(State(ctx): State<ApiContext>) -> Result<Json<ThemeBody>, ApiError> {
    let theme = ctx.core.local_store().theme()?;
    Ok(Json(ThemeBody { theme }))
}

/// `PUT /api/preferences/theme`
pub async fn set_theme(
    State(ctx): State<ApiContext>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, ApiError> {
    ctx.core.local_store().set_theme(body.theme)?;
    Ok(Json(body))
}

/// `POST /api/preferences/theme/toggle`
pub async fn toggle_theme(State(ctx): State<ApiContext>) -> Result<Json<ThemeBody>, ApiError> {
    let theme = ctx.core.local_store().toggle_theme()?;
    Ok(Json(ThemeBody { theme }))
}
