//! Sign-up, sign-in and sign-out endpoints.
//!
//! - `POST /api/auth/signup`: email/password account creation
//! - `POST /api/auth/signin`: email/password sign-in
//! - `POST /api/auth/provider`: federated sign-in (e.g. Google)
//! - `POST /api/auth/signout`: revoke the bearer token
//!
//! Password hashing is CPU-heavy, so credential checks run on the
//! blocking pool.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth::ProviderAssertion;
use crate::core_state::CoreError;
use crate::models::AuthUser;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: AuthUser,
}

/// Run a credential check on the blocking pool and open a session for
/// the resulting user.
async fn authenticate<F>(ctx: ApiContext, check: F) -> Result<Json<SessionResponse>, ApiError>
where
    F: FnOnce(&crate::core_state::CoreState) -> Result<AuthUser, CoreError> + Send + 'static,
{
    let core = ctx.core.clone();
    let (user, token) = tokio::task::spawn_blocking(move || {
        let user = check(&core)?;
        let token = core.issue_session(user.clone())?;
        Ok::<_, CoreError>((user, token))
    })
    .await??;

    Ok(Json(SessionResponse { token, user }))
}

/// `POST /api/auth/signup`
pub async fn sign_up(
    State(ctx): State<ApiContext>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = authenticate(ctx, move |core| {
        let conn = core.db()?;
        Ok(core.identity().sign_up(
            &conn,
            &req.email,
            &req.password,
            req.display_name.as_deref(),
        )?)
    })
    .await?;
    Ok((StatusCode::CREATED, session))
}

/// `POST /api/auth/signin`
pub async fn sign_in(
    State(ctx): State<ApiContext>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    authenticate(ctx, move |core| {
        let conn = core.db()?;
        Ok(core.identity().sign_in(&conn, &req.email, &req.password)?)
    })
    .await
}

/// `POST /api/auth/provider`
pub async fn sign_in_with_provider(
    State(ctx): State<ApiContext>,
    Json(assertion): Json<ProviderAssertion>,
) -> Result<Json<SessionResponse>, ApiError> {
    authenticate(ctx, move |core| {
        let conn = core.db()?;
        Ok(core.identity().sign_in_with_provider(&conn, &assertion)?)
    })
    .await
}

/// `POST /api/auth/signout`
pub async fn sign_out(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    ctx.core.end_session(&user.token, &user.uid)?;
    Ok(StatusCode::NO_CONTENT)
}
