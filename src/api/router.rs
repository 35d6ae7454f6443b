//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS + request tracing → 2. Rate limiter → 3. Session validator

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer
/// of each group). Endpoint handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

/// Build router from a pre-constructed `ApiContext`.
#[cfg(test)]
pub(crate) fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Rate limit → Auth (innermost) → Handler
    let protected = Router::new()
        .route(
            "/profile",
            get(endpoints::profile::get).put(endpoints::profile::save),
        )
        .route("/dashboard", get(endpoints::dashboard::summary))
        .route("/chat", get(endpoints::chat::view))
        .route("/chat/send", post(endpoints::chat::send))
        .route("/chat/history", get(endpoints::chat::history))
        .route("/metrics", post(endpoints::records::add_metrics))
        .route("/mood", post(endpoints::records::add_mood))
        .route("/water", put(endpoints::records::save_water))
        .route("/medications", put(endpoints::records::save_medications))
        .route(
            "/preferences/theme",
            get(endpoints::preferences::get_theme).put(endpoints::preferences::set_theme),
        )
        .route(
            "/preferences/theme/toggle",
            post(endpoints::preferences::toggle_theme),
        )
        .route("/auth/signout", post(endpoints::auth::sign_out))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Rate-limited only
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/signup", post(endpoints::auth::sign_up))
        .route("/auth/signin", post(endpoints::auth::sign_in))
        .route("/auth/provider", post(endpoints::auth::sign_in_with_provider))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::auth::ProviderAssertion;
    use crate::core_state::tests::{test_state, TEST_GOOGLE_SECRET};
    use crate::models::enums::AuthProviderKind;

    fn test_router() -> (Router, ApiContext, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(Arc::new(test_state(&dir)));
        (api_router_with_ctx(ctx.clone()), ctx, dir)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Sign up a fresh account and return its bearer token.
    async fn signed_up(app: &Router) -> String {
        let req = json_request(
            "POST",
            "/api/auth/signup",
            None,
            r#"{"email":"ada@example.com","password":"secret-pw","display_name":"Ada"}"#,
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        json["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _ctx, _dir) = test_router();
        let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["signed_in"], false);
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        let (app, _ctx, _dir) = test_router();
        let response = app.oneshot(get_request("/api/profile", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let (app, _ctx, _dir) = test_router();
        let response = app
            .oneshot(get_request("/api/dashboard", Some("not-a-session")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _ctx, _dir) = test_router();
        let response = app.oneshot(get_request("/api/nope", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_conflict() {
        let (app, _ctx, _dir) = test_router();
        signed_up(&app).await;
        let req = json_request(
            "POST",
            "/api/auth/signup",
            None,
            r#"{"email":"ADA@example.com","password":"another-pw"}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "auth/email-already-in-use");
    }

    fn google_assertion(secret: &[u8], email: &str) -> String {
        let assertion = ProviderAssertion::sign(
            secret,
            AuthProviderKind::Google,
            email,
            None,
            chrono::Utc::now().timestamp(),
        )
        .unwrap();
        serde_json::to_string(&assertion).unwrap()
    }

    #[tokio::test]
    async fn provider_sign_in_cannot_be_forged() {
        let (app, _ctx, _dir) = test_router();

        let body = google_assertion(TEST_GOOGLE_SECRET, "grace@example.com");
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/provider", None, &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let owner_token = body_json(response).await["token"].as_str().unwrap().to_string();
        let req = json_request(
            "PUT",
            "/api/profile",
            Some(&owner_token),
            r#"{"name":"Grace","age":44,"height":170,"weight":60}"#,
        );
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);

        // A bare claim without a signature never reaches the handler.
        let bare = r#"{"provider":"google","email":"grace@example.com"}"#;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/provider", None, bare))
            .await
            .unwrap();
        assert!(response.status().is_client_error());

        // A claim signed with the wrong key is refused.
        let forged = google_assertion(b"guessed-secret", "grace@example.com");
        let response = app
            .oneshot(json_request("POST", "/api/auth/provider", None, &forged))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "auth/invalid-credential");
        assert!(json.get("token").is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (app, _ctx, _dir) = test_router();
        signed_up(&app).await;
        let req = json_request(
            "POST",
            "/api/auth/signin",
            None,
            r#"{"email":"ada@example.com","password":"wrong-pw"}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_round_trip_through_api() {
        let (app, ctx, _dir) = test_router();
        let token = signed_up(&app).await;

        let response = app
            .clone()
            .oneshot(get_request("/api/profile", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("Cache-Control").is_some());
        assert!(body_json(response).await["profile"].is_null());

        let req = json_request(
            "PUT",
            "/api/profile",
            Some(&token),
            r#"{"name":"Ada","age":36,"height":170,"weight":60}"#,
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/api/profile", Some(&token)))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["profile"]["name"], "Ada");
        assert_eq!(json["profile"]["age"], 36);

        let cached = ctx.core.local_store().profile().unwrap().unwrap();
        assert_eq!(cached.name, "Ada");
    }

    #[tokio::test]
    async fn invalid_profile_is_bad_request() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;
        let req = json_request(
            "PUT",
            "/api/profile",
            Some(&token),
            r#"{"name":"","age":36,"height":170,"weight":60}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_send_replies_and_persists() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;

        let req = json_request(
            "POST",
            "/api/chat/send",
            Some(&token),
            r#"{"message":"I have a headache"}"#,
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["user"]["role"], "user");
        assert_eq!(json["user"]["content"], "I have a headache");
        let replies = json["replies"].as_array().unwrap();
        assert!(!replies.is_empty());
        assert!(replies.iter().all(|m| m["role"] == "assistant"));

        let response = app
            .clone()
            .oneshot(get_request("/api/chat", Some(&token)))
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["state"], "idle");
        // welcome + user + replies
        assert_eq!(
            view["messages"].as_array().unwrap().len(),
            2 + replies.len()
        );

        let response = app
            .oneshot(get_request("/api/chat/history", Some(&token)))
            .await
            .unwrap();
        let history = body_json(response).await;
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1 + replies.len());
        assert_eq!(messages[0]["content"], "I have a headache");
    }

    #[tokio::test]
    async fn empty_chat_message_is_bad_request() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;
        let req = json_request("POST", "/api/chat/send", Some(&token), r#"{"message":"   "}"#);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get_request("/api/chat", Some(&token)))
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn metrics_feed_the_dashboard() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;

        for body in [
            r#"{"heart_rate":70,"sleep_hours":6.5,"steps":4000,"stress_level":6}"#,
            r#"{"heart_rate":62,"sleep_hours":8.0,"steps":9000,"stress_level":3}"#,
        ] {
            let req = json_request("POST", "/api/metrics", Some(&token), body);
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(get_request("/api/dashboard", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["today"]["heart_rate"], 62);
        assert_eq!(json["insights"].as_array().unwrap().len(), 4);
        assert!(json["profile"].is_null());
    }

    #[tokio::test]
    async fn theme_toggles() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;

        let response = app
            .clone()
            .oneshot(get_request("/api/preferences/theme", Some(&token)))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["theme"], "light");

        let req = json_request("POST", "/api/preferences/theme/toggle", Some(&token), "");
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(body_json(response).await["theme"], "dark");
    }

    #[tokio::test]
    async fn sign_out_revokes_token() {
        let (app, _ctx, _dir) = test_router();
        let token = signed_up(&app).await;

        let req = json_request("POST", "/api/auth/signout", Some(&token), "");
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(get_request("/api/profile", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
