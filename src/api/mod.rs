//! Local HTTP API.
//!
//! Exposes the assistant, identity provider and document store as JSON
//! endpoints under `/api/`. Everything except the health check and the
//! sign-up/sign-in routes sits behind a middleware stack:
//! Rate Limit → Auth → Handler.
//!
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server instance; `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, start_api_server, ApiServer};
pub use types::ApiContext;
