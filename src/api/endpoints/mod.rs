//! API endpoint handlers, one module per screen or feature.

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod preferences;
pub mod profile;
pub mod records;
