pub mod api;
pub mod assistant;
pub mod auth;
pub mod chat;
pub mod config;
pub mod core_state;
pub mod db;
pub mod insights; // Dashboard trend cards
pub mod local_store;
pub mod models;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::assistant::AssistantConfig;
use crate::core_state::CoreState;

/// Start LifeSync: open local state and serve the API until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("LifeSync starting v{}", config::APP_VERSION);

    let core = CoreState::open(
        &config::database_path(),
        &config::local_store_path(),
        AssistantConfig::default(),
    )
    .map_err(|e| format!("Failed to open application state: {e}"))?;

    api::serve(Arc::new(core), config::bind_addr()).await
}
