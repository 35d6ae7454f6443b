use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::enums::AuthProviderKind;

/// Application-level constants
pub const APP_NAME: &str = "LifeSync";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DATABASE_FILE: &str = "lifesync.db";
pub const LOCAL_STORE_FILE: &str = "local_store.json";

/// Default listen address for the local API server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7420";

/// Get the application data directory.
/// `$LIFESYNC_DATA_DIR` when set, otherwise ~/LifeSync/.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("LIFESYNC_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// SQLite file backing the document store and accounts.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// JSON file standing in for the browser's local storage.
pub fn local_store_path() -> PathBuf {
    app_data_dir().join(LOCAL_STORE_FILE)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "lifesync_lib=info,lifesync=info,tower_http=warn"
}

/// Address the API server binds to (`$LIFESYNC_BIND` overrides).
pub fn bind_addr() -> SocketAddr {
    std::env::var("LIFESYNC_BIND")
        .ok()
        .and_then(|raw| match raw.parse() {
            Ok(addr) => Some(addr),
            Err(e) => {
                tracing::warn!(%raw, "Ignoring invalid LIFESYNC_BIND: {e}");
                None
            }
        })
        .unwrap_or_else(default_bind_addr)
}

/// Secrets shared with federated sign-in bridges
/// (`$LIFESYNC_GOOGLE_SECRET`). Unset means the provider is disabled.
pub fn provider_secrets() -> HashMap<AuthProviderKind, Vec<u8>> {
    let mut secrets = HashMap::new();
    match std::env::var("LIFESYNC_GOOGLE_SECRET") {
        Ok(secret) if !secret.is_empty() => {
            secrets.insert(AuthProviderKind::Google, secret.into_bytes());
        }
        _ => tracing::info!("Google sign-in disabled: LIFESYNC_GOOGLE_SECRET not set"),
    }
    secrets
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7420))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_lives_in_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("lifesync.db"));
    }

    #[test]
    fn local_store_lives_in_app_data() {
        assert!(local_store_path().starts_with(app_data_dir()));
    }

    #[test]
    fn default_bind_matches_constant() {
        assert_eq!(default_bind_addr().to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn app_name_is_lifesync() {
        assert_eq!(APP_NAME, "LifeSync");
    }

    #[test]
    fn log_filter_covers_both_targets() {
        let filter = default_log_filter();
        assert!(filter.contains("lifesync_lib"));
        assert!(filter.contains("lifesync="));
    }
}
