//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus API-specific caches.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// User context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Signed-in user, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub uid: String,
    pub email: String,
    /// The bearer token the request came with, for sign-out.
    pub token: String,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Sweep idle clients once the table grows past this.
const SWEEP_THRESHOLD: usize = 1000;
/// Hard cap on tracked clients; the least recently active are evicted.
const MAX_CLIENTS: usize = 10_000;

/// Per-client rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    max_clients: usize,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            per_minute: 100,
            per_hour: 1000,
            max_clients: MAX_CLIENTS,
            last_sweep: Instant::now(),
        }
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        if !self.windows.contains_key(client) && self.windows.len() >= SWEEP_THRESHOLD {
            if now.saturating_duration_since(self.last_sweep) >= MINUTE {
                self.cleanup(now);
            }
            if self.windows.len() >= self.max_clients {
                self.evict_least_recent();
            }
        }

        let entries = self.windows.entry(client.to_string()).or_default();
        entries.retain(|ts| now.duration_since(*ts) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < MINUTE)
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Drop clients with no request in the last hour.
    fn cleanup(&mut self, now: Instant) {
        self.last_sweep = now;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < HOUR);
            !entries.is_empty()
        });
    }

    /// Evict the least recently active tenth of the table.
    fn evict_least_recent(&mut self) {
        let mut by_activity: Vec<(Instant, String)> = self
            .windows
            .iter()
            .map(|(key, entries)| (entries.last().copied().unwrap_or_else(Instant::now), key.clone()))
            .collect();
        by_activity.sort_unstable();

        let excess = self.windows.len() + 1 - self.max_clients;
        let evict = excess.max(self.max_clients / 10);
        for (_, key) in by_activity.into_iter().take(evict) {
            self.windows.remove(&key);
        }
        tracing::warn!(evicted = evict, "Rate limiter table full; evicted idle clients");
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
