//! Bearer session tokens. Only SHA-256 hashes are kept in memory.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::AuthUser;

/// Idle sessions expire after a week.
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

struct SessionEntry {
    user: AuthUser,
    last_seen: Instant,
}

pub struct SessionTable {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: SESSION_TTL,
        }
    }

    /// Open a session for `user` and return the plaintext token.
    pub fn issue(&mut self, user: AuthUser) -> String {
        self.cleanup();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                user,
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Resolve a token to its user, refreshing the idle timer.
    pub fn validate(&mut self, token: &str) -> Option<AuthUser> {
        let key = hash_token(token);
        let ttl = self.ttl;
        let entry = self.sessions.get_mut(&key)?;
        if entry.last_seen.elapsed() > ttl {
            self.sessions.remove(&key);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.user.clone())
    }

    /// Returns whether a session was open for the token.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    /// Whether `uid` still has an unexpired session (on any device).
    pub fn has_sessions_for(&self, uid: &str) -> bool {
        self.sessions
            .values()
            .any(|s| s.user.uid == uid && s.last_seen.elapsed() <= self.ttl)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn cleanup(&mut self) {
        let ttl = self.ttl;
        self.sessions.retain(|_, s| s.last_seen.elapsed() <= ttl);
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}
