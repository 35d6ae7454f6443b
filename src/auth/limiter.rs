//! Sliding-window limiter for failed sign-in attempts, keyed by email.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct AttemptLimiter {
    failures: HashMap<String, Vec<Instant>>,
    max_failures: usize,
    window: Duration,
}

impl AttemptLimiter {
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: HashMap::new(),
            max_failures,
            window,
        }
    }

    /// `false` once the key has used up its failures within the window.
    pub fn is_allowed(&mut self, key: &str) -> bool {
        let now = Instant::now();
        let window = self.window;
        match self.failures.get_mut(key) {
            Some(entries) => {
                entries.retain(|ts| now.duration_since(*ts) < window);
                entries.len() < self.max_failures
            }
            None => true,
        }
    }

    pub fn record_failure(&mut self, key: &str) {
        self.failures
            .entry(key.to_string())
            .or_default()
            .push(Instant::now());
    }

    /// Forget a key after a successful sign-in.
    pub fn reset(&mut self, key: &str) {
        self.failures.remove(key);
    }
}

impl Default for AttemptLimiter {
    /// 5 failures per 60 seconds.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}
