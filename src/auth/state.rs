//! Auth state notifications.
//!
//! `AuthState` is the one place auth changes are published. Listeners
//! either hold a `watch::Receiver` or register a callback; a callback
//! runs once with the current user and then after every change, until
//! its `Subscription` is dropped. Rapid changes may coalesce: listeners
//! always see the latest state, not every intermediate one.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::AuthUser;

pub struct AuthState {
    tx: watch::Sender<Option<AuthUser>>,
}

impl AuthState {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    pub(crate) fn set(&self, user: Option<AuthUser>) {
        self.tx.send_replace(user);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }

    /// Register `callback` for auth changes. Must be called inside a
    /// tokio runtime.
    pub fn on_auth_state_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<AuthUser>) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let handle = tokio::spawn(async move {
            let initial = rx.borrow_and_update().clone();
            callback(initial);
            while rx.changed().await.is_ok() {
                let user = rx.borrow_and_update().clone();
                callback(user);
            }
        });
        Subscription { handle }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
