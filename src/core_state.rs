//! Application context shared by every request handler.
//!
//! `CoreState` owns the database connection, the assistant, the
//! identity provider, open bearer sessions, one live conversation per
//! signed-in user and the device-local store. It is built once at
//! startup, wrapped in `Arc`, and passed explicitly; there are no
//! globals.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use rusqlite::Connection;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::assistant::{Assistant, AssistantConfig, KnowledgeBase};
use crate::auth::{AuthConfig, AuthError, IdentityProvider, SessionTable};
use crate::chat::{Conversation, SubmitOutcome};
use crate::config;
use crate::db;
use crate::local_store::{LocalStore, StoreError};
use crate::models::AuthUser;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

pub struct CoreState {
    db: Mutex<Connection>,
    assistant: Assistant,
    identity: IdentityProvider,
    sessions: Mutex<SessionTable>,
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
    local_store: LocalStore,
}

impl CoreState {
    pub fn new(
        conn: Connection,
        local_store: LocalStore,
        assistant: AssistantConfig,
        auth: AuthConfig,
    ) -> Self {
        Self {
            db: Mutex::new(conn),
            assistant: Assistant::new(Arc::new(KnowledgeBase::builtin()), assistant),
            identity: IdentityProvider::new(auth),
            sessions: Mutex::new(SessionTable::new()),
            conversations: RwLock::new(HashMap::new()),
            local_store,
        }
    }

    /// Open the on-disk database and local store.
    pub fn open(
        db_path: &Path,
        local_store_path: &Path,
        assistant: AssistantConfig,
    ) -> Result<Self, CoreError> {
        let conn = db::open_database(db_path)?;
        let store = LocalStore::load(local_store_path)?;
        tracing::info!(db = %db_path.display(), "Application state opened");
        let auth = AuthConfig {
            provider_secrets: config::provider_secrets(),
            ..AuthConfig::default()
        };
        Ok(Self::new(conn, store, assistant, auth))
    }

    // ── Collaborators ───────────────────────────────────────

    /// Borrow the database connection. Do not hold across `.await`.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }

    pub fn local_store(&self) -> &LocalStore {
        &self.local_store
    }

    // ── Bearer sessions ─────────────────────────────────────

    pub fn issue_session(&self, user: AuthUser) -> Result<String, CoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(sessions.issue(user))
    }

    pub fn resolve_session(&self, token: &str) -> Result<Option<AuthUser>, CoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(sessions.validate(token))
    }

    /// Close one bearer session. The user's live conversation is dropped
    /// and the auth state cleared only when this was their last open
    /// session; other devices keep going.
    pub fn end_session(&self, token: &str, uid: &str) -> Result<(), CoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| CoreError::LockPoisoned)?;
        sessions.revoke(token);
        if sessions.has_sessions_for(uid) {
            tracing::debug!(%uid, "Session closed; other sessions remain");
            return Ok(());
        }

        self.conversations
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .remove(uid);
        if self.identity.current_user().is_some_and(|u| u.uid == uid) {
            self.identity.sign_out();
        }
        Ok(())
    }

    // ── Conversations ───────────────────────────────────────

    /// The user's live conversation, started with the welcome message on
    /// first access.
    pub fn conversation_for(&self, uid: &str) -> Result<Arc<Conversation>, CoreError> {
        if let Some(existing) = self
            .conversations
            .read()
            .map_err(|_| CoreError::LockPoisoned)?
            .get(uid)
        {
            return Ok(Arc::clone(existing));
        }

        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| CoreError::LockPoisoned)?;
        let conversation = conversations
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(Conversation::new(self.assistant.welcome_message())));
        Ok(Arc::clone(conversation))
    }

    /// Run one chat turn on its own task and persist it to the chat log.
    ///
    /// Once started, the turn completes even if the returned handle is
    /// dropped (e.g. the HTTP client went away).
    pub fn spawn_chat_turn(
        self: &Arc<Self>,
        uid: &str,
        text: String,
    ) -> JoinHandle<Result<SubmitOutcome, CoreError>> {
        let core = Arc::clone(self);
        let uid = uid.to_string();
        tokio::spawn(async move {
            let conversation = core.conversation_for(&uid)?;
            let profile = {
                let conn = core.db()?;
                db::get_profile(&conn, &uid)?
            };

            let outcome = conversation
                .submit(core.assistant(), &text, profile.as_ref())
                .await;

            if let SubmitOutcome::Replied { user, replies } = &outcome {
                let conn = core.db()?;
                db::insert_chat_message(&conn, &uid, user)?;
                for reply in replies {
                    db::insert_chat_message(&conn, &uid, reply)?;
                }
            }
            Ok(outcome)
        })
    }
}
