//! Identity provider: email/password and federated sign-in over the
//! `accounts` table, with a single auth-state notification point.

pub mod assertion;
pub mod limiter;
pub mod password;
pub mod session;
pub mod state;

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use regex::Regex;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::AuthProviderKind;
use crate::models::{Account, AuthUser};

pub use assertion::ProviderAssertion;
pub use limiter::AttemptLimiter;
pub use session::{generate_token, hash_token, SessionTable};
pub use state::{AuthState, Subscription};

pub const MIN_PASSWORD_LENGTH: usize = 6;

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("No account found with this email")]
    UserNotFound,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("An account with this email already exists")]
    EmailAlreadyInUse,

    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("Too many attempts. Please try again later")]
    TooManyRequests,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Auth state lock poisoned")]
    LockPoisoned,
}

impl AuthError {
    /// Provider-style error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::WeakPassword => "auth/weak-password",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::Database(_) | Self::LockPoisoned => "auth/internal-error",
        }
    }

    /// Text safe to show to the person signing in.
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) | Self::LockPoisoned => {
                "An error occurred during authentication".to_string()
            }
            other => other.to_string(),
        }
    }
}

// ═══════════════════════════════════════════
// Provider
// ═══════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub pbkdf2_iterations: u32,
    pub max_failed_attempts: usize,
    pub failure_window: Duration,
    /// Secrets shared with each provider bridge. A provider without one
    /// cannot sign anyone in.
    pub provider_secrets: HashMap<AuthProviderKind, Vec<u8>>,
}

impl AuthConfig {
    pub fn with_provider_secret(mut self, provider: AuthProviderKind, secret: Vec<u8>) -> Self {
        self.provider_secrets.insert(provider, secret);
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: password::DEFAULT_PBKDF2_ITERATIONS,
            max_failed_attempts: 5,
            failure_window: Duration::from_secs(60),
            provider_secrets: HashMap::new(),
        }
    }
}

pub struct IdentityProvider {
    config: AuthConfig,
    limiter: Mutex<AttemptLimiter>,
    state: AuthState,
}

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Lowercased, trimmed email, or `InvalidEmail`.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if EMAIL_PATTERN.is_match(&email) {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail)
    }
}

impl IdentityProvider {
    pub fn new(config: AuthConfig) -> Self {
        let limiter = AttemptLimiter::new(config.max_failed_attempts, config.failure_window);
        Self {
            config,
            limiter: Mutex::new(limiter),
            state: AuthState::new(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.current_user()
    }

    pub fn on_auth_state_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<AuthUser>) + Send + 'static,
    {
        self.state.on_auth_state_changed(callback)
    }

    /// Create a password account and sign it in.
    pub fn sign_up(
        &self,
        conn: &Connection,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        if db::get_account_by_email(conn, &email)?.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let salt = password::generate_salt();
        let hash = password::hash_password(password, &salt, self.config.pbkdf2_iterations);
        let now = db::server_timestamp();
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email,
            provider: AuthProviderKind::Password,
            password_hash: Some(hash.to_vec()),
            password_salt: Some(salt.to_vec()),
            display_name: display_name.map(str::to_string),
            created_at: now,
            last_sign_in: Some(now),
        };
        match db::insert_account(conn, &account) {
            Ok(()) => {}
            Err(DatabaseError::ConstraintViolation(_)) => return Err(AuthError::EmailAlreadyInUse),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(uid = %account.uid, "Account created");
        let user = AuthUser::from(&account);
        self.state.set(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_in(
        &self,
        conn: &Connection,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email)?;
        if !self.lock_limiter()?.is_allowed(&email) {
            tracing::warn!("Sign-in throttled after repeated failures");
            return Err(AuthError::TooManyRequests);
        }

        let result = self.check_password(conn, &email, password);
        match &result {
            Ok(_) => self.lock_limiter()?.reset(&email),
            Err(AuthError::UserNotFound | AuthError::WrongPassword) => {
                self.lock_limiter()?.record_failure(&email)
            }
            Err(_) => {}
        }
        let account = result?;

        db::record_sign_in(conn, &account.uid)?;
        tracing::info!(uid = %account.uid, "Signed in");
        let user = AuthUser::from(&account);
        self.state.set(Some(user.clone()));
        Ok(user)
    }

    fn check_password(
        &self,
        conn: &Connection,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let account = db::get_account_by_email(conn, email)?.ok_or(AuthError::UserNotFound)?;
        let (Some(hash), Some(salt)) = (&account.password_hash, &account.password_salt) else {
            // Federated account: no password to check against.
            return Err(AuthError::InvalidCredential);
        };
        if password::verify_password(password, salt, hash, self.config.pbkdf2_iterations) {
            Ok(account)
        } else {
            Err(AuthError::WrongPassword)
        }
    }

    /// Sign in with a signed provider assertion, creating the account on
    /// first use.
    pub fn sign_in_with_provider(
        &self,
        conn: &Connection,
        assertion: &ProviderAssertion,
    ) -> Result<AuthUser, AuthError> {
        if assertion.provider == AuthProviderKind::Password {
            return Err(AuthError::InvalidCredential);
        }
        let email = normalize_email(&assertion.email)?;
        let now = chrono::Utc::now().timestamp();
        if !assertion.verify(&self.config.provider_secrets, now) {
            tracing::warn!(provider = assertion.provider.as_str(), "Rejected unverified provider assertion");
            return Err(AuthError::InvalidCredential);
        }

        let account = match db::get_account_by_email(conn, &email)? {
            Some(existing) if existing.provider == assertion.provider => {
                db::record_sign_in(conn, &existing.uid)?;
                existing
            }
            Some(_) => return Err(AuthError::EmailAlreadyInUse),
            None => {
                let now = db::server_timestamp();
                let account = Account {
                    uid: Uuid::new_v4().to_string(),
                    email,
                    provider: assertion.provider,
                    password_hash: None,
                    password_salt: None,
                    display_name: assertion.display_name.clone(),
                    created_at: now,
                    last_sign_in: Some(now),
                };
                db::insert_account(conn, &account)?;
                tracing::info!(uid = %account.uid, provider = assertion.provider.as_str(), "Account created");
                account
            }
        };

        let user = AuthUser::from(&account);
        self.state.set(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.state.current_user() {
            tracing::info!(uid = %user.uid, "Signed out");
        }
        self.state.set(None);
    }

    fn lock_limiter(&self) -> Result<std::sync::MutexGuard<'_, AttemptLimiter>, AuthError> {
        self.limiter.lock().map_err(|_| AuthError::LockPoisoned)
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}
