use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AuthProviderKind;

/// Identity record. Password material is only present for
/// `AuthProviderKind::Password` accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub provider: AuthProviderKind,
    pub password_hash: Option<Vec<u8>>,
    pub password_salt: Option<Vec<u8>>,
    pub display_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_sign_in: Option<NaiveDateTime>,
}

/// What callers get to see about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub provider: AuthProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<&Account> for AuthUser {
    fn from(account: &Account) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            provider: account.provider,
            display_name: account.display_name.clone(),
        }
    }
}
