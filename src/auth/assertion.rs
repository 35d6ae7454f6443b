//! Federated sign-in assertions.
//!
//! The bridge that completes the provider's sign-in flow (e.g. the
//! Google popup) signs `provider \n email \n issued_at` with a secret
//! shared with this server. Unsigned, forged or stale assertions are
//! refused before any account is looked up.

use std::collections::HashMap;

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::models::enums::AuthProviderKind;

type HmacSha256 = Hmac<Sha256>;

/// Assertions older than this are refused.
pub const ASSERTION_MAX_AGE_SECS: i64 = 300;

/// Identity vouched for by an external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAssertion {
    pub provider: AuthProviderKind,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Unix seconds at which the bridge signed the assertion.
    pub issued_at: i64,
    /// URL-safe base64 HMAC-SHA256 tag.
    pub signature: String,
}

fn signing_input(provider: AuthProviderKind, email: &str, issued_at: i64) -> String {
    format!("{}\n{}\n{}", provider.as_str(), email.trim().to_lowercase(), issued_at)
}

fn mac_for(
    secret: &[u8],
    provider: AuthProviderKind,
    email: &str,
    issued_at: i64,
) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(signing_input(provider, email, issued_at).as_bytes());
    Some(mac)
}

impl ProviderAssertion {
    /// Build a signed assertion. Used by the provider bridge.
    pub fn sign(
        secret: &[u8],
        provider: AuthProviderKind,
        email: &str,
        display_name: Option<String>,
        issued_at: i64,
    ) -> Option<Self> {
        let tag = mac_for(secret, provider, email, issued_at)?.finalize().into_bytes();
        Some(Self {
            provider,
            email: email.to_string(),
            display_name,
            issued_at,
            signature: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag),
        })
    }

    /// Check the tag (constant time) and freshness against `now` (unix seconds).
    pub fn verify(&self, secrets: &HashMap<AuthProviderKind, Vec<u8>>, now: i64) -> bool {
        let Some(secret) = secrets.get(&self.provider) else {
            tracing::warn!(provider = self.provider.as_str(), "No secret configured for provider");
            return false;
        };
        let age = now - self.issued_at;
        if !(-ASSERTION_MAX_AGE_SECS..=ASSERTION_MAX_AGE_SECS).contains(&age) {
            return false;
        }
        let Ok(tag) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(&self.signature)
        else {
            return false;
        };
        mac_for(secret, self.provider, &self.email, self.issued_at)
            .is_some_and(|mac| mac.verify_slice(&tag).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"bridge-secret";

    fn signed(email: &str, issued_at: i64) -> ProviderAssertion {
        ProviderAssertion::sign(SECRET, AuthProviderKind::Google, email, None, issued_at).unwrap()
    }

    fn secrets() -> HashMap<AuthProviderKind, Vec<u8>> {
        HashMap::from([(AuthProviderKind::Google, SECRET.to_vec())])
    }

    #[test]
    fn signed_assertion_verifies() {
        let a = signed("g@example.com", 1_000);
        assert!(a.verify(&secrets(), 1_010));
    }

    #[test]
    fn email_case_does_not_matter() {
        let mut a =
            ProviderAssertion::sign(SECRET, AuthProviderKind::Google, "G@Example.com", None, 1_000).unwrap();
        a.email = "g@example.com".into();
        assert!(a.verify(&secrets(), 1_000));
    }

    #[test]
    fn tampered_email_fails() {
        let mut a = signed("g@example.com", 1_000);
        a.email = "victim@example.com".into();
        assert!(!a.verify(&secrets(), 1_000));
    }

    #[test]
    fn wrong_secret_fails() {
        let a = ProviderAssertion::sign(b"other", AuthProviderKind::Google, "g@example.com", None, 1_000).unwrap();
        assert!(!a.verify(&secrets(), 1_000));
    }

    #[test]
    fn stale_assertion_fails() {
        let a = signed("g@example.com", 1_000);
        assert!(!a.verify(&secrets(), 1_000 + ASSERTION_MAX_AGE_SECS + 1));
    }

    #[test]
    fn unconfigured_provider_fails() {
        let a = signed("g@example.com", 1_000);
        assert!(!a.verify(&HashMap::new(), 1_000));
    }

    #[test]
    fn garbage_signature_fails() {
        let mut a = signed("g@example.com", 1_000);
        a.signature = "not base64!".into();
        assert!(!a.verify(&secrets(), 1_000));
    }
}
