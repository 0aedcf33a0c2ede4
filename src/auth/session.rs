//! Stateless session tokens.
//!
//! A token is `base64url(json claims) "." base64url(hmac_sha256(payload))`.
//! Nothing is stored server-side, so a token stays valid until `exp` even
//! after logout; logout only clears the cookie.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::SessionSecret;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every issued token, and the cookie's `Max-Age`.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Identity claims carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
    /// Unix seconds after which the token is rejected.
    pub exp: i64,
}

/// Signs and verifies session tokens with the process-wide secret.
#[derive(Clone)]
pub struct SessionKeys {
    key: Arc<[u8]>,
}

impl SessionKeys {
    pub fn new(secret: &SessionSecret) -> Self {
        Self {
            key: Arc::from(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> String {
        self.issue_at(user_id, username, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user_id: i64, username: &str, now: i64) -> String {
        let claims = SessionClaims {
            user_id,
            username: username.to_string(),
            exp: now.saturating_add(SESSION_TTL_SECS),
        };
        // Serializing a struct of plain fields cannot fail.
        let json = serde_json::to_vec(&claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", payload, signature)
    }

    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Returns the claims only if the signature checks out and `now < exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Option<SessionClaims> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: SessionClaims = serde_json::from_slice(&json).ok()?;

        (now < claims.exp).then_some(claims)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_790_000_000;
    const DAY: i64 = 86_400;

    fn keys() -> SessionKeys {
        SessionKeys::new(&SessionSecret::new("test-secret-test-secret-test-secret").unwrap())
    }

    #[test]
    fn issue_then_verify_returns_claims() {
        let keys = keys();
        let token = keys.issue_at(7, "alice", NOW);

        let claims = keys.verify_at(&token, NOW + 60).unwrap();
        assert_eq!(
            claims,
            SessionClaims {
                user_id: 7,
                username: "alice".into(),
                exp: NOW + DAY,
            }
        );
    }

    #[test]
    fn token_expires_after_24_hours() {
        let keys = keys();
        let token = keys.issue_at(7, "alice", NOW);

        assert!(keys.verify_at(&token, NOW + DAY - 1).is_some());
        assert!(keys.verify_at(&token, NOW + DAY).is_none());
        assert!(keys.verify_at(&token, NOW + DAY + 1).is_none());
    }

    #[test]
    fn expiry_is_always_one_day_after_issue() {
        assert_eq!(SESSION_TTL_SECS, DAY);
        let keys = keys();
        for now in [0, NOW, i64::MAX - DAY] {
            let token = keys.issue_at(1, "alice", now);
            let claims = keys.verify_at(&token, now).unwrap();
            assert_eq!(claims.exp, now + DAY);
        }
    }

    #[test]
    fn tampering_any_byte_invalidates() {
        let keys = keys();
        let token = keys.issue_at(7, "alice", NOW);

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                keys.verify_at(&tampered, NOW).is_none(),
                "tampered byte {} still verified",
                i
            );
        }
    }

    #[test]
    fn forged_claims_with_old_signature_fail() {
        let keys = keys();
        let token = keys.issue_at(7, "alice", NOW);
        let (_, signature) = token.split_once('.').unwrap();

        let forged = serde_json::json!({ "user_id": 1, "username": "admin", "exp": NOW + DAY });
        let payload = URL_SAFE_NO_PAD.encode(forged.to_string());
        assert!(keys
            .verify_at(&format!("{}.{}", payload, signature), NOW)
            .is_none());
    }

    #[test]
    fn other_secret_rejects_token() {
        let token = keys().issue_at(7, "alice", NOW);
        let other =
            SessionKeys::new(&SessionSecret::new("another-secret-another-secret-xx").unwrap());
        assert!(other.verify_at(&token, NOW).is_none());
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let keys = keys();
        for token in ["", ".", "abc", "abc.def", "a.b.c", "!!!.???"] {
            assert!(keys.verify_at(token, NOW).is_none(), "{:?}", token);
        }
    }

    #[test]
    fn issue_uses_the_wall_clock() {
        let keys = keys();
        let token = keys.issue(3, "bob");
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, 3);
        assert!(claims.exp > Utc::now().timestamp());
    }
}
