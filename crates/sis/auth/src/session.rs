//! Session token issuance and validation.

use std::collections::BTreeSet;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use sis_core::Error;

/// Default session lifetime.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Claims embedded in an operator session token.
///
/// The permission set is a snapshot taken at login; role changes only
/// affect sessions issued afterwards (documented staleness window).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (operator username).
    pub sub: String,
    /// Effective permissions at issuance.
    pub perms: Vec<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Issues and validates signed, self-contained session tokens (HS256).
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionKeys {
    /// Create session keys from a shared secret.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a token for the given operator and permission snapshot.
    pub fn issue(&self, username: &str, perms: &BTreeSet<String>) -> Result<String, Error> {
        let now = now_secs();
        let claims = SessionClaims {
            sub: username.to_string(),
            perms: perms.iter().cloned().collect(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(Error::storage)
    }

    /// Validate a token and return its claims.
    ///
    /// Signature mismatch, malformed input, and expiry all surface as
    /// `InvalidToken`; validation is side-effect-free.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, Error> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}

fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret-key-for-testing", DEFAULT_TTL_SECS)
    }

    fn perms(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn issue_and_validate_round_trip() {
        let keys = keys();
        let token = keys.issue("alice", &perms(&["device.view", "class.broadcast"])).unwrap();

        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.perms, vec!["class.broadcast", "device.view"]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            keys().validate("not-a-token"),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = keys().issue("alice", &perms(&[])).unwrap();
        let other = SessionKeys::new(b"different-secret", DEFAULT_TTL_SECS);
        assert!(matches!(other.validate(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn expired_token_is_invalid() {
        let expired = SessionKeys::new(b"secret", -120);
        let token = expired.issue("alice", &perms(&[])).unwrap();
        assert!(matches!(expired.validate(&token), Err(Error::InvalidToken)));
    }
}
