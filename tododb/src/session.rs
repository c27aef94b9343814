//! Signed session tokens.
//!
//! A session is an HS256 JWT carrying the user id and an expiry seven days
//! after issue. Expired, tampered and malformed tokens all fail [`SessionKeys::verify`]
//! the same way.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::TodoError;

/// Lifetime of a session token, in seconds.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Keys from a random 32-byte secret. Tokens do not survive a restart.
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(&secret)
    }

    /// Issue a token for `user_id` valid for [`SESSION_TTL_SECS`].
    pub fn issue(&self, user_id: i32) -> Result<String, TodoError> {
        self.issue_with_ttl(user_id, Duration::seconds(SESSION_TTL_SECS))
    }

    pub fn issue_with_ttl(&self, user_id: i32, ttl: Duration) -> Result<String, TodoError> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TodoError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let keys = SessionKeys::new(b"test-secret");
        let token = keys.issue(7).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = SessionKeys::new(b"test-secret");
        let token = keys.issue_with_ttl(7, Duration::seconds(-10)).unwrap();
        assert!(matches!(keys.verify(&token), Err(TodoError::Token(_))));
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = SessionKeys::new(b"one").issue(7).unwrap();
        assert!(matches!(
            SessionKeys::new(b"two").verify(&token),
            Err(TodoError::Token(_))
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = SessionKeys::random();
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn test_claims_use_user_id_key() {
        let claims = SessionClaims {
            user_id: 3,
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 3);
    }
}
