//! Federated sign-in with Google ID tokens.
//!
//! The browser obtains an ID token from Google and posts it to the server. The
//! [`GoogleVerifier`] checks it against Google's published signing keys and the
//! configured client id, then hands back a stable subject id and, when Google
//! has verified it, the email address.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;

use crate::error::TodoError;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Who an external provider says the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider-scoped, never reassigned user id (`sub`).
    pub subject: String,
    /// Present only when the provider vouches for it.
    pub email: Option<String>,
}

/// Turns an opaque external credential into an [`ExternalIdentity`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<ExternalIdentity, TodoError>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
}

pub struct GoogleVerifier {
    client_id: String,
    jwks_url: String,
    http: reqwest::Client,
}

impl GoogleVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, TodoError> {
        let keys = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<ExternalIdentity, TodoError> {
        // Reject junk before going to the network.
        let header = decode_header(credential)?;
        let kid = header
            .kid
            .ok_or_else(|| TodoError::Identity("token has no key id".to_string()))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| TodoError::Identity(format!("unknown signing key {kid}")))?;
        let key = DecodingKey::from_jwk(jwk)?;

        let claims = decode::<GoogleClaims>(credential, &key, &self.validation())?.claims;
        let email = match claims.email_verified {
            Some(true) => claims.email,
            _ => None,
        };

        Ok(ExternalIdentity {
            subject: claims.sub,
            email,
        })
    }
}
