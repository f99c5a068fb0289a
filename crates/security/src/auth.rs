//! Request authentication.
//!
//! A bearer token is either a JWT (three base64url segments) or an opaque
//! static token. JWTs are checked for signature (when a secret is
//! configured) and expiry by [`crate::jwt`], then for age and subject here.
//! Opaque tokens must match one of the configured static tokens.

use chrono::Utc;
use finaid_config::AuthConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::jwt::{self, Claims};

/// How a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Authentication is turned off.
    Disabled,
    StaticToken,
    Jwt,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub method: AuthMethod,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".into(),
            method: AuthMethod::Disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token is too old (max {max_age_secs}s)")]
    TokenTooOld { max_age_secs: u64 },

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

/// A boolean gate in front of request handling.
pub trait AuthGate: Send + Sync {
    /// `bearer` is the raw token from `Authorization: Bearer <token>`.
    fn authorize(&self, bearer: Option<&str>) -> Result<Principal, AuthError>;
}

/// Token checks driven by `[auth]` configuration.
pub struct TokenAuthenticator {
    enabled: bool,
    token_digests: Vec<[u8; 32]>,
    jwt_secret: Option<String>,
    max_age_secs: u64,
    allowed_subjects: Vec<String>,
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

impl TokenAuthenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            enabled: config.enabled,
            token_digests: config.tokens.iter().map(|t| digest(t)).collect(),
            jwt_secret: config.jwt_secret.clone().filter(|s| !s.is_empty()),
            max_age_secs: config.jwt_max_age_secs,
            allowed_subjects: config.allowed_subjects.clone(),
        }
    }

    /// A gate that lets everything through.
    pub fn disabled() -> Self {
        Self::from_config(&AuthConfig::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// [`AuthGate::authorize`] with token age measured at `now` (seconds
    /// since epoch). Expiry is always checked against the system clock.
    pub fn authorize_at(&self, bearer: Option<&str>, now: i64) -> Result<Principal, AuthError> {
        if !self.enabled {
            return Ok(Principal::anonymous());
        }

        let token = bearer.map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;

        // Exact static matches win, even for JWT-shaped static tokens.
        if self.matches_static(token) {
            return Ok(Principal {
                subject: "static-token".into(),
                method: AuthMethod::StaticToken,
            });
        }

        if !jwt::is_jwt_shaped(token) {
            debug!("Opaque bearer token did not match any configured token");
            return Err(AuthError::InvalidToken);
        }

        let claims = match &self.jwt_secret {
            Some(secret) => jwt::decode_verified(token, secret)?,
            None => jwt::decode_unverified(token)?,
        };
        self.check_claims(&claims, now)?;

        Ok(Principal {
            subject: claims.sub,
            method: AuthMethod::Jwt,
        })
    }

    fn matches_static(&self, token: &str) -> bool {
        let candidate = digest(token);
        self.token_digests.iter().any(|d| *d == candidate)
    }

    fn check_claims(&self, claims: &Claims, now: i64) -> Result<(), AuthError> {
        let age = now.saturating_sub(claims.iat);
        if age > i64::try_from(self.max_age_secs).unwrap_or(i64::MAX) {
            return Err(AuthError::TokenTooOld {
                max_age_secs: self.max_age_secs,
            });
        }

        if !self.allowed_subjects.is_empty() && !self.allowed_subjects.contains(&claims.sub) {
            return Err(AuthError::InvalidSubject(claims.sub.clone()));
        }

        Ok(())
    }
}

impl AuthGate for TokenAuthenticator {
    fn authorize(&self, bearer: Option<&str>) -> Result<Principal, AuthError> {
        self.authorize_at(bearer, Utc::now().timestamp())
    }
}
