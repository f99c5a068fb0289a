//! HS256 JSON Web Tokens on top of `jsonwebtoken`.
//!
//! The crate checks the header algorithm, the signature and `exp` (against
//! the system clock, no leeway). Token age and subject are policy and live
//! in [`crate::auth`].

use chrono::Utc;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Registered and private claims understood by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,

    /// Issued-at, seconds since the epoch. Missing counts as 0.
    #[serde(default)]
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Three dot-separated base64url segments, the last possibly empty.
pub fn is_jwt_shaped(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return false;
    }
    let segment_ok = |s: &str| {
        s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'='))
    };
    !parts[0].is_empty() && !parts[1].is_empty() && parts.iter().all(|p| segment_ok(p))
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub"]);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Decode the claims without checking the signature. Expiry still applies.
pub fn decode_unverified(token: &str) -> Result<Claims, AuthError> {
    let mut validation = validation();
    validation.insecure_disable_signature_validation();
    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Check the header algorithm, HS256 signature and expiry, then return the claims.
pub fn decode_verified(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = jsonwebtoken::decode::<Claims>(token, &key, &validation())?;
    Ok(data.claims)
}

/// Encode and sign `claims` with HS256.
pub fn encode(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)?)
}

/// Issue a token for `subject`, valid for `ttl_secs` from now.
pub fn issue_test_token(secret: &str, subject: &str, ttl_secs: i64) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.into(),
        iat: now,
        exp: Some(now + ttl_secs),
        scope: Some("read:students read:financial-aid".into()),
        jti: Some(uuid::Uuid::new_v4().to_string()),
    };
    encode(&claims, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, exp: Option<i64>) -> Claims {
        Claims {
            sub: sub.into(),
            iat: Utc::now().timestamp(),
            exp,
            scope: None,
            jti: None,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let token = issue_test_token("s3cret", "TEST_SERVICE1", 60).unwrap();
        assert!(is_jwt_shaped(&token));

        let claims = decode_verified(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "TEST_SERVICE1");
        assert_eq!(claims.exp, Some(claims.iat + 60));
        assert!(claims.jti.is_some());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_test_token("s3cret", "TEST_SERVICE1", 60).unwrap();
        assert_eq!(decode_verified(&token, "other"), Err(AuthError::InvalidSignature));
        // Claims are still readable without the secret.
        assert_eq!(decode_unverified(&token).unwrap().sub, "TEST_SERVICE1");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue_test_token("s3cret", "TEST_SERVICE1", 60).unwrap();
        let forged = encode(&claims("ADMIN", None), "attacker").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(decode_verified(&tampered, "s3cret"), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected_with_or_without_secret() {
        let now = Utc::now().timestamp();
        let token = encode(&claims("TEST_SERVICE1", Some(now - 5)), "s3cret").unwrap();
        assert_eq!(decode_verified(&token, "s3cret"), Err(AuthError::TokenExpired));
        assert_eq!(decode_unverified(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims("TEST_SERVICE1", None),
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(decode_verified(&token, "s3cret"), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn subject_is_required() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "iat": Utc::now().timestamp() }),
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(decode_verified(&token, "s3cret"), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn shape_detection() {
        assert!(is_jwt_shaped("abc.def.ghi"));
        assert!(is_jwt_shaped("abc.def."));
        assert!(!is_jwt_shaped("hf_abcdef123"));
        assert!(!is_jwt_shaped("a.b"));
        assert!(!is_jwt_shaped("a.b c.d"));
    }

    #[test]
    fn garbage_is_malformed() {
        // `{}` header: no algorithm.
        assert!(matches!(decode_unverified("e30.e30.x"), Err(AuthError::Malformed(_))));
    }
}
