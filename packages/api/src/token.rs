//! Owner-facing JWTs: login sessions and email-verification links
//!
//! Both token kinds share one HS256 secret and are told apart by audience, so a
//! verification link can never be replayed as a login session. The secret comes in
//! from configuration; nothing here touches the environment.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ISSUER: &str = "restomate";

/// What a token is allowed to be used for, enforced via the `aud` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Bearer token presented on every authenticated request
    Session,
    /// One-shot token embedded in the verification email link
    EmailVerification,
}

impl TokenPurpose {
    pub fn audience(&self) -> &'static str {
        match self {
            TokenPurpose::Session => "restomate-session",
            TokenPurpose::EmailVerification => "restomate-verify-email",
        }
    }

    pub fn default_ttl_seconds(&self) -> i64 {
        match self {
            TokenPurpose::Session => 14 * 24 * 60 * 60, // 14 days
            TokenPurpose::EmailVerification => 48 * 60 * 60, // 48 hours
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("failed to decode token: {0}")]
    Decoding(jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Expired tokens get their own user-facing message in the middleware.
    pub fn is_expired(&self) -> bool {
        match self {
            TokenError::Decoding(e) => {
                matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerClaims {
    /// Owner id
    pub sub: i32,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Sign a token for the given owner and purpose.
pub fn sign(
    secret: &str,
    owner_id: i32,
    email: &str,
    purpose: TokenPurpose,
) -> Result<String, TokenError> {
    let iat = Utc::now().timestamp();
    let claims = OwnerClaims {
        sub: owner_id,
        email: email.to_string(),
        iss: ISSUER.to_string(),
        aud: purpose.audience().to_string(),
        iat,
        nbf: iat - 30, // 30 second clock skew allowance
        exp: iat + purpose.default_ttl_seconds(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Encoding)
}

/// Verify a token against the expected purpose, validating issuer, audience and
/// expiry.
pub fn verify(secret: &str, token: &str, purpose: TokenPurpose) -> Result<OwnerClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[purpose.audience()]);

    let token_data = decode::<OwnerClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(TokenError::Decoding)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn session_token_roundtrip() {
        let token = sign(SECRET, 17, "owner@example.com", TokenPurpose::Session)
            .expect("failed to sign");
        let claims =
            verify(SECRET, &token, TokenPurpose::Session).expect("failed to verify");

        assert_eq!(claims.sub, 17);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.aud, TokenPurpose::Session.audience());
    }

    #[test]
    fn verification_token_is_not_a_session() {
        let token = sign(SECRET, 17, "owner@example.com", TokenPurpose::EmailVerification)
            .expect("failed to sign");
        assert!(verify(SECRET, &token, TokenPurpose::Session).is_err());
        assert!(verify(SECRET, &token, TokenPurpose::EmailVerification).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(SECRET, 17, "owner@example.com", TokenPurpose::Session)
            .expect("failed to sign");
        assert!(verify("other-secret", &token, TokenPurpose::Session).is_err());
    }
}
