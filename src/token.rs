//! Signed access and refresh token issuance.
//!
//! Access tokens are stateless and self-contained; there is no revocation
//! before natural expiry. Refresh tokens are additionally persisted on the
//! account, so clearing that server-side copy (logout) revokes them
//! immediately. The asymmetry is intentional.

use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Claims carried by both token kinds: subject identity only. Never the
/// password hash, codes, or anything else from the account row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and validates HS256-signed tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn issue_access_token(&self, sub: Uuid, email: &str) -> Result<String, AuthError> {
        self.issue(sub, email, self.access_ttl_seconds)
    }

    pub fn issue_refresh_token(&self, sub: Uuid, email: &str) -> Result<String, AuthError> {
        self.issue(sub, email, self.refresh_ttl_seconds)
    }

    /// TTL surfaced to clients alongside a fresh access token, in seconds.
    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    fn issue(&self, sub: Uuid, email: &str, ttl_seconds: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .context("failed to sign token")
            .map_err(AuthError::Unavailable)
    }

    /// Decode and validate a token, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidOrExpiredToken)
    }
}

#[cfg(test)]
mod tests {
    use super::TokenIssuer;
    use crate::error::AuthError;
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-signing-secret";

    #[test]
    fn issue_and_verify_round_trip() {
        let issuer = TokenIssuer::new(SECRET, 900, 7 * 24 * 3600);
        let sub = Uuid::new_v4();
        let token = issuer
            .issue_access_token(sub, "a@example.com")
            .expect("token issued");

        let claims = issuer.verify(&token).expect("token verifies");
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // beyond the default validation leeway
        let issuer = TokenIssuer::new(SECRET, -120, -120);
        let token = issuer
            .issue_access_token(Uuid::new_v4(), "a@example.com")
            .expect("token issued");
        let err = issuer.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 900, 900);
        let other = TokenIssuer::new(b"another-secret", 900, 900);
        let token = other
            .issue_access_token(Uuid::new_v4(), "a@example.com")
            .expect("token issued");
        assert!(matches!(
            issuer.verify(&token),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 900, 900);
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(AuthError::InvalidOrExpiredToken)
        ));
    }
}
