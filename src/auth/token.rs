//! Signed bearer tokens (HS256 JWT).
//!
//! Tokens always carry an expiry; verification checks signature, algorithm and
//! expiry with no leeway, and any failure rejects the token outright.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Principal;

pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub nickname: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `principal`, valid for the configured TTL from now.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<String, TokenError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id: principal.user_id,
            nickname: principal.nickname.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// Returns an error on a bad signature, malformed encoding or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::from_secs(3600))
    }

    fn principal() -> Principal {
        Principal {
            user_id: 42,
            nickname: "John Doe".to_string(),
        }
    }

    #[test]
    fn issue_then_verify_returns_claims() -> Result<(), TokenError> {
        let codec = codec();
        let token = codec.issue(&principal())?;
        let claims = codec.verify(&token)?;
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.nickname, "John Doe");
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[test]
    fn tampered_payload_is_rejected() -> Result<(), TokenError> {
        let codec = codec();
        let token = codec.issue(&principal())?;
        let other = codec.issue(&Principal {
            user_id: 7,
            nickname: "Mallory".to_string(),
        })?;

        // Splice another token's claims under the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        assert_eq!(parts.len(), 3);
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(codec.verify(&forged).is_err());
        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> Result<(), TokenError> {
        let token = codec().issue(&principal())?;
        let other = TokenCodec::new(b"other-secret", Duration::from_secs(3600));
        assert!(other.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), TokenError> {
        let codec = codec();
        let two_hours_ago = Utc::now().timestamp() - 7200;
        let token = codec.issue_at(&principal(), two_hours_ago)?;
        assert!(codec.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn malformed_token_is_rejected() {
        let codec = codec();
        assert!(codec.verify("").is_err());
        assert!(codec.verify("not-a-token").is_err());
        assert!(codec.verify("a.b.c").is_err());
    }
}
