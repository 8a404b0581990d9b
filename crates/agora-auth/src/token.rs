use agora_types::api::Claims;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 session tokens with a secret injected at
/// construction.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` that expires after the configured ttl.
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken> {
        self.issue_with_expiry(user_id, Utc::now() + self.ttl)
    }

    pub fn issue_with_expiry(&self, user_id: i64, expires_at: DateTime<Utc>) -> Result<IssuedToken> {
        let claims = Claims {
            user_id,
            iat: Utc::now().timestamp().max(0) as u64,
            exp: expires_at.timestamp().max(0) as u64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry, returning the user id the token was
    /// issued for.
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret, Duration::hours(24))
    }

    #[test]
    fn issue_validate_roundtrip() {
        let issuer = issuer("test-secret");
        let before = Utc::now();
        let issued = issuer.issue(42).unwrap();
        assert!(issued.expires_at >= before + issuer.ttl());
        assert!(issued.expires_at <= Utc::now() + issuer.ttl());
        assert_eq!(issuer.validate(&issued.token), Ok(42));
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let issued = issuer("secret-a").issue(7).unwrap();
        assert_eq!(
            issuer("secret-b").validate(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer("test-secret");
        let issued = issuer
            .issue_with_expiry(7, Utc::now() - Duration::minutes(5))
            .unwrap();
        assert_eq!(issuer.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = issuer("test-secret");
        assert_eq!(issuer.validate("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(issuer.validate(""), Err(TokenError::Malformed));
    }
}
