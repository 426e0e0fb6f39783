use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => AppError::Unauthorized,
            TokenError::Signing(e) => AppError::Internal(anyhow::anyhow!(e)),
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies HS256 access and refresh tokens, each kind with its own secret.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: KeyPair::new(access_secret, access_ttl),
            refresh: KeyPair::new(refresh_secret, refresh_ttl),
            validation: Validation::default(),
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.keys(kind).ttl
    }

    pub fn issue(&self, kind: TokenKind, sub: Uuid, role: Role) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = Utc::now();
        let claims = Claims {
            sub,
            role,
            iat: now.timestamp(),
            exp: (now + keys.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &keys.encoding).map_err(TokenError::Signing)
    }

    pub fn issue_pair(&self, sub: Uuid, role: Role) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, sub, role)?,
            refresh_token: self.issue(TokenKind::Refresh, sub, role)?,
        })
    }

    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "access-secret",
            "refresh-secret",
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let tokens = service();
        let id = Uuid::new_v4();
        let token = tokens.issue(TokenKind::Access, id, Role::Recruiter).unwrap();
        let claims = tokens.verify(TokenKind::Access, &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Recruiter);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_kinds_do_not_cross_verify() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4(), Role::JobSeeker).unwrap();
        assert!(tokens.verify(TokenKind::Refresh, &pair.access_token).is_err());
        assert!(tokens.verify(TokenKind::Access, &pair.refresh_token).is_err());
        assert!(tokens.verify(TokenKind::Refresh, &pair.refresh_token).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new("a", "r", Duration::minutes(-10), Duration::days(1));
        let token = tokens
            .issue(TokenKind::Access, Uuid::new_v4(), Role::Admin)
            .unwrap();
        assert!(matches!(
            tokens.verify(TokenKind::Access, &token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            service().verify(TokenKind::Access, "not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }
}
