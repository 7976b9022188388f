//! Session tokens.
//!
//! Sessions are HMAC-SHA256 signed JWTs carrying the caller's id, username
//! and role.

use std::time::Duration;

use bastion_core::{Role, TokenData, UserId};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while issuing or verifying a session token.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signature, structure or expiry check failed.
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The configured lifetime cannot be represented.
    #[error("session token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Issues and verifies session tokens.
pub trait JwtService: Send + Sync {
    /// Signs a token for `token_data`.
    fn generate_token(&self, token_data: &TokenData) -> Result<String, JwtError>;

    /// Verifies signature and expiry and returns the carried claims.
    fn parse_and_verify_token(&self, token: &str) -> Result<TokenData, JwtError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: UserId,
    username: String,
    role: Role,
    exp: i64,
    iat: i64,
}

/// HMAC-SHA256 implementation of [`JwtService`].
pub struct HmacJwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for HmacJwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacJwtService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacJwtService {
    /// Creates a service signing with `secret`.
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

    /// Creates a service with a random per-process secret.
    ///
    /// Tokens issued by it do not survive a restart.
    pub fn with_random_secret(ttl: Duration) -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::new(&secret, ttl)
    }

    /// Lifetime of issued tokens.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }
}

impl JwtService for HmacJwtService {
    fn generate_token(&self, token_data: &TokenData) -> Result<String, JwtError> {
        let ttl = i64::try_from(self.ttl.as_secs()).map_err(|_| JwtError::LifetimeOutOfRange)?;
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: token_data.id,
            username: token_data.username.clone(),
            role: token_data.role,
            exp: now.saturating_add(ttl),
            iat: now,
        };
        self.encode_claims(&claims)
    }

    fn parse_and_verify_token(&self, token: &str) -> Result<TokenData, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        Ok(TokenData {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        })
    }
}
