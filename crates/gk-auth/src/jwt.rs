//! Token signing and verification
//!
//! Session tokens and API-key tokens are both HS256 JWTs signed with the same secret.
//! They differ only in payload shape, so a session token presented as an API key (or
//! the other way round) fails to decode.

use chrono::Utc;
use gk_core::config::TokenConfig;
use gk_core::Id;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Signed token envelope: the payload plus registered time claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub payload: T,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub id: Id,
}

/// Payload of a session token. Deliberately carries no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: SubjectRef,
    #[serde(default)]
    pub remember: bool,
}

impl SessionClaims {
    pub fn new(user_id: Id, remember: bool) -> Self {
        Self {
            user: SubjectRef { id: user_id },
            remember,
        }
    }

    pub fn user_id(&self) -> Id {
        self.user.id
    }
}

/// Payload of an API-key token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyClaims {
    pub key: SubjectRef,
}

impl ApiKeyClaims {
    pub fn new(api_key_id: Id) -> Self {
        Self {
            key: SubjectRef { id: api_key_id },
        }
    }

    pub fn api_key_id(&self) -> Id {
        self.key.id
    }
}

/// Token errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Token signature is invalid")]
    BadSignature,
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// Signs and verifies tokens with a shared HMAC secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec with the given secret
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes())
    }

    /// Sign `payload` so that it expires `ttl_seconds` from now
    pub fn sign<T: Serialize>(&self, payload: &T, ttl_seconds: u64) -> Result<String, JwtError> {
        self.sign_at(payload, ttl_seconds, Utc::now().timestamp())
    }

    /// Sign `payload` as if issued at `issued_at`
    pub fn sign_at<T: Serialize>(
        &self,
        payload: &T,
        ttl_seconds: u64,
        issued_at: i64,
    ) -> Result<String, JwtError> {
        let ttl = i64::try_from(ttl_seconds)
            .map_err(|_| JwtError::EncodingFailed("ttl out of range".to_string()))?;

        let claims = Claims {
            payload,
            exp: issued_at.saturating_add(ttl),
            iat: issued_at,
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify the signature and expiry of `token` and decode its payload
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<Claims<T>, JwtError> {
        let token_data = decode::<Claims<T>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::BadSignature,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Lifetimes of issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Session lifetime without "remember me"
    pub session_seconds: u64,
    /// Session lifetime with "remember me"
    pub remember_seconds: u64,
    /// Default API-key token lifetime
    pub api_key_seconds: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            session_seconds: gk_core::config::DEFAULT_SESSION_TTL_SECONDS,
            remember_seconds: gk_core::config::DEFAULT_REMEMBER_TTL_SECONDS,
            api_key_seconds: gk_core::config::DEFAULT_API_KEY_TTL_SECONDS,
        }
    }
}

impl TtlPolicy {
    pub fn from_config(config: &TokenConfig) -> Self {
        Self {
            session_seconds: config.session_ttl_seconds,
            remember_seconds: config.remember_ttl_seconds,
            api_key_seconds: config.api_key_ttl_seconds,
        }
    }

    pub fn session_ttl(&self, remember: bool) -> u64 {
        if remember {
            self.remember_seconds
        } else {
            self.session_seconds
        }
    }

    /// Caller-supplied `life` wins over the default
    pub fn api_key_ttl(&self, life: Option<u64>) -> u64 {
        life.unwrap_or(self.api_key_seconds)
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
