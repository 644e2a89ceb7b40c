//! Sliding expiration for session tokens
//!
//! A session token close to expiry is replaced on the way through. The replacement
//! only lives on the client; nothing is recorded server-side.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{Claims, SessionClaims, TokenCodec, TtlPolicy};
use crate::session::CookieConfig;

/// Tokens with less than this much life left are rotated
pub const ROTATION_WINDOW_SECONDS: i64 = 2 * 24 * 60 * 60;

/// A replacement session token for the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUpdate {
    pub token: String,
    pub expires_in: u64,
    #[serde(skip)]
    pub remember: bool,
}

impl TokenUpdate {
    /// `Max-Age` is only set for "remember me" sessions
    pub fn set_cookie(&self, cookie: &CookieConfig) -> String {
        let max_age = self.remember.then_some(self.expires_in);
        cookie.build_cookie(&self.token, max_age)
    }
}

/// Whether a token expiring at `exp` should be rotated at `now`
pub fn should_rotate(exp: i64, now: i64) -> bool {
    exp - now < ROTATION_WINDOW_SECONDS
}

#[derive(Clone)]
pub struct TokenRotator {
    codec: Arc<TokenCodec>,
    ttl: TtlPolicy,
}

impl TokenRotator {
    pub fn new(codec: Arc<TokenCodec>, ttl: TtlPolicy) -> Self {
        Self { codec, ttl }
    }

    /// Issue a session token carrying the same claims with a fresh lifetime
    pub fn issue(&self, claims: SessionClaims) -> Result<TokenUpdate, AuthError> {
        let expires_in = self.ttl.session_ttl(claims.remember);
        let token = self.codec.sign(&claims, expires_in)?;

        Ok(TokenUpdate {
            token,
            expires_in,
            remember: claims.remember,
        })
    }

    /// Returns a complete update or nothing; a signing failure fails the request.
    pub fn maybe_rotate(
        &self,
        claims: &Claims<SessionClaims>,
        now: i64,
    ) -> Result<Option<TokenUpdate>, AuthError> {
        if !should_rotate(claims.exp, now) {
            return Ok(None);
        }

        let update = self.issue(claims.payload)?;
        debug!(
            principal_id = claims.payload.user_id(),
            expires_in = update.expires_in,
            "Rotated session token"
        );
        Ok(Some(update))
    }
}
