//! Session authentication
//!
//! Sessions are stateless: everything needed to validate one is in the signed token,
//! and the principal (including its role) is reloaded on every request.

use std::sync::Arc;

use gk_models::Principal;
use tracing::debug;

use crate::credentials::AUTH_COOKIE;
use crate::error::AuthError;
use crate::jwt::SessionClaims;
use crate::store::PrincipalStore;
use crate::tenancy::TenancyGuard;

/// Resolves a verified session token to its principal
#[derive(Clone)]
pub struct SessionResolver {
    principals: Arc<dyn PrincipalStore>,
    tenancy: TenancyGuard,
}

impl SessionResolver {
    pub fn new(principals: Arc<dyn PrincipalStore>, tenancy: TenancyGuard) -> Self {
        Self { principals, tenancy }
    }

    pub async fn resolve(&self, claims: &SessionClaims) -> Result<Principal, AuthError> {
        let principal = self
            .principals
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !principal.is_active() {
            return Err(AuthError::PrincipalInactive);
        }

        self.tenancy.check(&principal).await?;

        debug!(principal_id = principal.id, role = principal.role, "Resolved session principal");
        Ok(principal)
    }
}

/// Cookie configuration for the session token
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: AUTH_COOKIE.to_string(),
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    /// Build the `Set-Cookie` value for a freshly issued token.
    ///
    /// `Max-Age` is only emitted for persistent ("remember me") sessions; otherwise the
    /// cookie lives for the browser session.
    pub fn build_cookie(&self, token: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{}={}; Path={};", self.name, token, self.path);
        if let Some(max_age) = max_age {
            cookie.push_str(&format!(" Max-Age={};", max_age));
        }
        cookie
    }

    /// Build the `Set-Cookie` value that clears the session cookie
    pub fn build_clear_cookie(&self) -> String {
        format!(
            "{}=deleted; path={}; expires=Thu, 01 Jan 1970 00:00:00 GMT;",
            self.name, self.path
        )
    }
}
