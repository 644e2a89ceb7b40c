//! Username/password login
//!
//! Login is the only place a session token is minted from scratch; afterwards the
//! rotator keeps it alive. How passwords are hashed is left to a [`PasswordVerifier`].

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher,
};
use gk_core::{GkError, GkResult};
use gk_models::Principal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::jwt::SessionClaims;
use crate::rotation::{TokenRotator, TokenUpdate};
use crate::session::CookieConfig;
use crate::store::PrincipalStore;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Checks a plaintext password against a stored hash
pub trait PasswordVerifier: Send + Sync {
    /// `Ok(false)` for a wrong password; `Err` when the stored hash is unusable
    fn verify(&self, password: &str, stored_hash: &str) -> GkResult<bool>;
}

/// Verifies argon2 PHC strings
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    /// Hash a plaintext password into a PHC string
    pub fn hash_password(password: &str) -> GkResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| GkError::Internal(format!("password hashing failed: {}", e)))
    }
}

impl PasswordVerifier for Argon2Verifier {
    fn verify(&self, password: &str, stored_hash: &str) -> GkResult<bool> {
        use argon2::PasswordVerifier as _;

        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| GkError::Internal(format!("unreadable password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Login request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub remember: bool,
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub session: TokenUpdate,
    pub set_cookie: String,
}

pub struct LoginService {
    principals: Arc<dyn PrincipalStore>,
    verifier: Arc<dyn PasswordVerifier>,
    issuer: TokenRotator,
    cookie: CookieConfig,
}

impl LoginService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        verifier: Arc<dyn PasswordVerifier>,
        issuer: TokenRotator,
        cookie: CookieConfig,
    ) -> Self {
        Self {
            principals,
            verifier,
            issuer,
            cookie,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> GkResult<LoginOutcome> {
        let (username, password) = match (
            request.username.as_deref().filter(|u| !u.is_empty()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(username), Some(password)) => (username, password),
            _ => {
                return Err(GkError::bad_request(
                    "Unable to authenticate user without any credentials.",
                ))
            }
        };

        let Some(record) = self.principals.find_by_username(username).await? else {
            warn!("Login failed: unknown username");
            return Err(GkError::unauthorized(BAD_CREDENTIALS));
        };

        if !record.principal.is_active() {
            warn!(principal_id = record.principal.id, "Login refused: account disabled");
            return Err(GkError::unauthorized("Requested account has been disabled."));
        }

        let verifier = Arc::clone(&self.verifier);
        let password = password.to_owned();
        let stored_hash = record.password_hash.clone();
        let check = move || verifier.verify(&password, &stored_hash);
        let matches = tokio::task::spawn_blocking(check)
            .await
            .map_err(|e| GkError::Internal(format!("password check did not finish: {}", e)))??;

        if !matches {
            warn!(principal_id = record.principal.id, "Login failed: wrong password");
            return Err(GkError::unauthorized(BAD_CREDENTIALS));
        }

        let claims = SessionClaims::new(record.principal.id, request.remember);
        let session = self
            .issuer
            .issue(claims)
            .map_err(|e| GkError::Internal(e.to_string()))?;
        debug!(
            expires_in = session.expires_in,
            remember = request.remember,
            "Generated session token"
        );

        let set_cookie = session.set_cookie(&self.cookie);
        info!(
            principal_id = record.principal.id,
            username = %record.principal.username,
            "Successfully logged in"
        );

        Ok(LoginOutcome {
            principal: record.principal,
            session,
            set_cookie,
        })
    }
}
