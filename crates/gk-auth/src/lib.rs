//! # gk-auth
//!
//! Authentication and authorization engine for Gatekeeper.
//!
//! ## Features
//!
//! - Credential extraction (`api-key` header, `AuthToken` cookie, bearer token)
//! - HS256 session and API-key tokens
//! - Sliding session expiration
//! - Tenant isolation
//! - Role hierarchy and group permission checks
//! - Username/password login

pub mod api_key;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod login;
pub mod middleware;
pub mod permissions;
pub mod roles;
pub mod rotation;
pub mod session;
pub mod store;
pub mod tenancy;

pub use api_key::{effective_key_role, IssuedKey, KeyIssuer, KeyResolver};
pub use credentials::{extract_credential, Credential, RequestContext, API_KEY_HEADER, AUTH_COOKIE};
pub use error::AuthError;
pub use jwt::{ApiKeyClaims, Claims, JwtError, SessionClaims, TokenCodec, TtlPolicy};
pub use login::{Argon2Verifier, LoginOutcome, LoginRequest, LoginService, PasswordVerifier};
pub use middleware::{
    AuthConfig, Authenticated, Authenticator, CredentialPath, Rejection, ResponseIntent,
};
pub use permissions::GroupPermissionAuthorizer;
pub use roles::RoleAuthorizer;
pub use rotation::{should_rotate, TokenRotator, TokenUpdate, ROTATION_WINDOW_SECONDS};
pub use session::{CookieConfig, SessionResolver};
pub use store::{ApiKeyStore, GroupStore, MemoryStore, PrincipalStore, Stores, TenantStore};
pub use tenancy::TenancyGuard;
