//! Per-request authentication
//!
//! [`Authenticator`] turns a [`RequestContext`] into either an [`Authenticated`]
//! principal or a [`Rejection`]. It knows nothing about HTTP frameworks; the server
//! wraps it in an axum layer and renders a rejection through [`Rejection::into_intent`].

use std::sync::Arc;

use chrono::Utc;
use gk_core::config::AppConfig;
use gk_core::ErrorBody;
use gk_models::Principal;
use tracing::{debug, error, warn};

use crate::api_key::KeyResolver;
use crate::credentials::{extract_credential, Credential, RequestContext};
use crate::error::AuthError;
use crate::jwt::{ApiKeyClaims, SessionClaims, TokenCodec, TtlPolicy};
use crate::rotation::{TokenRotator, TokenUpdate};
use crate::session::{CookieConfig, SessionResolver};
use crate::store::Stores;
use crate::tenancy::TenancyGuard;

/// Authentication configuration, resolved once at startup
#[derive(Clone)]
pub struct AuthConfig {
    pub codec: Arc<TokenCodec>,
    pub ttl: TtlPolicy,
    pub multi_tenancy: bool,
    pub cookie: CookieConfig,
}

impl AuthConfig {
    /// Config with default lifetimes and tenancy off
    pub fn new(secret: &[u8]) -> Self {
        Self {
            codec: Arc::new(TokenCodec::new(secret)),
            ttl: TtlPolicy::default(),
            multi_tenancy: false,
            cookie: CookieConfig::default(),
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            codec: Arc::new(TokenCodec::from_config(&config.auth)),
            ttl: TtlPolicy::from_config(&config.auth),
            multi_tenancy: config.features.multi_tenancy,
            cookie: CookieConfig::default(),
        }
    }

    pub fn with_multi_tenancy(mut self, enabled: bool) -> Self {
        self.multi_tenancy = enabled;
        self
    }
}

/// Which credential the request was judged on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPath {
    ApiKey,
    Session,
}

/// A request that passed authentication
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    pub path: CredentialPath,
    /// Replacement session token, present when the presented one was rotated
    pub update: Option<TokenUpdate>,
    set_cookie: Option<String>,
}

impl Authenticated {
    /// `Set-Cookie` value carrying the rotated token, if any
    pub fn set_cookie(&self) -> Option<&str> {
        self.set_cookie.as_deref()
    }
}

/// A refused request, tagged with the path that refused it
#[derive(Debug)]
pub struct Rejection {
    pub error: AuthError,
    pub path: CredentialPath,
}

/// Transport-independent response for a refused request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseIntent {
    pub status: u16,
    pub body: ErrorBody,
    pub set_cookie: Option<String>,
}

impl Rejection {
    fn new(path: CredentialPath, error: AuthError) -> Self {
        Self { error, path }
    }

    /// Key failures keep their distinctions; every session failure becomes a plain 401
    /// that also clears the cookie.
    pub fn into_intent(self, cookie: &CookieConfig) -> ResponseIntent {
        match self.path {
            CredentialPath::ApiKey => {
                let (status, message) = match self.error {
                    AuthError::Internal(_) => (500, "Invalid Key"),
                    AuthError::CredentialInvalid => (401, "Invalid Key"),
                    AuthError::TenantInvalid => (401, "Invalid tenant"),
                    _ => (401, "Auth Error"),
                };
                ResponseIntent {
                    status,
                    body: ErrorBody::new(status, message),
                    set_cookie: None,
                }
            }
            CredentialPath::Session => ResponseIntent {
                status: 401,
                body: ErrorBody::new(401, "Auth Error"),
                set_cookie: Some(cookie.build_clear_cookie()),
            },
        }
    }
}

/// Runs the key path or the session path for each request
#[derive(Clone)]
pub struct Authenticator {
    config: AuthConfig,
    keys: KeyResolver,
    sessions: SessionResolver,
    tenancy: TenancyGuard,
    rotator: TokenRotator,
}

impl Authenticator {
    pub fn new(config: AuthConfig, stores: Stores) -> Self {
        let tenancy = TenancyGuard::new(config.multi_tenancy, stores.tenants.clone());

        Self {
            keys: KeyResolver::new(stores.api_keys.clone(), stores.principals.clone()),
            sessions: SessionResolver::new(stores.principals.clone(), tenancy.clone()),
            rotator: TokenRotator::new(config.codec.clone(), config.ttl),
            tenancy,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn authenticate(&self, ctx: &RequestContext) -> Result<Authenticated, Rejection> {
        let result = match extract_credential(ctx) {
            Credential::ApiKey(token) => self
                .authenticate_key(&token)
                .await
                .map_err(|e| Rejection::new(CredentialPath::ApiKey, e)),
            Credential::SessionToken(token) => self
                .authenticate_session(&token)
                .await
                .map_err(|e| Rejection::new(CredentialPath::Session, e)),
            Credential::None => Err(Rejection::new(
                CredentialPath::Session,
                AuthError::CredentialMissing,
            )),
        };

        if let Err(rejection) = &result {
            if rejection.error.is_internal() {
                error!(path = ?rejection.path, error = %rejection.error, "Authentication fault");
            } else {
                warn!(path = ?rejection.path, reason = %rejection.error, "Authentication rejected");
            }
        }

        result
    }

    async fn authenticate_key(&self, token: &str) -> Result<Authenticated, AuthError> {
        let claims = self.config.codec.verify::<ApiKeyClaims>(token)?;
        let principal = self.keys.resolve(&claims.payload).await?;
        self.tenancy.check(&principal).await?;

        debug!(principal_id = principal.id, "Authenticated with API key");
        Ok(Authenticated {
            principal,
            path: CredentialPath::ApiKey,
            update: None,
            set_cookie: None,
        })
    }

    async fn authenticate_session(&self, token: &str) -> Result<Authenticated, AuthError> {
        let claims = self.config.codec.verify::<SessionClaims>(token)?;
        let principal = self.sessions.resolve(&claims.payload).await?;

        let update = self.rotator.maybe_rotate(&claims, Utc::now().timestamp())?;
        let set_cookie = update
            .as_ref()
            .map(|update| update.set_cookie(&self.config.cookie));

        debug!(
            principal_id = principal.id,
            rotated = update.is_some(),
            "Authenticated with session token"
        );
        Ok(Authenticated {
            principal,
            path: CredentialPath::Session,
            update,
            set_cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ApiKeyStore, GroupStore, MemoryStore, PrincipalStore, TenantStore};
    use async_trait::async_trait;
    use gk_core::{GkError, GkResult, Id, Status};
    use gk_models::{ApiKey, Group, PrincipalCredentials, Tenant};

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";
    const DAY: u64 = 24 * 60 * 60;

    fn store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_tenant(Tenant::new(1, "acme"));
        store.insert_tenant(Tenant {
            status: Status::Inactive,
            ..Tenant::new(2, "defunct")
        });
        store.insert_principal(Principal::new(1, "alice").with_role(1).with_tenant(1), "hash");
        store.insert_principal(Principal::new(2, "bob").with_role(2).with_tenant(2), "hash");
        store.insert_api_key(ApiKey::new(10, 1, "alice-ci", 2));
        store.insert_api_key(ApiKey::new(20, 2, "bob-ci", 2));
        store
    }

    fn authenticator(multi_tenancy: bool) -> Authenticator {
        let config = AuthConfig::new(SECRET).with_multi_tenancy(multi_tenancy);
        Authenticator::new(config, Stores::from_backend(store()))
    }

    fn session_token(user_id: Id, ttl: u64) -> String {
        TokenCodec::new(SECRET)
            .sign(&SessionClaims::new(user_id, true), ttl)
            .unwrap()
    }

    fn key_token(key_id: Id) -> String {
        TokenCodec::new(SECRET)
            .sign(&ApiKeyClaims::new(key_id), DAY)
            .unwrap()
    }

    #[tokio::test]
    async fn test_session_cookie_success() {
        let cookie = format!("AuthToken={}", session_token(1, 10 * DAY));
        let ctx = RequestContext::from_pairs(&[("Cookie", cookie)]);

        let auth = authenticator(true).authenticate(&ctx).await.unwrap();
        assert_eq!(auth.path, CredentialPath::Session);
        assert_eq!(auth.principal.username, "alice");
        assert!(auth.update.is_none());
        assert!(auth.set_cookie().is_none());
    }

    #[tokio::test]
    async fn test_bearer_session_success() {
        let header = format!("Bearer {}", session_token(1, 10 * DAY));
        let ctx = RequestContext::from_pairs(&[("Authorization", header)]);

        let auth = authenticator(false).authenticate(&ctx).await.unwrap();
        assert_eq!(auth.principal.id, 1);
    }

    #[tokio::test]
    async fn test_near_expiry_session_is_rotated() {
        let cookie = format!("AuthToken={}", session_token(1, DAY));
        let ctx = RequestContext::from_pairs(&[("Cookie", cookie)]);

        let auth = authenticator(false).authenticate(&ctx).await.unwrap();
        let update = auth.update.clone().unwrap();
        assert_eq!(update.expires_in, TtlPolicy::default().remember_seconds);
        let expected = format!(
            "AuthToken={}; Path=/; Max-Age={};",
            update.token, update.expires_in
        );
        assert_eq!(auth.set_cookie(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_api_key_wins_over_valid_cookie() {
        let cookie = format!("AuthToken={}", session_token(1, 10 * DAY));
        let ctx = RequestContext::from_pairs(&[
            ("Cookie", cookie),
            ("api-key", "garbage".to_string()),
        ]);

        let rejection = authenticator(false).authenticate(&ctx).await.unwrap_err();
        assert_eq!(rejection.path, CredentialPath::ApiKey);
        let intent = rejection.into_intent(&CookieConfig::default());
        assert_eq!(intent.status, 401);
        assert_eq!(intent.body.message, "Invalid Key");
        assert!(intent.set_cookie.is_none());
    }

    #[tokio::test]
    async fn test_valid_api_key_ignores_bad_cookie() {
        let ctx = RequestContext::from_pairs(&[
            ("Cookie", "AuthToken=garbage".to_string()),
            ("api-key", key_token(10)),
        ]);

        let auth = authenticator(false).authenticate(&ctx).await.unwrap();
        assert_eq!(auth.path, CredentialPath::ApiKey);
        assert_eq!(auth.principal.id, 1);
        assert_eq!(auth.principal.role, 2);
        assert!(auth.principal.is_delegated());
        assert!(auth.update.is_none());
    }

    #[tokio::test]
    async fn test_tenancy_applies_to_both_paths() {
        let session = RequestContext::from_pairs(&[(
            "Cookie",
            format!("AuthToken={}", session_token(2, 10 * DAY)),
        )]);
        let key = RequestContext::from_pairs(&[("api-key", key_token(20))]);

        assert!(authenticator(false).authenticate(&session).await.is_ok());
        assert!(authenticator(false).authenticate(&key).await.is_ok());

        let enabled = authenticator(true);
        let rejection = enabled.authenticate(&session).await.unwrap_err();
        assert!(matches!(rejection.error, AuthError::TenantInvalid));

        let rejection = enabled.authenticate(&key).await.unwrap_err();
        let intent = rejection.into_intent(&CookieConfig::default());
        assert_eq!(intent.status, 401);
        assert_eq!(intent.body.message, "Invalid tenant");
    }

    #[tokio::test]
    async fn test_session_failures_clear_cookie() {
        let cookie = CookieConfig::default();
        let cases = [
            RequestContext::default(),
            RequestContext::from_pairs(&[("Cookie", "AuthToken=garbage")]),
            RequestContext::from_pairs(&[(
                "Cookie",
                format!("AuthToken={}", session_token(404, 10 * DAY)).as_str(),
            )]),
        ];

        for ctx in cases {
            let intent = authenticator(false)
                .authenticate(&ctx)
                .await
                .unwrap_err()
                .into_intent(&cookie);
            assert_eq!(intent.status, 401);
            assert_eq!(intent.body, ErrorBody::new(401, "Auth Error"));
            assert_eq!(intent.set_cookie, Some(cookie.build_clear_cookie()));
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let token = TokenCodec::new(SECRET)
            .sign_at(
                &SessionClaims::new(1, false),
                60,
                Utc::now().timestamp() - 3600,
            )
            .unwrap();
        let ctx = RequestContext::from_pairs(&[("Authorization", format!("Bearer {}", token))]);

        let rejection = authenticator(false).authenticate(&ctx).await.unwrap_err();
        assert!(matches!(rejection.error, AuthError::CredentialInvalid));
    }

    struct FailingStore;

    #[async_trait]
    impl PrincipalStore for FailingStore {
        async fn find_by_id(&self, _id: Id) -> GkResult<Option<Principal>> {
            Err(GkError::Database("connection reset".into()))
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> GkResult<Option<PrincipalCredentials>> {
            Err(GkError::Database("connection reset".into()))
        }
    }

    #[async_trait]
    impl ApiKeyStore for FailingStore {
        async fn find_by_id(&self, _id: Id) -> GkResult<Option<ApiKey>> {
            Err(GkError::Database("connection reset".into()))
        }
    }

    #[async_trait]
    impl TenantStore for FailingStore {
        async fn find_by_id(&self, _id: Id) -> GkResult<Option<Tenant>> {
            Err(GkError::Database("connection reset".into()))
        }
    }

    #[async_trait]
    impl GroupStore for FailingStore {
        async fn find_all_containing_user(&self, _id: Id) -> GkResult<Vec<Group>> {
            Err(GkError::Database("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_store_fault_differs_by_path() {
        let stores = Stores::from_backend(Arc::new(FailingStore));
        let authenticator = Authenticator::new(AuthConfig::new(SECRET), stores);
        let cookie = CookieConfig::default();

        let key = RequestContext::from_pairs(&[("api-key", key_token(10))]);
        let intent = authenticator
            .authenticate(&key)
            .await
            .unwrap_err()
            .into_intent(&cookie);
        assert_eq!(intent.status, 500);
        assert!(!intent.body.message.contains("connection reset"));

        let session = RequestContext::from_pairs(&[(
            "Cookie",
            format!("AuthToken={}", session_token(1, 10 * DAY)),
        )]);
        let intent = authenticator
            .authenticate(&session)
            .await
            .unwrap_err()
            .into_intent(&cookie);
        assert_eq!(intent.status, 401);
        assert_eq!(intent.body.message, "Auth Error");
    }
}
