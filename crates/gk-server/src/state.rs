//! Shared application state

use std::sync::Arc;

use gk_auth::{
    Argon2Verifier, AuthConfig, Authenticator, GroupPermissionAuthorizer, KeyIssuer,
    LoginService, Stores, TokenRotator,
};
use gk_core::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub login: Arc<LoginService>,
    pub keys: KeyIssuer,
    pub permissions: GroupPermissionAuthorizer,
}

impl AppState {
    /// Wire every service to the same config and stores
    pub fn new(config: &AppConfig, stores: Stores) -> Self {
        let auth = AuthConfig::from_app_config(config);

        let login = LoginService::new(
            stores.principals.clone(),
            Arc::new(Argon2Verifier),
            TokenRotator::new(auth.codec.clone(), auth.ttl),
            auth.cookie.clone(),
        );
        let keys = KeyIssuer::new(auth.codec.clone(), auth.ttl, stores.api_keys.clone());
        let permissions = GroupPermissionAuthorizer::new(stores.groups.clone());

        Self {
            authenticator: Authenticator::new(auth, stores),
            login: Arc::new(login),
            keys,
            permissions,
        }
    }
}
