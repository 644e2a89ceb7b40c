//! Store traits consumed by the engine
//!
//! The engine only reads. Each lookup is a single async call with no retry; an `Err`
//! is a final failure for the request that triggered it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gk_core::{GkResult, Id};
use gk_models::{ApiKey, Group, Principal, PrincipalCredentials, Tenant};
use parking_lot::RwLock;

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Find a principal by ID. The result never carries a password hash.
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Principal>>;

    /// Find a principal and its password hash by username (case-insensitive)
    async fn find_by_username(&self, username: &str) -> GkResult<Option<PrincipalCredentials>>;
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<ApiKey>>;
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Tenant>>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// All groups whose membership includes `principal_id`, permissions resolved to names
    async fn find_all_containing_user(&self, principal_id: Id) -> GkResult<Vec<Group>>;
}

/// The set of stores the engine reads from
#[derive(Clone)]
pub struct Stores {
    pub principals: Arc<dyn PrincipalStore>,
    pub api_keys: Arc<dyn ApiKeyStore>,
    pub tenants: Arc<dyn TenantStore>,
    pub groups: Arc<dyn GroupStore>,
}

impl Stores {
    /// Use one backend for every store
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: PrincipalStore + ApiKeyStore + TenantStore + GroupStore + 'static,
    {
        Self {
            principals: backend.clone(),
            api_keys: backend.clone(),
            tenants: backend.clone(),
            groups: backend,
        }
    }
}

/// In-memory store (for development/testing)
#[derive(Default)]
pub struct MemoryStore {
    principals: RwLock<HashMap<Id, PrincipalCredentials>>,
    api_keys: RwLock<HashMap<Id, ApiKey>>,
    tenants: RwLock<HashMap<Id, Tenant>>,
    groups: RwLock<HashMap<Id, Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_principal(&self, principal: Principal, password_hash: impl Into<String>) {
        self.principals.write().insert(
            principal.id,
            PrincipalCredentials {
                principal,
                password_hash: password_hash.into(),
            },
        );
    }

    pub fn insert_api_key(&self, key: ApiKey) {
        self.api_keys.write().insert(key.id, key);
    }

    pub fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.write().insert(tenant.id, tenant);
    }

    pub fn insert_group(&self, group: Group) {
        self.groups.write().insert(group.id, group);
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Principal>> {
        Ok(self
            .principals
            .read()
            .get(&id)
            .map(|record| record.principal.clone()))
    }

    async fn find_by_username(&self, username: &str) -> GkResult<Option<PrincipalCredentials>> {
        Ok(self
            .principals
            .read()
            .values()
            .find(|record| record.principal.username.eq_ignore_ascii_case(username))
            .cloned())
    }
}

#[async_trait]
impl ApiKeyStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<ApiKey>> {
        Ok(self.api_keys.read().get(&id).cloned())
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Tenant>> {
        Ok(self.tenants.read().get(&id).cloned())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn find_all_containing_user(&self, principal_id: Id) -> GkResult<Vec<Group>> {
        Ok(self
            .groups
            .read()
            .values()
            .filter(|group| group.contains(principal_id))
            .cloned()
            .collect())
    }
}
