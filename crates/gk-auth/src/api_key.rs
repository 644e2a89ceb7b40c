//! API key authentication
//!
//! An API-key token names a key record; the key names its owner. The request runs as
//! the owner, clamped to whichever of the two roles is less privileged.

use std::sync::Arc;

use gk_core::{GkError, GkResult, Id, RoleRank};
use gk_models::principal::API_KEY_FIELD;
use gk_models::Principal;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{ApiKeyClaims, TokenCodec, TtlPolicy};
use crate::store::{ApiKeyStore, PrincipalStore};

/// Role a request runs with when authenticated through a key.
///
/// Ranks grow as privilege shrinks, so the larger number is the weaker role and a key
/// can never lift its owner above the owner's own rank.
pub fn effective_key_role(owner_role: RoleRank, key_role: RoleRank) -> RoleRank {
    owner_role.max(key_role)
}

/// Resolves a verified API-key token to the principal it acts for
#[derive(Clone)]
pub struct KeyResolver {
    api_keys: Arc<dyn ApiKeyStore>,
    principals: Arc<dyn PrincipalStore>,
}

impl KeyResolver {
    pub fn new(api_keys: Arc<dyn ApiKeyStore>, principals: Arc<dyn PrincipalStore>) -> Self {
        Self {
            api_keys,
            principals,
        }
    }

    pub async fn resolve(&self, claims: &ApiKeyClaims) -> Result<Principal, AuthError> {
        let key = self
            .api_keys
            .find_by_id(claims.api_key_id())
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        let mut principal = self
            .principals
            .find_by_id(key.owner_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !principal.is_active() {
            return Err(AuthError::PrincipalInactive);
        }

        principal.role = effective_key_role(principal.role, key.role);

        let key_value =
            serde_json::to_value(&key).map_err(|e| AuthError::Internal(e.to_string()))?;
        principal
            .additional_fields
            .insert(API_KEY_FIELD.to_string(), key_value);

        debug!(
            principal_id = principal.id,
            api_key_id = key.id,
            effective_role = principal.role,
            "Resolved API key owner"
        );

        principal.delegated_api_key = Some(key);
        Ok(principal)
    }
}

/// Signed API-key token handed back to the key's owner
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub token: String,
    pub expires_in: u64,
}

/// Issues tokens for API keys owned by the caller
#[derive(Clone)]
pub struct KeyIssuer {
    codec: Arc<TokenCodec>,
    ttl: TtlPolicy,
    api_keys: Arc<dyn ApiKeyStore>,
}

impl KeyIssuer {
    pub fn new(codec: Arc<TokenCodec>, ttl: TtlPolicy, api_keys: Arc<dyn ApiKeyStore>) -> Self {
        Self {
            codec,
            ttl,
            api_keys,
        }
    }

    /// Sign a token for key `key_id`, which must belong to `actor`.
    ///
    /// `life` overrides the default token lifetime.
    pub async fn issue(
        &self,
        actor: &Principal,
        key_id: Id,
        life: Option<u64>,
    ) -> GkResult<IssuedKey> {
        let key = self
            .api_keys
            .find_by_id(key_id)
            .await?
            .filter(|key| key.is_owned_by(actor.id))
            .ok_or_else(|| GkError::NotFound {
                entity: "Key",
                field: "id",
                value: key_id.to_string(),
            })?;

        let expires_in = self.ttl.api_key_ttl(life);
        let token = self
            .codec
            .sign(&ApiKeyClaims::new(key.id), expires_in)
            .map_err(|e| GkError::Internal(e.to_string()))?;

        debug!(principal_id = actor.id, api_key_id = key.id, expires_in, "Issued API key token");

        Ok(IssuedKey { token, expires_in })
    }
}
