//! Principal model
//!
//! A principal is the identity a request runs as. It is rebuilt from the stores on every
//! request and never written back.

use gk_core::{roles, Id, RoleRank, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api_key::ApiKey;

/// Key under which the delegating API key is exposed in `additional_fields`
pub const API_KEY_FIELD: &str = "apiKey";

/// Resolved identity for one request.
///
/// The type has no password field, so a principal can be handed to any handler or
/// serialized into a response without leaking the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Id,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role rank. On the API-key path this is already the effective (clamped) role.
    pub role: RoleRank,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Id>,
    #[serde(default)]
    pub additional_fields: Map<String, Value>,
    /// The API key the request was authenticated through, if any
    #[serde(skip)]
    pub delegated_api_key: Option<ApiKey>,
}

impl Principal {
    pub fn new(id: Id, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id,
            name: username.clone(),
            username,
            email: None,
            role: roles::USER,
            status: Status::Active,
            tenant_id: None,
            additional_fields: Map::new(),
            delegated_api_key: None,
        }
    }

    pub fn with_role(mut self, role: RoleRank) -> Self {
        self.role = role;
        self
    }

    pub fn with_tenant(mut self, tenant_id: Id) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether the request came in through an API key rather than a session
    pub fn is_delegated(&self) -> bool {
        self.delegated_api_key.is_some()
    }
}

/// A principal together with its stored password hash.
///
/// Only the login flow ever sees this record.
#[derive(Debug, Clone)]
pub struct PrincipalCredentials {
    pub principal: Principal,
    pub password_hash: String,
}
