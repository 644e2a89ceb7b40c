//! API key model

use gk_core::{roles, Id, RoleRank};
use serde::{Deserialize, Serialize};

/// A delegated credential owned by a principal.
///
/// `role` is a privilege ceiling: requests authenticated through the key never run with
/// more privilege than the key declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Id,
    /// Principal who owns this key
    pub owner_id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_role")]
    pub role: RoleRank,
}

fn default_role() -> RoleRank {
    roles::ADMIN
}

impl ApiKey {
    pub fn new(id: Id, owner_id: Id, name: impl Into<String>, role: RoleRank) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            description: None,
            role,
        }
    }

    pub fn is_owned_by(&self, principal_id: Id) -> bool {
        self.owner_id == principal_id
    }
}
