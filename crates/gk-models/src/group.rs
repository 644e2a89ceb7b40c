//! Group model

use gk_core::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A set of principals sharing a set of permissions.
///
/// Permissions are held by name; stores resolve permission ids to names when loading a
/// group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Id,
    pub name: String,
    pub member_ids: HashSet<Id>,
    pub permissions: HashSet<String>,
}

impl Group {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_member(mut self, principal_id: Id) -> Self {
        self.member_ids.insert(principal_id);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn contains(&self, principal_id: Id) -> bool {
        self.member_ids.contains(&principal_id)
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
