//! Group-based permission checks
//!
//! A principal holds a permission when any group it belongs to grants it. The graph is
//! walked fresh on every call; nothing is cached between requests.

use std::collections::HashSet;
use std::sync::Arc;

use gk_models::Principal;
use tracing::warn;

use crate::error::AuthError;
use crate::store::GroupStore;

#[derive(Clone)]
pub struct GroupPermissionAuthorizer {
    groups: Arc<dyn GroupStore>,
}

impl GroupPermissionAuthorizer {
    pub fn new(groups: Arc<dyn GroupStore>) -> Self {
        Self { groups }
    }

    /// Union of permission names across every group containing `principal`
    pub async fn permissions_of(
        &self,
        principal: &Principal,
    ) -> Result<HashSet<String>, AuthError> {
        let groups = self.groups.find_all_containing_user(principal.id).await?;

        Ok(groups
            .into_iter()
            .flat_map(|group| group.permissions)
            .collect())
    }

    pub async fn has_permission(
        &self,
        principal: &Principal,
        permission: &str,
    ) -> Result<bool, AuthError> {
        Ok(self.permissions_of(principal).await?.contains(permission))
    }

    pub async fn require(&self, principal: &Principal, permission: &str) -> Result<(), AuthError> {
        if self.has_permission(principal, permission).await? {
            Ok(())
        } else {
            warn!(principal_id = principal.id, permission, "Permission denied");
            Err(AuthError::PermissionDenied(permission.to_string()))
        }
    }
}
