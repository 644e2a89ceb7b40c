//! Tenant isolation
//!
//! When multi-tenancy is on, a principal only authenticates if it belongs to a tenant
//! that exists and is active. The flag is fixed when the guard is built.

use std::sync::Arc;

use gk_models::{Principal, Tenant};
use tracing::warn;

use crate::error::AuthError;
use crate::store::TenantStore;

/// A tenant admits requests only if it exists and is active
pub fn tenant_is_valid(tenant: Option<&Tenant>) -> bool {
    tenant.map(Tenant::is_active).unwrap_or(false)
}

#[derive(Clone)]
pub struct TenancyGuard {
    enabled: bool,
    tenants: Arc<dyn TenantStore>,
}

impl TenancyGuard {
    pub fn new(enabled: bool, tenants: Arc<dyn TenantStore>) -> Self {
        Self { enabled, tenants }
    }

    /// Passes trivially when multi-tenancy is off
    pub async fn check(&self, principal: &Principal) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }

        let tenant = match principal.tenant_id {
            Some(tenant_id) => self.tenants.find_by_id(tenant_id).await?,
            None => None,
        };

        if tenant_is_valid(tenant.as_ref()) {
            Ok(())
        } else {
            warn!(
                principal_id = principal.id,
                tenant_id = ?principal.tenant_id,
                "Rejecting principal with missing or inactive tenant"
            );
            Err(AuthError::TenantInvalid)
        }
    }
}
