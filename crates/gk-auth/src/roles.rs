//! Role hierarchy checks
//!
//! Roles are integer ranks where a smaller number means more privilege. Resource
//! handlers call into this module instead of comparing ranks themselves.

use gk_core::{roles, RoleRank};
use gk_models::Principal;

use crate::error::AuthError;

pub struct RoleAuthorizer;

impl RoleAuthorizer {
    /// Whether `principal` is at least as privileged as `required_ceiling`
    pub fn is_at_least(principal: &Principal, required_ceiling: RoleRank) -> bool {
        principal.role <= required_ceiling
    }

    pub fn require(principal: &Principal, required_ceiling: RoleRank) -> Result<(), AuthError> {
        if Self::is_at_least(principal, required_ceiling) {
            Ok(())
        } else {
            Err(AuthError::AuthorizationDenied {
                required: required_ceiling,
                actual: principal.role,
            })
        }
    }

    /// Whether `actor` may give someone (itself included) the role `target_role`.
    ///
    /// Only the top tier may hand out a role more privileged than its own.
    pub fn can_assign_role(actor: &Principal, target_role: RoleRank) -> bool {
        actor.role == roles::OWNER || target_role >= actor.role
    }

    pub fn require_assignable(actor: &Principal, target_role: RoleRank) -> Result<(), AuthError> {
        if Self::can_assign_role(actor, target_role) {
            Ok(())
        } else {
            Err(AuthError::AuthorizationDenied {
                required: target_role,
                actual: actor.role,
            })
        }
    }

    /// Role for an API key created or updated by `actor`.
    ///
    /// A key may be narrower than its creator but never broader.
    pub fn clamp_key_role(actor: &Principal, requested: Option<RoleRank>) -> RoleRank {
        requested.map_or(actor.role, |role| role.max(actor.role))
    }
}
