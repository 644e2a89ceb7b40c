//! Common types used throughout Gatekeeper

/// Primary key type shared by principals, keys, tenants and groups
pub type Id = i64;

/// Role rank. Lower is more privileged; `0` is the top tier.
pub type RoleRank = i32;

/// Named role tiers
pub mod roles {
    use super::RoleRank;

    /// Most privileged tier
    pub const OWNER: RoleRank = 0;
    pub const ADMIN: RoleRank = 1;
    /// Default tier for new accounts
    pub const USER: RoleRank = 2;
}

/// Active/inactive flag shared by principals and tenants.
///
/// Persisted as an integer where `1` means active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub const ACTIVE_CODE: i32 = 1;

    pub fn from_code(code: i32) -> Self {
        if code == Self::ACTIVE_CODE {
            Status::Active
        } else {
            Status::Inactive
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Status::Active => Self::ACTIVE_CODE,
            Status::Inactive => 0,
        }
    }

    pub fn is_active(self) -> bool {
        self == Status::Active
    }
}
