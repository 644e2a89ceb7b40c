//! Tenant model

use gk_core::{Id, Status};
use serde::{Deserialize, Serialize};

/// Isolation boundary for a multi-tenant deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Id,
    pub name: String,
    pub status: Status,
}

impl Tenant {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: Status::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
