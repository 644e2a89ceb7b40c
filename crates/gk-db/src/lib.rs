//! # gk-db
//!
//! PostgreSQL stores for Gatekeeper.
//!
//! Each repository implements one of the read-only store traits from `gk-auth`, so the
//! engine never sees SQL.
//!
//! ## Example
//!
//! ```ignore
//! use gk_core::config::AppConfig;
//! use gk_db::Database;
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::connect(&config.database).await?;
//! let stores = db.stores();
//! ```

pub mod api_keys;
pub mod groups;
pub mod pool;
pub mod principals;
pub mod repository;
pub mod tenants;

pub use api_keys::{ApiKeyRepository, ApiKeyRow};
pub use groups::{GroupRepository, GroupRow};
pub use pool::Database;
pub use principals::{PrincipalRepository, PrincipalRow};
pub use repository::{RepositoryError, RepositoryResult};
pub use tenants::{TenantRepository, TenantRow};
