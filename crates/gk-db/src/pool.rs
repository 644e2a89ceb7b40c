//! Database connection pool management

use std::sync::Arc;
use std::time::Duration;

use gk_auth::Stores;
use gk_core::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{ApiKeyRepository, GroupRepository, PrincipalRepository, TenantRepository};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await?;

        tracing::info!(
            "Database pool created with {} max connections",
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Store set backed by this pool
    pub fn stores(&self) -> Stores {
        Stores {
            principals: Arc::new(PrincipalRepository::new(self.pool.clone())),
            api_keys: Arc::new(ApiKeyRepository::new(self.pool.clone())),
            tenants: Arc::new(TenantRepository::new(self.pool.clone())),
            groups: Arc::new(GroupRepository::new(self.pool.clone())),
        }
    }
}
