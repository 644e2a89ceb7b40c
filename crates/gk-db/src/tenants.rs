//! Tenant repository

use async_trait::async_trait;
use gk_auth::TenantStore;
use gk_core::{GkResult, Id, Status};
use gk_models::Tenant;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct TenantRow {
    pub id: i64,
    pub name: String,
    pub status: i32,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            status: Status::from_code(row.status),
        }
    }
}

pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_row(&self, id: Id) -> RepositoryResult<Option<TenantRow>> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, status FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Tenant>> {
        Ok(self.find_row(id).await?.map(Tenant::from))
    }
}
