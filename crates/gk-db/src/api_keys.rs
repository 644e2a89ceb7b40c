//! API key repository

use async_trait::async_trait;
use gk_auth::ApiKeyStore;
use gk_core::{GkResult, Id};
use gk_models::ApiKey;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub role: i32,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            id: row.id,
            owner_id: row.user_id,
            name: row.name,
            description: row.description,
            role: row.role,
        }
    }
}

pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_row(&self, id: Id) -> RepositoryResult<Option<ApiKeyRow>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, user_id, name, description, role
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl ApiKeyStore for ApiKeyRepository {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<ApiKey>> {
        Ok(self.find_row(id).await?.map(ApiKey::from))
    }
}
