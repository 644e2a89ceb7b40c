//! Group repository
//!
//! Groups come back with member ids and permission names already aggregated, so one
//! query answers a permission check.

use async_trait::async_trait;
use gk_auth::GroupStore;
use gk_core::{GkResult, Id};
use gk_models::Group;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub name: String,
    pub member_ids: Vec<i64>,
    pub permissions: Vec<String>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            name: row.name,
            member_ids: row.member_ids.into_iter().collect(),
            permissions: row.permissions.into_iter().collect(),
        }
    }
}

pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_rows_containing_user(&self, user_id: Id) -> RepositoryResult<Vec<GroupRow>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.id, g.name,
                   COALESCE(
                       (SELECT array_agg(gm.user_id)
                        FROM group_members gm
                        WHERE gm.group_id = g.id),
                       '{}'
                   ) AS member_ids,
                   COALESCE(
                       (SELECT array_agg(p.name)
                        FROM group_permissions gp
                        JOIN permissions p ON p.id = gp.permission_id
                        WHERE gp.group_id = g.id),
                       '{}'
                   ) AS permissions
            FROM groups g
            WHERE EXISTS (
                SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.user_id = $1
            )
            ORDER BY g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn find_all_containing_user(&self, principal_id: Id) -> GkResult<Vec<Group>> {
        let rows = self.find_rows_containing_user(principal_id).await?;
        tracing::debug!(principal_id, groups = rows.len(), "Loaded groups");
        Ok(rows.into_iter().map(Group::from).collect())
    }
}
