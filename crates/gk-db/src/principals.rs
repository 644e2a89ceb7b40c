//! Principal repository
//!
//! Reads from the `users` table. The password column is only selected by the username
//! lookup used for login.

use async_trait::async_trait;
use gk_auth::PrincipalStore;
use gk_core::{GkResult, Id, Status};
use gk_models::{Principal, PrincipalCredentials};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryError, RepositoryResult};

/// User database entity, without the password
#[derive(Debug, Clone, FromRow)]
pub struct PrincipalRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub role: i32,
    pub status: i32,
    pub tenant_id: Option<i64>,
    pub additional_fields: Value,
}

impl PrincipalRow {
    pub fn into_principal(self) -> RepositoryResult<Principal> {
        let additional_fields = match self.additional_fields {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(RepositoryError::CorruptRow {
                    table: "users",
                    message: format!("additional_fields is not an object: {}", other),
                })
            }
        };

        Ok(Principal {
            id: self.id,
            name: self.name,
            username: self.username,
            email: self.email,
            role: self.role,
            status: Status::from_code(self.status),
            tenant_id: self.tenant_id,
            additional_fields,
            delegated_api_key: None,
        })
    }
}

#[derive(Debug, FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    principal: PrincipalRow,
    password: String,
}

const PRINCIPAL_COLUMNS: &str =
    "id, name, username, email, role, status, tenant_id, additional_fields";

pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_row(&self, id: Id) -> RepositoryResult<Option<PrincipalRow>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", PRINCIPAL_COLUMNS);
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_credentials(&self, username: &str) -> RepositoryResult<Option<CredentialsRow>> {
        let sql = format!(
            "SELECT {}, password FROM users WHERE LOWER(username) = LOWER($1)",
            PRINCIPAL_COLUMNS
        );
        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl PrincipalStore for PrincipalRepository {
    async fn find_by_id(&self, id: Id) -> GkResult<Option<Principal>> {
        match self.find_row(id).await? {
            Some(row) => Ok(Some(row.into_principal()?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> GkResult<Option<PrincipalCredentials>> {
        match self.find_credentials(username).await? {
            Some(row) => Ok(Some(PrincipalCredentials {
                principal: row.principal.into_principal()?,
                password_hash: row.password,
            })),
            None => Ok(None),
        }
    }
}
