//! Postgres-backed role directory.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE principals (
//!     id    UUID PRIMARY KEY,
//!     roles TEXT[] NOT NULL DEFAULT '{}'
//! );
//!
//! CREATE TABLE roles (
//!     name        TEXT PRIMARY KEY,
//!     description TEXT,
//!     accessions  TEXT[] NOT NULL DEFAULT '{}'
//! );
//! ```
//!
//! A missing `principals` row is the distinguished
//! [`DirectoryError::PrincipalNotFound`]; a missing `roles` row is
//! `Ok(None)`, which resolvers skip rather than fail on.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use latchkey_auth::resolver::{DirectoryError, RoleDirectory};
use latchkey_auth::{Accession, PrincipalId, Role};

/// Role directory over the `principals` and `roles` tables.
///
/// Stored accession names pass through [`Accession::normalize`], so rows
/// referencing retired accessions load cleanly instead of failing.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PgDirectory {
    #[instrument(skip(self), fields(principal = %principal), err)]
    async fn principal_roles(
        &self,
        principal: PrincipalId,
    ) -> Result<Vec<String>, DirectoryError> {
        let row = sqlx::query(
            r#"
            SELECT roles
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(principal.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let row = row.ok_or(DirectoryError::PrincipalNotFound)?;
        row.try_get("roles").map_err(map_sqlx_error)
    }

    #[instrument(skip(self), err)]
    async fn role(&self, name: &str) -> Result<Option<Role>, DirectoryError> {
        let row = sqlx::query(
            r#"
            SELECT name, description, accessions
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row.try_get("name").map_err(map_sqlx_error)?;
        let description: Option<String> = row.try_get("description").map_err(map_sqlx_error)?;
        let stored: Vec<String> = row.try_get("accessions").map_err(map_sqlx_error)?;

        Ok(Some(Role::new(
            name,
            description.unwrap_or_default(),
            Accession::normalize(&stored),
        )))
    }
}

fn map_sqlx_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::Unavailable(e.to_string())
}
