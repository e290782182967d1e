use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use certus_application::{UserAuditEntry, UserAuditRepository};
use certus_core::{AppError, AppResult};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed append-only log of user-management changes.
#[derive(Clone)]
pub struct PostgresUserAuditRepository {
    pool: PgPool,
}

impl PostgresUserAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserAuditRepository for PostgresUserAuditRepository {
    async fn append_entry(&self, entry: UserAuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_audit_logs (
                modified_user_id,
                modified_by_user_id,
                action,
                changes
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.modified_user_id.as_uuid())
        .bind(entry.modified_by_user_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(Json(entry.changes))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to append user audit entry: {error}"))
        })?;

        Ok(())
    }
}
