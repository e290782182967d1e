use certus_application::{UserAuditEntry, UserAuditRepository};
use certus_domain::{UserAuditAction, UserId};
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use crate::MIGRATOR;

use super::PostgresUserAuditRepository;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres user audit tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn appended_entry_keeps_action_and_changes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAuditRepository::new(pool.clone());
    let modified = UserId::new();
    let actor = UserId::new();

    let appended = repository
        .append_entry(UserAuditEntry {
            modified_user_id: modified,
            modified_by_user_id: actor,
            action: UserAuditAction::Updated,
            changes: json!({ "display_name": "Sam Lee" }),
        })
        .await;
    assert!(appended.is_ok());

    let row = sqlx::query_as::<_, (uuid::Uuid, String, Json<serde_json::Value>)>(
        r#"
            SELECT modified_by_user_id, action, changes
            FROM user_audit_logs
            WHERE modified_user_id = $1
            "#,
    )
    .bind(modified.as_uuid())
    .fetch_one(&pool)
    .await;

    let Ok((modified_by, action, Json(changes))) = row else {
        panic!("audit row should exist");
    };
    assert_eq!(modified_by, actor.as_uuid());
    assert_eq!(action, "updated");
    assert_eq!(changes, json!({ "display_name": "Sam Lee" }));
}
