use certus_application::UserAccessRepository;
use certus_core::{AccountId, AppError};
use certus_domain::{LocationId, PermissionSet, RoleLevel, RolePermissionSetId, UserId};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::MIGRATOR;

use super::PostgresUserAccessRepository;

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
        panic!("failed to run migrations for postgres user access tests: {error}");
    }

    Some(pool)
}

async fn ensure_identity(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query("INSERT INTO auth.users (id) VALUES ($1)")
        .bind(user_id.as_uuid())
        .execute(pool)
        .await;

    assert!(insert.is_ok());
    user_id
}

async fn ensure_permission_set(
    pool: &PgPool,
    role_level: i32,
    name: &str,
    permission_ids: &[i32],
) -> RolePermissionSetId {
    let role = sqlx::query(
        r#"
            INSERT INTO roles (role_id, name)
            VALUES ($1, $2)
            ON CONFLICT (role_id) DO NOTHING
            "#,
    )
    .bind(role_level)
    .bind(format!("Level {role_level}"))
    .execute(pool)
    .await;
    assert!(role.is_ok());

    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO roles_permissions (role_id, name, permission_ids)
            VALUES ($1, $2, $3)
            RETURNING role_permission_id
            "#,
    )
    .bind(role_level)
    .bind(name)
    .bind(permission_ids.to_vec())
    .fetch_one(pool)
    .await;

    RolePermissionSetId::new(id.unwrap_or_else(|error| panic!("failed to seed set: {error}")))
}

async fn ensure_location(pool: &PgPool, account_id: AccountId, name: &str) -> LocationId {
    let location_id = LocationId::from_uuid(uuid::Uuid::new_v4());
    let insert = sqlx::query(
        r#"
            INSERT INTO locations (location_id, account_id, name)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(location_id.as_uuid())
    .bind(account_id.as_uuid())
    .bind(name)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
    location_id
}

#[tokio::test]
async fn assigned_role_resolves_level_and_permissions() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let user_id = ensure_identity(&pool).await;
    let set_id = ensure_permission_set(&pool, 3, "Shift manager", &[2, 1, 2]).await;

    assert!(repository.assign_role(user_id, set_id).await.is_ok());

    let role = repository
        .find_user_role(user_id)
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    let Some(role) = role else {
        panic!("role should be assigned");
    };
    assert_eq!(role.role_permission_id, set_id);
    assert_eq!(role.role_level, RoleLevel::new(3));
    assert_eq!(role.permissions, PermissionSet::from(vec![1, 2]));

    let assignments = repository
        .list_role_assignments(&[user_id])
        .await
        .unwrap_or_else(|error| panic!("assignments failed: {error}"));
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].permission_set_name, "Shift manager");
    assert_eq!(assignments[0].role_name, "Level 3");
}

#[tokio::test]
async fn second_role_assignment_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let user_id = ensure_identity(&pool).await;
    let set_id = ensure_permission_set(&pool, 1, "Front of house", &[1]).await;

    assert!(repository.assign_role(user_id, set_id).await.is_ok());
    let second = repository.assign_role(user_id, set_id).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn change_role_requires_existing_assignment() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let user_id = ensure_identity(&pool).await;
    let staff = ensure_permission_set(&pool, 1, "Front of house", &[1]).await;
    let manager = ensure_permission_set(&pool, 3, "Shift manager", &[1, 2]).await;

    let missing = repository.change_role(user_id, manager).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    assert!(repository.assign_role(user_id, staff).await.is_ok());
    assert!(repository.change_role(user_id, manager).await.is_ok());

    let role = repository.find_user_role(user_id).await;
    assert!(matches!(role, Ok(Some(role)) if role.role_permission_id == manager));

    assert!(repository.remove_role(user_id).await.is_ok());
    assert!(matches!(repository.find_user_role(user_id).await, Ok(None)));
}

#[tokio::test]
async fn replace_locations_swaps_rows_inside_the_account() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let account_id = AccountId::new();
    let granter = ensure_identity(&pool).await;
    let user_id = ensure_identity(&pool).await;
    let downtown = ensure_location(&pool, account_id, "Downtown").await;
    let airport = ensure_location(&pool, account_id, "Airport").await;

    assert!(
        repository
            .grant_locations(user_id, account_id, &[downtown, airport], granter)
            .await
            .is_ok()
    );
    let granted = repository
        .list_location_access(user_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(
        granted
            .iter()
            .map(|location| location.location_name.as_str())
            .collect::<Vec<_>>(),
        vec!["Airport", "Downtown"]
    );

    assert!(
        repository
            .replace_locations(user_id, account_id, &[downtown], granter)
            .await
            .is_ok()
    );
    let members = repository
        .list_account_location_access(account_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, user_id);
    assert_eq!(members[0].location_id, downtown);
}

#[tokio::test]
async fn foreign_location_rolls_back_the_batch() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let account_id = AccountId::new();
    let granter = ensure_identity(&pool).await;
    let user_id = ensure_identity(&pool).await;
    let downtown = ensure_location(&pool, account_id, "Downtown").await;
    let elsewhere = ensure_location(&pool, AccountId::new(), "Harbour").await;

    let result = repository
        .grant_locations(user_id, account_id, &[downtown, elsewhere], granter)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(matches!(
        repository.list_location_access(user_id).await,
        Ok(rows) if rows.is_empty()
    ));
}

#[tokio::test]
async fn management_level_comes_from_account_settings() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let account_id = AccountId::new();

    assert!(matches!(
        repository.user_management_level(account_id).await,
        Ok(None)
    ));

    let insert = sqlx::query(
        r#"
            INSERT INTO account_settings (account_id, user_creation_permission_level)
            VALUES ($1, 3)
            "#,
    )
    .bind(account_id.as_uuid())
    .execute(&pool)
    .await;
    assert!(insert.is_ok());

    assert!(matches!(
        repository.user_management_level(account_id).await,
        Ok(Some(level)) if level == RoleLevel::new(3)
    ));
}

#[tokio::test]
async fn deleting_identity_cascades_access_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresUserAccessRepository::new(pool.clone());
    let account_id = AccountId::new();
    let user_id = ensure_identity(&pool).await;
    let set_id = ensure_permission_set(&pool, 1, "Front of house", &[1]).await;
    let location = ensure_location(&pool, account_id, "Downtown").await;

    assert!(repository.assign_role(user_id, set_id).await.is_ok());
    assert!(
        repository
            .grant_locations(user_id, account_id, &[location], user_id)
            .await
            .is_ok()
    );

    let delete = sqlx::query("DELETE FROM auth.users WHERE id = $1")
        .bind(user_id.as_uuid())
        .execute(&pool)
        .await;
    assert!(delete.is_ok());

    assert!(matches!(repository.find_user_role(user_id).await, Ok(None)));
    assert!(matches!(
        repository.list_location_access(user_id).await,
        Ok(rows) if rows.is_empty()
    ));
}
