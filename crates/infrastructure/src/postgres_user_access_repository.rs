use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use certus_application::{
    AccountMemberLocation, LocationAccessRecord, RolePermissionSetRecord, UserAccessRepository,
    UserRole, UserRoleAssignment,
};
use certus_core::{AccountId, AppError, AppResult};
use certus_domain::{LocationId, PermissionSet, RoleLevel, RolePermissionSetId, UserId};

mod locations;
mod roles;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for role and location access.
#[derive(Clone)]
pub struct PostgresUserAccessRepository {
    pool: PgPool,
}

impl PostgresUserAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    role_permission_id: i64,
    role_level: i32,
    permission_ids: Vec<i32>,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            role_permission_id: RolePermissionSetId::new(row.role_permission_id),
            role_level: RoleLevel::new(row.role_level),
            permissions: PermissionSet::from(row.permission_ids),
        }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionSetRow {
    role_permission_id: i64,
    name: String,
    description: Option<String>,
    role_name: String,
    role_level: i32,
    permission_ids: Vec<i32>,
}

impl From<RolePermissionSetRow> for RolePermissionSetRecord {
    fn from(row: RolePermissionSetRow) -> Self {
        Self {
            role_permission_id: RolePermissionSetId::new(row.role_permission_id),
            name: row.name,
            description: row.description,
            role_name: row.role_name,
            role_level: RoleLevel::new(row.role_level),
            permissions: PermissionSet::from(row.permission_ids),
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    user_id: uuid::Uuid,
    role_permission_id: i64,
    permission_set_name: String,
    role_name: String,
}

#[derive(Debug, FromRow)]
struct LocationAccessRow {
    location_id: uuid::Uuid,
    location_name: String,
    account_id: uuid::Uuid,
}

impl From<LocationAccessRow> for LocationAccessRecord {
    fn from(row: LocationAccessRow) -> Self {
        Self {
            location_id: LocationId::from_uuid(row.location_id),
            location_name: row.location_name,
            account_id: AccountId::from_uuid(row.account_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountMemberRow {
    user_id: uuid::Uuid,
    location_id: uuid::Uuid,
    location_name: String,
}

#[async_trait]
impl UserAccessRepository for PostgresUserAccessRepository {
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        self.find_user_role_impl(user_id).await
    }

    async fn find_role_permission_set(
        &self,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<Option<RolePermissionSetRecord>> {
        self.find_role_permission_set_impl(role_permission_id).await
    }

    async fn list_role_permission_sets(&self) -> AppResult<Vec<RolePermissionSetRecord>> {
        self.list_role_permission_sets_impl().await
    }

    async fn list_location_access(&self, user_id: UserId) -> AppResult<Vec<LocationAccessRecord>> {
        self.list_location_access_impl(user_id).await
    }

    async fn list_account_location_access(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AccountMemberLocation>> {
        self.list_account_location_access_impl(account_id).await
    }

    async fn list_role_assignments(
        &self,
        user_ids: &[UserId],
    ) -> AppResult<Vec<UserRoleAssignment>> {
        self.list_role_assignments_impl(user_ids).await
    }

    async fn user_management_level(&self, account_id: AccountId) -> AppResult<Option<RoleLevel>> {
        let level = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT user_creation_permission_level
            FROM account_settings
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load account settings: {error}"))
        })?;

        Ok(level.flatten().map(RoleLevel::new))
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        self.assign_role_impl(user_id, role_permission_id).await
    }

    async fn change_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        self.change_role_impl(user_id, role_permission_id).await
    }

    async fn remove_role(&self, user_id: UserId) -> AppResult<()> {
        self.remove_role_impl(user_id).await
    }

    async fn grant_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()> {
        self.grant_locations_impl(user_id, account_id, location_ids, granted_by)
            .await
    }

    async fn replace_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()> {
        self.replace_locations_impl(user_id, account_id, location_ids, granted_by)
            .await
    }
}
