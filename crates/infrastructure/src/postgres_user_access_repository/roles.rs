use super::*;

impl PostgresUserAccessRepository {
    pub(super) async fn find_user_role_impl(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                assignments.role_permission_id,
                permission_sets.role_id AS role_level,
                permission_sets.permission_ids
            FROM user_roles_permissions AS assignments
            INNER JOIN roles_permissions AS permission_sets
                ON permission_sets.role_permission_id = assignments.role_permission_id
            WHERE assignments.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user role: {error}")))?;

        Ok(row.map(UserRole::from))
    }

    pub(super) async fn find_role_permission_set_impl(
        &self,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<Option<RolePermissionSetRecord>> {
        let row = sqlx::query_as::<_, RolePermissionSetRow>(
            r#"
            SELECT
                permission_sets.role_permission_id,
                permission_sets.name,
                permission_sets.description,
                roles.name AS role_name,
                permission_sets.role_id AS role_level,
                permission_sets.permission_ids
            FROM roles_permissions AS permission_sets
            INNER JOIN roles
                ON roles.role_id = permission_sets.role_id
            WHERE permission_sets.role_permission_id = $1
            "#,
        )
        .bind(role_permission_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load role permission set: {error}"))
        })?;

        Ok(row.map(RolePermissionSetRecord::from))
    }

    pub(super) async fn list_role_permission_sets_impl(
        &self,
    ) -> AppResult<Vec<RolePermissionSetRecord>> {
        let rows = sqlx::query_as::<_, RolePermissionSetRow>(
            r#"
            SELECT
                permission_sets.role_permission_id,
                permission_sets.name,
                permission_sets.description,
                roles.name AS role_name,
                permission_sets.role_id AS role_level,
                permission_sets.permission_ids
            FROM roles_permissions AS permission_sets
            INNER JOIN roles
                ON roles.role_id = permission_sets.role_id
            ORDER BY permission_sets.role_id, permission_sets.role_permission_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permission sets: {error}"))
        })?;

        Ok(rows.into_iter().map(RolePermissionSetRecord::from).collect())
    }

    pub(super) async fn list_role_assignments_impl(
        &self,
        user_ids: &[UserId],
    ) -> AppResult<Vec<UserRoleAssignment>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<uuid::Uuid> = user_ids.iter().map(UserId::as_uuid).collect();
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                assignments.user_id,
                assignments.role_permission_id,
                permission_sets.name AS permission_set_name,
                roles.name AS role_name
            FROM user_roles_permissions AS assignments
            INNER JOIN roles_permissions AS permission_sets
                ON permission_sets.role_permission_id = assignments.role_permission_id
            INNER JOIN roles
                ON roles.role_id = permission_sets.role_id
            WHERE assignments.user_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| UserRoleAssignment {
                user_id: UserId::from_uuid(row.user_id),
                role_permission_id: RolePermissionSetId::new(row.role_permission_id),
                permission_set_name: row.permission_set_name,
                role_name: row.role_name,
            })
            .collect())
    }

    pub(super) async fn assign_role_impl(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles_permissions (user_id, role_permission_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_permission_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| map_assignment_conflict(error, user_id))?;

        Ok(())
    }

    pub(super) async fn change_role_impl(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE user_roles_permissions
            SET role_permission_id = $2,
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_permission_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to change user role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment for user '{user_id}' was not found"
            )));
        }

        Ok(())
    }

    pub(super) async fn remove_role_impl(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM user_roles_permissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove user role: {error}")))?;

        Ok(())
    }
}

fn map_assignment_conflict(error: sqlx::Error, user_id: UserId) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("user '{user_id}' already has a role"));
    }

    AppError::Internal(format!("failed to assign user role: {error}"))
}
