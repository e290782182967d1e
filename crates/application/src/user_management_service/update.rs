use certus_domain::{
    RolePermissionSetId, UserUpdatedChanges, ensure_locations_accessible, normalize_display_name,
    require_location_selection,
};

use super::*;

/// Partial update of a staff account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// New display name; a blank value clears it.
    pub full_name: Option<String>,
    /// New permission set.
    pub role_permission_id: Option<RolePermissionSetId>,
    /// Replacement location list.
    pub location_ids: Option<Vec<LocationId>>,
}

impl UserManagementService {
    /// Applies a partial update to another user's account.
    ///
    /// All supplied fields are validated before anything is written. Only
    /// written fields are audited, and nothing is audited when no field was
    /// supplied. A failed write is not rolled back; fields written before it
    /// are still audited.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        target_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<()> {
        let actor_id = actor_id(actor);
        self.require_management_capability(actor, "you do not have permission to update users")
            .await?;
        reject_self_target(
            actor_id,
            target_id,
            "use your profile page to update your own information",
        )?;

        let actor_role = self.actor_role(actor_id).await?;
        let actor_permissions = actor_role.as_ref().map(|role| &role.permissions);
        let scope = self.actor_scope(actor_id).await?;
        self.authorize_target(GuardedAction::UpdateUser, actor_permissions, &scope, target_id)
            .await?;

        if let Some(role_permission_id) = input.role_permission_id {
            let new_set = self
                .access_repository
                .find_role_permission_set(role_permission_id)
                .await?;
            authorize_permission_grant(
                GuardedAction::AssignRole,
                actor_permissions,
                new_set.as_ref().map(|record| &record.permissions),
            )?;
        }

        if let Some(location_ids) = input.location_ids.as_deref() {
            require_location_selection(location_ids)?;
            ensure_locations_accessible(location_ids, &scope.location_ids)?;
        }

        let mut changes = UserUpdatedChanges::default();
        let outcome = self
            .apply_update(actor_id, target_id, &scope, input, &mut changes)
            .await;

        if !changes.is_empty() {
            self.record_audit(
                target_id,
                actor_id,
                UserAuditAction::Updated,
                serialize_changes(&changes),
            )
            .await;
        }

        outcome
    }

    async fn apply_update(
        &self,
        actor_id: UserId,
        target_id: UserId,
        scope: &ActorScope,
        input: UpdateUserInput,
        changes: &mut UserUpdatedChanges,
    ) -> AppResult<()> {
        if let Some(full_name) = input.full_name {
            let display_name = normalize_display_name(Some(full_name.as_str()));
            self.identity_provider
                .update_display_name(target_id, display_name.as_deref())
                .await
                .map_err(|update_error| {
                    error!(user_id = %target_id, error = %update_error, "failed to update display name");
                    AppError::External("failed to update user name".to_owned())
                })?;
            changes.display_name = Some(display_name);
        }

        if let Some(role_permission_id) = input.role_permission_id {
            self.access_repository
                .change_role(target_id, role_permission_id)
                .await
                .map_err(|role_error| {
                    error!(user_id = %target_id, error = %role_error, "failed to update role");
                    AppError::External("failed to update user role".to_owned())
                })?;
            changes.role_permission_id = Some(role_permission_id);
        }

        if let Some(location_ids) = input.location_ids {
            self.access_repository
                .replace_locations(target_id, scope.account_id, &location_ids, actor_id)
                .await
                .map_err(|location_error| {
                    error!(user_id = %target_id, error = %location_error, "failed to update locations");
                    AppError::External("failed to update location access".to_owned())
                })?;
            changes.location_ids = Some(location_ids);
        }

        Ok(())
    }
}
