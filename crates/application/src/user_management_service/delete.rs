use certus_domain::UserDeletedChanges;
use chrono::Utc;
use tracing::info;

use super::*;

impl UserManagementService {
    /// Deletes another user's account.
    ///
    /// The platform cascades the deletion to the role and location rows.
    pub async fn delete_user(&self, actor: &UserIdentity, target_id: UserId) -> AppResult<()> {
        let actor_id = actor_id(actor);
        self.require_management_capability(actor, "you do not have permission to delete users")
            .await?;
        reject_self_target(actor_id, target_id, "you cannot delete your own account")?;

        let actor_role = self.actor_role(actor_id).await?;
        let scope = self.actor_scope(actor_id).await?;
        self.authorize_target(
            GuardedAction::DeleteUser,
            actor_role.as_ref().map(|role| &role.permissions),
            &scope,
            target_id,
        )
        .await?;

        self.identity_provider
            .delete_user(target_id)
            .await
            .map_err(|delete_error| {
                error!(user_id = %target_id, error = %delete_error, "failed to delete user");
                AppError::External("failed to delete user".to_owned())
            })?;

        let changes = UserDeletedChanges {
            deleted_at: Utc::now().to_rfc3339(),
        };
        self.record_audit(
            target_id,
            actor_id,
            UserAuditAction::Deleted,
            serialize_changes(&changes),
        )
        .await;

        info!(user_id = %target_id, deleted_by = %actor_id, "deleted user");
        Ok(())
    }
}
