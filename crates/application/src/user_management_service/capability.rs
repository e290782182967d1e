use certus_domain::DEFAULT_USER_MANAGEMENT_LEVEL;

use super::*;

/// Whether an actor may manage other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagementCapability {
    /// The actor meets the account's user-management level.
    pub can_manage: bool,
    /// Level of the actor's role, when one is assigned.
    pub role_level: Option<RoleLevel>,
}

impl ManagementCapability {
    fn denied(role_level: Option<RoleLevel>) -> Self {
        Self {
            can_manage: false,
            role_level,
        }
    }
}

impl UserManagementService {
    /// Resolves whether the actor may create, update, and delete users.
    ///
    /// The account setting `user_creation_permission_level` decides the
    /// minimum role level; accounts without a setting allow owners only.
    pub async fn management_capability(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<ManagementCapability> {
        let actor_id = actor_id(actor);

        let Some(role) = self.actor_role(actor_id).await? else {
            return Ok(ManagementCapability::denied(None));
        };

        let locations = self.access_repository.list_location_access(actor_id).await?;
        let Some(account_id) = locations.first().map(|location| location.account_id) else {
            return Ok(ManagementCapability::denied(Some(role.role_level)));
        };

        let required_level = self
            .access_repository
            .user_management_level(account_id)
            .await?
            .unwrap_or(DEFAULT_USER_MANAGEMENT_LEVEL);

        Ok(ManagementCapability {
            can_manage: role_level_allows(role.role_level, required_level),
            role_level: Some(role.role_level),
        })
    }

    pub(super) async fn require_management_capability(
        &self,
        actor: &UserIdentity,
        denial_message: &str,
    ) -> AppResult<()> {
        if self.management_capability(actor).await?.can_manage {
            return Ok(());
        }

        Err(AppError::Forbidden(denial_message.to_owned()))
    }
}
