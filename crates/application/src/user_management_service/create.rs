use certus_domain::{
    EmailAddress, RolePermissionSetId, UserCreatedChanges, ensure_locations_accessible,
    normalize_display_name, require_location_selection,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::NewIdentity;

use super::*;

/// Input for creating a staff account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Raw email as typed by the actor.
    pub email: String,
    /// Permission set for the new account.
    pub role_permission_id: RolePermissionSetId,
    /// Locations the new account can see.
    pub location_ids: Vec<LocationId>,
    /// Optional display name.
    pub full_name: Option<String>,
}

impl UserManagementService {
    /// Creates a pre-confirmed account with a permission set and locations.
    ///
    /// Every check runs before the first write. If the role or location
    /// insert fails after the identity exists, the identity is deleted again
    /// (and the role row with it) so no unauthorized account is left behind.
    /// The compensation is best effort and not atomic.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserId> {
        let email = EmailAddress::new(input.email.as_str())?;
        require_location_selection(&input.location_ids)?;

        let actor_id = actor_id(actor);
        self.require_management_capability(actor, "you do not have permission to create users")
            .await?;

        let actor_role = self.actor_role(actor_id).await?;
        let target_set = self
            .access_repository
            .find_role_permission_set(input.role_permission_id)
            .await?;
        authorize_permission_grant(
            GuardedAction::CreateWithRole,
            actor_role.as_ref().map(|role| &role.permissions),
            target_set.as_ref().map(|record| &record.permissions),
        )?;

        let scope = self.actor_scope(actor_id).await?;
        ensure_locations_accessible(&input.location_ids, &scope.location_ids)?;

        let email_taken = self
            .identity_provider
            .list_users()
            .await?
            .iter()
            .filter_map(|identity| identity.email.as_deref())
            .any(|stored| email.matches(stored));
        if email_taken {
            return Err(AppError::Conflict(
                "a user with this email already exists".to_owned(),
            ));
        }

        let full_name = normalize_display_name(input.full_name.as_deref());
        let created = self
            .identity_provider
            .create_user(NewIdentity {
                email: email.clone(),
                display_name: full_name.clone(),
                created_by: actor_id,
                created_at: Utc::now().to_rfc3339(),
            })
            .await
            .map_err(|create_error| {
                error!(error = %create_error, "failed to create user in identity provider");
                AppError::External("failed to create user account".to_owned())
            })?;
        let new_user_id = created.id;

        if let Err(role_error) = self
            .access_repository
            .assign_role(new_user_id, input.role_permission_id)
            .await
        {
            error!(user_id = %new_user_id, error = %role_error, "failed to assign role");
            self.discard_identity(new_user_id).await;
            return Err(AppError::External(
                "failed to assign role to user".to_owned(),
            ));
        }

        if let Err(location_error) = self
            .access_repository
            .grant_locations(new_user_id, scope.account_id, &input.location_ids, actor_id)
            .await
        {
            error!(user_id = %new_user_id, error = %location_error, "failed to assign locations");
            self.discard_identity(new_user_id).await;
            self.discard_role(new_user_id).await;
            return Err(AppError::External(
                "failed to assign location access".to_owned(),
            ));
        }

        let changes = UserCreatedChanges {
            email: email.into(),
            full_name,
            role_permission_id: input.role_permission_id,
            location_ids: input.location_ids,
        };
        self.record_audit(
            new_user_id,
            actor_id,
            UserAuditAction::Created,
            serialize_changes(&changes),
        )
        .await;

        info!(user_id = %new_user_id, created_by = %actor_id, "created user");
        Ok(new_user_id)
    }

    async fn discard_identity(&self, user_id: UserId) {
        if let Err(rollback_error) = self.identity_provider.delete_user(user_id).await {
            warn!(
                user_id = %user_id,
                error = %rollback_error,
                "failed to delete partially created user"
            );
        }
    }

    async fn discard_role(&self, user_id: UserId) {
        if let Err(rollback_error) = self.access_repository.remove_role(user_id).await {
            warn!(
                user_id = %user_id,
                error = %rollback_error,
                "failed to remove role of partially created user"
            );
        }
    }
}
