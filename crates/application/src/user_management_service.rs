//! User management application service.
//!
//! Owns account lifecycle operations performed by staff on other staff:
//! creation with compensation, partial updates, and deletion. Every write
//! passes the escalation guard and the location-scope check first.

use std::collections::BTreeSet;
use std::sync::Arc;

use certus_core::{AccountId, AppError, AppResult, UserIdentity};
use certus_domain::{
    GuardedAction, LocationId, PermissionSet, RoleLevel, UserAuditAction, UserId,
    authorize_permission_grant,
};
use tracing::error;

use crate::{
    IdentityProvider, LocationAccessRecord, UserAccessRepository, UserAuditEntry,
    UserAuditRepository, UserRole,
};

mod capability;
mod catalog;
mod create;
mod delete;
mod update;


pub use capability::ManagementCapability;
pub use catalog::{AccountUser, AccountUserLocation};
pub use create::CreateUserInput;
pub use update::UpdateUserInput;

/// Application service for managing staff accounts.
#[derive(Clone)]
pub struct UserManagementService {
    identity_provider: Arc<dyn IdentityProvider>,
    access_repository: Arc<dyn UserAccessRepository>,
    audit_repository: Arc<dyn UserAuditRepository>,
}

impl UserManagementService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        access_repository: Arc<dyn UserAccessRepository>,
        audit_repository: Arc<dyn UserAuditRepository>,
    ) -> Self {
        Self {
            identity_provider,
            access_repository,
            audit_repository,
        }
    }

    async fn actor_role(&self, actor_id: UserId) -> AppResult<Option<UserRole>> {
        self.access_repository.find_user_role(actor_id).await
    }

    async fn actor_scope(&self, actor_id: UserId) -> AppResult<ActorScope> {
        let locations = self.access_repository.list_location_access(actor_id).await?;
        ActorScope::from_locations(&locations)
    }

    /// Checks account membership, then runs the guard on the target's
    /// current permission set.
    ///
    /// Targets outside the actor's account are reported as not found
    /// before their permissions are looked at.
    async fn authorize_target(
        &self,
        action: GuardedAction,
        actor_permissions: Option<&PermissionSet>,
        scope: &ActorScope,
        target_id: UserId,
    ) -> AppResult<()> {
        let in_account = self
            .access_repository
            .list_location_access(target_id)
            .await?
            .iter()
            .any(|location| location.account_id == scope.account_id);

        if !in_account {
            return Err(AppError::NotFound("target user not found".to_owned()));
        }

        let target_role = self.access_repository.find_user_role(target_id).await?;
        let target_permissions = target_role.as_ref().map(|role| &role.permissions);

        authorize_permission_grant(action, actor_permissions, target_permissions)
    }

    /// Appends an audit entry. The change already happened, so a failed
    /// write is logged and not surfaced.
    async fn record_audit(
        &self,
        modified_user_id: UserId,
        actor_id: UserId,
        action: UserAuditAction,
        changes: serde_json::Value,
    ) {
        let entry = UserAuditEntry {
            modified_user_id,
            modified_by_user_id: actor_id,
            action,
            changes,
        };

        if let Err(audit_error) = self.audit_repository.append_entry(entry).await {
            error!(
                user_id = %modified_user_id,
                action = action.as_str(),
                error = %audit_error,
                "failed to append user audit entry"
            );
        }
    }
}

/// Account and locations visible to the acting user.
#[derive(Debug, Clone)]
struct ActorScope {
    account_id: AccountId,
    location_ids: BTreeSet<LocationId>,
}

impl ActorScope {
    fn from_locations(locations: &[LocationAccessRecord]) -> AppResult<Self> {
        let account_id = locations
            .first()
            .map(|location| location.account_id)
            .ok_or_else(|| AppError::Forbidden("creator account not found".to_owned()))?;

        Ok(Self {
            account_id,
            location_ids: locations
                .iter()
                .map(|location| location.location_id)
                .collect(),
        })
    }
}

fn actor_id(actor: &UserIdentity) -> UserId {
    UserId::from_uuid(actor.user_id())
}

fn reject_self_target(actor_id: UserId, target_id: UserId, message: &str) -> AppResult<()> {
    if actor_id == target_id {
        return Err(AppError::Forbidden(message.to_owned()));
    }

    Ok(())
}

fn role_level_allows(actor_level: RoleLevel, required: RoleLevel) -> bool {
    actor_level >= required
}

/// Audit rows require a JSON object; an unserializable change set is logged
/// and stored as `{}`.
fn serialize_changes<T: serde::Serialize>(changes: &T) -> serde_json::Value {
    serde_json::to_value(changes).unwrap_or_else(|serialize_error| {
        error!(error = %serialize_error, "failed to serialize audit changes");
        serde_json::Value::Object(serde_json::Map::new())
    })
}
