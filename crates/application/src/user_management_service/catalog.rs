use std::collections::BTreeMap;

use certus_domain::RolePermissionSetId;

use crate::RolePermissionSetRecord;

use super::*;

/// Location entry shown for an account user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUserLocation {
    /// Location identifier.
    pub location_id: LocationId,
    /// Location display name.
    pub location_name: String,
}

/// User projection for the management console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUser {
    /// User identifier.
    pub user_id: UserId,
    /// Email, or `Unknown` when the identity is missing.
    pub email: String,
    /// Display name from the identity metadata.
    pub display_name: Option<String>,
    /// Identity creation timestamp in RFC3339.
    pub created_at: Option<String>,
    /// Role name, or `No role`.
    pub role_name: String,
    /// Permission set name, or `No permission set`.
    pub permission_set_name: String,
    /// Assigned permission set, if any.
    pub role_permission_id: Option<RolePermissionSetId>,
    /// Locations the user can see inside the account.
    pub locations: Vec<AccountUserLocation>,
}

impl UserManagementService {
    /// Lists permission sets the actor may hand out: those whose permissions
    /// the actor already holds, ordered by role level.
    pub async fn creatable_roles(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<RolePermissionSetRecord>> {
        let actor_role = self
            .actor_role(actor_id(actor))
            .await?
            .ok_or_else(|| AppError::Forbidden("your role was not found".to_owned()))?;

        Ok(self
            .access_repository
            .list_role_permission_sets()
            .await?
            .into_iter()
            .filter(|record| actor_role.permissions.covers(&record.permissions))
            .collect())
    }

    /// Lists locations the actor may grant to other users.
    pub async fn assignable_locations(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<LocationAccessRecord>> {
        self.access_repository
            .list_location_access(actor_id(actor))
            .await
    }

    /// Lists every user with location access in the actor's account,
    /// sorted by email.
    pub async fn list_account_users(&self, actor: &UserIdentity) -> AppResult<Vec<AccountUser>> {
        self.require_management_capability(actor, "you do not have permission to manage users")
            .await?;

        let actor_locations = self
            .access_repository
            .list_location_access(actor_id(actor))
            .await?;
        let Some(account_id) = actor_locations.first().map(|location| location.account_id) else {
            return Ok(Vec::new());
        };

        let mut locations_by_user: BTreeMap<UserId, Vec<AccountUserLocation>> = BTreeMap::new();
        for row in self
            .access_repository
            .list_account_location_access(account_id)
            .await?
        {
            locations_by_user
                .entry(row.user_id)
                .or_default()
                .push(AccountUserLocation {
                    location_id: row.location_id,
                    location_name: row.location_name,
                });
        }

        let user_ids: Vec<UserId> = locations_by_user.keys().copied().collect();
        let identities = self.identity_provider.list_users().await?;
        let assignments = self
            .access_repository
            .list_role_assignments(&user_ids)
            .await?;

        let mut users: Vec<AccountUser> = locations_by_user
            .into_iter()
            .map(|(user_id, locations)| {
                let identity = identities.iter().find(|identity| identity.id == user_id);
                let assignment = assignments
                    .iter()
                    .find(|assignment| assignment.user_id == user_id);

                AccountUser {
                    user_id,
                    email: identity
                        .and_then(|identity| identity.email.clone())
                        .unwrap_or_else(|| "Unknown".to_owned()),
                    display_name: identity.and_then(|identity| identity.display_name.clone()),
                    created_at: identity.and_then(|identity| identity.created_at.clone()),
                    role_name: assignment
                        .map(|assignment| assignment.role_name.clone())
                        .unwrap_or_else(|| "No role".to_owned()),
                    permission_set_name: assignment
                        .map(|assignment| assignment.permission_set_name.clone())
                        .unwrap_or_else(|| "No permission set".to_owned()),
                    role_permission_id: assignment.map(|assignment| assignment.role_permission_id),
                    locations,
                }
            })
            .collect();

        users.sort_by_cached_key(|user| user.email.to_lowercase());
        Ok(users)
    }
}
