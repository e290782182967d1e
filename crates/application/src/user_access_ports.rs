use async_trait::async_trait;

use certus_core::{AccountId, AppResult};
use certus_domain::{LocationId, PermissionSet, RoleLevel, RolePermissionSetId, UserId};

/// Permission set currently assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    /// Assigned permission set.
    pub role_permission_id: RolePermissionSetId,
    /// Level of the role owning the permission set.
    pub role_level: RoleLevel,
    /// Permissions granted by the set.
    pub permissions: PermissionSet,
}

/// Named permission set joined with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionSetRecord {
    /// Permission set identifier.
    pub role_permission_id: RolePermissionSetId,
    /// Permission set name.
    pub name: String,
    /// Optional permission set description.
    pub description: Option<String>,
    /// Name of the owning role.
    pub role_name: String,
    /// Level of the owning role.
    pub role_level: RoleLevel,
    /// Permissions granted by the set.
    pub permissions: PermissionSet,
}

/// Location a user can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationAccessRecord {
    /// Location identifier.
    pub location_id: LocationId,
    /// Location display name.
    pub location_name: String,
    /// Account owning the location.
    pub account_id: AccountId,
}

/// Location access row for one user inside an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMemberLocation {
    /// User holding the access.
    pub user_id: UserId,
    /// Location identifier.
    pub location_id: LocationId,
    /// Location display name.
    pub location_name: String,
}

/// Permission set assignment with display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Assigned permission set.
    pub role_permission_id: RolePermissionSetId,
    /// Permission set name.
    pub permission_set_name: String,
    /// Owning role name.
    pub role_name: String,
}

/// Repository port for the permission, location, and account settings tables.
#[async_trait]
pub trait UserAccessRepository: Send + Sync {
    /// Finds the permission set assigned to a user.
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<UserRole>>;

    /// Finds one permission set by identifier.
    async fn find_role_permission_set(
        &self,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<Option<RolePermissionSetRecord>>;

    /// Lists every permission set ordered by role level ascending.
    async fn list_role_permission_sets(&self) -> AppResult<Vec<RolePermissionSetRecord>>;

    /// Lists the locations a user can see.
    async fn list_location_access(&self, user_id: UserId) -> AppResult<Vec<LocationAccessRecord>>;

    /// Lists every location access row inside an account.
    async fn list_account_location_access(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AccountMemberLocation>>;

    /// Lists permission set assignments for the given users.
    async fn list_role_assignments(&self, user_ids: &[UserId])
    -> AppResult<Vec<UserRoleAssignment>>;

    /// Returns the minimum role level allowed to manage users, if configured.
    async fn user_management_level(&self, account_id: AccountId) -> AppResult<Option<RoleLevel>>;

    /// Inserts the permission set join row for a user.
    async fn assign_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()>;

    /// Points an existing join row at another permission set.
    async fn change_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()>;

    /// Removes the permission set join row for a user.
    async fn remove_role(&self, user_id: UserId) -> AppResult<()>;

    /// Inserts location access rows for a user.
    async fn grant_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()>;

    /// Replaces every location access row of a user.
    async fn replace_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        granted_by: UserId,
    ) -> AppResult<()>;
}
