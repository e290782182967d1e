use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use certus_core::{AccountId, AppError, AppResult, UserIdentity};
use certus_domain::{LocationId, PermissionSet, RoleLevel, RolePermissionSetId, UserId};

use crate::{
    AccountMemberLocation, IdentityProvider, IdentityUser, LocationAccessRecord, NewIdentity,
    ProviderSession, RolePermissionSetRecord, SignInLinkRequest, UserAccessRepository,
    UserAuditEntry, UserAuditRepository, UserRole, UserRoleAssignment,
};

pub(crate) const OWNER_SET: RolePermissionSetId = RolePermissionSetId::new(1);
pub(crate) const MANAGER_SET: RolePermissionSetId = RolePermissionSetId::new(2);
pub(crate) const STAFF_SET: RolePermissionSetId = RolePermissionSetId::new(3);
pub(crate) const AUDITOR_SET: RolePermissionSetId = RolePermissionSetId::new(4);

pub(crate) fn permission_sets() -> Vec<RolePermissionSetRecord> {
    let record = |id, name: &str, role_name: &str, level, permissions: Vec<i32>| {
        RolePermissionSetRecord {
            role_permission_id: id,
            name: name.to_owned(),
            description: None,
            role_name: role_name.to_owned(),
            role_level: RoleLevel::new(level),
            permissions: PermissionSet::from(permissions),
        }
    };

    vec![
        record(STAFF_SET, "Front of house", "Staff", 1, vec![1]),
        record(AUDITOR_SET, "Call auditor", "Auditor", 2, vec![5]),
        record(MANAGER_SET, "Shift manager", "Manager", 3, vec![1, 2]),
        record(OWNER_SET, "Full access", "Owner", 5, vec![1, 2, 3, 4]),
    ]
}

pub(crate) fn identity(user_id: UserId, email: &str) -> UserIdentity {
    UserIdentity::new(user_id.as_uuid(), email, Some(email.to_owned()))
}

#[derive(Default)]
pub(crate) struct FakeIdentityProvider {
    pub(crate) users: Mutex<Vec<IdentityUser>>,
    pub(crate) created: Mutex<Vec<NewIdentity>>,
    pub(crate) display_name_updates: Mutex<Vec<(UserId, Option<String>)>>,
    pub(crate) sent_links: Mutex<Vec<SignInLinkRequest>>,
    pub(crate) revoked_tokens: Mutex<Vec<String>>,
    pub(crate) session: Option<ProviderSession>,
    pub(crate) fail_create: bool,
}

impl FakeIdentityProvider {
    pub(crate) async fn add_user(&self, user_id: UserId, email: &str) {
        self.users.lock().await.push(IdentityUser {
            id: user_id,
            email: Some(email.to_owned()),
            display_name: None,
            created_at: Some("2026-01-05T09:00:00Z".to_owned()),
        });
    }

    pub(crate) async fn contains(&self, user_id: UserId) -> bool {
        self.users
            .lock()
            .await
            .iter()
            .any(|user| user.id == user_id)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn list_users(&self) -> AppResult<Vec<IdentityUser>> {
        Ok(self.users.lock().await.clone())
    }

    async fn create_user(&self, identity: NewIdentity) -> AppResult<IdentityUser> {
        if self.fail_create {
            return Err(AppError::Internal("admin api unavailable".to_owned()));
        }

        let user = IdentityUser {
            id: UserId::new(),
            email: Some(identity.email.as_str().to_owned()),
            display_name: identity.display_name.clone(),
            created_at: Some("2026-10-19T12:00:00Z".to_owned()),
        };
        self.users.lock().await.push(user.clone());
        self.created.lock().await.push(identity);
        Ok(user)
    }

    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: Option<&str>,
    ) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        user.display_name = display_name.map(ToOwned::to_owned);
        self.display_name_updates
            .lock()
            .await
            .push((user_id, display_name.map(ToOwned::to_owned)));
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.users.lock().await.retain(|user| user.id != user_id);
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        _code_verifier: &str,
    ) -> AppResult<ProviderSession> {
        self.session
            .clone()
            .filter(|_| auth_code == "valid-code")
            .ok_or_else(|| AppError::Unauthorized("invalid auth code".to_owned()))
    }

    async fn send_sign_in_link(&self, request: SignInLinkRequest) -> AppResult<()> {
        self.sent_links.lock().await.push(request);
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.revoked_tokens
            .lock()
            .await
            .push(access_token.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeUserAccessRepository {
    pub(crate) permission_sets: Vec<RolePermissionSetRecord>,
    pub(crate) roles: Mutex<HashMap<UserId, RolePermissionSetId>>,
    pub(crate) locations: Mutex<Vec<(UserId, LocationAccessRecord)>>,
    pub(crate) management_level: Option<RoleLevel>,
    pub(crate) fail_assign_role: bool,
    pub(crate) fail_grant_locations: bool,
}

impl FakeUserAccessRepository {
    pub(crate) async fn set_role(&self, user_id: UserId, role_permission_id: RolePermissionSetId) {
        self.roles.lock().await.insert(user_id, role_permission_id);
    }

    pub(crate) async fn add_location(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_id: LocationId,
        name: &str,
    ) {
        self.locations.lock().await.push((
            user_id,
            LocationAccessRecord {
                location_id,
                location_name: name.to_owned(),
                account_id,
            },
        ));
    }

    pub(crate) async fn location_ids_of(&self, user_id: UserId) -> Vec<LocationId> {
        self.locations
            .lock()
            .await
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, record)| record.location_id)
            .collect()
    }

    fn permission_set(&self, id: RolePermissionSetId) -> Option<&RolePermissionSetRecord> {
        self.permission_sets
            .iter()
            .find(|record| record.role_permission_id == id)
    }

    fn location_name(&self, locations: &[(UserId, LocationAccessRecord)], id: LocationId) -> String {
        locations
            .iter()
            .find(|(_, record)| record.location_id == id)
            .map(|(_, record)| record.location_name.clone())
            .unwrap_or_else(|| "Unnamed".to_owned())
    }
}

#[async_trait]
impl UserAccessRepository for FakeUserAccessRepository {
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        let roles = self.roles.lock().await;
        Ok(roles
            .get(&user_id)
            .and_then(|id| self.permission_set(*id))
            .map(|record| UserRole {
                role_permission_id: record.role_permission_id,
                role_level: record.role_level,
                permissions: record.permissions.clone(),
            }))
    }

    async fn find_role_permission_set(
        &self,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<Option<RolePermissionSetRecord>> {
        Ok(self.permission_set(role_permission_id).cloned())
    }

    async fn list_role_permission_sets(&self) -> AppResult<Vec<RolePermissionSetRecord>> {
        let mut records = self.permission_sets.clone();
        records.sort_by_key(|record| record.role_level);
        Ok(records)
    }

    async fn list_location_access(&self, user_id: UserId) -> AppResult<Vec<LocationAccessRecord>> {
        Ok(self
            .locations
            .lock()
            .await
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn list_account_location_access(
        &self,
        account_id: AccountId,
    ) -> AppResult<Vec<AccountMemberLocation>> {
        Ok(self
            .locations
            .lock()
            .await
            .iter()
            .filter(|(_, record)| record.account_id == account_id)
            .map(|(user_id, record)| AccountMemberLocation {
                user_id: *user_id,
                location_id: record.location_id,
                location_name: record.location_name.clone(),
            })
            .collect())
    }

    async fn list_role_assignments(
        &self,
        user_ids: &[UserId],
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let roles = self.roles.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| {
                let record = roles.get(user_id).and_then(|id| self.permission_set(*id))?;
                Some(UserRoleAssignment {
                    user_id: *user_id,
                    role_permission_id: record.role_permission_id,
                    permission_set_name: record.name.clone(),
                    role_name: record.role_name.clone(),
                })
            })
            .collect())
    }

    async fn user_management_level(&self, _account_id: AccountId) -> AppResult<Option<RoleLevel>> {
        Ok(self.management_level)
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        if self.fail_assign_role {
            return Err(AppError::Internal("role insert rejected".to_owned()));
        }

        self.set_role(user_id, role_permission_id).await;
        Ok(())
    }

    async fn change_role(
        &self,
        user_id: UserId,
        role_permission_id: RolePermissionSetId,
    ) -> AppResult<()> {
        self.set_role(user_id, role_permission_id).await;
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId) -> AppResult<()> {
        self.roles.lock().await.remove(&user_id);
        Ok(())
    }

    async fn grant_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        _granted_by: UserId,
    ) -> AppResult<()> {
        if self.fail_grant_locations {
            return Err(AppError::Internal("location insert rejected".to_owned()));
        }

        let mut locations = self.locations.lock().await;
        for location_id in location_ids {
            let location_name = self.location_name(&locations, *location_id);
            locations.push((
                user_id,
                LocationAccessRecord {
                    location_id: *location_id,
                    location_name,
                    account_id,
                },
            ));
        }
        Ok(())
    }

    async fn replace_locations(
        &self,
        user_id: UserId,
        account_id: AccountId,
        location_ids: &[LocationId],
        _granted_by: UserId,
    ) -> AppResult<()> {
        let mut locations = self.locations.lock().await;
        let names: Vec<(LocationId, String)> = location_ids
            .iter()
            .map(|id| (*id, self.location_name(&locations, *id)))
            .collect();
        locations.retain(|(owner, _)| *owner != user_id);
        for (location_id, location_name) in names {
            locations.push((
                user_id,
                LocationAccessRecord {
                    location_id,
                    location_name,
                    account_id,
                },
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeUserAuditRepository {
    pub(crate) entries: Mutex<Vec<UserAuditEntry>>,
}

#[async_trait]
impl UserAuditRepository for FakeUserAuditRepository {
    async fn append_entry(&self, entry: UserAuditEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}
