use certus_application::{
    AccountUser, CreateUserInput, LocationAccessRecord, ManagementCapability,
    RolePermissionSetRecord, UpdateUserInput,
};
use certus_core::AppError;
use certus_domain::{LocationId, RolePermissionSetId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Whether the current user may manage other users.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/management-capability-response.ts"
)]
pub struct ManagementCapabilityResponse {
    pub can_manage: bool,
    pub role_level: Option<i32>,
}

impl From<ManagementCapability> for ManagementCapabilityResponse {
    fn from(value: ManagementCapability) -> Self {
        Self {
            can_manage: value.can_manage,
            role_level: value.role_level.map(|level| level.value()),
        }
    }
}

/// Permission set the current user may hand out.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permission-set-response.ts"
)]
pub struct RolePermissionSetResponse {
    #[ts(type = "number")]
    pub role_permission_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub role_name: String,
    pub role_level: i32,
    pub permission_ids: Vec<i32>,
}

impl From<RolePermissionSetRecord> for RolePermissionSetResponse {
    fn from(value: RolePermissionSetRecord) -> Self {
        Self {
            role_permission_id: value.role_permission_id.value(),
            name: value.name,
            description: value.description,
            role_name: value.role_name,
            role_level: value.role_level.value(),
            permission_ids: value
                .permissions
                .iter()
                .map(|permission| permission.value())
                .collect(),
        }
    }
}

/// Location the current user can see and grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/location-access-response.ts"
)]
pub struct LocationAccessResponse {
    pub location_id: String,
    pub location_name: String,
    pub account_id: String,
}

impl From<LocationAccessRecord> for LocationAccessResponse {
    fn from(value: LocationAccessRecord) -> Self {
        Self {
            location_id: value.location_id.to_string(),
            location_name: value.location_name,
            account_id: value.account_id.to_string(),
        }
    }
}

/// Location entry of an account user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-user-location-response.ts"
)]
pub struct AccountUserLocationResponse {
    pub location_id: String,
    pub location_name: String,
}

/// User row of the management console.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-user-response.ts"
)]
pub struct AccountUserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: Option<String>,
    pub role_name: String,
    pub permission_set_name: String,
    #[ts(type = "number | null")]
    pub role_permission_id: Option<i64>,
    pub locations: Vec<AccountUserLocationResponse>,
}

impl From<AccountUser> for AccountUserResponse {
    fn from(value: AccountUser) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            email: value.email,
            display_name: value.display_name,
            created_at: value.created_at,
            role_name: value.role_name,
            permission_set_name: value.permission_set_name,
            role_permission_id: value.role_permission_id.map(|id| id.value()),
            locations: value
                .locations
                .into_iter()
                .map(|location| AccountUserLocationResponse {
                    location_id: location.location_id.to_string(),
                    location_name: location.location_name,
                })
                .collect(),
        }
    }
}

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    #[ts(type = "number")]
    pub role_permission_id: i64,
    pub location_ids: Vec<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl TryFrom<CreateUserRequest> for CreateUserInput {
    type Error = AppError;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: value.email,
            role_permission_id: RolePermissionSetId::new(value.role_permission_id),
            location_ids: parse_location_ids(&value.location_ids)?,
            full_name: value.full_name,
        })
    }
}

/// Identifier of a newly created user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-response.ts"
)]
pub struct CreateUserResponse {
    pub user_id: String,
}

/// Incoming payload for a partial user update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub role_permission_id: Option<i64>,
    #[serde(default)]
    pub location_ids: Option<Vec<String>>,
}

impl TryFrom<UpdateUserRequest> for UpdateUserInput {
    type Error = AppError;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: value.full_name,
            role_permission_id: value.role_permission_id.map(RolePermissionSetId::new),
            location_ids: value
                .location_ids
                .as_deref()
                .map(parse_location_ids)
                .transpose()?,
        })
    }
}

fn parse_location_ids(values: &[String]) -> Result<Vec<LocationId>, AppError> {
    values
        .iter()
        .map(|value| {
            uuid::Uuid::parse_str(value.trim())
                .map(LocationId::from_uuid)
                .map_err(|error| {
                    AppError::Validation(format!("invalid location id '{value}': {error}"))
                })
        })
        .collect()
}
