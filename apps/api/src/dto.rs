mod auth;
mod users;

use serde::Serialize;
use ts_rs::TS;

pub use auth::{AuthCallbackQuery, AuthLoginRequest, AuthLoginResponse, UserIdentityResponse};
pub use users::{
    AccountUserResponse, CreateUserRequest, CreateUserResponse, LocationAccessResponse,
    ManagementCapabilityResponse, RolePermissionSetResponse, UpdateUserRequest,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
