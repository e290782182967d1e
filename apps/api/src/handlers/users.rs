use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use certus_application::{CreateUserInput, UpdateUserInput};
use certus_core::UserIdentity;
use certus_domain::UserId;
use uuid::Uuid;

use crate::dto::{
    AccountUserResponse, CreateUserRequest, CreateUserResponse, LocationAccessResponse,
    ManagementCapabilityResponse, RolePermissionSetResponse, UpdateUserRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn management_capability_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ManagementCapabilityResponse>> {
    let capability = state
        .user_management_service
        .management_capability(&user)
        .await?;

    Ok(Json(capability.into()))
}

pub async fn creatable_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RolePermissionSetResponse>>> {
    let roles = state
        .user_management_service
        .creatable_roles(&user)
        .await?
        .into_iter()
        .map(RolePermissionSetResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn assignable_locations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<LocationAccessResponse>>> {
    let locations = state
        .user_management_service
        .assignable_locations(&user)
        .await?
        .into_iter()
        .map(LocationAccessResponse::from)
        .collect();

    Ok(Json(locations))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AccountUserResponse>>> {
    let users = state
        .user_management_service
        .list_account_users(&user)
        .await?
        .into_iter()
        .map(AccountUserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let input = CreateUserInput::try_from(payload)?;
    let user_id = state
        .user_management_service
        .create_user(&user, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user_id: user_id.to_string(),
        }),
    ))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<StatusCode> {
    let input = UpdateUserInput::try_from(payload)?;
    state
        .user_management_service
        .update_user(&user, UserId::from_uuid(user_id), input)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .user_management_service
        .delete_user(&user, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
