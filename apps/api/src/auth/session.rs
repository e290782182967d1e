use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use certus_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::warn;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_ACCESS_TOKEN_KEY;

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    let access_token = session
        .get::<String>(SESSION_ACCESS_TOKEN_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session token: {error}")))?;

    if let Some(access_token) = access_token
        && let Err(error) = state.sign_in_service.sign_out(access_token.as_str()).await
    {
        warn!(error = %error, "failed to revoke provider session");
    }

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(user))
}
