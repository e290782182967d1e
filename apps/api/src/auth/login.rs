use axum::Json;
use axum::extract::State;
use certus_core::AppError;
use tower_sessions::Session;

use crate::dto::{AuthLoginRequest, AuthLoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_CODE_VERIFIER_KEY;
use super::redirect::{callback_url, sanitize_redirect};

/// Sends a passwordless sign-in link to a permitted account.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<AuthLoginResponse>> {
    let redirect_path = sanitize_redirect(payload.redirect_to.as_deref());
    let callback_url = callback_url(state.frontend_url.as_str(), redirect_path.as_str())?;

    let pkce = state
        .sign_in_service
        .start_sign_in(payload.email.as_str(), callback_url.as_str())
        .await?;

    session
        .insert(SESSION_CODE_VERIFIER_KEY, pkce.verifier())
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist code verifier: {error}")))?;

    Ok(Json(AuthLoginResponse {
        status: "link_sent".to_owned(),
    }))
}
