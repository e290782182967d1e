use axum::extract::{Query, State};
use axum::response::Redirect;
use certus_application::SignInOutcome;
use certus_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::warn;

use crate::dto::AuthCallbackQuery;
use crate::state::AppState;

use super::redirect::{
    AUTHENTICATION_FAILED_PATH, NO_PERMISSIONS_PATH, frontend_location, sanitize_redirect,
};
use super::{SESSION_ACCESS_TOKEN_KEY, SESSION_CODE_VERIFIER_KEY, SESSION_USER_KEY};

/// Completes the sign-in link flow and redirects back to the console.
pub async fn callback_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AuthCallbackQuery>,
) -> Redirect {
    let path = complete_callback(&state, &session, query).await;
    Redirect::to(frontend_location(state.frontend_url.as_str(), path.as_str()).as_str())
}

async fn complete_callback(state: &AppState, session: &Session, query: AuthCallbackQuery) -> String {
    let code_verifier = match session.remove::<String>(SESSION_CODE_VERIFIER_KEY).await {
        Ok(value) => value,
        Err(error) => {
            warn!(error = %error, "failed to read code verifier");
            None
        }
    };

    let (Some(code), Some(code_verifier)) = (query.code, code_verifier) else {
        return AUTHENTICATION_FAILED_PATH.to_owned();
    };

    match state
        .sign_in_service
        .complete_sign_in(code.as_str(), code_verifier.as_str())
        .await
    {
        SignInOutcome::SignedIn {
            identity,
            access_token,
        } => match store_identity(session, identity, access_token).await {
            Ok(()) => sanitize_redirect(query.redirect_to.as_deref()),
            Err(error) => {
                warn!(error = %error, "failed to store session identity");
                AUTHENTICATION_FAILED_PATH.to_owned()
            }
        },
        SignInOutcome::MissingPermissions => NO_PERMISSIONS_PATH.to_owned(),
        SignInOutcome::Failed => AUTHENTICATION_FAILED_PATH.to_owned(),
    }
}

async fn store_identity(
    session: &Session,
    identity: UserIdentity,
    access_token: String,
) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;
    session
        .insert(SESSION_ACCESS_TOKEN_KEY, access_token)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    Ok(())
}
