use std::sync::Arc;

use certus_application::{
    IdentityProvider, SignInService, UserAccessRepository, UserManagementService,
};
use certus_core::AppError;
use certus_infrastructure::{
    GoTrueIdentityProvider, PostgresUserAccessRepository, PostgresUserAuditRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.auth_provider.request_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(GoTrueIdentityProvider::new(
        http_client,
        config.auth_provider.project_url.as_str(),
        config.auth_provider.anon_key.as_str(),
        config.auth_provider.service_role_key.as_str(),
    )?);
    let access_repository: Arc<dyn UserAccessRepository> =
        Arc::new(PostgresUserAccessRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresUserAuditRepository::new(pool));

    Ok(AppState {
        user_management_service: UserManagementService::new(
            identity_provider.clone(),
            access_repository.clone(),
            audit_repository,
        ),
        sign_in_service: SignInService::new(identity_provider, access_repository),
        frontend_url: config.frontend_url.clone(),
    })
}
