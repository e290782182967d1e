use certus_application::{SignInService, UserManagementService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_management_service: UserManagementService,
    pub sign_in_service: SignInService,
    pub frontend_url: String,
}
