mod callback;
mod login;
mod redirect;
mod session;

pub use callback::callback_handler;
pub use login::login_handler;
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
pub(super) const SESSION_ACCESS_TOKEN_KEY: &str = "provider_access_token";
pub(super) const SESSION_CODE_VERIFIER_KEY: &str = "pkce_code_verifier";
