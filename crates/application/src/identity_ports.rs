use async_trait::async_trait;

use certus_core::AppResult;
use certus_domain::{EmailAddress, UserId};

/// Identity record held by the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    /// Provider-issued user identifier.
    pub id: UserId,
    /// Email on the identity, if any.
    pub email: Option<String>,
    /// `display_name` from the user metadata.
    pub display_name: Option<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: Option<String>,
}

/// Input for creating a pre-confirmed identity through the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    /// Normalized email for the account.
    pub email: EmailAddress,
    /// Optional display name stored in user metadata.
    pub display_name: Option<String>,
    /// User that requested the account.
    pub created_by: UserId,
    /// Request timestamp in RFC3339, stored in user metadata.
    pub created_at: String,
}

/// Session issued by the provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    /// Bearer token for provider calls made on behalf of the user.
    pub access_token: String,
    /// Authenticated identity.
    pub user: IdentityUser,
}

/// Request for a passwordless sign-in link using the PKCE flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInLinkRequest {
    /// Recipient of the link.
    pub email: EmailAddress,
    /// Absolute callback URL embedded in the link.
    pub redirect_to: String,
    /// S256 challenge derived from the verifier kept in the server session.
    pub code_challenge: String,
}

/// Port for the hosted identity provider (admin and session APIs).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Lists every identity known to the provider.
    async fn list_users(&self) -> AppResult<Vec<IdentityUser>>;

    /// Creates an identity with the email already confirmed.
    async fn create_user(&self, identity: NewIdentity) -> AppResult<IdentityUser>;

    /// Replaces the display name in the user metadata. `None` clears it.
    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: Option<&str>,
    ) -> AppResult<()>;

    /// Deletes an identity. Dependent rows are removed by the platform.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;

    /// Exchanges a PKCE authorization code for a session.
    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> AppResult<ProviderSession>;

    /// Sends a passwordless sign-in link without creating new users.
    async fn send_sign_in_link(&self, request: SignInLinkRequest) -> AppResult<()>;

    /// Revokes the provider session behind an access token.
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}
