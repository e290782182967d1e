//! Passwordless sign-in through the hosted identity provider.
//!
//! Only accounts that already exist and hold a permission set may sign in.
//! The callback revokes provider sessions of accounts without one.

use std::sync::Arc;

use certus_core::{AppError, AppResult, UserIdentity};
use certus_domain::EmailAddress;
use tracing::{info, warn};

use crate::{IdentityProvider, IdentityUser, SignInLinkRequest, UserAccessRepository};

mod pkce;


pub use pkce::PkceChallenge;

/// Whether an email belongs to an identity that may use the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAccessStatus {
    /// An identity with this email exists.
    pub exists: bool,
    /// The identity holds a permission set.
    pub has_permissions: bool,
}

/// Result of the authorization code callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// The user may enter the console.
    SignedIn {
        /// Identity to store in the server session.
        identity: UserIdentity,
        /// Provider token used to revoke the session on logout.
        access_token: String,
    },
    /// Authenticated, but no permission set is assigned.
    MissingPermissions,
    /// The code exchange failed.
    Failed,
}

/// Application service for console sign-in.
#[derive(Clone)]
pub struct SignInService {
    identity_provider: Arc<dyn IdentityProvider>,
    access_repository: Arc<dyn UserAccessRepository>,
}

impl SignInService {
    /// Creates a new sign-in service.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        access_repository: Arc<dyn UserAccessRepository>,
    ) -> Self {
        Self {
            identity_provider,
            access_repository,
        }
    }

    /// Reports whether the email belongs to an identity with a permission set.
    pub async fn check_user_access(&self, email: &str) -> AppResult<UserAccessStatus> {
        let email = EmailAddress::new(email)?;

        let identity = self
            .identity_provider
            .list_users()
            .await
            .map_err(|list_error| {
                warn!(error = %list_error, "failed to list users for sign-in check");
                AppError::External("unable to verify user".to_owned())
            })?
            .into_iter()
            .find(|identity| {
                identity
                    .email
                    .as_deref()
                    .is_some_and(|stored| email.matches(stored))
            });

        let Some(identity) = identity else {
            return Ok(UserAccessStatus {
                exists: false,
                has_permissions: false,
            });
        };

        let has_permissions = self
            .access_repository
            .find_user_role(identity.id)
            .await?
            .is_some();

        Ok(UserAccessStatus {
            exists: true,
            has_permissions,
        })
    }

    /// Sends a sign-in link to a permitted account.
    ///
    /// Returns the PKCE pair; the caller keeps the verifier for the callback.
    pub async fn start_sign_in(&self, email: &str, callback_url: &str) -> AppResult<PkceChallenge> {
        let status = self.check_user_access(email).await?;

        if !status.exists {
            return Err(AppError::NotFound(
                "no account exists for this email".to_owned(),
            ));
        }

        if !status.has_permissions {
            return Err(AppError::Forbidden(
                "this account has no permissions assigned".to_owned(),
            ));
        }

        let pkce = PkceChallenge::generate()?;
        self.identity_provider
            .send_sign_in_link(SignInLinkRequest {
                email: EmailAddress::new(email)?,
                redirect_to: callback_url.to_owned(),
                code_challenge: pkce.challenge().to_owned(),
            })
            .await?;

        Ok(pkce)
    }

    /// Exchanges the callback code and admits only users with a permission set.
    pub async fn complete_sign_in(&self, auth_code: &str, code_verifier: &str) -> SignInOutcome {
        let session = match self
            .identity_provider
            .exchange_code_for_session(auth_code, code_verifier)
            .await
        {
            Ok(session) => session,
            Err(exchange_error) => {
                warn!(error = %exchange_error, "authorization code exchange failed");
                return SignInOutcome::Failed;
            }
        };

        let has_permissions = match self.access_repository.find_user_role(session.user.id).await {
            Ok(role) => role.is_some(),
            Err(lookup_error) => {
                warn!(user_id = %session.user.id, error = %lookup_error, "permission lookup failed");
                false
            }
        };

        if !has_permissions {
            if let Err(sign_out_error) = self.sign_out(session.access_token.as_str()).await {
                warn!(error = %sign_out_error, "failed to revoke session without permissions");
            }
            return SignInOutcome::MissingPermissions;
        }

        info!(user_id = %session.user.id, "user signed in");
        SignInOutcome::SignedIn {
            identity: session_identity(&session.user),
            access_token: session.access_token,
        }
    }

    /// Revokes the provider session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.identity_provider.sign_out(access_token).await
    }
}

fn session_identity(user: &IdentityUser) -> UserIdentity {
    let display_name = user
        .display_name
        .clone()
        .or_else(|| {
            user.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| "new user".to_owned());

    UserIdentity::new(user.id.as_uuid(), display_name, user.email.clone())
}
