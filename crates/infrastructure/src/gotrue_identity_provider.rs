use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use certus_application::{
    IdentityProvider, IdentityUser, NewIdentity, ProviderSession, SignInLinkRequest,
};
use certus_core::{AppError, AppResult};
use certus_domain::UserId;


const USERS_PAGE_SIZE: usize = 1000;

/// Identity provider backed by a GoTrue-compatible auth REST API.
///
/// Admin calls authenticate with the service role key, session calls with
/// the anonymous key.
#[derive(Clone)]
pub struct GoTrueIdentityProvider {
    http_client: reqwest::Client,
    auth_url: Url,
    anon_key: String,
    service_role_key: String,
}

impl GoTrueIdentityProvider {
    /// Creates a provider for the auth API under `{project_url}/auth/v1/`.
    pub fn new(
        http_client: reqwest::Client,
        project_url: &str,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> AppResult<Self> {
        let mut base = Url::parse(project_url).map_err(|error| {
            AppError::Validation(format!("invalid auth project url '{project_url}': {error}"))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(path.as_str());
        }

        let auth_url = base.join("auth/v1/").map_err(|error| {
            AppError::Validation(format!("invalid auth project url '{project_url}': {error}"))
        })?;

        Ok(Self {
            http_client,
            auth_url,
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.auth_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build auth endpoint '{path}': {error}"))
        })
    }

    fn admin_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", self.service_role_key.as_str())
            .bearer_auth(self.service_role_key.as_str())
    }

    fn public_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
    }

    async fn list_users_page(&self, page: usize) -> AppResult<Vec<GoTrueUser>> {
        let mut url = self.endpoint("admin/users")?;
        url.query_pairs_mut()
            .append_pair("page", page.to_string().as_str())
            .append_pair("per_page", USERS_PAGE_SIZE.to_string().as_str());

        let response = send(self.admin_request(Method::GET, url), "list users").await?;
        let page: GoTrueUserPage = decode(response, "list users").await?;
        Ok(page.users)
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueUserPage {
    #[serde(default)]
    users: Vec<GoTrueUser>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: uuid::Uuid,
    email: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    user_metadata: Option<Map<String, Value>>,
}

impl From<GoTrueUser> for IdentityUser {
    fn from(value: GoTrueUser) -> Self {
        let display_name = value
            .user_metadata
            .as_ref()
            .and_then(|metadata| metadata.get("display_name"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        Self {
            id: UserId::from_uuid(value.id),
            email: value.email.filter(|email| !email.is_empty()),
            display_name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    user: GoTrueUser,
}

#[async_trait]
impl IdentityProvider for GoTrueIdentityProvider {
    async fn list_users(&self) -> AppResult<Vec<IdentityUser>> {
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_users_page(page).await?;
            let batch_len = batch.len();
            users.extend(batch.into_iter().map(IdentityUser::from));

            if batch_len < USERS_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    async fn create_user(&self, identity: NewIdentity) -> AppResult<IdentityUser> {
        let url = self.endpoint("admin/users")?;
        let body = json!({
            "email": identity.email.as_str(),
            "email_confirm": true,
            "user_metadata": {
                "display_name": identity.display_name,
                "created_by": identity.created_by.as_uuid(),
                "created_at": identity.created_at,
            },
        });

        let response = send(self.admin_request(Method::POST, url).json(&body), "create user").await?;
        let user: GoTrueUser = decode(response, "create user").await?;
        Ok(user.into())
    }

    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: Option<&str>,
    ) -> AppResult<()> {
        let url = self.endpoint(format!("admin/users/{user_id}").as_str())?;
        let body = json!({ "user_metadata": { "display_name": display_name } });

        send(
            self.admin_request(Method::PUT, url).json(&body),
            "update user metadata",
        )
        .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let url = self.endpoint(format!("admin/users/{user_id}").as_str())?;
        send(self.admin_request(Method::DELETE, url), "delete user").await?;
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> AppResult<ProviderSession> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");
        let body = json!({
            "auth_code": auth_code,
            "code_verifier": code_verifier,
        });

        let response = send(
            self.public_request(Method::POST, url).json(&body),
            "exchange authorization code",
        )
        .await?;
        let session: GoTrueSession = decode(response, "exchange authorization code").await?;

        Ok(ProviderSession {
            access_token: session.access_token,
            user: session.user.into(),
        })
    }

    async fn send_sign_in_link(&self, request: SignInLinkRequest) -> AppResult<()> {
        let mut url = self.endpoint("otp")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", request.redirect_to.as_str());
        let body = json!({
            "email": request.email.as_str(),
            "create_user": false,
            "code_challenge": request.code_challenge,
            "code_challenge_method": "s256",
        });

        send(
            self.public_request(Method::POST, url).json(&body),
            "send sign-in link",
        )
        .await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let url = self.endpoint("logout")?;
        send(
            self.public_request(Method::POST, url)
                .bearer_auth(access_token),
            "sign out",
        )
        .await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder, operation: &str) -> AppResult<Response> {
    let response = request.send().await.map_err(|error| {
        AppError::Internal(format!("identity provider request to {operation} failed: {error}"))
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    let message = format!("identity provider rejected {operation} with status {status}: {body}");

    Err(match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            AppError::Unauthorized(message)
        }
        reqwest::StatusCode::NOT_FOUND => AppError::NotFound(message),
        reqwest::StatusCode::UNPROCESSABLE_ENTITY | reqwest::StatusCode::BAD_REQUEST => {
            AppError::Validation(message)
        }
        _ => AppError::Internal(message),
    })
}

async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> AppResult<T> {
    response.json::<T>().await.map_err(|error| {
        AppError::Internal(format!(
            "failed to decode identity provider response to {operation}: {error}"
        ))
    })
}
