use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use certus_core::AppError;
use tracing_subscriber::EnvFilter;

/// Connection settings for the hosted auth provider.
#[derive(Debug, Clone)]
pub struct AuthProviderConfig {
    pub project_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub auth_provider: AuthProviderConfig,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };
        let required_non_empty = |name: &str| {
            let value = required(name)?;
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} must not be empty")));
            }
            Ok(value)
        };

        let database_url = required("DATABASE_URL")?;
        let frontend_url = lookup("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_owned())
            .trim_end_matches('/')
            .to_owned();

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let request_timeout_secs = match lookup("AUTH_REQUEST_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid AUTH_REQUEST_TIMEOUT_SECS: {error}"))
            })?,
            None => 10,
        };

        let auth_provider = AuthProviderConfig {
            project_url: required_non_empty("SUPABASE_URL")?,
            anon_key: required_non_empty("SUPABASE_ANON_KEY")?,
            service_role_key: required_non_empty("SUPABASE_SERVICE_ROLE_KEY")?,
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            auth_provider,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
