use certus_core::AppError;
use url::Url;

pub(super) const DEFAULT_REDIRECT_PATH: &str = "/overview";
pub(super) const NO_PERMISSIONS_PATH: &str = "/login?error=no_permissions";
pub(super) const AUTHENTICATION_FAILED_PATH: &str = "/login?error=authentication_failed";

/// Keeps only same-origin relative paths.
pub(super) fn sanitize_redirect(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_owned()
        }
        _ => DEFAULT_REDIRECT_PATH.to_owned(),
    }
}

/// Builds the link target the provider sends the user back to.
pub(super) fn callback_url(frontend_url: &str, redirect_path: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(format!("{frontend_url}/auth/callback").as_str())
        .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?;
    url.query_pairs_mut()
        .append_pair("redirectTo", redirect_path);
    Ok(url)
}

pub(super) fn frontend_location(frontend_url: &str, path: &str) -> String {
    format!("{frontend_url}{path}")
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_REDIRECT_PATH, callback_url, frontend_location, sanitize_redirect};

    #[test]
    fn relative_paths_are_kept() {
        assert_eq!(sanitize_redirect(Some("/users?tab=staff")), "/users?tab=staff");
    }

    #[test]
    fn missing_redirect_uses_default() {
        assert_eq!(sanitize_redirect(None), DEFAULT_REDIRECT_PATH);
        assert_eq!(sanitize_redirect(Some("")), DEFAULT_REDIRECT_PATH);
    }

    #[test]
    fn external_targets_are_replaced() {
        for target in [
            "https://evil.test/",
            "//evil.test",
            "/\\evil.test",
            "overview",
            "/\nSet-Cookie:x",
        ] {
            assert_eq!(sanitize_redirect(Some(target)), DEFAULT_REDIRECT_PATH, "{target}");
        }
    }

    #[test]
    fn callback_url_carries_encoded_redirect() {
        let url = callback_url("https://console.certus.test", "/users?tab=staff")
            .unwrap_or_else(|error| panic!("url: {error}"));

        assert_eq!(
            url.as_str(),
            "https://console.certus.test/auth/callback?redirectTo=%2Fusers%3Ftab%3Dstaff"
        );
    }

    #[test]
    fn frontend_location_joins_path() {
        assert_eq!(
            frontend_location("http://localhost:3000", "/overview"),
            "http://localhost:3000/overview"
        );
    }
}
