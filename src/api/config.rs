use super::ApiError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";
/// Request timeout applied to every call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how the client talks to the backend. Values are public; no secrets here.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            user_agent: crate::APP_USER_AGENT.to_string(),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    ///
    /// # Errors
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim().trim_start_matches('/'))?)
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Config("API base URL is not configured".to_string()));
    }

    let mut url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ApiError::Config(format!(
                "unsupported API URL scheme: {scheme}"
            )));
        }
    }

    // Without a trailing slash `join` would replace the last path segment.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_root_base() {
        let config = ApiConfig::new("http://localhost:8081").unwrap();
        assert_eq!(
            config.endpoint("/user/doLogin").unwrap().as_str(),
            "http://localhost:8081/user/doLogin"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let config = ApiConfig::new(" https://api.guducat.dev/backend ").unwrap();
        assert_eq!(
            config.endpoint("user/getInfo").unwrap().as_str(),
            "https://api.guducat.dev/backend/user/getInfo"
        );

        let config = ApiConfig::new("https://api.guducat.dev/backend/").unwrap();
        assert_eq!(
            config.endpoint("/user/getInfo").unwrap().as_str(),
            "https://api.guducat.dev/backend/user/getInfo"
        );
    }

    #[test]
    fn rejects_empty_and_non_http_urls() {
        assert!(matches!(ApiConfig::new("  "), Err(ApiError::Config(_))));
        assert!(matches!(
            ApiConfig::new("ftp://files.guducat.dev"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(ApiConfig::new("not a url"), Err(ApiError::Url(_))));
    }

    #[test]
    fn defaults() {
        let config = ApiConfig::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.user_agent, crate::APP_USER_AGENT);

        let config = config.with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
