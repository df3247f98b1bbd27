//! Pingdom client module
//!
//! Provides `PingdomClient` for making GET requests against the Pingdom API 3.1.

use super::Auth;
use crate::error::TapError;
use eyre::{Context, Result, eyre};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use url::Url;

/// Base URL of the Pingdom REST API
pub const DEFAULT_API_URL: &str = "https://api.pingdom.com/api/3.1";

/// User agent sent with every request unless overridden in the config
pub fn default_user_agent() -> String {
    format!("tap-pingdom/{}", env!("CARGO_PKG_VERSION"))
}

/// Pingdom client for making API requests.
///
/// Authentication and the `User-Agent` header are set once as default headers,
/// so every request made through the client carries them.
///
/// # Example
/// ```no_run
/// use tap_pingdom::client::{Auth, PingdomClient, DEFAULT_API_URL};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse(DEFAULT_API_URL)?;
/// let client = PingdomClient::try_new(url, Auth::Bearer("token".into()), "tap-pingdom/0.1.0")?;
/// let checks = client.get_json("/checks", &[("limit".into(), "10".into())]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PingdomClient {
    client: Client,
    url: Url,
}

impl PingdomClient {
    /// Create a new PingdomClient from a base URL, Auth, and user agent.
    ///
    /// The base URL keeps its path (`/api/3.1`); request paths are appended to it.
    ///
    /// # Errors
    /// Returns an error if the headers are invalid or the HTTP client cannot be built
    pub fn try_new(url: Url, auth: Auth, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        auth.apply(&mut headers)
            .with_context(|| "Invalid API token")?;
        let client = Client::builder().default_headers(headers).build()?;

        // Url::join drops the last segment unless the base ends with a slash
        let mut url = url;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        log::debug!("Pingdom client for {} using {} auth", url, auth);

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve an API path such as `/checks` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        // Strip leading slash from path if present, so the base path is kept
        let path_stripped = path.strip_prefix('/').unwrap_or(path);
        self.url
            .join(path_stripped)
            .with_context(|| format!("Invalid API path: {}", path))
    }

    /// Send a GET request with query parameters.
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        log::trace!("GET {} {:?}", url, query);
        self.client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))
    }

    /// Send a GET request and decode the JSON body.
    ///
    /// # Errors
    /// Returns a [`TapError`] for non-success statuses (authentication failures
    /// are reported as [`TapError::Authentication`]), or an error if the
    /// request cannot be sent or the body is not JSON.
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let response = self.get(path, query).await?;

        if !response.status().is_success() {
            let status = response.status();
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(TapError::from_status(&url, status, body).into());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}

impl std::fmt::Display for PingdomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_fatal;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(base: &str, auth: Auth) -> PingdomClient {
        let url = Url::parse(base).unwrap();
        PingdomClient::try_new(url, auth, "tap-pingdom/test").unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for(DEFAULT_API_URL, Auth::None);
        assert_eq!(client.url().as_str(), "https://api.pingdom.com/api/3.1/");
        assert_eq!(
            client.endpoint("/checks").unwrap().as_str(),
            "https://api.pingdom.com/api/3.1/checks"
        );
        assert_eq!(
            client.endpoint("alerting/contacts").unwrap().as_str(),
            "https://api.pingdom.com/api/3.1/alerting/contacts"
        );
        assert_eq!(
            client.endpoint("/maintenance.occurrences").unwrap().as_str(),
            "https://api.pingdom.com/api/3.1/maintenance.occurrences"
        );
    }

    #[test]
    fn test_default_user_agent() {
        assert!(default_user_agent().starts_with("tap-pingdom/"));
    }

    #[tokio::test]
    async fn test_get_json_sends_headers_and_query() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/3.1/checks")
                .header("authorization", "Bearer secret")
                .header("user-agent", "tap-pingdom/test")
                .query_param("limit", "10");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"checks": []}));
        });

        let client = client_for(&server.url("/api/3.1"), Auth::Bearer("secret".to_string()));
        let body = client
            .get_json("/checks", &[("limit".to_string(), "10".to_string())])
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(body, json!({"checks": []}));
    }

    #[tokio::test]
    async fn test_get_json_unauthorized_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/checks");
            then.status(401).body("invalid token");
        });

        let client = client_for(&server.base_url(), Auth::Bearer("bad".to_string()));
        let err = client.get_json("/checks", &[]).await.unwrap_err();

        assert!(is_fatal(&err));
        assert!(err.to_string().contains("invalid token"));
    }

    #[tokio::test]
    async fn test_get_json_server_error_is_not_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/actions");
            then.status(500).body("oops");
        });

        let client = client_for(&server.base_url(), Auth::None);
        let err = client.get_json("/actions", &[]).await.unwrap_err();

        assert!(!is_fatal(&err));
        assert!(matches!(
            err.downcast_ref::<TapError>(),
            Some(TapError::Http { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/probes");
            then.status(200).body("not json");
        });

        let client = client_for(&server.base_url(), Auth::None);
        let err = client.get_json("/probes", &[]).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse response"));
    }
}
