//! HTTP client for storefront crawling
//!
//! Every fetch is a single timed GET with a browser user agent. Failures
//! surface as `CrawlError::Network` and are never retried.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::defaults;
use crate::domain::{CrawlError, CrawlResult};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

/// Shared, cheaply cloneable HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> CrawlResult<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> CrawlResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| CrawlError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url`, failing on transport errors and non-success statuses
    pub async fn fetch_response(&self, url: &str) -> CrawlResult<Response> {
        debug!(url, "HTTP GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::network(url, describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "❌ HTTP error status");
            return Err(CrawlError::network(url, format!("HTTP {status}")));
        }

        Ok(response)
    }

    /// Response body as text
    pub async fn fetch_text(&self, url: &str) -> CrawlResult<String> {
        self.fetch_response(url)
            .await?
            .text()
            .await
            .map_err(|e| CrawlError::network(url, format!("Failed to read response body: {e}")))
    }

    /// Response body decoded as JSON; an undecodable body is a parse error
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> CrawlResult<T> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| CrawlError::parse(url, e))
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StubServer;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(HttpClient::with_config(config).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let server = StubServer::start(vec![("/data.json", 200, r#"{"ok": true}"#.to_string())]).await;
        let client = HttpClient::new().unwrap();

        let value: serde_json::Value = client.fetch_json(&server.url("/data.json")).await.unwrap();
        assert_eq!(value["ok"], serde_json::Value::Bool(true));
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = StubServer::start(vec![]).await;
        let client = HttpClient::new().unwrap();

        let err = client.fetch_text(&server.url("/missing")).await.unwrap_err();
        assert_eq!(err.kind(), "network");
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = StubServer::start(vec![("/bad.json", 200, "{not json".to_string())]).await;
        let client = HttpClient::new().unwrap();

        let err = client
            .fetch_json::<serde_json::Value>(&server.url("/bad.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let client = HttpClient::new().unwrap();
        let err = client.fetch_text("http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
