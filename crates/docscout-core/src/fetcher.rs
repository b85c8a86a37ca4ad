//! Shared HTTP client for registry lookups, existence probes, and page fetches.

use crate::config::DiscoveryConfig;
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client used by every discovery tier and the crawler.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&DiscoveryConfig::default())
    }

    /// Creates a fetcher from discovery settings (user agent, timeouts, redirects).
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            probe_timeout: config.probe_timeout(),
            fetch_timeout: config.fetch_timeout(),
        })
    }

    /// Check whether a URL exists using a HEAD request.
    ///
    /// Redirects are followed and only a final 2xx counts. Errors, timeouts,
    /// and every other status are reported as `false`; nothing is retried.
    pub async fn exists(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(url = %url, status = %response.status(), exists = ok, "Probed URL");
                ok
            },
            Err(e) => {
                debug!(url = %url, error = %e, "Probe failed");
                false
            },
        }
    }

    /// Fetch a URL as text.
    ///
    /// 404 maps to [`Error::NotFound`]; other non-2xx statuses and transport
    /// failures map to [`Error::Network`].
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send_get(url).await?;
        Ok(response.text().await?)
    }

    /// Fetch a URL and deserialize its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send_get(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("'{url}' returned 404")));
        }
        Ok(response.error_for_status()?)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_fetcher() -> Fetcher {
        let config = DiscoveryConfig {
            probe_timeout_secs: 1,
            fetch_timeout_secs: 1,
            ..DiscoveryConfig::default()
        };
        Fetcher::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_exists_true_on_200() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/docs"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let url = format!("{}/docs", mock_server.uri());
        assert!(fast_fetcher().exists(&url).await);
    }

    #[tokio::test]
    async fn test_exists_false_on_404_and_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = fast_fetcher();
        assert!(!fetcher.exists(&format!("{}/missing", mock_server.uri())).await);
        assert!(!fetcher.exists(&format!("{}/broken", mock_server.uri())).await);
    }

    #[tokio::test]
    async fn test_exists_follows_redirects() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/docs"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/intro"))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/docs/intro"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        assert!(fast_fetcher().exists(&format!("{}/docs", mock_server.uri())).await);
    }

    #[tokio::test]
    async fn test_exists_false_on_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        assert!(!fast_fetcher().exists(&mock_server.uri()).await);
    }

    #[tokio::test]
    async fn test_exists_false_on_unroutable_url() {
        assert!(!fast_fetcher().exists("http://127.0.0.1:1/nothing").await);
        assert!(!fast_fetcher().exists("not a url").await);
    }

    #[tokio::test]
    async fn test_get_text_maps_404_to_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        match fast_fetcher().get_text(&mock_server.uri()).await {
            Err(Error::NotFound(_)) => {},
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_rejects_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&mock_server)
            .await;

        let result: Result<serde_json::Value> = fast_fetcher().get_json(&mock_server.uri()).await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
