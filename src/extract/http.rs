// src/extract/http.rs
// =============================================================================
// This module downloads page bytes over HTTP.
//
// Key functionality:
// - One GET per URL with a per-request timeout (5 seconds by default)
// - No retries: a failed fetch is simply skipped
// - Every failure (network error, timeout, non-2xx) collapses into an empty
//   body, so callers only have to check is_empty()
//
// The failure categories are only used for logging.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// HTTP transport used by the crawler.
///
/// Cloning is cheap: reqwest::Client is reference counted internally.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crawl-archiver/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    // Fetches a URL and returns its body, or an empty Vec on any failure
    pub async fn fetch(&self, url: &str) -> Vec<u8> {
        match self.try_fetch(url).await {
            Ok(bytes) => bytes,
            Err(FetchFailure::Status(status)) => {
                tracing::warn!(url, status, "fetch returned a non-success status");
                Vec::new()
            }
            Err(FetchFailure::Transport(error)) => {
                tracing::warn!(url, reason = categorize_error(&error), error = %error, "fetch failed");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(FetchFailure::Transport)?;
        Ok(bytes.to_vec())
    }
}

// Why a fetch did not produce a body
enum FetchFailure {
    Status(u16),
    Transport(reqwest::Error),
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: &reqwest::Error) -> &'static str {
    let error_string = error.to_string();

    if error.is_timeout() {
        "timeout"
    } else if error.is_redirect() {
        "too_many_redirects"
    } else if error.is_builder() {
        "invalid_url"
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "dns_error"
        } else {
            "connection_failed"
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "ssl_error"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    #[tokio::test]
    async fn test_fetch_success_returns_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200).body("<html>ok</html>");
            })
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher.fetch(&server.url("/page")).await;

        assert_eq!(body, b"<html>ok</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("not found page");
            })
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        assert!(fetcher.fetch(&server.url("/missing")).await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .body("late")
                    .delay(Duration::from_millis(500));
            })
            .await;

        let fetcher = Fetcher::new(Duration::from_millis(50)).unwrap();
        assert!(fetcher.fetch(&server.url("/slow")).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_empty() {
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        assert!(fetcher.fetch("not-a-url").await.is_empty());
    }
}
