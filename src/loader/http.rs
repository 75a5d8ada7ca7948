//! HTTP page fetcher built on reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::PageFetcher;
use crate::{MuninnError, Result};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`PageFetcher`] implementation over a shared reqwest client.
#[derive(Clone)]
pub struct HttpPageFetcher {
    http: Client,
}

impl HttpPageFetcher {
    /// Fetcher with the default 30-second request timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MuninnError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))
    }
}
