use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::{error::FetchError, strategy::Fetcher};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Default fetcher: a GET request whose body is the content.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    timeout: Duration,
    base_url: Option<Url>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
            base_url: None,
        }
    }

    /// Relative URLs are joined onto `base_url`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    fn resolve(&self, raw: &str) -> Result<Url, FetchError> {
        let parsed = match &self.base_url {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        };
        parsed.map_err(|e| FetchError::InvalidUrl {
            url: raw.to_string(),
            message: e.to_string(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = self.resolve(url)?;
        debug!(url = %url, timeout = ?self.timeout, "loader: http get");

        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
