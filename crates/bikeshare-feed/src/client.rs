//! HTTP client for the upstream station feed.

use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for [`FeedClient`].
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    pub url: String,
    /// Upper bound for the whole request, body included.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl FeedClientConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 30,
            user_agent: "bikeshare/0.1 (station-availability)".to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn from_app_config(config: &bikeshare_core::AppConfig) -> Self {
        Self {
            url: config.feed_url.clone(),
            timeout_secs: config.feed_timeout_secs,
            user_agent: config.feed_user_agent.clone(),
        }
    }
}

/// Fetches the raw station feed.
///
/// The client never retries on its own: the refresh schedule is the retry
/// interval, so a failed fetch is reported immediately.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            client,
            url: config.url,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw payload bytes.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure, TLS failure or timeout.
    /// - [`FeedError::UnexpectedStatus`] on any non-2xx response.
    pub async fn fetch(&self) -> Result<Vec<u8>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(url = %self.url, bytes = body.len(), "feed: fetched payload");
        Ok(body.to_vec())
    }
}
