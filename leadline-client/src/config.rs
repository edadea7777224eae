//! Client configuration

use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::leads::DEFAULT_PAGE_SIZE;

/// Client configuration for connecting to the lead backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:5000/api")
    pub base_url: String,

    /// REST request timeout
    pub timeout: Duration,

    /// Push WebSocket URL (e.g., "wss://leads.example.com/ws"); comment sync
    /// is unavailable without it
    pub push_url: Option<String>,

    /// Default page size for lead listings
    pub page_size: usize,

    /// Bearer token to seed the session with
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            push_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            token: None,
        }
    }

    /// Read configuration from `LEADLINE_*` environment variables
    ///
    /// `LEADLINE_API_URL` is required; everything else falls back to defaults.
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("LEADLINE_API_URL")
            .map_err(|_| ClientError::Config("LEADLINE_API_URL is not set".into()))?;
        let mut config = Self::new(base_url);

        if let Ok(url) = std::env::var("LEADLINE_PUSH_URL") {
            config.push_url = Some(url);
        }
        if let Ok(secs) = std::env::var("LEADLINE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid LEADLINE_TIMEOUT_SECS: {secs}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(size) = std::env::var("LEADLINE_PAGE_SIZE") {
            let size: usize = size
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid LEADLINE_PAGE_SIZE: {size}")))?;
            config = config.with_page_size(size);
        }
        if let Ok(token) = std::env::var("LEADLINE_TOKEN") {
            config.token = Some(token);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the push WebSocket URL
    pub fn with_push_url(mut self, url: impl Into<String>) -> Self {
        self.push_url = Some(url.into());
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base url must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be positive".into()));
        }
        if self.page_size == 0 {
            return Err(ClientError::Config("page size must be positive".into()));
        }
        if let Some(url) = &self.push_url {
            let scheme_ok = ["ws://", "wss://", "http://", "https://"]
                .iter()
                .any(|s| url.starts_with(s));
            if !scheme_ok {
                return Err(ClientError::Config(format!(
                    "push url must be ws(s) or http(s): {url}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api")
    }
}
