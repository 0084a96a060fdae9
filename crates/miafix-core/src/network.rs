//! Fetching registry pages over HTTP.
//!
//! The reconciler only sees the [`PageFetcher`] trait, so tests and
//! offline runs can serve pages from memory.

use crate::config::NetworkConfig;
use crate::{MiaFixError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Source of raw page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the body as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `reqwest`-backed fetcher.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| MiaFixError::Network {
                message: "Failed to create HTTP client".to_string(),
                cause: Some(e.to_string()),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MiaFixError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Resolve a link as published on the landing page against the site base.
pub fn resolve_link(base: &str, link: &str) -> Result<String> {
    let base_url = Url::parse(base).map_err(|e| MiaFixError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;
    let resolved = base_url.join(link).map_err(|e| MiaFixError::InvalidUrl {
        url: link.to_string(),
        message: e.to_string(),
    })?;
    Ok(resolved.to_string())
}
