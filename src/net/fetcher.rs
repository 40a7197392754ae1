//! Asset fetching over HTTP.
//!
//! The agent talks to the network through the [`AssetFetcher`] trait so the
//! decision engine can be driven by a scripted fetcher in tests. The real
//! implementation resolves relative asset paths against the configured origin
//! and enforces a bounded timeout on every fetch.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::NetworkConfig;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure reported by a non-HTTP [`AssetFetcher`] implementation.
    #[error("fetch failed: {0}")]
    Failed(String),
}

/// A response as seen by the decision engine: status, declared type, body.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedResponse {
    /// Whether the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves an asset by URL or path.
///
/// A returned `Err` models a transport-level failure (no connectivity,
/// timeout); a non-2xx status arrives as a normal `FetchedResponse`.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(&config.user_agent)
            .build()?;

        let origin = Url::parse(&config.origin)?;

        Ok(Self { client, origin })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        // Manifest entries are origin-relative paths; full URLs pass through join.
        let target = self.origin.join(url)?;

        let response = self.client.get(target.clone()).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        debug!(url = %target, status, size = body.len(), "Fetched asset");

        Ok(FetchedResponse {
            status,
            content_type,
            body,
        })
    }
}
