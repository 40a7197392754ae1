//! The fetch decision engine.
//!
//! For each intercepted request: consult the chosen storage tier, fall back
//! to the network (populating the tier on success), and degrade to the
//! offline page when both fail. The interceptor owns neither tier; it only
//! invokes their operations.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::agent::content_type::content_type_for;
use crate::config::Config;
use crate::net::fetcher::{AssetFetcher, FetchedResponse};
use crate::storage::capability::{Capabilities, Tier};
use crate::storage::generation::{GenerationCache, StoredResponse};
use crate::storage::records::{AssetRecord, RecordStore};

/// Body served when the offline page itself is not in storage.
const BUILTIN_OFFLINE_HTML: &str =
    "<!DOCTYPE html><html><body><h1>Offline</h1><p>This page is not available offline.</p></body></html>";

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
        }
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from the storage tier.
    Cache,
    /// Served from a network fetch.
    Network,
    /// The offline fallback page.
    Offline,
}

/// A response produced by the interceptor.
#[derive(Debug, Clone)]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub source: ResponseSource,
}

/// The interceptor's verdict for one request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The interceptor produced a response.
    Response(AssetResponse),
    /// The request is declined and passes through untouched.
    PassThrough,
}

impl FetchOutcome {
    pub fn into_response(self) -> Option<AssetResponse> {
        match self {
            FetchOutcome::Response(response) => Some(response),
            FetchOutcome::PassThrough => None,
        }
    }
}

/// Per-request tier dispatch and fallback logic.
pub struct FetchInterceptor {
    caps: Capabilities,
    config: Arc<Config>,
    generations: Option<Arc<GenerationCache>>,
    records: Option<Arc<RecordStore>>,
    fetcher: Arc<dyn AssetFetcher>,
}

impl FetchInterceptor {
    pub fn new(
        caps: Capabilities,
        config: Arc<Config>,
        generations: Option<Arc<GenerationCache>>,
        records: Option<Arc<RecordStore>>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            caps,
            config,
            generations,
            records,
            fetcher,
        }
    }

    /// Decide how to answer one request.
    pub async fn handle(&self, request: &Request) -> FetchOutcome {
        if !self.caps.standalone {
            return FetchOutcome::PassThrough;
        }

        match (self.caps.tier, &self.generations, &self.records) {
            (Tier::ResponseCache, Some(cache), _) => self.handle_response_cache(cache, request).await,
            (Tier::RecordStore, _, Some(store)) => self.handle_record_store(store, request).await,
            _ => {
                debug!(url = %request.url, "No storage tier; passing request through");
                FetchOutcome::PassThrough
            }
        }
    }

    /// Whole-response tier: cache-first, network with one retry, offline last.
    async fn handle_response_cache(
        &self,
        cache: &Arc<GenerationCache>,
        request: &Request,
    ) -> FetchOutcome {
        match cache.lookup(&request.url).await {
            Ok(Some(stored)) => FetchOutcome::Response(AssetResponse {
                status: stored.status,
                content_type: stored.content_type,
                body: stored.body,
                source: ResponseSource::Cache,
            }),
            Ok(None) => self.fetch_and_cache(cache, request).await,
            Err(e) => {
                error!(url = %request.url, error = %e, "Cache lookup failed");
                self.offline_fallback().await
            }
        }
    }

    async fn fetch_and_cache(&self, cache: &Arc<GenerationCache>, request: &Request) -> FetchOutcome {
        let response = match self.fetcher.fetch(&request.url).await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %request.url, error = %e, "Network fetch failed");
                return self.offline_fallback().await;
            }
        };

        if response.is_success() {
            info!(url = %request.url, "Caching new response");

            // Fire-and-forget: the response is returned without waiting for
            // the store write, and a write failure only logs.
            let cache = Arc::clone(cache);
            let url = request.url.clone();
            let stored = StoredResponse {
                status: response.status,
                content_type: response.content_type.clone(),
                body: response.body.clone(),
            };
            tokio::spawn(async move {
                if let Err(e) = cache.put(&url, &stored).await {
                    warn!(url = %url, error = %e, "Failed to cache response");
                }
            });

            return FetchOutcome::Response(network_response(response));
        }

        // Non-2xx: retry once, then give up to the offline page.
        match self.fetcher.fetch(&request.url).await {
            Ok(retry) if retry.is_success() => FetchOutcome::Response(network_response(retry)),
            Ok(retry) => {
                warn!(url = %request.url, status = retry.status, "Retry returned bad status");
                self.offline_fallback().await
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Retry fetch failed");
                self.offline_fallback().await
            }
        }
    }

    /// Record tier: synthesize responses from stored content, populating the
    /// store on miss.
    async fn handle_record_store(&self, store: &Arc<RecordStore>, request: &Request) -> FetchOutcome {
        match store.get(&request.url) {
            Ok(Some(record)) => FetchOutcome::Response(synthesized(
                &request.url,
                record.content,
                ResponseSource::Cache,
            )),
            Ok(None) => self.fetch_and_record(store, request).await,
            Err(e) => {
                error!(url = %request.url, error = %e, "Record store read failed");
                self.offline_fallback().await
            }
        }
    }

    async fn fetch_and_record(&self, store: &Arc<RecordStore>, request: &Request) -> FetchOutcome {
        let response = match self.fetcher.fetch(&request.url).await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %request.url, error = %e, "Network fetch failed, check connectivity");
                return self.offline_fallback().await;
            }
        };

        if !response.is_success() {
            warn!(url = %request.url, status = response.status, "Network returned bad status");
            return self.offline_fallback().await;
        }

        info!(url = %request.url, "Saving asset record");

        let content = String::from_utf8_lossy(&response.body).into_owned();

        // Fire-and-forget persistence; the synthesized response does not wait.
        let store = Arc::clone(store);
        let record = AssetRecord {
            url: request.url.clone(),
            content: content.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = store.put(&record) {
                warn!(url = %record.url, error = %e, "Failed to persist asset record");
            }
        });

        FetchOutcome::Response(synthesized(
            &request.url,
            content,
            ResponseSource::Network,
        ))
    }

    /// Terminal state for unrecoverable failures: the offline page, from the
    /// active tier if resident, otherwise a built-in minimal body.
    async fn offline_fallback(&self) -> FetchOutcome {
        let offline_path = &self.config.agent.offline_path;

        if let Some(cache) = &self.generations {
            if let Ok(Some(stored)) = cache.lookup(offline_path).await {
                return FetchOutcome::Response(AssetResponse {
                    status: stored.status,
                    content_type: stored.content_type,
                    body: stored.body,
                    source: ResponseSource::Offline,
                });
            }
        }

        if let Some(store) = &self.records {
            if let Ok(Some(record)) = store.get(offline_path) {
                return FetchOutcome::Response(AssetResponse {
                    status: 200,
                    content_type: Some(content_type_for(offline_path).to_string()),
                    body: Bytes::from(record.content),
                    source: ResponseSource::Offline,
                });
            }
        }

        warn!("Offline page not resident; serving built-in body");

        FetchOutcome::Response(AssetResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: Bytes::from_static(BUILTIN_OFFLINE_HTML.as_bytes()),
            source: ResponseSource::Offline,
        })
    }
}

fn network_response(response: FetchedResponse) -> AssetResponse {
    AssetResponse {
        status: response.status,
        content_type: response.content_type,
        body: response.body,
        source: ResponseSource::Network,
    }
}

fn synthesized(url: &str, content: String, source: ResponseSource) -> AssetResponse {
    AssetResponse {
        status: 200,
        content_type: Some(content_type_for(url).to_string()),
        body: Bytes::from(content),
        source,
    }
}
