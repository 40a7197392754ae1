//! Shared test doubles for the agent tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use offline_cache_agent::agent::push::{Notification, Notifier};
use offline_cache_agent::config::Config;
use offline_cache_agent::net::fetcher::{AssetFetcher, FetchError, FetchedResponse};

/// Config pinned to the whole-response cache tier.
pub fn tier_a_config(root: &std::path::Path, manifest: &[&str]) -> Config {
    let mut config = Config::default();
    config.storage.response_cache_root = Some(root.to_path_buf());
    config.storage.record_db_path = None;
    config.agent.manifest = manifest.iter().map(|s| s.to_string()).collect();
    config
}

/// Config pinned to the record-store tier.
pub fn tier_b_config(db_path: &std::path::Path, manifest: &[&str]) -> Config {
    let mut config = Config::default();
    config.storage.response_cache_root = None;
    config.storage.record_db_path = Some(db_path.to_path_buf());
    config.agent.manifest = manifest.iter().map(|s| s.to_string()).collect();
    config
}

/// Config with no usable storage tier.
pub fn tier_none_config() -> Config {
    let mut config = Config::default();
    config.storage.response_cache_root = None;
    config.storage.record_db_path = None;
    config.agent.manifest = Vec::new();
    config
}

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond with this status and body.
    Status(u16, &'static str),
    /// Fail at the transport level, as if connectivity were lost.
    Unreachable,
}

/// Scripted fetcher: each URL consumes its script front to back, repeating
/// the last entry. Unrouted URLs are unreachable.
#[derive(Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Vec<Scripted>>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a URL to a fixed 200 response.
    pub fn ok(self, url: &str, body: &'static str) -> Self {
        self.status(url, 200, body)
    }

    /// Route a URL to a fixed status/body response.
    pub fn status(self, url: &str, status: u16, body: &'static str) -> Self {
        self.route(url, vec![Scripted::Status(status, body)])
    }

    /// Route a URL to a sequence of results.
    pub fn route(self, url: &str, script: Vec<Scripted>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), script);
        self
    }

    /// Total number of fetches issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(script) => {
                    if script.len() > 1 {
                        script.remove(0)
                    } else {
                        script[0].clone()
                    }
                }
                None => Scripted::Unreachable,
            }
        };

        match step {
            Scripted::Status(status, body) => Ok(FetchedResponse {
                status,
                content_type: None,
                body: Bytes::from_static(body.as_bytes()),
            }),
            Scripted::Unreachable => Err(FetchError::Failed(format!("{url}: unreachable"))),
        }
    }
}

/// Notifier that records every notification it is asked to display.
#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) -> anyhow::Result<()> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
