//! The caching agent: lifecycle, fetch interception, and push relay.
//!
//! - [`lifecycle`]: install pre-population and activate generation sweep
//! - [`interceptor`]: the per-request tier/fallback decision engine
//! - [`content_type`]: extension → MIME resolution for synthesized responses
//! - [`push`]: push payload shaping and notification dispatch

pub mod content_type;
pub mod interceptor;
pub mod lifecycle;
pub mod push;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::net::fetcher::AssetFetcher;
use crate::storage::capability::{Capabilities, Tier};
use crate::storage::generation::GenerationCache;
use crate::storage::records::RecordStore;
use crate::storage::StorageError;
use interceptor::{FetchInterceptor, FetchOutcome, Request};
use lifecycle::{ActivateReport, InstallReport, LifecycleManager};
use push::{shape_notification, Notification, Notifier};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lifecycle position of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Constructed, not yet installed.
    Idle,
    /// Install settled; ready to take control without waiting.
    Installed,
    /// Activated and in control of requests.
    Active,
}

/// The asset-caching agent.
///
/// Capability detection happens once, in [`Agent::new`]; the chosen tier is
/// fixed for the agent's lifetime and shared by every handler. Each event
/// hook is an explicit method so the agent is testable without a live event
/// dispatch environment.
pub struct Agent {
    caps: Capabilities,
    lifecycle: LifecycleManager,
    interceptor: FetchInterceptor,
    notifier: Arc<dyn Notifier>,
    state: RwLock<AgentState>,
}

impl Agent {
    /// Detect capabilities, open the chosen tier, and wire up the handlers.
    pub async fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn AssetFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AgentError> {
        let caps = Capabilities::detect(&config);

        let mut generations = None;
        let mut records = None;
        match caps.tier {
            Tier::ResponseCache => {
                // Detection verified the root; an open failure here is fatal.
                if let Some(root) = &config.storage.response_cache_root {
                    let cache =
                        GenerationCache::open(root, &config.agent.cache_generation).await?;
                    generations = Some(Arc::new(cache));
                }
            }
            Tier::RecordStore => {
                let store = match &config.storage.record_db_path {
                    Some(path) => RecordStore::open(path)?,
                    None => RecordStore::in_memory()?,
                };
                records = Some(Arc::new(store));
            }
            Tier::None => {}
        }

        let lifecycle = LifecycleManager::new(
            caps.clone(),
            config.clone(),
            generations.clone(),
            records.clone(),
            fetcher.clone(),
        );
        let interceptor =
            FetchInterceptor::new(caps.clone(), config, generations, records, fetcher);

        Ok(Self {
            caps,
            lifecycle,
            interceptor,
            notifier,
            state: RwLock::new(AgentState::Idle),
        })
    }

    /// Install event: pre-populate the tier, then signal readiness to take
    /// control immediately. Never returns an error.
    pub async fn on_install(&self) -> InstallReport {
        let report = self.lifecycle.install().await;

        *self.state.write().await = AgentState::Installed;
        info!("Skip waiting: ready to take control");

        report
    }

    /// Activate event: sweep stale generations, then claim open pages.
    pub async fn on_activate(&self) -> ActivateReport {
        let report = self.lifecycle.activate().await;

        *self.state.write().await = AgentState::Active;
        info!("Clients claimed");

        report
    }

    /// Fetch event: produce a response or decline (pass-through).
    pub async fn on_fetch(&self, request: &Request) -> FetchOutcome {
        self.interceptor.handle(request).await
    }

    /// Push event: shape the payload and display a notification.
    pub async fn on_push(&self, payload: Option<&[u8]>) -> anyhow::Result<Notification> {
        let notification = shape_notification(payload);
        self.notifier.show(&notification).await?;
        Ok(notification)
    }

    /// The storage tier fixed at construction.
    pub fn tier(&self) -> Tier {
        self.caps.tier
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> AgentState {
        *self.state.read().await
    }
}
