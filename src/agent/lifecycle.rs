//! Lifecycle handling: install pre-population and activate generation sweep.
//!
//! Install never propagates an error past the agent boundary: the
//! whole-response tier fails or succeeds as a set, the record tier settles
//! every manifest entry independently, and every failure path terminates in
//! a logged entry in the [`InstallReport`].

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::net::fetcher::AssetFetcher;
use crate::storage::capability::{Capabilities, Tier};
use crate::storage::generation::{GenerationCache, StoredResponse};
use crate::storage::records::{AssetRecord, RecordStore};

/// What install accomplished, per manifest entry.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub stored: Vec<String>,
    pub failed: Vec<String>,
}

/// What the activate sweep removed.
#[derive(Debug, Default)]
pub struct ActivateReport {
    pub swept: Vec<String>,
}

/// Handles install and activate events for the chosen tier.
///
/// This manager exclusively owns generation naming and sweeping; the record
/// table itself belongs to [`RecordStore`].
pub struct LifecycleManager {
    caps: Capabilities,
    config: Arc<Config>,
    generations: Option<Arc<GenerationCache>>,
    records: Option<Arc<RecordStore>>,
    fetcher: Arc<dyn AssetFetcher>,
}

impl LifecycleManager {
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

    /// Pre-populate the chosen tier with every manifest entry.
    pub async fn install(&self) -> InstallReport {
        let manifest = &self.config.agent.manifest;

        let report = match (self.caps.tier, &self.generations, &self.records) {
            (Tier::ResponseCache, Some(cache), _) => {
                // All-or-nothing: one bad entry fails the whole set, which is
                // swallowed here so install still completes.
                match self.prepopulate_generation(cache, manifest).await {
                    Ok(()) => InstallReport {
                        stored: manifest.clone(),
                        failed: Vec::new(),
                    },
                    Err(e) => {
                        error!(error = %e, "Failed to pre-populate response cache");
                        InstallReport {
                            stored: Vec::new(),
                            failed: manifest.clone(),
                        }
                    }
                }
            }
            (Tier::RecordStore, _, Some(store)) => {
                // Entries settle independently; one failed asset does not
                // abort the others.
                let results = join_all(
                    manifest
                        .iter()
                        .map(|path| self.install_record(store, path)),
                )
                .await;

                let mut report = InstallReport::default();
                for (path, result) in manifest.iter().zip(results) {
                    match result {
                        Ok(()) => report.stored.push(path.clone()),
                        Err(e) => {
                            warn!(url = %path, error = %e, "Failed to save asset record");
                            report.failed.push(path.clone());
                        }
                    }
                }
                report
            }
            _ => {
                error!("Install skipped: no storage capability");
                InstallReport::default()
            }
        };

        info!(
            stored = report.stored.len(),
            failed = report.failed.len(),
            tier = %self.caps.tier,
            "Install complete"
        );

        report
    }

    /// Fetch every manifest entry and store the set in the current generation.
    async fn prepopulate_generation(
        &self,
        cache: &GenerationCache,
        manifest: &[String],
    ) -> anyhow::Result<()> {
        let fetched = try_join_all(manifest.iter().map(|path| async move {
            let response = self.fetcher.fetch(path).await?;
            if !response.is_success() {
                anyhow::bail!("failed to fetch {path}: status {}", response.status);
            }
            Ok((path, response))
        }))
        .await?;

        for (path, response) in fetched {
            let stored = StoredResponse {
                status: response.status,
                content_type: response.content_type,
                body: response.body,
            };
            cache.put(path, &stored).await?;
        }

        Ok(())
    }

    /// Fetch one manifest entry and persist it as a record.
    async fn install_record(&self, store: &RecordStore, path: &str) -> anyhow::Result<()> {
        let response = self.fetcher.fetch(path).await?;
        if !response.is_success() {
            anyhow::bail!("failed to fetch {path}: status {}", response.status);
        }

        let content = String::from_utf8_lossy(&response.body).into_owned();
        store.put(&AssetRecord {
            url: path.to_string(),
            content,
        })?;

        Ok(())
    }

    /// Sweep stale generations. Only the whole-response tier has generations;
    /// the other tiers claim control with nothing to sweep.
    pub async fn activate(&self) -> ActivateReport {
        let swept = match (self.caps.tier, &self.generations) {
            (Tier::ResponseCache, Some(cache)) => match cache.sweep().await {
                Ok(removed) => removed,
                Err(e) => {
                    error!(error = %e, "Generation sweep failed");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        info!(swept = swept.len(), tier = %self.caps.tier, "Activation complete");

        ActivateReport { swept }
    }
}
