//! Capability detection: which storage tier the agent will use.
//!
//! Detection runs exactly once at agent construction and its result is
//! immutable for the agent's lifetime. The whole-response cache is preferred;
//! the record store is the fallback; with neither, interception is disabled
//! and every request passes through.

use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::config::Config;

/// The storage strategy chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Whole-response cache generations on the filesystem.
    ResponseCache,
    /// Transactional url→content record store.
    RecordStore,
    /// No usable storage: all requests pass through untouched.
    None,
}

impl Tier {
    /// Whether this tier supports intercepting requests at all.
    pub fn intercepts(&self) -> bool {
        !matches!(self, Tier::None)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::ResponseCache => write!(f, "response-cache"),
            Tier::RecordStore => write!(f, "record-store"),
            Tier::None => write!(f, "none"),
        }
    }
}

/// Immutable capability snapshot, computed once from the environment.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// The storage tier used for install, activate, and fetch handling.
    pub tier: Tier,

    /// Whether the agent runs in the standalone presentation context.
    /// When false, fetch interception declines every request.
    pub standalone: bool,
}

impl Capabilities {
    /// Probe the configured tiers and fix the agent's storage strategy.
    pub fn detect(config: &Config) -> Self {
        let tier = Self::probe_tier(config);

        match tier {
            Tier::None => {
                error!("No usable storage tier; interception disabled");
            }
            _ => {
                info!(tier = %tier, standalone = config.agent.standalone, "Storage tier selected");
            }
        }

        Self {
            tier,
            standalone: config.agent.standalone,
        }
    }

    fn probe_tier(config: &Config) -> Tier {
        if let Some(root) = &config.storage.response_cache_root {
            match std::fs::create_dir_all(root) {
                Ok(()) => return Tier::ResponseCache,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Response cache root unusable");
                }
            }
        }

        if let Some(path) = &config.storage.record_db_path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(path = %path.display(), error = %e, "Record store directory unusable");
                    return Tier::None;
                }
            }
            // Probe with a throwaway connection; the store proper opens later.
            match Connection::open(path) {
                Ok(_) => return Tier::RecordStore,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Record store unusable");
                }
            }
        }

        Tier::None
    }
}
