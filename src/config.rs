//! Runtime configuration for offline-cache-agent.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! All agent knobs (manifest, generation name, tier paths, network limits) live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "offline-cache-agent", about = "Tiered offline asset cache agent")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Asset paths to resolve through the agent after warm-up.
    pub paths: Vec<String>,

    /// Push payload (JSON) to relay as a notification.
    #[arg(long)]
    pub push: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agent behavior.
    pub agent: AgentConfig,

    /// Network fetch settings.
    pub network: NetworkConfig,

    /// Storage tier paths.
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Agent behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name of the current cache generation.
    pub cache_generation: String,

    /// Path of the offline fallback page. Must appear in the manifest.
    pub offline_path: String,

    /// Whether the agent runs in the standalone presentation context.
    /// Interception is disabled entirely when false.
    pub standalone: bool,

    /// Ordered list of asset paths that must be resident after install.
    pub manifest: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_generation: "pwa-cache-v1".to_string(),
            offline_path: "/offline.html".to_string(),
            standalone: true,
            manifest: vec![
                "/offline.html".to_string(),
                "/icon-192.png".to_string(),
                "/favicon.ico".to_string(),
                "/img/t.svg".to_string(),
                "/js/index.js".to_string(),
                "/js/purify.min.js".to_string(),
            ],
        }
    }
}

/// Network fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Origin that relative asset paths are resolved against.
    pub origin: String,

    /// Bounded wait before a fetch is treated as failed, in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with asset fetches.
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            timeout_secs: 10,
            user_agent: format!("offline-cache-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Storage tier paths. A tier is available only when its path is set and usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the whole-response cache generations (Tier A).
    pub response_cache_root: Option<PathBuf>,

    /// SQLite database path for the key-value record store (Tier B).
    /// `:memory:` is accepted for ephemeral stores.
    pub record_db_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            response_cache_root: Some(PathBuf::from("/tmp/offline-cache/responses")),
            record_db_path: Some(PathBuf::from("/tmp/offline-cache/assets.db")),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when absent.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.agent.cache_generation, "pwa-cache-v1");
        assert_eq!(cfg.agent.offline_path, "/offline.html");
        assert!(cfg.agent.manifest.contains(&cfg.agent.offline_path));
        assert_eq!(cfg.network.timeout_secs, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = Config::load(std::path::Path::new("/nonexistent/config.json")).unwrap();
        assert_eq!(cfg.agent.manifest.len(), 6);
    }

    #[test]
    fn test_roundtrip_json() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.agent.manifest, cfg.agent.manifest);
        assert_eq!(back.network.origin, cfg.network.origin);
    }
}
