//! offline-cache-agent binary: warm the cache and resolve asset requests.
//!
//! Loads configuration, detects the storage tier, runs the install and
//! activate lifecycle, then routes any requested paths through the fetch
//! interceptor and prints how each was answered.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use offline_cache_agent::agent::interceptor::{FetchOutcome, Request};
use offline_cache_agent::agent::push::LogNotifier;
use offline_cache_agent::agent::Agent;
use offline_cache_agent::config::{Cli, Config};
use offline_cache_agent::net::fetcher::HttpFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "offline_cache_agent=debug"
    } else {
        "offline_cache_agent=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("offline-cache-agent v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;
    let config = Arc::new(config);

    info!(
        origin = %config.network.origin,
        generation = %config.agent.cache_generation,
        manifest_entries = config.agent.manifest.len(),
        "Configuration loaded"
    );

    // Construct the agent; capability detection happens exactly once here.
    let fetcher = Arc::new(HttpFetcher::new(&config.network)?);
    let notifier = Arc::new(LogNotifier);
    let agent = Agent::new(config.clone(), fetcher, notifier).await?;

    info!(tier = %agent.tier(), "Agent constructed");

    // Lifecycle: install (pre-populate) then activate (sweep + claim).
    let install = agent.on_install().await;
    info!(
        stored = install.stored.len(),
        failed = install.failed.len(),
        "Install report"
    );

    let activate = agent.on_activate().await;
    if !activate.swept.is_empty() {
        info!(swept = ?activate.swept, "Stale generations removed");
    }

    // Relay a push payload if one was given.
    if let Some(payload) = &cli.push {
        let notification = agent.on_push(Some(payload.as_bytes())).await?;
        println!("push  -> {} / {}", notification.title, notification.body);
    }

    // Resolve requested paths through the interceptor.
    for path in &cli.paths {
        let request = Request::get(path.clone());
        match agent.on_fetch(&request).await {
            FetchOutcome::Response(response) => {
                println!(
                    "{path}  -> {} [{:?}] {} ({} bytes)",
                    response.status,
                    response.source,
                    response.content_type.as_deref().unwrap_or("-"),
                    response.body.len()
                );
            }
            FetchOutcome::PassThrough => {
                println!("{path}  -> pass-through");
            }
        }
    }

    Ok(())
}
