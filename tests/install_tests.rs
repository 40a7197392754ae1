//! Install pre-population behavior across storage tiers.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use common::{tier_a_config, tier_b_config, tier_none_config, MockFetcher, RecordingNotifier};
use offline_cache_agent::agent::interceptor::{FetchOutcome, Request, ResponseSource};
use offline_cache_agent::agent::{Agent, AgentState};
use offline_cache_agent::storage::capability::Tier;

async fn build_agent(
    config: offline_cache_agent::config::Config,
    fetcher: MockFetcher,
) -> (Agent, Arc<MockFetcher>) {
    let fetcher = Arc::new(fetcher);
    let agent = Agent::new(
        Arc::new(config),
        fetcher.clone(),
        Arc::new(RecordingNotifier::default()),
    )
    .await
    .unwrap();
    (agent, fetcher)
}

#[tokio::test]
async fn record_store_install_settles_entries_independently() {
    let tmp = TempDir::new().unwrap();
    let config = tier_b_config(&tmp.path().join("assets.db"), &["/offline.html", "/a.js"]);
    let fetcher = MockFetcher::new()
        .ok("/offline.html", "OK")
        .status("/a.js", 404, "not found");

    let (agent, _) = build_agent(config, fetcher).await;
    assert_eq!(agent.tier(), Tier::RecordStore);

    let report = agent.on_install().await;

    // One failed asset does not abort the others, and install still completes.
    assert_eq!(report.stored, vec!["/offline.html".to_string()]);
    assert_eq!(report.failed, vec!["/a.js".to_string()]);
    assert_eq!(agent.state().await, AgentState::Installed);
}

#[tokio::test]
async fn record_store_install_makes_entries_retrievable() {
    let tmp = TempDir::new().unwrap();
    let config = tier_b_config(&tmp.path().join("assets.db"), &["/offline.html", "/js/index.js"]);
    let fetcher = MockFetcher::new()
        .ok("/offline.html", "<html>offline</html>")
        .ok("/js/index.js", "console.log(1)");

    let (agent, _) = build_agent(config, fetcher).await;
    let report = agent.on_install().await;
    assert_eq!(report.failed.len(), 0);

    // Every stored entry is served from storage under its exact URL.
    for (url, body) in [
        ("/offline.html", "<html>offline</html>"),
        ("/js/index.js", "console.log(1)"),
    ] {
        match agent.on_fetch(&Request::get(url)).await {
            FetchOutcome::Response(response) => {
                assert_eq!(response.source, ResponseSource::Cache, "{url}");
                assert_eq!(response.body, body.as_bytes());
            }
            FetchOutcome::PassThrough => panic!("expected a response for {url}"),
        }
    }
}

#[tokio::test]
async fn response_cache_install_is_all_or_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = tier_a_config(tmp.path(), &["/offline.html", "/a.js"]);
    let fetcher = MockFetcher::new()
        .ok("/offline.html", "OK")
        .status("/a.js", 404, "not found");

    let (agent, fetcher) = build_agent(config, fetcher).await;
    assert_eq!(agent.tier(), Tier::ResponseCache);

    let report = agent.on_install().await;

    // The set fails as a whole, but install does not abort the agent.
    assert!(report.stored.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert_eq!(agent.state().await, AgentState::Installed);

    // Nothing was stored: a fetch of the good entry goes to the network.
    let calls_before = fetcher.calls();
    match agent.on_fetch(&Request::get("/offline.html")).await {
        FetchOutcome::Response(response) => {
            assert_eq!(response.source, ResponseSource::Network);
        }
        FetchOutcome::PassThrough => panic!("expected a response"),
    }
    assert!(fetcher.calls() > calls_before);
}

#[tokio::test]
async fn response_cache_install_stores_whole_responses() {
    let tmp = TempDir::new().unwrap();
    let config = tier_a_config(tmp.path(), &["/offline.html", "/img/t.svg"]);
    let fetcher = MockFetcher::new()
        .ok("/offline.html", "<html>offline</html>")
        .ok("/img/t.svg", "<svg/>");

    let (agent, fetcher) = build_agent(config, fetcher).await;
    let report = agent.on_install().await;
    assert_eq!(report.stored.len(), 2);

    let calls_after_install = fetcher.calls();

    // Stored responses come back verbatim, with no further network traffic.
    match agent.on_fetch(&Request::get("/img/t.svg")).await {
        FetchOutcome::Response(response) => {
            assert_eq!(response.source, ResponseSource::Cache);
            assert_eq!(response.status, 200);
            assert_eq!(response.body, "<svg/>".as_bytes());
        }
        FetchOutcome::PassThrough => panic!("expected a response"),
    }
    assert_eq!(fetcher.calls(), calls_after_install);
}

#[tokio::test]
async fn no_capability_install_is_a_logged_noop() {
    let fetcher = MockFetcher::new().ok("/offline.html", "OK");
    let (agent, fetcher) = build_agent(tier_none_config(), fetcher).await;

    assert_eq!(agent.tier(), Tier::None);

    let report = agent.on_install().await;
    assert!(report.stored.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(fetcher.calls(), 0);
}
