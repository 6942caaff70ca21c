// ABOUTME: Hybrid search — the file backend has no native vector search, so every query takes the client-side
// ABOUTME: cosine-similarity fallback; lexical text-boost should still separate a strong match from a weak one
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use registry_gateway::models::SearchQuery;
use registry_gateway::repository::SearchRepository as _;
use registry_gateway::search::SearchEngine;

#[tokio::test]
async fn file_backend_never_claims_native_vector_search() {
    let harness = support::Harness::new().await;
    assert!(!harness.repositories.search.supports_native_vector_search());
}

#[tokio::test]
async fn path_and_name_matches_rank_above_unrelated_entries() {
    let harness = support::Harness::new().await;
    harness
        .servers
        .register(
            support::sample_server("/weather-station", "Weather Station", "Current conditions and forecasts"),
            harness.repositories.scans.as_ref(),
        )
        .await
        .unwrap();
    harness
        .servers
        .register(
            support::sample_server("/invoice-ledger", "Invoice Ledger", "Accounts receivable tracking"),
            harness.repositories.scans.as_ref(),
        )
        .await
        .unwrap();
    harness.servers.set_enabled("/weather-station", true).await.unwrap();
    harness.servers.set_enabled("/invoice-ledger", true).await.unwrap();

    let engine = SearchEngine::new(harness.repositories.search.clone(), harness.embeddings.clone());
    let results = engine
        .query(&SearchQuery {
            query: "weather forecast".to_string(),
            entity_types: None,
            max_results: Some(5),
        })
        .await
        .unwrap();

    assert!(!results.servers.is_empty());
    assert_eq!(results.servers[0].path, "/weather-station");
}

#[tokio::test]
async fn entity_type_filter_excludes_the_other_kind() {
    let harness = support::Harness::new().await;
    harness
        .servers
        .register(support::sample_server("/weather", "Weather", "Forecasts"), harness.repositories.scans.as_ref())
        .await
        .unwrap();
    harness.servers.set_enabled("/weather", true).await.unwrap();
    let mut agent = support::sample_agent("/weather-bot", "Weather Bot", registry_gateway::models::Visibility::Public);
    agent.description = "Forecasts via chat".to_string();
    harness.agents.register(agent, harness.repositories.scans.as_ref()).await.unwrap();
    harness.agents.set_enabled("/weather-bot", true).await.unwrap();

    let engine = SearchEngine::new(harness.repositories.search.clone(), harness.embeddings.clone());
    let results = engine
        .query(&SearchQuery {
            query: "forecasts".to_string(),
            entity_types: Some(vec![registry_gateway::models::EntityType::A2aAgent]),
            max_results: Some(5),
        })
        .await
        .unwrap();

    assert!(results.servers.is_empty());
    assert!(results.agents.iter().any(|r| r.path == "/weather-bot"));
}
