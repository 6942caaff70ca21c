// ABOUTME: End-to-end scenario — register a server, enable it, then find it through hybrid search
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use registry_gateway::models::SearchQuery;
use registry_gateway::search::SearchEngine;

#[tokio::test]
async fn registered_server_is_disabled_until_explicitly_enabled() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts and current conditions");

    let created = harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();
    assert!(!created.is_enabled, "newly registered servers must start disabled");

    let fetched = harness.servers.get("/weather").await.unwrap().unwrap();
    assert!(!fetched.is_enabled);
}

#[tokio::test]
async fn enabled_server_is_discoverable_by_hybrid_search() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts and current conditions");
    harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();
    harness.servers.set_enabled("/weather", true).await.unwrap();

    let engine = SearchEngine::new(harness.repositories.search.clone(), harness.embeddings.clone());
    let results = engine
        .query(&SearchQuery {
            query: "weather forecast".to_string(),
            entity_types: None,
            max_results: Some(5),
        })
        .await
        .unwrap();

    assert!(results.servers.iter().any(|r| r.path == "/weather"));
}

#[tokio::test]
async fn duplicate_path_registration_is_rejected() {
    let harness = support::Harness::new().await;
    let first = support::sample_server("/weather", "Weather Server", "Forecasts");
    let second = support::sample_server("/weather", "Another Weather Server", "Forecasts too");

    harness.servers.register(first, harness.repositories.scans.as_ref()).await.unwrap();
    let err = harness.servers.register(second, harness.repositories.scans.as_ref()).await.unwrap_err();
    assert_eq!(err.kind, registry_core::ErrorKind::AlreadyExists);
}
