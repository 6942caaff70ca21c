// ABOUTME: Security scan admission — a critical/high verdict blocks registration when block_unsafe is set
// ABOUTME: the scanner here is `/bin/echo` printing canned, space-free JSON so no real scanner is needed
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use registry_gateway::repository::SecurityScanRepository as _;

#[tokio::test]
async fn unsafe_scan_blocks_registration_when_block_unsafe_is_set() {
    let settings = support::scanning_settings(r#"/bin/echo {"critical":1,"high":0}"#, true);
    let harness = support::Harness::with_scan_settings(settings, support::disabled_scan_settings()).await;

    let server = support::sample_server("/sketchy", "Sketchy Server", "Does something questionable");
    let err = harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap_err();
    assert_eq!(err.kind, registry_core::ErrorKind::ExternalProcessFailed);

    assert!(harness.servers.get("/sketchy").await.unwrap().is_none(), "a blocked registration must not persist");

    let scan = harness.repositories.scans.current("/sketchy").await.unwrap().unwrap();
    assert!(!scan.is_safe);
    assert_eq!(scan.severity.critical, 1);
}

#[tokio::test]
async fn unsafe_scan_is_recorded_but_not_blocking_when_block_unsafe_is_unset() {
    let settings = support::scanning_settings(r#"/bin/echo {"critical":0,"high":2}"#, false);
    let harness = support::Harness::with_scan_settings(settings, support::disabled_scan_settings()).await;

    let server = support::sample_server("/risky", "Risky Server", "Elevated findings, not blocking");
    let created = harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();
    assert_eq!(created.path, "/risky");

    let scan = harness.repositories.scans.current("/risky").await.unwrap().unwrap();
    assert!(!scan.is_safe);
    assert_eq!(scan.severity.high, 2);
}

#[tokio::test]
async fn clean_scan_allows_registration_through() {
    let settings = support::scanning_settings(r#"/bin/echo {"critical":0,"high":0}"#, true);
    let harness = support::Harness::with_scan_settings(settings, support::disabled_scan_settings()).await;

    let server = support::sample_server("/clean", "Clean Server", "Nothing interesting here");
    let created = harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();
    assert_eq!(created.path, "/clean");

    let scan = harness.repositories.scans.current("/clean").await.unwrap().unwrap();
    assert!(scan.is_safe);
}

#[tokio::test]
async fn scan_applies_independently_to_agents() {
    let settings = support::scanning_settings(r#"/bin/echo {"critical":3,"high":0}"#, true);
    let harness = support::Harness::with_scan_settings(support::disabled_scan_settings(), settings).await;

    let agent = support::sample_agent("/sketchy-bot", "Sketchy Bot", registry_gateway::models::Visibility::Public);
    let err = harness.agents.register(agent, harness.repositories.scans.as_ref()).await.unwrap_err();
    assert_eq!(err.kind, registry_core::ErrorKind::ExternalProcessFailed);
}
