// ABOUTME: Permission filtering — a caller only ever sees the servers/agents their scope grants
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use registry_gateway::models::Visibility;
use registry_gateway::services::ScopeResolver;
use std::collections::BTreeSet;

#[tokio::test]
async fn caller_without_access_gets_an_empty_list_not_an_error() {
    let harness = support::Harness::new().await;
    harness
        .servers
        .register(support::sample_server("/weather", "Weather", "Forecasts"), harness.repositories.scans.as_ref())
        .await
        .unwrap();

    let resolver = support::empty_resolver();
    let caller = support::plain_caller("mallory", &[]);
    let visible = harness.servers.list_for_caller(&caller, &resolver).await.unwrap();
    assert!(visible.is_empty());
}

#[tokio::test]
async fn caller_with_explicit_server_access_sees_only_that_server() {
    let harness = support::Harness::new().await;
    harness
        .servers
        .register(support::sample_server("/weather", "Weather", "Forecasts"), harness.repositories.scans.as_ref())
        .await
        .unwrap();
    harness
        .servers
        .register(support::sample_server("/traffic", "Traffic", "Live traffic"), harness.repositories.scans.as_ref())
        .await
        .unwrap();

    let resolver = support::empty_resolver();
    let mut caller = support::plain_caller("alice", &[]);
    caller.accessible_servers.insert("weather".to_string());

    let visible = harness.servers.list_for_caller(&caller, &resolver).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].path, "/weather");
}

#[tokio::test]
async fn admin_caller_sees_every_server() {
    let harness = support::Harness::new().await;
    harness
        .servers
        .register(support::sample_server("/weather", "Weather", "Forecasts"), harness.repositories.scans.as_ref())
        .await
        .unwrap();
    harness
        .servers
        .register(support::sample_server("/traffic", "Traffic", "Live traffic"), harness.repositories.scans.as_ref())
        .await
        .unwrap();

    let resolver = support::empty_resolver();
    let caller = support::admin_caller("root");
    let visible = harness.servers.list_for_caller(&caller, &resolver).await.unwrap();
    assert_eq!(visible.len(), 2);
}

#[tokio::test]
async fn group_restricted_agent_is_hidden_from_callers_outside_the_group() {
    let harness = support::Harness::new().await;
    let mut agent = support::sample_agent("/internal-bot", "Internal Bot", Visibility::GroupRestricted);
    agent.allowed_groups = BTreeSet::from(["platform-eng".to_string()]);
    harness.agents.register(agent, harness.repositories.scans.as_ref()).await.unwrap();

    let resolver = support::empty_resolver();
    let outsider = support::plain_caller("bob", &["marketing"]);
    assert!(harness.agents.list_for_caller(&outsider, &resolver).await.unwrap().is_empty());

    let insider = support::plain_caller("carol", &["platform-eng"]);
    let visible = harness.agents.list_for_caller(&insider, &resolver).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].path, "/internal-bot");
}

#[tokio::test]
async fn private_agent_is_visible_only_to_its_registrant() {
    let harness = support::Harness::new().await;
    let mut agent = support::sample_agent("/scratch-bot", "Scratch Bot", Visibility::Private);
    agent.registered_by = Some("alice".to_string());
    harness.agents.register(agent, harness.repositories.scans.as_ref()).await.unwrap();

    let resolver = support::empty_resolver();
    let owner = support::plain_caller("alice", &[]);
    assert_eq!(harness.agents.list_for_caller(&owner, &resolver).await.unwrap().len(), 1);

    let other = support::plain_caller("bob", &[]);
    assert!(harness.agents.list_for_caller(&other, &resolver).await.unwrap().is_empty());
}

#[tokio::test]
async fn group_mapped_scope_grants_admin_without_the_admin_flag() {
    let admin_scope = registry_gateway::models::Scope {
        name: "admin".to_string(),
        group_mappings: BTreeSet::from(["platform-admins".to_string()]),
        server_access: vec![],
        ui_permissions: Default::default(),
    };
    let resolver = ScopeResolver::new(vec![admin_scope]);
    let caller = support::plain_caller("dana", &["platform-admins"]);
    assert!(resolver.can_access_server(&caller, "/anything", "anything"));
}
