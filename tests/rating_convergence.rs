// ABOUTME: Rating convergence — repeated ratings settle on the arithmetic mean and stay within [1, 5]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

#[tokio::test]
async fn num_stars_is_zero_before_any_rating() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts");
    let created = harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();
    assert_eq!(created.num_stars(), 0.0);
}

#[tokio::test]
async fn rating_converges_on_the_mean_across_distinct_raters() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts");
    harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();

    harness.servers.rate("/weather", "alice", 5).await.unwrap();
    harness.servers.rate("/weather", "bob", 3).await.unwrap();
    let rated = harness.servers.rate("/weather", "carol", 4).await.unwrap();

    assert_eq!(rated.rating_details.len(), 3);
    assert!((rated.num_stars() - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn re_rating_by_the_same_user_replaces_their_previous_vote() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts");
    harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();

    harness.servers.rate("/weather", "alice", 2).await.unwrap();
    let rated = harness.servers.rate("/weather", "alice", 5).await.unwrap();

    assert_eq!(rated.rating_details.len(), 1, "a second vote from the same user must replace, not append");
    assert!((rated.num_stars() - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn rating_outside_one_to_five_is_rejected() {
    let harness = support::Harness::new().await;
    let server = support::sample_server("/weather", "Weather Server", "Forecasts");
    harness.servers.register(server, harness.repositories.scans.as_ref()).await.unwrap();

    let err = harness.servers.rate("/weather", "alice", 0).await.unwrap_err();
    assert_eq!(err.kind, registry_core::ErrorKind::Validation);
    let err = harness.servers.rate("/weather", "alice", 6).await.unwrap_err();
    assert_eq!(err.kind, registry_core::ErrorKind::Validation);
}
