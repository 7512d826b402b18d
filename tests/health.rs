use axum::extract::State;
use digital_menu_api::{
    config::AppConfig,
    routes::health::health_check,
    services::tracking_service,
    state::AppState,
};

#[tokio::test]
async fn health_check_returns_ok() {
    let state = AppState::in_memory(AppConfig::local("test-secret"));
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.live_subscribers, 0);
}

#[tokio::test]
async fn health_counts_open_subscriptions() {
    let state = AppState::in_memory(AppConfig::local("test-secret"));
    let _feed = state.feed.subscribe();
    // Unknown orders never register a subscription.
    assert!(tracking_service::subscribe(&state, uuid::Uuid::new_v4()).await.is_err());

    let response = health_check(State(state)).await;
    assert_eq!(response.0.data.expect("health data").live_subscribers, 1);
}
