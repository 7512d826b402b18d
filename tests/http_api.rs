use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use digital_menu_api::{
    app::build_app,
    catalog::ESPRESSO_ID,
    config::AppConfig,
    services::auth_service,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn app() -> (Router, AppState) {
    let state = AppState::in_memory(AppConfig::local(SECRET));
    (build_app(state.clone()), state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
}

#[tokio::test]
async fn menu_is_public_and_localized() {
    let (app, _) = app();
    let request = Request::get("/api/menu?lang=fi").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fallback"], json!(true));
    assert_eq!(body["data"]["language"], json!("fi"));
    assert_eq!(body["data"]["sections"][0]["name"], json!("Kahvi"));
}

#[tokio::test]
async fn cart_requires_a_session_header() {
    let (app, _) = app();
    let payload = json!({ "item_id": ESPRESSO_ID });
    let request = json_request("POST", "/api/cart/items")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["retryable"], json!(false));

    let request = json_request("POST", "/api/cart/items")
        .header("x-session-id", Uuid::new_v4().to_string())
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_price"], json!(350));
    assert_eq!(body["data"]["total_price_display"], json!("€3.50"));
}

#[tokio::test]
async fn orders_can_be_placed_and_tracked() {
    let (app, _) = app();
    let session = Uuid::new_v4().to_string();

    let payload = json!({ "item_id": ESPRESSO_ID });
    let request = json_request("POST", "/api/cart/items")
        .header("x-session-id", &session)
        .body(Body::from(payload.to_string()))
        .unwrap();
    send(app.clone(), request).await;

    let payload = json!({ "customer_name": "Aino", "table_number": 5 });
    let request = json_request("POST", "/api/orders")
        .header("x-session-id", &session)
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["status"], json!("received"));
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();

    let request = Request::get(format!("/api/orders/{order_id}/tracking"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["steps"][0]["current"], json!(true));
    assert_eq!(body["data"]["table_number"], json!(5));
}

#[tokio::test]
async fn kitchen_requires_a_staff_token() {
    let (app, state) = app();
    let request = Request::get("/api/kitchen/orders").body(Body::empty()).unwrap();
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = auth_service::ensure_staff_account(
        state.store.as_ref(),
        "kitchen@example.com",
        "kitchen123",
        "staff",
    )
    .await
    .unwrap();
    let token = auth_service::issue_token(&user, SECRET).unwrap();
    let request = Request::get("/api/kitchen/orders?status=all&page=1&per_page=10")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["counts"]["all"], json!(0));
    assert_eq!(body["meta"]["per_page"], json!(10));
}

#[tokio::test]
async fn unknown_paths_get_the_json_envelope() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], json!("Not Found"));
    assert_eq!(body["data"]["path"], json!("/nope"));
}
