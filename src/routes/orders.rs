use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    domain::tracking::{TrackingView, tracking_view},
    dto::orders::{
        EmailOrderRequest, EmailOrderResponse, LastOrderResponse, OrderFormDefaults,
        SubmitOrderRequest, SubmitOrderResponse,
    },
    error::AppResult,
    middleware::session::CustomerSession,
    models::{Order, normalize_language},
    response::ApiResponse,
    routes::params::{LanguageQuery, TableQuery},
    services::{
        email_order_service, order_service,
        tracking_service::{self, TrackingError},
    },
    state::AppState,
};

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_order))
        .route("/form", get(order_form))
        .route("/email", post(email_order))
        .route("/{id}/tracking", get(get_tracking))
        .route("/{id}/events", get(order_events))
}

pub fn session_route() -> Router<AppState> {
    Router::new().route("/last-order", get(last_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    params(("x-session-id" = Uuid, Header, description = "Customer session id")),
    request_body = SubmitOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<SubmitOrderResponse>),
        (status = 400, description = "Missing name or table, or empty cart"),
        (status = 503, description = "Store unavailable, cart kept, retry")
    ),
    tag = "Orders"
)]
pub async fn submit_order(
    State(state): State<AppState>,
    session: CustomerSession,
    Json(payload): Json<SubmitOrderRequest>,
) -> AppResult<Json<ApiResponse<SubmitOrderResponse>>> {
    let resp = order_service::submit_order(&state, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/form",
    params(TableQuery),
    responses(
        (status = 200, description = "Checkout form defaults", body = ApiResponse<OrderFormDefaults>)
    ),
    tag = "Orders"
)]
pub async fn order_form(Query(query): Query<TableQuery>) -> Json<ApiResponse<OrderFormDefaults>> {
    Json(order_service::form_defaults(query.table.as_deref()))
}

#[utoipa::path(
    post,
    path = "/api/orders/email",
    params(("x-session-id" = Uuid, Header, description = "Customer session id")),
    request_body = EmailOrderRequest,
    responses(
        (status = 200, description = "Order emailed, cart cleared", body = ApiResponse<EmailOrderResponse>),
        (status = 400, description = "Missing name or phone, or empty cart"),
        (status = 502, description = "Email failed, cart kept")
    ),
    tag = "Orders"
)]
pub async fn email_order(
    State(state): State<AppState>,
    session: CustomerSession,
    Json(payload): Json<EmailOrderRequest>,
) -> AppResult<Json<ApiResponse<EmailOrderResponse>>> {
    let resp = email_order_service::send_email_order(&state, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/tracking",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "Current tracking view", body = ApiResponse<TrackingView>),
        (status = 404, description = "Order not found"),
        (status = 503, description = "Network error")
    ),
    tag = "Orders"
)]
pub async fn get_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<TrackingView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = tracking_service::get_tracking(&state, id, &language).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/events",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "`snapshot` events with a tracking view, then a final `error` event if the order goes away", body = String, content_type = "text/event-stream"),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders"
)]
pub async fn order_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let language = normalize_language(query.lang.as_deref());
    let subscription = tracking_service::subscribe(&state, id).await?;
    let events = subscription
        .into_stream()
        .map(move |item| Ok(tracking_event(item, &language)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn tracking_event(item: Result<Order, TrackingError>, language: &str) -> Event {
    match item {
        Ok(order) => Event::default()
            .event("snapshot")
            .json_data(tracking_view(&order, language)),
        Err(err) => Event::default().event("error").json_data(serde_json::json!({
            "error": err.to_string(),
            "code": err.code(),
            "retryable": true,
        })),
    }
    .unwrap_or_else(|err| Event::default().event("error").data(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/session/last-order",
    params(("x-session-id" = Uuid, Header, description = "Customer session id")),
    responses(
        (status = 200, description = "Last order placed from this session", body = ApiResponse<LastOrderResponse>)
    ),
    tag = "Orders"
)]
pub async fn last_order(
    State(state): State<AppState>,
    session: CustomerSession,
) -> AppResult<Json<ApiResponse<LastOrderResponse>>> {
    let resp = order_service::last_order(&state, session).await?;
    Ok(Json(resp))
}
