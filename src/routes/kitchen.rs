use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post},
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    dto::kitchen::{KitchenOrderList, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::kitchen_service::{self, FeedMessage},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/advance", post(advance_order))
        .route("/events", get(order_feed))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "all, received, preparing or ready"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc (default)")
    ),
    responses(
        (status = 200, description = "Orders with per-status counts", body = ApiResponse<KitchenOrderList>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<KitchenOrderList>>> {
    let resp = kitchen_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "One order", body = ApiResponse<Order>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = kitchen_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Stored order after the move", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or illegal move"),
        (status = 404, description = "Not Found"),
        (status = 503, description = "Store unavailable, status unchanged")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = kitchen_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/orders/{id}/advance",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order moved one step forward", body = ApiResponse<Order>),
        (status = 400, description = "Order is already ready"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn advance_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = kitchen_service::advance_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/kitchen/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = kitchen_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/events",
    responses(
        (status = 200, description = "`order` events for every change, `resync` after falling behind", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn order_feed(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    ensure_staff(&user)?;
    let events = kitchen_service::order_feed(&state).map(|message| Ok(feed_event(message)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn feed_event(message: FeedMessage) -> Event {
    match message {
        FeedMessage::Event(event) => Event::default()
            .event("order")
            .json_data(&event)
            .unwrap_or_else(|err| Event::default().event("error").data(err.to_string())),
        FeedMessage::Resync { skipped } => Event::default()
            .event("resync")
            .data(skipped.to_string()),
    }
}
