use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView},
    error::AppResult,
    middleware::session::CustomerSession,
    models::normalize_language,
    response::ApiResponse,
    routes::params::LanguageQuery,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_to_cart))
        .route("/items/{item_id}", delete(remove_item))
        .route("/lines/{line_id}", delete(remove_line))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-session-id" = Uuid, Header, description = "Customer session id"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "Current cart with totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    session: CustomerSession,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = cart_service::get_cart(&state, session, &language).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    params(
        ("x-session-id" = Uuid, Header, description = "Customer session id"),
        LanguageQuery
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid customization or unavailable item"),
        (status = 404, description = "Unknown item")
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: CustomerSession,
    Query(query): Query<LanguageQuery>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = cart_service::add_to_cart(&state, session, payload, &language).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Menu item id, valid while one line holds it"),
        ("x-session-id" = Uuid, Header, description = "Customer session id"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "One portion removed", body = ApiResponse<CartView>),
        (status = 400, description = "Several lines hold the item"),
        (status = 404, description = "Item not in cart")
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    session: CustomerSession,
    Path(item_id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = cart_service::remove_item(&state, session, item_id, &language).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/lines/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line id"),
        ("x-session-id" = Uuid, Header, description = "Customer session id"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "One portion removed", body = ApiResponse<CartView>),
        (status = 404, description = "Line not in cart")
    ),
    tag = "Cart"
)]
pub async fn remove_line(
    State(state): State<AppState>,
    session: CustomerSession,
    Path(line_id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = cart_service::remove_line(&state, session, line_id, &language).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(
        ("x-session-id" = Uuid, Header, description = "Customer session id"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: CustomerSession,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = cart_service::clear_cart(&state, session, &language).await?;
    Ok(Json(resp))
}
