use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::menu::{
        AvailabilityRequest, CategoryList, CreateMenuItemRequest, MenuItemList,
        UpdateMenuItemRequest, UpsertCategoryRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{MenuCategory, MenuItem, TodaySpecial},
    response::ApiResponse,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", patch(update_item).delete(delete_item))
        .route("/items/{id}/availability", patch(set_availability))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", put(upsert_category).delete(delete_category))
        .route("/special", get(get_special).put(set_special))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/menu/items",
    responses(
        (status = 200, description = "All menu items, newest first", body = ApiResponse<MenuItemList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::list_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kitchen/menu/items",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item created", body = ApiResponse<MenuItem>),
        (status = 400, description = "Invalid item")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = ApiResponse<MenuItem>),
        (status = 400, description = "Invalid item"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/menu/items/{id}/availability",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability toggled", body = ApiResponse<MenuItem>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::set_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/kitchen/menu/items/{id}",
    params(("id" = Uuid, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Menu item deleted"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/menu/categories",
    responses(
        (status = 200, description = "Categories by sort order", body = ApiResponse<CategoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::list_categories(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/kitchen/menu/categories/{id}",
    params(("id" = String, Path, description = "Category slug")),
    request_body = UpsertCategoryRequest,
    responses(
        (status = 200, description = "Category saved", body = ApiResponse<MenuCategory>),
        (status = 400, description = "Invalid category")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn upsert_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpsertCategoryRequest>,
) -> AppResult<Json<ApiResponse<MenuCategory>>> {
    let resp = menu_service::upsert_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/kitchen/menu/categories/{id}",
    params(("id" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Category still in use"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_category(&state, &user, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/menu/special",
    responses(
        (status = 200, description = "Today's special, if any", body = ApiResponse<TodaySpecial>)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn get_special(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Option<TodaySpecial>>>> {
    let resp = menu_service::get_special(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/kitchen/menu/special",
    request_body = TodaySpecial,
    responses(
        (status = 200, description = "Special saved", body = ApiResponse<TodaySpecial>),
        (status = 400, description = "Invalid special")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn set_special(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TodaySpecial>,
) -> AppResult<Json<ApiResponse<TodaySpecial>>> {
    let resp = menu_service::set_special(&state, &user, payload).await?;
    Ok(Json(resp))
}
