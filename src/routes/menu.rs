use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::menu::MenuView,
    error::AppResult,
    models::normalize_language,
    response::ApiResponse,
    routes::params::LanguageQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_menu))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(LanguageQuery),
    responses(
        (status = 200, description = "Menu sections with today's special", body = ApiResponse<MenuView>)
    ),
    tag = "Menu"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> AppResult<Json<ApiResponse<MenuView>>> {
    let language = normalize_language(query.lang.as_deref());
    let resp = menu_service::get_menu(&state, &language).await?;
    Ok(Json(resp))
}
