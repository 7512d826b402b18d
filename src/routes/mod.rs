use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod kitchen;
pub mod menu;
pub mod menu_admin;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/menu", menu::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::route())
        .nest("/session", orders::session_route())
        .nest("/auth", auth::router())
        .nest("/kitchen", kitchen::router())
        .nest("/kitchen/menu", menu_admin::router())
}
