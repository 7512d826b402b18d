use uuid::Uuid;

use crate::{
    domain::cart::{Cart, LineRef},
    dto::cart::{AddToCartRequest, CartView},
    error::AppResult,
    middleware::session::CustomerSession,
    response::{ApiResponse, Meta},
    services::menu_service,
    state::AppState,
};

/// The session's saved cart. Unreadable or unreachable carts start empty.
pub async fn load_cart(state: &AppState, session: CustomerSession) -> Cart {
    read_cart(state, session).await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, session = %session.id(), "cart unavailable, starting empty");
        Cart::new()
    })
}

/// Like [`load_cart`] but a store failure is returned instead of an empty
/// cart. Anything that writes the cart back or places an order reads it this
/// way.
pub async fn read_cart(state: &AppState, session: CustomerSession) -> AppResult<Cart> {
    let record = state.store.load_session(session.id()).await?;
    let cart = match record.and_then(|record| record.cart) {
        None => Cart::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, session = %session.id(), "stored cart unreadable, starting empty");
            Cart::new()
        }),
    };
    Ok(cart)
}

pub async fn save_cart(state: &AppState, session: CustomerSession, cart: &Cart) -> AppResult<()> {
    let value = serde_json::to_value(cart).map_err(|err| anyhow::anyhow!(err))?;
    state.store.save_cart(session.id(), value).await?;
    Ok(())
}

/// Empties the cart after a completed order. The order already exists, so a
/// failure here is only logged.
pub async fn clear_after_order(state: &AppState, session: CustomerSession) {
    if let Err(err) = save_cart(state, session, &Cart::new()).await {
        tracing::warn!(error = %err, session = %session.id(), "failed to clear cart after order");
    }
}

pub async fn get_cart(
    state: &AppState,
    session: CustomerSession,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    let cart = load_cart(state, session).await;
    Ok(ApiResponse::success(
        "OK",
        CartView::new(&cart, language),
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    session: CustomerSession,
    payload: AddToCartRequest,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    let item = menu_service::find_orderable_item(state, payload.item_id).await?;
    let mut cart = read_cart(state, session).await?;
    let line = cart.add_line(&item, payload.customizations.as_ref())?;
    save_cart(state, session, &cart).await?;

    tracing::debug!(
        session = %session.id(),
        item_id = %item.id,
        line_id = %line.line_id,
        quantity = line.quantity,
        "added to cart"
    );
    Ok(ApiResponse::success(
        "Added to cart",
        CartView::new(&cart, language),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    session: CustomerSession,
    target: LineRef,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    let mut cart = read_cart(state, session).await?;
    let remaining = cart.remove_line(target)?;
    save_cart(state, session, &cart).await?;

    tracing::debug!(session = %session.id(), ?target, remaining, "removed from cart");
    Ok(ApiResponse::success(
        "Removed from cart",
        CartView::new(&cart, language),
        Some(Meta::empty()),
    ))
}

pub async fn remove_line(
    state: &AppState,
    session: CustomerSession,
    line_id: Uuid,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    remove_from_cart(state, session, LineRef::Line(line_id), language).await
}

pub async fn remove_item(
    state: &AppState,
    session: CustomerSession,
    item_id: Uuid,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    remove_from_cart(state, session, LineRef::Item(item_id), language).await
}

pub async fn clear_cart(
    state: &AppState,
    session: CustomerSession,
    language: &str,
) -> AppResult<ApiResponse<CartView>> {
    let cart = Cart::new();
    save_cart(state, session, &cart).await?;
    Ok(ApiResponse::success(
        "Cart cleared",
        CartView::new(&cart, language),
        Some(Meta::empty()),
    ))
}
