use crate::{
    audit::log_audit,
    domain::{
        order::{OrderDraft, parse_table_number},
        tracking::short_order_number,
    },
    dto::orders::{LastOrderResponse, OrderFormDefaults, SubmitOrderRequest, SubmitOrderResponse},
    error::AppResult,
    feed::OrderEvent,
    middleware::session::CustomerSession,
    models::normalize_language,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

/// Places the session's cart as a `received` order.
///
/// Validation and store failures leave the cart exactly as it was. After the
/// order is committed the cart is cleared, the id remembered for the
/// session, and the kitchen feed notified.
pub async fn submit_order(
    state: &AppState,
    session: CustomerSession,
    payload: SubmitOrderRequest,
) -> AppResult<ApiResponse<SubmitOrderResponse>> {
    let language = normalize_language(payload.language.as_deref());
    let cart = cart_service::read_cart(state, session).await?;
    let table = payload
        .table_number
        .as_ref()
        .map(|table| table.as_text())
        .unwrap_or_default();

    let draft = OrderDraft::from_cart(
        &cart,
        &payload.customer_name,
        &table,
        payload.notes.as_deref(),
        &language,
    )?;

    let order = state.store.create_order(draft).await.inspect_err(|err| {
        tracing::warn!(error = %err, session = %session.id(), "order submission failed");
    })?;
    tracing::info!(
        order_id = %order.id,
        table = order.table_number,
        total = order.total_price,
        "order placed"
    );

    cart_service::clear_after_order(state, session).await;
    if let Err(err) = state.store.set_last_order(session.id(), order.id).await {
        tracing::warn!(error = %err, order_id = %order.id, "failed to remember last order");
    }
    state.feed.publish(OrderEvent::Upserted {
        order: order.clone(),
    });

    if let Err(err) = log_audit(
        state.store.as_ref(),
        None,
        "order_submit",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "session_id": session.id() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        SubmitOrderResponse {
            order_id: order.id,
            order_number: short_order_number(&order.id),
            order,
        },
        Some(Meta::empty()),
    ))
}

/// Form defaults for a customer arriving from a table QR link.
pub fn form_defaults(table: Option<&str>) -> ApiResponse<OrderFormDefaults> {
    let table_number = table.and_then(|raw| parse_table_number(raw).ok());
    ApiResponse::success(
        "OK",
        OrderFormDefaults {
            customer_name: String::new(),
            table_number,
            table_locked: false,
            notes: String::new(),
        },
        Some(Meta::empty()),
    )
}

pub async fn last_order(
    state: &AppState,
    session: CustomerSession,
) -> AppResult<ApiResponse<LastOrderResponse>> {
    let order_id = state
        .store
        .load_session(session.id())
        .await?
        .and_then(|record| record.last_order_id);
    Ok(ApiResponse::success(
        "OK",
        LastOrderResponse { order_id },
        Some(Meta::empty()),
    ))
}
