use futures::{Stream, stream};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::status::{OrderStatus, Transition, TransitionError, plan_advance, plan_transition},
    dto::kitchen::{KitchenOrderList, StatusCounts, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    feed::OrderEvent,
    middleware::auth::{AuthUser, ensure_staff},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
    store::OrderQuery,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<KitchenOrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let status = query.status_filter()?;

    let page_result = state
        .store
        .list_orders(&OrderQuery {
            status,
            sort_order: query.sort_order.unwrap_or_default(),
            limit: limit as u64,
            offset: offset as u64,
        })
        .await?;
    let counts = status_counts(state).await?;

    let meta = Meta::new(page, limit, page_result.total as i64);
    Ok(ApiResponse::success(
        "Ok",
        KitchenOrderList {
            items: page_result.items,
            counts,
        },
        Some(meta),
    ))
}

pub async fn status_counts(state: &AppState) -> AppResult<StatusCounts> {
    Ok(StatusCounts {
        all: state.store.count_orders(None).await?,
        received: state.store.count_orders(Some(OrderStatus::Received)).await?,
        preparing: state.store.count_orders(Some(OrderStatus::Preparing)).await?,
        ready: state.store.count_orders(Some(OrderStatus::Ready)).await?,
    })
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let order = state.store.get_order(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let target = payload
        .status
        .trim()
        .parse::<OrderStatus>()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let order = apply_transition(state, user, id, |current| plan_transition(current, target)).await?;
    Ok(ApiResponse::success("Order status updated", order, Some(Meta::empty())))
}

/// "Start cooking" on a received order, "mark ready" on one in preparation.
pub async fn advance_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let order = apply_transition(state, user, id, plan_advance).await?;
    Ok(ApiResponse::success("Order status updated", order, Some(Meta::empty())))
}

/// Plans against the stored status and commits with a conditional write.
/// When another station won the race the order is re-read: reaching the same
/// status counts as done, anything else is rejected.
async fn apply_transition<F>(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    plan: F,
) -> AppResult<Order>
where
    F: Fn(OrderStatus) -> Result<Transition, TransitionError>,
{
    let current = state.store.get_order(id).await?.ok_or(AppError::NotFound)?;
    let (from, to) = match plan(current.status)? {
        Transition::AlreadyApplied => return Ok(current),
        Transition::Apply { from, to } => (from, to),
    };

    let Some(order) = state.store.transition_order_status(id, from, to).await? else {
        let fresh = state.store.get_order(id).await?.ok_or(AppError::NotFound)?;
        if fresh.status == to {
            return Ok(fresh);
        }
        return Err(TransitionError::Invalid {
            from: fresh.status,
            to,
        }
        .into());
    };

    tracing::info!(order_id = %id, %from, %to, "order status changed");
    state.feed.publish(OrderEvent::Upserted {
        order: order.clone(),
    });

    if let Err(err) = log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id, "from": from, "to": to })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(order)
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    if !state.store.delete_order(id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(order_id = %id, "order deleted");
    state.feed.publish(OrderEvent::Removed { order_id: id });

    if let Err(err) = log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// One item of the dashboard's live feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Event(OrderEvent),
    /// The dashboard fell behind and should reload its list.
    Resync { skipped: u64 },
}

pub fn order_feed(state: &AppState) -> impl Stream<Item = FeedMessage> + Send + use<> {
    let receiver = state.feed.subscribe();
    stream::unfold(receiver, |mut receiver| async move {
        match receiver.recv().await {
            Ok(event) => Some((FeedMessage::Event(event), receiver)),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "kitchen feed lagged");
                Some((FeedMessage::Resync { skipped }, receiver))
            }
            Err(RecvError::Closed) => None,
        }
    })
}
