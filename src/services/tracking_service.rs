use std::sync::Arc;

use futures::{Stream, stream};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::{
    domain::{
        status::OrderStatus,
        tracking::{TrackingView, tracking_view},
    },
    error::AppResult,
    feed::OrderEvent,
    models::Order,
    response::{ApiResponse, Meta},
    state::AppState,
    store::{Store, StoreError},
};

/// Why a customer cannot see their order right now. Every kind is worth
/// retrying from the status page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("Order not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Network error, please try again")]
    Network,

    #[error("Something went wrong: {0}")]
    Unknown(String),
}

impl TrackingError {
    pub fn code(&self) -> &'static str {
        match self {
            TrackingError::NotFound => "not-found",
            TrackingError::PermissionDenied => "permission-denied",
            TrackingError::Network => "network-error",
            TrackingError::Unknown(_) => "unknown-error",
        }
    }
}

impl From<StoreError> for TrackingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => TrackingError::Network,
            StoreError::PermissionDenied(_) => TrackingError::PermissionDenied,
            StoreError::Corrupt(msg) | StoreError::Backend(msg) => TrackingError::Unknown(msg),
        }
    }
}

pub async fn get_tracking(
    state: &AppState,
    order_id: Uuid,
    language: &str,
) -> AppResult<ApiResponse<TrackingView>> {
    let order = read_order(state.store.as_ref(), order_id).await?;
    Ok(ApiResponse::success(
        "OK",
        tracking_view(&order, language),
        Some(Meta::empty()),
    ))
}

async fn read_order(store: &dyn Store, order_id: Uuid) -> Result<Order, TrackingError> {
    store
        .get_order(order_id)
        .await?
        .ok_or(TrackingError::NotFound)
}

/// Live view of one order: the current snapshot first, then one snapshot per
/// committed change. Dropping it unsubscribes.
pub struct OrderSubscription {
    order_id: Uuid,
    store: Arc<dyn Store>,
    events: broadcast::Receiver<OrderEvent>,
    pending: Option<Order>,
    last: Option<Order>,
    done: bool,
}

/// Registers on the feed before the initial read so a change committed in
/// between is still delivered.
pub async fn subscribe(
    state: &AppState,
    order_id: Uuid,
) -> Result<OrderSubscription, TrackingError> {
    let events = state.feed.subscribe();
    let initial = read_order(state.store.as_ref(), order_id).await?;
    tracing::debug!(%order_id, status = %initial.status, "tracking subscription opened");

    Ok(OrderSubscription {
        order_id,
        store: state.store.clone(),
        events,
        pending: Some(initial),
        last: None,
        done: false,
    })
}

impl OrderSubscription {
    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    /// Next snapshot. `None` once the stream has ended; an error item is
    /// always the last one.
    pub async fn next(&mut self) -> Option<Result<Order, TrackingError>> {
        if self.done {
            return None;
        }
        if let Some(order) = self.pending.take() {
            return Some(Ok(self.emit(order)));
        }

        loop {
            match self.events.recv().await {
                Ok(OrderEvent::Upserted { order }) if order.id == self.order_id => {
                    if !self.is_news(&order) {
                        continue;
                    }
                    return Some(Ok(self.emit(order)));
                }
                Ok(OrderEvent::Removed { order_id }) if order_id == self.order_id => {
                    return Some(Err(self.fail(TrackingError::NotFound)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(order_id = %self.order_id, skipped, "tracking lagged, re-reading order");
                    match read_order(self.store.as_ref(), self.order_id).await {
                        Ok(order) if !self.is_news(&order) => continue,
                        Ok(order) => return Some(Ok(self.emit(order))),
                        Err(err) => return Some(Err(self.fail(err))),
                    }
                }
                Err(RecvError::Closed) => {
                    self.done = true;
                    return None;
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Order, TrackingError>> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|item| (item, subscription))
        })
    }

    /// Statuses only move forward and `ready` is final. Buffered events
    /// replayed after a lag re-read can be older than what was emitted.
    fn is_news(&self, order: &Order) -> bool {
        match &self.last {
            None => true,
            Some(last) => {
                last.status != OrderStatus::Ready
                    && order.status.ordinal() >= last.status.ordinal()
                    && last != order
            }
        }
    }

    fn emit(&mut self, order: Order) -> Order {
        self.last = Some(order.clone());
        order
    }

    fn fail(&mut self, err: TrackingError) -> TrackingError {
        tracing::debug!(order_id = %self.order_id, code = err.code(), "tracking subscription ended");
        self.done = true;
        err
    }
}
