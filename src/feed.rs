use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Order;

/// A committed change to one order.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// Created or moved to a new status. Carries the stored record.
    Upserted { order: Order },
    Removed { order_id: Uuid },
}

impl OrderEvent {
    pub fn order_id(&self) -> Uuid {
        match self {
            OrderEvent::Upserted { order } => order.id,
            OrderEvent::Removed { order_id } => *order_id,
        }
    }
}

/// In-process fan-out of order changes to every open subscription.
#[derive(Debug, Clone)]
pub struct OrderFeed {
    sender: broadcast::Sender<OrderEvent>,
}

impl OrderFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: OrderEvent) {
        let order_id = event.order_id();
        // No receivers is the normal idle case.
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::debug!(%order_id, receivers, "order event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_published_after_subscribing() {
        let feed = OrderFeed::new(8);
        let id = Uuid::new_v4();
        feed.publish(OrderEvent::Removed { order_id: Uuid::new_v4() });

        let mut rx = feed.subscribe();
        feed.publish(OrderEvent::Removed { order_id: id });
        assert_eq!(rx.recv().await.unwrap().order_id(), id);
        assert_eq!(feed.receiver_count(), 1);
    }
}
