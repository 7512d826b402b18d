use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{domain::status::OrderStatus, models::Order};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackingStep {
    pub status: OrderStatus,
    pub label: String,
    /// Reached: at or before the current status.
    pub active: bool,
    pub current: bool,
}

/// What the customer's status page shows for one snapshot of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackingView {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub steps: Vec<TrackingStep>,
    /// Only while the kitchen is preparing the order.
    pub estimated_prep_time: Option<u32>,
    pub ready_message: Option<String>,
    pub table_number: u32,
    pub total_price: i64,
}

/// Last four characters of the id, upper-cased, as printed on tickets.
pub fn short_order_number(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    simple[simple.len() - 4..].to_ascii_uppercase()
}

pub fn tracking_view(order: &Order, locale: &str) -> TrackingView {
    let current = order.status.ordinal();
    let steps = OrderStatus::ALL
        .iter()
        .map(|status| TrackingStep {
            status: *status,
            label: status.label(locale).to_string(),
            active: status.ordinal() <= current,
            current: status.ordinal() == current,
        })
        .collect();

    TrackingView {
        order_id: order.id,
        order_number: short_order_number(&order.id),
        status: order.status,
        steps,
        estimated_prep_time: (order.status == OrderStatus::Preparing)
            .then_some(order.estimated_prep_time),
        ready_message: (order.status == OrderStatus::Ready).then(|| ready_message(locale)),
        table_number: order.table_number,
        total_price: order.total_price,
    }
}

fn ready_message(locale: &str) -> String {
    match locale {
        "fi" => "Tilauksesi on valmis!",
        _ => "Your order is ready!",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::parse_str("6f1c2d6e-8a0b-4c1d-9e2f-0123456789ab").unwrap(),
            customer_name: "Aino".into(),
            table_number: 4,
            notes: None,
            items: Vec::new(),
            total_price: 1840,
            estimated_prep_time: 18,
            status,
            language: "en".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn steps_up_to_current_are_active() {
        let view = tracking_view(&order(OrderStatus::Preparing), "en");
        let flags: Vec<(bool, bool)> = view.steps.iter().map(|s| (s.active, s.current)).collect();
        assert_eq!(flags, vec![(true, false), (true, true), (false, false)]);
        assert_eq!(view.estimated_prep_time, Some(18));
        assert_eq!(view.ready_message, None);
        assert_eq!(view.steps[1].label, "Preparing");
    }

    #[test]
    fn ready_shows_completion_only() {
        let view = tracking_view(&order(OrderStatus::Ready), "fi");
        assert!(view.steps.iter().all(|s| s.active));
        assert_eq!(view.estimated_prep_time, None);
        assert_eq!(view.ready_message.as_deref(), Some("Tilauksesi on valmis!"));
    }

    #[test]
    fn received_hides_prep_time() {
        let view = tracking_view(&order(OrderStatus::Received), "en");
        assert_eq!(view.estimated_prep_time, None);
        assert!(view.steps[0].current);
    }

    #[test]
    fn order_number_is_last_four_upper() {
        let id = Uuid::parse_str("6f1c2d6e-8a0b-4c1d-9e2f-0123456789ab").unwrap();
        assert_eq!(short_order_number(&id), "89AB");
    }
}
