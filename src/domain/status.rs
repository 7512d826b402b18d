use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Position of an order in the kitchen workflow. Only ever moves forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Received,
    Preparing,
    Ready,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Received,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
        }
    }

    pub fn ordinal(self) -> usize {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready => 2,
        }
    }

    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => None,
        }
    }

    pub fn previous(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Received => None,
            OrderStatus::Preparing => Some(OrderStatus::Received),
            OrderStatus::Ready => Some(OrderStatus::Preparing),
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.next() == Some(next)
    }

    pub fn label(self, locale: &str) -> &'static str {
        match (self, locale) {
            (OrderStatus::Received, "fi") => "Tilaus vastaanotettu",
            (OrderStatus::Preparing, "fi") => "Valmisteilla",
            (OrderStatus::Ready, "fi") => "Valmis",
            (OrderStatus::Received, _) => "Order Received",
            (OrderStatus::Preparing, _) => "Preparing",
            (OrderStatus::Ready, _) => "Ready",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(OrderStatus::Received),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move an order from {from} to {to}")]
    Invalid { from: OrderStatus, to: OrderStatus },

    #[error("order is already {0}")]
    Terminal(OrderStatus),
}

/// What a kitchen write has to do to reach a target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply { from: OrderStatus, to: OrderStatus },
    /// Another station already made this move.
    AlreadyApplied,
}

/// Decides whether `current -> target` is a legal kitchen action.
pub fn plan_transition(
    current: OrderStatus,
    target: OrderStatus,
) -> Result<Transition, TransitionError> {
    if current.can_transition_to(target) {
        return Ok(Transition::Apply {
            from: current,
            to: target,
        });
    }
    if current == target && target.previous().is_some() {
        return Ok(Transition::AlreadyApplied);
    }
    Err(TransitionError::Invalid {
        from: current,
        to: target,
    })
}

/// The "start cooking" / "mark ready" button: one step forward.
pub fn plan_advance(current: OrderStatus) -> Result<Transition, TransitionError> {
    match current.next() {
        Some(to) => Ok(Transition::Apply { from: current, to }),
        None => Err(TransitionError::Terminal(current)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_forward_single_steps_are_legal() {
        use OrderStatus::*;
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let legal = matches!((from, to), (Received, Preparing) | (Preparing, Ready));
                assert_eq!(from.can_transition_to(to), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn plan_rejects_backward_and_skipping_moves() {
        use OrderStatus::*;
        assert!(matches!(
            plan_transition(Received, Ready),
            Err(TransitionError::Invalid { .. })
        ));
        assert!(matches!(
            plan_transition(Ready, Received),
            Err(TransitionError::Invalid { .. })
        ));
        assert!(matches!(
            plan_transition(Ready, Preparing),
            Err(TransitionError::Invalid { .. })
        ));
        assert!(matches!(
            plan_transition(Received, Received),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn repeated_action_is_a_no_op() {
        assert_eq!(
            plan_transition(OrderStatus::Preparing, OrderStatus::Preparing),
            Ok(Transition::AlreadyApplied)
        );
        assert_eq!(
            plan_transition(OrderStatus::Ready, OrderStatus::Ready),
            Ok(Transition::AlreadyApplied)
        );
    }

    #[test]
    fn advance_walks_the_workflow() {
        assert_eq!(
            plan_advance(OrderStatus::Received),
            Ok(Transition::Apply {
                from: OrderStatus::Received,
                to: OrderStatus::Preparing
            })
        );
        assert_eq!(
            plan_advance(OrderStatus::Ready),
            Err(TransitionError::Terminal(OrderStatus::Ready))
        );
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("preparing".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Ready.to_string(), "ready");
    }
}
