use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Order;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub all: u64,
    pub received: u64,
    pub preparing: u64,
    pub ready: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenOrderList {
    pub items: Vec<Order>,
    pub counts: StatusCounts,
}
