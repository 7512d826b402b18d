use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Order, notify::EmailTemplateParams};

/// Table numbers arrive as typed text or as a number from QR links.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TableNumberInput {
    Number(i64),
    Text(String),
}

impl TableNumberInput {
    pub fn as_text(&self) -> String {
        match self {
            TableNumberInput::Number(n) => n.to_string(),
            TableNumberInput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub table_number: Option<TableNumberInput>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitOrderResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderFormDefaults {
    pub customer_name: String,
    /// Pre-filled from the table QR link when it carried a valid number.
    pub table_number: Option<u32>,
    /// Always false: a pre-filled table can still be corrected.
    pub table_locked: bool,
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LastOrderResponse {
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmailOrderResponse {
    pub sent: bool,
    pub params: EmailTemplateParams,
}
