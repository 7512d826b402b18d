use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    cart::{Cart, CartLine},
    customization::{CustomizationSelection, summary_text},
    money::format_price,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub item_id: Uuid,
    #[serde(default)]
    pub customizations: Option<CustomizationSelection>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineView {
    pub line_id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
    pub prep_time: u32,
    pub customizations: Vec<String>,
    /// e.g. `€5.90`
    pub display_price: String,
}

impl CartLineView {
    pub fn new(line: &CartLine, language: &str) -> Self {
        Self {
            line_id: line.line_id,
            item_id: line.item_id,
            name: line.name.get(language).to_string(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
            prep_time: line.prep_time,
            customizations: summary_text(&line.customization_labels, language),
            display_price: format_price(line.unit_price),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_price: i64,
    pub total_price_display: String,
    pub total_items: u32,
    pub estimated_prep_time: u32,
    pub language: String,
}

impl CartView {
    pub fn new(cart: &Cart, language: &str) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView::new(line, language))
                .collect(),
            total_price: cart.total_price(),
            total_price_display: format_price(cart.total_price()),
            total_items: cart.total_items(),
            estimated_prep_time: cart.estimated_prep_time(),
            language: language.to_string(),
        }
    }
}
