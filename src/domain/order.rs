use thiserror::Error;

use crate::{
    domain::{cart::Cart, customization::summary_text},
    models::OrderLine,
};

pub const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at least {} characters", MIN_NAME_LEN)]
    NameTooShort,

    #[error("Table number is required")]
    TableRequired,

    #[error("Please enter a valid table number")]
    TableInvalid,

    #[error("Cart is empty")]
    EmptyCart,
}

/// Largest table number the `orders.table_number` column can hold.
pub const MAX_TABLE_NUMBER: u32 = i32::MAX as u32;

/// Parses a table number typed into the form or carried in a QR link.
pub fn parse_table_number(raw: &str) -> Result<u32, OrderValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(OrderValidationError::TableRequired);
    }
    match raw.parse::<u32>() {
        Ok(n) if (1..=MAX_TABLE_NUMBER).contains(&n) => Ok(n),
        _ => Err(OrderValidationError::TableInvalid),
    }
}

pub fn validate_customer_name(raw: &str) -> Result<String, OrderValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(OrderValidationError::NameRequired);
    }
    if name.chars().count() < MIN_NAME_LEN {
        return Err(OrderValidationError::NameTooShort);
    }
    Ok(name.to_string())
}

/// Everything the store needs to persist a new order. Id, status and
/// timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_name: String,
    pub table_number: u32,
    pub notes: Option<String>,
    pub items: Vec<OrderLine>,
    pub total_price: i64,
    pub estimated_prep_time: u32,
    pub language: String,
}

impl OrderDraft {
    /// Snapshots `cart` so later menu edits cannot change the order.
    pub fn from_cart(
        cart: &Cart,
        customer_name: &str,
        table_number: &str,
        notes: Option<&str>,
        language: &str,
    ) -> Result<Self, OrderValidationError> {
        let customer_name = validate_customer_name(customer_name)?;
        let table_number = parse_table_number(table_number)?;
        if cart.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }

        let items: Vec<OrderLine> = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                item_id: Some(line.item_id),
                name: line.name.get(language).to_string(),
                price: line.unit_price,
                quantity: line.quantity,
                prep_time: line.prep_time,
                customizations_text: summary_text(&line.customization_labels, language),
            })
            .collect();

        Ok(Self {
            customer_name,
            table_number,
            notes: notes
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
            total_price: items.iter().map(OrderLine::line_total).sum(),
            estimated_prep_time: cart.estimated_prep_time(),
            items,
            language: language.to_string(),
        })
    }
}
