//! Pure ordering logic: cart arithmetic, customization pricing, the order
//! status machine and the customer tracking view. Nothing in here touches
//! storage or the network.

pub mod cart;
pub mod customization;
pub mod money;
pub mod order;
pub mod status;
pub mod tracking;
