pub mod auth;
pub mod cart;
pub mod kitchen;
pub mod menu;
pub mod orders;
