pub mod audit_logs;
pub mod cart_sessions;
pub mod menu_categories;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod settings;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_sessions::Entity as CartSessions;
pub use menu_categories::Entity as MenuCategories;
pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use settings::Entity as Settings;
pub use users::Entity as Users;
