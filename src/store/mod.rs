//! Storage seam. Services only talk to [`Store`]; the PostgreSQL backend
//! serves production and the in-memory one serves tests and local runs
//! without a database.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::{order::OrderDraft, status::OrderStatus},
    models::{
        AuditEntry, Badge, CustomizationCategory, LocalizedText, MenuCategory, MenuItem, Order,
        TodaySpecial, User,
    },
    routes::params::SortOrder,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub sort_order: SortOrder,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: i64,
    pub prep_time: u32,
    pub category: String,
    pub badge: Option<Badge>,
    pub customizations: Option<Vec<CustomizationCategory>>,
    pub available: bool,
}

/// Fields left `None` keep their stored value. `badge` and
/// `customizations` are doubly optional so they can be cleared.
#[derive(Debug, Clone, Default)]
pub struct MenuItemPatch {
    pub name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub price: Option<i64>,
    pub prep_time: Option<u32>,
    pub category: Option<String>,
    pub badge: Option<Option<Badge>>,
    pub customizations: Option<Option<Vec<CustomizationCategory>>>,
    pub available: Option<bool>,
}

impl MenuItemPatch {
    pub fn apply(self, item: &mut MenuItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(prep_time) = self.prep_time {
            item.prep_time = prep_time;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(badge) = self.badge {
            item.badge = badge;
        }
        if let Some(customizations) = self.customizations {
            item.customizations = customizations;
        }
        if let Some(available) = self.available {
            item.available = available;
        }
    }
}

/// A customer's session document: the raw cart as last saved, plus the id
/// of the last order placed from it.
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    pub cart: Option<Value>,
    pub last_order_id: Option<Uuid>,
}

#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Newest first.
    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>>;
    async fn insert_menu_item(&self, item: NewMenuItem) -> StoreResult<MenuItem>;
    async fn update_menu_item(&self, id: Uuid, patch: MenuItemPatch)
    -> StoreResult<Option<MenuItem>>;
    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool>;

    /// Ordered by `sort_order`.
    async fn list_categories(&self) -> StoreResult<Vec<MenuCategory>>;
    async fn upsert_category(&self, category: MenuCategory) -> StoreResult<MenuCategory>;
    async fn delete_category(&self, id: &str) -> StoreResult<bool>;

    async fn get_special(&self) -> StoreResult<Option<TodaySpecial>>;
    async fn set_special(&self, special: TodaySpecial) -> StoreResult<TodaySpecial>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the draft as a `received` order, stamping id and time.
    async fn create_order(&self, draft: OrderDraft) -> StoreResult<Order>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<OrderPage>;
    async fn count_orders(&self, status: Option<OrderStatus>) -> StoreResult<u64>;
    /// Single conditional write of `status`: applies only while the order
    /// is still at `from`. `None` when nothing matched.
    async fn transition_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>>;
    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, session_id: Uuid) -> StoreResult<Option<SessionRecord>>;
    async fn save_cart(&self, session_id: Uuid, cart: Value) -> StoreResult<()>;
    async fn set_last_order(&self, session_id: Uuid, order_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Creates the account or resets its password and role.
    async fn upsert_user(&self, email: &str, password_hash: &str, role: &str)
    -> StoreResult<User>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: AuditEntry) -> StoreResult<()>;
}

pub trait Store: MenuStore + OrderStore + SessionStore + UserStore + AuditStore {}

impl<T> Store for T where T: MenuStore + OrderStore + SessionStore + UserStore + AuditStore {}
