use std::{
    collections::HashMap,
    sync::{
        RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::{order::OrderDraft, status::OrderStatus},
    models::{AuditEntry, MenuCategory, MenuItem, Order, TodaySpecial, User},
    routes::params::SortOrder,
    store::{
        AuditStore, MenuItemPatch, MenuStore, NewMenuItem, OrderPage, OrderQuery, OrderStore,
        SessionRecord, SessionStore, StoreError, StoreResult, UserStore,
    },
};

#[derive(Default)]
struct MemoryState {
    menu_items: Vec<MenuItem>,
    categories: Vec<MenuCategory>,
    special: Option<TodaySpecial>,
    /// Insertion order doubles as the tie-break for equal timestamps.
    orders: Vec<Order>,
    sessions: HashMap<Uuid, SessionRecord>,
    users: Vec<User>,
    audit: Vec<AuditEntry>,
}

/// Process-local store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StoreError::Unavailable`],
    /// the way a dropped database connection would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state
            .read()
            .map(|state| state.audit.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        self.check_online()?;
        self.state
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        self.check_online()?;
        self.state
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>> {
        let state = self.read()?;
        let mut items = state.menu_items.clone();
        items.reverse();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>> {
        let state = self.read()?;
        Ok(state.menu_items.iter().find(|item| item.id == id).cloned())
    }

    async fn insert_menu_item(&self, item: NewMenuItem) -> StoreResult<MenuItem> {
        let mut state = self.write()?;
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4(),
            name: item.name,
            description: item.description,
            price: item.price,
            prep_time: item.prep_time,
            category: item.category,
            badge: item.badge,
            customizations: item.customizations,
            available: item.available,
            created_at: now,
            updated_at: now,
        };
        state.menu_items.push(item.clone());
        Ok(item)
    }

    async fn update_menu_item(
        &self,
        id: Uuid,
        patch: MenuItemPatch,
    ) -> StoreResult<Option<MenuItem>> {
        let mut state = self.write()?;
        let Some(item) = state.menu_items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        patch.apply(item);
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.menu_items.len();
        state.menu_items.retain(|item| item.id != id);
        Ok(state.menu_items.len() != before)
    }

    async fn list_categories(&self) -> StoreResult<Vec<MenuCategory>> {
        let state = self.read()?;
        let mut categories = state.categories.clone();
        categories.sort_by_key(|category| category.sort_order);
        Ok(categories)
    }

    async fn upsert_category(&self, category: MenuCategory) -> StoreResult<MenuCategory> {
        let mut state = self.write()?;
        match state.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category.clone(),
            None => state.categories.push(category.clone()),
        }
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.categories.len();
        state.categories.retain(|category| category.id != id);
        Ok(state.categories.len() != before)
    }

    async fn get_special(&self) -> StoreResult<Option<TodaySpecial>> {
        Ok(self.read()?.special.clone())
    }

    async fn set_special(&self, special: TodaySpecial) -> StoreResult<TodaySpecial> {
        self.write()?.special = Some(special.clone());
        Ok(special)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, draft: OrderDraft) -> StoreResult<Order> {
        let mut state = self.write()?;
        let order = Order {
            id: Uuid::new_v4(),
            customer_name: draft.customer_name,
            table_number: draft.table_number,
            notes: draft.notes,
            items: draft.items,
            total_price: draft.total_price,
            estimated_prep_time: draft.estimated_prep_time,
            status: OrderStatus::Received,
            language: draft.language,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let state = self.read()?;
        Ok(state.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<OrderPage> {
        let state = self.read()?;
        let mut matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|order| query.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if matches!(query.sort_order, SortOrder::Desc) {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(OrderPage { items, total })
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> StoreResult<u64> {
        let state = self.read()?;
        let count = state
            .orders
            .iter()
            .filter(|order| status.is_none_or(|status| order.status == status))
            .count();
        Ok(count as u64)
    }

    async fn transition_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let mut state = self.write()?;
        let Some(order) = state
            .orders
            .iter_mut()
            .find(|order| order.id == id && order.status == from)
        else {
            return Ok(None);
        };
        order.status = to;
        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.orders.len();
        state.orders.retain(|order| order.id != id);
        Ok(state.orders.len() != before)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, session_id: Uuid) -> StoreResult<Option<SessionRecord>> {
        Ok(self.read()?.sessions.get(&session_id).cloned())
    }

    async fn save_cart(&self, session_id: Uuid, cart: Value) -> StoreResult<()> {
        let mut state = self.write()?;
        state.sessions.entry(session_id).or_default().cart = Some(cart);
        Ok(())
    }

    async fn set_last_order(&self, session_id: Uuid, order_id: Uuid) -> StoreResult<()> {
        let mut state = self.write()?;
        state.sessions.entry(session_id).or_default().last_order_id = Some(order_id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn upsert_user(&self, email: &str, password_hash: &str, role: &str) -> StoreResult<User> {
        let mut state = self.write()?;
        if let Some(user) = state.users.iter_mut().find(|user| user.email == email) {
            user.password_hash = password_hash.to_string();
            user.role = role.to_string();
            return Ok(user.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: AuditEntry) -> StoreResult<()> {
        self.write()?.audit.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            customer_name: "Aino".into(),
            table_number: 3,
            notes: None,
            items: Vec::new(),
            total_price: 0,
            estimated_prep_time: 0,
            language: "en".into(),
        }
    }

    #[tokio::test]
    async fn transition_only_applies_from_the_expected_status() {
        let store = MemoryStore::new();
        let order = store.create_order(draft()).await.unwrap();

        let moved = store
            .transition_order_status(order.id, OrderStatus::Received, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(moved.unwrap().status, OrderStatus::Preparing);

        let stale = store
            .transition_order_status(order.id, OrderStatus::Received, OrderStatus::Preparing)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(store.count_orders(Some(OrderStatus::Preparing)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.create_order(draft()).await.unwrap_err();
        assert!(err.is_retryable());

        store.set_offline(false);
        assert!(store.create_order(draft()).await.is_ok());
    }
}
