use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    ActiveValue::NotSet,
    sea_query::{Expr, OnConflict},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::{order::OrderDraft, status::OrderStatus},
    entity::{
        audit_logs::ActiveModel as AuditActive,
        cart_sessions::{
            ActiveModel as SessionActive, Column as SessionCol, Entity as CartSessions,
        },
        menu_categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as MenuCategories,
            Model as CategoryModel,
        },
        menu_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as MenuItems, Model as ItemModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        settings::{ActiveModel as SettingActive, Column as SettingCol, Entity as Settings},
        users::{
            ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel,
        },
    },
    models::{AuditEntry, Badge, MenuCategory, MenuItem, Order, OrderLine, TodaySpecial, User},
    routes::params::SortOrder,
    store::{
        AuditStore, MenuItemPatch, MenuStore, NewMenuItem, OrderPage, OrderQuery, OrderStore,
        SessionRecord, SessionStore, StoreError, StoreResult, UserStore,
    },
};

const SPECIAL_KEY: &str = "menuSpecial";

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Unavailable(message),
            _ if message.contains("permission denied") => StoreError::PermissionDenied(message),
            _ => StoreError::Backend(message),
        }
    }
}

/// PostgreSQL backend over SeaORM.
#[derive(Clone)]
pub struct PgStore {
    orm: DatabaseConnection,
}

impl PgStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.orm
    }

    async fn lines_for(&self, order_ids: Vec<Uuid>) -> StoreResult<HashMap<Uuid, Vec<OrderLine>>> {
        let mut grouped: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }
        let rows = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .order_by_asc(OrderItemCol::Position)
            .all(&self.orm)
            .await?;
        for row in rows {
            grouped
                .entry(row.order_id)
                .or_default()
                .push(order_line_from_entity(row));
        }
        Ok(grouped)
    }
}

#[async_trait]
impl MenuStore for PgStore {
    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>> {
        MenuItems::find()
            .order_by_desc(ItemCol::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(menu_item_from_entity)
            .collect()
    }

    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>> {
        MenuItems::find_by_id(id)
            .one(&self.orm)
            .await?
            .map(menu_item_from_entity)
            .transpose()
    }

    async fn insert_menu_item(&self, item: NewMenuItem) -> StoreResult<MenuItem> {
        let now = Utc::now();
        let model = ItemActive {
            id: Set(Uuid::new_v4()),
            name: Set(to_json(&item.name)?),
            description: Set(to_json(&item.description)?),
            price: Set(item.price),
            prep_time: Set(to_int(item.prep_time, "prep_time")?),
            category: Set(item.category),
            badge: Set(item.badge.map(|badge| badge.as_str().to_string())),
            customizations: Set(item.customizations.as_ref().map(to_json).transpose()?),
            available: Set(item.available),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.orm)
        .await?;
        menu_item_from_entity(model)
    }

    async fn update_menu_item(
        &self,
        id: Uuid,
        patch: MenuItemPatch,
    ) -> StoreResult<Option<MenuItem>> {
        let Some(mut item) = self.get_menu_item(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut item);

        let model = ItemActive {
            id: Set(item.id),
            name: Set(to_json(&item.name)?),
            description: Set(to_json(&item.description)?),
            price: Set(item.price),
            prep_time: Set(to_int(item.prep_time, "prep_time")?),
            category: Set(item.category),
            badge: Set(item.badge.map(|badge| badge.as_str().to_string())),
            customizations: Set(item.customizations.as_ref().map(to_json).transpose()?),
            available: Set(item.available),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        }
        .update(&self.orm)
        .await?;
        menu_item_from_entity(model).map(Some)
    }

    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool> {
        let result = MenuItems::delete_by_id(id).exec(&self.orm).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_categories(&self) -> StoreResult<Vec<MenuCategory>> {
        MenuCategories::find()
            .order_by_asc(CategoryCol::SortOrder)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(category_from_entity)
            .collect()
    }

    async fn upsert_category(&self, category: MenuCategory) -> StoreResult<MenuCategory> {
        let model = CategoryActive {
            id: Set(category.id.clone()),
            name: Set(to_json(&category.name)?),
            sort_order: Set(category.sort_order),
            enabled: Set(category.enabled),
            created_at: NotSet,
        };
        MenuCategories::insert(model)
            .on_conflict(
                OnConflict::column(CategoryCol::Id)
                    .update_columns([
                        CategoryCol::Name,
                        CategoryCol::SortOrder,
                        CategoryCol::Enabled,
                    ])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> StoreResult<bool> {
        let result = MenuCategories::delete_by_id(id.to_string())
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn get_special(&self) -> StoreResult<Option<TodaySpecial>> {
        Settings::find_by_id(SPECIAL_KEY.to_string())
            .one(&self.orm)
            .await?
            .map(|setting| from_json(setting.value))
            .transpose()
    }

    async fn set_special(&self, special: TodaySpecial) -> StoreResult<TodaySpecial> {
        let model = SettingActive {
            key: Set(SPECIAL_KEY.to_string()),
            value: Set(to_json(&special)?),
            updated_at: Set(Utc::now().into()),
        };
        Settings::insert(model)
            .on_conflict(
                OnConflict::column(SettingCol::Key)
                    .update_columns([SettingCol::Value, SettingCol::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(special)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, draft: OrderDraft) -> StoreResult<Order> {
        let txn = self.orm.begin().await?;

        let order = OrderActive {
            id: Set(Uuid::new_v4()),
            customer_name: Set(draft.customer_name),
            table_number: Set(to_int(draft.table_number, "table_number")?),
            notes: Set(draft.notes),
            total_price: Set(draft.total_price),
            estimated_prep_time: Set(to_int(draft.estimated_prep_time, "estimated_prep_time")?),
            status: Set(OrderStatus::Received.as_str().to_string()),
            language: Set(draft.language),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for (position, line) in draft.items.iter().enumerate() {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                position: Set(to_int(position, "position")?),
                item_id: Set(line.item_id),
                name: Set(line.name.clone()),
                price: Set(line.price),
                quantity: Set(to_int(line.quantity, "quantity")?),
                prep_time: Set(to_int(line.prep_time, "prep_time")?),
                customizations: Set(to_json(&line.customizations_text)?),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        order_from_entity(order, draft.items)
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let Some(order) = Orders::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };
        let mut lines = self.lines_for(vec![order.id]).await?;
        let items = lines.remove(&order.id).unwrap_or_default();
        order_from_entity(order, items).map(Some)
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<OrderPage> {
        let mut finder = Orders::find().filter(status_condition(query.status));
        finder = match query.sort_order {
            SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
            SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
        };

        let total = finder.clone().count(&self.orm).await?;
        let orders = finder
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.orm)
            .await?;

        let mut lines = self
            .lines_for(orders.iter().map(|order| order.id).collect())
            .await?;
        let items = orders
            .into_iter()
            .map(|order| {
                let items = lines.remove(&order.id).unwrap_or_default();
                order_from_entity(order, items)
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(OrderPage { items, total })
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> StoreResult<u64> {
        let count = Orders::find()
            .filter(status_condition(status))
            .count(&self.orm)
            .await?;
        Ok(count)
    }

    async fn transition_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let result = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(to.as_str()))
            .filter(OrderCol::Id.eq(id))
            .filter(OrderCol::Status.eq(from.as_str()))
            .exec(&self.orm)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_order(id).await
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = Orders::delete_by_id(id).exec(&self.orm).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn load_session(&self, session_id: Uuid) -> StoreResult<Option<SessionRecord>> {
        let record = CartSessions::find_by_id(session_id)
            .one(&self.orm)
            .await?
            .map(|session| SessionRecord {
                cart: session.cart,
                last_order_id: session.last_order_id,
            });
        Ok(record)
    }

    async fn save_cart(&self, session_id: Uuid, cart: Value) -> StoreResult<()> {
        let model = SessionActive {
            session_id: Set(session_id),
            cart: Set(Some(cart)),
            last_order_id: NotSet,
            updated_at: Set(Utc::now().into()),
        };
        CartSessions::insert(model)
            .on_conflict(
                OnConflict::column(SessionCol::SessionId)
                    .update_columns([SessionCol::Cart, SessionCol::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(())
    }

    async fn set_last_order(&self, session_id: Uuid, order_id: Uuid) -> StoreResult<()> {
        let model = SessionActive {
            session_id: Set(session_id),
            cart: NotSet,
            last_order_id: Set(Some(order_id)),
            updated_at: Set(Utc::now().into()),
        };
        CartSessions::insert(model)
            .on_conflict(
                OnConflict::column(SessionCol::SessionId)
                    .update_columns([SessionCol::LastOrderId, SessionCol::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = Users::find()
            .filter(UserCol::Email.eq(email))
            .one(&self.orm)
            .await?
            .map(user_from_entity);
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(Users::find_by_id(id).one(&self.orm).await?.map(user_from_entity))
    }

    async fn upsert_user(&self, email: &str, password_hash: &str, role: &str) -> StoreResult<User> {
        let model = UserActive {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: NotSet,
            role: Set(role.to_string()),
        };
        Users::insert(model)
            .on_conflict(
                OnConflict::column(UserCol::Email)
                    .update_columns([UserCol::PasswordHash, UserCol::Role])
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;

        self.find_user_by_email(email)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("user {email} missing after upsert")))
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn append_audit(&self, entry: AuditEntry) -> StoreResult<()> {
        AuditActive {
            id: Set(entry.id),
            user_id: Set(entry.user_id),
            action: Set(entry.action),
            resource: Set(entry.resource),
            metadata: Set(entry.metadata),
            created_at: Set(entry.created_at.into()),
        }
        .insert(&self.orm)
        .await?;
        Ok(())
    }
}

fn status_condition(status: Option<OrderStatus>) -> Condition {
    let mut condition = Condition::all();
    if let Some(status) = status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    condition
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|err| StoreError::Corrupt(err.to_string()))
}

/// Integer columns are `INTEGER`; out-of-range values are refused before
/// they reach the database.
fn to_int<T>(value: T, column: &str) -> StoreResult<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| StoreError::Backend(format!("{column} out of range: {value}")))
}

fn from_json<T: DeserializeOwned>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|err| StoreError::Corrupt(err.to_string()))
}

fn menu_item_from_entity(model: ItemModel) -> StoreResult<MenuItem> {
    Ok(MenuItem {
        id: model.id,
        name: from_json(model.name)?,
        description: serde_json::from_value(model.description).unwrap_or_default(),
        price: model.price,
        prep_time: model.prep_time.max(0) as u32,
        category: model.category,
        badge: model.badge.as_deref().and_then(Badge::parse),
        customizations: model.customizations.map(from_json).transpose()?,
        available: model.available,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn category_from_entity(model: CategoryModel) -> StoreResult<MenuCategory> {
    Ok(MenuCategory {
        id: model.id,
        name: from_json(model.name)?,
        sort_order: model.sort_order,
        enabled: model.enabled,
    })
}

fn order_from_entity(model: OrderModel, items: Vec<OrderLine>) -> StoreResult<Order> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|err| StoreError::Corrupt(err.to_string()))?;
    let table_number = u32::try_from(model.table_number)
        .map_err(|_| StoreError::Corrupt(format!("order {} has a bad table number", model.id)))?;

    Ok(Order {
        id: model.id,
        customer_name: model.customer_name,
        table_number,
        notes: model.notes,
        items,
        total_price: model.total_price,
        estimated_prep_time: model.estimated_prep_time.max(0) as u32,
        status,
        language: model.language,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn order_line_from_entity(model: OrderItemModel) -> OrderLine {
    OrderLine {
        item_id: model.item_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity.max(0) as u32,
        prep_time: model.prep_time.max(0) as u32,
        customizations_text: serde_json::from_value(model.customizations).unwrap_or_default(),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
