use uuid::Uuid;

use crate::{
    audit::log_audit,
    catalog,
    domain::customization::validate_schema,
    dto::menu::{
        AvailabilityRequest, CategoryList, CreateMenuItemRequest, MenuItemList, MenuSection,
        MenuView, UpdateMenuItemRequest, UpsertCategoryRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{LocalizedText, MenuCategory, MenuItem, TodaySpecial},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{MenuItemPatch, NewMenuItem},
};

/// The customer menu. Falls back to the built-in menu when the store has no
/// items or cannot be read.
pub async fn get_menu(state: &AppState, language: &str) -> AppResult<ApiResponse<MenuView>> {
    let (items, fallback) = match state.store.list_menu_items().await {
        Ok(items) if !items.is_empty() => (items, false),
        Ok(_) => (catalog::fallback_menu(), true),
        Err(err) => {
            tracing::warn!(error = %err, "menu unavailable, serving the built-in menu");
            (catalog::fallback_menu(), true)
        }
    };

    let stored_categories = if fallback {
        Vec::new()
    } else {
        state.store.list_categories().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "categories unavailable");
            Vec::new()
        })
    };
    let categories = if stored_categories.is_empty() {
        categories_from_items(&items)
    } else {
        stored_categories
    };

    let special = match state.store.get_special().await {
        Ok(Some(special)) => Some(special),
        Ok(None) if fallback => Some(catalog::default_special()),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %err, "special unavailable");
            fallback.then(catalog::default_special)
        }
    };

    let sections = categories
        .into_iter()
        .filter(|category| category.enabled)
        .map(|category| MenuSection {
            name: category.name.get(language).to_string(),
            items: items
                .iter()
                .filter(|item| item.available && item.category == category.id)
                .cloned()
                .collect(),
            category,
        })
        .filter(|section| !section.items.is_empty())
        .collect();

    Ok(ApiResponse::success(
        "OK",
        MenuView {
            sections,
            special,
            fallback,
            language: language.to_string(),
        },
        Some(Meta::empty()),
    ))
}

/// Categories derived from the items themselves, known ids first in their
/// default order.
fn categories_from_items(items: &[MenuItem]) -> Vec<MenuCategory> {
    let defaults = catalog::default_categories();
    let mut ids: Vec<&str> = Vec::new();
    for item in items {
        if !ids.contains(&item.category.as_str()) {
            ids.push(item.category.as_str());
        }
    }
    ids.sort_by_key(|id| {
        defaults
            .iter()
            .position(|category| category.id == *id)
            .unwrap_or(defaults.len())
    });
    ids.into_iter()
        .enumerate()
        .map(|(index, id)| MenuCategory {
            id: id.to_string(),
            name: catalog::category_name(id),
            sort_order: index as i32,
            enabled: true,
        })
        .collect()
}

/// Resolves an id a customer wants to add: a stored item, today's special,
/// or an item of the built-in menu while no items are stored.
pub async fn find_orderable_item(state: &AppState, id: Uuid) -> AppResult<MenuItem> {
    if let Some(item) = state.store.get_menu_item(id).await? {
        return Ok(item);
    }

    let special = state.store.get_special().await?;
    if let Some(special) = special.as_ref().filter(|special| special.id == id) {
        return Ok(special.as_menu_item());
    }

    if state.store.list_menu_items().await?.is_empty() {
        if let Some(item) = catalog::fallback_menu().into_iter().find(|item| item.id == id) {
            return Ok(item);
        }
        let default_special = catalog::default_special();
        if special.is_none() && default_special.id == id {
            return Ok(default_special.as_menu_item());
        }
    }

    Err(AppError::NotFound)
}

pub async fn list_items(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<MenuItemList>> {
    ensure_staff(user)?;
    let items = state.store.list_menu_items().await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        MenuItemList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_staff(user)?;
    validate_names(&payload.name)?;
    validate_price_and_time(payload.price, payload.prep_time)?;
    ensure_category(state, &payload.category).await?;
    if let Some(schema) = payload.customizations.as_deref() {
        validate_schema(schema)?;
    }

    let item = state
        .store
        .insert_menu_item(NewMenuItem {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            prep_time: payload.prep_time,
            category: payload.category,
            badge: payload.badge,
            customizations: payload.customizations,
            available: payload.available,
        })
        .await?;

    audit(state, user, "menu_item_create", serde_json::json!({ "item_id": item.id })).await;
    Ok(ApiResponse::success("Menu item created", item, Some(Meta::empty())))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_staff(user)?;
    if let Some(name) = &payload.name {
        validate_names(name)?;
    }
    validate_price_and_time(payload.price.unwrap_or(0), payload.prep_time.unwrap_or(1))?;
    if let Some(category) = &payload.category {
        ensure_category(state, category).await?;
    }
    if let Some(Some(schema)) = payload.customizations.as_ref() {
        validate_schema(schema)?;
    }

    let patch = MenuItemPatch {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        prep_time: payload.prep_time,
        category: payload.category,
        badge: payload.badge,
        customizations: payload.customizations,
        available: payload.available,
    };
    let item = state
        .store
        .update_menu_item(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;

    audit(state, user, "menu_item_update", serde_json::json!({ "item_id": id })).await;
    Ok(ApiResponse::success("Menu item updated", item, Some(Meta::empty())))
}

pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AvailabilityRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_staff(user)?;
    let patch = MenuItemPatch {
        available: Some(payload.available),
        ..MenuItemPatch::default()
    };
    let item = state
        .store
        .update_menu_item(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;

    audit(
        state,
        user,
        "menu_item_availability",
        serde_json::json!({ "item_id": id, "available": payload.available }),
    )
    .await;
    Ok(ApiResponse::success("Availability updated", item, Some(Meta::empty())))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    if !state.store.delete_menu_item(id).await? {
        return Err(AppError::NotFound);
    }
    audit(state, user, "menu_item_delete", serde_json::json!({ "item_id": id })).await;
    Ok(ApiResponse::success(
        "Menu item deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_staff(user)?;
    let items = state.store.list_categories().await?;
    Ok(ApiResponse::success("OK", CategoryList { items }, Some(Meta::empty())))
}

pub async fn upsert_category(
    state: &AppState,
    user: &AuthUser,
    id: String,
    payload: UpsertCategoryRequest,
) -> AppResult<ApiResponse<MenuCategory>> {
    ensure_staff(user)?;
    let id = id.trim().to_ascii_lowercase();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::BadRequest(
            "category id must be a lowercase slug".into(),
        ));
    }
    validate_names(&payload.name)?;

    let category = state
        .store
        .upsert_category(MenuCategory {
            id,
            name: payload.name,
            sort_order: payload.sort_order,
            enabled: payload.enabled,
        })
        .await?;

    audit(
        state,
        user,
        "menu_category_upsert",
        serde_json::json!({ "category": category.id }),
    )
    .await;
    Ok(ApiResponse::success("Category saved", category, Some(Meta::empty())))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let in_use = state
        .store
        .list_menu_items()
        .await?
        .iter()
        .any(|item| item.category == id);
    if in_use {
        return Err(AppError::BadRequest(format!(
            "category '{id}' still has menu items"
        )));
    }
    if !state.store.delete_category(id).await? {
        return Err(AppError::NotFound);
    }
    audit(state, user, "menu_category_delete", serde_json::json!({ "category": id })).await;
    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn get_special(state: &AppState) -> AppResult<ApiResponse<Option<TodaySpecial>>> {
    let special = state.store.get_special().await?;
    Ok(ApiResponse::success("OK", special, Some(Meta::empty())))
}

pub async fn set_special(
    state: &AppState,
    user: &AuthUser,
    mut special: TodaySpecial,
) -> AppResult<ApiResponse<TodaySpecial>> {
    ensure_staff(user)?;
    validate_names(&special.name)?;
    if special.price <= 0 {
        return Err(AppError::BadRequest("special price must be positive".into()));
    }
    if special.original_price < special.price {
        return Err(AppError::BadRequest(
            "original price cannot be below the offer price".into(),
        ));
    }
    validate_price_and_time(special.price, special.prep_time)?;
    if special.id.is_nil() {
        special.id = Uuid::new_v4();
    }

    let special = state.store.set_special(special).await?;
    audit(state, user, "menu_special_set", serde_json::json!({ "special_id": special.id })).await;
    Ok(ApiResponse::success("Special saved", special, Some(Meta::empty())))
}

fn validate_names(name: &LocalizedText) -> AppResult<()> {
    if !name.has("en") || !name.has("fi") {
        return Err(AppError::BadRequest(
            "name is required in both English and Finnish".into(),
        ));
    }
    Ok(())
}

fn validate_price_and_time(price: i64, prep_time: u32) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if prep_time == 0 {
        return Err(AppError::BadRequest("prep time must be positive".into()));
    }
    if i32::try_from(prep_time).is_err() {
        return Err(AppError::BadRequest("prep time is too large".into()));
    }
    Ok(())
}

async fn ensure_category(state: &AppState, id: &str) -> AppResult<()> {
    let mut categories = state.store.list_categories().await?;
    if categories.is_empty() {
        categories = catalog::default_categories();
    }
    if categories.iter().any(|category| category.id == id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("unknown category '{id}'")))
    }
}

async fn audit(state: &AppState, user: &AuthUser, action: &str, metadata: serde_json::Value) {
    if let Err(err) = log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        action,
        Some("menu"),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
