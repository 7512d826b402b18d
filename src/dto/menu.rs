use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::models::{
    Badge, CustomizationCategory, LocalizedText, MenuCategory, MenuItem, TodaySpecial,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuSection {
    pub category: MenuCategory,
    /// Category name in the requested language.
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuView {
    pub sections: Vec<MenuSection>,
    pub special: Option<TodaySpecial>,
    /// True when the built-in menu is served instead of stored items.
    pub fallback: bool,
    pub language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<MenuCategory>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: i64,
    pub prep_time: u32,
    pub category: String,
    #[serde(default)]
    pub badge: Option<Badge>,
    #[serde(default)]
    pub customizations: Option<Vec<CustomizationCategory>>,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Absent fields keep their value; `badge` and `customizations` may be sent
/// as `null` to clear them.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub price: Option<i64>,
    pub prep_time: Option<u32>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Badge>)]
    pub badge: Option<Option<Badge>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Vec<CustomizationCategory>>)]
    pub customizations: Option<Option<Vec<CustomizationCategory>>>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertCategoryRequest {
    pub name: LocalizedText,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_available")]
    pub enabled: bool,
}

fn default_available() -> bool {
    true
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: UpdateMenuItemRequest =
            serde_json::from_str(r#"{"badge": null, "price": 500}"#).unwrap();
        assert_eq!(patch.badge, Some(None));
        assert_eq!(patch.customizations, None);
        assert_eq!(patch.price, Some(500));
    }
}
