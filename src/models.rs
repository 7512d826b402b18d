use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::status::OrderStatus;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Text keyed by locale, e.g. `{"en": "Latte", "fi": "Latte"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    pub fn new(en: impl Into<String>, fi: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("en".to_string(), en.into());
        map.insert("fi".to_string(), fi.into());
        Self(map)
    }

    pub fn single(locale: &str, text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(locale.to_string(), text.into());
        Self(map)
    }

    /// Falls back to English, then to any translation, then to "".
    pub fn get(&self, locale: &str) -> &str {
        self.0
            .get(locale)
            .or_else(|| self.0.get(DEFAULT_LANGUAGE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has(&self, locale: &str) -> bool {
        self.0
            .get(locale)
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// Lowercases the requested language and falls back to English.
pub fn normalize_language(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Popular,
    Bestseller,
    New,
}

impl Badge {
    pub fn as_str(self) -> &'static str {
        match self {
            Badge::Popular => "popular",
            Badge::Bestseller => "bestseller",
            Badge::New => "new",
        }
    }

    pub fn parse(raw: &str) -> Option<Badge> {
        match raw {
            "popular" => Some(Badge::Popular),
            "bestseller" => Some(Badge::Bestseller),
            "new" => Some(Badge::New),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// Exactly one option.
    Single,
    /// Any subset of the options, including none.
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomizationOption {
    pub id: String,
    pub label: LocalizedText,
    /// Price delta in cents, may be negative.
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomizationCategory {
    pub key: String,
    pub label: LocalizedText,
    #[serde(rename = "type")]
    pub selection: SelectionType,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<CustomizationOption>,
}

impl CustomizationCategory {
    pub fn option(&self, id: &str) -> Option<&CustomizationOption> {
        self.options.iter().find(|option| option.id == id)
    }

    /// The schema-declared default, only meaningful for `single` categories.
    pub fn default_option(&self) -> Option<&CustomizationOption> {
        match self.selection {
            SelectionType::Single => self.options.iter().find(|option| option.default),
            SelectionType::Multiple => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Base price in cents.
    pub price: i64,
    /// Minutes to prepare one portion.
    pub prep_time: u32,
    pub category: String,
    #[serde(default)]
    pub badge: Option<Badge>,
    #[serde(default)]
    pub customizations: Option<Vec<CustomizationCategory>>,
    #[serde(default = "default_true")]
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    pub fn schema(&self) -> Option<&[CustomizationCategory]> {
        self.customizations.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuCategory {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TodaySpecial {
    pub id: Uuid,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: i64,
    pub original_price: i64,
    pub prep_time: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl TodaySpecial {
    /// The special orders like an uncustomizable item at its offer price.
    pub fn as_menu_item(&self) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            prep_time: self.prep_time,
            category: "special".to_string(),
            badge: None,
            customizations: None,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One line of a placed order, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub item_id: Option<Uuid>,
    pub name: String,
    /// Unit price in cents including customizations.
    pub price: i64,
    pub quantity: u32,
    pub prep_time: u32,
    #[serde(default)]
    pub customizations_text: Vec<String>,
}

impl OrderLine {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub table_number: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderLine>,
    pub total_price: i64,
    pub estimated_prep_time: u32,
    pub status: OrderStatus,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}
