//! Built-in menu, served when the store holds no items and used by the seeder.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    Badge, CustomizationCategory, CustomizationOption, LocalizedText, MenuCategory, MenuItem,
    SelectionType, TodaySpecial,
};

pub const ESPRESSO_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0001);
pub const CAPPUCCINO_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0002);
pub const LATTE_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0003);
pub const CLUB_SANDWICH_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0004);
pub const CAESAR_SALAD_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0005);
pub const BURGER_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0006);
pub const CHEESECAKE_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0007);
pub const ICE_CREAM_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_0008);
pub const SPECIAL_ID: Uuid = Uuid::from_u128(0x0d1e_0000_0000_4000_8000_0000_0000_00ff);

pub fn default_categories() -> Vec<MenuCategory> {
    [
        ("coffee", "Coffee", "Kahvi"),
        ("food", "Food", "Ruoka"),
        ("desserts", "Desserts", "Jälkiruoat"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (id, en, fi))| MenuCategory {
        id: id.to_string(),
        name: LocalizedText::new(en, fi),
        sort_order: index as i32,
        enabled: true,
    })
    .collect()
}

/// Display name for a category id that has no stored category document.
pub fn category_name(id: &str) -> LocalizedText {
    default_categories()
        .into_iter()
        .find(|category| category.id == id)
        .map(|category| category.name)
        .unwrap_or_else(|| LocalizedText::single("en", id))
}

pub fn fallback_menu() -> Vec<MenuItem> {
    vec![
        item(ESPRESSO_ID, ("Espresso", "Espresso"), 350, 3, "coffee", Some(Badge::Popular)),
        item(CAPPUCCINO_ID, ("Cappuccino", "Cappuccino"), 450, 4, "coffee", None),
        MenuItem {
            customizations: Some(latte_customizations()),
            ..item(LATTE_ID, ("Latte", "Latte"), 480, 4, "coffee", Some(Badge::Bestseller))
        },
        item(CLUB_SANDWICH_ID, ("Club Sandwich", "Club-voileipä"), 1290, 12, "food", None),
        item(CAESAR_SALAD_ID, ("Caesar Salad", "Caesar-salaatti"), 1150, 8, "food", None),
        item(
            BURGER_ID,
            ("Burger & Fries", "Burgeri & ranskalaiset"),
            1490,
            18,
            "food",
            Some(Badge::Popular),
        ),
        item(CHEESECAKE_ID, ("Cheesecake", "Juustokakku"), 650, 5, "desserts", Some(Badge::New)),
        item(ICE_CREAM_ID, ("Ice Cream", "Jäätelö"), 500, 2, "desserts", None),
    ]
}

pub fn default_special() -> TodaySpecial {
    TodaySpecial {
        id: SPECIAL_ID,
        name: LocalizedText::new("Salmon Soup", "Lohikeitto"),
        description: LocalizedText::new(
            "Traditional Finnish salmon soup",
            "Perinteinen suomalainen lohikeitto",
        ),
        price: 1090,
        original_price: 1250,
        prep_time: 10,
        image: None,
    }
}

pub fn latte_customizations() -> Vec<CustomizationCategory> {
    vec![
        CustomizationCategory {
            key: "size".to_string(),
            label: LocalizedText::new("Size", "Koko"),
            selection: SelectionType::Single,
            required: true,
            options: vec![
                option("regular", ("Regular", "Normaali"), 0, true),
                option("large", ("Large", "Iso"), 50, false),
            ],
        },
        CustomizationCategory {
            key: "milk".to_string(),
            label: LocalizedText::new("Milk", "Maito"),
            selection: SelectionType::Single,
            required: false,
            options: vec![
                option("dairy", ("Dairy milk", "Lehmänmaito"), 0, true),
                option("oat", ("Oat milk", "Kauramaito"), 60, false),
            ],
        },
        CustomizationCategory {
            key: "extras".to_string(),
            label: LocalizedText::new("Extras", "Lisät"),
            selection: SelectionType::Multiple,
            required: false,
            options: vec![
                option("extra-shot", ("Extra shot", "Lisäshotti"), 80, false),
                option("vanilla", ("Vanilla syrup", "Vaniljasiirappi"), 40, false),
            ],
        },
    ]
}

fn item(
    id: Uuid,
    (en, fi): (&str, &str),
    price: i64,
    prep_time: u32,
    category: &str,
    badge: Option<Badge>,
) -> MenuItem {
    MenuItem {
        id,
        name: LocalizedText::new(en, fi),
        description: LocalizedText::default(),
        price,
        prep_time,
        category: category.to_string(),
        badge,
        customizations: None,
        available: true,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

fn option(id: &str, (en, fi): (&str, &str), price: i64, default: bool) -> CustomizationOption {
    CustomizationOption {
        id: id.to_string(),
        label: LocalizedText::new(en, fi),
        price,
        default,
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customization::validate_schema;

    #[test]
    fn fallback_items_reference_default_categories() {
        let categories = default_categories();
        for item in fallback_menu() {
            assert!(categories.iter().any(|c| c.id == item.category), "{}", item.category);
            assert!(item.name.has("en") && item.name.has("fi"));
        }
    }

    #[test]
    fn latte_schema_is_well_formed() {
        assert!(validate_schema(&latte_customizations()).is_ok());
    }
}
