use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::customization::{self, CustomizationError, CustomizationSelection},
    models::{LocalizedText, MenuItem},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub line_id: Uuid,
    pub item_id: Uuid,
    pub name: LocalizedText,
    /// Base price plus selected deltas, in cents.
    pub unit_price: i64,
    pub quantity: u32,
    pub prep_time: u32,
    #[serde(default)]
    pub selection: CustomizationSelection,
    #[serde(default)]
    pub customization_labels: Vec<LocalizedText>,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// How a caller points at a line to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRef {
    Line(Uuid),
    /// Only valid while a single line carries the item.
    Item(Uuid),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error(transparent)]
    Customization(#[from] CustomizationError),

    #[error("item {0} is not available")]
    Unavailable(Uuid),

    #[error("cart line not found")]
    LineNotFound,

    #[error("several cart lines hold item {item_id}, remove one by line id")]
    AmbiguousLine { item_id: Uuid, line_ids: Vec<Uuid> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    #[serde(default)]
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one portion of `item`. A line with the same item and an equal
    /// resolved selection is bumped instead of duplicated.
    pub fn add_line(
        &mut self,
        item: &MenuItem,
        selection: Option<&CustomizationSelection>,
    ) -> Result<CartLine, CartError> {
        if !item.available {
            return Err(CartError::Unavailable(item.id));
        }
        let resolved = customization::resolve(item.price, item.schema(), selection)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.item_id == item.id && line.selection == resolved.selection)
        {
            line.quantity = line.quantity.saturating_add(1);
            return Ok(line.clone());
        }

        let line = CartLine {
            line_id: Uuid::new_v4(),
            item_id: item.id,
            name: item.name.clone(),
            unit_price: resolved.unit_price,
            quantity: 1,
            prep_time: item.prep_time,
            selection: resolved.selection,
            customization_labels: resolved.summary,
        };
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Takes one portion off a line, deleting it at zero. Returns the
    /// quantity left on the line.
    pub fn remove_line(&mut self, target: LineRef) -> Result<u32, CartError> {
        let index = match target {
            LineRef::Line(line_id) => self
                .lines
                .iter()
                .position(|line| line.line_id == line_id)
                .ok_or(CartError::LineNotFound)?,
            LineRef::Item(item_id) => {
                let matches: Vec<usize> = self
                    .lines
                    .iter()
                    .enumerate()
                    .filter(|(_, line)| line.item_id == item_id)
                    .map(|(index, _)| index)
                    .collect();
                match matches.as_slice() {
                    [] => return Err(CartError::LineNotFound),
                    [index] => *index,
                    _ => {
                        return Err(CartError::AmbiguousLine {
                            item_id,
                            line_ids: matches.iter().map(|i| self.lines[*i].line_id).collect(),
                        });
                    }
                }
            }
        };

        let line = &mut self.lines[index];
        if line.quantity > 1 {
            line.quantity -= 1;
            Ok(line.quantity)
        } else {
            self.lines.remove(index);
            Ok(0)
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Exact sum of line totals in cents.
    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Items are prepared in parallel, so the slowest line wins.
    pub fn estimated_prep_time(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| line.prep_time)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{CustomizationCategory, CustomizationOption, SelectionType};

    fn item(name: &str, price: i64, prep_time: u32) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            name: LocalizedText::single("en", name),
            description: LocalizedText::default(),
            price,
            prep_time,
            category: "food".into(),
            badge: None,
            customizations: None,
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sized_item() -> MenuItem {
        let mut latte = item("Latte", 480, 4);
        latte.customizations = Some(vec![CustomizationCategory {
            key: "size".into(),
            label: LocalizedText::single("en", "Size"),
            selection: SelectionType::Single,
            required: true,
            options: vec![
                CustomizationOption {
                    id: "regular".into(),
                    label: LocalizedText::single("en", "Regular"),
                    price: 0,
                    default: true,
                },
                CustomizationOption {
                    id: "large".into(),
                    label: LocalizedText::single("en", "Large"),
                    price: 50,
                    default: false,
                },
            ],
        }]);
        latte
    }

    #[test]
    fn espresso_and_burger_totals() {
        let mut cart = Cart::new();
        cart.add_line(&item("Espresso", 350, 3), None).unwrap();
        cart.add_line(&item("Burger & Fries", 1490, 18), None).unwrap();

        assert_eq!(cart.total_price(), 1840);
        assert_eq!(cart.estimated_prep_time(), 18);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn empty_cart_has_no_prep_time() {
        let cart = Cart::new();
        assert_eq!(cart.estimated_prep_time(), 0);
        assert_eq!(cart.total_price(), 0);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn same_selection_merges_different_selection_splits() {
        let latte = sized_item();
        let large = CustomizationSelection::new().with_single("size", "large");
        let mut cart = Cart::new();

        cart.add_line(&latte, Some(&large)).unwrap();
        cart.add_line(&latte, Some(&large)).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);

        cart.add_line(&latte, None).unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn explicit_default_matches_implicit_default() {
        let latte = sized_item();
        let regular = CustomizationSelection::new().with_single("size", "regular");
        let mut cart = Cart::new();

        cart.add_line(&latte, None).unwrap();
        cart.add_line(&latte, Some(&regular)).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn remove_decrements_then_deletes() {
        let espresso = item("Espresso", 350, 3);
        let mut cart = Cart::new();
        cart.add_line(&espresso, None).unwrap();
        cart.add_line(&espresso, None).unwrap();

        assert_eq!(cart.remove_line(LineRef::Item(espresso.id)).unwrap(), 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.remove_line(LineRef::Item(espresso.id)).unwrap(), 0);
        assert!(cart.is_empty());
        assert_eq!(
            cart.remove_line(LineRef::Item(espresso.id)),
            Err(CartError::LineNotFound)
        );
    }

    #[test]
    fn remove_by_item_refuses_ambiguous_lines() {
        let latte = sized_item();
        let large = CustomizationSelection::new().with_single("size", "large");
        let mut cart = Cart::new();
        cart.add_line(&latte, None).unwrap();
        let large_line = cart.add_line(&latte, Some(&large)).unwrap();

        assert!(matches!(
            cart.remove_line(LineRef::Item(latte.id)),
            Err(CartError::AmbiguousLine { ref line_ids, .. }) if line_ids.len() == 2
        ));

        cart.remove_line(LineRef::Line(large_line.line_id)).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].unit_price, 480);
    }

    #[test]
    fn unavailable_items_are_refused() {
        let mut soup = item("Salmon Soup", 1250, 10);
        soup.available = false;
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_line(&soup, None),
            Err(CartError::Unavailable(soup.id))
        );
    }

    #[test]
    fn total_items_tracks_any_sequence() {
        let a = item("A", 100, 1);
        let b = item("B", 200, 2);
        let mut cart = Cart::new();
        // `None` adds one; `Some(expected)` removes one and checks the result.
        let ops: [(&MenuItem, Option<Result<u32, CartError>>); 7] = [
            (&a, None),
            (&b, None),
            (&a, None),
            (&a, Some(Ok(1))),
            (&b, Some(Ok(0))),
            (&b, Some(Err(CartError::LineNotFound))),
            (&b, None),
        ];
        for (target, removal) in ops {
            match removal {
                None => {
                    cart.add_line(target, None).unwrap();
                }
                Some(expected) => {
                    assert_eq!(cart.remove_line(LineRef::Item(target.id)), expected);
                }
            }
            let sum: u32 = cart.lines().iter().map(|l| l.quantity).sum();
            assert_eq!(cart.total_items(), sum);
            assert!(cart.lines().iter().all(|l| l.quantity >= 1));
        }
        assert_eq!(cart.total_items(), 2);
    }
}
