use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{CustomizationCategory, LocalizedText, SelectionType};

/// What the customer picked for one customization category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(BTreeSet<String>),
}

impl Selection {
    fn is_empty(&self) -> bool {
        matches!(self, Selection::Many(ids) if ids.is_empty())
    }
}

/// Category key -> selected option(s).
///
/// Equality ignores categories whose selection is an empty set, so an empty
/// `multiple` pick and an absent key compare equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct CustomizationSelection(BTreeMap<String, Selection>);

impl CustomizationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_single(mut self, key: impl Into<String>, option: impl Into<String>) -> Self {
        self.0.insert(key.into(), Selection::One(option.into()));
        self
    }

    pub fn with_multiple<I, S>(mut self, key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = options.into_iter().map(Into::into).collect();
        self.0.insert(key.into(), Selection::Many(ids));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Selection> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Selection::is_empty)
    }

    fn normalized(&self) -> impl Iterator<Item = (&String, &Selection)> {
        self.0.iter().filter(|(_, selection)| !selection.is_empty())
    }
}

impl PartialEq for CustomizationSelection {
    fn eq(&self, other: &Self) -> bool {
        self.normalized().eq(other.normalized())
    }
}

impl Eq for CustomizationSelection {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomizationError {
    #[error("a selection is required for '{0}'")]
    MissingRequired(String),

    #[error("unknown customization '{0}'")]
    UnknownCategory(String),

    #[error("unknown option '{option}' for '{category}'")]
    UnknownOption { category: String, option: String },

    #[error("'{0}' accepts exactly one option")]
    ExpectedSingle(String),

    #[error("invalid customization schema: {0}")]
    InvalidSchema(String),
}

/// A validated selection with its price and receipt labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCustomization {
    /// Base price plus every selected delta, never below zero.
    pub unit_price: i64,
    /// The selection with defaults filled in.
    pub selection: CustomizationSelection,
    /// Labels to echo on receipts, defaults of `single` categories excluded.
    pub summary: Vec<LocalizedText>,
}

/// Validates `selection` against `schema` and prices it.
pub fn resolve(
    base_price: i64,
    schema: Option<&[CustomizationCategory]>,
    selection: Option<&CustomizationSelection>,
) -> Result<ResolvedCustomization, CustomizationError> {
    let empty = CustomizationSelection::default();
    let selection = selection.unwrap_or(&empty);
    let schema = schema.unwrap_or(&[]);

    for (key, picked) in selection.normalized() {
        if !schema.iter().any(|category| &category.key == key) {
            tracing::debug!(category = %key, picked = ?picked, "selection for unknown category");
            return Err(CustomizationError::UnknownCategory(key.clone()));
        }
    }

    let mut unit_price = base_price;
    let mut resolved = CustomizationSelection::default();
    let mut summary = Vec::new();

    for category in schema {
        match category.selection {
            SelectionType::Single => {
                let picked = match selection.get(&category.key) {
                    Some(Selection::One(id)) => Some(id.as_str()),
                    Some(Selection::Many(ids)) if ids.is_empty() => None,
                    Some(Selection::Many(_)) => {
                        return Err(CustomizationError::ExpectedSingle(category.key.clone()));
                    }
                    None => None,
                };
                let option = match picked {
                    Some(id) => Some(category.option(id).ok_or_else(|| {
                        CustomizationError::UnknownOption {
                            category: category.key.clone(),
                            option: id.to_string(),
                        }
                    })?),
                    None => category.default_option(),
                };
                match option {
                    Some(option) => {
                        unit_price += option.price;
                        if !option.default {
                            summary.push(option.label.clone());
                        }
                        resolved = resolved.with_single(category.key.clone(), option.id.clone());
                    }
                    None if category.required => {
                        return Err(CustomizationError::MissingRequired(category.key.clone()));
                    }
                    None => {}
                }
            }
            SelectionType::Multiple => {
                let picked: BTreeSet<String> = match selection.get(&category.key) {
                    Some(Selection::One(id)) => BTreeSet::from([id.clone()]),
                    Some(Selection::Many(ids)) => ids.clone(),
                    None => BTreeSet::new(),
                };
                if let Some(unknown) = picked.iter().find(|id| category.option(id).is_none()) {
                    return Err(CustomizationError::UnknownOption {
                        category: category.key.clone(),
                        option: unknown.clone(),
                    });
                }
                // Schema order, so receipts read the way the menu lists them.
                for option in category.options.iter().filter(|o| picked.contains(&o.id)) {
                    unit_price += option.price;
                    summary.push(option.label.clone());
                }
                if !picked.is_empty() {
                    resolved = resolved.with_multiple(category.key.clone(), picked);
                }
            }
        }
    }

    Ok(ResolvedCustomization {
        unit_price: unit_price.max(0),
        selection: resolved,
        summary,
    })
}

/// Renders receipt labels in `locale`.
pub fn summary_text(summary: &[LocalizedText], locale: &str) -> Vec<String> {
    summary
        .iter()
        .map(|label| label.get(locale).to_string())
        .collect()
}

/// Checks a schema before it is stored on a menu item.
pub fn validate_schema(schema: &[CustomizationCategory]) -> Result<(), CustomizationError> {
    let mut keys = HashSet::new();
    for category in schema {
        if category.key.trim().is_empty() {
            return Err(CustomizationError::InvalidSchema(
                "category key must not be empty".into(),
            ));
        }
        if !keys.insert(category.key.as_str()) {
            return Err(CustomizationError::InvalidSchema(format!(
                "duplicate category '{}'",
                category.key
            )));
        }
        if category.options.is_empty() {
            return Err(CustomizationError::InvalidSchema(format!(
                "'{}' has no options",
                category.key
            )));
        }

        let mut ids = HashSet::new();
        for option in &category.options {
            if !ids.insert(option.id.as_str()) {
                return Err(CustomizationError::InvalidSchema(format!(
                    "duplicate option '{}' in '{}'",
                    option.id, category.key
                )));
            }
        }

        let defaults = category.options.iter().filter(|o| o.default).count();
        match category.selection {
            SelectionType::Single if defaults > 1 => {
                return Err(CustomizationError::InvalidSchema(format!(
                    "'{}' declares more than one default",
                    category.key
                )));
            }
            SelectionType::Multiple if defaults > 0 => {
                return Err(CustomizationError::InvalidSchema(format!(
                    "'{}' allows several options and cannot declare a default",
                    category.key
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
