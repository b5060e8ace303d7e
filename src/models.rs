//! Core data models used throughout the collector.
//!
//! [`Record`] is the loose field map returned by the DUR API; a
//! [`ProcessedItem`] is the normalized four-column row that ends up in the
//! output table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product name field on DUR records.
pub const FIELD_ITEM_NAME: &str = "ITEM_NAME";
/// Active ingredient field on DUR and drug-info records.
pub const FIELD_INGREDIENT: &str = "INGR_NAME";
/// Combination / mixture product field on DUR records.
pub const FIELD_MIXTURE: &str = "MIXTURE_ITEM_NAME";
/// Restriction text field on DUR records.
pub const FIELD_PROHIBITION: &str = "PROHBT_CONTENT";
/// Caution text field on drug-info (secondary lookup) records.
pub const FIELD_CAUTION: &str = "CAUTION";

/// Raw item produced by a record source.
///
/// Untyped beyond a mapping of field name to string. Missing fields read
/// as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and static data.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Value of `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn name(&self) -> &str {
        self.get(FIELD_ITEM_NAME)
    }

    pub fn ingredient(&self) -> &str {
        self.get(FIELD_INGREDIENT)
    }

    pub fn mixture(&self) -> &str {
        self.get(FIELD_MIXTURE)
    }

    pub fn prohibition(&self) -> &str {
        self.get(FIELD_PROHIBITION)
    }

    pub fn caution(&self) -> &str {
        self.get(FIELD_CAUTION)
    }

    /// Convert a JSON object into a record.
    ///
    /// Strings are kept as-is, other scalars use their JSON text, and
    /// `null` fields are dropped. Returns `None` for non-objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut record = Record::new();
        for (key, v) in obj {
            match v {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => record.insert(key, s),
                other => record.insert(key, &other.to_string()),
            }
        }
        Some(record)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Normalized row written to the output table.
///
/// Identity is the `(drug_name, ingredient)` pair; see [`ProcessedItem::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub drug_name: String,
    pub ingredient: String,
    pub interaction_type: String,
    pub caution_text: String,
}

impl ProcessedItem {
    pub fn new(
        drug_name: impl Into<String>,
        ingredient: impl Into<String>,
        interaction_type: impl Into<String>,
        caution_text: impl Into<String>,
    ) -> Self {
        Self {
            drug_name: drug_name.into(),
            ingredient: ingredient.into(),
            interaction_type: interaction_type.into(),
            caution_text: caution_text.into(),
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.drug_name, &self.ingredient)
    }
}
