//! Keyword-based therapeutic category classification.
//!
//! A record belongs to a category when any of the category's keywords is a
//! substring of its lowercased product name or lowercased ingredient.
//! Matching is plain containment: no tokenizing, no word boundaries.

use std::collections::BTreeMap;

use crate::models::Record;

/// Ordered set of lowercase match substrings for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Lowercases every keyword and drops empty entries and repeats, keeping
    /// first occurrence. Surrounding whitespace is part of the keyword.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for k in keywords {
            let k = k.as_ref().to_lowercase();
            if !k.is_empty() && !out.contains(&k) {
                out.push(k);
            }
        }
        Self { keywords: out }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True if any keyword occurs in any of `haystacks` (already lowercased).
    pub fn matches_any(&self, haystacks: &[&str]) -> bool {
        self.keywords
            .iter()
            .any(|k| haystacks.iter().any(|h| h.contains(k.as_str())))
    }
}

/// Category name → keyword set, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<(String, KeywordSet)>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: &BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::new();
        for (name, keywords) in map {
            table.insert(name, KeywordSet::new(keywords));
        }
        table
    }

    /// Adds a category, replacing one of the same name in place.
    pub fn insert(&mut self, name: &str, set: KeywordSet) {
        match self.categories.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = set,
            None => self.categories.push((name.to_string(), set)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KeywordSet> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeywordSet)> {
        self.categories.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Names of every category matching `name` or `ingredient`.
    pub fn classify_fields(&self, name: &str, ingredient: &str) -> Vec<&str> {
        let name = name.to_lowercase();
        let ingredient = ingredient.to_lowercase();
        let fields = [name.as_str(), ingredient.as_str()];
        self.categories
            .iter()
            .filter(|(_, set)| set.matches_any(&fields))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn classify(&self, record: &Record) -> Vec<&str> {
        self.classify_fields(record.name(), record.ingredient())
    }

    pub fn is_relevant(&self, record: &Record) -> bool {
        !self.classify(record).is_empty()
    }
}

/// Records matching at least one category, in input order.
pub fn filter(records: &[Record], categories: &CategoryTable) -> Vec<Record> {
    records
        .iter()
        .filter(|r| categories.is_relevant(r))
        .cloned()
        .collect()
}
