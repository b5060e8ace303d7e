//! Summary statistics for a processed table.
//!
//! Used by `dur preview` to give a quick sense of what a collected file
//! contains: interaction type breakdown, category coverage, and how many
//! rows are still missing an ingredient or caution text after enrichment.

use std::collections::BTreeMap;
use std::io::Write;

use crate::keywords::CategoryTable;
use crate::models::ProcessedItem;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    pub total: usize,
    pub by_interaction_type: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub uncategorized: usize,
    pub missing_ingredient: usize,
    pub missing_caution: usize,
}

pub fn summarize(items: &[ProcessedItem], categories: &CategoryTable) -> TableStats {
    let mut stats = TableStats {
        total: items.len(),
        ..Default::default()
    };
    for name in categories.names() {
        stats.by_category.insert(name.to_string(), 0);
    }

    for item in items {
        let kind = if item.interaction_type.is_empty() {
            "(none)"
        } else {
            item.interaction_type.as_str()
        };
        *stats.by_interaction_type.entry(kind.to_string()).or_default() += 1;

        let matched = categories.classify_fields(&item.drug_name, &item.ingredient);
        if matched.is_empty() {
            stats.uncategorized += 1;
        }
        for name in matched {
            *stats.by_category.entry(name.to_string()).or_default() += 1;
        }

        if item.ingredient.is_empty() {
            stats.missing_ingredient += 1;
        }
        if item.caution_text.is_empty() {
            stats.missing_caution += 1;
        }
    }
    stats
}

pub fn print_stats(out: &mut dyn Write, stats: &TableStats) -> std::io::Result<()> {
    writeln!(out, "Rows:                {}", stats.total)?;
    writeln!(out, "Missing ingredient:  {}", stats.missing_ingredient)?;
    writeln!(out, "Missing caution:     {}", stats.missing_caution)?;
    writeln!(out)?;
    writeln!(out, "  {:<24} {:>8}", "CATEGORY", "ROWS")?;
    for (name, count) in &stats.by_category {
        writeln!(out, "  {:<24} {:>8}", name, count)?;
    }
    writeln!(out, "  {:<24} {:>8}", "(uncategorized)", stats.uncategorized)?;
    writeln!(out)?;
    writeln!(out, "  {:<24} {:>8}", "INTERACTION TYPE", "ROWS")?;
    for (kind, count) in &stats.by_interaction_type {
        writeln!(out, "  {:<24} {:>8}", kind, count)?;
    }
    Ok(())
}
