//! Deduplicate processed items and write them as a CSV table.
//!
//! The file starts with a UTF-8 byte-order mark so spreadsheet tools open
//! Hangul text correctly, followed by a header row
//! `drug_name,ingredient,interaction_type,caution_text`. Rows are unique
//! on `(drug_name, ingredient)`; the first occurrence wins.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::logging::LogSink;
use crate::models::ProcessedItem;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub duplicates_dropped: usize,
}

/// First occurrence of each `(drug_name, ingredient)` pair, in input order.
pub fn dedup(items: &[ProcessedItem]) -> Vec<ProcessedItem> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.key()))
        .cloned()
        .collect()
}

/// Deduplicate `items` and write them to `path`.
///
/// An empty input logs a warning and leaves the filesystem untouched,
/// returning `None`.
pub fn write(
    items: &[ProcessedItem],
    path: &Path,
    log: &dyn LogSink,
) -> Result<Option<WriteSummary>> {
    if items.is_empty() {
        log.warn("No rows to save; skipping write");
        return Ok(None);
    }

    let rows = dedup(items);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let bytes = to_csv_bytes(&rows)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    let summary = WriteSummary {
        path: path.to_path_buf(),
        rows: rows.len(),
        duplicates_dropped: items.len() - rows.len(),
    };
    log.info(&format!(
        "Saved {} rows to {} ({} duplicates dropped)",
        summary.rows,
        path.display(),
        summary.duplicates_dropped
    ));
    Ok(Some(summary))
}

/// Serialize rows as BOM-prefixed CSV with a header row.
pub fn to_csv_bytes(rows: &[ProcessedItem]) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// Read a table written by [`write`]. A leading BOM is optional.
pub fn read(path: &Path) -> Result<Vec<ProcessedItem>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    from_csv_bytes(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn from_csv_bytes(bytes: &[u8]) -> Result<Vec<ProcessedItem>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(body);
    let mut items = Vec::new();
    for row in reader.deserialize() {
        items.push(row?);
    }
    Ok(items)
}

/// Fixed-width text table of the first `rows` items.
pub fn render_preview(items: &[ProcessedItem], rows: usize) -> String {
    const WIDTHS: [usize; 4] = [28, 24, 14, 40];
    let mut out = String::new();

    let header = format_row(
        ["drug_name", "ingredient", "interaction_type", "caution_text"],
        WIDTHS,
    );
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(WIDTHS.iter().sum::<usize>() + 3 * 3));
    out.push('\n');

    for item in items.iter().take(rows) {
        out.push_str(&format_row(
            [
                item.drug_name.as_str(),
                item.ingredient.as_str(),
                item.interaction_type.as_str(),
                item.caution_text.as_str(),
            ],
            WIDTHS,
        ));
        out.push('\n');
    }

    if items.len() > rows {
        out.push_str(&format!("... {} more rows\n", items.len() - rows));
    }
    out
}

fn format_row(cells: [&str; 4], widths: [usize; 4]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(c, w)| {
            let flat = c.replace(['\n', '\r'], " ");
            let t = truncate(&flat, *w);
            let pad = w.saturating_sub(t.chars().count());
            format!("{}{}", t, " ".repeat(pad))
        })
        .collect();
    cells.join(" | ").trim_end().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Write the preview to `out`; used by the CLI after saving.
pub fn print_preview(out: &mut dyn Write, items: &[ProcessedItem], rows: usize) -> Result<()> {
    writeln!(out, "\n=== Saved data sample ===")?;
    write!(out, "{}", render_preview(items, rows))?;
    Ok(())
}
