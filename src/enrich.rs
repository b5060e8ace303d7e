//! Record → [`ProcessedItem`] conversion with a name-keyed fallback lookup.
//!
//! When a record lacks an ingredient or caution text, the product name is
//! looked up once through [`RecordSource::lookup`] and the blanks are filled
//! from the result's `INGR_NAME` / `CAUTION`. Populated fields are never
//! overwritten, and a failed lookup leaves the item as extracted.

use std::time::Duration;

use crate::logging::LogSink;
use crate::models::{ProcessedItem, Record};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::source::RecordSource;

pub struct Enricher<'a> {
    source: &'a dyn RecordSource,
    log: &'a dyn LogSink,
    /// Pause after every lookup request.
    delay: Duration,
}

impl<'a> Enricher<'a> {
    pub fn new(source: &'a dyn RecordSource, log: &'a dyn LogSink, delay: Duration) -> Self {
        Self { source, log, delay }
    }

    pub fn enrich(&self, record: &Record) -> ProcessedItem {
        let mut item = extract(record);

        if item.ingredient.is_empty() || item.caution_text.is_empty() {
            if let Some(info) = self.lookup(&item.drug_name) {
                merge_missing(&mut item, &info);
            }
        }

        item
    }

    /// Enrich every record in order, reporting progress per record.
    pub fn enrich_all(
        &self,
        records: &[Record],
        progress: &dyn ProgressReporter,
    ) -> Vec<ProcessedItem> {
        let total = records.len() as u64;
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let item = self.enrich(record);
                progress.report(ProgressEvent::Enriching {
                    n: i as u64 + 1,
                    total,
                });
                item
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<Record> {
        if name.is_empty() {
            return None;
        }

        let result = self.source.lookup(name);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        match result {
            Ok(found) => found,
            Err(e) if e.is_shape() => {
                self.log
                    .warn(&format!("Lookup for '{}' has unexpected shape: {}", name, e));
                None
            }
            Err(e) => {
                self.log
                    .error(&format!("Lookup for '{}' failed: {}", name, e));
                None
            }
        }
    }
}

/// The four output fields as they appear on the DUR record.
pub fn extract(record: &Record) -> ProcessedItem {
    ProcessedItem::new(
        record.name(),
        record.ingredient(),
        record.mixture(),
        record.prohibition(),
    )
}

/// Fill blank ingredient / caution text from a lookup result.
pub fn merge_missing(item: &mut ProcessedItem, info: &Record) {
    if item.ingredient.is_empty() && !info.ingredient().is_empty() {
        item.ingredient = info.ingredient().to_string();
    }
    if item.caution_text.is_empty() && !info.caution().is_empty() {
        item.caution_text = info.caution().to_string();
    }
}
