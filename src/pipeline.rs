//! End-to-end collection run.
//!
//! Coordinates the batch: paginated collection → category filter →
//! enrichment → dedup + CSV write. Per-page and per-lookup failures are
//! absorbed by the stages themselves. Anything that escapes here (writing
//! the output, mostly) is logged and aborts the run; there is no partial
//! recovery, a failed run starts over.

use anyhow::Result;
use std::path::PathBuf;

use crate::collect::{collect, CollectOptions};
use crate::config::Config;
use crate::enrich::Enricher;
use crate::export::{self, WriteSummary};
use crate::keywords;
use crate::logging::LogSink;
use crate::models::ProcessedItem;
use crate::progress::ProgressReporter;
use crate::source::RecordSource;

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub max_pages: Option<u32>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct CollectSummary {
    pub pages_requested: u32,
    pub failed_pages: usize,
    pub collected: usize,
    pub matched: usize,
    /// True when nothing matched and the first unfiltered records were used.
    pub used_fallback: bool,
    pub enriched: usize,
    /// The enriched items, before dedup; kept for the CLI preview.
    pub items: Vec<ProcessedItem>,
    pub written: Option<WriteSummary>,
}

pub fn run_collect(
    config: &Config,
    source: &dyn RecordSource,
    options: &RunOptions,
    log: &dyn LogSink,
    progress: &dyn ProgressReporter,
) -> Result<CollectSummary> {
    let result = run_stages(config, source, options, log, progress);
    if let Err(ref e) = result {
        log.error(&format!("Collection run failed: {:#}", e));
    }
    result
}

fn run_stages(
    config: &Config,
    source: &dyn RecordSource,
    options: &RunOptions,
    log: &dyn LogSink,
    progress: &dyn ProgressReporter,
) -> Result<CollectSummary> {
    let mut summary = CollectSummary::default();
    log.info("Starting DUR collection");

    let collect_opts = CollectOptions {
        max_pages: options.max_pages.unwrap_or(config.collect.max_pages),
        page_size: config.api.page_size,
        delay: config.collect.page_delay(),
    };
    let collected = collect(source, &collect_opts, log, progress);
    summary.pages_requested = collected.calls;
    summary.failed_pages = collected.failed_pages.len();
    summary.collected = collected.records.len();

    if collected.records.is_empty() {
        log.error("No DUR records collected; nothing to write");
        return Ok(summary);
    }

    let categories = config.category_table();
    let mut selected = keywords::filter(&collected.records, &categories);
    summary.matched = selected.len();
    log.info(&format!(
        "{} of {} records match categories [{}]",
        selected.len(),
        collected.records.len(),
        categories.names().join(", ")
    ));

    if selected.is_empty() {
        let limit = config.collect.fallback_limit;
        log.warn(&format!(
            "No records matched any category; using the first {} unfiltered records",
            limit
        ));
        selected = collected.records.iter().take(limit).cloned().collect();
        summary.used_fallback = true;
    }

    let enricher = Enricher::new(source, log, config.collect.lookup_delay());
    let items = enricher.enrich_all(&selected, progress);
    summary.enriched = items.len();

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| config.collect.output.clone());
    summary.written = export::write(&items, &output, log)?;
    summary.items = items;

    log.info("DUR collection complete");
    Ok(summary)
}
