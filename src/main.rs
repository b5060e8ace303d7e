//! # DUR Collector CLI (`dur`)
//!
//! ## Usage
//!
//! ```bash
//! dur [--config ./dur.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dur collect` | Fetch, filter, enrich and write the DUR table |
//! | `dur sample` | Write the offline sample CSV and EMR JSON |
//! | `dur categories` | List configured categories and keyword counts |
//! | `dur preview <file>` | Show the first rows and summary of a written table |
//! | `dur completions <shell>` | Print a shell completion script |
//!
//! `collect` needs the data.go.kr service key in the environment
//! (`DATA_GO_KR_API_KEY` unless `api.key_env` says otherwise).

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use dur_collector::config::{self, ApiCredentials};
use dur_collector::connector_dur::DurApiSource;
use dur_collector::export;
use dur_collector::logging::{self, LogSink, TracingSink};
use dur_collector::pipeline::{self, RunOptions};
use dur_collector::progress::ProgressMode;
use dur_collector::sample;
use dur_collector::stats;

/// Pulls drug-interaction records from data.go.kr and writes a filtered,
/// deduplicated table for EMR import.
#[derive(Parser)]
#[command(
    name = "dur",
    about = "Collect DUR drug-interaction records for target therapeutic categories",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: paginate, filter, enrich, write.
    Collect {
        /// Maximum number of pages to request (overrides `collect.max_pages`).
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output CSV path (overrides `collect.output`).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Skip printing the sample rows after writing.
        #[arg(long)]
        no_preview: bool,

        /// Progress display on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Generate sample data offline (no API key needed).
    Sample {
        #[arg(long, default_value = "hypertension_diabetes_drugs.csv")]
        csv: PathBuf,

        #[arg(long, default_value = "drug_interactions.json")]
        json: PathBuf,
    },

    /// List the configured keyword categories.
    Categories,

    /// Print the first rows and a summary of a written table.
    Preview {
        path: PathBuf,

        /// Number of rows to show (defaults to `collect.preview_rows`).
        #[arg(long, short = 'n')]
        rows: Option<usize>,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        command,
    } = Cli::parse();

    logging::init_tracing();
    let log = TracingSink;
    let load = || config::load_or_default(config_path.as_deref());

    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dur", &mut std::io::stdout());
        }
        Commands::Collect {
            max_pages,
            output,
            no_preview,
            progress,
        } => {
            let cfg = load()?;
            // Missing key is fatal before any request goes out.
            let creds = ApiCredentials::from_env(&cfg.api.key_env)?;
            let source = DurApiSource::new(&cfg.api, &creds)
                .context("Failed to build HTTP client")?;

            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            let reporter = mode.reporter();
            let opts = RunOptions { max_pages, output };

            let summary = pipeline::run_collect(&cfg, &source, &opts, &log, reporter.as_ref())?;

            println!("collect");
            println!("  pages requested: {}", summary.pages_requested);
            println!("  failed pages: {}", summary.failed_pages);
            println!("  records collected: {}", summary.collected);
            println!("  records matched: {}", summary.matched);
            if summary.used_fallback {
                println!("  fallback: first {} unfiltered records", summary.enriched);
            }
            println!("  records enriched: {}", summary.enriched);

            match &summary.written {
                Some(w) => {
                    println!("  rows written: {} ({} duplicates dropped)", w.rows, w.duplicates_dropped);
                    println!("  output: {}", w.path.display());
                    if !no_preview {
                        let rows = export::dedup(&summary.items);
                        export::print_preview(
                            &mut std::io::stdout().lock(),
                            &rows,
                            cfg.collect.preview_rows,
                        )?;
                    }
                }
                None => println!("  nothing written"),
            }
        }
        Commands::Sample { csv, json } => {
            log.info("Generating sample drug database");
            let written = sample::write_csv(&csv, &log)?;
            let drugs = sample::write_json(&json, &log)?;
            if let Some(w) = written {
                println!("sample");
                println!("  csv: {} ({} rows)", w.path.display(), w.rows);
                println!("  json: {} ({} drugs)", json.display(), drugs);
                let rows = export::read(&w.path)?;
                export::print_preview(&mut std::io::stdout().lock(), &rows, 15)?;
            }
        }
        Commands::Categories => {
            let cfg = load()?;
            let table = cfg.category_table();
            println!("{:<20} {:>8}  KEYWORDS", "CATEGORY", "COUNT");
            for (name, set) in table.iter() {
                println!(
                    "{:<20} {:>8}  {}",
                    name,
                    set.len(),
                    set.keywords().join(", ")
                );
            }
        }
        Commands::Preview { path, rows } => {
            let cfg = load()?;
            let items = export::read(&path)?;
            let rows = rows.unwrap_or(cfg.collect.preview_rows);
            let mut out = std::io::stdout().lock();
            export::print_preview(&mut out, &items, rows)?;
            writeln!(out)?;
            let summary = stats::summarize(&items, &cfg.category_table());
            stats::print_stats(&mut out, &summary)?;
        }
    }

    Ok(())
}
