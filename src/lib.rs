//! # DUR Collector
//!
//! A batch collector for Korean Drug Utilization Review (DUR) records.
//!
//! Pulls paginated interaction records from the data.go.kr open API, keeps
//! the ones relevant to configured therapeutic categories (hypertension and
//! diabetes by default), fills gaps with a name-keyed product lookup, and
//! writes a deduplicated CSV table for import into an EMR.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │  DUR API    │──▶│ Paginate │──▶│  Filter  │──▶│  Enrich  │──▶│ Dedup +  │
//! │ (data.go.kr)│   │ (collect)│   │(keywords)│   │ (lookup) │   │ CSV write│
//! └─────────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export DATA_GO_KR_API_KEY=...
//! dur collect                        # full run with built-in categories
//! dur collect --config dur.toml      # custom categories / limits
//! dur sample                         # offline sample CSV + EMR JSON
//! dur preview hypertension_diabetes_drugs.csv
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and API credentials |
//! | [`models`] | Records and processed rows |
//! | [`source`] | Record source trait and errors |
//! | [`connector_dur`] | data.go.kr HTTP connector |
//! | [`collect`] | Pagination driver |
//! | [`keywords`] | Category keyword classification |
//! | [`enrich`] | Secondary lookup enrichment |
//! | [`export`] | Dedup, CSV writing, preview |
//! | [`pipeline`] | Orchestration of a full run |
//! | [`sample`] | Offline sample data and EMR JSON |
//! | [`stats`] | Table summaries |
//! | [`logging`] | Injected log sink |
//! | [`progress`] | Progress reporting |

pub mod collect;
pub mod config;
pub mod connector_dur;
pub mod enrich;
pub mod export;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod sample;
pub mod source;
pub mod stats;
