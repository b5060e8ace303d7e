//! The record source seam between the pipeline and the DUR API.
//!
//! [`RecordSource`] has one implementation that talks HTTP
//! ([`crate::connector_dur::DurApiSource`]); tests and the offline paths
//! plug in their own.

use crate::models::Record;

/// Failure of a single page fetch or lookup.
///
/// Always contained by the caller: the unit of work yields no result and
/// the batch continues.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },

    #[error("response is missing {expected}")]
    Shape { expected: String },
}

impl SourceError {
    /// Shape problems are expected now and then and only warrant a warning.
    pub fn is_shape(&self) -> bool {
        matches!(self, SourceError::Shape { .. })
    }
}

pub trait RecordSource {
    /// A label for log lines (e.g. `"dur-api"`).
    fn name(&self) -> &str;

    /// Fetch one page of DUR records. Pages are 1-based.
    ///
    /// `Ok(vec![])` means the data is exhausted.
    fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<Record>, SourceError>;

    /// Look up product details by name; at most one item.
    fn lookup(&self, item_name: &str) -> Result<Option<Record>, SourceError>;
}
