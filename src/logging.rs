//! Leveled log sink passed into the pipeline.
//!
//! Pipeline code never calls the `tracing` macros directly; it receives a
//! [`LogSink`] so tests can capture messages with [`MemorySink`] instead of
//! installing a global subscriber. The CLI uses [`TracingSink`] after
//! calling [`init_tracing`].

use std::sync::{Mutex, Once};

pub use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `DUR_LOG=debug`).
pub const LOG_ENV: &str = "DUR_LOG";

static INIT: Once = Once::new();

/// Install the stderr `tracing` subscriber. Safe to call more than once.
///
/// Reads the filter from [`LOG_ENV`], falling back to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

/// A sink accepting leveled messages.
pub trait LogSink {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

/// Forwards messages to the process-wide `tracing` subscriber.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        // The tracing macros need a constant level.
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
    }
}

/// Records messages in memory, in emission order.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order_and_levels() {
        let sink = MemorySink::new();
        sink.info("page 1");
        sink.warn("shape");
        sink.error("boom");
        sink.info("page 2");

        assert_eq!(sink.entries().len(), 4);
        assert_eq!(sink.messages(Level::INFO), vec!["page 1", "page 2"]);
        assert!(sink.contains(Level::WARN, "shape"));
        assert!(!sink.contains(Level::ERROR, "shape"));
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing();
        init_tracing();
        TracingSink.info("still fine");
    }
}
