//! Pagination driver.
//!
//! Walks pages 1..=`max_pages` of a [`RecordSource`], stopping at the first
//! page that comes back empty. A page that fails (transport, status, bad
//! JSON, unexpected shape) is logged and skipped; it contributes nothing but
//! does not end the walk.

use std::time::Duration;

use crate::logging::LogSink;
use crate::models::Record;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::source::RecordSource;

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub max_pages: u32,
    pub page_size: u32,
    /// Pause between consecutive page requests.
    pub delay: Duration,
}

/// Outcome of one collection pass.
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<Record>,
    /// Requests issued, including failed ones.
    pub calls: u32,
    pub failed_pages: Vec<u32>,
    /// Whether an empty page ended the walk before `max_pages`.
    pub exhausted: bool,
}

pub fn collect(
    source: &dyn RecordSource,
    options: &CollectOptions,
    log: &dyn LogSink,
    progress: &dyn ProgressReporter,
) -> Collected {
    let mut out = Collected::default();

    for page in 1..=options.max_pages {
        if page > 1 && !options.delay.is_zero() {
            std::thread::sleep(options.delay);
        }

        progress.report(ProgressEvent::Paging {
            page,
            max_pages: options.max_pages,
        });
        log.info(&format!(
            "Fetching {} page {}/{}",
            source.name(),
            page,
            options.max_pages
        ));

        out.calls += 1;
        match source.fetch_page(page, options.page_size) {
            Ok(records) if records.is_empty() => {
                log.info(&format!("Page {} is empty; collection complete", page));
                out.exhausted = true;
                break;
            }
            Ok(records) => {
                log.debug(&format!("Page {} returned {} records", page, records.len()));
                out.records.extend(records);
            }
            Err(e) if e.is_shape() => {
                log.warn(&format!("Page {} has unexpected shape: {}", page, e));
                out.failed_pages.push(page);
            }
            Err(e) => {
                log.error(&format!("Page {} fetch failed: {}", page, e));
                out.failed_pages.push(page);
            }
        }
    }

    log.info(&format!(
        "Collected {} records in {} requests",
        out.records.len(),
        out.calls
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Level, MemorySink};
    use crate::models::FIELD_ITEM_NAME;
    use crate::progress::NoProgress;
    use crate::source::SourceError;
    use std::cell::RefCell;
    use std::time::Instant;

    /// Serves a scripted sequence of page results and counts calls.
    struct ScriptedPages {
        pages: Vec<Result<usize, bool>>,
        calls: RefCell<Vec<u32>>,
    }

    impl ScriptedPages {
        /// `Ok(n)` is a page of `n` records; `Err(true)` a shape error,
        /// `Err(false)` a transport error. Pages past the script are empty.
        fn new(pages: Vec<Result<usize, bool>>) -> Self {
            Self {
                pages,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RecordSource for ScriptedPages {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch_page(&self, page: u32, _page_size: u32) -> Result<Vec<Record>, SourceError> {
            self.calls.borrow_mut().push(page);
            match self.pages.get(page as usize - 1) {
                None => Ok(Vec::new()),
                Some(Ok(n)) => Ok((0..*n)
                    .map(|i| Record::new().with(FIELD_ITEM_NAME, &format!("p{}-{}", page, i)))
                    .collect()),
                Some(Err(true)) => Err(SourceError::Shape {
                    expected: "body.items".into(),
                }),
                Some(Err(false)) => Err(SourceError::Transport {
                    url: "http://test".into(),
                    message: "timed out".into(),
                }),
            }
        }

        fn lookup(&self, _item_name: &str) -> Result<Option<Record>, SourceError> {
            Ok(None)
        }
    }

    fn opts(max_pages: u32) -> CollectOptions {
        CollectOptions {
            max_pages,
            page_size: 100,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_stops_at_first_empty_page() {
        let src = ScriptedPages::new(vec![Ok(100), Ok(100), Ok(0), Ok(100)]);
        let out = collect(&src, &opts(20), &MemorySink::new(), &NoProgress);
        assert_eq!(out.records.len(), 200);
        assert_eq!(out.calls, 3);
        assert_eq!(*src.calls.borrow(), vec![1, 2, 3]);
        assert!(out.exhausted);
    }

    #[test]
    fn test_never_exceeds_max_pages() {
        let src = ScriptedPages::new(vec![Ok(5); 10]);
        let out = collect(&src, &opts(4), &MemorySink::new(), &NoProgress);
        assert_eq!(out.calls, 4);
        assert_eq!(out.records.len(), 20);
        assert!(!out.exhausted);
    }

    #[test]
    fn test_arrival_order_kept() {
        let src = ScriptedPages::new(vec![Ok(2), Ok(1)]);
        let out = collect(&src, &opts(5), &MemorySink::new(), &NoProgress);
        let names: Vec<&str> = out.records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["p1-0", "p1-1", "p2-0"]);
    }

    #[test]
    fn test_failed_page_is_skipped_not_terminal() {
        let src = ScriptedPages::new(vec![Ok(3), Err(false), Err(true), Ok(2)]);
        let log = MemorySink::new();
        let out = collect(&src, &opts(10), &log, &NoProgress);
        assert_eq!(out.records.len(), 5);
        assert_eq!(out.failed_pages, vec![2, 3]);
        assert_eq!(out.calls, 5);
        assert!(log.contains(Level::ERROR, "Page 2"));
        assert!(log.contains(Level::WARN, "Page 3"));
    }

    #[test]
    fn test_first_page_empty() {
        let src = ScriptedPages::new(vec![Ok(0)]);
        let out = collect(&src, &opts(20), &MemorySink::new(), &NoProgress);
        assert!(out.records.is_empty());
        assert_eq!(out.calls, 1);
    }

    #[test]
    fn test_delay_between_consecutive_pages() {
        let delay = Duration::from_millis(20);
        let src = ScriptedPages::new(vec![Ok(1), Ok(1), Ok(0)]);
        let options = CollectOptions {
            delay,
            ..opts(20)
        };
        let start = Instant::now();
        let out = collect(&src, &options, &MemorySink::new(), &NoProgress);
        assert_eq!(out.calls, 3);
        assert!(start.elapsed() >= delay * 2, "took {:?}", start.elapsed());
    }

    #[test]
    fn test_single_page_has_no_delay() {
        let delay = Duration::from_millis(500);
        let src = ScriptedPages::new(vec![Ok(0)]);
        let options = CollectOptions {
            delay,
            ..opts(20)
        };
        let start = Instant::now();
        collect(&src, &options, &MemorySink::new(), &NoProgress);
        assert!(start.elapsed() < delay, "took {:?}", start.elapsed());
    }
}
