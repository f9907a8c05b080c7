//! Record store: the single in-memory source of truth for all queries.
//!
//! The dataset is loaded at most once per process and then shared
//! read-only behind an `Arc`. A failed load is reported and retried on
//! the next acquire.

pub mod parse;

use crate::error::{LoadError, QueryError, QueryResult};
use crate::models::Dataset;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Supplies the raw row document the store validates.
pub trait RecordSource: Send + Sync {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Fetch the raw document (a JSON array of row objects).
    fn fetch(&self) -> Result<Value, LoadError>;
}

/// Reads rows from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Value, LoadError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Lazily-initialized, shared-immutable dataset.
pub struct RecordStore {
    source: Box<dyn RecordSource>,
    cached: OnceCell<Arc<Dataset>>,
}

impl RecordStore {
    pub fn new(source: impl RecordSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cached: OnceCell::new(),
        }
    }

    /// Store backed by a JSON file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileSource::new(path))
    }

    /// Load the dataset, or return the cached one after the first success.
    ///
    /// Reads after the first success are lock-free. Concurrent first
    /// callers wait for a single read of the source.
    pub fn load(&self) -> Result<Arc<Dataset>, LoadError> {
        self.cached
            .get_or_try_init(|| {
                debug!("Loading job data from {}", self.source.describe());
                let dataset = parse::parse_dataset(self.source.fetch()?)?;
                info!("Successfully loaded {} job records", dataset.len());
                Ok::<_, LoadError>(Arc::new(dataset))
            })
            .map(Arc::clone)
    }

    /// Dataset for a query, or `DataUnavailable` when loading fails.
    pub fn acquire(&self) -> QueryResult<Arc<Dataset>> {
        self.load().map_err(|e| {
            warn!("Error loading job data: {}", e);
            QueryError::DataUnavailable
        })
    }

    /// Never waits on an in-flight load.
    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    const SAMPLE: &str = include_str!("../../fixtures/sample_jobs.json");

    /// Counts fetches and fails the first `failures` of them.
    struct CountingSource {
        document: Value,
        fetches: Arc<AtomicUsize>,
        failures: usize,
    }

    impl RecordSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn fetch(&self) -> Result<Value, LoadError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(LoadError::Layout("unavailable".to_string()));
            }
            Ok(self.document.clone())
        }
    }

    fn counting(failures: usize) -> (RecordStore, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let store = RecordStore::new(CountingSource {
            document: json!([{"Job_Title": "A", "auto_score": 1, "manual_score": 2}]),
            fetches: Arc::clone(&fetches),
            failures,
        });
        (store, fetches)
    }

    #[test]
    fn test_load_is_idempotent() {
        let (store, fetches) = counting(0);
        let first = store.load().unwrap();
        let second = store.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_reports_unavailable_then_retries() {
        let (store, fetches) = counting(1);

        assert_eq!(store.acquire().unwrap_err(), QueryError::DataUnavailable);
        assert!(!store.is_loaded());

        let dataset = store.acquire().unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(store.is_loaded());
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    struct SlowSource(Duration);

    impl RecordSource for SlowSource {
        fn describe(&self) -> String {
            "slow".to_string()
        }

        fn fetch(&self) -> Result<Value, LoadError> {
            std::thread::sleep(self.0);
            Ok(json!([{"Job_Title": "A", "auto_score": 1, "manual_score": 2}]))
        }
    }

    #[test]
    fn test_is_loaded_does_not_wait_for_inflight_load() {
        let store = Arc::new(RecordStore::new(SlowSource(Duration::from_millis(500))));
        let loader = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.load().map(|d| d.len()))
        };
        std::thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        assert!(!store.is_loaded());
        assert!(started.elapsed() < Duration::from_millis(200));

        assert_eq!(loader.join().unwrap().unwrap(), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let store = RecordStore::from_path("/nonexistent/job_data.json");
        assert!(matches!(store.load(), Err(LoadError::Io { .. })));
        assert_eq!(store.acquire().unwrap_err(), QueryError::DataUnavailable);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = RecordStore::from_path(file.path());
        let dataset = store.load().unwrap();

        // One fixture row has a non-numeric manual score.
        assert_eq!(dataset.len(), 7);
        assert!(dataset.levels_present.iter().all(|p| *p));
        assert!(dataset.records.iter().any(|r| !r.tasks.is_empty()));
    }

    #[test]
    fn test_invalid_json_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let store = RecordStore::from_path(file.path());
        assert!(matches!(store.load(), Err(LoadError::Parse(_))));
    }
}
