use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::PipelineError;
use super::loader::{Source, load_source};
use super::model::{CategoricalColumn, Dataset};

/// Reads a dataset from its source. The cache calls this at most once per
/// source id.
pub trait SourceReader: Send + Sync {
    fn read(&self, source: &Source) -> anyhow::Result<Dataset>;
}

impl<F> SourceReader for F
where
    F: Fn(&Source) -> anyhow::Result<Dataset> + Send + Sync,
{
    fn read(&self, source: &Source) -> anyhow::Result<Dataset> {
        self(source)
    }
}

/// Reads local files directly and remote sources over HTTP.
#[derive(Debug, Clone)]
pub struct DefaultReader {
    pub timeout: Duration,
}

impl Default for DefaultReader {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl SourceReader for DefaultReader {
    fn read(&self, source: &Source) -> anyhow::Result<Dataset> {
        load_source(source, self.timeout)
    }
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Memoizes loaded datasets by source id. Entries are never invalidated;
/// failed loads are not stored.
pub struct DatasetCache {
    reader: Box<dyn SourceReader>,
    entries: Mutex<HashMap<String, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(reader: impl SourceReader + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the dataset for `source_id`, reading it on first use.
    pub fn load(&self, source_id: &str) -> Result<Arc<Dataset>, PipelineError> {
        // Held across the read so a source is fetched once even under contention.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = entries.get(source_id) {
            log::debug!("Dataset cache hit for {source_id}");
            return Ok(Arc::clone(dataset));
        }

        let source = Source::parse(source_id);
        let dataset = self.reader.read(&source).map_err(|e| {
            log::error!("Failed to load {source_id}: {e:#}");
            PipelineError::DataUnavailable {
                source_id: source_id.to_string(),
                reason: format!("{e:#}"),
            }
        })?;

        log::info!(
            "Loaded {} records from {source_id} ({} species, {} islands)",
            dataset.len(),
            dataset.distinct_values(CategoricalColumn::Species).len(),
            dataset.distinct_values(CategoricalColumn::Island).len(),
        );
        let dataset = Arc::new(dataset);
        entries.insert(source_id.to_string(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn is_cached(&self, source_id: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(source_id)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DefaultReader::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads and fails for ids containing "broken".
    struct CountingReader {
        reads: Arc<AtomicUsize>,
    }

    impl SourceReader for CountingReader {
        fn read(&self, source: &Source) -> anyhow::Result<Dataset> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Source::Local(path) = source {
                if path.to_string_lossy().contains("broken") {
                    anyhow::bail!("CSV missing column(s) 'species'");
                }
            }
            Ok(Dataset::from_records(vec![record("A", "X", Some(1.0))]))
        }
    }

    fn counting_cache() -> (DatasetCache, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingReader {
            reads: Arc::clone(&reads),
        });
        (cache, reads)
    }

    #[test]
    fn test_second_load_hits_cache() {
        let (cache, reads) = counting_cache();

        let first = cache.load("fixtures/penguins.csv").unwrap();
        let second = cache.load("fixtures/penguins.csv").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached("fixtures/penguins.csv"));
    }

    #[test]
    fn test_sources_are_cached_independently() {
        let (cache, reads) = counting_cache();

        let a = cache.load("a.csv").unwrap();
        let b = cache.load("b.csv").unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_load_is_data_unavailable_and_not_cached() {
        let (cache, reads) = counting_cache();

        let err = cache.load("broken.csv").unwrap_err();
        match &err {
            PipelineError::DataUnavailable { source_id, reason } => {
                assert_eq!(source_id, "broken.csv");
                assert!(reason.contains("species"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!cache.is_cached("broken.csv"));

        assert!(cache.load("broken.csv").is_err());
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_reader_loads_local_file_once() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex"
        )
        .unwrap();
        writeln!(file, "Adelie,Dream,39.5,17.4,186,3800,Female").unwrap();
        file.flush().unwrap();

        let cache = DatasetCache::default();
        let id = file.path().to_string_lossy().to_string();
        let first = cache.load(&id).unwrap();
        assert_eq!(first.len(), 1);

        // Removing the file proves the second call never touches the disk.
        let path = file.into_temp_path();
        path.close().unwrap();
        let second = cache.load(&id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_reader_schema_mismatch() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "species,island\nAdelie,Dream").unwrap();
        file.flush().unwrap();

        let cache = DatasetCache::default();
        let err = cache.load(&file.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
        assert!(err.to_string().contains("CSV missing column(s) 'bill_length_mm'"));
    }

    #[test]
    fn test_concurrent_loads_read_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let cache = Arc::new(DatasetCache::new(move |_: &Source| -> anyhow::Result<Dataset> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Dataset::from_records(vec![record("A", "X", Some(1.0))]))
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.load("penguins.csv").unwrap())
            })
            .collect();
        let loaded: Vec<Arc<Dataset>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(loaded.iter().all(|d| Arc::ptr_eq(d, &loaded[0])));
    }
}
