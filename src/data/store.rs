use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{Context, Result};

use super::catalog::load_catalog;
use super::loader::ingest;
use super::model::MoleculeDataset;
use crate::config::DatasetConfig;

// ---------------------------------------------------------------------------
// Dataset sources
// ---------------------------------------------------------------------------

/// Something that can produce a dataset for a root directory.
pub trait DatasetSource {
    fn load(&self, root: &Path) -> Result<MoleculeDataset>;
}

/// Reads config, catalog and molecule files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DatasetSource for FsSource {
    fn load(&self, root: &Path) -> Result<MoleculeDataset> {
        let config = DatasetConfig::load(root)?;
        let labels = load_catalog(&config.catalog_path())
            .with_context(|| format!("reading catalog {}", config.catalog_path().display()))?;
        let dataset = ingest(&config, &labels)
            .with_context(|| format!("ingesting dataset in {}", root.display()))?;
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Memoizing store
// ---------------------------------------------------------------------------

/// One cache entry. The lock serializes loads for this key only, so a
/// failed attempt is reported to its own caller and the next one retries.
#[derive(Default)]
struct Slot {
    dataset: OnceLock<Arc<MoleculeDataset>>,
    load_lock: Mutex<()>,
}

/// Process-wide cache of loaded datasets, keyed by dataset root.
///
/// At most one load runs per key: the first caller fills the slot while
/// concurrent callers for the same key block until it is ready. A failed
/// load leaves the slot empty so the next call retries.
pub struct DatasetStore<S = FsSource> {
    source: S,
    slots: Mutex<HashMap<PathBuf, Arc<Slot>>>,
}

impl Default for DatasetStore<FsSource> {
    fn default() -> Self {
        Self::new(FsSource)
    }
}

impl<S: DatasetSource> DatasetStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached dataset for `root`, loading it on first use.
    pub fn get_or_load(&self, root: &Path) -> Result<Arc<MoleculeDataset>> {
        let key = cache_key(root);
        let slot = self.slot_for(&key);
        if let Some(ds) = slot.dataset.get() {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(ds));
        }

        let _guard = slot.load_lock.lock().unwrap_or_else(|p| p.into_inner());
        // Another caller may have finished while we waited.
        if let Some(ds) = slot.dataset.get() {
            return Ok(Arc::clone(ds));
        }

        log::info!("Loading dataset from {}", key.display());
        let dataset = Arc::new(self.source.load(&key)?);
        Ok(Arc::clone(slot.dataset.get_or_init(|| dataset)))
    }

    /// Drop the cached dataset for `root`; the next request reloads it.
    pub fn invalidate(&self, root: &Path) {
        let key = cache_key(root);
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        if slots.remove(&key).is_some() {
            log::info!("Invalidated cached dataset for {}", key.display());
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    fn slot_for(&self, key: &Path) -> Arc<Slot> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(slots.entry(key.to_path_buf()).or_default())
    }
}

/// Canonical form of a root so `data`, `./data` and `/abs/data` share a key.
fn cache_key(root: &Path) -> PathBuf {
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CrossSectionSeries, MoleculeRecord, StructurePayload};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSource {
        loads: AtomicUsize,
        fail_first: bool,
    }

    impl DatasetSource for CountingSource {
        fn load(&self, _root: &Path) -> Result<MoleculeDataset> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if self.fail_first && n == 0 {
                anyhow::bail!("simulated failure");
            }
            let record = MoleculeRecord {
                id: "CO".to_string(),
                label: "CO".to_string(),
                mass: Some(28.0),
                series: CrossSectionSeries::new(vec![10.0], vec![1.0]).unwrap(),
                structure: StructurePayload::from_text("END\n"),
            };
            Ok(MoleculeDataset::new(vec![record], Vec::new()))
        }
    }

    #[test]
    fn second_request_is_served_from_cache() {
        let store = DatasetStore::new(CountingSource::default());
        let a = store.get_or_load(Path::new("/nonexistent/alecs")).unwrap();
        let b = store.get_or_load(Path::new("/nonexistent/alecs")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.source().loads.load(Ordering::SeqCst), 1);
        assert_eq!(b.get("CO").unwrap().series, a.get("CO").unwrap().series);
    }

    #[test]
    fn concurrent_requests_share_one_load() {
        let store = DatasetStore::new(CountingSource::default());
        let store = &store;
        let results: Vec<Arc<MoleculeDataset>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(move || store.get_or_load(Path::new("/nonexistent/alecs")).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(store.source().loads.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn failed_load_is_retried() {
        let store = DatasetStore::new(CountingSource {
            fail_first: true,
            ..Default::default()
        });
        assert!(store.get_or_load(Path::new("/nonexistent/alecs")).is_err());
        assert!(store.get_or_load(Path::new("/nonexistent/alecs")).is_ok());
        assert_eq!(store.source().loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let store = DatasetStore::new(CountingSource::default());
        store.get_or_load(Path::new("/nonexistent/alecs")).unwrap();
        store.invalidate(Path::new("/nonexistent/alecs"));
        store.get_or_load(Path::new("/nonexistent/alecs")).unwrap();
        assert_eq!(store.source().loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fs_source_reads_a_dataset_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("BEB")).unwrap();
        std::fs::create_dir_all(root.join("pdbs")).unwrap();
        std::fs::write(root.join("molLatex.txt"), "CO CO\n").unwrap();
        std::fs::write(root.join("alecs.toml"), "header_lines = 0\n").unwrap();
        std::fs::write(root.join("BEB/CO.dat"), "10 1\n20 2\n").unwrap();
        std::fs::write(root.join("pdbs/CO.pdb"), "END\n").unwrap();

        let store = DatasetStore::<FsSource>::default();
        let ds = store.get_or_load(root).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get("CO").unwrap().series.energy(), &[10.0, 20.0]);
        assert_eq!(ds.get("CO").unwrap().mass, None);
    }
}
