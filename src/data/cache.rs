use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::Result;

use super::loader::load_file;
use super::model::ObservationTable;

/// Process-lifetime memo of the one observation table.
///
/// The first successful [`DatasetCache::get`] parses the file; later calls
/// hand out the same `Arc`. A failed load is returned and not remembered.
pub struct DatasetCache {
    path: PathBuf,
    slot: Mutex<Option<Arc<ObservationTable>>>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            slot: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached table, loading it on first use.
    pub fn get(&self) -> Result<Arc<ObservationTable>> {
        // The slot only ever holds a fully built table, so a poisoned lock is still usable.
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }

        let started = Instant::now();
        self.loads.fetch_add(1, Ordering::Relaxed);
        let table = Arc::new(load_file(&self.path)?);
        log::info!(
            "Loaded {} observations with {} columns from {} in {:.2?}",
            table.len(),
            table.columns.len(),
            self.path.display(),
            started.elapsed()
        );
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// How many times the file has actually been parsed.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_once_across_calls() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Year,Season,Location_Type,Scientific_Name,Observer").unwrap();
        writeln!(file, "2020,Spring,Forest,Turdus migratorius,Ann").unwrap();
        file.flush().unwrap();

        let cache = DatasetCache::new(file.path());
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        let third = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn failed_load_is_not_memoised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let cache = DatasetCache::new(&path);
        assert!(cache.get().is_err());

        std::fs::write(
            &path,
            "Year,Season,Location_Type,Scientific_Name,Observer\n2021,Fall,Forest,Sitta carolinensis,Bob\n",
        )
        .unwrap();
        let table = cache.get().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(cache.load_count(), 2);
    }
}
