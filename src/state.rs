use std::sync::Arc;

use crate::dashboard::DashboardSnapshot;
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterDimension, FilterOptions, FilterSelection, filtered_indices};
use crate::data::model::{FieldValue, FilteredView, ObservationTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None when the load failed).
    pub dataset: Option<Arc<ObservationTable>>,

    /// Values offered per filter dimension.
    pub options: FilterOptions,

    /// Current sidebar selections.
    pub selection: FilterSelection,

    /// Indices of observations passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// KPIs and charts for `visible_indices`.
    pub snapshot: Option<DashboardSnapshot>,

    /// Load error shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Rows shown in the records preview.
    pub preview_rows: usize,

    dirty: bool,
}

impl AppState {
    /// Pull the dataset from the cache. A load failure leaves the state
    /// without a dataset and with `load_error` set.
    pub fn from_cache(cache: &DatasetCache, preview_rows: usize) -> Self {
        let mut state = AppState {
            dataset: None,
            options: FilterOptions::default(),
            selection: FilterSelection::default(),
            visible_indices: Vec::new(),
            snapshot: None,
            load_error: None,
            preview_rows,
            dirty: false,
        };
        match cache.get() {
            Ok(table) => {
                log::debug!("Dataset ready after {} load(s)", cache.load_count());
                state.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", cache.path().display());
                state.load_error = Some(format!("{e:#}"));
            }
        }
        state
    }

    /// Ingest the loaded dataset and select every option.
    pub fn set_dataset(&mut self, dataset: Arc<ObservationTable>) {
        self.options = FilterOptions::from_table(&dataset);
        self.selection = FilterSelection::all(&self.options);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.dirty = true;
        self.refresh();
    }

    /// Re-run the whole filter-and-aggregate pipeline if a selection changed.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.selection);
        let view = FilteredView::new(ds, &self.visible_indices);
        self.snapshot = Some(DashboardSnapshot::compute(&view));
        log::debug!(
            "Recomputed dashboard: {} of {} observations visible",
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: FilterDimension, value: &FieldValue) {
        self.selection.toggle(dim, value);
        self.dirty = true;
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: FilterDimension) {
        self.selection.select_all(dim, &self.options);
        self.dirty = true;
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: FilterDimension) {
        self.selection.select_none(dim);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn loaded() -> AppState {
        let cache = DatasetCache::new("unused.csv");
        let mut state = AppState::from_cache(&cache, 10);
        assert!(state.load_error.is_some());
        state.set_dataset(Arc::new(sample_table()));
        state
    }

    #[test]
    fn dataset_starts_fully_selected() {
        let state = loaded();
        assert!(state.load_error.is_none());
        assert_eq!(state.visible_indices.len(), 5);
        assert_eq!(state.snapshot.as_ref().unwrap().kpis.total_observations, 5);
    }

    #[test]
    fn changes_apply_on_refresh() {
        let mut state = loaded();
        state.toggle_filter_value(FilterDimension::Year, &FieldValue::Integer(2021));
        assert_eq!(state.visible_indices.len(), 5);
        state.refresh();
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.snapshot.as_ref().unwrap().kpis.total_observations, 2);

        state.select_none(FilterDimension::LocationType);
        state.refresh();
        assert!(state.visible_indices.is_empty());

        state.select_all(FilterDimension::LocationType);
        state.select_all(FilterDimension::Year);
        state.refresh();
        assert_eq!(state.visible_indices.len(), 5);
    }

    #[test]
    fn load_failure_keeps_dashboard_empty() {
        let cache = DatasetCache::new("/no/such/birds.csv");
        let mut state = AppState::from_cache(&cache, 10);
        state.refresh();
        assert!(state.dataset.is_none());
        assert!(state.snapshot.is_none());
        assert!(state.load_error.as_deref().unwrap().contains("birds.csv"));
    }
}
