use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::SlotColors;
use crate::data::constants::MAX_SELECTIONS;
use crate::data::model::{CrossSectionSeries, MoleculeDataset, MoleculeRecord};
use crate::data::store::{DatasetSource, DatasetStore};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Root directory of the loaded dataset.
    pub data_root: Option<PathBuf>,

    /// Loaded dataset (None until a dataset folder is opened).
    pub dataset: Option<Arc<MoleculeDataset>>,

    /// Selected molecule identifiers, in selection order.
    pub selected: Vec<String>,

    /// Curve colour per selection slot.
    pub colors: SlotColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load (or fetch from the store's cache) the dataset at `root`.
    pub fn open_dataset<S: DatasetSource>(&mut self, store: &DatasetStore<S>, root: &Path) {
        match store.get_or_load(root) {
            Ok(dataset) => {
                log::info!(
                    "Dataset at {} has {} molecules",
                    root.display(),
                    dataset.len()
                );
                self.set_dataset(root.to_path_buf(), dataset);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Drop the cached copy of the current dataset and read it again.
    pub fn reload<S: DatasetSource>(&mut self, store: &DatasetStore<S>) {
        if let Some(root) = self.data_root.clone() {
            store.invalidate(&root);
            self.open_dataset(store, &root);
        }
    }

    /// Ingest a newly loaded dataset. Selections that still exist are kept.
    pub fn set_dataset(&mut self, root: PathBuf, dataset: Arc<MoleculeDataset>) {
        self.selected.retain(|id| dataset.get(id).is_some());
        self.data_root = Some(root);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn can_select_more(&self) -> bool {
        self.selected.len() < MAX_SELECTIONS
    }

    /// Add or remove `id` from the selection. Returns `false` when the
    /// selection is full and `id` was not added.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            return true;
        }
        if !self.can_select_more() {
            return false;
        }
        self.selected.push(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected records in selection order.
    pub fn selected_records(&self) -> Vec<&MoleculeRecord> {
        match &self.dataset {
            Some(ds) => ds.select(&self.selected),
            None => Vec::new(),
        }
    }

    /// `(identifier, series)` pairs for the CSV export.
    pub fn csv_columns(&self) -> Vec<(&str, &CrossSectionSeries)> {
        self.selected_records()
            .into_iter()
            .map(|r| (r.id.as_str(), &r.series))
            .collect()
    }
}
