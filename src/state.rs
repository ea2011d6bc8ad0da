use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::model::Dataset;
use crate::data::source::{DataSource, DatasetCache};
use crate::request::{Outcome, handle_request};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the dataset is acquired from.
    pub source: DataSource,

    /// Loaded dataset (None if acquisition failed).
    pub dataset: Option<Arc<Dataset>>,

    /// Acquisition failure shown instead of the selection form.
    pub load_error: Option<String>,

    /// Contents of the column-name text box.
    pub selection_text: String,

    /// Result of the last Apply.
    pub outcome: Outcome,

    /// Maximum rows drawn in the preview table.
    pub preview_rows: usize,

    /// Status line (e.g. where the subset was saved).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            source: config.data_source(),
            dataset: None,
            load_error: None,
            selection_text: String::new(),
            outcome: Outcome::Idle,
            preview_rows: config.ui.preview_rows,
            status_message: None,
        }
    }

    /// Fetch the dataset for `self.source` through the process-wide cache.
    pub fn load_dataset(&mut self) {
        self.outcome = Outcome::Idle;
        match DatasetCache::global().get_or_load(&self.source) {
            Ok(dataset) => {
                log::info!(
                    "Dataset ready: {} rows, columns {:?}",
                    dataset.n_rows(),
                    dataset.column_names()
                );
                self.dataset = Some(dataset);
                self.load_error = None;
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.dataset = None;
                self.load_error = Some(format!("Could not load the dataset: {e}"));
            }
        }
    }

    /// Drop the cached dataset and acquire it again.
    pub fn reload(&mut self) {
        DatasetCache::global().invalidate();
        self.load_dataset();
    }

    /// Switch to a local file picked by the user.
    pub fn open_local(&mut self, path: PathBuf) {
        self.source = DataSource::Local(path);
        self.load_dataset();
    }

    /// Handle a click on Apply.
    pub fn apply(&mut self) {
        self.status_message = None;
        if let Some(ds) = &self.dataset {
            self.outcome = handle_request(ds, &self.selection_text, true);
        }
    }

    /// Append a column name to the text box, comma-separated.
    pub fn append_column(&mut self, name: &str) {
        let trimmed = self.selection_text.trim_end();
        if trimmed.is_empty() {
            self.selection_text = name.to_string();
        } else if trimmed.ends_with(',') {
            self.selection_text = format!("{trimmed} {name}");
        } else {
            self.selection_text = format!("{trimmed}, {name}");
        }
    }

    /// Write the current export artifact to `path`.
    pub fn save_subset(&mut self, path: &Path) {
        let Outcome::Success { artifact, .. } = &self.outcome else {
            return;
        };
        match std::fs::write(path, artifact.bytes()) {
            Ok(()) => {
                log::info!("Saved subset to {}", path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save subset: {e}");
                self.status_message = Some(format!("Error: could not save {}: {e}", path.display()));
            }
        }
    }
}
