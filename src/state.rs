use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tune_stats::dashboard::controls::ControlValues;
use tune_stats::dashboard::registry::Registry;
use tune_stats::dashboard::{ComponentUpdate, Dashboard};
use tune_stats::data::cache::MemoCache;
use tune_stats::data::filter::{self, FilterControls};
use tune_stats::data::loader;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dashboard (None until user loads a file).
    pub dashboard: Option<Dashboard>,

    /// Raw values of the filter panel inputs.
    pub filters: FilterControls,

    /// Per-component control values, keyed by component id.
    pub controls: BTreeMap<&'static str, ControlValues>,

    /// Latest update of every component, in registry order.
    pub updates: Vec<ComponentUpdate>,

    /// Rows passing the current filters.
    pub filtered_rows: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Path of the loaded file.
    pub source: Option<PathBuf>,

    cache: Arc<MemoCache>,
    workers: usize,
}

impl AppState {
    pub fn new(workers: usize) -> Self {
        Self {
            dashboard: None,
            filters: FilterControls::default(),
            controls: BTreeMap::new(),
            updates: Vec::new(),
            filtered_rows: 0,
            status_message: None,
            source: None,
            cache: Arc::new(MemoCache::new()),
            workers,
        }
    }

    /// Load a dataset and reset every control to its default.
    pub fn load(&mut self, path: &Path) -> anyhow::Result<()> {
        let dataset = loader::get_data(&self.cache, path)?;
        let dashboard = Dashboard::new(dataset, Arc::clone(&self.cache), Registry::standard(), self.workers)?;
        log::info!(
            "Loaded {} tracks with columns {:?}",
            dashboard.dataset().len(),
            dashboard.dataset().column_names
        );
        self.filters = FilterControls::default();
        self.controls = dashboard.default_controls();
        self.dashboard = Some(dashboard);
        self.source = Some(path.to_path_buf());
        self.status_message = None;
        self.refresh_all();
        Ok(())
    }

    /// Load, reporting failures in the status bar.
    pub fn load_or_report(&mut self, path: &Path) {
        if let Err(e) = self.load(path) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Recompute every component after a filter change.
    pub fn refresh_all(&mut self) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        let filters = self.filters.to_filter_set();
        self.filtered_rows = dashboard.filtered(&filters).len();
        self.updates = dashboard.refresh(&filters, &self.controls);
    }

    /// Recompute one component after one of its own controls changed.
    pub fn refresh_component(&mut self, id: &str) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        let Some(values) = self.controls.get(id) else {
            return;
        };
        let filters = self.filters.to_filter_set();
        if let Some(update) = dashboard.refresh_one(id, &filters, values) {
            if let Some(slot) = self.updates.iter_mut().find(|u| u.id == update.id) {
                *slot = update;
            }
        }
    }

    /// `"filtered / total rows"` for the filter panel.
    pub fn count_label(&self) -> Option<String> {
        let dashboard = self.dashboard.as_ref()?;
        Some(filter::result_count_label(self.filtered_rows, dashboard.dataset().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tune_stats::dashboard::controls::ControlValue;
    use tune_stats::dashboard::payload::Figure;

    fn write_csv(dir: &Path) -> PathBuf {
        let path = dir.join("tracks.csv");
        let mut body = String::from("artists,genres,popularity,danceability,energy,valence,tempo,duration_ms\n");
        for i in 0..12 {
            body.push_str(&format!(
                "Artist {},\"['pop', 'rock']\",{},0.{},0.5,0.5,{},200000\n",
                i % 3,
                40 + i,
                i % 10,
                100 + i
            ));
        }
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_then_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(1);
        state.load(&write_csv(dir.path())).unwrap();
        assert_eq!(state.updates.len(), Registry::standard().len());
        assert_eq!(state.count_label().as_deref(), Some("12 / 12 rows"));

        state.filters.tempo.min = 200.0;
        state.refresh_all();
        assert_eq!(state.filtered_rows, 0);
        let cards = state.updates.iter().find(|u| u.id == "data_cards").unwrap();
        assert_eq!(cards.payload.cards[0].value, "No Data");
    }

    #[test]
    fn test_control_change_refreshes_one_component() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(1);
        state.load(&write_csv(dir.path())).unwrap();
        let id = "audio_feature_correlation_matrix";
        state
            .controls
            .get_mut(id)
            .unwrap()
            .set("features", ControlValue::List(vec!["energy".into()]));
        state.refresh_component(id);
        let update = state
            .updates
            .iter()
            .find(|u| u.id == "audio_feature_correlation_matrix")
            .unwrap();
        assert!(matches!(update.payload.figure, Figure::InsufficientSelection(_)));
    }

    #[test]
    fn test_load_failure_is_reported() {
        let mut state = AppState::new(1);
        state.load_or_report(Path::new("/nonexistent/tracks.csv"));
        assert!(state.status_message.is_some());
        assert!(state.dashboard.is_none());
    }
}
