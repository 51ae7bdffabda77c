/// Dashboard layer: chart components over the filtered track table.
///
/// ```text
///   FilterSet ──► filter_cached ──► TrackTable (shared, memoized)
///                                        │
///              ┌─────────────┬───────────┼───────────┬─────────────┐
///              ▼             ▼           ▼           ▼             ▼
///          component     component   component   component  ...  (rayon)
///              │             │           │           │
///              └──── run_guarded: Payload + optional diagnostic ───┘
/// ```
pub mod boundary;
pub mod components;
pub mod controls;
pub mod payload;
pub mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use rayon::prelude::*;

use crate::data::cache::MemoCache;
use crate::data::filter::{self, FilterSet};
use crate::data::model::{Dataset, TrackTable};
use controls::{ControlSpec, ControlValues};
use payload::{Payload, SummaryCard};
use registry::Registry;

// ---------------------------------------------------------------------------
// Component interface
// ---------------------------------------------------------------------------

/// Faults a component update may report. Anything else reaching the
/// boundary is a panic.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("unknown audio feature '{0}'")]
    UnknownFeature(String),
    #[error("invalid value for control '{control}': {reason}")]
    InvalidControl { control: String, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything an update may read: the unfiltered table, the active filters
/// and the shared memo cache.
pub struct UpdateContext<'a> {
    pub table: &'a TrackTable,
    pub filters: &'a FilterSet,
    pub cache: &'a MemoCache,
}

impl UpdateContext<'_> {
    /// The filtered view; computed once per distinct filter set.
    pub fn filtered(&self) -> Arc<TrackTable> {
        filter::filter_cached(self.cache, self.table, self.filters)
    }

    pub fn dataset(&self) -> &Dataset {
        self.table.dataset()
    }
}

/// One chart or card group of the dashboard.
pub trait Component: Send + Sync {
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn description(&self) -> &'static str {
        ""
    }
    /// Widgets with their defaults. Options may depend on the dataset.
    fn layout(&self, dataset: &Dataset) -> Vec<ControlSpec>;
    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError>;
    /// Cards shown when an update fails.
    fn error_cards(&self) -> Vec<SummaryCard> {
        Vec::new()
    }
}

/// Result of one guarded update.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentUpdate {
    pub id: &'static str,
    pub payload: Payload,
    /// `"Error updating chart: ..."` when the update failed.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Owns the dataset, the memo cache and the component registry, and
/// recomputes every component for a filter change.
pub struct Dashboard {
    table: TrackTable,
    cache: Arc<MemoCache>,
    registry: Registry,
    layouts: Vec<Vec<ControlSpec>>,
    pool: rayon::ThreadPool,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, cache: Arc<MemoCache>, registry: Registry, workers: usize) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dashboard-{i}"))
            .build()
            .context("building dashboard thread pool")?;
        let layouts = registry.iter().map(|c| c.layout(&dataset)).collect();
        log::debug!(
            "Dashboard ready: {} components, {} tracks, {} workers",
            registry.len(),
            dataset.len(),
            pool.current_num_threads()
        );
        Ok(Dashboard {
            table: TrackTable::full(dataset),
            cache,
            registry,
            layouts,
            pool,
        })
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        self.table.dataset()
    }

    pub fn table(&self) -> &TrackTable {
        &self.table
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Components paired with their declared controls, in display order.
    pub fn layouts(&self) -> impl Iterator<Item = (&dyn Component, &[ControlSpec])> {
        self.registry
            .iter()
            .zip(self.layouts.iter().map(Vec::as_slice))
    }

    /// Default control values for every component.
    pub fn default_controls(&self) -> BTreeMap<&'static str, ControlValues> {
        self.layouts()
            .map(|(c, specs)| (c.id(), ControlValues::from_defaults(specs)))
            .collect()
    }

    pub fn filtered(&self, filters: &FilterSet) -> Arc<TrackTable> {
        filter::filter_cached(&self.cache, &self.table, filters)
    }

    /// Update every component. Components without an entry in `controls`
    /// use their defaults. Order follows the registry.
    pub fn refresh(&self, filters: &FilterSet, controls: &BTreeMap<&'static str, ControlValues>) -> Vec<ComponentUpdate> {
        // Warm the filter cache once rather than racing every component on it.
        let filtered = self.filtered(filters);
        log::debug!("Refreshing {} components over {} rows", self.registry.len(), filtered.len());

        let ctx = UpdateContext {
            table: &self.table,
            filters,
            cache: &self.cache,
        };
        let jobs: Vec<(&dyn Component, &[ControlSpec])> = self.layouts().collect();
        self.pool.install(|| {
            jobs.par_iter()
                .map(|(component, specs)| match controls.get(component.id()) {
                    Some(values) => boundary::run_guarded(*component, &ctx, values),
                    None => boundary::run_guarded(*component, &ctx, &ControlValues::from_defaults(specs)),
                })
                .collect()
        })
    }

    /// Update a single component, e.g. after one of its own controls changed.
    pub fn refresh_one(&self, id: &str, filters: &FilterSet, values: &ControlValues) -> Option<ComponentUpdate> {
        let component = self.registry.get(id)?;
        let ctx = UpdateContext {
            table: &self.table,
            filters,
            cache: &self.cache,
        };
        Some(boundary::run_guarded(component, &ctx, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::RangeFilter;
    use crate::data::model::Track;

    fn dataset() -> Arc<Dataset> {
        let tracks = (0..20)
            .map(|i| Track {
                artists: Some(format!("Artist {}", i % 4)),
                genres: Some(if i % 2 == 0 { "['pop', 'dance pop']" } else { "['rock']" }.to_string()),
                popularity: Some(f64::from(i * 5)),
                danceability: Some(f64::from(i) / 20.0),
                energy: Some(1.0 - f64::from(i) / 20.0),
                tempo: Some(80.0 + f64::from(i) * 5.0),
                duration_ms: Some(180_000.0 + f64::from(i) * 1000.0),
                ..Default::default()
            })
            .collect();
        Arc::new(Dataset::from_tracks(tracks, vec!["artists".into(), "genres".into()]))
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(dataset(), Arc::new(MemoCache::new()), Registry::standard(), 2).unwrap()
    }

    #[test]
    fn test_refresh_covers_registry_in_order() {
        let dash = dashboard();
        let updates = dash.refresh(&FilterSet::default(), &BTreeMap::new());
        let ids: Vec<_> = updates.iter().map(|u| u.id).collect();
        let expected: Vec<_> = dash.registry().iter().map(|c| c.id()).collect();
        assert_eq!(ids, expected);
        assert!(updates.iter().all(|u| u.error.is_none()), "{updates:#?}");
    }

    #[test]
    fn test_filter_computed_once_per_refresh() {
        let dash = dashboard();
        let filters = FilterSet {
            popularity: Some(RangeFilter::new(50.0, 100.0)),
            ..Default::default()
        };
        dash.refresh(&filters, &BTreeMap::new());
        assert_eq!(dash.cache().stats().misses, 1);
        dash.refresh(&filters, &BTreeMap::new());
        assert_eq!(dash.cache().stats().misses, 1);
    }

    #[test]
    fn test_refresh_one_unknown_id() {
        let dash = dashboard();
        assert!(dash
            .refresh_one("nope", &FilterSet::default(), &ControlValues::new())
            .is_none());
    }
}
