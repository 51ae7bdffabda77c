//! End-to-end scenarios: file on disk → loader → filters → every component.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tune_stats::dashboard::boundary::run_guarded;
use tune_stats::dashboard::controls::{ControlSpec, ControlValues};
use tune_stats::dashboard::payload::{Figure, Payload};
use tune_stats::dashboard::registry::Registry;
use tune_stats::dashboard::{Component, ComponentError, ComponentUpdate, Dashboard, UpdateContext};
use tune_stats::data::cache::MemoCache;
use tune_stats::data::filter::{FilterControls, FilterSet, RangeFilter};
use tune_stats::data::loader;
use tune_stats::data::model::{Dataset, TrackTable};

const GENRES: [&str; 4] = ["['pop', 'dance pop']", "['rock']", "['jazz', 'cool jazz']", "[]"];

/// 1000 tracks; only rows 0, 1 and 2 reach popularity 80.
fn write_tracks(dir: &Path) -> PathBuf {
    let path = dir.join("tracks.csv");
    let mut body = String::from(
        "artists,genres,popularity,danceability,energy,valence,acousticness,tempo,duration_ms,key,mode\n",
    );
    for i in 0..1000u32 {
        let popularity = match i {
            0 => 80,
            1 => 90,
            2 => 100,
            _ => i % 80,
        };
        body.push_str(&format!(
            "Artist {},\"{}\",{},{:.3},{:.3},{:.3},{:.3},{},{},{},{}\n",
            i % 37,
            GENRES[i as usize % GENRES.len()],
            popularity,
            f64::from(i % 100) / 100.0,
            f64::from((i * 7) % 100) / 100.0,
            f64::from((i * 13) % 100) / 100.0,
            f64::from((i * 3) % 100) / 100.0,
            70 + i % 120,
            150_000 + (i % 60) * 1000,
            i % 12,
            i % 2,
        ));
    }
    std::fs::write(&path, body).unwrap();
    path
}

fn dashboard(dir: &Path) -> Dashboard {
    let cache = Arc::new(MemoCache::new());
    let dataset = loader::get_data(&cache, &write_tracks(dir)).unwrap();
    Dashboard::new(dataset, cache, Registry::standard(), 2).unwrap()
}

fn update<'a>(updates: &'a [ComponentUpdate], id: &str) -> &'a ComponentUpdate {
    updates.iter().find(|u| u.id == id).unwrap()
}

#[test]
fn test_default_refresh_has_no_faults() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dashboard(dir.path());
    assert_eq!(dash.dataset().len(), 1000);

    let updates = dash.refresh(&FilterControls::default().to_filter_set(), &BTreeMap::new());
    assert_eq!(updates.len(), 12);
    for u in &updates {
        assert!(u.error.is_none(), "{}: {:?}", u.id, u.error);
        assert!(!matches!(u.payload.figure, Figure::Failed), "{}", u.id);
    }
}

#[test]
fn test_popularity_range_drives_data_cards() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dashboard(dir.path());
    let mut controls = FilterControls::default();
    controls.popularity.min = 80.0;

    let updates = dash.refresh(&controls.to_filter_set(), &BTreeMap::new());
    let cards = &update(&updates, "data_cards").payload.cards;
    assert_eq!(cards[0].value, "3");
    assert_eq!(cards[1].value, "90.0");
}

#[test]
fn test_single_correlation_feature_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dashboard(dir.path());
    let values = ControlValues::new().with("features", vec!["energy".to_string()]);
    let u = dash
        .refresh_one("audio_feature_correlation_matrix", &FilterSet::default(), &values)
        .unwrap();
    assert!(matches!(u.payload.figure, Figure::InsufficientSelection(_)));
    assert!(u.error.is_none());
}

#[test]
fn test_absent_box_plot_genre_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dashboard(dir.path());
    let values = ControlValues::new().with("genres", vec!["polka".to_string()]);
    let u = dash
        .refresh_one("audio_feature_distribution", &FilterSet::default(), &values)
        .unwrap();
    assert_eq!(u.payload.figure, Figure::NoData("No data available for selected genres".into()));
}

#[test]
fn test_inverted_tempo_range_is_no_data_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dashboard(dir.path());
    let values = ControlValues::new().with("tempo_min", 180.0).with("tempo_max", 60.0);
    let u = dash
        .refresh_one("tempo_energy_density_plot", &FilterSet::default(), &values)
        .unwrap();
    assert!(matches!(u.payload.figure, Figure::NoData(_)));
    assert!(u.error.is_none());

    // The same inversion on the global filter empties every component.
    let filters = FilterSet {
        tempo: Some(RangeFilter::new(180.0, 60.0)),
        ..Default::default()
    };
    let updates = dash.refresh(&filters, &BTreeMap::new());
    assert!(updates.iter().all(|u| u.error.is_none()));
    assert_eq!(update(&updates, "data_cards").payload.cards[0].value, "No Data");
}

struct Exploding;

impl Component for Exploding {
    fn id(&self) -> &'static str {
        "exploding"
    }

    fn title(&self) -> &'static str {
        "Exploding"
    }

    fn layout(&self, _dataset: &Dataset) -> Vec<ControlSpec> {
        Vec::new()
    }

    fn update(&self, ctx: &UpdateContext<'_>, _controls: &ControlValues) -> Result<Payload, ComponentError> {
        let rows = ctx.filtered().len();
        panic!("index out of range: {rows}");
    }
}

#[test]
fn test_boundary_turns_panic_into_diagnostic() {
    let table = TrackTable::full(Arc::new(Dataset::from_tracks(Vec::new(), Vec::new())));
    let cache = MemoCache::new();
    let ctx = UpdateContext {
        table: &table,
        filters: &FilterSet::default(),
        cache: &cache,
    };
    let u = run_guarded(&Exploding, &ctx, &ControlValues::new());
    assert_eq!(u.payload.figure, Figure::Failed);
    let error = u.error.unwrap();
    assert!(error.starts_with("Error updating chart: index out of range: 0"), "{error}");
}

#[test]
fn test_sibling_components_survive_a_fault() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(MemoCache::new());
    let dataset = loader::get_data(&cache, &write_tracks(dir.path())).unwrap();
    let registry = Registry::new(vec![Box::new(Exploding), Box::new(tune_stats::dashboard::components::DataCards)]);
    let dash = Dashboard::new(dataset, cache, registry, 2).unwrap();

    let updates = dash.refresh(&FilterSet::default(), &BTreeMap::new());
    assert!(updates[0].error.is_some());
    assert!(updates[1].error.is_none());
    assert_eq!(updates[1].payload.cards[0].value, "1,000");
}
