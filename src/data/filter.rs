use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cache::{CacheKey, MemoCache};
use super::model::{Track, TrackTable};
use crate::dashboard::payload::format_count;

/// Multi-select value meaning "no restriction".
pub const ALL_SENTINEL: &str = "all";

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Category restriction. `All` passes every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    AnyOf(BTreeSet<String>),
}

impl CategoryFilter {
    /// Build from a multi-select value: empty or containing `all` → [`CategoryFilter::All`].
    pub fn from_selection<I, S>(selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected: BTreeSet<String> = selection.into_iter().map(Into::into).collect();
        if selected.is_empty() || selected.contains(ALL_SENTINEL) {
            CategoryFilter::All
        } else {
            CategoryFilter::AnyOf(selected)
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CategoryFilter::AnyOf(_))
    }
}

/// Inclusive numeric range. `min > max` is legal and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        RangeFilter { min, max }
    }

    /// Missing values never match.
    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if self.min <= v && v <= self.max)
    }
}

/// The complete set of active predicates. `None` / `All` means inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub genres: CategoryFilter,
    pub artists: CategoryFilter,
    pub popularity: Option<RangeFilter>,
    pub energy: Option<RangeFilter>,
    pub danceability: Option<RangeFilter>,
    pub valence: Option<RangeFilter>,
    pub tempo: Option<RangeFilter>,
    /// Compared against `duration_ms / 1000`.
    pub duration_secs: Option<RangeFilter>,
}

impl FilterSet {
    /// True when no predicate is active.
    pub fn is_identity(&self) -> bool {
        !self.genres.is_active()
            && !self.artists.is_active()
            && self.ranges().iter().all(|(r, _)| r.is_none())
    }

    fn ranges(&self) -> [(Option<RangeFilter>, fn(&Track) -> Option<f64>); 6] {
        [
            (self.popularity, |t: &Track| t.popularity),
            (self.energy, |t: &Track| t.energy),
            (self.danceability, |t: &Track| t.danceability),
            (self.valence, |t: &Track| t.valence),
            (self.tempo, |t: &Track| t.tempo),
            (self.duration_secs, Track::duration_secs),
        ]
    }

    /// Whether one track satisfies every active predicate.
    pub fn matches(&self, track: &Track) -> bool {
        if let CategoryFilter::AnyOf(selected) = &self.genres {
            let listed = match track.genres.as_deref() {
                Some(raw) if !raw.is_empty() && raw != "[]" => raw,
                _ => return false,
            };
            if !selected.iter().any(|genre| listed.contains(genre.as_str())) {
                return false;
            }
        }
        if let CategoryFilter::AnyOf(selected) = &self.artists {
            match track.artists.as_deref() {
                Some(artist) if selected.contains(artist) => {}
                _ => return false,
            }
        }
        self.ranges()
            .iter()
            .all(|(range, value)| range.map_or(true, |r| r.contains(value(track))))
    }

    /// Exact, order-stable text form used as cache key.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Return the rows of `table` passing all active filters.
///
/// Pure: the input view is untouched and the result shares its dataset.
pub fn apply(table: &TrackTable, filters: &FilterSet) -> TrackTable {
    if filters.is_identity() {
        return table.clone();
    }
    log::debug!("Filtering {} rows with {:?}", table.len(), filters);
    let filtered = table.select(|t| filters.matches(t));
    log::debug!("Filtering complete: {} rows remain", filtered.len());
    filtered
}

/// Memoized [`apply`], keyed by table and filter fingerprints.
pub fn filter_cached(cache: &MemoCache, table: &TrackTable, filters: &FilterSet) -> Arc<TrackTable> {
    let key = CacheKey::new(
        "filter::apply",
        format!("{}|{}", table.fingerprint(), filters.fingerprint()),
    );
    cache.get_or_insert_with(key, || apply(table, filters))
}

/// `"filtered / total rows"` label shown under the filter panel.
pub fn result_count_label(filtered: usize, total: usize) -> String {
    format!("{} / {} rows", format_count(filtered), format_count(total))
}

// ---------------------------------------------------------------------------
// Control surface: the raw values of the 14 filter inputs
// ---------------------------------------------------------------------------

/// Bounds and defaults of one numeric range input pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

pub const POPULARITY_BOUNDS: RangeBounds = RangeBounds { label: "Popularity Range (0-100)", min: 0.0, max: 100.0, step: 1.0 };
pub const ENERGY_BOUNDS: RangeBounds = RangeBounds { label: "Energy Level (0.0-1.0)", min: 0.0, max: 1.0, step: 0.01 };
pub const DANCEABILITY_BOUNDS: RangeBounds = RangeBounds { label: "Danceability (0.0-1.0)", min: 0.0, max: 1.0, step: 0.01 };
pub const VALENCE_BOUNDS: RangeBounds = RangeBounds { label: "Musical Positivity (Valence) (0.0-1.0)", min: 0.0, max: 1.0, step: 0.01 };
pub const TEMPO_BOUNDS: RangeBounds = RangeBounds { label: "Tempo (BPM) (0-220)", min: 0.0, max: 220.0, step: 1.0 };
pub const DURATION_BOUNDS: RangeBounds = RangeBounds { label: "Song Duration (18-5400 seconds)", min: 18.0, max: 5400.0, step: 1.0 };

/// Current value of a range input pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeInput {
    pub min: f64,
    pub max: f64,
}

impl RangeInput {
    pub fn full(bounds: &RangeBounds) -> Self {
        RangeInput { min: bounds.min, max: bounds.max }
    }

    /// `None` when the pair spans exactly the control's default range.
    fn to_filter(self, bounds: &RangeBounds) -> Option<RangeFilter> {
        if self == RangeInput::full(bounds) {
            None
        } else {
            Some(RangeFilter::new(self.min, self.max))
        }
    }
}

/// The filter control surface: two multi-selects and six range pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterControls {
    pub genres: Vec<String>,
    pub artists: Vec<String>,
    pub popularity: RangeInput,
    pub energy: RangeInput,
    pub danceability: RangeInput,
    pub valence: RangeInput,
    pub tempo: RangeInput,
    pub duration: RangeInput,
}

impl Default for FilterControls {
    fn default() -> Self {
        FilterControls {
            genres: vec![ALL_SENTINEL.to_string()],
            artists: vec![ALL_SENTINEL.to_string()],
            popularity: RangeInput::full(&POPULARITY_BOUNDS),
            energy: RangeInput::full(&ENERGY_BOUNDS),
            danceability: RangeInput::full(&DANCEABILITY_BOUNDS),
            valence: RangeInput::full(&VALENCE_BOUNDS),
            tempo: RangeInput::full(&TEMPO_BOUNDS),
            duration: RangeInput::full(&DURATION_BOUNDS),
        }
    }
}

impl FilterControls {
    /// The range pairs with their bounds, in panel order.
    pub fn ranges_mut(&mut self) -> [(&'static RangeBounds, &mut RangeInput); 6] {
        [
            (&POPULARITY_BOUNDS, &mut self.popularity),
            (&ENERGY_BOUNDS, &mut self.energy),
            (&DANCEABILITY_BOUNDS, &mut self.danceability),
            (&VALENCE_BOUNDS, &mut self.valence),
            (&TEMPO_BOUNDS, &mut self.tempo),
            (&DURATION_BOUNDS, &mut self.duration),
        ]
    }

    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet {
            genres: CategoryFilter::from_selection(self.genres.iter().cloned()),
            artists: CategoryFilter::from_selection(self.artists.iter().cloned()),
            popularity: self.popularity.to_filter(&POPULARITY_BOUNDS),
            energy: self.energy.to_filter(&ENERGY_BOUNDS),
            danceability: self.danceability.to_filter(&DANCEABILITY_BOUNDS),
            valence: self.valence.to_filter(&VALENCE_BOUNDS),
            tempo: self.tempo.to_filter(&TEMPO_BOUNDS),
            duration_secs: self.duration.to_filter(&DURATION_BOUNDS),
        }
    }
}
