use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::genres;

// ---------------------------------------------------------------------------
// MetadataValue – a single dynamically-typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used for the columns outside the fixed track schema and for table display.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put MetadataValue in BTreeSet --

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use MetadataValue::*;
        fn discriminant(v: &MetadataValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl Hash for MetadataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MetadataValue::String(s) => s.hash(state),
            MetadataValue::Integer(i) => i.hash(state),
            MetadataValue::Float(f) => f.to_bits().hash(state),
            MetadataValue::Bool(b) => b.hash(state),
            MetadataValue::Null => {}
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v:.4}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, ""),
        }
    }
}

impl MetadataValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MetadataValue::Integer(_) | MetadataValue::Float(_))
    }
}

impl From<Option<f64>> for MetadataValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(MetadataValue::Null, MetadataValue::Float)
    }
}

impl From<Option<i64>> for MetadataValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(MetadataValue::Null, MetadataValue::Integer)
    }
}

impl From<Option<&str>> for MetadataValue {
    fn from(v: Option<&str>) -> Self {
        v.map_or(MetadataValue::Null, |s| MetadataValue::String(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AudioFeature – the numeric columns of the fixed schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFeature {
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Liveness,
    Loudness,
    Speechiness,
    Tempo,
    Valence,
    Popularity,
    DurationMs,
}

impl AudioFeature {
    pub const ALL: [AudioFeature; 11] = [
        AudioFeature::Acousticness,
        AudioFeature::Danceability,
        AudioFeature::Energy,
        AudioFeature::Instrumentalness,
        AudioFeature::Liveness,
        AudioFeature::Loudness,
        AudioFeature::Speechiness,
        AudioFeature::Tempo,
        AudioFeature::Valence,
        AudioFeature::Popularity,
        AudioFeature::DurationMs,
    ];

    /// The nine descriptors offered by the correlation, sparkline and box-plot charts.
    pub const DESCRIPTORS: [AudioFeature; 9] = [
        AudioFeature::Acousticness,
        AudioFeature::Danceability,
        AudioFeature::Energy,
        AudioFeature::Instrumentalness,
        AudioFeature::Liveness,
        AudioFeature::Loudness,
        AudioFeature::Speechiness,
        AudioFeature::Tempo,
        AudioFeature::Valence,
    ];

    /// The seven [0, 1] features used for radar profiles and genre fingerprints.
    pub const PROFILE: [AudioFeature; 7] = [
        AudioFeature::Acousticness,
        AudioFeature::Danceability,
        AudioFeature::Energy,
        AudioFeature::Instrumentalness,
        AudioFeature::Liveness,
        AudioFeature::Speechiness,
        AudioFeature::Valence,
    ];

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Danceability => "danceability",
            AudioFeature::Energy => "energy",
            AudioFeature::Instrumentalness => "instrumentalness",
            AudioFeature::Liveness => "liveness",
            AudioFeature::Loudness => "loudness",
            AudioFeature::Speechiness => "speechiness",
            AudioFeature::Tempo => "tempo",
            AudioFeature::Valence => "valence",
            AudioFeature::Popularity => "popularity",
            AudioFeature::DurationMs => "duration_ms",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            AudioFeature::Acousticness => "Acousticness",
            AudioFeature::Danceability => "Danceability",
            AudioFeature::Energy => "Energy",
            AudioFeature::Instrumentalness => "Instrumentalness",
            AudioFeature::Liveness => "Liveness",
            AudioFeature::Loudness => "Loudness",
            AudioFeature::Speechiness => "Speechiness",
            AudioFeature::Tempo => "Tempo",
            AudioFeature::Valence => "Valence",
            AudioFeature::Popularity => "Popularity",
            AudioFeature::DurationMs => "Duration Ms",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

impl fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch-class name for a `key` value in 0..=11.
pub fn key_name(key: i64) -> Option<&'static str> {
    usize::try_from(key).ok().and_then(|k| KEY_NAMES.get(k).copied())
}

/// "Major" for 1, "Minor" for 0.
pub fn mode_name(mode: i64) -> Option<&'static str> {
    match mode {
        0 => Some("Minor"),
        1 => Some("Major"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the source table
// ---------------------------------------------------------------------------

/// A single song. Numeric cells are `None` when missing or non-numeric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub artists: Option<String>,
    /// Serialized list of genre tags, e.g. `['pop', 'dance pop']`.
    pub genres: Option<String>,
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub loudness: Option<f64>,
    pub speechiness: Option<f64>,
    pub tempo: Option<f64>,
    pub valence: Option<f64>,
    pub popularity: Option<f64>,
    pub duration_ms: Option<f64>,
    pub key: Option<i64>,
    pub mode: Option<i64>,
    /// Columns outside the fixed schema: column_name → value.
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Track {
    pub fn feature(&self, feature: AudioFeature) -> Option<f64> {
        match feature {
            AudioFeature::Acousticness => self.acousticness,
            AudioFeature::Danceability => self.danceability,
            AudioFeature::Energy => self.energy,
            AudioFeature::Instrumentalness => self.instrumentalness,
            AudioFeature::Liveness => self.liveness,
            AudioFeature::Loudness => self.loudness,
            AudioFeature::Speechiness => self.speechiness,
            AudioFeature::Tempo => self.tempo,
            AudioFeature::Valence => self.valence,
            AudioFeature::Popularity => self.popularity,
            AudioFeature::DurationMs => self.duration_ms,
        }
    }

    pub fn set_feature(&mut self, feature: AudioFeature, value: Option<f64>) {
        let slot = match feature {
            AudioFeature::Acousticness => &mut self.acousticness,
            AudioFeature::Danceability => &mut self.danceability,
            AudioFeature::Energy => &mut self.energy,
            AudioFeature::Instrumentalness => &mut self.instrumentalness,
            AudioFeature::Liveness => &mut self.liveness,
            AudioFeature::Loudness => &mut self.loudness,
            AudioFeature::Speechiness => &mut self.speechiness,
            AudioFeature::Tempo => &mut self.tempo,
            AudioFeature::Valence => &mut self.valence,
            AudioFeature::Popularity => &mut self.popularity,
            AudioFeature::DurationMs => &mut self.duration_ms,
        };
        *slot = value.filter(|v| v.is_finite());
    }

    /// Duration in seconds, as compared by the duration range filter.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_ms.map(|ms| ms / 1000.0)
    }

    /// Cell lookup by source column name.
    pub fn cell(&self, column: &str) -> MetadataValue {
        if let Some(feature) = AudioFeature::from_column(column) {
            return self.feature(feature).into();
        }
        match column {
            "artists" => self.artists.as_deref().into(),
            "genres" => self.genres.as_deref().into(),
            "key" => self.key.into(),
            "mode" => self.mode.into(),
            other => self
                .extra
                .get(other)
                .cloned()
                .unwrap_or(MetadataValue::Null),
        }
    }

    /// True when every cell of the row is missing.
    pub fn is_blank(&self) -> bool {
        self.artists.is_none()
            && self.genres.is_none()
            && self.key.is_none()
            && self.mode.is_none()
            && AudioFeature::ALL.iter().all(|f| self.feature(*f).is_none())
            && self.extra.values().all(MetadataValue::is_null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug)]
pub struct Dataset {
    id: u64,
    /// All tracks (rows).
    pub tracks: Vec<Track>,
    /// Column names in input order.
    pub column_names: Vec<String>,
    /// Sorted unique non-blank artist names.
    pub unique_artists: BTreeSet<String>,
    /// Genre token counts, most frequent first (ties keep first appearance).
    pub genre_counts: Vec<(String, usize)>,
}

impl Dataset {
    /// Build column indices from the loaded tracks.
    pub fn from_tracks(tracks: Vec<Track>, column_names: Vec<String>) -> Self {
        let unique_artists = tracks
            .iter()
            .filter_map(|t| t.artists.as_deref())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        let genre_counts = genres::genre_frequencies(
            tracks
                .iter()
                .flat_map(|t| genres::tokens(t.genres.as_deref().unwrap_or_default())),
        );

        Dataset {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            tracks,
            column_names,
            unique_artists,
            genre_counts,
        }
    }

    /// Process-unique identity, used in cache fingerprints.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sorted unique genre tokens.
    pub fn unique_genres(&self) -> Vec<String> {
        let mut all: Vec<String> = self.genre_counts.iter().map(|(g, _)| g.clone()).collect();
        all.sort();
        all
    }

    /// The `n` most frequent genre tokens.
    pub fn top_genres(&self, n: usize) -> Vec<String> {
        self.genre_counts
            .iter()
            .take(n)
            .map(|(g, _)| g.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TrackTable – an immutable row selection over a dataset
// ---------------------------------------------------------------------------

/// A view over a shared [`Dataset`]: the dataset plus the indices of the
/// rows it contains. Cloning is cheap and selections never mutate the source.
#[derive(Debug, Clone)]
pub struct TrackTable {
    dataset: Arc<Dataset>,
    rows: Arc<[usize]>,
}

impl TrackTable {
    /// A view containing every row of the dataset.
    pub fn full(dataset: Arc<Dataset>) -> Self {
        let rows: Arc<[usize]> = (0..dataset.len()).collect();
        TrackTable { dataset, rows }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dataset row indices in view order.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.dataset.column_names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> + '_ {
        self.rows.iter().map(move |&i| &self.dataset.tracks[i])
    }

    /// A new view keeping the rows for which `keep` returns true.
    pub fn select(&self, keep: impl Fn(&Track) -> bool) -> TrackTable {
        let rows: Arc<[usize]> = self
            .rows
            .iter()
            .copied()
            .filter(|&i| keep(&self.dataset.tracks[i]))
            .collect();
        TrackTable {
            dataset: Arc::clone(&self.dataset),
            rows,
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> TrackTable {
        let rows: Arc<[usize]> = self.rows.iter().copied().take(n).collect();
        TrackTable {
            dataset: Arc::clone(&self.dataset),
            rows,
        }
    }

    /// Non-missing values of one numeric column.
    pub fn values(&self, feature: AudioFeature) -> Vec<f64> {
        self.iter().filter_map(|t| t.feature(feature)).collect()
    }

    /// Number of distinct non-blank artists in the view.
    pub fn unique_artist_count(&self) -> usize {
        self.iter()
            .filter_map(|t| t.artists.as_deref())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Stable identity of this selection: dataset id plus a hash of the rows.
    pub fn fingerprint(&self) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.rows.hash(&mut hasher);
        format!("{}:{}:{:016x}", self.dataset.id, self.rows.len(), hasher.finish())
    }
}

impl PartialEq for TrackTable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.dataset, &other.dataset) && self.rows == other.rows
    }
}

/// Count the values produced by `keys`, most frequent first; ties keep the
/// order in which each key was first seen.
pub fn value_counts<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut position: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match position.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
