use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::cache::{CacheKey, MemoCache};
use super::model::{AudioFeature, Dataset, MetadataValue, Track};

/// Cell texts read as missing in text formats.
pub const MISSING_SENTINELS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>"];

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a track dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`              – header row, delimiter sniffed among `, ; \t |`
/// * `.parquet` / `.pq`  – flat columns as written by Pandas or Polars
/// * `.json`             – records array, `df.to_json(orient='records')`
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} tracks, {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

/// Memoized [`load_file`]: the same path yields the same shared dataset for
/// the life of the process. Failed loads are not remembered.
pub fn get_data(cache: &MemoCache, path: &Path) -> Result<Arc<Dataset>> {
    let key = CacheKey::new("loader::get_data", path.to_string_lossy());
    cache.get_or_try_insert_with(key, || load_file(path))
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

/// Accumulates one row's cells into a [`Track`], coercing known columns.
fn assign(track: &mut Track, column: &str, value: MetadataValue) {
    if let Some(feature) = AudioFeature::from_column(column) {
        track.set_feature(feature, to_f64(&value));
        return;
    }
    match column {
        "artists" => track.artists = to_text(value),
        "genres" => track.genres = to_text(value),
        "key" => track.key = to_i64(&value),
        "mode" => track.mode = to_i64(&value),
        other => {
            let value = if is_numeric_extra(other) {
                coerce_numeric(other, &value)
            } else {
                value
            };
            track.extra.insert(other.to_string(), value);
        }
    }
}

/// Aggregate columns (`*_artist_avg`, `*_genre_avg`, `count`) are numeric even
/// when the file stores them as text; unparseable cells become null.
fn is_numeric_extra(column: &str) -> bool {
    column == "count" || column.ends_with("_avg")
}

fn coerce_numeric(column: &str, value: &MetadataValue) -> MetadataValue {
    let integral = column == "count" || column.starts_with("key_") || column.starts_with("mode_") || column.starts_with("count_");
    if integral {
        to_i64(value).into()
    } else {
        to_f64(value).into()
    }
}

fn to_f64(value: &MetadataValue) -> Option<f64> {
    match value {
        MetadataValue::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
    .filter(|v| v.is_finite())
}

fn to_i64(value: &MetadataValue) -> Option<i64> {
    match value {
        MetadataValue::Integer(i) => Some(*i),
        other => to_f64(other)
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64),
    }
}

fn to_text(value: MetadataValue) -> Option<String> {
    match value {
        MetadataValue::Null => None,
        MetadataValue::String(s) if s.is_empty() => None,
        MetadataValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn finish(tracks: Vec<Track>, column_names: Vec<String>) -> Dataset {
    let before = tracks.len();
    let tracks: Vec<Track> = tracks.into_iter().filter(|t| !t.is_blank()).collect();
    if tracks.len() < before {
        log::debug!("Dropped {} all-null rows", before - tracks.len());
    }
    Dataset::from_tracks(tracks, column_names)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Pick the candidate delimiter occurring most often in the header line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    DELIMITER_CANDIDATES
        .iter()
        .copied()
        .max_by_key(|d| header.iter().filter(|b| *b == d).count())
        .filter(|d| header.contains(d))
        .unwrap_or(b',')
}

fn load_csv(path: &Path) -> Result<Dataset> {
    let raw = std::fs::read(path).context("reading CSV file")?;
    let bytes = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
    let delimiter = sniff_delimiter(bytes);
    log::debug!("CSV delimiter: {:?}", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut tracks = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut track = Track::default();
        for (column, cell) in headers.iter().zip(record.iter()) {
            assign(&mut track, column, guess_metadata_type(cell));
        }
        tracks.push(track);
    }

    Ok(finish(tracks, headers))
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if MISSING_SENTINELS.contains(&s.trim()) {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return MetadataValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    MetadataValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON: `[{"artists": "...", "popularity": 42, ...}, ...]`.
/// Column order is the key order of first appearance.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(text.trim_start_matches('\u{feff}')).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut tracks = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let mut track = Track::default();
        for (key, val) in obj {
            if !column_names.iter().any(|c| c == key) {
                column_names.push(key.clone());
            }
            assign(&mut track, key, json_to_metadata(val));
        }
        tracks.push(track);
    }

    Ok(finish(tracks, column_names))
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) if MISSING_SENTINELS.contains(&s.as_str()) => MetadataValue::Null,
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        // A genre list stored as a real array keeps its serialized form.
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut tracks = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let mut rows = vec![Track::default(); batch.num_rows()];
        for (field, col) in batch.schema().fields().iter().zip(batch.columns()) {
            let values = column_values(col)
                .with_context(|| format!("reading column '{}'", field.name()))?;
            for (track, value) in rows.iter_mut().zip(values) {
                assign(track, field.name(), value);
            }
        }
        tracks.extend(rows);
    }

    Ok(finish(tracks, column_names))
}

/// Convert one Arrow column into cells, null-aware.
fn column_values(col: &ArrayRef) -> Result<Vec<MetadataValue>> {
    let len = col.len();
    let cells: Vec<MetadataValue> = match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_string::<i32>();
            (0..len)
                .map(|i| text_cell(arr.is_null(i), || arr.value(i)))
                .collect()
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            (0..len)
                .map(|i| text_cell(arr.is_null(i), || arr.value(i)))
                .collect()
        }
        DataType::Dictionary(_, _) => {
            let strings = cast(col, &DataType::Utf8).context("decoding dictionary column")?;
            return column_values(&strings);
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            arr.iter()
                .map(|v| v.map_or(MetadataValue::Null, MetadataValue::Bool))
                .collect()
        }
        dt if dt.is_integer() => {
            let ints = cast(col, &DataType::Int64).context("widening integer column")?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map_or(MetadataValue::Null, MetadataValue::Integer))
                .collect()
        }
        dt if dt.is_floating() || matches!(dt, DataType::Decimal128(_, _) | DataType::Decimal256(_, _)) => {
            let floats = cast(col, &DataType::Float64).context("widening float column")?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| match v {
                    Some(f) if !f.is_nan() => MetadataValue::Float(f),
                    _ => MetadataValue::Null,
                })
                .collect()
        }
        other => {
            // Lists and other nested values are kept in their display form.
            log::debug!("Formatting {other:?} column as text");
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .context("formatting column")?;
            (0..len)
                .map(|i| {
                    if col.is_null(i) {
                        MetadataValue::Null
                    } else {
                        MetadataValue::String(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

fn text_cell<'a>(is_null: bool, value: impl FnOnce() -> &'a str) -> MetadataValue {
    if is_null {
        return MetadataValue::Null;
    }
    let s = value();
    if MISSING_SENTINELS.contains(&s) {
        MetadataValue::Null
    } else {
        MetadataValue::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_csv_types_and_missing_values() {
        let file = write_temp(
            ".csv",
            b"artists,genres,popularity,key,mode,duration_ms,count\n\
              Adele,\"['pop', 'soul']\",85,5,1,240000,3\n\
              Drake,[],NA,5.0,,200000,x\n\
              ,,,,,,\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names[0], "artists");
        let adele = &ds.tracks[0];
        assert_eq!(adele.genres.as_deref(), Some("['pop', 'soul']"));
        assert_eq!(adele.popularity, Some(85.0));
        assert_eq!(adele.key, Some(5));
        assert_eq!(adele.duration_secs(), Some(240.0));
        assert_eq!(adele.extra.get("count"), Some(&MetadataValue::Integer(3)));
        let drake = &ds.tracks[1];
        assert_eq!(drake.popularity, None);
        assert_eq!(drake.key, Some(5));
        assert_eq!(drake.mode, None);
        assert_eq!(drake.extra.get("count"), Some(&MetadataValue::Null));
    }

    #[test]
    fn test_csv_semicolon_with_bom() {
        let file = write_temp(".csv", b"\xEF\xBB\xBFartists;energy\nA;0.5\nB;0.25\n");
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.column_names, vec!["artists", "energy"]);
        assert_eq!(ds.tracks[1].energy, Some(0.25));
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a|b|c\n1|2|3"), b'|');
        assert_eq!(sniff_delimiter(b"a\tb\n"), b'\t');
        assert_eq!(sniff_delimiter(b"single\n"), b',');
    }

    #[test]
    fn test_json_records() {
        let file = write_temp(
            ".json",
            br#"[{"artists": "A", "tempo": 120.5, "genres": "['rock']", "explicit": true},
                {"artists": "B", "tempo": null, "genres": null, "explicit": false}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.column_names, vec!["artists", "tempo", "genres", "explicit"]);
        assert_eq!(ds.tracks[0].tempo, Some(120.5));
        assert_eq!(ds.tracks[1].genres, None);
        assert_eq!(ds.tracks[1].extra.get("explicit"), Some(&MetadataValue::Bool(false)));
        assert_eq!(ds.genre_counts, vec![("rock".to_string(), 1)]);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", b"");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn test_get_data_is_memoized() {
        let file = write_temp(".csv", b"artists,popularity\nA,1\n");
        let cache = MemoCache::new();
        let a = get_data(&cache, file.path()).unwrap();
        let b = get_data(&cache, file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats().misses, 1);
    }
}
