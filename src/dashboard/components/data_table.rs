use crate::dashboard::controls::{ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, Figure, Payload, TableColumn, TableData};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::{Dataset, TrackTable};

/// Maximum rows handed to the grid.
pub const MAX_ROWS: usize = 10_000;
const MAX_COLUMNS: usize = 15;
const IMPORTANT: [&str; 8] = [
    "artists",
    "genres",
    "popularity",
    "danceability",
    "energy",
    "valence",
    "acousticness",
    "tempo",
];
const TWO_DECIMALS: [&str; 5] = ["popularity", "danceability", "energy", "valence", "acousticness"];

/// Tabular view of the filtered rows.
pub struct DataTable;

/// `duration_ms` → `Duration Ms`.
fn header(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Column selection: internal names skipped, important columns always
/// kept, others only while fewer than fifteen are chosen.
fn columns(table: &TrackTable) -> Vec<TableColumn> {
    let mut chosen: Vec<TableColumn> = Vec::new();
    for field in table.column_names() {
        if field.starts_with('_') || field == "index" {
            continue;
        }
        if !(IMPORTANT.contains(&field.as_str()) || chosen.len() < MAX_COLUMNS) {
            continue;
        }
        // A column is numeric when every present cell is.
        let mut present = table.iter().map(|t| t.cell(field)).filter(|v| !v.is_null()).peekable();
        let numeric = present.peek().is_some() && present.all(|v| v.is_numeric());
        chosen.push(TableColumn {
            field: field.clone(),
            header: header(field),
            numeric,
            decimals: (numeric && TWO_DECIMALS.contains(&field.as_str())).then_some(2),
        });
    }
    chosen
}

impl Component for DataTable {
    fn id(&self) -> &'static str {
        "data_table"
    }

    fn title(&self) -> &'static str {
        "Data Table View"
    }

    fn description(&self) -> &'static str {
        "Full data table view with filtering, sorting, and pagination capabilities. Limited to a maximum of 10000 rows."
    }

    fn layout(&self, _dataset: &Dataset) -> Vec<ControlSpec> {
        Vec::new()
    }

    fn update(&self, ctx: &UpdateContext<'_>, _controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::figure(Figure::NoData(
                "No data available with current filters".into(),
            )));
        }
        let cards = track_cards(&table);
        let shown = table.head(MAX_ROWS);
        let columns = columns(&shown);
        log::debug!("data table: {} rows, {} columns", shown.len(), columns.len());

        let rows = shown
            .iter()
            .map(|track| columns.iter().map(|c| track.cell(&c.field)).collect())
            .collect();
        Ok(Payload::new(Figure::Table(TableData { columns, rows }), cards))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};
    use crate::data::model::{MetadataValue, Track};

    fn fixture_with_columns(names: &[&str], tracks: Vec<Track>) -> Fixture {
        let mut fx = Fixture::new(Vec::new());
        let names = names.iter().map(|s| s.to_string()).collect();
        fx.table = TrackTable::full(Arc::new(Dataset::from_tracks(tracks, names)));
        fx
    }

    #[test]
    fn test_header_title_case() {
        assert_eq!(header("duration_ms"), "Duration Ms");
        assert_eq!(header("artists"), "Artists");
        assert_eq!(header("key_mode_count"), "Key Mode Count");
    }

    #[test]
    fn test_columns_and_formatting() {
        let mut t = track("Ana", "['pop']", 61.257);
        t.energy = Some(0.5);
        let fx = fixture_with_columns(&["_id", "index", "artists", "popularity", "energy", "genres"], vec![t]);
        let payload = fx.run_defaults(&DataTable);
        let Figure::Table(data) = &payload.figure else {
            panic!("expected table");
        };
        let fields: Vec<_> = data.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["artists", "popularity", "energy", "genres"]);
        assert!(!data.columns[0].numeric);
        assert_eq!(data.columns[1].decimals, Some(2));
        assert_eq!(data.columns[1].display(&data.rows[0][1]), "61.26");
        assert_eq!(data.rows[0][0], MetadataValue::String("Ana".into()));
        assert_eq!(payload.cards[0].value, "1");
    }

    #[test]
    fn test_important_columns_survive_the_column_cap() {
        let mut names: Vec<String> = (0..20).map(|i| format!("extra_{i}")).collect();
        names.push("tempo".into());
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let fx = fixture_with_columns(&refs, vec![track("A", "[]", 1.0)]);
        let payload = fx.run_defaults(&DataTable);
        let Figure::Table(data) = &payload.figure else {
            panic!("expected table");
        };
        assert_eq!(data.columns.len(), MAX_COLUMNS + 1);
        assert_eq!(data.columns.last().map(|c| c.field.as_str()), Some("tempo"));
    }

    #[test]
    fn test_empty_selection_is_no_data() {
        let payload = Fixture::new(Vec::new()).run_defaults(&DataTable);
        assert!(payload.figure.is_sentinel());
    }
}
