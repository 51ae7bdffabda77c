//! What an update hands to the renderer: a figure description made only of
//! aggregated numbers, plus summary cards.

use crate::data::model::{MetadataValue, TrackTable};
use crate::stats::binning::Grid2d;
use crate::stats::{self, BoxStats};

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub label: String,
    pub value: String,
}

impl SummaryCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        SummaryCard {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Integer with thousands separators: `170653` → `"170,653"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Mean with fixed decimals; an undefined mean prints as `nan`.
pub fn format_mean(mean: Option<f64>, decimals: usize) -> String {
    match mean {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "nan".to_string(),
    }
}

/// The "Total Tracks" and "Average Popularity" pair most charts show.
pub fn track_cards(table: &TrackTable) -> Vec<SummaryCard> {
    vec![
        SummaryCard::new("Total Tracks", format_count(table.len())),
        SummaryCard::new(
            "Average Popularity",
            format_mean(stats::mean_present(table.iter().map(|t| t.popularity)), 1),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// Blue–white–red around zero.
    Diverging,
    Viridis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    /// Row-major, `z[y][x]`; `None` cells are undefined.
    pub z: Vec<Vec<Option<f64>>>,
    /// Per-cell annotation text, same shape as `z`.
    pub text: Option<Vec<Vec<String>>>,
    /// Fixed colour range; `None` scales to the data.
    pub z_range: Option<(f64, f64)>,
    pub scale: ColorScale,
    pub legend: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Radar {
    pub axes: Vec<String>,
    pub series: Vec<RadarSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramFigure {
    pub metric: String,
    pub centers: Vec<f64>,
    pub counts: Vec<usize>,
    pub bin_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityFigure {
    pub x_label: String,
    pub y_label: String,
    pub grid: Grid2d,
    pub overlays: Vec<ScatterSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sparkline {
    pub genre: String,
    /// (period label, mean value), periods ascending.
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sparklines {
    pub title: String,
    pub columns: usize,
    /// Shared y-range when the axis is unified.
    pub y_range: Option<(f64, f64)>,
    pub panels: Vec<Sparkline>,
}

impl Sparklines {
    pub fn rows(&self) -> usize {
        self.panels.len().div_ceil(self.columns.max(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ridge {
    pub genre: String,
    pub median: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ridgeline {
    pub x_label: String,
    /// Descending median.
    pub ridges: Vec<Ridge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlot {
    pub title: String,
    pub y_label: String,
    pub groups: Vec<(String, BoxStats)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub field: String,
    pub header: String,
    pub numeric: bool,
    /// Fixed decimals for display, if any.
    pub decimals: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<MetadataValue>>,
}

impl TableColumn {
    pub fn display(&self, value: &MetadataValue) -> String {
        match (value, self.decimals) {
            (MetadataValue::Float(v), Some(d)) => format!("{v:.d$}"),
            (MetadataValue::Integer(v), Some(d)) => format!("{:.d$}", *v as f64),
            (MetadataValue::Float(v), None) => v.to_string(),
            (other, _) => other.to_string(),
        }
    }
}

/// The visual part of a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Bar(BarChart),
    Heatmap(Heatmap),
    Radar(Radar),
    Histogram(HistogramFigure),
    Density(DensityFigure),
    Sparklines(Sparklines),
    Ridgeline(Ridgeline),
    BoxPlot(BoxPlot),
    Scatter(Scatter),
    Table(TableData),
    /// Cards only, no chart.
    Blank,
    /// Nothing left to draw after filtering.
    NoData(String),
    /// The component's own controls select too little.
    InsufficientSelection(String),
    /// Empty state after a fault; the diagnostic travels separately.
    Failed,
}

impl Figure {
    pub fn no_data() -> Self {
        Figure::NoData("No data is available to display".to_string())
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Figure::NoData(_) | Figure::InsufficientSelection(_) | Figure::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub figure: Figure,
    pub cards: Vec<SummaryCard>,
}

impl Payload {
    pub fn new(figure: Figure, cards: Vec<SummaryCard>) -> Self {
        Payload { figure, cards }
    }

    pub fn figure(figure: Figure) -> Self {
        Payload::new(figure, Vec::new())
    }

    pub fn no_data() -> Self {
        Payload::figure(Figure::no_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(170_653), "170,653");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_mean() {
        assert_eq!(format_mean(Some(41.26), 1), "41.3");
        assert_eq!(format_mean(Some(3.0), 1), "3.0");
        assert_eq!(format_mean(None, 1), "nan");
        assert_eq!(format_mean(Some(f64::NAN), 2), "nan");
    }

    #[test]
    fn test_table_column_display() {
        let col = TableColumn {
            field: "energy".into(),
            header: "Energy".into(),
            numeric: true,
            decimals: Some(2),
        };
        assert_eq!(col.display(&MetadataValue::Float(0.456)), "0.46");
        assert_eq!(col.display(&MetadataValue::Null), "");
    }

    #[test]
    fn test_sparkline_grid_rows() {
        let panels = (0..5)
            .map(|i| Sparkline { genre: i.to_string(), points: Vec::new() })
            .collect();
        let s = Sparklines { title: String::new(), columns: 4, y_range: None, panels };
        assert_eq!(s.rows(), 2);
    }
}
