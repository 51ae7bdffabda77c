use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, ColorScale, Figure, Heatmap, Payload};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{AudioFeature, Dataset};
use crate::stats;

const TOP_GENRES: usize = 20;

/// Mean audio profile of the most frequent genres, as a heatmap.
pub struct GenreFingerprint;

impl Component for GenreFingerprint {
    fn id(&self) -> &'static str {
        "genre_sonic_fingerprint_heatmap"
    }

    fn title(&self) -> &'static str {
        "Genre Sonic Fingerprint Heatmap"
    }

    fn description(&self) -> &'static str {
        "Heatmap showing average audio features for top genres with summary statistics"
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        vec![ControlSpec::new(
            "normalization",
            "Value Type:",
            ControlKind::Dropdown(vec![
                ControlOption::new("Raw Values", "raw"),
                ControlOption::new("Normalized (0-1)", "normalized"),
            ]),
            "normalized",
        )]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let normalized = controls.text_or("normalization", "normalized")? == "normalized";

        let exploded = genres::explode(&table);
        if exploded.is_empty() {
            return Ok(Payload::figure(Figure::NoData(
                "No valid genre data found in the filtered dataset".into(),
            )));
        }
        let top = genres::top_genres(&exploded, TOP_GENRES);
        log::debug!("fingerprint: {} exploded rows, {} genres", exploded.len(), top.len());

        // rows[genre][feature]
        let rows: Vec<Vec<Option<f64>>> = top
            .iter()
            .map(|genre| {
                AudioFeature::PROFILE
                    .iter()
                    .map(|f| {
                        stats::mean_present(
                            exploded
                                .iter()
                                .filter(|(g, _)| g == genre)
                                .map(|(_, t)| t.feature(*f)),
                        )
                    })
                    .collect()
            })
            .collect();

        let z = if normalized { normalize_columns(&rows) } else { rows };

        Ok(Payload::new(
            Figure::Heatmap(Heatmap {
                x_labels: AudioFeature::PROFILE.iter().map(|f| f.label().to_string()).collect(),
                y_labels: top.iter().map(|g| g.to_string()).collect(),
                z,
                text: None,
                z_range: normalized.then_some((0.0, 1.0)),
                scale: ColorScale::Viridis,
                legend: None,
            }),
            track_cards(&table),
        ))
    }
}

/// Min–max scale each column independently.
fn normalize_columns(rows: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let width = rows.first().map_or(0, Vec::len);
    let columns: Vec<Vec<Option<f64>>> = (0..width)
        .map(|j| stats::min_max_normalize(&rows.iter().map(|r| r[j]).collect::<Vec<_>>()))
        .collect();
    (0..rows.len())
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect()
}
