use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, DensityFigure, Figure, Payload, ScatterSeries};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{value_counts, Dataset, Track};
use crate::stats::binning::histogram_2d;

const TEMPO_MIN_DEFAULT: f64 = 60.0;
const TEMPO_MAX_DEFAULT: f64 = 180.0;
const GRID_BINS: usize = 30;
const OVERLAY_GENRES: usize = 5;

/// 2-D tempo × energy density with an optional top-genre scatter overlay.
pub struct TempoEnergyDensity;

impl Component for TempoEnergyDensity {
    fn id(&self) -> &'static str {
        "tempo_energy_density_plot"
    }

    fn title(&self) -> &'static str {
        "Tempo vs Energy Landscape"
    }

    fn description(&self) -> &'static str {
        "2D density visualization showing the relationship between tempo and energy in music tracks with optional genre cluster overlay"
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        let tempo = ControlKind::Number { min: 0.0, max: 220.0 };
        vec![
            ControlSpec::new("tempo_min", "Tempo Range (BPM):", tempo.clone(), TEMPO_MIN_DEFAULT),
            ControlSpec::new("tempo_max", "to", tempo, TEMPO_MAX_DEFAULT),
            ControlSpec::new(
                "genre_overlay",
                "Genre Overlay:",
                ControlKind::Dropdown(vec![
                    ControlOption::new("None", "none"),
                    ControlOption::new("Show Genre Clusters", "show"),
                ]),
                "none",
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let cards = track_cards(&table);
        let tempo_min = controls.number_or("tempo_min", TEMPO_MIN_DEFAULT)?;
        let tempo_max = controls.number_or("tempo_max", TEMPO_MAX_DEFAULT)?;
        let overlay = controls.text_or("genre_overlay", "none")? == "show";

        let in_window: Vec<(&Track, [f64; 2])> = table
            .iter()
            .filter_map(|t| Some((t, [t.tempo?, t.energy?])))
            .filter(|(_, [tempo, _])| tempo_min <= *tempo && *tempo <= tempo_max)
            .collect();
        let points: Vec<(f64, f64)> = in_window.iter().map(|(_, [x, y])| (*x, *y)).collect();
        let Some(grid) = histogram_2d(&points, GRID_BINS, GRID_BINS) else {
            return Ok(Payload::new(
                Figure::NoData(format!("No tracks found in tempo range {tempo_min}-{tempo_max} BPM")),
                cards,
            ));
        };
        log::debug!("tempo_energy: {} points in [{tempo_min}, {tempo_max}]", points.len());

        let overlays = if overlay { genre_overlays(&in_window) } else { Vec::new() };

        Ok(Payload::new(
            Figure::Density(DensityFigure {
                x_label: "Tempo (BPM)".into(),
                y_label: "Energy".into(),
                grid,
                overlays,
            }),
            cards,
        ))
    }
}

/// Points of the most frequent genres. A track belongs to the first of its
/// genres that made the cut; the rest ("Other") are not drawn.
fn genre_overlays(points: &[(&Track, [f64; 2])]) -> Vec<ScatterSeries> {
    let top: Vec<&str> = value_counts(points.iter().flat_map(|(t, _)| genres::track_genres(t)))
        .into_iter()
        .take(OVERLAY_GENRES)
        .map(|(g, _)| g)
        .collect();

    let mut series: Vec<ScatterSeries> = top
        .iter()
        .map(|g| ScatterSeries {
            name: g.to_string(),
            points: Vec::new(),
        })
        .collect();
    for (track, point) in points {
        if let Some(i) = genres::track_genres(track).find_map(|g| top.iter().position(|t| *t == g)) {
            series[i].points.push(*point);
        }
    }
    series.retain(|s| !s.points.is_empty());
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};

    fn tracks() -> Vec<Track> {
        (0..40)
            .map(|i| {
                let genres = match i % 4 {
                    0 => "['pop', 'rock']",
                    1 => "['rock']",
                    2 => "['jazz']",
                    _ => "[]",
                };
                let mut t = track("A", genres, 50.0);
                t.tempo = Some(60.0 + f64::from(i) * 4.0);
                t.energy = Some(f64::from(i) / 40.0);
                t
            })
            .collect()
    }

    #[test]
    fn test_default_window_and_grid() {
        let fx = Fixture::new(tracks());
        let payload = fx.run_defaults(&TempoEnergyDensity);
        let Figure::Density(d) = payload.figure else {
            panic!("expected density");
        };
        // Tempos 60..=180 in steps of 4 → 31 tracks in the window.
        assert_eq!(d.grid.total(), 31);
        assert_eq!(d.grid.counts.len(), 30);
        assert!(d.overlays.is_empty());
        assert_eq!(payload.cards[0].value, "40");
    }

    #[test]
    fn test_inverted_window_is_no_data() {
        let fx = Fixture::new(tracks());
        let values = ControlValues::new().with("tempo_min", 180.0).with("tempo_max", 60.0);
        let payload = fx.run(&TempoEnergyDensity, &values);
        assert!(matches!(payload.figure, Figure::NoData(_)));
    }

    #[test]
    fn test_overlay_assigns_first_top_genre() {
        let fx = Fixture::new(tracks());
        let values = ControlValues::new()
            .with("genre_overlay", "show")
            .with("tempo_min", 0.0)
            .with("tempo_max", 220.0);
        let Figure::Density(d) = fx.run(&TempoEnergyDensity, &values).figure else {
            panic!("expected density");
        };
        let names: Vec<_> = d.overlays.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["rock", "pop", "jazz"]);
        // 'pop' tracks also list 'rock' but pop comes first in their list.
        assert_eq!(d.overlays[0].points.len(), 10);
        assert_eq!(d.overlays[1].points.len(), 10);
    }
}
