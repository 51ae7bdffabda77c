use std::collections::BTreeMap;

use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{Figure, Payload, Sparkline, Sparklines};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{AudioFeature, Dataset};
use crate::stats::{self, binning::cut_equal_width};

/// Labels of the five popularity buckets standing in for a time axis. The
/// dataset has no release dates, so "period" is an equal-width cut of
/// popularity, not time.
pub const PERIODS: [&str; 5] = ["2015", "2017", "2019", "2021", "2023"];

const MIN_PERIODS: usize = 3;
const MAX_PANELS: usize = 20;
const GRID_COLUMNS: usize = 4;

/// Small-multiple lines of a feature's per-genre mean across periods.
pub struct GenreEvolution;

impl Component for GenreEvolution {
    fn id(&self) -> &'static str {
        "genre_evolution_sparklines"
    }

    fn title(&self) -> &'static str {
        "Genre Evolution Sparklines"
    }

    fn description(&self) -> &'static str {
        "Small multiple line charts showing how the 'sound' of different music genres has changed over time."
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        vec![
            ControlSpec::new(
                "feature",
                "Audio Feature:",
                ControlKind::Dropdown(
                    AudioFeature::DESCRIPTORS
                        .into_iter()
                        .map(ControlOption::feature)
                        .collect(),
                ),
                AudioFeature::Danceability.column(),
            ),
            ControlSpec::new(
                "y_axis",
                "Y-Axis Range:",
                ControlKind::Dropdown(vec![
                    ControlOption::new("Unified Y-Axis", "unified"),
                    ControlOption::new("Independent Y-Axis", "independent"),
                ]),
                "unified",
            ),
            ControlSpec::new(
                "sort",
                "Sort Order:",
                ControlKind::Dropdown(vec![
                    ControlOption::new("Alphabetical", "alphabetical"),
                    ControlOption::new("By Maximum Value", "max_value"),
                ]),
                "alphabetical",
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let feature = controls.feature_or("feature", AudioFeature::Danceability, &AudioFeature::DESCRIPTORS)?;
        let unified = controls.text_or("y_axis", "unified")? == "unified";
        let by_max = controls.text_or("sort", "alphabetical")? == "max_value";

        let exploded = genres::explode(&table);
        if exploded.is_empty() {
            return Ok(Payload::figure(Figure::NoData(
                "No valid genre data found after filtering".into(),
            )));
        }
        let popularity: Vec<Option<f64>> = exploded.iter().map(|(_, t)| t.popularity).collect();
        let periods = cut_equal_width(&popularity, PERIODS.len());

        let mut groups: BTreeMap<&str, BTreeMap<usize, Vec<f64>>> = BTreeMap::new();
        for ((genre, track), period) in exploded.iter().zip(periods) {
            let (Some(period), Some(value)) = (period, track.feature(feature)) else {
                continue;
            };
            groups
                .entry(*genre)
                .or_default()
                .entry(period)
                .or_default()
                .push(value);
        }

        // BTreeMap iteration gives the alphabetical order.
        let mut panels: Vec<Sparkline> = groups
            .into_iter()
            .filter(|(_, by_period)| by_period.len() >= MIN_PERIODS)
            .map(|(genre, by_period)| Sparkline {
                genre: genre.to_string(),
                points: by_period
                    .into_iter()
                    .filter_map(|(p, values)| Some((PERIODS[p].to_string(), stats::mean(&values)?)))
                    .collect(),
            })
            .collect();
        if panels.is_empty() {
            return Ok(Payload::figure(Figure::NoData(
                "Not enough data points to create meaningful sparklines".into(),
            )));
        }
        if by_max {
            panels.sort_by(|a, b| peak(b).total_cmp(&peak(a)));
        }
        panels.truncate(MAX_PANELS);
        log::debug!("sparklines: {} panels for {feature}", panels.len());

        let y_range = unified.then(|| padded_range(&panels)).flatten();

        Ok(Payload::figure(Figure::Sparklines(Sparklines {
            title: format!("Genre Evolution: {} Over Time", feature.label()),
            columns: GRID_COLUMNS,
            y_range,
            panels,
        })))
    }
}

fn peak(line: &Sparkline) -> f64 {
    line.points
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Shared range over every panel, padded by 10 % of the span on each side.
fn padded_range(panels: &[Sparkline]) -> Option<(f64, f64)> {
    let values = panels.iter().flat_map(|p| p.points.iter().map(|(_, v)| *v));
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return None;
    }
    let pad = (hi - lo) * 0.1;
    Some((lo - pad, hi + pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};
    use crate::data::model::Track;

    fn with_dance(genres: &str, popularity: f64, danceability: f64) -> Track {
        let mut t = track("A", genres, popularity);
        t.danceability = Some(danceability);
        t
    }

    fn sparklines(payload: Payload) -> Sparklines {
        match payload.figure {
            Figure::Sparklines(s) => s,
            other => panic!("expected sparklines, got {other:?}"),
        }
    }

    fn fixture() -> Fixture {
        let mut tracks = Vec::new();
        // 'rock' spans all five buckets, 'jazz' and 'pop' three each.
        for (i, pop) in [0.0, 25.0, 45.0, 65.0, 100.0].into_iter().enumerate() {
            tracks.push(with_dance("['rock']", pop, 0.1 * (i as f64 + 1.0)));
        }
        for pop in [0.0, 45.0, 100.0] {
            tracks.push(with_dance("['jazz', 'pop']", pop, 0.9));
        }
        Fixture::new(tracks)
    }

    #[test]
    fn test_keeps_genres_with_three_periods() {
        let s = sparklines(fixture().run_defaults(&GenreEvolution));
        let genres: Vec<_> = s.panels.iter().map(|p| p.genre.as_str()).collect();
        assert_eq!(genres, vec!["jazz", "pop", "rock"]);
        let rock = &s.panels[2];
        assert_eq!(rock.points.len(), 5);
        assert_eq!(rock.points[0].0, "2015");
        assert_eq!(rock.points[4].0, "2023");
        assert_eq!(s.title, "Genre Evolution: Danceability Over Time");
        let (lo, hi) = s.y_range.unwrap();
        assert!((lo - 0.02).abs() < 1e-9 && (hi - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_sort_by_peak_and_independent_axis() {
        let values = ControlValues::new().with("sort", "max_value").with("y_axis", "independent");
        let mut tracks: Vec<Track> = fixture().table.iter().cloned().collect();
        tracks.push(with_dance("['rock']", 100.0, 2.0));
        let fx = Fixture::new(tracks);
        let s = sparklines(fx.run(&GenreEvolution, &values));
        assert_eq!(s.panels[0].genre, "rock");
        assert_eq!(s.y_range, None);
    }

    #[test]
    fn test_too_few_periods_is_no_data() {
        let fx = Fixture::new(vec![with_dance("['pop']", 10.0, 0.5), with_dance("['pop']", 90.0, 0.5)]);
        assert!(matches!(fx.run_defaults(&GenreEvolution).figure, Figure::NoData(_)));
    }
}
