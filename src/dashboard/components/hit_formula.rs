use std::collections::BTreeSet;

use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{format_count, format_mean, Figure, Payload, Scatter, ScatterSeries, SummaryCard};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{value_counts, AudioFeature, Dataset};
use crate::stats;

const Y_FEATURES: [AudioFeature; 5] = [
    AudioFeature::Danceability,
    AudioFeature::Energy,
    AudioFeature::Valence,
    AudioFeature::Acousticness,
    AudioFeature::Loudness,
];
const COLOR_GROUPS: usize = 10;
const NO_GENRE: &str = "No Genre";
const OTHER: &str = "Other";

/// Popularity against one audio feature, coloured by primary genre.
pub struct HitFormulaScatter;

fn axis_label(feature: AudioFeature) -> &'static str {
    match feature {
        AudioFeature::Loudness => "Loudness (dB)",
        other => other.label(),
    }
}

impl Component for HitFormulaScatter {
    fn id(&self) -> &'static str {
        "hit_formula_scatter_plot"
    }

    fn title(&self) -> &'static str {
        "Hit Formula Explorer"
    }

    fn description(&self) -> &'static str {
        "Explore the relationship between popularity and audio features, with color coding by genre."
    }

    fn layout(&self, _dataset: &Dataset) -> Vec<ControlSpec> {
        vec![ControlSpec::new(
            "y_axis",
            "Y-Axis Feature:",
            ControlKind::Dropdown(Y_FEATURES.into_iter().map(ControlOption::feature).collect()),
            AudioFeature::Danceability.column(),
        )]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No data available".into())));
        }
        let feature = controls.feature_or("y_axis", AudioFeature::Danceability, &Y_FEATURES)?;
        log::debug!("hit formula: {} rows, y = {feature}", table.len());

        let rows: Vec<_> = table
            .iter()
            .filter_map(|t| {
                t.genres.as_ref()?;
                let group = genres::primary_genre(t).unwrap_or(NO_GENRE);
                Some((group, t.popularity?, t.feature(feature)?, t.artists.as_deref()))
            })
            .collect();
        if rows.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No data available".into())));
        }

        let top: Vec<&str> = value_counts(rows.iter().map(|r| r.0))
            .into_iter()
            .take(COLOR_GROUPS)
            .map(|(g, _)| g)
            .collect();

        // Series appear in the order their group is first seen.
        let mut series: Vec<ScatterSeries> = Vec::new();
        for (group, popularity, value, _) in &rows {
            let name = if top.contains(group) { *group } else { OTHER };
            let point = [*popularity, *value];
            match series.iter_mut().find(|s| s.name == name) {
                Some(s) => s.points.push(point),
                None => series.push(ScatterSeries {
                    name: name.to_string(),
                    points: vec![point],
                }),
            }
        }

        let artists: BTreeSet<&str> = rows.iter().filter_map(|r| r.3).collect();
        let cards = vec![
            SummaryCard::new("Total Tracks", format_count(rows.len())),
            SummaryCard::new(
                "Average Popularity",
                format_mean(stats::mean_present(rows.iter().map(|r| Some(r.1))), 1),
            ),
            SummaryCard::new("Unique Artists", format_count(artists.len())),
        ];

        Ok(Payload::new(
            Figure::Scatter(Scatter {
                x_label: "Popularity".into(),
                y_label: axis_label(feature).into(),
                series,
            }),
            cards,
        ))
    }
}
