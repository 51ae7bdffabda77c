use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, BoxPlot, Figure, Payload, SummaryCard};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{AudioFeature, Dataset};
use crate::stats::BoxStats;

const GENRE_OPTIONS: usize = 20;
const DEFAULT_GENRES: usize = 5;

/// Box plots of one feature across a chosen set of genres.
pub struct FeatureDistribution;

fn zero_cards() -> Vec<SummaryCard> {
    vec![
        SummaryCard::new("Total Tracks", "0"),
        SummaryCard::new("Average Popularity", "0"),
    ]
}

impl Component for FeatureDistribution {
    fn id(&self) -> &'static str {
        "audio_feature_distribution"
    }

    fn title(&self) -> &'static str {
        "Audio Feature Distribution"
    }

    fn description(&self) -> &'static str {
        "Compare distributions of audio features across different genres using box plots"
    }

    fn layout(&self, dataset: &Dataset) -> Vec<ControlSpec> {
        let options: Vec<String> = dataset.unique_genres().into_iter().take(GENRE_OPTIONS).collect();
        let defaults: Vec<String> = options.iter().take(DEFAULT_GENRES).cloned().collect();
        vec![
            ControlSpec::new(
                "feature",
                "Audio Feature:",
                ControlKind::Dropdown(AudioFeature::DESCRIPTORS.into_iter().map(ControlOption::feature).collect()),
                AudioFeature::Valence.column(),
            ),
            ControlSpec::new(
                "genres",
                "Select Genres:",
                ControlKind::MultiSelect(options.iter().map(|g| ControlOption::text(g)).collect()),
                defaults,
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::new(Figure::NoData("No data available".into()), zero_cards()));
        }
        let cards = track_cards(&table);
        let feature = controls.feature_or("feature", AudioFeature::Valence, &AudioFeature::DESCRIPTORS)?;
        let selected = controls.list("genres")?;
        if selected.is_empty() {
            return Ok(Payload::new(
                Figure::InsufficientSelection("Please select at least one genre to compare".into()),
                cards,
            ));
        }

        // Groups in order of first appearance among the filtered rows.
        let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
        let mut matched = 0usize;
        for track in table.iter() {
            for genre in genres::track_genres(track).filter(|g| selected.iter().any(|s| s == *g)) {
                matched += 1;
                let i = match groups.iter().position(|(g, _)| *g == genre) {
                    Some(i) => i,
                    None => {
                        groups.push((genre, Vec::new()));
                        groups.len() - 1
                    }
                };
                if let Some(v) = track.feature(feature) {
                    groups[i].1.push(v);
                }
            }
        }
        if matched == 0 {
            return Ok(Payload::new(
                Figure::NoData("No data available for selected genres".into()),
                cards,
            ));
        }
        log::debug!("distribution: {feature} over {} genres, {matched} rows", groups.len());

        let groups = groups
            .into_iter()
            .filter_map(|(genre, values)| Some((genre.to_string(), BoxStats::from_values(&values)?)))
            .collect();

        Ok(Payload::new(
            Figure::BoxPlot(BoxPlot {
                title: format!("Distribution of {feature} by Genre"),
                y_label: feature.label().to_string(),
                groups,
            }),
            cards,
        ))
    }

    fn error_cards(&self) -> Vec<SummaryCard> {
        zero_cards()
    }
}
