use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{Figure, HistogramFigure, Payload};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::{AudioFeature, Dataset};
use crate::stats::binning::histogram;

const METRICS: [AudioFeature; 6] = [
    AudioFeature::Popularity,
    AudioFeature::Danceability,
    AudioFeature::Energy,
    AudioFeature::Valence,
    AudioFeature::Acousticness,
    AudioFeature::Tempo,
];

const BINS_MIN: f64 = 10.0;
const BINS_MAX: f64 = 50.0;
const BINS_DEFAULT: f64 = 20.0;

/// Equal-width distribution of one metric.
pub struct FeatureHistogram;

impl Component for FeatureHistogram {
    fn id(&self) -> &'static str {
        "futuristic_histogram"
    }

    fn title(&self) -> &'static str {
        "Futuristic Music Data Distribution"
    }

    fn description(&self) -> &'static str {
        "A futuristic histogram with glowing neon bars representing music data distribution."
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        vec![
            ControlSpec::new(
                "metric",
                "Metric:",
                ControlKind::Dropdown(METRICS.into_iter().map(ControlOption::feature).collect()),
                AudioFeature::Popularity.column(),
            ),
            ControlSpec::new(
                "bins",
                "Number of Bins:",
                ControlKind::Slider {
                    min: BINS_MIN,
                    max: BINS_MAX,
                    step: 5.0,
                },
                BINS_DEFAULT,
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let metric = controls.feature_or("metric", AudioFeature::Popularity, &METRICS)?;
        let bins = controls.number_or("bins", BINS_DEFAULT)?;
        if !(1.0..=1000.0).contains(&bins) {
            return Err(ComponentError::InvalidControl {
                control: "bins".into(),
                reason: format!("{bins} bins"),
            });
        }
        log::debug!("histogram: metric {metric}, bins {bins}");

        let values = table.values(metric);
        let Some(h) = histogram(&values, bins as usize) else {
            return Ok(Payload::figure(Figure::NoData(
                "No valid data available for the selected metric".into(),
            )));
        };

        Ok(Payload::figure(Figure::Histogram(HistogramFigure {
            metric: metric.label().to_string(),
            centers: h.centers(),
            bin_width: h.bin_width(),
            counts: h.counts,
        })))
    }
}
