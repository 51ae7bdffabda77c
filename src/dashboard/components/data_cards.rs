use crate::dashboard::controls::{ControlSpec, ControlValues};
use crate::dashboard::payload::{format_count, format_mean, Figure, Payload, SummaryCard};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::Dataset;
use crate::stats;

const LABELS: [&str; 3] = ["Total Tracks", "Average Popularity", "Average Duration (minutes)"];

/// Headline metrics of the filtered selection.
pub struct DataCards;

fn uniform_cards(value: &str) -> Vec<SummaryCard> {
    LABELS.iter().map(|label| SummaryCard::new(*label, value)).collect()
}

impl Component for DataCards {
    fn id(&self) -> &'static str {
        "data_cards"
    }

    fn title(&self) -> &'static str {
        "Key Metrics"
    }

    fn layout(&self, _dataset: &Dataset) -> Vec<ControlSpec> {
        Vec::new()
    }

    fn update(&self, ctx: &UpdateContext<'_>, _controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            log::debug!("data cards: no rows after filtering");
            return Ok(Payload::new(Figure::Blank, uniform_cards("No Data")));
        }

        let popularity = stats::mean_present(table.iter().map(|t| t.popularity));
        let minutes = stats::mean_present(table.iter().map(|t| t.duration_ms)).map(|ms| ms / 60_000.0);
        log::debug!("data cards: {} rows, popularity {popularity:?}, minutes {minutes:?}", table.len());

        Ok(Payload::new(
            Figure::Blank,
            vec![
                SummaryCard::new(LABELS[0], format_count(table.len())),
                SummaryCard::new(LABELS[1], format_mean(popularity, 1)),
                SummaryCard::new(LABELS[2], format_mean(minutes, 1)),
            ],
        ))
    }

    fn error_cards(&self) -> Vec<SummaryCard> {
        uniform_cards("Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};
    use crate::data::filter::{FilterSet, RangeFilter};

    fn fixture() -> Fixture {
        let tracks = [(30.0, 180_000.0), (70.0, 240_000.0), (90.0, 210_000.0)]
            .into_iter()
            .map(|(pop, ms)| {
                let mut t = track("A", "['pop']", pop);
                t.duration_ms = Some(ms);
                t
            })
            .collect();
        Fixture::new(tracks)
    }

    #[test]
    fn test_metrics() {
        let payload = fixture().run_defaults(&DataCards);
        assert_eq!(payload.figure, Figure::Blank);
        let values: Vec<_> = payload.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["3", "63.3", "3.5"]);
    }

    #[test]
    fn test_empty_selection() {
        let filters = FilterSet {
            popularity: Some(RangeFilter::new(95.0, 100.0)),
            ..Default::default()
        };
        let payload = fixture().filtered_by(filters).run_defaults(&DataCards);
        assert!(payload.cards.iter().all(|c| c.value == "No Data"));
        assert_eq!(DataCards.error_cards()[2].label, "Average Duration (minutes)");
    }
}
