use std::collections::{BTreeMap, BTreeSet};

use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{format_count, format_mean, Figure, Payload, Ridge, Ridgeline, SummaryCard};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::genres;
use crate::data::model::{value_counts, Dataset};
use crate::stats;

const AUTO_SELECTION: &str = "top_15";
const OPTION_GENRES: usize = 15;

/// Per-genre popularity distributions, stacked as a ridgeline.
pub struct PopularityLandscape;

impl Component for PopularityLandscape {
    fn id(&self) -> &'static str {
        "popularity_landscapes"
    }

    fn title(&self) -> &'static str {
        "Popularity Landscapes by Genre"
    }

    fn description(&self) -> &'static str {
        "Ridgeline plot showing popularity score distributions across different music genres."
    }

    fn layout(&self, dataset: &Dataset) -> Vec<ControlSpec> {
        let mut options = vec![ControlOption::new("Top 15 Genres", AUTO_SELECTION)];
        options.extend(dataset.top_genres(OPTION_GENRES).iter().map(|g| ControlOption::text(g)));
        vec![
            ControlSpec::new("genre_selection", "Genre Selection:", ControlKind::Dropdown(options), AUTO_SELECTION),
            ControlSpec::new(
                "num_genres",
                "Number of Genres:",
                ControlKind::Slider {
                    min: 5.0,
                    max: 15.0,
                    step: 1.0,
                },
                10.0,
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No data available after filtering".into())));
        }
        let selection = controls.text_or("genre_selection", AUTO_SELECTION)?;
        let max_genres = controls.number_or("num_genres", 10.0)?.max(0.0) as usize;

        let exploded = genres::explode(&table);
        if exploded.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No genre data available".into())));
        }
        let rows: Vec<(&str, f64, Option<&str>)> = exploded
            .iter()
            .filter_map(|(g, t)| Some((*g, t.popularity?, t.artists.as_deref())))
            .collect();
        if rows.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No valid popularity data available".into())));
        }

        let selected: Vec<&str> = if selection == AUTO_SELECTION {
            value_counts(rows.iter().map(|(g, _, _)| *g))
                .into_iter()
                .take(max_genres)
                .map(|(g, _)| g)
                .collect()
        } else {
            vec![selection]
        };
        let rows: Vec<_> = rows.into_iter().filter(|(g, _, _)| selected.contains(g)).collect();
        if rows.is_empty() {
            return Ok(Payload::figure(Figure::NoData("No data for selected genres".into())));
        }
        log::debug!("landscape: {} rows over {} genres", rows.len(), selected.len());

        let mut by_genre: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for (genre, popularity, _) in &rows {
            by_genre.entry(*genre).or_default().push(*popularity);
        }
        let mut ridges: Vec<Ridge> = by_genre
            .into_iter()
            .filter_map(|(genre, values)| {
                Some(Ridge {
                    genre: genre.to_string(),
                    median: stats::median(&values)?,
                    values,
                })
            })
            .collect();
        ridges.sort_by(|a, b| b.median.total_cmp(&a.median));

        let popularity: Vec<f64> = rows.iter().map(|(_, p, _)| *p).collect();
        let artists: BTreeSet<&str> = rows.iter().filter_map(|(_, _, a)| *a).collect();
        let cards = vec![
            SummaryCard::new("Total Tracks", format_count(rows.len())),
            SummaryCard::new("Avg Popularity", format_mean(stats::mean(&popularity), 1)),
            SummaryCard::new("Unique Artists", format_count(artists.len())),
        ];

        Ok(Payload::new(
            Figure::Ridgeline(Ridgeline {
                x_label: "Popularity Score".into(),
                ridges,
            }),
            cards,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};

    fn fixture() -> Fixture {
        Fixture::new(vec![
            track("A", "['pop', 'rock']", 80.0),
            track("B", "['pop']", 60.0),
            track("B", "['rock']", 90.0),
            track("C", "['jazz']", 20.0),
            track("C", "['jazz']", 30.0),
            track("D", "[]", 99.0),
        ])
    }

    fn ridgeline(payload: &Payload) -> &Ridgeline {
        match &payload.figure {
            Figure::Ridgeline(r) => r,
            other => panic!("expected ridgeline, got {other:?}"),
        }
    }

    #[test]
    fn test_ordered_by_descending_median() {
        let payload = fixture().run_defaults(&PopularityLandscape);
        let genres: Vec<_> = ridgeline(&payload).ridges.iter().map(|r| r.genre.as_str()).collect();
        assert_eq!(genres, vec!["rock", "pop", "jazz"]);
        assert_eq!(ridgeline(&payload).ridges[0].median, 85.0);
        // Exploded rows: the two-genre track counts twice.
        assert_eq!(payload.cards[0].value, "6");
        assert_eq!(payload.cards[2].value, "3");
    }

    #[test]
    fn test_auto_selection_respects_count() {
        let values = ControlValues::new().with("num_genres", 2.0);
        let payload = fixture().run(&PopularityLandscape, &values);
        assert_eq!(ridgeline(&payload).ridges.len(), 2);
    }

    #[test]
    fn test_explicit_genre() {
        let values = ControlValues::new().with("genre_selection", "jazz");
        let payload = fixture().run(&PopularityLandscape, &values);
        let r = ridgeline(&payload);
        assert_eq!(r.ridges.len(), 1);
        assert_eq!(r.ridges[0].values, vec![20.0, 30.0]);
        let absent = fixture().run(&PopularityLandscape, &ControlValues::new().with("genre_selection", "polka"));
        assert!(matches!(absent.figure, Figure::NoData(_)));
    }

    #[test]
    fn test_layout_offers_top_genres() {
        let fx = fixture();
        let specs = PopularityLandscape.layout(fx.table.dataset());
        let ControlKind::Dropdown(options) = &specs[0].kind else {
            panic!("expected dropdown");
        };
        assert_eq!(options.len(), 4);
        assert_eq!(options[0].label, "Top 15 Genres");
    }
}
