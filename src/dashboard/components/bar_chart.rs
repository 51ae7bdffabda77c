use std::collections::BTreeMap;

use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, Bar, BarChart, Figure, Payload};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::{key_name, mode_name, Dataset, Track};

const LIMITS: [f64; 4] = [10.0, 15.0, 20.0, 25.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupBy {
    Artists,
    Key,
    Mode,
}

impl GroupBy {
    fn parse(value: &str) -> Result<Self, ComponentError> {
        match value {
            "artists" => Ok(GroupBy::Artists),
            "key" => Ok(GroupBy::Key),
            "mode" => Ok(GroupBy::Mode),
            other => Err(ComponentError::InvalidControl {
                control: "groupby".into(),
                reason: format!("unknown grouping '{other}'"),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            GroupBy::Artists => "Artists",
            GroupBy::Key => "Key",
            GroupBy::Mode => "Mode",
        }
    }

    fn group_of(self, track: &Track) -> Option<&str> {
        match self {
            GroupBy::Artists => track.artists.as_deref(),
            GroupBy::Key => track.key.and_then(key_name),
            GroupBy::Mode => track.mode.and_then(mode_name),
        }
    }
}

/// Mean popularity per artist, key or mode, top N descending.
pub struct PopularityBars;

impl Component for PopularityBars {
    fn id(&self) -> &'static str {
        "bar_chart"
    }

    fn title(&self) -> &'static str {
        "Aurora Music Popularity Dashboard"
    }

    fn description(&self) -> &'static str {
        "Interactive bar chart showing music popularity with aurora-inspired gradients and summary statistics"
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        vec![
            ControlSpec::new(
                "groupby",
                "Group By:",
                ControlKind::Dropdown(vec![
                    ControlOption::new("Artists", "artists"),
                    ControlOption::new("Key", "key"),
                    ControlOption::new("Mode", "mode"),
                ]),
                "artists",
            ),
            ControlSpec::new(
                "limit",
                "Show Top:",
                ControlKind::Dropdown(
                    LIMITS
                        .iter()
                        .map(|n| ControlOption::new(format!("Top {n}"), *n))
                        .collect(),
                ),
                15.0,
            ),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let group_by = GroupBy::parse(controls.text_or("groupby", "artists")?)?;
        let limit = controls.number_or("limit", 15.0)?;
        if !(limit >= 1.0) {
            return Err(ComponentError::InvalidControl {
                control: "limit".into(),
                reason: format!("{limit} is not a positive count"),
            });
        }
        log::debug!("bar_chart: {} rows, groupby {:?}, limit {}", table.len(), group_by, limit);

        // Sorted key order first, so the stable sort below breaks ties by key.
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for track in table.iter() {
            let Some(group) = group_of_nonblank(group_by, track) else {
                continue;
            };
            let entry = sums.entry(group).or_default();
            if let Some(p) = track.popularity {
                entry.0 += p;
                entry.1 += 1;
            }
        }
        let mut bars: Vec<Bar> = sums
            .into_iter()
            .filter(|(_, (_, n))| *n > 0)
            .map(|(label, (sum, n))| Bar {
                label: label.to_string(),
                value: sum / n as f64,
            })
            .collect();
        bars.sort_by(|a, b| b.value.total_cmp(&a.value));
        bars.truncate(limit as usize);

        Ok(Payload::new(
            Figure::Bar(BarChart {
                x_label: group_by.label().to_string(),
                y_label: "Popularity".to_string(),
                bars,
            }),
            track_cards(&table),
        ))
    }
}

fn group_of_nonblank(group_by: GroupBy, track: &Track) -> Option<&str> {
    group_by.group_of(track).filter(|g| !g.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};

    fn bars(payload: &Payload) -> Vec<(String, f64)> {
        match &payload.figure {
            Figure::Bar(chart) => chart.bars.iter().map(|b| (b.label.clone(), b.value)).collect(),
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn test_groups_by_artist_descending() {
        let fx = Fixture::new(vec![
            track("A", "[]", 10.0),
            track("A", "[]", 30.0),
            track("B", "[]", 50.0),
            track("C", "[]", 20.0),
        ]);
        let payload = fx.run_defaults(&PopularityBars);
        assert_eq!(
            bars(&payload),
            vec![("B".into(), 50.0), ("A".into(), 20.0), ("C".into(), 20.0)]
        );
        assert_eq!(payload.cards[0].value, "4");
        assert_eq!(payload.cards[1].value, "27.5");
    }

    #[test]
    fn test_key_names_and_limit() {
        let tracks = (0..12)
            .map(|k| Track {
                key: Some(k),
                popularity: Some(k as f64),
                ..Default::default()
            })
            .collect();
        let fx = Fixture::new(tracks);
        let values = ControlValues::new().with("groupby", "key").with("limit", 10.0);
        let out = bars(&fx.run(&PopularityBars, &values));
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], ("B".into(), 11.0));
        assert_eq!(out[9].0, "D");
    }

    #[test]
    fn test_mode_names() {
        let mut major = track("A", "[]", 80.0);
        major.mode = Some(1);
        let mut minor = track("B", "[]", 40.0);
        minor.mode = Some(0);
        let fx = Fixture::new(vec![major, minor]);
        let out = bars(&fx.run(&PopularityBars, &ControlValues::new().with("groupby", "mode")));
        assert_eq!(out, vec![("Major".into(), 80.0), ("Minor".into(), 40.0)]);
    }

    #[test]
    fn test_empty_table_is_no_data() {
        let fx = Fixture::new(Vec::new());
        assert!(matches!(fx.run_defaults(&PopularityBars).figure, Figure::NoData(_)));
    }

    #[test]
    fn test_unknown_grouping_is_an_error() {
        let fx = Fixture::new(vec![track("A", "[]", 1.0)]);
        let err = fx
            .try_run(&PopularityBars, &ControlValues::new().with("groupby", "tempo"))
            .unwrap_err();
        assert!(matches!(err, ComponentError::InvalidControl { .. }));
    }
}
