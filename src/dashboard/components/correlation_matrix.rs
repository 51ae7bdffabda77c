use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{track_cards, ColorScale, Figure, Heatmap, Payload};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::{AudioFeature, Dataset};
use crate::stats::correlation::correlation_matrix;

/// Pearson correlation heatmap over the selected audio features, with
/// optional significance stars.
pub struct CorrelationMatrix;

impl Component for CorrelationMatrix {
    fn id(&self) -> &'static str {
        "audio_feature_correlation_matrix"
    }

    fn title(&self) -> &'static str {
        "Audio Feature Correlation Matrix"
    }

    fn description(&self) -> &'static str {
        "Correlation heatmap showing relationships between audio features with optional significance indicators"
    }

    fn layout(&self, _: &Dataset) -> Vec<ControlSpec> {
        let all: Vec<String> = AudioFeature::DESCRIPTORS
            .iter()
            .map(|f| f.column().to_string())
            .collect();
        vec![
            ControlSpec::new(
                "features",
                "Features to Include:",
                ControlKind::Checklist(AudioFeature::DESCRIPTORS.into_iter().map(ControlOption::feature).collect()),
                all,
            ),
            ControlSpec::new("significance", "Show Significance:", ControlKind::Toggle, false),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let cards = track_cards(&table);

        let features = controls.features("features", &AudioFeature::DESCRIPTORS)?;
        let show_significance = controls.flag("significance")?;
        if features.len() < 2 {
            return Ok(Payload::new(
                Figure::InsufficientSelection(
                    "Please select at least 2 audio features to display correlation matrix".into(),
                ),
                cards,
            ));
        }
        log::debug!("correlation: features {features:?}, significance {show_significance}");

        // Listwise deletion: a row counts only if every selected feature is present.
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(table.len()); features.len()];
        for track in table.iter() {
            let row: Option<Vec<f64>> = features.iter().map(|f| track.feature(*f)).collect();
            if let Some(row) = row {
                for (column, value) in columns.iter_mut().zip(row) {
                    column.push(value);
                }
            }
        }
        if columns[0].is_empty() {
            return Ok(Payload::new(
                Figure::NoData("No valid numeric data available for selected features".into()),
                cards,
            ));
        }

        let matrix = correlation_matrix(&columns, show_significance);
        let n = matrix.size();
        let text = (0..n)
            .map(|i| (0..n).map(|j| matrix.annotation(i, j)).collect())
            .collect();
        let labels: Vec<String> = features.iter().map(|f| f.label().to_string()).collect();

        Ok(Payload::new(
            Figure::Heatmap(Heatmap {
                x_labels: labels.clone(),
                y_labels: labels,
                z: matrix.r,
                text: Some(text),
                z_range: Some((-1.0, 1.0)),
                scale: ColorScale::Diverging,
                legend: Some("Correlation Coefficient".into()),
            }),
            cards,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::Fixture;
    use crate::data::model::Track;

    fn tracks() -> Vec<Track> {
        (0..30)
            .map(|i| {
                let x = f64::from(i);
                Track {
                    popularity: Some(50.0),
                    danceability: Some(x / 30.0),
                    energy: Some(1.0 - x / 30.0),
                    valence: Some(((x * 7.0) % 11.0) / 11.0),
                    tempo: if i == 0 { None } else { Some(100.0 + x) },
                    ..Default::default()
                }
            })
            .collect()
    }

    fn heatmap(payload: &Payload) -> &Heatmap {
        match &payload.figure {
            Figure::Heatmap(h) => h,
            other => panic!("expected heatmap, got {other:?}"),
        }
    }

    fn select(features: &[&str]) -> ControlValues {
        ControlValues::new().with("features", features.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_matrix_symmetric_unit_diagonal() {
        let fx = Fixture::new(tracks());
        let payload = fx.run(&CorrelationMatrix, &select(&["danceability", "energy", "valence"]));
        let h = heatmap(&payload);
        for i in 0..3 {
            assert_eq!(h.z[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(h.z[i][j], h.z[j][i]);
            }
        }
        let r = h.z[0][1].unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert_eq!(h.y_labels, vec!["Danceability", "Energy", "Valence"]);
    }

    #[test]
    fn test_significance_stars() {
        let fx = Fixture::new(tracks());
        let values = select(&["danceability", "energy"]).with("significance", true);
        let payload = fx.run(&CorrelationMatrix, &values);
        let text = heatmap(&payload).text.clone().unwrap();
        assert_eq!(text[0][1], "-1.000***");
        assert_eq!(text[0][0], "1.000");
    }

    #[test]
    fn test_single_feature_is_insufficient() {
        let fx = Fixture::new(tracks());
        let payload = fx.run(&CorrelationMatrix, &select(&["energy"]));
        assert!(matches!(payload.figure, Figure::InsufficientSelection(_)));
        assert_eq!(payload.cards.len(), 2);
    }

    #[test]
    fn test_rows_with_missing_values_dropped() {
        // tempo is missing on one row; with loudness missing everywhere nothing is left.
        let fx = Fixture::new(tracks());
        let payload = fx.run(&CorrelationMatrix, &select(&["tempo", "loudness"]));
        assert!(matches!(payload.figure, Figure::NoData(_)));
    }

    #[test]
    fn test_constant_column_undefined() {
        let mut rows = tracks();
        for t in &mut rows {
            t.liveness = Some(0.3);
        }
        let fx = Fixture::new(rows);
        let payload = fx.run(&CorrelationMatrix, &select(&["liveness", "energy"]));
        let h = heatmap(&payload);
        assert_eq!(h.z[0][1], None);
        assert_eq!(h.z[0][0], None);
        assert_eq!(h.z[1][1], Some(1.0));
    }

    #[test]
    fn test_defaults_select_all_descriptors() {
        let fx = Fixture::new(tracks());
        let specs = CorrelationMatrix.layout(fx.table.dataset());
        let values = ControlValues::from_defaults(&specs);
        assert_eq!(values.list("features").unwrap().len(), 9);
    }
}
