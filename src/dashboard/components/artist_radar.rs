use crate::dashboard::controls::{ControlKind, ControlOption, ControlSpec, ControlValues};
use crate::dashboard::payload::{Figure, Payload, Radar, RadarSeries};
use crate::dashboard::{Component, ComponentError, UpdateContext};
use crate::data::model::{AudioFeature, Dataset, Track};
use crate::stats;

/// An artist's mean audio profile, optionally against the filtered average.
pub struct ArtistRadar;

fn profile(tracks: &[&Track]) -> Vec<Option<f64>> {
    AudioFeature::PROFILE
        .iter()
        .map(|f| stats::mean_present(tracks.iter().map(|t| t.feature(*f))))
        .collect()
}

impl Component for ArtistRadar {
    fn id(&self) -> &'static str {
        "artist_spotlight_radar_chart"
    }

    fn title(&self) -> &'static str {
        "Artist Spotlight Radar Chart"
    }

    fn description(&self) -> &'static str {
        "Visualize an artist's audio DNA profile with optional genre comparison"
    }

    fn layout(&self, dataset: &Dataset) -> Vec<ControlSpec> {
        let default = dataset
            .unique_artists
            .iter()
            .next()
            .map(String::as_str)
            .unwrap_or_default();
        vec![
            ControlSpec::new(
                "artist",
                "Select Artist:",
                ControlKind::Dropdown(dataset.unique_artists.iter().map(|a| ControlOption::text(a)).collect()),
                default,
            ),
            ControlSpec::new("compare", "Compare with Genre Average:", ControlKind::Toggle, false),
        ]
    }

    fn update(&self, ctx: &UpdateContext<'_>, controls: &ControlValues) -> Result<Payload, ComponentError> {
        let table = ctx.filtered();
        if table.is_empty() {
            return Ok(Payload::no_data());
        }
        let artist = controls.text_or("artist", "")?;
        let compare = controls.flag("compare")?;
        if artist.is_empty() {
            return Ok(Payload::figure(Figure::InsufficientSelection(
                "Please select an artist from the dropdown".into(),
            )));
        }

        let artist_tracks: Vec<&Track> = table
            .iter()
            .filter(|t| t.artists.as_deref() == Some(artist))
            .collect();
        if artist_tracks.is_empty() {
            return Ok(Payload::figure(Figure::NoData(format!("No data available for {artist}"))));
        }
        log::debug!("radar: artist {artist}, compare {compare}");

        let mut series = vec![RadarSeries {
            name: artist.to_string(),
            values: profile(&artist_tracks),
        }];
        if compare {
            series.push(RadarSeries {
                name: "Dataset Average".into(),
                values: profile(&table.iter().collect::<Vec<_>>()),
            });
        }

        Ok(Payload::figure(Figure::Radar(Radar {
            axes: AudioFeature::PROFILE.iter().map(|f| f.label().to_string()).collect(),
            series,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::components::fixtures::{track, Fixture};

    fn fixture() -> Fixture {
        let mut a1 = track("Adele", "[]", 80.0);
        a1.energy = Some(0.4);
        a1.valence = Some(0.2);
        let mut a2 = track("Adele", "[]", 70.0);
        a2.energy = Some(0.6);
        let mut b = track("Beck", "[]", 60.0);
        b.energy = Some(1.0);
        Fixture::new(vec![a1, a2, b])
    }

    fn radar(payload: &Payload) -> &Radar {
        match &payload.figure {
            Figure::Radar(r) => r,
            other => panic!("expected radar, got {other:?}"),
        }
    }

    #[test]
    fn test_default_artist_is_first_alphabetically() {
        let fx = fixture();
        let payload = fx.run_defaults(&ArtistRadar);
        let r = radar(&payload);
        assert_eq!(r.series.len(), 1);
        assert_eq!(r.series[0].name, "Adele");
        let energy = AudioFeature::PROFILE
            .iter()
            .position(|f| *f == AudioFeature::Energy)
            .unwrap();
        assert!((r.series[0].values[energy].unwrap() - 0.5).abs() < 1e-12);
        // Missing features stay undefined rather than zero.
        assert_eq!(r.series[0].values[0], None);
    }

    #[test]
    fn test_compare_adds_dataset_average() {
        let fx = fixture();
        let values = ControlValues::new().with("artist", "Beck").with("compare", true);
        let r = radar(&fx.run(&ArtistRadar, &values)).clone();
        assert_eq!(r.series[1].name, "Dataset Average");
        let energy = AudioFeature::PROFILE
            .iter()
            .position(|f| *f == AudioFeature::Energy)
            .unwrap();
        assert!((r.series[1].values[energy].unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sentinels() {
        let fx = fixture();
        let none = fx.run(&ArtistRadar, &ControlValues::new());
        assert!(matches!(none.figure, Figure::InsufficientSelection(_)));
        let absent = fx.run(&ArtistRadar, &ControlValues::new().with("artist", "Zappa"));
        assert_eq!(absent.figure, Figure::NoData("No data available for Zappa".into()));
    }
}
