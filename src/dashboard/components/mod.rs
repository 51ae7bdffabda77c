//! One module per chart. Each component reads the memoized filtered view,
//! shapes it, and returns a [`Payload`](super::payload::Payload); none of
//! them draws anything.

mod artist_radar;
mod bar_chart;
mod correlation_matrix;
mod data_cards;
mod data_table;
mod feature_distribution;
mod genre_evolution;
mod genre_fingerprint;
mod histogram;
mod hit_formula;
mod popularity_landscape;
mod tempo_energy;

pub use artist_radar::ArtistRadar;
pub use bar_chart::PopularityBars;
pub use correlation_matrix::CorrelationMatrix;
pub use data_cards::DataCards;
pub use data_table::DataTable;
pub use feature_distribution::FeatureDistribution;
pub use genre_evolution::GenreEvolution;
pub use genre_fingerprint::GenreFingerprint;
pub use histogram::FeatureHistogram;
pub use hit_formula::HitFormulaScatter;
pub use popularity_landscape::PopularityLandscape;
pub use tempo_energy::TempoEnergyDensity;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use crate::dashboard::controls::ControlValues;
    use crate::dashboard::payload::Payload;
    use crate::dashboard::{Component, ComponentError, UpdateContext};
    use crate::data::cache::MemoCache;
    use crate::data::filter::FilterSet;
    use crate::data::model::{Dataset, Track, TrackTable};

    pub fn track(artist: &str, genres: &str, popularity: f64) -> Track {
        Track {
            artists: Some(artist.to_string()),
            genres: Some(genres.to_string()),
            popularity: Some(popularity),
            ..Default::default()
        }
    }

    pub struct Fixture {
        pub table: TrackTable,
        pub filters: FilterSet,
        pub cache: MemoCache,
    }

    impl Fixture {
        pub fn new(tracks: Vec<Track>) -> Self {
            Fixture {
                table: TrackTable::full(Arc::new(Dataset::from_tracks(tracks, Vec::new()))),
                filters: FilterSet::default(),
                cache: MemoCache::new(),
            }
        }

        pub fn filtered_by(mut self, filters: FilterSet) -> Self {
            self.filters = filters;
            self
        }

        pub fn try_run(&self, component: &dyn Component, values: &ControlValues) -> Result<Payload, ComponentError> {
            let ctx = UpdateContext {
                table: &self.table,
                filters: &self.filters,
                cache: &self.cache,
            };
            component.update(&ctx, values)
        }

        pub fn run(&self, component: &dyn Component, values: &ControlValues) -> Payload {
            self.try_run(component, values).unwrap()
        }

        /// Run with the component's layout defaults.
        pub fn run_defaults(&self, component: &dyn Component) -> Payload {
            let specs = component.layout(self.table.dataset());
            self.run(component, &ControlValues::from_defaults(&specs))
        }
    }
}
