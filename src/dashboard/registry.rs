use super::components::{
    ArtistRadar, CorrelationMatrix, DataCards, DataTable, FeatureDistribution, FeatureHistogram,
    GenreEvolution, GenreFingerprint, HitFormulaScatter, PopularityBars, PopularityLandscape,
    TempoEnergyDensity,
};
use super::Component;

/// Static, ordered list of dashboard components.
pub struct Registry {
    components: Vec<Box<dyn Component>>,
}

impl Registry {
    pub fn new(components: Vec<Box<dyn Component>>) -> Self {
        Registry { components }
    }

    /// Every component in display order: summary cards and table first,
    /// then the charts.
    pub fn standard() -> Self {
        Registry::new(vec![
            Box::new(DataCards),
            Box::new(DataTable),
            Box::new(HitFormulaScatter),
            Box::new(GenreFingerprint),
            Box::new(ArtistRadar),
            Box::new(FeatureHistogram),
            Box::new(CorrelationMatrix),
            Box::new(TempoEnergyDensity),
            Box::new(PopularityLandscape),
            Box::new(FeatureDistribution),
            Box::new(PopularityBars),
            Box::new(GenreEvolution),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| &**c)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Component> {
        self.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_standard_order_and_unique_ids() {
        let registry = Registry::standard();
        let ids: Vec<_> = registry.iter().map(|c| c.id()).collect();
        assert_eq!(ids.first(), Some(&"data_cards"));
        assert_eq!(ids.last(), Some(&"genre_evolution_sparklines"));
        assert_eq!(ids.iter().collect::<BTreeSet<_>>().len(), ids.len());
        assert!(registry.get("bar_chart").is_some());
        assert!(registry.get("filter_component").is_none());
    }
}
