//! A self-contained stand-in for the external ecology engine.
//!
//! Implements [`EcologyEngine`] with deliberately simple deterministic
//! dynamics (aging, weight decay, a crude predation coupling) so the
//! workflow can be driven end to end from the command line without the
//! real simulation backend. Not an ecological model.

use std::collections::HashMap;

use isle_core::engine::{
    AnimalSpec, EcologyEngine, EngineError, MotionField, PlacementBatch, StopFlag,
};
use isle_core::grid::{Terrain, TerrainGrid};
use isle_core::history::{YearAggregates, YearReport};
use isle_core::species::Species;

#[derive(Debug, Clone, Copy)]
struct Animal {
    age: u32,
    weight: f64,
}

#[derive(Debug)]
pub struct DemoEngine {
    island: TerrainGrid,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
    herb_params: HashMap<String, f64>,
    carn_params: HashMap<String, f64>,
    fodder_params: HashMap<String, f64>,
    year: u32,
}

impl DemoEngine {
    /// Validate map text the way the real engine does: square, known codes,
    /// and an all-water outer ring.
    pub fn from_map_text(text: &str) -> Result<Self, EngineError> {
        let island = TerrainGrid::from_map_text(text)
            .map_err(|e| EngineError::Construction(e.to_string()))?;
        let side = island.side();
        for k in 0..side {
            let edge = island.get(0, k) != Terrain::Water
                || island.get(side - 1, k) != Terrain::Water
                || island.get(k, 0) != Terrain::Water
                || island.get(k, side - 1) != Terrain::Water;
            if edge {
                return Err(EngineError::Construction(
                    "map boundary must be water".to_string(),
                ));
            }
        }
        Ok(Self {
            island,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
            herb_params: HashMap::new(),
            carn_params: HashMap::new(),
            fodder_params: HashMap::new(),
            year: 0,
        })
    }

    pub fn island(&self) -> &TerrainGrid {
        &self.island
    }

    pub fn population(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores.len(),
            Species::Carnivore => self.carnivores.len(),
            Species::Fodder => 0,
        }
    }

    fn param(&self, species: Species, key: &str, fallback: f64) -> f64 {
        let map = match species {
            Species::Herbivore => &self.herb_params,
            Species::Carnivore => &self.carn_params,
            Species::Fodder => &self.fodder_params,
        };
        map.get(key).copied().unwrap_or(fallback)
    }

    fn aggregates(animals: &[Animal]) -> YearAggregates {
        if animals.is_empty() {
            return YearAggregates { age: 0.0, weight: 0.0, fitness: 0.0 };
        }
        let n = animals.len() as f64;
        let age = animals.iter().map(|a| a.age as f64).sum::<f64>() / n;
        let weight = animals.iter().map(|a| a.weight).sum::<f64>() / n;
        // Monotone in weight, bounded to [0, 1]; enough for plotting demos.
        let fitness = animals
            .iter()
            .map(|a| a.weight / (a.weight + 10.0 + a.age as f64))
            .sum::<f64>()
            / n;
        YearAggregates { age, weight, fitness }
    }

    fn step_year(&mut self) {
        let eta_h = self.param(Species::Herbivore, "eta", 0.05);
        let beta_h = self.param(Species::Herbivore, "beta", 0.9);
        let fodder = self.param(Species::Fodder, "L", 800.0);
        // More fodder per head means more gained weight, capped per animal.
        let herb_count = self.herbivores.len().max(1) as f64;
        let intake = (fodder / herb_count).min(10.0);
        for a in &mut self.herbivores {
            a.age += 1;
            a.weight = (a.weight * (1.0 - eta_h) + beta_h * intake).max(0.0);
        }

        let eta_c = self.param(Species::Carnivore, "eta", 0.125);
        let beta_c = self.param(Species::Carnivore, "beta", 0.75);
        let prey = self.herbivores.len() as f64;
        let hunters = self.carnivores.len().max(1) as f64;
        let catch = (prey / hunters).min(5.0);
        for a in &mut self.carnivores {
            a.age += 1;
            a.weight = (a.weight * (1.0 - eta_c) + beta_c * catch).max(0.0);
        }

        // Starved animals drop out.
        self.herbivores.retain(|a| a.weight > 0.1);
        self.carnivores.retain(|a| a.weight > 0.1);
        self.year += 1;
    }
}

impl EcologyEngine for DemoEngine {
    fn add_population(&mut self, batches: &[PlacementBatch]) -> Result<(), EngineError> {
        for batch in batches {
            let (row, col) = batch.location;
            let side = self.island.side();
            if row == 0 || col == 0 || row >= side || col >= side {
                return Err(EngineError::Rejected(format!(
                    "location ({row}, {col}) is outside the island"
                )));
            }
            // 1-indexed engine coordinates.
            if self.island.get(row - 1, col - 1) == Terrain::Water {
                return Err(EngineError::Rejected(format!(
                    "location ({row}, {col}) is water"
                )));
            }
            for spec in &batch.population {
                let AnimalSpec { species, age, weight } = *spec;
                let default_weight = self.param(species, "w_birth", 8.0);
                let animal = Animal { age, weight: weight.unwrap_or(default_weight) };
                match species {
                    Species::Herbivore => self.herbivores.push(animal),
                    Species::Carnivore => self.carnivores.push(animal),
                    Species::Fodder => {
                        return Err(EngineError::Rejected(
                            "fodder is not a placeable animal".to_string(),
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    fn simulate(
        &mut self,
        years: u32,
        stop: &StopFlag,
        sink: &mut dyn FnMut(YearReport),
    ) -> Result<(), EngineError> {
        for _ in 0..years {
            if stop.should_stop() {
                log::info!("demo engine stopped at year {}", self.year);
                break;
            }
            self.step_year();
            sink(YearReport {
                herbivore: Self::aggregates(&self.herbivores),
                carnivore: Self::aggregates(&self.carnivores),
            });
        }
        Ok(())
    }

    fn slaughter(&mut self) {
        self.herbivores.clear();
        self.carnivores.clear();
    }

    fn year(&self) -> u32 {
        self.year
    }

    fn reset_year(&mut self) {
        self.year = 0;
    }

    fn set_species_parameter(
        &mut self,
        species: Species,
        key: &str,
        value: f64,
    ) -> Result<(), EngineError> {
        match species {
            Species::Herbivore => self.herb_params.insert(key.to_string(), value),
            Species::Carnivore => self.carn_params.insert(key.to_string(), value),
            Species::Fodder => {
                return Err(EngineError::Rejected(
                    "use the fodder setter for fodder parameters".to_string(),
                ))
            }
        };
        Ok(())
    }

    fn set_motion(&mut self, _species: Species, _field: MotionField) -> Result<(), EngineError> {
        // The demo dynamics are spatially uniform; motion settings are
        // accepted and ignored.
        Ok(())
    }

    fn set_fodder_parameter(&mut self, key: &str, value: f64) -> Result<(), EngineError> {
        self.fodder_params.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "WWWW\nWLLW\nWLHW\nWWWW";

    #[test]
    fn construction_rejects_land_on_the_border() {
        assert!(DemoEngine::from_map_text(TINY).is_ok());
        let err = DemoEngine::from_map_text("WWW\nLWW\nWWW").unwrap_err();
        assert!(matches!(err, EngineError::Construction(_)));
        let err = DemoEngine::from_map_text("WWW\nWW").unwrap_err();
        assert!(matches!(err, EngineError::Construction(_)));
    }

    #[test]
    fn placement_validates_location_and_species() {
        let mut e = DemoEngine::from_map_text(TINY).unwrap();
        let animal = AnimalSpec { species: Species::Herbivore, age: 0, weight: None };

        e.add_population(&[PlacementBatch { location: (2, 2), population: vec![animal; 3] }])
            .unwrap();
        assert_eq!(e.population(Species::Herbivore), 3);

        let water = PlacementBatch { location: (1, 1), population: vec![animal] };
        assert!(matches!(e.add_population(&[water]), Err(EngineError::Rejected(_))));

        let fodder = PlacementBatch {
            location: (2, 2),
            population: vec![AnimalSpec { species: Species::Fodder, age: 0, weight: None }],
        };
        assert!(matches!(e.add_population(&[fodder]), Err(EngineError::Rejected(_))));
    }

    #[test]
    fn default_weight_comes_from_w_birth() {
        let mut e = DemoEngine::from_map_text(TINY).unwrap();
        e.set_species_parameter(Species::Herbivore, "w_birth", 12.5).unwrap();
        let animal = AnimalSpec { species: Species::Herbivore, age: 0, weight: None };
        e.add_population(&[PlacementBatch { location: (2, 2), population: vec![animal] }])
            .unwrap();
        assert!((e.herbivores[0].weight - 12.5).abs() < 1e-12);
    }

    #[test]
    fn simulate_reports_one_aggregate_per_year() {
        let mut e = DemoEngine::from_map_text(TINY).unwrap();
        let animal = AnimalSpec { species: Species::Herbivore, age: 0, weight: Some(8.0) };
        e.add_population(&[PlacementBatch { location: (2, 2), population: vec![animal; 4] }])
            .unwrap();

        let stop = StopFlag::new();
        let mut reports = Vec::new();
        e.simulate(6, &stop, &mut |r| reports.push(r)).unwrap();
        assert_eq!(reports.len(), 6);
        assert_eq!(e.year(), 6);
        // Ages advance one per year for the surviving cohort.
        assert!((reports[5].herbivore.age - 6.0).abs() < 1e-12);
    }

    #[test]
    fn raised_stop_flag_yields_zero_reports() {
        let mut e = DemoEngine::from_map_text(TINY).unwrap();
        let stop = StopFlag::new();
        stop.request_stop();
        let mut reports = Vec::new();
        e.simulate(100, &stop, &mut |r| reports.push(r)).unwrap();
        assert!(reports.is_empty());
        assert_eq!(e.year(), 0);
    }

    #[test]
    fn slaughter_and_reset_year_are_independent() {
        let mut e = DemoEngine::from_map_text(TINY).unwrap();
        let animal = AnimalSpec { species: Species::Carnivore, age: 2, weight: Some(6.0) };
        e.add_population(&[PlacementBatch { location: (3, 2), population: vec![animal; 2] }])
            .unwrap();
        e.simulate(3, &StopFlag::new(), &mut |_| {}).unwrap();

        e.reset_year();
        assert_eq!(e.year(), 0);
        assert_eq!(e.population(Species::Carnivore), 2, "reset_year keeps animals");

        e.slaughter();
        assert_eq!(e.population(Species::Carnivore), 0);
    }
}
