//! Boundary to the external ecology engine.
//!
//! The engine itself (birth, death, feeding, movement) is an external
//! collaborator; this module only fixes the contract the workflow drives:
//! construction from map text, population placement in the engine's
//! 1-indexed coordinate space, an interruptible year-by-year simulate, and
//! plain key/value parameter setters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::grid::Terrain;
use crate::history::YearReport;
use crate::species::Species;

/// Shared cooperative stop signal, polled by the engine between simulated
/// years. Raising it asks the run to halt at the next checkpoint; there is
/// no hard cancellation.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One animal to insert: age 0 and default weight for fresh placements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimalSpec {
    pub species: Species,
    pub age: u32,
    /// `None` asks the engine to draw its default birth weight.
    pub weight: Option<f64>,
}

/// A placement request for one cell, already shifted into the engine's
/// 1-indexed interior coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementBatch {
    /// (row, col), 1-indexed.
    pub location: (usize, usize),
    pub population: Vec<AnimalSpec>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// The map text violated the engine's shape or border rules.
    #[error("cannot start simulation: {0}")]
    Construction(String),
    #[error("engine rejected the request: {0}")]
    Rejected(String),
}

/// Motion sub-field addressed by the advanced phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionField {
    Stride(u32),
    Movable(Terrain, bool),
}

/// The simulation engine contract consumed by the workflow controller.
pub trait EcologyEngine {
    fn add_population(&mut self, batches: &[PlacementBatch]) -> Result<(), EngineError>;

    /// Run up to `years` iterations, invoking `sink` once per completed year
    /// and polling `stop` between years.
    fn simulate(
        &mut self,
        years: u32,
        stop: &StopFlag,
        sink: &mut dyn FnMut(YearReport),
    ) -> Result<(), EngineError>;

    /// Remove every animal from the island.
    fn slaughter(&mut self);

    /// Number of years simulated since construction or the last reset.
    fn year(&self) -> u32;

    /// Rewind the iteration counter without touching the population.
    fn reset_year(&mut self);

    fn set_species_parameter(
        &mut self,
        species: Species,
        key: &str,
        value: f64,
    ) -> Result<(), EngineError>;

    fn set_motion(&mut self, species: Species, field: MotionField) -> Result<(), EngineError>;

    fn set_fodder_parameter(&mut self, key: &str, value: f64) -> Result<(), EngineError>;
}

/// Builds an engine for a normalized island, given its map text.
pub type EngineFactory = Box<dyn Fn(&str) -> Result<Box<dyn EcologyEngine>, EngineError>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_flag_round_trips_and_is_shared() {
        let a = StopFlag::new();
        let b = a.clone();
        assert!(!a.should_stop());
        b.request_stop();
        assert!(a.should_stop(), "clones must observe the shared flag");
        a.clear();
        assert!(!b.should_stop());
    }
}
