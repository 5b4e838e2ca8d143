//! Per-run observable history: one per-year aggregate triple per species.
//!
//! Cleared on restart, appended to by every simulate call, and read as an
//! immutable snapshot by the history phase. An empty history is a valid,
//! renderable-as-nothing state.

use serde::Serialize;

/// Population-mean aggregates for one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearAggregates {
    pub age: f64,
    pub weight: f64,
    pub fitness: f64,
}

/// What the engine streams back per simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearReport {
    pub herbivore: YearAggregates,
    pub carnivore: YearAggregates,
}

/// Ordered per-year series for one species.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SpeciesSeries {
    pub age: Vec<f64>,
    pub weight: Vec<f64>,
    pub fitness: Vec<f64>,
}

impl SpeciesSeries {
    pub fn push(&mut self, agg: YearAggregates) {
        self.age.push(agg.age);
        self.weight.push(agg.weight);
        self.fitness.push(agg.fitness);
    }

    pub fn len(&self) -> usize {
        self.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct History {
    pub herbivore: SpeciesSeries,
    pub carnivore: SpeciesSeries,
}

impl History {
    pub fn push(&mut self, report: YearReport) {
        self.herbivore.push(report.herbivore);
        self.carnivore.push(report.carnivore);
    }

    /// Number of recorded years (both series always advance together).
    pub fn years(&self) -> usize {
        self.herbivore.len()
    }

    pub fn is_empty(&self) -> bool {
        self.herbivore.is_empty() && self.carnivore.is_empty()
    }

    pub fn clear(&mut self) {
        *self = History::default();
    }
}
