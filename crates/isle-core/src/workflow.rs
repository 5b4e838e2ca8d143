//! The five-phase workflow state machine.
//!
//! Draw, Populate, Simulate, History, and Advanced are the application
//! phases; `goto` implements the transition rules deciding what gets
//! confirmed, reset, or preserved. The controller is display-free: the
//! presentation layer supplies a confirmation callback and renders the
//! snapshots held in [`SessionState`].
//!
//! Transition summary:
//! - leaving Draw normalizes the island, rebuilds the engine from the
//!   normalized map text, and clears placements, history, and the audit log
//!   (after confirmation when anything has been drawn);
//! - leaving Simulate raises the cooperative stop flag;
//! - entering Simulate lowers it so a later run may proceed;
//! - every other entry just exposes the current session snapshots.

use serde::Serialize;
use thiserror::Error;

use crate::engine::{AnimalSpec, EcologyEngine, EngineError, EngineFactory, MotionField, PlacementBatch};
use crate::grid::Terrain;
use crate::session::SessionState;
use crate::species::{Ecotype, ParamError, ParamValue, ParameterStore, Species, MOTION_TERRAINS};

/// Application phase. Initial phase is `Draw`; there is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Draw,
    Populate,
    Simulate,
    History,
    Advanced,
}

/// Asks the user to approve a destructive transition. Implemented by the
/// presentation layer; any `FnMut(&str) -> bool` closure also works.
pub trait ConfirmReset {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmReset for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves every prompt; for scripted drivers and tests.
pub fn always_confirm(_prompt: &str) -> bool {
    true
}

const RESET_PROMPT: &str =
    "Leaving the draw phase resets the simulation, population, and history. Continue?";

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Populate or simulate was requested before an engine exists.
    #[error("simulation is not ready; leave the draw phase first")]
    NotReady,
    #[error("cannot place animals in water")]
    InvalidCell,
    #[error("no cell selected; click or drop on the map first")]
    NoCellSelected,
    #[error("no species selected")]
    NoSpeciesSelected,
    #[error("{0} cannot be placed as an animal")]
    NotAnAnimal(Species),
    #[error("cell ({0}, {1}) is outside the island")]
    OutOfBounds(usize, usize),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Gates phase transitions and issues reset/restart commands against the
/// session and the external engine.
pub struct WorkflowController {
    phase: Phase,
    factory: EngineFactory,
}

impl WorkflowController {
    pub fn new(factory: EngineFactory) -> Self {
        Self { phase: Phase::Draw, factory }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Navigate to `target`, applying the transition table.
    ///
    /// Returns the phase actually in effect afterwards: `target` on success,
    /// the unchanged current phase when the user cancels the confirmation.
    /// On an engine construction failure the controller stays on the prior
    /// phase and nothing in the session is mutated.
    pub fn goto(
        &mut self,
        session: &mut SessionState,
        target: Phase,
        confirm: &mut dyn ConfirmReset,
    ) -> Result<Phase, WorkflowError> {
        if target == self.phase {
            return Ok(self.phase);
        }

        if self.phase == Phase::Draw {
            if !session.island.is_all_water() && !confirm.confirm(RESET_PROMPT) {
                log::info!("transition to {target:?} cancelled; staying on Draw");
                return Ok(self.phase);
            }
            self.restart(session)?;
        }

        if self.phase == Phase::Simulate {
            session.stop.request_stop();
        }
        if target == Phase::Simulate {
            session.stop.clear();
        }

        log::info!("phase {:?} -> {target:?}", self.phase);
        self.phase = target;
        Ok(self.phase)
    }

    /// Rebuild the session around the normalized island: fresh engine,
    /// ecotype-default parameters, cleared placements, history, and audit
    /// log. Ordered so a construction failure leaves the session untouched.
    fn restart(&self, session: &mut SessionState) -> Result<(), WorkflowError> {
        let normalized = session.island.normalize_to_minimal_square();
        let mut engine = (self.factory)(&normalized.map_text())?;

        session.params.reset_all(session.selection.ecotype);
        sync_engine_params(engine.as_mut(), &session.params)?;

        session.island = normalized;
        session.engine = Some(engine);
        session.selection.clear();
        session.history.clear();
        session.audit.clear();
        session.stop.clear();
        log::info!("session restarted for a side-{} island", session.island.side());
        Ok(())
    }

    // ── Populate ─────────────────────────────────────────────────────────

    /// Place `count` animals of `species` at the display cell `(column,
    /// row)`. The engine speaks 1-indexed (row, col) interior coordinates,
    /// so the batch location is `(row + 1, column + 1)`; that offset is
    /// load-bearing.
    pub fn place_animals(
        &mut self,
        session: &mut SessionState,
        cell: (usize, usize),
        species: Species,
        ecotype: Ecotype,
        count: u32,
    ) -> Result<(), WorkflowError> {
        session.selection.ecotype = ecotype;
        if !species.is_animal() {
            return Err(WorkflowError::NotAnAnimal(species));
        }
        let SessionState { island, engine, .. } = session;
        let engine = engine.as_mut().ok_or(WorkflowError::NotReady)?;

        let (col, row) = cell;
        if row >= island.side() || col >= island.side() {
            return Err(WorkflowError::OutOfBounds(col, row));
        }
        if island.get(row, col) == Terrain::Water {
            return Err(WorkflowError::InvalidCell);
        }

        let count = count.max(1) as usize;
        let batch = PlacementBatch {
            location: (row + 1, col + 1),
            population: vec![AnimalSpec { species, age: 0, weight: None }; count],
        };
        log::debug!("placing {count} {species}(s) at engine location {:?}", batch.location);
        engine.add_population(&[batch])?;
        Ok(())
    }

    /// Place using the pending session selection (the drag-and-drop path).
    pub fn place_selected(&mut self, session: &mut SessionState) -> Result<(), WorkflowError> {
        let cell = session.selection.cell.ok_or(WorkflowError::NoCellSelected)?;
        let species = session.selection.species.ok_or(WorkflowError::NoSpeciesSelected)?;
        let (ecotype, count) = (session.selection.ecotype, session.selection.count);
        self.place_animals(session, cell, species, ecotype, count)
    }

    /// Remove every animal from the island.
    pub fn slaughter(&mut self, session: &mut SessionState) -> Result<(), WorkflowError> {
        let engine = session.engine.as_mut().ok_or(WorkflowError::NotReady)?;
        engine.slaughter();
        log::info!("population slaughtered");
        Ok(())
    }

    /// Switch the herbivore life-history variant. Re-applies the ecotype
    /// parameter tables; when a run is already underway the engine is
    /// rebuilt and the run history cleared. Returns whether that restart
    /// happened.
    pub fn select_ecotype(
        &mut self,
        session: &mut SessionState,
        ecotype: Ecotype,
    ) -> Result<bool, WorkflowError> {
        session.selection.ecotype = ecotype;
        session.history.clear();
        session.params.apply_ecotype(ecotype);

        let mut restarted = false;
        if let Some(engine) = session.engine.as_ref() {
            if engine.year() != 0 {
                session.engine = Some((self.factory)(&session.island.map_text())?);
                restarted = true;
                log::info!("ecotype change mid-run: engine rebuilt");
            }
        }
        let SessionState { engine, params, .. } = session;
        if let Some(engine) = engine.as_mut() {
            sync_engine_params(engine.as_mut(), params)?;
        }
        Ok(restarted)
    }

    // ── Simulate ─────────────────────────────────────────────────────────

    /// Run up to `years` iterations, streaming per-year aggregates into the
    /// session history. The run halts early if the stop flag is raised; the
    /// years recorded so far are kept.
    pub fn simulate(
        &mut self,
        session: &mut SessionState,
        years: u32,
    ) -> Result<(), WorkflowError> {
        let SessionState { engine, history, stop, .. } = session;
        let engine = engine.as_mut().ok_or(WorkflowError::NotReady)?;
        stop.clear();
        engine.simulate(years, stop, &mut |report| history.push(report))?;
        log::info!("simulate finished at year {}, {} years on record", engine.year(), history.years());
        Ok(())
    }

    /// Rewind the iteration counter and drop the recorded history, keeping
    /// the population alive.
    pub fn reset_run(&mut self, session: &mut SessionState) -> Result<(), WorkflowError> {
        session.stop.request_stop();
        let engine = session.engine.as_mut().ok_or(WorkflowError::NotReady)?;
        engine.reset_year();
        session.history.clear();
        Ok(())
    }

    // ── Advanced ─────────────────────────────────────────────────────────

    /// Override one scalar parameter and log it.
    pub fn set_parameter(
        &mut self,
        session: &mut SessionState,
        species: Species,
        name: &str,
        value: f64,
    ) -> Result<(), WorkflowError> {
        let spec = session.params.set(species, name, value)?;
        if let Some(engine) = session.engine.as_mut() {
            forward_scalar(engine.as_mut(), species, spec.key, value)?;
        }
        session.audit.record(species, name, ParamValue::Number(value));
        Ok(())
    }

    /// Reset one scalar parameter to its ecotype (or definition) value.
    pub fn reset_parameter(
        &mut self,
        session: &mut SessionState,
        species: Species,
        name: &str,
    ) -> Result<(), WorkflowError> {
        let ecotype = session.selection.ecotype;
        let (spec, value) = session.params.reset(species, name, ecotype)?;
        if let Some(engine) = session.engine.as_mut() {
            forward_scalar(engine.as_mut(), species, spec.key, value)?;
        }
        session.audit.record(species, name, ParamValue::Number(value));
        Ok(())
    }

    /// Override the step length of an animal species.
    pub fn set_stride(
        &mut self,
        session: &mut SessionState,
        species: Species,
        stride: u32,
    ) -> Result<(), WorkflowError> {
        let motion = session
            .params
            .motion_mut(species)
            .ok_or(WorkflowError::NotAnAnimal(species))?;
        motion.stride = stride;
        if let Some(engine) = session.engine.as_mut() {
            engine.set_motion(species, MotionField::Stride(stride))?;
        }
        session.audit.record(species, "Stride", ParamValue::Number(stride as f64));
        Ok(())
    }

    /// Override one per-terrain movability flag of an animal species.
    pub fn set_movable(
        &mut self,
        session: &mut SessionState,
        species: Species,
        terrain: Terrain,
        flag: bool,
    ) -> Result<(), WorkflowError> {
        let motion = session
            .params
            .motion_mut(species)
            .ok_or(WorkflowError::NotAnAnimal(species))?;
        motion.set_movable(terrain, flag);
        if let Some(engine) = session.engine.as_mut() {
            engine.set_motion(species, MotionField::Movable(terrain, flag))?;
        }
        session.audit.record(species, format!("{terrain:?}"), ParamValue::Flag(flag));
        Ok(())
    }

    /// Reset every parameter of every species (movement included) to the
    /// active ecotype's values, logging each field individually under one
    /// shared timestamp: Herbivore first, then Carnivore, then Fodder.
    pub fn reset_all_parameters(
        &mut self,
        session: &mut SessionState,
    ) -> Result<(), WorkflowError> {
        session.params.reset_all(session.selection.ecotype);
        let SessionState { engine, params, audit, .. } = session;
        if let Some(engine) = engine.as_mut() {
            sync_engine_params(engine.as_mut(), params)?;
        }
        audit.record_batch(params.enumerate_all());
        Ok(())
    }
}

fn forward_scalar(
    engine: &mut dyn EcologyEngine,
    species: Species,
    key: &str,
    value: f64,
) -> Result<(), EngineError> {
    match species {
        Species::Fodder => engine.set_fodder_parameter(key, value),
        animal => engine.set_species_parameter(animal, key, value),
    }
}

/// Push every current parameter value into the engine.
fn sync_engine_params(
    engine: &mut dyn EcologyEngine,
    params: &ParameterStore,
) -> Result<(), EngineError> {
    for species in Species::ALL {
        for (spec, value) in params.iter(species) {
            forward_scalar(engine, species, spec.key, value)?;
        }
        if let Some(motion) = params.motion(species) {
            engine.set_motion(species, MotionField::Stride(motion.stride))?;
            for (&terrain, &flag) in MOTION_TERRAINS.iter().zip(&motion.movable) {
                engine.set_motion(species, MotionField::Movable(terrain, flag))?;
            }
        }
    }
    Ok(())
}
