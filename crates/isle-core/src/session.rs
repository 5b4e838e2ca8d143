//! Process-wide session state.
//!
//! One explicitly owned value for everything the phases share: the island,
//! the pending placement selection, the engine handle, parameter values, the
//! audit log, run history, and the stop flag. Components receive it by
//! mutable reference for the duration of a phase; nothing keeps independent
//! copies and there are no statics.

use crate::audit::AuditLog;
use crate::engine::{EcologyEngine, StopFlag};
use crate::grid::{Terrain, TerrainGrid};
use crate::history::History;
use crate::species::{Ecotype, ParameterStore, Species};

/// Scratch selection driven by the populate phase UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementSelection {
    /// Display cell as (column, row), 0-indexed.
    pub cell: Option<(usize, usize)>,
    pub species: Option<Species>,
    pub count: u32,
    pub ecotype: Ecotype,
}

impl PlacementSelection {
    pub fn clear(&mut self) {
        let ecotype = self.ecotype;
        *self = PlacementSelection { ecotype, ..PlacementSelection::default() };
    }
}

/// Single owner of all shared mutable session data. Lives from process start
/// to process exit; the island is replaced wholesale on normalization but
/// never destroyed mid-session.
pub struct SessionState {
    pub island: TerrainGrid,
    /// Terrain currently applied by paint strokes.
    pub brush: Terrain,
    pub selection: PlacementSelection,
    /// `None` until the draw phase has been left at least once.
    pub engine: Option<Box<dyn EcologyEngine>>,
    pub params: ParameterStore,
    pub audit: AuditLog,
    pub history: History,
    pub stop: StopFlag,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            island: TerrainGrid::default(),
            brush: Terrain::Water,
            selection: PlacementSelection::default(),
            engine: None,
            params: ParameterStore::new(),
            audit: AuditLog::new(),
            history: History::default(),
            stop: StopFlag::new(),
        }
    }

    pub fn engine_ready(&self) -> bool {
        self.engine.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_default_island_and_no_engine() {
        let s = SessionState::new();
        assert_eq!(s.island.side(), 21);
        assert!(s.island.is_all_water());
        assert!(!s.engine_ready());
        assert!(s.history.is_empty());
        assert!(s.audit.is_empty());
    }

    #[test]
    fn selection_clear_keeps_the_ecotype() {
        let mut sel = PlacementSelection {
            cell: Some((3, 4)),
            species: Some(Species::Herbivore),
            count: 7,
            ecotype: Ecotype::KSelected,
        };
        sel.clear();
        assert_eq!(sel.cell, None);
        assert_eq!(sel.species, None);
        assert_eq!(sel.count, 0);
        assert_eq!(sel.ecotype, Ecotype::KSelected);
    }
}
