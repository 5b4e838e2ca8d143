//! Interactive island-ecology workbench core.
//!
//! Everything the presentation layer needs to drive an island ecosystem
//! study, with no rendering or widget code of its own:
//!
//! - [`grid`]: the square island surface and its pure algorithms
//!   (paint, resize, normalize to a minimal square);
//! - [`noise`]: Perlin-based terrain autocomplete for water cells;
//! - [`species`]: species, ecotypes, and the parameter model;
//! - [`audit`]: append-only log of parameter overrides;
//! - [`history`]: per-year aggregate series recorded during a run;
//! - [`engine`]: the boundary trait to the external simulation engine;
//! - [`session`]: the single owner of all shared session state;
//! - [`workflow`]: the five-phase state machine tying it together.

pub mod audit;
pub mod engine;
pub mod grid;
pub mod history;
pub mod noise;
pub mod session;
pub mod species;
pub mod workflow;

pub use engine::{EcologyEngine, EngineError, EngineFactory, StopFlag};
pub use grid::{Terrain, TerrainGrid};
pub use session::SessionState;
pub use species::{Ecotype, Species};
pub use workflow::{Phase, WorkflowController, WorkflowError};
