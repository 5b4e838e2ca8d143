//! Species, ecotypes, and the parameter model.
//!
//! Parameters are defined in fixed insertion order per species so that audit
//! enumeration (and any UI listing) is deterministic: Herbivore, then
//! Carnivore, then Fodder, each in definition order with the movement
//! sub-fields last.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Terrain;

/// Closed set of parameter subjects. `Fodder` is the island-wide food growth
/// model rather than an animal, but shares the parameter plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
    Fodder,
}

impl Species {
    /// Deterministic enumeration order used by batch resets and the audit log.
    pub const ALL: [Species; 3] = [Species::Herbivore, Species::Carnivore, Species::Fodder];

    pub fn is_animal(self) -> bool {
        !matches!(self, Species::Fodder)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
            Species::Fodder => "Fodder",
        };
        f.write_str(s)
    }
}

/// Herbivore life-history variant selected in the populate phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ecotype {
    /// Fast reproduction, low parental investment.
    RSelected,
    /// Slow reproduction, high parental investment.
    KSelected,
}

impl Ecotype {
    pub fn label(self) -> &'static str {
        match self {
            Ecotype::RSelected => "R-selected",
            Ecotype::KSelected => "K-selected",
        }
    }
}

impl Default for Ecotype {
    fn default() -> Self {
        Ecotype::RSelected
    }
}

/// One parameter definition: display name, engine key, default, and the
/// slider range exposed by the advanced phase.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Short key understood by the engine setters (differs from `name` only
    /// for fodder parameters).
    pub key: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

const fn spec(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> ParamSpec {
    ParamSpec { name, key: name, default, min, max, step }
}

const fn fodder_spec(
    name: &'static str,
    key: &'static str,
    default: f64,
    min: f64,
    max: f64,
    step: f64,
) -> ParamSpec {
    ParamSpec { name, key, default, min, max, step }
}

pub const HERBIVORE_PARAMS: &[ParamSpec] = &[
    spec("w_birth", 8.0, 0.0, 20.0, 0.1),
    spec("sigma_birth", 1.5, 0.0, 10.0, 0.01),
    spec("beta", 0.9, 0.0, 5.0, 0.01),
    spec("eta", 0.05, 0.0, 3.0, 0.01),
    spec("a_half", 40.0, 0.0, 80.0, 0.5),
    spec("phi_age", 0.6, 0.0, 10.0, 0.001),
    spec("w_half", 10.0, 0.0, 20.0, 1.0),
    spec("phi_weight", 0.1, 0.0, 10.0, 0.001),
    spec("mu", 0.25, 0.0, 20.0, 0.1),
    spec("gamma", 0.2, 0.0, 3.0, 0.1),
    spec("zeta", 3.5, 0.0, 40.0, 0.1),
    spec("xi", 1.2, 0.0, 3.0, 0.1),
    spec("omega", 0.4, 0.0, 1.5, 0.01),
    spec("F", 10.0, 0.0, 100.0, 5.0),
];

pub const CARNIVORE_PARAMS: &[ParamSpec] = &[
    spec("w_birth", 6.0, 0.0, 20.0, 0.1),
    spec("sigma_birth", 1.0, 0.0, 10.0, 0.01),
    spec("beta", 0.75, 0.0, 5.0, 0.01),
    spec("eta", 0.125, 0.0, 3.0, 0.01),
    spec("a_half", 40.0, 0.0, 80.0, 0.5),
    spec("phi_age", 0.3, 0.0, 10.0, 0.001),
    spec("w_half", 4.0, 0.0, 20.0, 1.0),
    spec("phi_weight", 0.4, 0.0, 10.0, 0.001),
    spec("mu", 0.4, 0.0, 20.0, 0.1),
    spec("gamma", 0.8, 0.0, 3.0, 0.1),
    spec("zeta", 3.5, 0.0, 40.0, 0.1),
    spec("xi", 1.1, 0.0, 3.0, 0.1),
    spec("omega", 0.8, 0.0, 1.5, 0.01),
    spec("F", 50.0, 0.0, 100.0, 5.0),
    spec("DeltaPhiMax", 10.0, 0.1, 100.0, 0.1),
];

pub const FODDER_PARAMS: &[ParamSpec] = &[
    fodder_spec("Highland", "H", 300.0, 0.0, 1000.0, 10.0),
    fodder_spec("Lowland", "L", 800.0, 0.0, 1000.0, 10.0),
    fodder_spec("Mountain", "M", 0.0, 0.0, 1000.0, 10.0),
    fodder_spec("Water", "W", 0.0, 0.0, 1000.0, 10.0),
    fodder_spec("Growth reduction (alpha)", "alpha", 0.1, 0.0, 1.0, 0.01),
    fodder_spec("Growth factor (v_max)", "v_max", 800.0, 0.0, 1500.0, 10.0),
];

/// Ecotype override tables. The carnivore sets deliberately override only a
/// subset of parameters; the rest stay at their defaults.
pub const HERBIVORE_R_SELECTED: &[(&str, f64)] = &[
    ("w_birth", 10.0),
    ("sigma_birth", 4.0),
    ("zeta", 0.22),
    ("xi", 0.42),
    ("gamma", 0.9),
    ("F", 20.0),
    ("beta", 0.05),
    ("eta", 0.2),
    ("phi_age", 5.0),
    ("a_half", 2.5),
    ("phi_weight", 0.09),
    ("w_half", 3.0),
    ("mu", 17.0),
    ("omega", 0.4),
];

pub const HERBIVORE_K_SELECTED: &[(&str, f64)] = &[
    ("w_birth", 10.0),
    ("sigma_birth", 0.03),
    ("zeta", 35.0),
    ("xi", 0.3),
    ("gamma", 1.2),
    ("F", 75.0),
    ("beta", 2.0),
    ("eta", 0.05),
    ("phi_age", 0.1),
    ("a_half", 14.0),
    ("phi_weight", 0.4),
    ("w_half", 2.0),
    ("mu", 5.0),
    ("omega", 0.09),
];

pub const CARNIVORE_R_SELECTED: &[(&str, f64)] = &[
    ("phi_age", 0.45),
    ("phi_weight", 0.28),
    ("beta", 0.85),
    ("omega", 0.3),
    ("DeltaPhiMax", 10.0),
    ("F", 50.0),
];

pub const CARNIVORE_K_SELECTED: &[(&str, f64)] = &[
    ("phi_age", 0.3),
    ("beta", 0.09),
    ("omega", 0.25),
    ("DeltaPhiMax", 10.0),
    ("F", 1200.0),
    ("phi_weight", 7.0),
];

fn ecotype_table(species: Species, ecotype: Ecotype) -> &'static [(&'static str, f64)] {
    match (species, ecotype) {
        (Species::Herbivore, Ecotype::RSelected) => HERBIVORE_R_SELECTED,
        (Species::Herbivore, Ecotype::KSelected) => HERBIVORE_K_SELECTED,
        (Species::Carnivore, Ecotype::RSelected) => CARNIVORE_R_SELECTED,
        (Species::Carnivore, Ecotype::KSelected) => CARNIVORE_K_SELECTED,
        (Species::Fodder, _) => &[],
    }
}

pub fn specs_for(species: Species) -> &'static [ParamSpec] {
    match species {
        Species::Herbivore => HERBIVORE_PARAMS,
        Species::Carnivore => CARNIVORE_PARAMS,
        Species::Fodder => FODDER_PARAMS,
    }
}

/// Movement sub-fields enumerated after the scalar parameters, in this order.
pub const MOTION_TERRAINS: [Terrain; 4] =
    [Terrain::Highland, Terrain::Lowland, Terrain::Mountain, Terrain::Water];

/// Per-species motion model: step length plus per-terrain movability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub stride: u32,
    /// Movability flags in `MOTION_TERRAINS` order (H, L, M, W).
    pub movable: [bool; 4],
}

impl Default for Motion {
    fn default() -> Self {
        // Animals roam lowland and highland; mountain and water block.
        Self { stride: 1, movable: [true, true, false, false] }
    }
}

impl Motion {
    pub fn movable_on(&self, terrain: Terrain) -> bool {
        let i = MOTION_TERRAINS.iter().position(|&t| t == terrain).unwrap_or(0);
        self.movable[i]
    }

    pub fn set_movable(&mut self, terrain: Terrain, flag: bool) {
        if let Some(i) = MOTION_TERRAINS.iter().position(|&t| t == terrain) {
            self.movable[i] = flag;
        }
    }
}

/// A logged parameter value: scalar or movability flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("unknown parameter '{name}' for {species}")]
    Unknown { species: Species, name: String },
}

/// Current parameter values for every species, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStore {
    herbivore: Vec<f64>,
    carnivore: Vec<f64>,
    fodder: Vec<f64>,
    pub herbivore_motion: Motion,
    pub carnivore_motion: Motion,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            herbivore: HERBIVORE_PARAMS.iter().map(|s| s.default).collect(),
            carnivore: CARNIVORE_PARAMS.iter().map(|s| s.default).collect(),
            fodder: FODDER_PARAMS.iter().map(|s| s.default).collect(),
            herbivore_motion: Motion::default(),
            carnivore_motion: Motion::default(),
        }
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self, species: Species) -> &Vec<f64> {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
            Species::Fodder => &self.fodder,
        }
    }

    fn values_mut(&mut self, species: Species) -> &mut Vec<f64> {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
            Species::Fodder => &mut self.fodder,
        }
    }

    fn index_of(species: Species, name: &str) -> Option<usize> {
        specs_for(species).iter().position(|s| s.name == name)
    }

    pub fn get(&self, species: Species, name: &str) -> Option<f64> {
        Self::index_of(species, name).map(|i| self.values(species)[i])
    }

    /// Current (spec, value) pairs for one species, in definition order.
    pub fn iter(&self, species: Species) -> impl Iterator<Item = (&'static ParamSpec, f64)> + '_ {
        specs_for(species).iter().zip(self.values(species).iter().copied())
    }

    /// Set a single parameter, returning its spec for engine forwarding.
    pub fn set(
        &mut self,
        species: Species,
        name: &str,
        value: f64,
    ) -> Result<ParamSpec, ParamError> {
        let i = Self::index_of(species, name).ok_or_else(|| ParamError::Unknown {
            species,
            name: name.to_string(),
        })?;
        self.values_mut(species)[i] = value;
        Ok(specs_for(species)[i])
    }

    /// The value a single-field reset restores: the active ecotype's entry
    /// where the ecotype table has one, otherwise the definition default.
    pub fn reset_value(species: Species, name: &str, ecotype: Ecotype) -> Option<f64> {
        let i = Self::index_of(species, name)?;
        let table = ecotype_table(species, ecotype);
        Some(
            table
                .iter()
                .find(|(n, _)| *n == name)
                .map(|&(_, v)| v)
                .unwrap_or(specs_for(species)[i].default),
        )
    }

    /// Reset one parameter; returns (spec, restored value).
    pub fn reset(
        &mut self,
        species: Species,
        name: &str,
        ecotype: Ecotype,
    ) -> Result<(ParamSpec, f64), ParamError> {
        let value = Self::reset_value(species, name, ecotype).ok_or_else(|| ParamError::Unknown {
            species,
            name: name.to_string(),
        })?;
        let spec = self.set(species, name, value)?;
        Ok((spec, value))
    }

    /// Overlay the ecotype tables for both animal species on top of the
    /// definition defaults. Fodder is unaffected.
    pub fn apply_ecotype(&mut self, ecotype: Ecotype) {
        for species in [Species::Herbivore, Species::Carnivore] {
            let defaults: Vec<f64> = specs_for(species).iter().map(|s| s.default).collect();
            *self.values_mut(species) = defaults;
            for &(name, value) in ecotype_table(species, ecotype) {
                // Table names are compile-time constants matched against the
                // definition tables; a miss would be a defect in this file.
                let _ = self.set(species, name, value);
            }
        }
    }

    /// Restore every parameter (including motion) for the given ecotype.
    pub fn reset_all(&mut self, ecotype: Ecotype) {
        self.apply_ecotype(ecotype);
        self.fodder = FODDER_PARAMS.iter().map(|s| s.default).collect();
        self.herbivore_motion = Motion::default();
        self.carnivore_motion = Motion::default();
    }

    pub fn motion(&self, species: Species) -> Option<&Motion> {
        match species {
            Species::Herbivore => Some(&self.herbivore_motion),
            Species::Carnivore => Some(&self.carnivore_motion),
            Species::Fodder => None,
        }
    }

    pub fn motion_mut(&mut self, species: Species) -> Option<&mut Motion> {
        match species {
            Species::Herbivore => Some(&mut self.herbivore_motion),
            Species::Carnivore => Some(&mut self.carnivore_motion),
            Species::Fodder => None,
        }
    }

    /// Enumerate every (species, parameter, value) triple in audit order:
    /// species in `Species::ALL` order, scalar parameters in definition
    /// order, then stride and the movability flags for animal species.
    pub fn enumerate_all(&self) -> Vec<(Species, String, ParamValue)> {
        let mut out = Vec::new();
        for species in Species::ALL {
            for (spec, &value) in specs_for(species).iter().zip(self.values(species)) {
                out.push((species, spec.name.to_string(), ParamValue::Number(value)));
            }
            if let Some(motion) = self.motion(species) {
                out.push((species, "Stride".to_string(), ParamValue::Number(motion.stride as f64)));
                for (terrain, &flag) in MOTION_TERRAINS.iter().zip(&motion.movable) {
                    out.push((
                        species,
                        format!("{:?}", terrain),
                        ParamValue::Flag(flag),
                    ));
                }
            }
        }
        out
    }
}
