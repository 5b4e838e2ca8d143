//! Command-line driver for the island workbench.
//!
//! Three entry points: `autocomplete` renders a noise-classified island as
//! map text, `normalize` trims map text read from stdin to its minimal
//! square, and `demo` scripts one full workflow pass (draw, populate,
//! simulate, report) against the built-in demo engine.

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use isle_core::engine::EngineFactory;
use isle_core::grid::{Terrain, TerrainGrid, DEFAULT_SIDE, MAX_SIDE, MIN_SIDE};
use isle_core::noise::{ClassifyThresholds, NoiseClassifier, DEFAULT_OCTAVES};
use isle_core::session::SessionState;
use isle_core::species::{Ecotype, Species};
use isle_core::workflow::{always_confirm, Phase, WorkflowController};
use isle_core::EcologyEngine;

mod demo_engine;

use demo_engine::DemoEngine;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "isle", about = "Island ecosystem workbench", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an island with the noise autocomplete and print its map text.
    Autocomplete {
        /// Island side length (clamped to the editable range)
        #[arg(long, default_value_t = DEFAULT_SIDE)]
        side: usize,

        /// Noise seed (random when omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Octave count; higher reads as denser land
        #[arg(long, default_value_t = DEFAULT_OCTAVES)]
        octaves: u32,

        /// Water/lowland threshold
        #[arg(long, default_value_t = ClassifyThresholds::default().lower)]
        lower: f64,

        /// Lowland/highland threshold
        #[arg(long, default_value_t = ClassifyThresholds::default().middle)]
        middle: f64,

        /// Highland/mountain threshold
        #[arg(long, default_value_t = ClassifyThresholds::default().upper)]
        upper: f64,
    },

    /// Read map text from stdin and print its minimal-square normalization.
    Normalize,

    /// Script one full workflow pass against the built-in demo engine.
    Demo {
        /// Noise seed for the generated island (random when omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// Herbivores to place at the island's land centroid
        #[arg(long, default_value_t = 20)]
        herbivores: u32,

        /// Carnivores to place at the same cell
        #[arg(long, default_value_t = 5)]
        carnivores: u32,

        /// Years to simulate
        #[arg(long, default_value_t = 50)]
        years: u32,

        /// Use the K-selected herbivore ecotype
        #[arg(long)]
        k_selected: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    match Args::parse().command {
        Command::Autocomplete { side, seed, octaves, lower, middle, upper } => {
            let side = side.clamp(MIN_SIDE, MAX_SIDE);
            let seed = seed.unwrap_or_else(rand::random);
            log::info!("autocomplete: side {side}, seed {seed}, {octaves} octaves");

            let thresholds = ClassifyThresholds { lower, middle, upper };
            let classifier = NoiseClassifier::with_thresholds(seed, octaves, thresholds);
            let mut island = TerrainGrid::new(side);
            classifier.classify(&mut island);
            println!("{}", island.map_text());
        }

        Command::Normalize => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading map text from stdin")?;
            let island = TerrainGrid::from_map_text(&text).context("parsing map text")?;
            println!("{}", island.normalize_to_minimal_square().map_text());
        }

        Command::Demo { seed, herbivores, carnivores, years, k_selected } => {
            run_demo(seed, herbivores, carnivores, years, k_selected)?;
        }
    }
    Ok(())
}

// ── Demo workflow ────────────────────────────────────────────────────────────

fn run_demo(
    seed: Option<u32>,
    herbivores: u32,
    carnivores: u32,
    years: u32,
    k_selected: bool,
) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let ecotype = if k_selected { Ecotype::KSelected } else { Ecotype::RSelected };
    log::info!("demo: seed {seed}, {herbivores}H/{carnivores}C, {years} years");

    let factory: EngineFactory = Box::new(|map_text| {
        DemoEngine::from_map_text(map_text)
            .map(|e| Box::new(e) as Box<dyn EcologyEngine>)
    });
    let mut controller = WorkflowController::new(factory);
    let mut session = SessionState::new();

    // Draw phase: let the autocomplete produce the island.
    NoiseClassifier::new(seed, DEFAULT_OCTAVES).classify(&mut session.island);

    // Leaving Draw normalizes the island and builds the engine.
    controller.goto(&mut session, Phase::Populate, &mut always_confirm)?;
    eprintln!("island ({}x{}):", session.island.side(), session.island.side());
    eprintln!("{}", session.island.map_text());

    // Populate at the land centroid; centroid is (row, col), cells are
    // addressed as (column, row). The centroid of a concave island can fall
    // on water, so fall back to the first land cell.
    let cell = land_cell(&session.island)
        .context("the generated island has no land; try another seed")?;
    controller
        .place_animals(&mut session, cell, Species::Herbivore, ecotype, herbivores)
        .with_context(|| format!("placing herbivores at {cell:?}"))?;
    if carnivores > 0 {
        controller
            .place_animals(&mut session, cell, Species::Carnivore, ecotype, carnivores)
            .with_context(|| format!("placing carnivores at {cell:?}"))?;
    }

    controller.goto(&mut session, Phase::Simulate, &mut always_confirm)?;
    controller.simulate(&mut session, years)?;

    controller.goto(&mut session, Phase::History, &mut always_confirm)?;
    let summary = serde_json::json!({
        "seed": seed,
        "ecotype": ecotype.label(),
        "years": session.history.years(),
        "herbivore": session.history.herbivore,
        "carnivore": session.history.carnivore,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Pick a land cell as (column, row): the centroid when it is land,
/// otherwise the first land cell in row-major order.
fn land_cell(island: &TerrainGrid) -> Option<(usize, usize)> {
    let (row, col) = island.land_centroid();
    if island.get(row, col) != Terrain::Water {
        return Some((col, row));
    }
    for r in 0..island.side() {
        for c in 0..island.side() {
            if island.get(r, c) != Terrain::Water {
                return Some((c, r));
            }
        }
    }
    None
}
