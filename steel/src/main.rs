//! Runs the fluid simulation for a fixed number of game ticks.
use std::path::Path;

use anyhow::Context;
use steel::logger;
use steel::simulation::FluidSimulation;
use steel_core::config::TickConfig;

const CONFIG_PATH: &str = "config/tick_config.json5";
const SIMULATED_TICKS: i64 = 600;

fn main() -> anyhow::Result<()> {
    logger::init()?;

    let config = TickConfig::load_or_create(Path::new(CONFIG_PATH))
        .with_context(|| format!("Failed to load {CONFIG_PATH}"))?;
    log::info!("Starting tick simulation with {config:?}");

    let mut simulation = FluidSimulation::new(config);
    simulation.run(SIMULATED_TICKS);

    let stats = simulation.stats();
    log::info!(
        "Ran {} fluid ticks and {} block ticks, {} fluid cells, {} obsidian formed",
        stats.fluid_ticks,
        stats.block_ticks,
        simulation.fluid_cells(),
        stats.obsidian
    );

    let saved = simulation.unload_all();
    log::info!("Saved {saved} pending ticks on shutdown");
    Ok(())
}
