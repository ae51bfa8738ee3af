//! Scheduled tick configuration.
use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/tick_config.json5");

/// Errors raised while loading a [`TickConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("Failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid json5 for this config.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),
    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

/// Limits applied to scheduled tick processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Budget for block ticks per game tick.
    pub max_block_ticks_per_tick: usize,
    /// Budget for fluid ticks per game tick.
    pub max_fluid_ticks_per_tick: usize,
    /// Chunk radius whose scheduled ticks run.
    pub simulation_distance: u8,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            max_block_ticks_per_tick: 65536,
            max_fluid_ticks_per_tick: 65536,
            simulation_distance: 10,
        }
    }
}

impl TickConfig {
    /// Parses and validates a json5 config.
    pub fn from_json5(source: &str) -> Result<Self, ConfigError> {
        let config: TickConfig = serde_json5::from_str(source)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Loads the config at `path`, writing the bundled default there first
    /// if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config_str = fs::read_to_string(path)?;
            return Self::from_json5(&config_str);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        log::info!("Wrote default tick config to {}", path.display());
        Self::from_json5(DEFAULT_CONFIG)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_block_ticks_per_tick == 0 {
            return Err("Block tick budget must be at least 1");
        }
        if self.max_fluid_ticks_per_tick == 0 {
            return Err("Fluid tick budget must be at least 1");
        }
        if !(1..=32).contains(&self.simulation_distance) {
            return Err("Simulation distance must be in range 1..=32");
        }
        Ok(())
    }
}
