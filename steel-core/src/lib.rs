//! # Steel Core
//!
//! Scheduled block and fluid ticks for the Steel server: per-chunk tick
//! storage, the world-level coordinator that runs due ticks in a fixed order
//! each game tick, and its configuration.

pub mod config;
pub mod ticks;
pub mod world;
