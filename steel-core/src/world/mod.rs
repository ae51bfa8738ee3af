//! World-level systems.

mod tick_scheduler;

pub use tick_scheduler::{ChunkTicksData, TickHandler, WorldTickScheduler};
