//! World tick scheduler.
//!
//! Pairs the block and fluid [`LevelTicks`] of a world, keeps them in step
//! with chunk loading, and runs both once per game tick.

use std::hash::Hash;

use serde::{Deserialize, Serialize};
use steel_utils::math::Vector3;
use steel_utils::{BlockPos, BoundingBox, ChunkPos};

use crate::config::TickConfig;
use crate::ticks::{LevelTicks, SavedTick};

/// Saved scheduled ticks of a single chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkTicksData<B, F> {
    /// Pending block ticks, in run order.
    pub block_ticks: Vec<SavedTick<B>>,
    /// Pending fluid ticks, in run order.
    pub fluid_ticks: Vec<SavedTick<F>>,
}

impl<B, F> ChunkTicksData<B, F> {
    /// Returns `true` if there is nothing to restore.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block_ticks.is_empty() && self.fluid_ticks.is_empty()
    }
}

impl<B, F> Default for ChunkTicksData<B, F> {
    fn default() -> Self {
        Self {
            block_ticks: Vec::new(),
            fluid_ticks: Vec::new(),
        }
    }
}

/// Runs the behaviour of scheduled ticks as they fire.
///
/// Each method gets the scheduler the tick came from, so it can schedule
/// follow-up ticks or query pending ones.
pub trait TickHandler<B: Copy + Eq + Hash, F: Copy + Eq + Hash> {
    /// Called when a block tick fires.
    fn tick_block(&mut self, ticks: &mut LevelTicks<B>, pos: BlockPos, block: B);

    /// Called when a fluid tick fires.
    fn tick_fluid(&mut self, ticks: &mut LevelTicks<F>, pos: BlockPos, fluid: F);
}

/// The block and fluid tick schedulers of a world.
pub struct WorldTickScheduler<B: Copy + Eq + Hash, F: Copy + Eq + Hash> {
    block_ticks: LevelTicks<B>,
    fluid_ticks: LevelTicks<F>,
    config: TickConfig,
}

impl<B: Copy + Eq + Hash, F: Copy + Eq + Hash> WorldTickScheduler<B, F> {
    /// Creates a scheduler with no loaded chunks.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self {
            block_ticks: LevelTicks::new(),
            fluid_ticks: LevelTicks::new(),
            config,
        }
    }

    /// The limits this scheduler runs with.
    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// The block tick scheduler.
    #[must_use]
    pub fn block_ticks(&self) -> &LevelTicks<B> {
        &self.block_ticks
    }

    /// The block tick scheduler, mutably.
    pub fn block_ticks_mut(&mut self) -> &mut LevelTicks<B> {
        &mut self.block_ticks
    }

    /// The fluid tick scheduler.
    #[must_use]
    pub fn fluid_ticks(&self) -> &LevelTicks<F> {
        &self.fluid_ticks
    }

    /// The fluid tick scheduler, mutably.
    pub fn fluid_ticks_mut(&mut self) -> &mut LevelTicks<F> {
        &mut self.fluid_ticks
    }

    /// Starts tracking ticks for a chunk that became simulated.
    ///
    /// Returns the number of ticks restored from `data`.
    pub fn load_chunk(
        &mut self,
        chunk: ChunkPos,
        data: ChunkTicksData<B, F>,
        game_time: i64,
    ) -> usize {
        let restored = self
            .block_ticks
            .load_container(chunk, data.block_ticks, game_time)
            + self
                .fluid_ticks
                .load_container(chunk, data.fluid_ticks, game_time);
        if restored > 0 {
            log::debug!("Restored {restored} scheduled ticks for chunk {chunk}");
        }
        restored
    }

    /// Stops tracking ticks for a chunk and returns them in saved form.
    ///
    /// Returns `None` if the chunk was not loaded.
    pub fn unload_chunk(
        &mut self,
        chunk: ChunkPos,
        game_time: i64,
    ) -> Option<ChunkTicksData<B, F>> {
        let block = self.block_ticks.remove_container(&chunk);
        let fluid = self.fluid_ticks.remove_container(&chunk);
        if block.is_none() && fluid.is_none() {
            return None;
        }

        let data = ChunkTicksData {
            block_ticks: block.map(|c| c.save(game_time)).unwrap_or_default(),
            fluid_ticks: fluid.map(|c| c.save(game_time)).unwrap_or_default(),
        };
        if !data.is_empty() {
            log::debug!(
                "Unloaded chunk {chunk} with {} block and {} fluid ticks pending",
                data.block_ticks.len(),
                data.fluid_ticks.len()
            );
        }
        Some(data)
    }

    /// Returns `true` if the chunk's ticks are tracked.
    #[must_use]
    pub fn is_chunk_loaded(&self, chunk: &ChunkPos) -> bool {
        self.block_ticks.is_loaded(chunk)
    }

    /// Runs the scheduled ticks due at `game_time`: block ticks first, then
    /// fluid ticks, each within its configured budget.
    pub fn tick<C, H>(&mut self, game_time: i64, can_tick_chunk: C, handler: &mut H)
    where
        C: Fn(&ChunkPos) -> bool,
        H: TickHandler<B, F>,
    {
        self.block_ticks.tick(
            game_time,
            self.config.max_block_ticks_per_tick,
            &can_tick_chunk,
            |ticks, pos, block| handler.tick_block(ticks, pos, block),
        );
        self.fluid_ticks.tick(
            game_time,
            self.config.max_fluid_ticks_per_tick,
            &can_tick_chunk,
            |ticks, pos, fluid| handler.tick_fluid(ticks, pos, fluid),
        );
    }

    /// Removes every block and fluid tick inside `area`.
    pub fn clear_area(&mut self, area: &BoundingBox) -> usize {
        self.block_ticks.clear_area(area) + self.fluid_ticks.clear_area(area)
    }

    /// Copies the block and fluid ticks inside `area`, moved by `offset`.
    pub fn copy_area(&mut self, area: &BoundingBox, offset: Vector3<i32>) -> usize {
        self.block_ticks.copy_area(area, offset) + self.fluid_ticks.copy_area(area, offset)
    }

    /// Returns the number of pending (block, fluid) ticks.
    #[must_use]
    pub fn count(&self) -> (usize, usize) {
        (self.block_ticks.count(), self.fluid_ticks.count())
    }
}
