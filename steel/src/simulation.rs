//! A small world where water and lava spread through scheduled fluid ticks
//! and stone buttons release through scheduled block ticks.

use rustc_hash::{FxHashMap, FxHashSet};
use steel_core::config::TickConfig;
use steel_core::ticks::{LevelTicks, TickPriority};
use steel_core::world::{ChunkTicksData, TickHandler, WorldTickScheduler};
use steel_utils::math::Vector3;
use steel_utils::{BlockPos, BoundingBox, ChunkPos};

/// Block id of a stone button.
pub const STONE_BUTTON: u16 = 77;
/// Game ticks a pressed stone button stays down.
const STONE_BUTTON_DELAY: u32 = 20;
/// Game tick at which the area around the spring is duplicated.
const COPY_AT: i64 = 40;

/// A fluid that can spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fluid {
    /// Fast, long reaching.
    Water,
    /// Slow, short reaching.
    Lava,
}

impl Fluid {
    /// Game ticks between spreading steps.
    #[must_use]
    pub const fn tick_delay(self) -> u32 {
        match self {
            Fluid::Water => 5,
            Fluid::Lava => 30,
        }
    }

    /// How many blocks the fluid flows from its source.
    #[must_use]
    pub const fn max_distance(self) -> u8 {
        match self {
            Fluid::Water => 7,
            Fluid::Lava => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FluidCell {
    fluid: Fluid,
    distance: u8,
}

/// Counters collected while the simulation runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulationStats {
    /// Fluid ticks that fired.
    pub fluid_ticks: u64,
    /// Block ticks that fired.
    pub block_ticks: u64,
    /// Cells where water and lava met.
    pub obsidian: u64,
}

/// World state the scheduled ticks act on.
#[derive(Default)]
struct SimulatedWorld {
    now: i64,
    fluids: FxHashMap<BlockPos, FluidCell>,
    pressed_buttons: FxHashSet<BlockPos>,
    stats: SimulationStats,
}

impl TickHandler<u16, Fluid> for SimulatedWorld {
    fn tick_block(&mut self, _ticks: &mut LevelTicks<u16>, pos: BlockPos, block: u16) {
        self.stats.block_ticks += 1;
        if block == STONE_BUTTON && self.pressed_buttons.remove(&pos) {
            log::debug!("Button at {pos} released at tick {}", self.now);
        }
    }

    fn tick_fluid(&mut self, ticks: &mut LevelTicks<Fluid>, pos: BlockPos, fluid: Fluid) {
        self.stats.fluid_ticks += 1;
        let Some(cell) = self.fluids.get(&pos).copied() else {
            return;
        };
        if cell.fluid != fluid || cell.distance >= fluid.max_distance() {
            return;
        }

        for neighbor in pos.horizontal_neighbors() {
            match self.fluids.get(&neighbor).copied() {
                None => {
                    // Unloaded neighbours are logged by the scheduler and stay dry
                    if ticks
                        .schedule_tick(neighbor, fluid, self.now, fluid.tick_delay())
                        .is_ok()
                    {
                        self.fluids.insert(
                            neighbor,
                            FluidCell {
                                fluid,
                                distance: cell.distance + 1,
                            },
                        );
                    }
                }
                Some(other) if other.fluid != fluid => {
                    self.fluids.remove(&neighbor);
                    ticks.clear_area(&BoundingBox::single(neighbor));
                    self.stats.obsidian += 1;
                }
                Some(_) => {}
            }
        }
    }
}

/// Runs a fixed scene of springs and buttons on a [`WorldTickScheduler`].
pub struct FluidSimulation {
    scheduler: WorldTickScheduler<u16, Fluid>,
    world: SimulatedWorld,
    center: ChunkPos,
    loaded: Vec<ChunkPos>,
}

impl FluidSimulation {
    /// Loads every chunk up to one past the simulation distance and places
    /// the initial springs and buttons.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        let center = ChunkPos::new(0, 0);
        let radius = i32::from(config.simulation_distance) + 1;
        let mut scheduler = WorldTickScheduler::new(config);

        let mut loaded = Vec::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                let chunk = ChunkPos::new(x, z);
                scheduler.load_chunk(chunk, ChunkTicksData::default(), 0);
                loaded.push(chunk);
            }
        }
        log::info!("Loaded {} chunks around {center}", loaded.len());

        let mut simulation = Self {
            scheduler,
            world: SimulatedWorld::default(),
            center,
            loaded,
        };
        simulation.place_spring(BlockPos::new(0, 64, 0), Fluid::Water);
        simulation.place_spring(BlockPos::new(10, 64, 0), Fluid::Lava);
        for z in [-4, 4] {
            simulation.press_button(BlockPos::new(2, 65, z));
        }
        simulation
    }

    fn place_spring(&mut self, pos: BlockPos, fluid: Fluid) {
        self.world.fluids.insert(pos, FluidCell { fluid, distance: 0 });
        if let Err(err) = self
            .scheduler
            .fluid_ticks_mut()
            .schedule_tick(pos, fluid, self.world.now, 0)
        {
            log::error!("Could not place {fluid:?} spring: {err}");
        }
    }

    fn press_button(&mut self, pos: BlockPos) {
        let release_at = self.world.now + i64::from(STONE_BUTTON_DELAY);
        let scheduled = self.scheduler.block_ticks_mut().schedule(
            pos,
            STONE_BUTTON,
            release_at,
            TickPriority::High,
        );
        if matches!(scheduled, Ok(true)) {
            self.world.pressed_buttons.insert(pos);
        }
    }

    /// Duplicates the fluid around the water spring, ticks included.
    fn copy_spring_area(&mut self) {
        let area = BoundingBox::from_corners(BlockPos::new(-8, 60, -8), BlockPos::new(8, 70, 8));
        let offset = Vector3::new(0, 0, 32);

        let cells: Vec<_> = self
            .world
            .fluids
            .iter()
            .filter(|(pos, _)| area.is_inside(**pos))
            .map(|(pos, cell)| (pos.offset(offset), *cell))
            .collect();
        for (pos, cell) in cells {
            self.world.fluids.entry(pos).or_insert(cell);
        }

        let copied = self.scheduler.copy_area(&area, offset);
        log::info!("Copied {copied} pending ticks to {}", BlockPos(area.moved(offset).min));
    }

    /// Runs game ticks `0..ticks`.
    pub fn run(&mut self, ticks: i64) {
        let center = self.center;
        let distance = i32::from(self.scheduler.config().simulation_distance);

        for game_time in 0..ticks {
            self.world.now = game_time;
            if game_time == COPY_AT {
                self.copy_spring_area();
            }

            self.scheduler.tick(
                game_time,
                |chunk| chunk.chessboard_distance(center) <= distance,
                &mut self.world,
            );

            if game_time % 100 == 0 {
                let (block, fluid) = self.scheduler.count();
                log::info!("Tick {game_time}: {block} block and {fluid} fluid ticks pending");
            }
        }
        self.world.now = ticks;
    }

    /// Counters collected so far.
    #[must_use]
    pub fn stats(&self) -> SimulationStats {
        self.world.stats
    }

    /// Number of blocks holding fluid.
    #[must_use]
    pub fn fluid_cells(&self) -> usize {
        self.world.fluids.len()
    }

    /// Unloads every chunk and returns how many ticks were saved.
    pub fn unload_all(&mut self) -> usize {
        let now = self.world.now;
        self.loaded
            .drain(..)
            .filter_map(|chunk| self.scheduler.unload_chunk(chunk, now))
            .map(|data| data.block_ticks.len() + data.fluid_ticks.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_and_lava_meet() {
        let mut simulation = FluidSimulation::new(TickConfig::default());
        simulation.run(200);

        let stats = simulation.stats();
        assert_eq!(stats.block_ticks, 2);
        assert!(simulation.world.pressed_buttons.is_empty());
        assert!(stats.fluid_ticks > 0);
        assert!(stats.obsidian > 0);
    }

    #[test]
    fn test_unload_saves_pending_ticks() {
        let mut simulation = FluidSimulation::new(TickConfig::default());
        simulation.run(10);

        let (block, fluid) = simulation.scheduler.count();
        assert_eq!(simulation.unload_all(), block + fluid);
        assert_eq!(simulation.scheduler.count(), (0, 0));
    }
}
