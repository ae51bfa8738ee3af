#![allow(missing_docs)]
//! World scheduler tests: chunk lifecycle, persistence, and dispatch order.

use serde::{Deserialize, Serialize};
use steel_core::config::TickConfig;
use steel_core::ticks::{
    LevelChunkTicks, LevelTicks, ScheduledTick, TickAccess, TickPriority,
};
use steel_core::world::{ChunkTicksData, TickHandler, WorldTickScheduler};
use steel_utils::math::Vector3;
use steel_utils::{BlockPos, BoundingBox, ChunkPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Fluid {
    Water,
    Lava,
}

const REPEATER: u16 = 94;
const OBSERVER: u16 = 455;

#[derive(Debug, PartialEq, Eq)]
enum Fired {
    Block(BlockPos, u16),
    Fluid(BlockPos, Fluid),
}

#[derive(Default)]
struct Recorder {
    fired: Vec<Fired>,
    /// Fluid ticks reschedule themselves one block lower this many ticks later.
    fluid_follow_up: Option<u32>,
    now: i64,
}

impl TickHandler<u16, Fluid> for Recorder {
    fn tick_block(&mut self, _ticks: &mut LevelTicks<u16>, pos: BlockPos, block: u16) {
        self.fired.push(Fired::Block(pos, block));
    }

    fn tick_fluid(&mut self, ticks: &mut LevelTicks<Fluid>, pos: BlockPos, fluid: Fluid) {
        self.fired.push(Fired::Fluid(pos, fluid));
        if let Some(delay) = self.fluid_follow_up {
            let below = pos.offset(Vector3::new(0, -1, 0));
            let _ = ticks.schedule_tick(below, fluid, self.now, delay);
        }
    }
}

fn world_with_chunks(chunks: &[(i32, i32)]) -> WorldTickScheduler<u16, Fluid> {
    let mut world = WorldTickScheduler::new(TickConfig::default());
    for &(x, z) in chunks {
        world.load_chunk(ChunkPos::new(x, z), ChunkTicksData::default(), 0);
    }
    world
}

#[test]
fn block_ticks_run_before_fluid_ticks() {
    let mut world = world_with_chunks(&[(0, 0)]);
    let water = BlockPos::new(1, 64, 1);
    let repeater = BlockPos::new(2, 64, 1);

    world
        .fluid_ticks_mut()
        .schedule(water, Fluid::Water, 5, TickPriority::ExtremelyHigh)
        .expect("loaded");
    world
        .block_ticks_mut()
        .schedule(repeater, REPEATER, 5, TickPriority::Low)
        .expect("loaded");

    let mut recorder = Recorder::default();
    world.tick(5, |_| true, &mut recorder);

    assert_eq!(
        recorder.fired,
        vec![
            Fired::Block(repeater, REPEATER),
            Fired::Fluid(water, Fluid::Water),
        ]
    );
    assert_eq!(world.count(), (0, 0));
}

#[test]
fn budgets_come_from_config() {
    let config = TickConfig {
        max_block_ticks_per_tick: 2,
        max_fluid_ticks_per_tick: 1,
        ..TickConfig::default()
    };
    let mut world = WorldTickScheduler::new(config);
    world.load_chunk(ChunkPos::new(0, 0), ChunkTicksData::default(), 0);

    for x in 0..4 {
        let pos = BlockPos::new(x, 64, 0);
        world
            .block_ticks_mut()
            .schedule_tick(pos, OBSERVER, 0, 1)
            .expect("loaded");
        world
            .fluid_ticks_mut()
            .schedule_tick(pos, Fluid::Lava, 0, 1)
            .expect("loaded");
    }

    let mut recorder = Recorder::default();
    world.tick(1, |_| true, &mut recorder);
    assert_eq!(recorder.fired.len(), 3);
    assert_eq!(world.count(), (2, 3));
}

#[test]
fn follow_up_ticks_from_handler_run_later() {
    let mut world = world_with_chunks(&[(0, 0)]);
    let top = BlockPos::new(3, 70, 3);
    world
        .fluid_ticks_mut()
        .schedule_tick(top, Fluid::Water, 0, 0)
        .expect("loaded");

    let mut recorder = Recorder {
        fluid_follow_up: Some(5),
        ..Recorder::default()
    };
    for game_time in 0..=10 {
        recorder.now = game_time;
        world.tick(game_time, |_| true, &mut recorder);
    }

    assert_eq!(
        recorder.fired,
        vec![
            Fired::Fluid(top, Fluid::Water),
            Fired::Fluid(BlockPos::new(3, 69, 3), Fluid::Water),
            Fired::Fluid(BlockPos::new(3, 68, 3), Fluid::Water),
        ]
    );
    assert!(
        world
            .fluid_ticks()
            .has_scheduled_tick(BlockPos::new(3, 67, 3), Fluid::Water)
    );
}

#[test]
fn unloaded_chunk_ticks_survive_reload() {
    let mut world = world_with_chunks(&[(0, 0), (1, 0)]);
    let chunk = ChunkPos::new(1, 0);
    let lava = BlockPos::new(20, 64, 4);
    let first = BlockPos::new(21, 64, 4);
    let second = BlockPos::new(22, 64, 4);

    world
        .fluid_ticks_mut()
        .schedule_tick(lava, Fluid::Lava, 100, 30)
        .expect("loaded");
    world
        .block_ticks_mut()
        .schedule_tick(first, REPEATER, 100, 4)
        .expect("loaded");
    world
        .block_ticks_mut()
        .schedule_tick(second, REPEATER, 100, 4)
        .expect("loaded");

    let saved = world.unload_chunk(chunk, 110).expect("was loaded");
    assert!(!world.is_chunk_loaded(&chunk));
    assert!(world.unload_chunk(chunk, 110).is_none());
    assert_eq!(saved.block_ticks.len(), 2);
    assert_eq!(saved.fluid_ticks[0].delay, 20);
    // Overdue when saved
    assert_eq!(saved.block_ticks[0].delay, -6);

    // Ticking while unloaded loses nothing
    let mut recorder = Recorder::default();
    world.tick(200, |_| true, &mut recorder);
    assert!(recorder.fired.is_empty());

    let json = serde_json::to_string(&saved).expect("serialize");
    let saved: ChunkTicksData<u16, Fluid> = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(world.load_chunk(chunk, saved, 1000), 3);
    world.tick(1000, |_| true, &mut recorder);
    assert_eq!(
        recorder.fired,
        vec![
            Fired::Block(first, REPEATER),
            Fired::Block(second, REPEATER),
        ]
    );
    world.tick(1020, |_| true, &mut recorder);
    assert_eq!(recorder.fired.last(), Some(&Fired::Fluid(lava, Fluid::Lava)));
}

#[test]
fn chunks_outside_simulation_distance_wait() {
    let mut world = world_with_chunks(&[(0, 0), (5, 0)]);
    let near = BlockPos::new(1, 64, 1);
    let far = BlockPos::new(81, 64, 1);
    world
        .block_ticks_mut()
        .schedule_tick(near, OBSERVER, 0, 2)
        .expect("loaded");
    world
        .block_ticks_mut()
        .schedule_tick(far, OBSERVER, 0, 2)
        .expect("loaded");

    let centre = ChunkPos::new(0, 0);
    let in_range = |chunk: &ChunkPos| chunk.chessboard_distance(centre) <= 2;

    let mut recorder = Recorder::default();
    world.tick(2, in_range, &mut recorder);
    assert_eq!(recorder.fired, vec![Fired::Block(near, OBSERVER)]);
    assert!(world.block_ticks().has_scheduled_tick(far, OBSERVER));
}

#[test]
fn clear_and_copy_apply_to_both_schedulers() {
    let mut world = world_with_chunks(&[(0, 0), (0, 1)]);
    let pos = BlockPos::new(4, 64, 4);
    world
        .block_ticks_mut()
        .schedule_tick(pos, REPEATER, 0, 2)
        .expect("loaded");
    world
        .fluid_ticks_mut()
        .schedule_tick(pos, Fluid::Water, 0, 5)
        .expect("loaded");

    let area = BoundingBox::single(pos);
    assert_eq!(world.copy_area(&area, Vector3::new(0, 0, 16)), 2);
    assert_eq!(world.count(), (2, 2));

    assert_eq!(world.clear_area(&area), 2);
    assert_eq!(world.count(), (1, 1));

    let copied = BlockPos::new(4, 64, 20);
    assert!(world.block_ticks().has_scheduled_tick(copied, REPEATER));
    assert!(world.fluid_ticks().has_scheduled_tick(copied, Fluid::Water));
}

fn schedule_pair<A: TickAccess<u16>>(access: &mut A, pos: BlockPos) -> (bool, bool) {
    let first = access.schedule_entry(ScheduledTick::new(OBSERVER, pos, 10, 0));
    let second = access.schedule_entry(ScheduledTick::new(OBSERVER, pos, 20, 1));
    (first, second)
}

#[test]
fn tick_access_is_shared_by_chunk_and_level() {
    let pos = BlockPos::new(1, 2, 3);

    let mut chunk_ticks: LevelChunkTicks<u16> = LevelChunkTicks::new();
    assert_eq!(schedule_pair(&mut chunk_ticks, pos), (true, false));
    assert_eq!(TickAccess::count(&chunk_ticks), 1);

    let mut level_ticks: LevelTicks<u16> = LevelTicks::new();
    level_ticks.add_container(ChunkPos::new(0, 0), chunk_ticks);
    assert!(TickAccess::has_scheduled_tick(&level_ticks, pos, OBSERVER));
    assert_eq!(schedule_pair(&mut level_ticks, pos), (false, false));

    // Entries get fresh orders, so they run after ticks scheduled earlier
    let first = BlockPos::new(2, 2, 3);
    let second = BlockPos::new(3, 2, 3);
    let third = BlockPos::new(4, 2, 3);
    level_ticks
        .schedule(first, REPEATER, 10, TickPriority::Normal)
        .expect("loaded");
    level_ticks
        .schedule(second, REPEATER, 10, TickPriority::Normal)
        .expect("loaded");
    assert!(level_ticks.schedule_entry(ScheduledTick::new(REPEATER, third, 10, 0)));

    let container = level_ticks.container(&ChunkPos::new(0, 0)).expect("loaded");
    let mut orders: Vec<i64> = container.iter().map(|tick| tick.sub_tick_order).collect();
    orders.sort_unstable();
    orders.dedup();
    assert_eq!(orders.len(), 4);

    let mut fired = Vec::new();
    level_ticks.tick(10, 10, |_| true, |_, pos, _| fired.push(pos));
    assert_eq!(fired, vec![pos, first, second, third]);

    let mut unloaded: LevelTicks<u16> = LevelTicks::new();
    assert_eq!(schedule_pair(&mut unloaded, pos), (false, false));
}
