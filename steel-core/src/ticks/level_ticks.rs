//! World-level scheduled tick coordinator.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use steel_utils::math::Vector3;
use steel_utils::{BlockPos, BoundingBox, ChunkPos};

use super::{
    LevelChunkTicks, SavedTick, ScheduleListener, ScheduledTick, TickAccess, TickKey,
    TickPriority, UnloadedChunkError,
};

/// Earliest known trigger tick for each chunk with pending ticks.
///
/// Entries can be stale: a value may be earlier than the container's real
/// head, or the container may be empty or gone. Stale entries are fixed or
/// dropped when they are scanned.
#[derive(Default)]
struct NextTickIndex(FxHashMap<ChunkPos, i64>);

impl<T> ScheduleListener<T> for NextTickIndex {
    fn on_new_earliest(&mut self, tick: &ScheduledTick<T>) {
        self.0.insert(tick.pos.chunk_pos(), tick.trigger_tick);
    }
}

/// A container waiting to be drained, keyed by its head tick.
struct DrainEntry<T> {
    head: ScheduledTick<T>,
    chunk: ChunkPos,
}

impl<T> PartialEq for DrainEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for DrainEntry<T> {}

impl<T> PartialOrd for DrainEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for DrainEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.head
            .cmp(&other.head)
            .then_with(|| self.chunk.cmp(&other.chunk))
    }
}

/// State that only lives for the duration of one `tick` call.
struct TickRunState<T: Copy + Eq + Hash> {
    /// Containers with due ticks, earliest head first.
    containers_to_tick: BinaryHeap<Reverse<DrainEntry<T>>>,
    /// Ticks selected to run this tick, in run order.
    to_run_this_tick: VecDeque<ScheduledTick<T>>,
    /// Keys of `to_run_this_tick`, for `will_tick_this_tick`.
    to_run_this_tick_set: FxHashSet<TickKey<T>>,
    /// Ticks that have already been handed to the ticker this tick.
    already_run_this_tick: Vec<ScheduledTick<T>>,
}

impl<T: Copy + Eq + Hash> TickRunState<T> {
    fn new() -> Self {
        Self {
            containers_to_tick: BinaryHeap::new(),
            to_run_this_tick: VecDeque::new(),
            to_run_this_tick_set: FxHashSet::default(),
            already_run_this_tick: Vec::new(),
        }
    }

    #[inline]
    fn can_schedule_more(&self, max_ticks: usize) -> bool {
        self.to_run_this_tick.len() < max_ticks
    }

    fn schedule_for_this_tick(&mut self, tick: ScheduledTick<T>) {
        self.to_run_this_tick_set.insert(TickKey::from(&tick));
        self.to_run_this_tick.push_back(tick);
    }

    /// Keeps taking ticks from `container` while they are due and still run
    /// before the head of every other queued container.
    fn drain_from_container(
        &mut self,
        container: &mut LevelChunkTicks<T>,
        current_tick: i64,
        max_ticks: usize,
    ) {
        let next_queued = self
            .containers_to_tick
            .peek()
            .map(|Reverse(entry)| entry.head);

        while self.can_schedule_more(max_ticks) {
            let Some(&next) = container.peek() else {
                break;
            };
            if !next.is_due(current_tick) || next_queued.is_some_and(|queued| next > queued) {
                break;
            }
            container.poll();
            self.schedule_for_this_tick(next);
        }
    }

    fn remove_if<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&ScheduledTick<T>) -> bool,
    {
        self.already_run_this_tick.retain(|tick| !predicate(tick));
        let set = &mut self.to_run_this_tick_set;
        self.to_run_this_tick.retain(|tick| {
            if predicate(tick) {
                set.remove(&TickKey::from(tick));
                false
            } else {
                true
            }
        });
    }

    fn clear(&mut self) {
        self.containers_to_tick.clear();
        self.to_run_this_tick.clear();
        self.to_run_this_tick_set.clear();
        self.already_run_this_tick.clear();
    }
}

/// World-level coordinator for scheduled ticks.
///
/// This struct manages all scheduled ticks across all loaded chunks,
/// providing efficient lookup of which chunks have pending ticks and
/// coordinating tick processing each game tick.
///
/// # Architecture
///
/// - Each loaded chunk has a `LevelChunkTicks` stored in `all_containers`
/// - `next_tick_for_container` tracks the earliest trigger tick per chunk
///   so chunks with nothing due are skipped without looking at them
/// - `tick()` merges the due containers through a min-heap, selects ticks
///   in global run order up to a budget, then hands them to the ticker
///
/// The ticker receives `&mut LevelTicks`, so it may schedule, clear, copy
/// and query ticks while the current tick is being run. Ticks scheduled
/// from the ticker are never run in the same `tick()` call.
pub struct LevelTicks<T: Copy + Eq + Hash> {
    /// Map of chunk position to chunk tick container.
    all_containers: FxHashMap<ChunkPos, LevelChunkTicks<T>>,
    /// Tracks the earliest scheduled tick for each chunk.
    next_tick_for_container: NextTickIndex,
    /// Transient state of the tick currently being processed.
    run_state: TickRunState<T>,
    /// Next sub-tick order to hand out. Always above every stored order.
    sub_tick_counter: i64,
    /// Set while `tick()` is running.
    ticking: bool,
}

impl<T: Copy + Eq + Hash> LevelTicks<T> {
    /// Creates a new empty world tick coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_containers: FxHashMap::default(),
            next_tick_for_container: NextTickIndex::default(),
            run_state: TickRunState::new(),
            sub_tick_counter: 0,
            ticking: false,
        }
    }

    /// Adds a chunk's tick container when the chunk is loaded.
    ///
    /// If the container has pending ticks, updates the next-tick tracking.
    pub fn add_container(&mut self, pos: ChunkPos, container: LevelChunkTicks<T>) {
        if let Some(next_tick) = container.peek() {
            self.next_tick_for_container
                .0
                .insert(pos, next_tick.trigger_tick);
        }
        let max_order = container.iter().map(|tick| tick.sub_tick_order).max();
        if let Some(max_order) = max_order {
            self.sub_tick_counter = self.sub_tick_counter.max(max_order + 1);
        }
        if self.all_containers.insert(pos, container).is_some() {
            log::debug!("Replaced tick container of already loaded chunk {pos}");
        }
    }

    /// Removes a chunk's tick container when the chunk is unloaded.
    ///
    /// Returns the container so it can be saved if needed. Ticks of this
    /// chunk that were already selected for the tick in progress still run.
    pub fn remove_container(&mut self, pos: &ChunkPos) -> Option<LevelChunkTicks<T>> {
        self.next_tick_for_container.0.remove(pos);
        self.all_containers.remove(pos)
    }

    /// Registers an empty container for `pos` and restores saved ticks into it.
    ///
    /// Ticks keep their saved relative order and get fresh sub-tick orders.
    /// Saved ticks whose position is outside the chunk are dropped. If the
    /// chunk is already loaded, its pending ticks are discarded first.
    /// Returns the number of ticks restored.
    pub fn load_container<I>(&mut self, pos: ChunkPos, saved: I, game_time: i64) -> usize
    where
        I: IntoIterator<Item = SavedTick<T>>,
    {
        if let Some(previous) = self.remove_container(&pos) {
            log::warn!(
                "Loading ticks for already loaded chunk {pos} discards {} pending ticks",
                previous.count()
            );
        }
        self.add_container(pos, LevelChunkTicks::new());
        let mut restored = 0;
        for tick in saved {
            if tick.pos.chunk_pos() != pos {
                log::warn!("Dropping saved tick at {} outside of chunk {pos}", tick.pos);
                continue;
            }
            if let Ok(true) = self.schedule(
                tick.pos,
                tick.tick_type,
                tick.trigger_tick(game_time),
                tick.priority,
            ) {
                restored += 1;
            }
        }
        restored
    }

    /// Packs the pending ticks of a loaded chunk relative to `game_time`.
    #[must_use]
    pub fn save_container(&self, pos: &ChunkPos, game_time: i64) -> Option<Vec<SavedTick<T>>> {
        self.all_containers
            .get(pos)
            .map(|container| container.save(game_time))
    }

    /// Returns the container of a loaded chunk.
    #[must_use]
    pub fn container(&self, pos: &ChunkPos) -> Option<&LevelChunkTicks<T>> {
        self.all_containers.get(pos)
    }

    /// Returns `true` if the chunk has a registered container.
    #[must_use]
    pub fn is_loaded(&self, pos: &ChunkPos) -> bool {
        self.all_containers.contains_key(pos)
    }

    /// Returns the number of registered containers.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.all_containers.len()
    }

    /// Schedules a tick at the given position.
    ///
    /// The tick is assigned the next sub-tick order. Returns `Ok(true)` if
    /// it was stored and `Ok(false)` if a tick for the same position and
    /// type is already pending.
    pub fn schedule(
        &mut self,
        pos: BlockPos,
        tick_type: T,
        trigger_tick: i64,
        priority: TickPriority,
    ) -> Result<bool, UnloadedChunkError> {
        let tick = ScheduledTick::with_priority(
            tick_type,
            pos,
            trigger_tick,
            priority,
            self.sub_tick_counter,
        );
        self.insert_tick(tick)
    }

    /// Schedules a tick with normal priority, firing at `current_tick + delay`.
    pub fn schedule_tick(
        &mut self,
        pos: BlockPos,
        tick_type: T,
        current_tick: i64,
        delay: u32,
    ) -> Result<bool, UnloadedChunkError> {
        self.schedule(
            pos,
            tick_type,
            current_tick + i64::from(delay),
            TickPriority::Normal,
        )
    }

    /// Stores a fully formed tick in the container owning its position.
    fn insert_tick(&mut self, tick: ScheduledTick<T>) -> Result<bool, UnloadedChunkError> {
        let chunk = tick.pos.chunk_pos();
        let Some(container) = self.all_containers.get_mut(&chunk) else {
            let error = UnloadedChunkError {
                pos: tick.pos,
                chunk,
            };
            log::warn!("{error}");
            return Err(error);
        };

        self.sub_tick_counter = self.sub_tick_counter.max(tick.sub_tick_order + 1);
        Ok(container.schedule_with(tick, &mut self.next_tick_for_container))
    }

    /// Checks if a tick is already scheduled for the given position and type.
    ///
    /// Ticks that were selected for the tick in progress are no longer
    /// scheduled; see [`will_tick_this_tick`](Self::will_tick_this_tick).
    #[must_use]
    pub fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        self.all_containers
            .get(&pos.chunk_pos())
            .is_some_and(|c| c.has_scheduled_tick(pos, tick_type))
    }

    /// Checks if a tick for the given position and type was selected for the
    /// tick in progress and has not been run yet.
    ///
    /// Always `false` outside of a ticker callback.
    #[must_use]
    pub fn will_tick_this_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        self.run_state
            .to_run_this_tick_set
            .contains(&TickKey { pos, tick_type })
    }

    /// Runs up to `max_ticks` ticks that are due at or before `current_tick`.
    ///
    /// Ticks run in global order: trigger tick, then priority, then
    /// sub-tick order. Ticks left over because of the budget stay stored and
    /// are picked up by the next call.
    ///
    /// # Arguments
    /// * `current_tick` - The current game tick
    /// * `max_ticks` - Maximum number of ticks to run this call
    /// * `can_tick_chunk` - Predicate to check if a chunk should be ticked
    /// * `ticker` - Called once per selected tick, in run order
    pub fn tick<C, F>(
        &mut self,
        current_tick: i64,
        max_ticks: usize,
        can_tick_chunk: C,
        mut ticker: F,
    ) where
        C: Fn(&ChunkPos) -> bool,
        F: FnMut(&mut Self, BlockPos, T),
    {
        if self.ticking {
            log::warn!("Ignoring nested scheduled tick processing at tick {current_tick}");
            return;
        }
        if max_ticks == 0 {
            return;
        }

        self.ticking = true;
        self.collect_due_containers(current_tick, &can_tick_chunk);
        let due_containers = self.run_state.containers_to_tick.len();
        self.drain_containers(current_tick, max_ticks);
        let deferred = self.reschedule_leftover_containers();
        log::trace!(
            "Tick {current_tick}: {} scheduled ticks selected from {due_containers} chunks, \
             {deferred} chunks deferred",
            self.run_state.to_run_this_tick.len(),
        );
        self.run_collected_ticks(&mut ticker);
        self.run_state.clear();
        self.ticking = false;
    }

    /// Moves every due, tickable container from the index into the drain heap.
    fn collect_due_containers<C>(&mut self, current_tick: i64, can_tick_chunk: &C)
    where
        C: Fn(&ChunkPos) -> bool,
    {
        let containers = &self.all_containers;
        let queue = &mut self.run_state.containers_to_tick;

        self.next_tick_for_container.0.retain(|chunk, next_tick| {
            if *next_tick > current_tick {
                return true;
            }
            let Some(head) = containers.get(chunk).and_then(LevelChunkTicks::peek) else {
                return false;
            };
            if !head.is_due(current_tick) {
                *next_tick = head.trigger_tick;
                return true;
            }
            if can_tick_chunk(chunk) {
                queue.push(Reverse(DrainEntry {
                    head: *head,
                    chunk: *chunk,
                }));
                false
            } else {
                *next_tick = head.trigger_tick;
                true
            }
        });
    }

    /// Selects ticks from the heap of due containers until it runs dry or
    /// the budget is spent.
    fn drain_containers(&mut self, current_tick: i64, max_ticks: usize) {
        let run = &mut self.run_state;

        while run.can_schedule_more(max_ticks) {
            let Some(Reverse(entry)) = run.containers_to_tick.pop() else {
                break;
            };
            let Some(container) = self.all_containers.get_mut(&entry.chunk) else {
                continue;
            };
            // Containers are not touched between collection and draining,
            // so the head is still `entry.head`.
            let Some(tick) = container.poll() else {
                continue;
            };
            run.schedule_for_this_tick(tick);
            run.drain_from_container(container, current_tick, max_ticks);

            if let Some(next) = container.peek() {
                if next.is_due(current_tick) && run.can_schedule_more(max_ticks) {
                    run.containers_to_tick.push(Reverse(DrainEntry {
                        head: *next,
                        chunk: entry.chunk,
                    }));
                } else {
                    self.next_tick_for_container
                        .0
                        .insert(entry.chunk, next.trigger_tick);
                }
            }
        }
    }

    /// Puts containers the budget did not reach back into the index.
    fn reschedule_leftover_containers(&mut self) -> usize {
        let mut deferred = 0;
        for Reverse(entry) in self.run_state.containers_to_tick.drain() {
            self.next_tick_for_container
                .0
                .insert(entry.chunk, entry.head.trigger_tick);
            deferred += 1;
        }
        deferred
    }

    fn run_collected_ticks<F>(&mut self, ticker: &mut F)
    where
        F: FnMut(&mut Self, BlockPos, T),
    {
        while let Some(tick) = self.run_state.to_run_this_tick.pop_front() {
            self.run_state
                .to_run_this_tick_set
                .remove(&TickKey::from(&tick));
            self.run_state.already_run_this_tick.push(tick);
            ticker(self, tick.pos, tick.tick_type);
        }
    }

    /// Removes every tick positioned inside `area`.
    ///
    /// This includes ticks selected for the tick in progress that have not
    /// run yet. Returns the number of stored ticks removed.
    pub fn clear_area(&mut self, area: &BoundingBox) -> usize {
        let mut removed = 0;
        for chunk in area.intersecting_chunks() {
            let Some(container) = self.all_containers.get_mut(&chunk) else {
                log::debug!("Skipping unloaded chunk {chunk} while clearing {area:?}");
                continue;
            };
            let previous = container.peek().copied();
            removed += container.remove_if(|tick| area.is_inside(tick.pos));
            let next = container.peek().copied();
            if next != previous {
                match next {
                    Some(next) => {
                        self.next_tick_for_container
                            .0
                            .insert(chunk, next.trigger_tick);
                    }
                    None => {
                        self.next_tick_for_container.0.remove(&chunk);
                    }
                }
            }
        }
        self.run_state.remove_if(|tick| area.is_inside(tick.pos));

        log::debug!("Cleared {removed} scheduled ticks in {area:?}");
        removed
    }

    /// Copies the ticks inside `area` of `source` into this scheduler, moved
    /// by `offset`.
    ///
    /// Ticks that already ran or are about to run in the source's tick in
    /// progress are copied too. The copies keep their trigger tick, priority
    /// and relative sub-tick order, and are ordered after every tick already
    /// in this scheduler. Copies landing in unloaded chunks are dropped.
    /// Returns the number of ticks stored.
    pub fn copy_area_from(
        &mut self,
        source: &Self,
        area: &BoundingBox,
        offset: Vector3<i32>,
    ) -> usize {
        let ticks = source.collect_area(area);
        self.paste(ticks, offset)
    }

    /// Same as [`copy_area_from`](Self::copy_area_from) with this scheduler
    /// as the source.
    pub fn copy_area(&mut self, area: &BoundingBox, offset: Vector3<i32>) -> usize {
        let ticks = self.collect_area(area);
        self.paste(ticks, offset)
    }

    fn collect_area(&self, area: &BoundingBox) -> Vec<ScheduledTick<T>> {
        let inside = |tick: &&ScheduledTick<T>| area.is_inside(tick.pos);

        let mut ticks: Vec<_> = self
            .run_state
            .already_run_this_tick
            .iter()
            .filter(inside)
            .copied()
            .collect();
        ticks.extend(
            self.run_state
                .to_run_this_tick
                .iter()
                .filter(inside)
                .copied(),
        );
        for chunk in area.intersecting_chunks() {
            if let Some(container) = self.all_containers.get(&chunk) {
                ticks.extend(container.iter().filter(inside).copied());
            }
        }
        ticks
    }

    fn paste(&mut self, ticks: Vec<ScheduledTick<T>>, offset: Vector3<i32>) -> usize {
        let orders = ticks.iter().map(|tick| tick.sub_tick_order);
        let (Some(min_order), Some(max_order)) = (orders.clone().min(), orders.max()) else {
            return 0;
        };
        let order_shift = max_order - min_order + 1;
        let current_max = self.sub_tick_counter - 1;

        let total = ticks.len();
        let mut copied = 0;
        for tick in ticks {
            let moved = ScheduledTick {
                pos: tick.pos.offset(offset),
                sub_tick_order: tick.sub_tick_order - min_order + order_shift + current_max,
                ..tick
            };
            if let Ok(true) = self.insert_tick(moved) {
                copied += 1;
            }
        }

        log::debug!("Copied {copied} of {total} scheduled ticks by {offset:?}");
        copied
    }

    /// Returns the total number of scheduled ticks across all chunks.
    #[must_use]
    pub fn count(&self) -> usize {
        self.all_containers
            .values()
            .map(LevelChunkTicks::count)
            .sum()
    }
}

impl<T: Copy + Eq + Hash> Default for LevelTicks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash> TickAccess<T> for LevelTicks<T> {
    /// The tick's sub-tick order is replaced with the next one from the
    /// global counter.
    fn schedule_entry(&mut self, tick: ScheduledTick<T>) -> bool {
        let tick = ScheduledTick {
            sub_tick_order: self.sub_tick_counter,
            ..tick
        };
        matches!(self.insert_tick(tick), Ok(true))
    }

    fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        LevelTicks::has_scheduled_tick(self, pos, tick_type)
    }

    fn count(&self) -> usize {
        LevelTicks::count(self)
    }
}
