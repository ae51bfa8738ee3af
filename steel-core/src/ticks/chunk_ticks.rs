//! Per-chunk scheduled tick storage.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashSet;
use steel_utils::BlockPos;

use super::{SavedTick, ScheduleListener, ScheduledTick, TickAccess, TickKey};

/// Per-chunk storage for scheduled ticks.
///
/// This struct manages scheduled ticks for a single chunk, providing:
/// - A priority queue ordered by run order (see [`ScheduledTick`])
/// - Deduplication to prevent scheduling the same (pos, type) twice
///
/// When a tick is scheduled for a position that already has a pending tick,
/// the new tick is ignored and the existing one keeps its timing.
pub struct LevelChunkTicks<T: Copy + Eq + Hash> {
    /// Min-heap of scheduled ticks; the head runs first.
    tick_queue: BinaryHeap<Reverse<ScheduledTick<T>>>,
    /// Set of (pos, type) pairs for deduplication.
    /// If a key exists here, that position+type already has a scheduled tick.
    ticks_per_position: FxHashSet<TickKey<T>>,
}

impl<T: Copy + Eq + Hash> LevelChunkTicks<T> {
    /// Creates a new empty chunk tick container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_queue: BinaryHeap::new(),
            ticks_per_position: FxHashSet::default(),
        }
    }

    /// Schedules a tick if one isn't already scheduled for this (pos, type).
    ///
    /// Returns `true` if the tick was scheduled, `false` if one already exists.
    pub fn schedule(&mut self, tick: ScheduledTick<T>) -> bool {
        self.schedule_with(tick, &mut ())
    }

    /// Like [`schedule`](Self::schedule), and tells `listener` when the new
    /// tick became the earliest tick in this container.
    pub fn schedule_with<L>(&mut self, tick: ScheduledTick<T>, listener: &mut L) -> bool
    where
        L: ScheduleListener<T> + ?Sized,
    {
        if !self.ticks_per_position.insert(TickKey::from(&tick)) {
            // Already scheduled, keep existing timing
            return false;
        }
        self.tick_queue.push(Reverse(tick));
        if self.peek().is_some_and(|head| *head == tick) {
            listener.on_new_earliest(&tick);
        }
        true
    }

    /// Returns a reference to the next tick to fire, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&ScheduledTick<T>> {
        self.tick_queue.peek().map(|Reverse(tick)| tick)
    }

    /// Removes and returns the next tick to fire.
    ///
    /// Also removes it from the deduplication set.
    pub fn poll(&mut self) -> Option<ScheduledTick<T>> {
        let Reverse(tick) = self.tick_queue.pop()?;
        self.ticks_per_position.remove(&TickKey::from(&tick));
        Some(tick)
    }

    /// Checks if a tick is scheduled for the given position and type.
    #[must_use]
    pub fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        self.ticks_per_position
            .contains(&TickKey { pos, tick_type })
    }

    /// Returns the number of scheduled ticks in this chunk.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tick_queue.len()
    }

    /// Returns `true` if there are no scheduled ticks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tick_queue.is_empty()
    }

    /// Removes all ticks matching the predicate.
    ///
    /// Returns how many ticks were removed.
    pub fn remove_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&ScheduledTick<T>) -> bool,
    {
        let before = self.tick_queue.len();
        let old_queue = mem::take(&mut self.tick_queue).into_vec();
        let mut kept = Vec::with_capacity(old_queue.len());
        for entry in old_queue {
            if predicate(&entry.0) {
                self.ticks_per_position.remove(&TickKey::from(&entry.0));
            } else {
                kept.push(entry);
            }
        }
        self.tick_queue = BinaryHeap::from(kept);
        before - self.tick_queue.len()
    }

    /// Returns an iterator over all scheduled ticks.
    ///
    /// Note: The order is not guaranteed to match trigger order.
    /// Used when copying ticks between areas and when saving.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTick<T>> {
        self.tick_queue.iter().map(|Reverse(tick)| tick)
    }

    /// Packs every pending tick relative to `game_time`, in run order.
    #[must_use]
    pub fn save(&self, game_time: i64) -> Vec<SavedTick<T>> {
        let mut ticks: Vec<_> = self.iter().collect();
        ticks.sort_unstable();
        ticks
            .into_iter()
            .map(|tick| SavedTick::pack(tick, game_time))
            .collect()
    }
}

impl<T: Copy + Eq + Hash> Default for LevelChunkTicks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash> TickAccess<T> for LevelChunkTicks<T> {
    fn schedule_entry(&mut self, tick: ScheduledTick<T>) -> bool {
        self.schedule(tick)
    }

    fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        LevelChunkTicks::has_scheduled_tick(self, pos, tick_type)
    }

    fn count(&self) -> usize {
        LevelChunkTicks::count(self)
    }
}
