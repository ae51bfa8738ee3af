//! Scheduled tick types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use steel_utils::BlockPos;

/// Priority level for scheduled ticks.
///
/// When multiple ticks fire on the same game tick, they are processed
/// in priority order (lowest numeric value first), then by sub-tick order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum TickPriority {
    /// Extremely high priority (-3)
    ExtremelyHigh = -3,
    /// Very high priority (-2)
    VeryHigh = -2,
    /// High priority (-1)
    High = -1,
    /// Normal priority (0) - default
    #[default]
    Normal = 0,
    /// Low priority (1)
    Low = 1,
    /// Very low priority (2)
    VeryLow = 2,
    /// Extremely low priority (3)
    ExtremelyLow = 3,
}

impl TickPriority {
    /// Returns the numeric value of this priority.
    /// Lower values = higher priority.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i8 {
        self as i8
    }

    /// Converts a numeric value back to a priority, clamping out of range values.
    #[must_use]
    pub const fn from_value(value: i8) -> Self {
        match value {
            i8::MIN..=-3 => Self::ExtremelyHigh,
            -2 => Self::VeryHigh,
            -1 => Self::High,
            0 => Self::Normal,
            1 => Self::Low,
            2 => Self::VeryLow,
            3..=i8::MAX => Self::ExtremelyLow,
        }
    }
}

impl PartialOrd for TickPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TickPriority {
    /// `Less` runs first: `High < Normal < Low`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

/// A scheduled tick for a block or fluid.
///
/// Scheduled ticks are used by blocks like fire, redstone repeaters,
/// and fluids to schedule future updates at specific game ticks.
///
/// Ticks compare by run order: `trigger_tick`, then `priority`, then
/// `sub_tick_order`. The smaller tick runs first. Equality only looks at
/// these three fields; use [`TickKey`] to ask whether two ticks target the
/// same position and type.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledTick<T> {
    /// The type being ticked (block ID or fluid ID).
    pub tick_type: T,
    /// The position of the block/fluid.
    pub pos: BlockPos,
    /// The absolute game tick when this should fire.
    pub trigger_tick: i64,
    /// Priority for ordering within the same game tick.
    pub priority: TickPriority,
    /// Sub-tick ordering for ticks with same `trigger_tick` and priority.
    /// Lower values run first. Unique per scheduler.
    pub sub_tick_order: i64,
}

impl<T> ScheduledTick<T> {
    /// Creates a new scheduled tick with normal priority.
    pub fn new(tick_type: T, pos: BlockPos, trigger_tick: i64, sub_tick_order: i64) -> Self {
        Self {
            tick_type,
            pos,
            trigger_tick,
            priority: TickPriority::Normal,
            sub_tick_order,
        }
    }

    /// Creates a new scheduled tick with the specified priority.
    pub fn with_priority(
        tick_type: T,
        pos: BlockPos,
        trigger_tick: i64,
        priority: TickPriority,
        sub_tick_order: i64,
    ) -> Self {
        Self {
            tick_type,
            pos,
            trigger_tick,
            priority,
            sub_tick_order,
        }
    }

    /// Returns `true` if this tick should fire at or before `current_tick`.
    #[inline]
    #[must_use]
    pub fn is_due(&self, current_tick: i64) -> bool {
        self.trigger_tick <= current_tick
    }
}

impl<T> PartialEq for ScheduledTick<T> {
    fn eq(&self, other: &Self) -> bool {
        self.trigger_tick == other.trigger_tick
            && self.priority == other.priority
            && self.sub_tick_order == other.sub_tick_order
    }
}

impl<T> Eq for ScheduledTick<T> {}

impl<T> PartialOrd for ScheduledTick<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTick<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.trigger_tick
            .cmp(&other.trigger_tick)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.sub_tick_order.cmp(&other.sub_tick_order))
    }
}

/// Key for deduplication in the tick set.
///
/// Only considers position and type - ignores timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickKey<T> {
    /// The position of the block/fluid.
    pub pos: BlockPos,
    /// The type being ticked.
    pub tick_type: T,
}

impl<T: Copy> From<&ScheduledTick<T>> for TickKey<T> {
    fn from(tick: &ScheduledTick<T>) -> Self {
        Self {
            pos: tick.pos,
            tick_type: tick.tick_type,
        }
    }
}

/// A scheduled tick in its saved form.
///
/// The trigger tick is stored relative to the game time at save, so a chunk
/// can be loaded into a world whose clock has moved on. The sub-tick order
/// is not stored; saved ticks are kept in run order instead and receive fresh
/// orders when restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTick<T> {
    /// The type being ticked.
    #[serde(rename = "i")]
    pub tick_type: T,
    /// The position of the block/fluid.
    #[serde(rename = "p")]
    pub pos: BlockPos,
    /// Ticks from the save time until this fires. Negative if overdue.
    #[serde(rename = "t")]
    pub delay: i64,
    /// Priority for ordering within the same game tick.
    #[serde(rename = "pr", default)]
    pub priority: TickPriority,
}

impl<T: Copy> SavedTick<T> {
    /// Packs a live tick relative to `game_time`.
    #[must_use]
    pub fn pack(tick: &ScheduledTick<T>, game_time: i64) -> Self {
        Self {
            tick_type: tick.tick_type,
            pos: tick.pos,
            delay: tick.trigger_tick - game_time,
            priority: tick.priority,
        }
    }

    /// The absolute trigger tick once loaded at `game_time`.
    #[must_use]
    pub const fn trigger_tick(&self, game_time: i64) -> i64 {
        game_time + self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_ordering() {
        let pos = BlockPos::new(0, 0, 0);

        // Earlier trigger_tick should come first
        let tick1 = ScheduledTick::new(1u32, pos, 100, 7);
        let tick2 = ScheduledTick::new(1u32, pos, 200, 0);
        assert!(tick1 < tick2);

        // Same trigger_tick, higher priority should come first
        let tick3 = ScheduledTick::with_priority(1u32, pos, 100, TickPriority::High, 3);
        let tick4 = ScheduledTick::with_priority(1u32, pos, 100, TickPriority::Normal, 0);
        assert!(tick3 < tick4);

        // Same trigger_tick and priority, lower sub_tick_order should come first
        let tick5 = ScheduledTick::new(1u32, pos, 100, 5);
        let tick6 = ScheduledTick::new(1u32, pos, 100, 10);
        assert!(tick5 < tick6);
    }

    #[test]
    fn test_priority_values() {
        assert!(TickPriority::ExtremelyHigh < TickPriority::High);
        assert!(TickPriority::Normal < TickPriority::ExtremelyLow);
        assert_eq!(TickPriority::from_value(-1), TickPriority::High);
        assert_eq!(TickPriority::from_value(9), TickPriority::ExtremelyLow);
    }

    #[test]
    fn test_saved_tick_delay() {
        let tick =
            ScheduledTick::with_priority(2u32, BlockPos::new(1, 2, 3), 95, TickPriority::Low, 4);
        let saved = SavedTick::pack(&tick, 100);
        assert_eq!(saved.delay, -5);
        assert_eq!(saved.trigger_tick(1000), 995);
        assert_eq!(saved.priority, TickPriority::Low);
    }
}
