//! Traits shared by the tick containers.

use steel_utils::BlockPos;

use super::ScheduledTick;

/// Read/write access to a set of scheduled ticks.
///
/// Implemented by both the per-chunk container and the world-level
/// coordinator, so code that only needs to schedule or query ticks can be
/// written once against either.
pub trait TickAccess<T> {
    /// Inserts a fully formed tick.
    ///
    /// Implementations that hand out sub-tick orders themselves may replace
    /// the tick's order so it stays unique and increasing.
    ///
    /// Returns `false` if the tick was not stored, either because a tick for
    /// the same (pos, type) is already pending or because there is nowhere to
    /// store it.
    fn schedule_entry(&mut self, tick: ScheduledTick<T>) -> bool;

    /// Checks if a tick is pending for the given position and type.
    fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool;

    /// Returns the number of pending ticks.
    fn count(&self) -> usize;
}

/// Receives a notification when a newly scheduled tick becomes the earliest
/// tick of a container.
///
/// The world-level coordinator implements this on its next-tick index so
/// the index is kept current without rescanning containers.
pub trait ScheduleListener<T> {
    /// Called with the tick that is now at the head of the container.
    fn on_new_earliest(&mut self, tick: &ScheduledTick<T>);
}

impl<T> ScheduleListener<T> for () {
    fn on_new_earliest(&mut self, _tick: &ScheduledTick<T>) {}
}
