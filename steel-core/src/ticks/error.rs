//! Errors raised by the scheduled tick system.

use steel_utils::{BlockPos, ChunkPos};
use thiserror::Error;

/// A tick targeted a chunk that has no registered tick container.
///
/// The tick is dropped. The scheduler logs this when it happens, so callers
/// that cannot act on it (such as a tick callback) may ignore the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Attempted to schedule tick at {pos} in unloaded chunk {chunk}")]
pub struct UnloadedChunkError {
    /// The position the tick was scheduled for.
    pub pos: BlockPos,
    /// The chunk that was not loaded.
    pub chunk: ChunkPos,
}
