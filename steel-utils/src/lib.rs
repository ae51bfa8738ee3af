//! # Steel Utils
//!
//! Position and geometry value types shared by the Steel crates.

pub mod bounding_box;
pub mod math;
mod types;

pub use bounding_box::BoundingBox;
pub use types::{BlockPos, ChunkPos};
