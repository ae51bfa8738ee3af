//! Axis aligned block boxes.

use serde::{Deserialize, Serialize};

use crate::math::Vector3;
use crate::{BlockPos, ChunkPos};

/// An axis aligned box of blocks. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The minimum corner.
    pub min: Vector3<i32>,
    /// The maximum corner.
    pub max: Vector3<i32>,
}

impl BoundingBox {
    /// Creates a box spanning the two corners, in any order.
    #[must_use]
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.0.min(b.0),
            max: a.0.max(b.0),
        }
    }

    /// Creates a box containing a single block.
    #[must_use]
    pub fn single(pos: BlockPos) -> Self {
        Self {
            min: pos.0,
            max: pos.0,
        }
    }

    /// Returns `true` if the block lies inside this box.
    #[must_use]
    pub fn is_inside(&self, pos: BlockPos) -> bool {
        let p = pos.0;
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns this box moved by `offset`.
    #[must_use]
    pub fn moved(&self, offset: Vector3<i32>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Iterates over every chunk column this box touches.
    pub fn intersecting_chunks(&self) -> impl Iterator<Item = ChunkPos> + use<> {
        let min_x = ChunkPos::block_to_chunk_coord(self.min.x);
        let max_x = ChunkPos::block_to_chunk_coord(self.max.x);
        let min_z = ChunkPos::block_to_chunk_coord(self.min.z);
        let max_z = ChunkPos::block_to_chunk_coord(self.max.z);
        (min_x..=max_x).flat_map(move |x| (min_z..=max_z).map(move |z| ChunkPos::new(x, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_inside_is_inclusive() {
        let bb = BoundingBox::from_corners(BlockPos::new(4, 10, 4), BlockPos::new(0, 0, 0));
        assert!(bb.is_inside(BlockPos::new(0, 0, 0)));
        assert!(bb.is_inside(BlockPos::new(4, 10, 4)));
        assert!(!bb.is_inside(BlockPos::new(5, 10, 4)));
        assert!(!bb.is_inside(BlockPos::new(2, -1, 2)));
    }

    #[test]
    fn test_intersecting_chunks() {
        let bb = BoundingBox::from_corners(BlockPos::new(-1, 0, 15), BlockPos::new(16, 0, 16));
        let chunks: Vec<_> = bb.intersecting_chunks().collect();
        assert_eq!(chunks.len(), 6);
        assert!(chunks.contains(&ChunkPos::new(-1, 0)));
        assert!(chunks.contains(&ChunkPos::new(1, 1)));
        assert!(!chunks.contains(&ChunkPos::new(2, 1)));
    }
}
