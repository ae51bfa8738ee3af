// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::math::{Vector2, Vector3};

/// Number of bits to shift a block coordinate by to get its chunk coordinate.
pub const CHUNK_SHIFT: i32 = 4;

/// A chunk position. `0.y` holds the chunk's z coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }

    /// Converts a block coordinate to the coordinate of the chunk containing it.
    #[inline]
    #[must_use]
    pub const fn block_to_chunk_coord(coord: i32) -> i32 {
        coord >> CHUNK_SHIFT
    }

    /// The chunk x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The chunk z coordinate.
    #[must_use]
    pub const fn z(self) -> i32 {
        self.0.y
    }

    /// Chebyshev distance in chunks between two chunk positions.
    #[must_use]
    pub fn chessboard_distance(self, other: Self) -> i32 {
        (self.x() - other.x()).abs().max((self.z() - other.z()).abs())
    }
}

impl From<BlockPos> for ChunkPos {
    #[inline]
    fn from(pos: BlockPos) -> Self {
        Self::new(
            Self::block_to_chunk_coord(pos.0.x),
            Self::block_to_chunk_coord(pos.0.z),
        )
    }
}

impl Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x(), self.z())
    }
}

/// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// Returns this position moved by `offset`.
    #[must_use]
    pub fn offset(self, offset: Vector3<i32>) -> Self {
        Self(self.0 + offset)
    }

    /// Returns the chunk this block lives in.
    #[inline]
    #[must_use]
    pub fn chunk_pos(self) -> ChunkPos {
        ChunkPos::from(self)
    }

    /// The four horizontal neighbours, in north, south, west, east order.
    #[must_use]
    pub fn horizontal_neighbors(self) -> [Self; 4] {
        [
            self.offset(Vector3::new(0, 0, -1)),
            self.offset(Vector3::new(0, 0, 1)),
            self.offset(Vector3::new(-1, 0, 0)),
            self.offset(Vector3::new(1, 0, 0)),
        ]
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}
