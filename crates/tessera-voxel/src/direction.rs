//! The six axis-aligned directions a voxel face or section face can point.

use serde::{Deserialize, Serialize};

/// One of the six cardinal directions.
///
/// The `repr(u8)` discriminant is the face index used by section visibility
/// bitmasks (bit `from * 6 + to`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// +Y.
    Up = 0,
    /// −Y.
    Down = 1,
    /// −Z.
    North = 2,
    /// +Z.
    South = 3,
    /// −X.
    West = 4,
    /// +X.
    East = 5,
}

impl Direction {
    /// All six directions in index order.
    pub const ALL: [Direction; 6] = [
        Self::Up,
        Self::Down,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    /// Unit offset `(dx, dy, dz)` of the neighbour in this direction.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Returns the neighbour coordinate of `(x, y, z)` in this direction.
    pub const fn step(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        let (dx, dy, dz) = self.offset();
        (x + dx, y + dy, z + dz)
    }

    /// Returns the opposite direction.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Returns the direction index (0–5).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a direction index, `None` when out of range.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 6 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_discriminants() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
            assert_eq!(Direction::from_index(i), Some(*dir));
        }
        assert!(Direction::from_index(6).is_none());
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn test_offsets_cancel_with_opposite() {
        for dir in Direction::ALL {
            let (x, y, z) = dir.step(3, 4, 5);
            assert_eq!(dir.opposite().step(x, y, z), (3, 4, 5));
        }
    }

    #[test]
    fn test_step_west_goes_negative() {
        assert_eq!(Direction::West.step(0, 0, 0), (-1, 0, 0));
        assert_eq!(Direction::North.step(0, 0, 0), (0, 0, -1));
    }
}
