//! Section coordinates and fixed section geometry.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Side length of a section in voxels.
pub const SECTION_SIZE: usize = 16;

/// Number of voxels in a section (16³).
pub const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// Voxels of neighbouring data captured around a section on every side.
pub const HALO: i32 = 2;

/// Side length of a build snapshot: the section plus its halo.
pub const SNAPSHOT_SIZE: usize = SECTION_SIZE + 2 * HALO as usize;

/// Identifies a chunk section: the chunk column `(chunk_x, chunk_z)` and the
/// vertical section index `section_y`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SectionPos {
    pub chunk_x: i32,
    pub section_y: i32,
    pub chunk_z: i32,
}

impl SectionPos {
    pub const fn new(chunk_x: i32, section_y: i32, chunk_z: i32) -> Self {
        Self {
            chunk_x,
            section_y,
            chunk_z,
        }
    }

    /// World coordinate of the section's minimum voxel.
    pub const fn origin(self) -> [i32; 3] {
        [
            self.chunk_x * SECTION_SIZE as i32,
            self.section_y * SECTION_SIZE as i32,
            self.chunk_z * SECTION_SIZE as i32,
        ]
    }

    /// World coordinate of a section-local voxel.
    pub const fn world(self, x: i32, y: i32, z: i32) -> [i32; 3] {
        let [ox, oy, oz] = self.origin();
        [ox + x, oy + y, oz + z]
    }

    /// Section containing the given world voxel, and the voxel's local coordinate.
    pub fn containing(wx: i32, wy: i32, wz: i32) -> (Self, [usize; 3]) {
        let size = SECTION_SIZE as i32;
        let pos = Self::new(wx.div_euclid(size), wy.div_euclid(size), wz.div_euclid(size));
        let local = [
            wx.rem_euclid(size) as usize,
            wy.rem_euclid(size) as usize,
            wz.rem_euclid(size) as usize,
        ];
        (pos, local)
    }

    /// The face-adjacent section in `dir`.
    pub const fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self::new(self.chunk_x + dx, self.section_y + dy, self.chunk_z + dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_size() {
        assert_eq!(SNAPSHOT_SIZE, 20);
        assert_eq!(SECTION_VOLUME, 4096);
    }

    #[test]
    fn test_origin_and_world() {
        let pos = SectionPos::new(-1, 2, 3);
        assert_eq!(pos.origin(), [-16, 32, 48]);
        assert_eq!(pos.world(15, 0, 1), [-1, 32, 49]);
    }

    #[test]
    fn test_containing_handles_negative_coordinates() {
        let (pos, local) = SectionPos::containing(-1, 0, 17);
        assert_eq!(pos, SectionPos::new(-1, 0, 1));
        assert_eq!(local, [15, 0, 1]);
    }

    #[test]
    fn test_neighbor() {
        let pos = SectionPos::new(0, 0, 0);
        assert_eq!(pos.neighbor(Direction::Up), SectionPos::new(0, 1, 0));
        assert_eq!(pos.neighbor(Direction::North), SectionPos::new(0, 0, -1));
        assert_eq!(pos.neighbor(Direction::East), SectionPos::new(1, 0, 0));
    }
}
