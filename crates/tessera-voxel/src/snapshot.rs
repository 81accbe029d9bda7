//! Immutable windowed voxel views used as build input.
//!
//! A [`BlockSnapshot`] is a dense box of block ids and light values copied
//! out of the world before a build starts. Builds only ever read it, so it can
//! be moved to a worker thread without locking the world.

use crate::registry::BlockId;
use crate::section::{HALO, SNAPSHOT_SIZE, SectionPos};

/// Maximum block or sky light level.
pub const MAX_LIGHT: u8 = 15;

/// A dense box of voxel state addressed by (possibly relative) coordinates.
///
/// Cell `(origin.x, origin.y, origin.z)` is the first stored cell. Light is
/// packed per cell as `block << 4 | sky`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSnapshot {
    origin: [i32; 3],
    size: [usize; 3],
    blocks: Vec<BlockId>,
    light: Vec<u8>,
}

impl BlockSnapshot {
    /// Creates a snapshot of air with full sky light.
    pub fn new(origin: [i32; 3], size: [usize; 3]) -> Self {
        let volume = size[0] * size[1] * size[2];
        Self {
            origin,
            size,
            blocks: vec![BlockId::AIR; volume],
            light: vec![MAX_LIGHT; volume],
        }
    }

    pub fn origin(&self) -> [i32; 3] {
        self.origin
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Re-labels the coordinate of the first cell without moving any data.
    ///
    /// Used to turn a world-addressed capture into a section-relative one.
    pub fn relabel(&mut self, origin: [i32; 3]) {
        self.origin = origin;
    }

    /// Returns `true` if `(x, y, z)` lies inside the snapshot.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.offset(x, y, z).is_some()
    }

    fn offset(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let rel = [
            x - self.origin[0],
            y - self.origin[1],
            z - self.origin[2],
        ];
        if rel
            .iter()
            .zip(self.size)
            .any(|(&r, s)| r < 0 || r as usize >= s)
        {
            return None;
        }
        let [rx, ry, rz] = rel.map(|r| r as usize);
        Some(rx + self.size[0] * (rz + self.size[2] * ry))
    }

    /// Index of `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the snapshot. Builds only read
    /// within the section plus its halo, so this indicates a broken caller.
    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        match self.offset(x, y, z) {
            Some(index) => index,
            None => panic!(
                "snapshot read at ({x}, {y}, {z}) outside origin {:?} size {:?}",
                self.origin, self.size
            ),
        }
    }

    pub fn block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.blocks[self.index(x, y, z)]
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockId) {
        let index = self.index(x, y, z);
        self.blocks[index] = block;
    }

    pub fn block_light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.light[self.index(x, y, z)] >> 4
    }

    pub fn sky_light(&self, x: i32, y: i32, z: i32) -> u8 {
        self.light[self.index(x, y, z)] & 0x0F
    }

    /// Sets both light channels; values are clamped to [`MAX_LIGHT`].
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, block: u8, sky: u8) {
        let index = self.index(x, y, z);
        self.light[index] = (block.min(MAX_LIGHT) << 4) | sky.min(MAX_LIGHT);
    }
}

/// Supplies snapshots of world state.
///
/// Implementations must fully populate the requested box; builds never go
/// back to the world for more data.
pub trait VoxelSource {
    /// Copies the box starting at world coordinate `origin` with extent `size`.
    fn snapshot(&self, origin: [i32; 3], size: [usize; 3]) -> BlockSnapshot;
}

/// Captures the section at `pos` plus its halo, addressed relative to the
/// section so local voxels are `0..16` and the halo is `-2..0` and `16..18`.
pub fn capture_section<S: VoxelSource + ?Sized>(source: &S, pos: SectionPos) -> BlockSnapshot {
    let [ox, oy, oz] = pos.origin();
    let mut snapshot = source.snapshot(
        [ox - HALO, oy - HALO, oz - HALO],
        [SNAPSHOT_SIZE; 3],
    );
    snapshot.relabel([-HALO; 3]);
    snapshot
}
