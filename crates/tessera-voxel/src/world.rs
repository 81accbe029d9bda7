//! In-memory world storage keyed by [`SectionPos`].
//!
//! [`SectionWorld`] is the simplest [`VoxelSource`]: dense per-section arrays
//! in an [`FxHashMap`](rustc_hash::FxHashMap). Sections that were never
//! written read as air under full sky light.

use rustc_hash::FxHashMap;

use crate::registry::BlockId;
use crate::section::{SECTION_SIZE, SECTION_VOLUME, SectionPos};
use crate::snapshot::{BlockSnapshot, MAX_LIGHT, VoxelSource};

#[derive(Clone, Debug)]
struct SectionData {
    blocks: Box<[BlockId]>,
    /// `block << 4 | sky` per voxel.
    light: Box<[u8]>,
}

impl SectionData {
    fn new() -> Self {
        Self {
            blocks: vec![BlockId::AIR; SECTION_VOLUME].into_boxed_slice(),
            light: vec![MAX_LIGHT; SECTION_VOLUME].into_boxed_slice(),
        }
    }

    fn index([x, y, z]: [usize; 3]) -> usize {
        x + SECTION_SIZE * (z + SECTION_SIZE * y)
    }
}

/// Owns all stored sections and serves snapshots of them.
#[derive(Clone, Debug, Default)]
pub struct SectionWorld {
    sections: FxHashMap<SectionPos, SectionData>,
}

impl SectionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the block at a world coordinate.
    pub fn block(&self, wx: i32, wy: i32, wz: i32) -> BlockId {
        let (pos, local) = SectionPos::containing(wx, wy, wz);
        self.sections
            .get(&pos)
            .map_or(BlockId::AIR, |s| s.blocks[SectionData::index(local)])
    }

    /// Sets the block at a world coordinate, allocating its section if needed.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, block: BlockId) {
        let (pos, local) = SectionPos::containing(wx, wy, wz);
        let section = self.sections.entry(pos).or_insert_with(SectionData::new);
        section.blocks[SectionData::index(local)] = block;
    }

    /// Sets both light channels at a world coordinate (clamped to [`MAX_LIGHT`]).
    pub fn set_light(&mut self, wx: i32, wy: i32, wz: i32, block: u8, sky: u8) {
        let (pos, local) = SectionPos::containing(wx, wy, wz);
        let section = self.sections.entry(pos).or_insert_with(SectionData::new);
        section.light[SectionData::index(local)] = (block.min(MAX_LIGHT) << 4) | sky.min(MAX_LIGHT);
    }

    /// Returns `(block_light, sky_light)` at a world coordinate.
    pub fn light(&self, wx: i32, wy: i32, wz: i32) -> (u8, u8) {
        let (pos, local) = SectionPos::containing(wx, wy, wz);
        let packed = self
            .sections
            .get(&pos)
            .map_or(MAX_LIGHT, |s| s.light[SectionData::index(local)]);
        (packed >> 4, packed & 0x0F)
    }

    /// Returns `true` if the section has been written to.
    pub fn contains_section(&self, pos: SectionPos) -> bool {
        self.sections.contains_key(&pos)
    }

    /// Iterates over the positions of all stored sections.
    pub fn section_positions(&self) -> impl Iterator<Item = SectionPos> + '_ {
        self.sections.keys().copied()
    }

    /// Number of stored sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Drops a section; it reads as air afterwards.
    pub fn remove_section(&mut self, pos: SectionPos) -> bool {
        self.sections.remove(&pos).is_some()
    }
}

impl VoxelSource for SectionWorld {
    fn snapshot(&self, origin: [i32; 3], size: [usize; 3]) -> BlockSnapshot {
        let mut snapshot = BlockSnapshot::new(origin, size);
        // Snapshots span at most a few sections; remember the last one looked up.
        let mut cached: Option<(SectionPos, Option<&SectionData>)> = None;

        for dy in 0..size[1] as i32 {
            for dz in 0..size[2] as i32 {
                for dx in 0..size[0] as i32 {
                    let (wx, wy, wz) = (origin[0] + dx, origin[1] + dy, origin[2] + dz);
                    let (pos, local) = SectionPos::containing(wx, wy, wz);
                    let section = match cached {
                        Some((cached_pos, section)) if cached_pos == pos => section,
                        _ => {
                            let section = self.sections.get(&pos);
                            cached = Some((pos, section));
                            section
                        }
                    };
                    let Some(section) = section else {
                        continue;
                    };
                    let index = SectionData::index(local);
                    let packed = section.light[index];
                    snapshot.set_block(wx, wy, wz, section.blocks[index]);
                    snapshot.set_light(wx, wy, wz, packed >> 4, packed & 0x0F);
                }
            }
        }

        snapshot
    }
}
