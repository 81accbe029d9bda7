//! Deterministic heightmap terrain for the headless runner.
//!
//! Heights are sampled on a lattice at chunk-column corners and bilinearly
//! interpolated in between, so neighbouring columns meet without seams. Each
//! column decorates itself from its own RNG, so generation order never
//! changes the result.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_voxel::{SECTION_SIZE, SectionPos, SectionWorld};

use crate::blocks::Palette;

/// Water fills every column up to (but not including) this height.
pub const SEA_LEVEL: i32 = 48;

const MIN_HEIGHT: i32 = 36;
const HEIGHT_RANGE: u32 = 36;
const DIRT_DEPTH: i32 = 3;
const FLOWER_CHANCE: f64 = 0.08;

/// Derives a column seed from the world seed and the column coordinates.
pub fn derive_column_seed(world_seed: u64, chunk_x: i32, chunk_z: i32) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    chunk_x.hash(&mut hasher);
    chunk_z.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for one chunk column.
pub fn column_rng(world_seed: u64, chunk_x: i32, chunk_z: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_column_seed(world_seed, chunk_x, chunk_z))
}

/// Fills a [`SectionWorld`] with heightmap terrain.
#[derive(Clone, Copy, Debug)]
pub struct TerrainGenerator {
    seed: u64,
    palette: Palette,
    /// Exclusive world-space top.
    top: i32,
}

impl TerrainGenerator {
    pub fn new(seed: u64, section_height: u32, palette: Palette) -> Self {
        Self {
            seed,
            palette,
            top: (section_height as usize * SECTION_SIZE) as i32,
        }
    }

    /// Height at the lattice point on the minimum corner of column `(lx, lz)`.
    fn lattice_height(&self, lx: i32, lz: i32) -> i32 {
        // Distinct stream from the decoration RNG.
        let mut rng = column_rng(self.seed ^ 0x9E37_79B9_7F4A_7C15, lx, lz);
        MIN_HEIGHT + rng.random_range(0..HEIGHT_RANGE) as i32
    }

    /// Surface height (the first air voxel) of the world column `(wx, wz)`.
    pub fn height_at(&self, wx: i32, wz: i32) -> i32 {
        let size = SECTION_SIZE as i32;
        let (lx, lz) = (wx.div_euclid(size), wz.div_euclid(size));
        let fx = wx.rem_euclid(size) as f32 / size as f32;
        let fz = wz.rem_euclid(size) as f32 / size as f32;

        let h00 = self.lattice_height(lx, lz) as f32;
        let h10 = self.lattice_height(lx + 1, lz) as f32;
        let h01 = self.lattice_height(lx, lz + 1) as f32;
        let h11 = self.lattice_height(lx + 1, lz + 1) as f32;
        let near = h00 + (h10 - h00) * fx;
        let far = h01 + (h11 - h01) * fx;
        let height = (near + (far - near) * fz).round() as i32;
        height.clamp(1, self.top - 1)
    }

    /// Generates one chunk column.
    pub fn generate_column(&self, world: &mut SectionWorld, chunk_x: i32, chunk_z: i32) {
        let p = self.palette;
        let mut rng = column_rng(self.seed, chunk_x, chunk_z);
        let size = SECTION_SIZE as i32;

        for lz in 0..size {
            for lx in 0..size {
                let (wx, wz) = (chunk_x * size + lx, chunk_z * size + lz);
                let height = self.height_at(wx, wz);
                let shore = height <= SEA_LEVEL + 1;

                for wy in 0..height {
                    let block = if wy < height - DIRT_DEPTH {
                        p.stone
                    } else if shore {
                        p.sand
                    } else if wy == height - 1 {
                        p.grass
                    } else {
                        p.dirt
                    };
                    world.set_block(wx, wy, wz, block);
                }
                for wy in height..SEA_LEVEL.min(self.top) {
                    world.set_block(wx, wy, wz, p.water);
                }

                // Always draw so the stream does not depend on the surface type.
                let bloom = rng.random_bool(FLOWER_CHANCE);
                if bloom && !shore && height < self.top {
                    world.set_block(wx, height, wz, p.flower);
                }
            }
        }
    }

    /// Generates every column within `radius` of the origin column.
    /// Returns the number of columns generated.
    pub fn generate_area(&self, world: &mut SectionWorld, radius: u32) -> usize {
        let r = radius as i32;
        let mut columns = 0;
        for cz in -r..=r {
            for cx in -r..=r {
                self.generate_column(world, cx, cz);
                columns += 1;
            }
        }
        tracing::info!(columns, sections = world.section_count(), "terrain generated");
        columns
    }
}

/// Every section in the `(2r+1)²` columns around the origin, nearest columns
/// first and bottom to top within a column.
pub fn sections_in_radius(radius: u32, section_height: u32) -> Vec<SectionPos> {
    let r = radius as i32;
    let mut positions: Vec<SectionPos> = (-r..=r)
        .flat_map(|cz| (-r..=r).map(move |cx| (cx, cz)))
        .flat_map(|(cx, cz)| (0..section_height as i32).map(move |sy| SectionPos::new(cx, sy, cz)))
        .collect();
    positions.sort_by_key(|p| {
        (
            p.chunk_x * p.chunk_x + p.chunk_z * p.chunk_z,
            p.chunk_z,
            p.chunk_x,
            p.section_y,
        )
    });
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::register_palette;
    use tessera_voxel::{BlockId, BlockRegistry};

    fn generator(seed: u64) -> TerrainGenerator {
        let mut registry = BlockRegistry::new();
        let palette = register_palette(&mut registry).unwrap();
        TerrainGenerator::new(seed, 8, palette)
    }

    #[test]
    fn test_column_seed_is_deterministic() {
        assert_eq!(derive_column_seed(7, 3, -4), derive_column_seed(7, 3, -4));
        assert_ne!(derive_column_seed(7, 3, -4), derive_column_seed(7, -4, 3));
        assert_ne!(derive_column_seed(7, 3, -4), derive_column_seed(8, 3, -4));
    }

    #[test]
    fn test_heights_are_continuous_across_columns() {
        let terrain = generator(11);
        for wz in -20..20 {
            for wx in -20..20 {
                let h = terrain.height_at(wx, wz);
                assert!((MIN_HEIGHT..MIN_HEIGHT + HEIGHT_RANGE as i32).contains(&h));
                let step = (h - terrain.height_at(wx + 1, wz)).abs();
                assert!(step <= 3, "cliff of {step} at ({wx}, {wz})");
            }
        }
    }

    #[test]
    fn test_generation_order_does_not_matter() {
        let terrain = generator(5);
        let mut a = SectionWorld::new();
        terrain.generate_column(&mut a, 0, 0);
        terrain.generate_column(&mut a, 1, 0);
        let mut b = SectionWorld::new();
        terrain.generate_column(&mut b, 1, 0);
        terrain.generate_column(&mut b, 0, 0);

        for wy in 0..128 {
            for wx in 0..32 {
                assert_eq!(a.block(wx, wy, 7), b.block(wx, wy, 7));
            }
        }
    }

    #[test]
    fn test_column_layers() {
        let terrain = generator(3);
        let p = terrain.palette;
        let mut world = SectionWorld::new();
        terrain.generate_column(&mut world, 0, 0);

        let h = terrain.height_at(4, 4);
        assert_eq!(world.block(4, 0, 4), p.stone);
        let top = world.block(4, h - 1, 4);
        if h <= SEA_LEVEL + 1 {
            assert_eq!(top, p.sand);
        } else {
            assert_eq!(top, p.grass);
        }
        let above = world.block(4, h, 4);
        assert!(above == BlockId::AIR || above == p.water || above == p.flower);
        if h < SEA_LEVEL {
            assert_eq!(world.block(4, SEA_LEVEL - 1, 4), p.water);
        }
        assert_eq!(world.block(4, SEA_LEVEL.max(h) + 1, 4), BlockId::AIR);
    }

    #[test]
    fn test_sections_in_radius_nearest_first() {
        let positions = sections_in_radius(1, 2);
        assert_eq!(positions.len(), 9 * 2);
        assert_eq!(positions[0], SectionPos::new(0, 0, 0));
        assert_eq!(positions[1], SectionPos::new(0, 1, 0));
        let last = positions[positions.len() - 1];
        assert_eq!(last.chunk_x.abs() + last.chunk_z.abs(), 2);
    }

    #[test]
    fn test_generate_area_counts_columns() {
        let terrain = generator(1);
        let mut world = SectionWorld::new();
        assert_eq!(terrain.generate_area(&mut world, 1), 9);
        assert!(world.contains_section(SectionPos::new(-1, 0, 1)));
    }
}
