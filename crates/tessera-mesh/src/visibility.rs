//! Section face-to-face visibility: which outer faces of a section can see
//! each other through non-culling voxels.

use tessera_voxel::{BlockRegistry, BlockSnapshot, Direction, SECTION_SIZE, SECTION_VOLUME};

/// Set of section faces, bit `Direction::index()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceSet(pub u8);

impl FaceSet {
    pub const NONE: Self = Self(0);

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

/// 64-bit face adjacency bitmask. Bit `from * 6 + to` is set when face `to`
/// can be seen from face `from`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CullBits(pub u64);

impl CullBits {
    pub const NONE: Self = Self(0);

    /// Every face sees every other face.
    pub const ALL: Self = Self((1 << 36) - 1);

    fn bit(from: Direction, to: Direction) -> u64 {
        1 << (from.index() * 6 + to.index())
    }

    pub fn set(&mut self, from: Direction, to: Direction) {
        self.0 |= Self::bit(from, to);
    }

    pub fn is_visible(self, from: Direction, to: Direction) -> bool {
        self.0 & Self::bit(from, to) != 0
    }

    /// Faces reached by any open region of the section.
    pub fn touched_faces(self) -> FaceSet {
        let mut faces = FaceSet::NONE;
        for dir in Direction::ALL {
            if self.is_visible(dir, dir) {
                faces.insert(dir);
            }
        }
        faces
    }

    /// Marks every pair in `faces` (including each face with itself) as
    /// mutually visible.
    pub fn connect(&mut self, faces: FaceSet) {
        for from in faces.iter() {
            for to in faces.iter() {
                self.set(from, to);
            }
        }
    }
}

const SIZE: i32 = SECTION_SIZE as i32;

fn cell(x: i32, y: i32, z: i32) -> usize {
    (x + SIZE * (z + SIZE * y)) as usize
}

/// Section faces a local voxel lies on (zero to three).
pub fn boundary_faces(x: i32, y: i32, z: i32) -> FaceSet {
    let mut faces = FaceSet::NONE;
    if x == 0 {
        faces.insert(Direction::West);
    } else if x == SIZE - 1 {
        faces.insert(Direction::East);
    }
    if y == 0 {
        faces.insert(Direction::Down);
    } else if y == SIZE - 1 {
        faces.insert(Direction::Up);
    }
    if z == 0 {
        faces.insert(Direction::North);
    } else if z == SIZE - 1 {
        faces.insert(Direction::South);
    }
    faces
}

/// Flood fills the section's open space and connects the faces each region
/// touches.
///
/// Every voxel is visited at most once; culling voxels are marked visited and
/// never entered. The halo is not traversed.
pub fn compute_cull_bits(snapshot: &BlockSnapshot, registry: &BlockRegistry) -> CullBits {
    let mut visited = [false; SECTION_VOLUME];
    let mut stack: Vec<(i32, i32, i32)> = Vec::new();
    let mut bits = CullBits::NONE;
    let culls = |x, y, z| registry.should_cull_against(snapshot.block(x, y, z));

    for y in 0..SIZE {
        for z in 0..SIZE {
            for x in 0..SIZE {
                if visited[cell(x, y, z)] {
                    continue;
                }
                visited[cell(x, y, z)] = true;
                if culls(x, y, z) {
                    continue;
                }

                let mut touched = FaceSet::NONE;
                stack.push((x, y, z));
                while let Some((cx, cy, cz)) = stack.pop() {
                    touched.0 |= boundary_faces(cx, cy, cz).0;
                    for dir in Direction::ALL {
                        let (nx, ny, nz) = dir.step(cx, cy, cz);
                        if !(0..SIZE).contains(&nx)
                            || !(0..SIZE).contains(&ny)
                            || !(0..SIZE).contains(&nz)
                        {
                            continue;
                        }
                        let index = cell(nx, ny, nz);
                        if visited[index] {
                            continue;
                        }
                        visited[index] = true;
                        if !culls(nx, ny, nz) {
                            stack.push((nx, ny, nz));
                        }
                    }
                }
                bits.connect(touched);
            }
        }
    }

    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_voxel::{BlockDef, BlockId, BlockModel, ModelVariants, TextureRegion};

    fn registry() -> (BlockRegistry, BlockId, BlockId) {
        let mut registry = BlockRegistry::new();
        let cube = || ModelVariants::single(BlockModel::cube(TextureRegion::new(0, 0, 16, 16), [255; 3]));
        let stone = registry.register(BlockDef::model("stone", cube())).unwrap();
        let glass = registry
            .register(BlockDef::model("glass", cube()).translucent().non_culling())
            .unwrap();
        (registry, stone, glass)
    }

    fn filled(block: BlockId) -> BlockSnapshot {
        let mut snap = BlockSnapshot::new([-2, -2, -2], [20, 20, 20]);
        for y in 0..SIZE {
            for z in 0..SIZE {
                for x in 0..SIZE {
                    snap.set_block(x, y, z, block);
                }
            }
        }
        snap
    }

    #[test]
    fn test_empty_section_sees_everything() {
        let (registry, _, _) = registry();
        let snap = BlockSnapshot::new([-2, -2, -2], [20, 20, 20]);
        assert_eq!(compute_cull_bits(&snap, &registry), CullBits::ALL);
    }

    #[test]
    fn test_solid_section_is_zero() {
        let (registry, stone, _) = registry();
        assert_eq!(compute_cull_bits(&filled(stone), &registry), CullBits::NONE);
    }

    #[test]
    fn test_non_culling_fill_is_open() {
        let (registry, _, glass) = registry();
        assert_eq!(compute_cull_bits(&filled(glass), &registry), CullBits::ALL);
    }

    #[test]
    fn test_enclosed_cavity_is_zero() {
        let (registry, stone, _) = registry();
        let mut snap = filled(stone);
        for y in 4..8 {
            for z in 4..8 {
                for x in 4..8 {
                    snap.set_block(x, y, z, BlockId::AIR);
                }
            }
        }
        assert_eq!(compute_cull_bits(&snap, &registry), CullBits::NONE);
    }

    #[test]
    fn test_open_slab_at_bottom() {
        let (registry, stone, glass) = registry();
        let mut snap = filled(stone);
        for z in 0..SIZE {
            for x in 0..SIZE {
                snap.set_block(x, 0, z, glass);
            }
        }
        let bits = compute_cull_bits(&snap, &registry);
        for side in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            assert!(bits.is_visible(Direction::Down, side), "{side:?}");
            assert!(bits.is_visible(side, Direction::Down), "{side:?}");
        }
        assert!(bits.is_visible(Direction::Down, Direction::Down));
        assert!(!bits.is_visible(Direction::Up, Direction::Up));
        assert!(!bits.is_visible(Direction::Down, Direction::Up));
        assert!(!bits.touched_faces().contains(Direction::Up));
    }

    #[test]
    fn test_wall_splits_section() {
        let (registry, stone, _) = registry();
        let mut snap = BlockSnapshot::new([-2, -2, -2], [20, 20, 20]);
        for y in 0..SIZE {
            for z in 0..SIZE {
                snap.set_block(8, y, z, stone);
            }
        }
        let bits = compute_cull_bits(&snap, &registry);
        assert!(!bits.is_visible(Direction::West, Direction::East));
        assert!(bits.is_visible(Direction::West, Direction::Up));
        assert!(bits.is_visible(Direction::East, Direction::North));
        assert!(bits.is_visible(Direction::East, Direction::East));
    }

    #[test]
    fn test_single_corner_pocket_touches_three_faces() {
        let (registry, stone, _) = registry();
        let mut snap = filled(stone);
        snap.set_block(0, 0, 0, BlockId::AIR);
        let bits = compute_cull_bits(&snap, &registry);
        let faces = bits.touched_faces();
        assert!(faces.contains(Direction::West));
        assert!(faces.contains(Direction::Down));
        assert!(faces.contains(Direction::North));
        assert_eq!(bits.0.count_ones(), 9);
    }

    #[test]
    fn test_halo_does_not_affect_bits() {
        let (registry, stone, _) = registry();
        let mut snap = BlockSnapshot::new([-2, -2, -2], [20, 20, 20]);
        for y in -2..18 {
            for x in -2..18 {
                snap.set_block(x, y, -1, stone);
            }
        }
        assert_eq!(compute_cull_bits(&snap, &registry), CullBits::ALL);
    }

    #[test]
    fn test_bits_are_symmetric() {
        let (registry, stone, _) = registry();
        let mut snap = BlockSnapshot::new([-2, -2, -2], [20, 20, 20]);
        for y in 0..SIZE {
            for x in 0..SIZE {
                snap.set_block(x, y, 3, stone);
            }
        }
        let bits = compute_cull_bits(&snap, &registry);
        for from in Direction::ALL {
            for to in Direction::ALL {
                assert_eq!(bits.is_visible(from, to), bits.is_visible(to, from));
            }
        }
    }

    #[test]
    fn test_face_set_iter() {
        let mut faces = FaceSet::NONE;
        faces.insert(Direction::East);
        faces.insert(Direction::Up);
        assert_eq!(
            faces.iter().collect::<Vec<_>>(),
            vec![Direction::Up, Direction::East]
        );
        assert_eq!(boundary_faces(5, 5, 5), FaceSet::NONE);
        assert!(boundary_faces(15, 0, 15).contains(Direction::South));
    }
}
