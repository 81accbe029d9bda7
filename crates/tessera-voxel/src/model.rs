//! Baked block models: the quads a block variant renders as.
//!
//! Models are defined elsewhere (asset loading is not part of this crate);
//! the helpers here build the two shapes most blocks use, full cubes and
//! crossed planes.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// A rectangle inside the texture atlas, in atlas texels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureRegion {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl TextureRegion {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }
}

/// One quad of a block model.
///
/// Corners are in sixteenths of a voxel (`0..=16`) relative to the voxel's
/// minimum corner. UVs are in sixteenths of the texture region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFace {
    /// Direction the quad faces; light is sampled from the neighbour this way.
    pub facing: Direction,
    /// Skip the quad when the neighbour in this direction culls.
    pub cull: Option<Direction>,
    pub corners: [[u8; 3]; 4],
    pub uvs: [[u8; 2]; 4],
    pub texture: TextureRegion,
    pub tint: [u8; 3],
}

/// A block model variant: an ordered list of quads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockModel {
    pub faces: Vec<ModelFace>,
}

const WHITE: [u8; 3] = [255, 255, 255];
const SIDE_UVS: [[u8; 2]; 4] = [[0, 16], [16, 16], [16, 0], [0, 0]];

/// Corners of the full-cube face pointing in `dir`.
pub const fn cube_face_corners(dir: Direction) -> [[u8; 3]; 4] {
    match dir {
        Direction::Up => [[0, 16, 0], [0, 16, 16], [16, 16, 16], [16, 16, 0]],
        Direction::Down => [[0, 0, 16], [16, 0, 16], [16, 0, 0], [0, 0, 0]],
        Direction::North => [[16, 0, 0], [0, 0, 0], [0, 16, 0], [16, 16, 0]],
        Direction::South => [[0, 0, 16], [16, 0, 16], [16, 16, 16], [0, 16, 16]],
        Direction::West => [[0, 0, 0], [0, 0, 16], [0, 16, 16], [0, 16, 0]],
        Direction::East => [[16, 0, 16], [16, 0, 0], [16, 16, 0], [16, 16, 16]],
    }
}

impl BlockModel {
    /// Full cube using the same texture and tint on every side.
    pub fn cube(texture: TextureRegion, tint: [u8; 3]) -> Self {
        Self::cube_with(|_| texture, tint)
    }

    /// Full cube picking the texture per side.
    pub fn cube_with(texture_for: impl Fn(Direction) -> TextureRegion, tint: [u8; 3]) -> Self {
        let faces = Direction::ALL
            .iter()
            .map(|&dir| ModelFace {
                facing: dir,
                cull: Some(dir),
                corners: cube_face_corners(dir),
                uvs: SIDE_UVS,
                texture: texture_for(dir),
                tint,
            })
            .collect();
        Self { faces }
    }

    /// Two crossed diagonal planes (plants), each double sided and never culled.
    pub fn cross(texture: TextureRegion) -> Self {
        let planes: [[[u8; 3]; 4]; 2] = [
            [[0, 0, 0], [16, 0, 16], [16, 16, 16], [0, 16, 0]],
            [[16, 0, 0], [0, 0, 16], [0, 16, 16], [16, 16, 0]],
        ];
        let mut faces = Vec::with_capacity(4);
        for corners in planes {
            let [a, b, c, d] = corners;
            for corners in [[a, b, c, d], [b, a, d, c]] {
                faces.push(ModelFace {
                    facing: Direction::Up,
                    cull: None,
                    corners,
                    uvs: SIDE_UVS,
                    texture,
                    tint: WHITE,
                });
            }
        }
        Self { faces }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_one_culled_face_per_direction() {
        let model = BlockModel::cube(TextureRegion::new(0, 0, 16, 16), WHITE);
        assert_eq!(model.faces.len(), 6);
        for (face, dir) in model.faces.iter().zip(Direction::ALL) {
            assert_eq!(face.facing, dir);
            assert_eq!(face.cull, Some(dir));
        }
    }

    #[test]
    fn test_cube_faces_lie_on_their_plane() {
        for dir in Direction::ALL {
            let corners = cube_face_corners(dir);
            let (axis, value) = match dir {
                Direction::Up => (1, 16),
                Direction::Down => (1, 0),
                Direction::North => (2, 0),
                Direction::South => (2, 16),
                Direction::West => (0, 0),
                Direction::East => (0, 16),
            };
            assert!(corners.iter().all(|c| c[axis] == value), "{dir:?}");
        }
    }

    #[test]
    fn test_cube_with_selects_texture_per_side() {
        let top = TextureRegion::new(16, 0, 16, 16);
        let side = TextureRegion::new(0, 0, 16, 16);
        let model = BlockModel::cube_with(
            |dir| if dir == Direction::Up { top } else { side },
            WHITE,
        );
        assert_eq!(model.faces[Direction::Up.index()].texture, top);
        assert_eq!(model.faces[Direction::East.index()].texture, side);
    }

    #[test]
    fn test_cross_is_never_culled() {
        let model = BlockModel::cross(TextureRegion::new(32, 0, 16, 16));
        assert_eq!(model.faces.len(), 4);
        assert!(model.faces.iter().all(|f| f.cull.is_none()));
    }
}
