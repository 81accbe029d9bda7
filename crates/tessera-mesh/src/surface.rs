//! Surface generators: turn one voxel into quads.
//!
//! Generators are plain functions looked up in a [`SurfaceTable`] indexed by
//! [`BlockKind`]. The defaults render model variants and liquids; callers can
//! swap either out without touching the resolver.

use tessera_voxel::model::cube_face_corners;
use tessera_voxel::{
    BlockDef, BlockId, BlockKind, BlockModel, BlockRegistry, BlockSnapshot, Direction,
    TextureRegion,
};

use crate::emitter::GeometryStream;
use crate::vertex::{POSITION_SCALE, SectionVertex};

/// Height of an uncovered liquid surface, in sixteenths of a voxel.
pub const LIQUID_SURFACE_HEIGHT: u8 = 14;

const QUAD_UVS: [[u8; 2]; 4] = [[0, 16], [16, 16], [16, 0], [0, 0]];

/// Everything a generator may look at for one voxel.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceInput<'a> {
    pub snapshot: &'a BlockSnapshot,
    pub registry: &'a BlockRegistry,
    pub id: BlockId,
    pub block: &'a BlockDef,
    /// The selected variant for model blocks, `None` otherwise.
    pub model: Option<&'a BlockModel>,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SurfaceInput<'_> {
    /// Block in the neighbouring cell in `dir`.
    pub fn neighbor(&self, dir: Direction) -> BlockId {
        let (nx, ny, nz) = dir.step(self.x, self.y, self.z);
        self.snapshot.block(nx, ny, nz)
    }

    fn light_at(&self, x: i32, y: i32, z: i32) -> (u8, u8) {
        (
            self.snapshot.block_light(x, y, z),
            self.snapshot.sky_light(x, y, z),
        )
    }
}

/// Generates geometry for one voxel into `out`.
pub type SurfaceFn = fn(&SurfaceInput<'_>, &mut GeometryStream);

/// Surface generators indexed by [`BlockKind`].
#[derive(Clone, Copy, Debug)]
pub struct SurfaceTable {
    generators: [Option<SurfaceFn>; BlockKind::COUNT],
}

impl SurfaceTable {
    /// A table with no generators; every non-air voxel is skipped.
    pub const fn empty() -> Self {
        Self {
            generators: [None; BlockKind::COUNT],
        }
    }

    /// Replaces the generator for `kind`.
    pub fn with(mut self, kind: BlockKind, generator: SurfaceFn) -> Self {
        self.generators[kind.index()] = Some(generator);
        self
    }

    pub fn get(&self, kind: BlockKind) -> Option<SurfaceFn> {
        self.generators[kind.index()]
    }
}

impl Default for SurfaceTable {
    fn default() -> Self {
        Self::empty()
            .with(BlockKind::Liquid, liquid_surface)
            .with(BlockKind::Model, model_surface)
    }
}

fn position(base: i32, sixteenths: u8) -> i16 {
    (base * POSITION_SCALE as i32 + sixteenths as i32 * (POSITION_SCALE as i32 / 16)) as i16
}

/// Emits one quad for the voxel in `input`.
fn emit_quad(
    input: &SurfaceInput<'_>,
    out: &mut GeometryStream,
    corners: &[[u8; 3]; 4],
    uvs: &[[u8; 2]; 4],
    texture: TextureRegion,
    tint: [u8; 3],
    light: (u8, u8),
) {
    let (block_light, sky_light) = light;
    let quad: [SectionVertex; 4] = std::array::from_fn(|i| {
        SectionVertex {
            x: position(input.x, corners[i][0]),
            y: position(input.y, corners[i][1]),
            z: position(input.z, corners[i][2]),
            t_offset_x: uvs[i][0] as i16 * 16,
            t_offset_y: uvs[i][1] as i16 * 16,
            r: tint[0],
            g: tint[1],
            b: tint[2],
            block_light,
            sky_light,
            ..SectionVertex::default()
        }
        .with_texture(texture)
    });
    out.push_quad(&quad);
}

/// Renders the selected model variant, skipping faces whose cull neighbour
/// occludes them.
///
/// Culled faces are lit from the neighbour they face; faces that never cull
/// (plants) are lit from the voxel itself.
pub fn model_surface(input: &SurfaceInput<'_>, out: &mut GeometryStream) {
    let Some(model) = input.model else {
        return;
    };
    for face in &model.faces {
        if let Some(cull) = face.cull
            && input.registry.should_cull_against(input.neighbor(cull))
        {
            continue;
        }
        let light = match face.cull {
            Some(_) => {
                let (lx, ly, lz) = face.facing.step(input.x, input.y, input.z);
                input.light_at(lx, ly, lz)
            }
            None => input.light_at(input.x, input.y, input.z),
        };
        emit_quad(
            input,
            out,
            &face.corners,
            &face.uvs,
            face.texture,
            face.tint,
            light,
        );
    }
}

/// Renders a liquid cell: every face not shared with the same liquid and not
/// hidden by a culling neighbour. The top sits at [`LIQUID_SURFACE_HEIGHT`]
/// unless the same liquid continues above.
pub fn liquid_surface(input: &SurfaceInput<'_>, out: &mut GeometryStream) {
    let Some(style) = input.block.liquid else {
        return;
    };
    let top = if input.neighbor(Direction::Up) == input.id {
        16
    } else {
        LIQUID_SURFACE_HEIGHT
    };

    for dir in Direction::ALL {
        let neighbor = input.neighbor(dir);
        if neighbor == input.id || input.registry.should_cull_against(neighbor) {
            continue;
        }
        let mut corners = cube_face_corners(dir);
        for corner in &mut corners {
            if corner[1] == 16 {
                corner[1] = top;
            }
        }
        let (lx, ly, lz) = dir.step(input.x, input.y, input.z);
        emit_quad(
            input,
            out,
            &corners,
            &QUAD_UVS,
            style.texture,
            style.tint,
            input.light_at(lx, ly, lz),
        );
    }
}
