//! The block palette the headless world is built from.

use std::sync::Arc;

use tessera_voxel::{
    BlockDef, BlockId, BlockModel, BlockRegistry, Direction, LiquidStyle, ModelVariants,
    RegistryError, TextureRegion,
};

const TILE: u16 = 16;

/// Atlas tile `(col, row)`.
const fn tile(col: u16, row: u16) -> TextureRegion {
    TextureRegion::new(col * TILE, row * TILE, TILE, TILE)
}

const WHITE: [u8; 3] = [255, 255, 255];

/// Ids of every registered block, resolved once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub stone: BlockId,
    pub dirt: BlockId,
    pub grass: BlockId,
    pub sand: BlockId,
    pub water: BlockId,
    pub flower: BlockId,
}

fn grass_model(tint: [u8; 3]) -> BlockModel {
    BlockModel::cube_with(
        |dir| match dir {
            Direction::Up => tile(2, 0),
            Direction::Down => tile(1, 0),
            _ => tile(3, 0),
        },
        tint,
    )
}

/// Registers the palette into `registry`.
///
/// Grass has two tint variants and stone three texture variants, so variant
/// selection shows up in the output. Flowers have an empty slot: some flower
/// voxels render nothing.
pub fn register_palette(registry: &mut BlockRegistry) -> Result<Palette, RegistryError> {
    let stone = registry.register(BlockDef::model(
        "stone",
        ModelVariants::new(
            (0..3)
                .map(|col| Some(Arc::new(BlockModel::cube(tile(col, 1), WHITE))))
                .collect(),
        ),
    ))?;
    let dirt = registry.register(BlockDef::model(
        "dirt",
        ModelVariants::single(BlockModel::cube(tile(1, 0), WHITE)),
    ))?;
    let grass = registry.register(BlockDef::model(
        "grass",
        ModelVariants::new(vec![
            Some(Arc::new(grass_model([120, 200, 90]))),
            Some(Arc::new(grass_model([140, 210, 80]))),
        ]),
    ))?;
    let sand = registry.register(BlockDef::model(
        "sand",
        ModelVariants::single(BlockModel::cube(tile(4, 0), WHITE)),
    ))?;
    let water = registry.register(BlockDef::liquid(
        "water",
        LiquidStyle {
            texture: tile(0, 2),
            tint: [60, 100, 220],
        },
    ))?;
    let flower = registry.register(
        BlockDef::model(
            "flower",
            ModelVariants::new(vec![
                Some(Arc::new(BlockModel::cross(tile(5, 0)))),
                Some(Arc::new(BlockModel::cross(tile(6, 0)))),
                None,
            ]),
        )
        .non_culling(),
    )?;

    tracing::debug!(types = registry.len(), "block palette registered");

    Ok(Palette {
        stone,
        dirt,
        grass,
        sand,
        water,
        flower,
    })
}
