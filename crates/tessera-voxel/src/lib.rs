//! Block types, section coordinates, and the immutable block snapshots that
//! section builds read from.

pub mod direction;
pub mod model;
pub mod registry;
pub mod section;
pub mod snapshot;
pub mod world;

pub use direction::Direction;
pub use model::{BlockModel, ModelFace, TextureRegion};
pub use registry::{
    BlockDef, BlockId, BlockKind, BlockRegistry, LiquidStyle, ModelVariants, RegistryError,
};
pub use section::{HALO, SECTION_SIZE, SECTION_VOLUME, SNAPSHOT_SIZE, SectionPos};
pub use snapshot::{BlockSnapshot, MAX_LIGHT, VoxelSource, capture_section};
pub use world::SectionWorld;
