//! Section mesh building: per-voxel resolution into opaque and translucent
//! vertex streams, translucency records, face visibility bits, and the
//! asynchronous build coordinator.

pub mod buffers;
pub mod build;
pub mod coordinator;
pub mod emitter;
pub mod invalidation;
pub mod layout;
pub mod resolver;
pub mod surface;
pub mod translucency;
pub mod vertex;
pub mod visibility;

pub use buffers::{CpuSectionBuffer, SectionBuffer, SectionStore, UploadError};
pub use build::{BuildStats, SectionMesh, build_section};
pub use emitter::{GeometryStream, Layer, VertexEmitter};
pub use layout::{
    ComponentType, SECTION_VERTEX_ATTRIBUTES, SECTION_VERTEX_LAYOUT, VertexAttribute, VertexLayout,
};
pub use resolver::{
    DrawSequence, MeshError, ResolveStats, resolve_section, section_seed, variant_index,
};
pub use surface::{SurfaceFn, SurfaceInput, SurfaceTable, liquid_surface, model_surface};
pub use translucency::{TranslucencyRecord, TranslucencyTracker, back_to_front, sorted_stream};
pub use vertex::{POSITION_SCALE, SectionVertex, VERTEX_SIZE, decode_stream};
pub use visibility::{CullBits, FaceSet, compute_cull_bits};

pub use coordinator::{ApplySummary, BuildCoordinator, BuildError, BuildState, BuildToken};
pub use invalidation::{affected_by_world_edit, affected_sections};
