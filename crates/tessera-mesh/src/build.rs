//! One section build: resolver plus visibility over a captured snapshot.

use std::time::{Duration, Instant};

use tessera_voxel::{BlockRegistry, BlockSnapshot, SectionPos};

use crate::buffers::{SectionBuffer, UploadError};
use crate::emitter::GeometryStream;
use crate::resolver::resolve_section;
use crate::surface::SurfaceTable;
use crate::translucency::TranslucencyRecord;
use crate::visibility::{CullBits, compute_cull_bits};

/// Counters for one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub voxels_visited: u32,
    pub draws: u32,
    pub voxels_emitted: u32,
    pub voxels_skipped: u32,
    pub opaque_vertices: u32,
    pub translucent_vertices: u32,
    pub duration: Duration,
}

/// Everything a finished build hands to the render thread.
#[derive(Clone, Debug)]
pub struct SectionMesh {
    pub pos: SectionPos,
    pub opaque: GeometryStream,
    pub translucent: GeometryStream,
    pub records: Vec<TranslucencyRecord>,
    pub cull_bits: CullBits,
    pub stats: BuildStats,
}

impl SectionMesh {
    /// Total vertex bytes across both streams.
    pub fn byte_len(&self) -> usize {
        self.opaque.byte_len() + self.translucent.byte_len()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.translucent.is_empty()
    }

    /// Replaces the contents of `buffer` with this mesh.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::ContextNotReady`] without touching the buffer
    /// when it cannot accept uploads.
    pub fn upload_to<B: SectionBuffer + ?Sized>(&self, buffer: &mut B) -> Result<(), UploadError> {
        if !buffer.is_ready() {
            return Err(UploadError::ContextNotReady);
        }
        buffer.upload(
            self.opaque.as_bytes(),
            self.opaque.vertex_count(),
            self.cull_bits,
        );
        buffer.upload_translucent(
            &self.records,
            self.translucent.as_bytes(),
            self.translucent.vertex_count(),
        );
        Ok(())
    }
}

/// Builds the mesh and visibility bits of the section at `pos`.
///
/// `snapshot` must cover the section plus its halo in section-relative
/// coordinates (see [`tessera_voxel::capture_section`]).
pub fn build_section(
    pos: SectionPos,
    snapshot: &BlockSnapshot,
    registry: &BlockRegistry,
    surfaces: &SurfaceTable,
) -> SectionMesh {
    let start = Instant::now();
    let resolved = resolve_section(pos, snapshot, registry, surfaces);
    let cull_bits = compute_cull_bits(snapshot, registry);

    let streams = resolved.streams;
    let stats = BuildStats {
        voxels_visited: resolved.stats.voxels_visited,
        draws: resolved.stats.draws,
        voxels_emitted: resolved.stats.voxels_emitted,
        voxels_skipped: resolved.stats.voxels_skipped,
        opaque_vertices: streams.opaque.vertex_count(),
        translucent_vertices: streams.translucent.vertex_count(),
        duration: start.elapsed(),
    };
    tracing::debug!(
        ?pos,
        opaque = stats.opaque_vertices,
        translucent = stats.translucent_vertices,
        records = resolved.records.len(),
        cull_bits = format_args!("{:#x}", cull_bits.0),
        elapsed_us = stats.duration.as_micros() as u64,
        "built section"
    );

    SectionMesh {
        pos,
        opaque: streams.opaque,
        translucent: streams.translucent,
        records: resolved.records,
        cull_bits,
        stats,
    }
}
