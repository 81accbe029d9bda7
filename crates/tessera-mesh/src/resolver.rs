//! Per-voxel resolution: walks a section's voxels in a fixed order, picks a
//! model variant from a per-section random sequence, and runs the kind's
//! surface generator into the opaque or translucent stream.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use tessera_voxel::{BlockId, BlockKind, BlockRegistry, BlockSnapshot, SECTION_SIZE, SectionPos};

use crate::emitter::{Layer, VertexEmitter};
use crate::surface::{SurfaceInput, SurfaceTable};
use crate::translucency::{TranslucencyRecord, TranslucencyTracker};

/// A voxel that could not be rendered. The voxel is skipped; the build goes on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    #[error("block id {0:?} is not registered")]
    UnknownBlock(BlockId),
    #[error("no surface generator for block kind {0:?}")]
    MissingGenerator(BlockKind),
}

/// Seed for a section's variant sequence.
///
/// Depends only on the chunk column, so every section of a column shares a
/// sequence and rebuilding an unchanged section reproduces its variants.
pub fn section_seed(pos: SectionPos) -> u64 {
    (pos.chunk_x as u32 as u64) | ((pos.chunk_z as u32 as u64) << 32)
}

/// A counted stream of 64-bit random draws.
#[derive(Clone, Debug)]
pub struct DrawSequence {
    rng: ChaCha8Rng,
    draws: u32,
}

impl DrawSequence {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn for_section(pos: SectionPos) -> Self {
        Self::new(section_seed(pos))
    }

    pub fn next_draw(&mut self) -> u64 {
        self.draws += 1;
        self.rng.next_u64()
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u32 {
        self.draws
    }
}

/// Maps a raw draw onto `[0, count)` with a widening multiply.
///
/// Never needs a second draw. A `count` of zero yields `0`.
pub fn variant_index(draw: u64, count: usize) -> usize {
    ((draw as u128 * count as u128) >> 64) as usize
}

/// Counters for one resolver pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub voxels_visited: u32,
    pub draws: u32,
    /// Voxels that wrote at least one byte.
    pub voxels_emitted: u32,
    /// Voxels skipped because of a [`MeshError`].
    pub voxels_skipped: u32,
}

/// Output of [`resolve_section`].
#[derive(Clone, Debug, Default)]
pub struct ResolvedGeometry {
    pub streams: VertexEmitter,
    pub records: Vec<TranslucencyRecord>,
    pub stats: ResolveStats,
}

/// Runs the resolver over every local voxel of `snapshot`.
///
/// Traversal is y outer, x middle, z inner. Exactly one draw is taken per
/// voxel before anything else is looked at, so the sequence position of a
/// voxel never depends on the contents of any other voxel.
pub fn resolve_section(
    pos: SectionPos,
    snapshot: &BlockSnapshot,
    registry: &BlockRegistry,
    surfaces: &SurfaceTable,
) -> ResolvedGeometry {
    let mut sequence = DrawSequence::for_section(pos);
    let mut streams = VertexEmitter::new();
    let mut tracker = TranslucencyTracker::new();
    let mut stats = ResolveStats::default();
    let size = SECTION_SIZE as i32;

    for y in 0..size {
        for x in 0..size {
            for z in 0..size {
                let draw = sequence.next_draw();
                stats.voxels_visited += 1;

                let id = snapshot.block(x, y, z);
                if registry.is_air(id) {
                    continue;
                }
                let def = match registry.get(id) {
                    Some(def) => def,
                    None => {
                        skip_voxel(&mut stats, MeshError::UnknownBlock(id), x, y, z);
                        continue;
                    }
                };
                let Some(generate) = surfaces.get(def.kind) else {
                    skip_voxel(&mut stats, MeshError::MissingGenerator(def.kind), x, y, z);
                    continue;
                };
                let model = match def.kind {
                    BlockKind::Model => {
                        match def.variants.select(variant_index(draw, def.variants.len())) {
                            Some(model) => Some(model),
                            None => continue,
                        }
                    }
                    _ => None,
                };

                let input = SurfaceInput {
                    snapshot,
                    registry,
                    id,
                    block: def,
                    model,
                    x,
                    y,
                    z,
                };
                let layer = if def.translucent {
                    Layer::Translucent
                } else {
                    Layer::Opaque
                };
                let stream = streams.stream_mut(layer);
                let start = stream.byte_len();
                generate(&input, stream);
                let end = stream.byte_len();

                if end > start {
                    stats.voxels_emitted += 1;
                    if def.translucent {
                        tracker.record(pos.world(x, y, z), start, end);
                    }
                }
            }
        }
    }

    stats.draws = sequence.draws();
    ResolvedGeometry {
        streams,
        records: tracker.into_records(),
        stats,
    }
}

fn skip_voxel(stats: &mut ResolveStats, error: MeshError, x: i32, y: i32, z: i32) {
    stats.voxels_skipped += 1;
    tracing::warn!(x, y, z, %error, "skipping voxel");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::emitter::GeometryStream;
    use crate::vertex::{SectionVertex, decode_stream};
    use tessera_voxel::{BlockDef, BlockModel, LiquidStyle, ModelVariants, TextureRegion};

    fn section_snapshot() -> BlockSnapshot {
        BlockSnapshot::new([-2, -2, -2], [20, 20, 20])
    }

    fn four_variant_block(registry: &mut BlockRegistry) -> BlockId {
        let variants = (0..4)
            .map(|i| Some(Arc::new(BlockModel::cube(TextureRegion::new(i * 16, 0, 16, 16), [255; 3]))))
            .collect();
        registry
            .register(BlockDef::model("ore", ModelVariants::new(variants)))
            .unwrap()
    }

    /// Emits one vertex whose `tx` is the selected variant's texture x.
    fn tag_variant(input: &SurfaceInput<'_>, out: &mut GeometryStream) {
        if let Some(model) = input.model {
            let texture = model.faces[0].texture;
            out.push(&SectionVertex::default().with_texture(texture));
        }
    }

    #[test]
    fn test_seed_packs_x_low_z_high() {
        assert_eq!(section_seed(SectionPos::new(1, 5, 2)), 1 | (2 << 32));
        assert_eq!(section_seed(SectionPos::new(-1, 0, 0)), 0xFFFF_FFFF);
        assert_eq!(section_seed(SectionPos::new(0, 0, -1)), 0xFFFF_FFFF_0000_0000);
    }

    #[test]
    fn test_section_y_does_not_change_seed() {
        assert_eq!(
            section_seed(SectionPos::new(3, 0, 4)),
            section_seed(SectionPos::new(3, 7, 4))
        );
    }

    #[test]
    fn test_variant_index_bounds() {
        assert_eq!(variant_index(0, 5), 0);
        assert_eq!(variant_index(u64::MAX, 5), 4);
        assert_eq!(variant_index(u64::MAX, 1), 0);
        assert_eq!(variant_index(12345, 0), 0);
        assert_eq!(variant_index(1 << 63, 2), 1);
    }

    #[test]
    fn test_draw_sequence_is_reproducible() {
        let mut a = DrawSequence::new(42);
        let mut b = DrawSequence::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_draw(), b.next_draw());
        }
        assert_eq!(a.draws(), 16);
    }

    #[test]
    fn test_empty_section_draws_once_per_voxel() {
        let registry = BlockRegistry::new();
        let out = resolve_section(
            SectionPos::new(0, 0, 0),
            &section_snapshot(),
            &registry,
            &SurfaceTable::default(),
        );
        assert_eq!(out.stats.draws, 4096);
        assert_eq!(out.stats.voxels_visited, 4096);
        assert_eq!(out.streams.total_bytes(), 0);
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_unknown_block_is_skipped() {
        let registry = BlockRegistry::new();
        let mut snap = section_snapshot();
        snap.set_block(3, 3, 3, BlockId(77));
        let out = resolve_section(
            SectionPos::new(0, 0, 0),
            &snap,
            &registry,
            &SurfaceTable::default(),
        );
        assert_eq!(out.stats.voxels_skipped, 1);
        assert_eq!(out.stats.draws, 4096);
        assert_eq!(out.streams.total_bytes(), 0);
    }

    #[test]
    fn test_missing_generator_is_skipped() {
        let mut registry = BlockRegistry::new();
        let ore = four_variant_block(&mut registry);
        let mut snap = section_snapshot();
        snap.set_block(0, 0, 0, ore);
        let out = resolve_section(SectionPos::new(0, 0, 0), &snap, &registry, &SurfaceTable::empty());
        assert_eq!(out.stats.voxels_skipped, 1);
        assert_eq!(out.streams.total_bytes(), 0);
    }

    #[test]
    fn test_empty_variant_slot_renders_nothing() {
        let mut registry = BlockRegistry::new();
        let ghost = registry
            .register(BlockDef::model("ghost", ModelVariants::new(vec![None])))
            .unwrap();
        let mut snap = section_snapshot();
        snap.set_block(1, 1, 1, ghost);
        let out = resolve_section(
            SectionPos::new(0, 0, 0),
            &snap,
            &registry,
            &SurfaceTable::default(),
        );
        assert_eq!(out.stats.voxels_skipped, 0);
        assert_eq!(out.stats.voxels_emitted, 0);
        assert_eq!(out.streams.total_bytes(), 0);
    }

    #[test]
    fn test_translucent_records_use_world_coordinates() {
        let mut registry = BlockRegistry::new();
        let water = registry
            .register(BlockDef::liquid(
                "water",
                LiquidStyle {
                    texture: TextureRegion::new(0, 0, 16, 16),
                    tint: [255; 3],
                },
            ))
            .unwrap();
        let mut snap = section_snapshot();
        snap.set_block(2, 3, 4, water);
        let pos = SectionPos::new(1, -1, 2);
        let out = resolve_section(pos, &snap, &registry, &SurfaceTable::default());

        assert!(out.streams.opaque.is_empty());
        assert_eq!(out.records.len(), 1);
        let record = out.records[0];
        assert_eq!((record.x, record.y, record.z), (18, -13, 36));
        assert_eq!(record.offset, 0);
        assert_eq!(record.count, out.streams.translucent.byte_len());
    }

    #[test]
    fn test_adding_block_keeps_other_variants() {
        let mut registry = BlockRegistry::new();
        let ore = four_variant_block(&mut registry);
        let stone = registry
            .register(BlockDef::model(
                "stone",
                ModelVariants::single(BlockModel::cube(TextureRegion::new(999, 0, 16, 16), [255; 3])),
            ))
            .unwrap();
        let surfaces = SurfaceTable::empty().with(BlockKind::Model, tag_variant);
        let pos = SectionPos::new(7, 0, -3);

        let mut before = section_snapshot();
        for i in 0..16 {
            before.set_block(i, 0, 15 - i, ore);
        }
        let mut after = before.clone();
        after.set_block(5, 0, 5, stone);

        let a = resolve_section(pos, &before, &registry, &surfaces);
        let b = resolve_section(pos, &after, &registry, &surfaces);
        let tags = |out: &ResolvedGeometry| -> Vec<u16> {
            decode_stream(out.streams.opaque.as_bytes())
                .iter()
                .map(|v| v.tx)
                .filter(|&tx| tx != 999)
                .collect()
        };
        assert_eq!(tags(&a), tags(&b));
        assert_eq!(b.streams.opaque.vertex_count(), 17);
    }
}
