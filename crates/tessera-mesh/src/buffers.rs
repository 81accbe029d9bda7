//! The render-side buffer contract a finished build is uploaded into.

use std::collections::HashMap;
use std::hash::BuildHasher;

use glam::Vec3;
use thiserror::Error;

use tessera_voxel::{Direction, SectionPos};

use crate::translucency::{TranslucencyRecord, sorted_stream};
use crate::visibility::CullBits;

/// Why a finished build was not applied. The section keeps its previous
/// buffers either way.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    #[error("render context is not ready for uploads")]
    ContextNotReady,
    #[error("section {0:?} is no longer resident")]
    SectionNotResident(SectionPos),
}

/// Live GPU-side state of one section.
///
/// Both calls happen back to back on the render thread for one build, so a
/// frame sees either the old set of buffers or the new one.
pub trait SectionBuffer {
    /// Whether the buffer can accept uploads right now.
    fn is_ready(&self) -> bool {
        true
    }

    fn upload(&mut self, opaque: &[u8], opaque_count: u32, cull_bits: CullBits);

    fn upload_translucent(
        &mut self,
        records: &[TranslucencyRecord],
        translucent: &[u8],
        translucent_count: u32,
    );
}

/// Resident sections by position.
pub trait SectionStore {
    type Buffer: SectionBuffer;

    fn section_buffer(&mut self, pos: SectionPos) -> Option<&mut Self::Buffer>;
}

impl<B: SectionBuffer, S: BuildHasher> SectionStore for HashMap<SectionPos, B, S> {
    type Buffer = B;

    fn section_buffer(&mut self, pos: SectionPos) -> Option<&mut B> {
        self.get_mut(&pos)
    }
}

/// A section buffer that keeps everything in memory.
///
/// Used by the headless runner and by tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuSectionBuffer {
    pub opaque: Vec<u8>,
    pub opaque_count: u32,
    pub translucent: Vec<u8>,
    pub translucent_count: u32,
    pub records: Vec<TranslucencyRecord>,
    pub cull_bits: CullBits,
    /// Number of completed uploads.
    pub generation: u32,
}

impl CpuSectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, from: Direction, to: Direction) -> bool {
        self.cull_bits.is_visible(from, to)
    }

    /// Translucent bytes ordered back to front for a viewer at `eye`.
    pub fn sorted_translucent(&self, eye: Vec3) -> Vec<u8> {
        sorted_stream(&self.translucent, &self.records, eye)
    }
}

impl SectionBuffer for CpuSectionBuffer {
    fn upload(&mut self, opaque: &[u8], opaque_count: u32, cull_bits: CullBits) {
        self.opaque.clear();
        self.opaque.extend_from_slice(opaque);
        self.opaque_count = opaque_count;
        self.cull_bits = cull_bits;
    }

    fn upload_translucent(
        &mut self,
        records: &[TranslucencyRecord],
        translucent: &[u8],
        translucent_count: u32,
    ) {
        self.records.clear();
        self.records.extend_from_slice(records);
        self.translucent.clear();
        self.translucent.extend_from_slice(translucent);
        self.translucent_count = translucent_count;
        self.generation += 1;
    }
}
