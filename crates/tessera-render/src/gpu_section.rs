//! GPU-resident section geometry.
//!
//! Vertex records are 23 bytes, which no wgpu vertex stride can express, so
//! the streams live in storage buffers and are read by vertex pulling. Each
//! stream is padded to [`wgpu::COPY_BUFFER_ALIGNMENT`].

use std::borrow::Cow;

use glam::Vec3;
use tessera_mesh::{CullBits, SectionBuffer, TranslucencyRecord, sorted_stream};
use tessera_voxel::Direction;
use wgpu::util::DeviceExt;

use crate::context::GpuContext;

/// One geometry stream on the GPU.
#[derive(Debug)]
struct GpuStream {
    buffer: wgpu::Buffer,
    /// Allocated size in bytes.
    capacity: u64,
    /// Bytes of vertex data, before padding.
    len: u64,
    vertex_count: u32,
}

fn padded(bytes: &[u8]) -> Cow<'_, [u8]> {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    let rem = bytes.len() % align;
    if rem == 0 {
        Cow::Borrowed(bytes)
    } else {
        let mut owned = Vec::with_capacity(bytes.len() + align - rem);
        owned.extend_from_slice(bytes);
        owned.resize(bytes.len() + align - rem, 0);
        Cow::Owned(owned)
    }
}

/// Writes `bytes` into `slot`, reusing the existing buffer when it fits.
///
/// Returns `true` if the buffer was reused. An empty stream frees the buffer.
fn write_stream(
    ctx: &GpuContext,
    slot: &mut Option<GpuStream>,
    label: &str,
    bytes: &[u8],
    vertex_count: u32,
) -> bool {
    if bytes.is_empty() {
        *slot = None;
        return false;
    }
    let contents = padded(bytes);
    if let Some(stream) = slot
        && contents.len() as u64 <= stream.capacity
    {
        ctx.queue.write_buffer(&stream.buffer, 0, &contents);
        stream.len = bytes.len() as u64;
        stream.vertex_count = vertex_count;
        return true;
    }

    let buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &contents,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
    *slot = Some(GpuStream {
        buffer,
        capacity: contents.len() as u64,
        len: bytes.len() as u64,
        vertex_count,
    });
    false
}

/// The live buffers of one section.
///
/// Keeps a CPU copy of the translucent stream so it can be re-sorted when the
/// camera moves.
#[derive(Debug)]
pub struct GpuSectionBuffer {
    ctx: GpuContext,
    opaque: Option<GpuStream>,
    translucent: Option<GpuStream>,
    translucent_bytes: Vec<u8>,
    records: Vec<TranslucencyRecord>,
    cull_bits: CullBits,
    ready: bool,
}

impl GpuSectionBuffer {
    /// An empty section. Nothing is allocated until the first upload.
    pub fn new(ctx: GpuContext) -> Self {
        Self {
            ctx,
            opaque: None,
            translucent: None,
            translucent_bytes: Vec::new(),
            records: Vec::new(),
            cull_bits: CullBits::NONE,
            ready: true,
        }
    }

    /// Marks the device usable or not (e.g. after device loss). Uploads are
    /// refused while not ready.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn opaque_buffer(&self) -> Option<&wgpu::Buffer> {
        self.opaque.as_ref().map(|s| &s.buffer)
    }

    pub fn translucent_buffer(&self) -> Option<&wgpu::Buffer> {
        self.translucent.as_ref().map(|s| &s.buffer)
    }

    pub fn opaque_vertex_count(&self) -> u32 {
        self.opaque.as_ref().map_or(0, |s| s.vertex_count)
    }

    pub fn translucent_vertex_count(&self) -> u32 {
        self.translucent.as_ref().map_or(0, |s| s.vertex_count)
    }

    pub fn cull_bits(&self) -> CullBits {
        self.cull_bits
    }

    pub fn is_visible(&self, from: Direction, to: Direction) -> bool {
        self.cull_bits.is_visible(from, to)
    }

    pub fn records(&self) -> &[TranslucencyRecord] {
        &self.records
    }

    /// Total GPU memory held by this section in bytes.
    pub fn gpu_bytes(&self) -> u64 {
        [&self.opaque, &self.translucent]
            .into_iter()
            .flatten()
            .map(|s| s.capacity)
            .sum()
    }

    /// Rewrites the translucent buffer in back-to-front order for `eye`.
    pub fn sort_translucent(&mut self, eye: Vec3) {
        let Some(stream) = &self.translucent else {
            return;
        };
        let sorted = sorted_stream(&self.translucent_bytes, &self.records, eye);
        debug_assert_eq!(sorted.len() as u64, stream.len);
        self.ctx.queue.write_buffer(&stream.buffer, 0, &padded(&sorted));
    }
}

impl SectionBuffer for GpuSectionBuffer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn upload(&mut self, opaque: &[u8], opaque_count: u32, cull_bits: CullBits) {
        let reused = write_stream(
            &self.ctx,
            &mut self.opaque,
            "section_opaque",
            opaque,
            opaque_count,
        );
        self.cull_bits = cull_bits;
        log::trace!("Opaque upload: {} bytes (reused: {reused})", opaque.len());
    }

    fn upload_translucent(
        &mut self,
        records: &[TranslucencyRecord],
        translucent: &[u8],
        translucent_count: u32,
    ) {
        write_stream(
            &self.ctx,
            &mut self.translucent,
            "section_translucent",
            translucent,
            translucent_count,
        );
        self.translucent_bytes.clear();
        self.translucent_bytes.extend_from_slice(translucent);
        self.records.clear();
        self.records.extend_from_slice(records);
    }
}
