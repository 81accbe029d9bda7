//! The section vertex record and its fixed-order byte encoding.
//!
//! [`SectionVertex`] is the exact layout the GPU vertex format is derived
//! from. Streams are written field by field in declaration order,
//! little-endian, with no padding.

use tessera_voxel::TextureRegion;

/// Size of one encoded vertex in bytes.
pub const VERTEX_SIZE: usize = 23;

/// Sub-voxel units per voxel along each position axis.
pub const POSITION_SCALE: i16 = 256;

/// One vertex of section geometry.
///
/// Layout (23 bytes total):
///   - `[0..6]`   position `i16 × 3` in 1/256 voxel, section relative
///   - `[6..14]`  texture region `u16 × 4` (x, y, w, h) in atlas texels
///   - `[14..18]` texture offset `i16 × 2` in 1/256 of the region extent
///   - `[18..21]` colour `u8 × 3`
///   - `[21]`     block light (0..=15)
///   - `[22]`     sky light (0..=15)
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SectionVertex {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub tx: u16,
    pub ty: u16,
    pub tw: u16,
    pub th: u16,
    pub t_offset_x: i16,
    pub t_offset_y: i16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub block_light: u8,
    pub sky_light: u8,
}

static_assertions::assert_eq_size!(SectionVertex, [u8; VERTEX_SIZE]);

impl SectionVertex {
    /// Sets the texture region fields from an atlas rectangle.
    pub fn with_texture(mut self, region: TextureRegion) -> Self {
        self.tx = region.x;
        self.ty = region.y;
        self.tw = region.w;
        self.th = region.h;
        self
    }

    /// Appends the encoded vertex to `out` and returns the bytes written.
    ///
    /// Copies each field out of the packed struct before encoding, so no
    /// unaligned references are formed.
    pub fn write_to(&self, out: &mut Vec<u8>) -> usize {
        let Self {
            x,
            y,
            z,
            tx,
            ty,
            tw,
            th,
            t_offset_x,
            t_offset_y,
            r,
            g,
            b,
            block_light,
            sky_light,
        } = *self;

        out.reserve(VERTEX_SIZE);
        out.extend_from_slice(&x.to_le_bytes());
        out.extend_from_slice(&y.to_le_bytes());
        out.extend_from_slice(&z.to_le_bytes());
        out.extend_from_slice(&tx.to_le_bytes());
        out.extend_from_slice(&ty.to_le_bytes());
        out.extend_from_slice(&tw.to_le_bytes());
        out.extend_from_slice(&th.to_le_bytes());
        out.extend_from_slice(&t_offset_x.to_le_bytes());
        out.extend_from_slice(&t_offset_y.to_le_bytes());
        out.extend_from_slice(&[r, g, b, block_light, sky_light]);
        VERTEX_SIZE
    }

    /// Decodes one vertex from the front of `bytes`, `None` if too short.
    pub fn read_from(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; VERTEX_SIZE] = bytes.get(..VERTEX_SIZE)?.try_into().ok()?;
        let i16_at = |i: usize| i16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        Some(Self {
            x: i16_at(0),
            y: i16_at(2),
            z: i16_at(4),
            tx: u16_at(6),
            ty: u16_at(8),
            tw: u16_at(10),
            th: u16_at(12),
            t_offset_x: i16_at(14),
            t_offset_y: i16_at(16),
            r: bytes[18],
            g: bytes[19],
            b: bytes[20],
            block_light: bytes[21],
            sky_light: bytes[22],
        })
    }
}

/// Decodes a whole stream. Trailing bytes that do not form a full vertex are ignored.
pub fn decode_stream(bytes: &[u8]) -> Vec<SectionVertex> {
    bytes
        .chunks_exact(VERTEX_SIZE)
        .filter_map(SectionVertex::read_from)
        .collect()
}
