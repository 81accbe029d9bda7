//! Vertex attribute description derived from [`SectionVertex`].
//!
//! Every section pipeline (opaque, translucent, debug) binds vertex buffers
//! with [`SECTION_VERTEX_LAYOUT`] so the attribute table cannot drift from the
//! record.
//!
//! | Location | Offset | Format        | Fields                 |
//! |----------|--------|---------------|------------------------|
//! | 0        | 0      | `i16 × 3`     | position               |
//! | 1        | 6      | `u16 × 4`     | texture region         |
//! | 2        | 14     | `i16 × 2`     | texture offset         |
//! | 3        | 18     | `u8 × 3` norm | colour                 |
//! | 4        | 21     | `u8 × 2`      | block light, sky light |

use std::mem::{offset_of, size_of};

use crate::vertex::{SectionVertex, VERTEX_SIZE};

/// Scalar type of one attribute component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    I16,
    U16,
    U8,
}

impl ComponentType {
    pub const fn size(self) -> usize {
        match self {
            Self::I16 | Self::U16 => 2,
            Self::U8 => 1,
        }
    }
}

/// One attribute of the section vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub location: u32,
    pub offset: usize,
    pub component: ComponentType,
    pub components: usize,
    /// Integer values are mapped to `[0, 1]` in the shader.
    pub normalized: bool,
}

impl VertexAttribute {
    pub const fn size(&self) -> usize {
        self.component.size() * self.components
    }
}

/// Attributes of [`SectionVertex`], in record order.
pub const SECTION_VERTEX_ATTRIBUTES: [VertexAttribute; 5] = [
    VertexAttribute {
        name: "position",
        location: 0,
        offset: offset_of!(SectionVertex, x),
        component: ComponentType::I16,
        components: 3,
        normalized: false,
    },
    VertexAttribute {
        name: "texture_region",
        location: 1,
        offset: offset_of!(SectionVertex, tx),
        component: ComponentType::U16,
        components: 4,
        normalized: false,
    },
    VertexAttribute {
        name: "texture_offset",
        location: 2,
        offset: offset_of!(SectionVertex, t_offset_x),
        component: ComponentType::I16,
        components: 2,
        normalized: false,
    },
    VertexAttribute {
        name: "color",
        location: 3,
        offset: offset_of!(SectionVertex, r),
        component: ComponentType::U8,
        components: 3,
        normalized: true,
    },
    VertexAttribute {
        name: "light",
        location: 4,
        offset: offset_of!(SectionVertex, block_light),
        component: ComponentType::U8,
        components: 2,
        normalized: false,
    },
];

/// Stride and attributes of the section vertex buffer.
#[derive(Clone, Copy, Debug)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: &'static [VertexAttribute],
}

/// The vertex layout shared by all section pipelines.
pub const SECTION_VERTEX_LAYOUT: VertexLayout = VertexLayout {
    stride: size_of::<SectionVertex>(),
    attributes: &SECTION_VERTEX_ATTRIBUTES,
};

// ---------------------------------------------------------------------------
// Compile-time validation
// ---------------------------------------------------------------------------

const _: () = assert!(
    size_of::<SectionVertex>() == VERTEX_SIZE,
    "SectionVertex size changed, update SECTION_VERTEX_LAYOUT"
);

const _: () = assert!(SECTION_VERTEX_ATTRIBUTES[0].offset == 0);
const _: () = assert!(SECTION_VERTEX_ATTRIBUTES[1].offset == 6);
const _: () = assert!(SECTION_VERTEX_ATTRIBUTES[2].offset == 14);
const _: () = assert!(SECTION_VERTEX_ATTRIBUTES[3].offset == 18);
const _: () = assert!(SECTION_VERTEX_ATTRIBUTES[4].offset == 21);

/// The last attribute ends exactly at the stride: no padding anywhere.
const _: () = assert!(
    SECTION_VERTEX_ATTRIBUTES[4].offset + SECTION_VERTEX_ATTRIBUTES[4].size() == VERTEX_SIZE,
    "Last attribute does not end at the vertex stride"
);
