//! Block type registry: maps compact [`BlockId`] values to [`BlockDef`] metadata.
//!
//! The registry is built once during startup and shared read-only with every
//! build worker. Air is always ID 0 so that zero-initialized storage
//! represents empty space.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BlockModel, TextureRegion};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
}

/// How a block type produces geometry.
///
/// The discriminant indexes the surface generator table used by section
/// builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockKind {
    /// Empty space. Never renders.
    Air = 0,
    /// Fluid rendered by the liquid surface generator.
    Liquid = 1,
    /// Rendered from one of its model variants.
    Model = 2,
}

impl BlockKind {
    /// Number of kinds.
    pub const COUNT: usize = 3;

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Appearance of a liquid surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidStyle {
    pub texture: TextureRegion,
    pub tint: [u8; 3],
}

/// The model variants of a block type. A `None` entry renders nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelVariants(Vec<Option<Arc<BlockModel>>>);

impl ModelVariants {
    pub fn new(variants: Vec<Option<Arc<BlockModel>>>) -> Self {
        Self(variants)
    }

    /// A single, always-present variant.
    pub fn single(model: BlockModel) -> Self {
        Self(vec![Some(Arc::new(model))])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the variant at `index`, `None` for empty slots or out of range.
    pub fn select(&self, index: usize) -> Option<&BlockModel> {
        self.0.get(index).and_then(|v| v.as_deref())
    }
}

/// Full descriptor for a block type.
#[derive(Clone, Debug)]
pub struct BlockDef {
    /// Human-readable name (e.g. "stone", "water").
    pub name: String,
    pub kind: BlockKind,
    /// Renders into the translucent stream.
    pub translucent: bool,
    /// Fully occludes its neighbours' adjacent faces and stops visibility.
    pub culls: bool,
    /// Model variants, used by [`BlockKind::Model`].
    pub variants: ModelVariants,
    /// Surface appearance, used by [`BlockKind::Liquid`].
    pub liquid: Option<LiquidStyle>,
}

impl BlockDef {
    /// An opaque, culling block rendered from `variants`.
    pub fn model(name: impl Into<String>, variants: ModelVariants) -> Self {
        Self {
            name: name.into(),
            kind: BlockKind::Model,
            translucent: false,
            culls: true,
            variants,
            liquid: None,
        }
    }

    /// A translucent, non-culling liquid.
    pub fn liquid(name: impl Into<String>, style: LiquidStyle) -> Self {
        Self {
            name: name.into(),
            kind: BlockKind::Liquid,
            translucent: true,
            culls: false,
            variants: ModelVariants::default(),
            liquid: Some(style),
        }
    }

    /// Marks the block as rendering into the translucent stream.
    pub fn translucent(mut self) -> Self {
        self.translucent = true;
        self
    }

    /// Marks the block as not occluding its neighbours.
    pub fn non_culling(mut self) -> Self {
        self.culls = false;
        self
    }
}

/// Errors that can occur during block type registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
    /// All 65 535 user-defined slots have been consumed.
    #[error("block type registry is full (max 65536 types)")]
    RegistryFull,
    /// Only the built-in air type may use [`BlockKind::Air`].
    #[error("block type {0} cannot use the air kind")]
    ReservedKind(String),
    /// A model block needs at least one variant slot to draw from.
    #[error("model block type {0} has no variants")]
    NoVariants(String),
    /// A liquid block needs a surface style.
    #[error("liquid block type {0} has no surface style")]
    MissingLiquidStyle(String),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockDef`] with O(1) lookup by index and O(1) reverse
/// lookup by name.
#[derive(Debug)]
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    types: Vec<BlockDef>,
    name_to_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a new registry with Air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            kind: BlockKind::Air,
            translucent: false,
            culls: false,
            variants: ModelVariants::default(),
            liquid: None,
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), BlockId::AIR);

        Self {
            types: vec![air],
            name_to_id,
        }
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is Air).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for duplicate names, a full registry, or a
    /// definition that cannot be rendered (air kind, model without variants,
    /// liquid without style).
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        match def.kind {
            BlockKind::Air => return Err(RegistryError::ReservedKind(def.name)),
            BlockKind::Model if def.variants.is_empty() => {
                return Err(RegistryError::NoVariants(def.name));
            }
            BlockKind::Liquid if def.liquid.is_none() => {
                return Err(RegistryError::MissingLiquidStyle(def.name));
            }
            _ => {}
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.types.len() as u16);
        tracing::debug!(name = %def.name, id = id.0, kind = ?def.kind, "registered block type");
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        Ok(id)
    }

    /// Returns the definition for a given ID, `None` if unknown.
    pub fn get(&self, id: BlockId) -> Option<&BlockDef> {
        self.types.get(id.0 as usize)
    }

    /// Returns the ID for a named block type, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including Air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only Air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    /// Returns `true` if the given block is air (ID 0).
    pub fn is_air(&self, id: BlockId) -> bool {
        id == BlockId::AIR
    }

    /// Returns `true` if the block renders into the translucent stream.
    /// Unknown IDs are not translucent.
    pub fn is_translucent(&self, id: BlockId) -> bool {
        self.get(id).is_some_and(|def| def.translucent)
    }

    /// Returns `true` if the block fully occludes adjacent faces.
    ///
    /// Unknown IDs do not cull, matching how they render (not at all).
    pub fn should_cull_against(&self, id: BlockId) -> bool {
        self.get(id).is_some_and(|def| def.culls)
    }

    /// Returns the model variants of a block, `None` for unknown IDs.
    pub fn models(&self, id: BlockId) -> Option<&ModelVariants> {
        self.get(id).map(|def| &def.variants)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
