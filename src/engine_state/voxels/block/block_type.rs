//! # Block Type Module
//!
//! Describes what a kind of block looks like and how it behaves: per-face texture
//! names plus the physical flags the mesher and gameplay code read.

use super::{block_side::BlockSide, BlockTypeId};

/// A registered kind of block.
///
/// Block types are created through `BlockTypeCatalog::register_type` and are
/// immutable once registered.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockType {
    /// Catalog-assigned id, never `AIR`.
    pub id: BlockTypeId,
    /// Unique name, e.g. `"stone"`.
    pub name: String,
    /// Atlas texture name per face, indexed by `BlockSide as usize`.
    pub textures: [String; 6],
    /// Whether light and sight pass through the block.
    pub is_transparent: bool,
    /// Whether the block occludes the faces of its neighbours.
    pub is_solid: bool,
    /// Mining resistance.
    pub hardness: f32,
}

impl BlockType {
    /// Creates a block type with the default properties: every face textured with
    /// the type's own name, opaque, solid, hardness 1.0.
    pub(super) fn new(id: BlockTypeId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            textures: std::array::from_fn(|_| name.to_owned()),
            is_transparent: false,
            is_solid: true,
            hardness: 1.0,
        }
    }

    /// The atlas texture name used for the given face.
    #[inline]
    pub fn texture(&self, side: BlockSide) -> &str {
        &self.textures[side as usize]
    }
}

/// Fluent builder returned by `BlockTypeCatalog::register_type`.
///
/// Nothing is stored in the catalog until `finish` is called.
///
/// # Example
/// ```rust
/// use voxel_renderer::BlockTypeCatalog;
///
/// let mut catalog = BlockTypeCatalog::new();
/// let grass = catalog
///     .register_type("grass")
///     .top_side_bottom("grass_top", "grass_side", "dirt")
///     .hardness(0.6)
///     .finish()
///     .unwrap();
/// assert_eq!(catalog.by_id(grass).unwrap().name, "grass");
/// ```
#[must_use = "a block type is only registered once `finish` is called"]
pub struct BlockTypeBuilder<'a> {
    pub(super) catalog: &'a mut super::catalog::BlockTypeCatalog,
    pub(super) block_type: BlockType,
}

impl BlockTypeBuilder<'_> {
    /// Uses one texture on every face.
    pub fn texture(mut self, name: &str) -> Self {
        for slot in self.block_type.textures.iter_mut() {
            *slot = name.to_owned();
        }
        self
    }

    /// Overrides the texture of a single face.
    pub fn face_texture(mut self, side: BlockSide, name: &str) -> Self {
        self.block_type.textures[side as usize] = name.to_owned();
        self
    }

    /// Sets a distinct top and bottom texture with one texture for the four walls.
    pub fn top_side_bottom(mut self, top: &str, side: &str, bottom: &str) -> Self {
        for face in BlockSide::all() {
            let name = match face {
                BlockSide::TOP => top,
                BlockSide::BOTTOM => bottom,
                _ => side,
            };
            self.block_type.textures[face as usize] = name.to_owned();
        }
        self
    }

    /// Marks the block as see-through.
    pub fn transparent(mut self, transparent: bool) -> Self {
        self.block_type.is_transparent = transparent;
        self
    }

    /// Controls whether the block hides its neighbours' faces.
    pub fn solid(mut self, solid: bool) -> Self {
        self.block_type.is_solid = solid;
        self
    }

    /// Sets the mining resistance.
    pub fn hardness(mut self, hardness: f32) -> Self {
        self.block_type.hardness = hardness;
        self
    }

    /// Stores the block type in the catalog.
    ///
    /// # Returns
    /// The assigned id, or `EngineError::DuplicateBlockType` if the name is taken.
    pub fn finish(self) -> crate::core::EngineResult<BlockTypeId> {
        self.catalog.insert(self.block_type)
    }
}
