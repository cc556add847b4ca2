//! # Block Type Catalog
//!
//! The registry mapping block ids and names to `BlockType` records.
//!
//! ## Lifecycle
//!
//! A catalog is built once at startup, then wrapped in an `Arc` and shared read-only
//! with terrain generation, chunk grids and meshers. There is no global instance: tests
//! and tools construct their own catalogs in isolation.
//!
//! ## Performance Considerations
//!
//! Ids are handed out densely from 1, so lookup by id is a single vector index. Name
//! lookup goes through a hash map and is only expected at load time.

use std::collections::HashMap;

use log::debug;

use super::{
    block_type::{BlockType, BlockTypeBuilder},
    BlockTypeId, AIR,
};
use crate::core::{EngineError, EngineResult};

/// Ids of the blocks registered by `BlockTypeCatalog::with_default_blocks`.
pub mod block_ids {
    use super::BlockTypeId;

    /// Empty space.
    pub const AIR: BlockTypeId = 0;
    /// Grass-topped dirt.
    pub const GRASS: BlockTypeId = 1;
    /// Plain dirt.
    pub const DIRT: BlockTypeId = 2;
    /// Stone.
    pub const STONE: BlockTypeId = 3;
    /// Log with distinct end grain.
    pub const WOOD: BlockTypeId = 4;
    /// Transparent foliage.
    pub const LEAVES: BlockTypeId = 5;
    /// Sand.
    pub const SAND: BlockTypeId = 6;
    /// Transparent, non-solid water.
    pub const WATER: BlockTypeId = 7;
}

/// Registry of every block type known to the engine.
#[derive(Debug, Default)]
pub struct BlockTypeCatalog {
    /// Block types indexed by `id - 1`.
    types: Vec<BlockType>,
    by_name: HashMap<String, BlockTypeId>,
}

impl BlockTypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with the standard terrain blocks.
    ///
    /// The ids match the constants in [`block_ids`].
    pub fn with_default_blocks() -> EngineResult<Self> {
        let mut catalog = Self::new();

        catalog
            .register_type("grass")
            .top_side_bottom("grass_carried", "grass_side_carried", "dirt")
            .hardness(0.6)
            .finish()?;
        catalog.register_type("dirt").hardness(0.5).finish()?;
        catalog.register_type("stone").hardness(1.5).finish()?;
        catalog
            .register_type("wood")
            .top_side_bottom("pale_oak_log_top", "pale_oak_log_side", "pale_oak_log_top")
            .hardness(2.0)
            .finish()?;
        catalog
            .register_type("leaves")
            .texture("azalea_leaves")
            .transparent(true)
            .hardness(0.2)
            .finish()?;
        catalog.register_type("sand").hardness(0.5).finish()?;
        catalog
            .register_type("water")
            .transparent(true)
            .solid(false)
            .finish()?;

        debug!("Registered {} default block types", catalog.len());
        Ok(catalog)
    }

    /// Starts registering a new block type.
    ///
    /// The returned builder starts from the default properties; call `finish` to
    /// store it and receive its id.
    pub fn register_type(&mut self, name: &str) -> BlockTypeBuilder<'_> {
        let next_id = (self.types.len() + 1).min(BlockTypeId::MAX as usize) as BlockTypeId;
        BlockTypeBuilder {
            block_type: BlockType::new(next_id, name),
            catalog: self,
        }
    }

    pub(super) fn insert(&mut self, mut block_type: BlockType) -> EngineResult<BlockTypeId> {
        if self.by_name.contains_key(&block_type.name) {
            return Err(EngineError::DuplicateBlockType(block_type.name));
        }
        if self.types.len() >= BlockTypeId::MAX as usize {
            return Err(EngineError::CatalogFull);
        }

        let id = (self.types.len() + 1) as BlockTypeId;
        block_type.id = id;
        self.by_name.insert(block_type.name.clone(), id);
        self.types.push(block_type);
        Ok(id)
    }

    /// Looks up a block type by id. Air and unknown ids return `None`.
    #[inline]
    pub fn by_id(&self, id: BlockTypeId) -> Option<&BlockType> {
        if id == AIR {
            return None;
        }
        self.types.get(id as usize - 1)
    }

    /// Looks up a block type by name.
    pub fn by_name(&self, name: &str) -> Option<&BlockType> {
        self.by_name.get(name).and_then(|&id| self.by_id(id))
    }

    /// Whether `id` names a registered, solid block type.
    #[inline]
    pub fn is_solid(&self, id: BlockTypeId) -> bool {
        self.by_id(id).is_some_and(|block_type| block_type.is_solid)
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no block types have been registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over every registered block type in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    /// Every distinct texture name referenced by any registered block type, sorted.
    pub fn texture_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .iter()
            .flat_map(|block_type| block_type.textures.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
