//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, the catalog that owns them, and the table of
//! block face geometry.

pub mod block_side;
pub mod block_type;
pub mod catalog;

pub use block_side::{Axis, BlockSide};
pub use block_type::{BlockType, BlockTypeBuilder};
pub use catalog::{block_ids, BlockTypeCatalog};

/// The integer type used to store a block type in a voxel grid.
///
/// Zero is reserved for air and is never assigned to a registered type.
pub type BlockTypeId = u16;

/// The id of empty space.
pub const AIR: BlockTypeId = 0;
