//! Mesh generation for voxel chunks.
//!
//! This module converts a chunk's `VoxelGrid` into GPU-ready geometry, one `MeshData`
//! per block type so the renderer can batch by material.
//!
//! # Architecture
//! - [`MeshData`]: Vertex and index buffers with append and validation helpers
//! - [`GreedyMesher`]: Merges coplanar same-type faces into maximal rectangles
//! - [`NaiveMesher`]: One quad per exposed face; the reference the greedy output is
//!   checked against
//! - [`ChunkMesher`]: The seam the chunk manager uses, so either mesher can be plugged in
//!
//! # Usage
//! ```no_run
//! use std::sync::Arc;
//! use voxel_renderer::{BlockTypeCatalog, ChunkMesher, GreedyMesher, TextureAtlas, VoxelGrid};
//!
//! let catalog = Arc::new(BlockTypeCatalog::with_default_blocks().unwrap());
//! let atlas = Arc::new(TextureAtlas::grid(&catalog.texture_names(), 16, 16));
//! let mesher = GreedyMesher::new(catalog, atlas).unwrap();
//! let meshes = mesher.generate_mesh(&VoxelGrid::new(16, 256, 16));
//! assert!(meshes.is_empty());
//! ```
//!
//! # Performance Considerations
//! - Greedy meshing emits geometry proportional to surface rectangles, not volume
//! - Atlas lookups are resolved once per block type per build, not once per face
//! - A single mask buffer is reused across every slice of a build

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use crate::core::{EngineResult, MesherKind};
use crate::engine_state::{
    rendering::texture::{TextureAtlas, UvRect},
    voxels::{
        block::{BlockSide, BlockTypeCatalog, BlockTypeId},
        chunk::VoxelGrid,
    },
};

mod greedy;
#[allow(clippy::module_inception)]
mod mesh;
mod naive;

pub use greedy::{GreedyMesher, INSET_EPSILON};
pub use mesh::*;
pub use naive::NaiveMesher;

/// Meshes of one chunk keyed by block type. Types with no visible faces have no entry.
pub type ChunkMeshes = HashMap<BlockTypeId, MeshData>;

/// Turns a voxel grid into per block type meshes.
///
/// Implementations hold the catalog and atlas they were built with and are read-only,
/// so one mesher can serve many chunks, including from several threads.
pub trait ChunkMesher: Send + Sync {
    /// Builds the meshes for every visible face in `grid`.
    fn generate_mesh(&self, grid: &VoxelGrid) -> ChunkMeshes;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Builds the mesher selected by `kind`.
///
/// # Returns
/// `EngineError::EmptyAtlas` if `atlas` holds no textures.
pub fn build_mesher(
    kind: MesherKind,
    catalog: Arc<BlockTypeCatalog>,
    atlas: Arc<TextureAtlas>,
) -> EngineResult<Box<dyn ChunkMesher>> {
    Ok(match kind {
        MesherKind::Greedy => Box::new(GreedyMesher::new(catalog, atlas)?),
        MesherKind::Naive => Box::new(NaiveMesher::new(catalog, atlas)?),
    })
}

/// Per-build cache of the atlas rectangles for each block type's six faces.
///
/// Unregistered ids resolve to `None` and are reported once per build.
pub(crate) struct FaceTextures<'a> {
    catalog: &'a BlockTypeCatalog,
    atlas: &'a TextureAtlas,
    resolved: HashMap<BlockTypeId, Option<[UvRect; 6]>>,
}

impl<'a> FaceTextures<'a> {
    pub(crate) fn new(catalog: &'a BlockTypeCatalog, atlas: &'a TextureAtlas) -> Self {
        Self {
            catalog,
            atlas,
            resolved: HashMap::new(),
        }
    }

    /// The atlas rectangle of `side` for block type `id`.
    pub(crate) fn get(&mut self, id: BlockTypeId, side: BlockSide) -> Option<UvRect> {
        let catalog = self.catalog;
        let atlas = self.atlas;
        let faces = self.resolved.entry(id).or_insert_with(|| match catalog.by_id(id) {
            Some(block_type) => {
                Some(BlockSide::all().map(|face| atlas.uv(block_type.texture(face))))
            }
            None => {
                warn!("Skipping unregistered block type {} while meshing", id);
                None
            }
        });
        (*faces).map(|faces| faces[side as usize])
    }
}

/// Converts integer corners to vertex positions.
#[inline]
pub(crate) fn corners_to_f32(corners: &[[i32; 3]; 4]) -> [[f32; 3]; 4] {
    corners.map(|[x, y, z]| [x as f32, y as f32, z as f32])
}
