//! Per-voxel meshing.
//!
//! Emits one unit quad for every exposed face of every block. The output is several
//! times larger than the greedy mesher's, but trivially correct, which makes it the
//! baseline for comparisons and the oracle for surface-equivalence tests.

use std::sync::Arc;

use crate::core::{EngineError, EngineResult};
use crate::engine_state::{
    rendering::texture::TextureAtlas,
    voxels::{
        block::{block_side::corners_min, BlockSide, BlockTypeCatalog},
        chunk::VoxelGrid,
    },
};

use super::{corners_to_f32, ChunkMesher, ChunkMeshes, FaceTextures};

/// Builds one quad per exposed voxel face.
pub struct NaiveMesher {
    catalog: Arc<BlockTypeCatalog>,
    atlas: Arc<TextureAtlas>,
}

impl NaiveMesher {
    /// Creates a mesher over a shared catalog and atlas.
    ///
    /// # Returns
    /// `EngineError::EmptyAtlas` if the atlas holds no textures.
    pub fn new(catalog: Arc<BlockTypeCatalog>, atlas: Arc<TextureAtlas>) -> EngineResult<Self> {
        if atlas.is_empty() {
            return Err(EngineError::EmptyAtlas);
        }
        Ok(Self { catalog, atlas })
    }

    /// Generates the meshes for every visible face in `grid`.
    pub fn generate_mesh(&self, grid: &VoxelGrid) -> ChunkMeshes {
        let mut meshes = ChunkMeshes::new();
        let mut textures = FaceTextures::new(&self.catalog, &self.atlas);

        for (cell, id) in grid.iter_non_air() {
            for side in BlockSide::all() {
                if !grid.should_render_face(cell[0], cell[1], cell[2], side, &self.catalog) {
                    continue;
                }
                let Some(tile) = textures.get(id, side) else {
                    continue;
                };

                let corners = side.quad_corners(cell, 1, 1);
                let origin = corners_min(&corners);
                let span = tile.span();
                let tex_coords = corners.map(|corner| {
                    let (s, t) = side.texture_offset(origin, corner);
                    [tile.min[0] + span[0] * s, tile.min[1] + span[1] * t]
                });

                meshes.entry(id).or_default().push_quad(
                    corners_to_f32(&corners),
                    side.normal_f32(),
                    tex_coords,
                    tile.as_bounds(),
                );
            }
        }

        meshes
    }
}

impl ChunkMesher for NaiveMesher {
    fn generate_mesh(&self, grid: &VoxelGrid) -> ChunkMeshes {
        NaiveMesher::generate_mesh(self, grid)
    }

    fn name(&self) -> &'static str {
        "naive"
    }
}
