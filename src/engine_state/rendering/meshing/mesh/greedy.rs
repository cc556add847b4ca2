//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same block type into larger quads, significantly reducing the number
//! of vertices and draw calls needed to render a voxel world.
//!
//! For each of the six face directions the grid is swept one slice at a time along the
//! face's axis. Each slice produces a 2D mask of visible faces, and the mask is carved
//! into maximal rectangles: widest run first, then as many rows as share that run.

use std::sync::Arc;

use crate::core::{EngineError, EngineResult};
use crate::engine_state::{
    rendering::texture::TextureAtlas,
    voxels::{
        block::{block_side::corners_min, BlockSide, BlockTypeCatalog, BlockTypeId, AIR},
        chunk::VoxelGrid,
    },
};

use super::{corners_to_f32, ChunkMesher, ChunkMeshes, FaceTextures};

/// Amount the UV rectangle is shrunk on every edge to keep samples off neighbouring
/// atlas tiles. Must stay well under one texel.
pub const INSET_EPSILON: f32 = 0.0005;

/// One cell of a slice mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MaskEntry {
    block_type: BlockTypeId,
    visible: bool,
}

impl MaskEntry {
    const EMPTY: MaskEntry = MaskEntry {
        block_type: AIR,
        visible: false,
    };

    #[inline]
    fn is_empty(&self) -> bool {
        !self.visible || self.block_type == AIR
    }
}

/// A rectangle carved out of a slice mask, in mask cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MaskRect {
    w: usize,
    h: usize,
    width: usize,
    height: usize,
    block_type: BlockTypeId,
}

/// Builds merged-quad meshes from voxel grids.
pub struct GreedyMesher {
    catalog: Arc<BlockTypeCatalog>,
    atlas: Arc<TextureAtlas>,
}

impl GreedyMesher {
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
    ///
    /// # Returns
    /// One `MeshData` per block type that has at least one visible face. An all-air
    /// grid yields an empty map.
    pub fn generate_mesh(&self, grid: &VoxelGrid) -> ChunkMeshes {
        let mut meshes = ChunkMeshes::new();
        let mut textures = FaceTextures::new(&self.catalog, &self.atlas);
        let mut mask = Vec::new();
        let mut rects = Vec::new();

        for side in BlockSide::all() {
            let geometry = side.geometry();
            let axis = geometry.axis.index();
            let (u_axis, v_axis) = (geometry.tangents.0.index(), geometry.tangents.1.index());
            let step = if geometry.positive { 1 } else { -1 };

            let dimensions = grid.dimensions();
            let depth = dimensions[axis];
            let width = dimensions[u_axis];
            let height = dimensions[v_axis];

            mask.clear();
            mask.resize(width * height, MaskEntry::EMPTY);

            for d in 0..depth {
                self.build_mask(grid, &mut mask, side, d, width, height, step);

                rects.clear();
                extract_rectangles(&mut mask, width, height, &mut rects);

                for rect in &rects {
                    let mut cell = [0i32; 3];
                    cell[axis] = d as i32;
                    cell[u_axis] = rect.w as i32;
                    cell[v_axis] = rect.h as i32;
                    emit_quad(
                        &mut meshes,
                        &mut textures,
                        side,
                        cell,
                        rect.width as i32,
                        rect.height as i32,
                        rect.block_type,
                    );
                }
            }
        }

        meshes
    }

    /// Fills `mask` for depth slice `d` of `side`.
    ///
    /// A cell is visible when it is not air and its outward neighbour is not solid.
    #[allow(clippy::too_many_arguments)]
    fn build_mask(
        &self,
        grid: &VoxelGrid,
        mask: &mut [MaskEntry],
        side: BlockSide,
        d: usize,
        width: usize,
        height: usize,
        step: i32,
    ) {
        let geometry = side.geometry();
        let axis = geometry.axis.index();
        let (u_axis, v_axis) = (geometry.tangents.0.index(), geometry.tangents.1.index());

        for h in 0..height {
            for w in 0..width {
                let mut position = [0i32; 3];
                position[axis] = d as i32;
                position[u_axis] = w as i32;
                position[v_axis] = h as i32;

                let id = grid.get(position[0], position[1], position[2]);

                let mut neighbour = position;
                neighbour[axis] += step;

                mask[w + h * width] = if id != AIR
                    && !grid.is_solid(neighbour[0], neighbour[1], neighbour[2], &self.catalog)
                {
                    MaskEntry {
                        block_type: id,
                        visible: true,
                    }
                } else {
                    MaskEntry::EMPTY
                };
            }
        }
    }
}

impl ChunkMesher for GreedyMesher {
    fn generate_mesh(&self, grid: &VoxelGrid) -> ChunkMeshes {
        GreedyMesher::generate_mesh(self, grid)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Carves `mask` into maximal same-type rectangles, clearing every covered cell.
///
/// Cells are scanned row by row. At each non-empty cell the run of equal entries to
/// the right fixes the rectangle's width; it then grows downward while every cell of
/// the next row under that run is equal too.
fn extract_rectangles(
    mask: &mut [MaskEntry],
    width: usize,
    height: usize,
    rects: &mut Vec<MaskRect>,
) {
    for h in 0..height {
        let mut w = 0;
        while w < width {
            let entry = mask[w + h * width];
            if entry.is_empty() {
                w += 1;
                continue;
            }

            let mut rect_width = 1;
            while w + rect_width < width && mask[w + rect_width + h * width] == entry {
                rect_width += 1;
            }

            let mut rect_height = 1;
            'grow: while h + rect_height < height {
                let row = (h + rect_height) * width;
                for k in 0..rect_width {
                    if mask[w + k + row] != entry {
                        break 'grow;
                    }
                }
                rect_height += 1;
            }

            for dh in 0..rect_height {
                let row = (h + dh) * width;
                mask[row + w..row + w + rect_width].fill(MaskEntry::EMPTY);
            }

            rects.push(MaskRect {
                w,
                h,
                width: rect_width,
                height: rect_height,
                block_type: entry.block_type,
            });

            w += rect_width;
        }
    }
}

/// Appends one merged quad to its block type's mesh.
///
/// The atlas tile is inset by `INSET_EPSILON` and repeated once per block along each
/// texture axis, so a 4x2 quad samples four tile widths across and two up.
fn emit_quad(
    meshes: &mut ChunkMeshes,
    textures: &mut FaceTextures<'_>,
    side: BlockSide,
    cell: [i32; 3],
    u_len: i32,
    v_len: i32,
    block_type: BlockTypeId,
) {
    let Some(tile) = textures.get(block_type, side) else {
        return;
    };

    let corners = side.quad_corners(cell, u_len, v_len);
    let origin = corners_min(&corners);
    let inset = tile.inset(INSET_EPSILON);
    let span = inset.span();

    let tex_coords = corners.map(|corner| {
        let (s, t) = side.texture_offset(origin, corner);
        [inset.min[0] + span[0] * s, inset.min[1] + span[1] * t]
    });

    meshes.entry(block_type).or_default().push_quad(
        corners_to_f32(&corners),
        side.normal_f32(),
        tex_coords,
        tile.as_bounds(),
    );
}
