//! # Chunk Module
//!
//! A chunk is a fixed-size column of the world (16x256x16 blocks by default) that is
//! generated, meshed and culled as a unit.
//!
//! ## Lifecycle
//!
//! ```text
//! Generating -> Dirty -> Meshed -> (edit) Dirty -> ... -> Evicted
//! ```
//!
//! - `Generating`: the grid exists but terrain has not been written yet
//! - `Dirty`: block data changed since the last mesh build
//! - `Meshed`: `meshes` and `handles` reflect the current grid
//! - `Evicted`: dropped from the world, waiting for its GPU handles to be released
//!
//! ## Memory Layout
//!
//! Blocks live in a dense `VoxelGrid` (one `u16` per cell). Meshes are kept per block
//! type so the renderer can batch by material.

use cgmath::{Point2, Point3, Vector3};
use log::trace;

use super::{block::BlockTypeId, terrain::TerrainBlock};
use crate::engine_state::{
    camera_state::frustum::Aabb,
    rendering::meshing::{ChunkMeshes, MeshHandle},
};

pub mod voxel_grid;

pub use voxel_grid::VoxelGrid;

/// Position of a chunk in chunk units on the XZ plane.
pub type ChunkCoord = Point2<i32>;

/// Where a chunk is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Allocated, terrain not yet written.
    Generating,
    /// Block data is newer than the mesh.
    Dirty,
    /// Mesh matches block data.
    Meshed,
    /// Removed from the world. Its handles are queued for release and the chunk dropped.
    Evicted,
}

/// Counts produced when terrain blocks are written into a chunk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulateStats {
    /// Blocks that landed inside the grid.
    pub written: usize,
    /// Blocks that fell outside the chunk and were dropped.
    pub discarded: usize,
}

/// One loaded column of the world.
pub struct Chunk {
    coord: ChunkCoord,
    grid: VoxelGrid,
    bounds: Aabb,
    state: ChunkState,
    meshes: ChunkMeshes,
    handles: Vec<MeshHandle>,
    instance_slot: Option<u32>,
}

impl Chunk {
    /// Creates an empty chunk at `coord` in the `Generating` state.
    ///
    /// # Arguments
    /// * `coord` - Chunk coordinates on the XZ plane
    /// * `dimensions` - Grid extents `[x, y, z]` in blocks
    pub fn new(coord: ChunkCoord, dimensions: [usize; 3]) -> Self {
        let origin = Self::origin_for(coord, dimensions);
        let max = Point3::new(
            origin.x + dimensions[0] as f32,
            origin.y + dimensions[1] as f32,
            origin.z + dimensions[2] as f32,
        );

        Self {
            coord,
            grid: VoxelGrid::with_dimensions(dimensions),
            bounds: Aabb::new(origin, max),
            state: ChunkState::Generating,
            meshes: ChunkMeshes::new(),
            handles: Vec::new(),
            instance_slot: None,
        }
    }

    /// World-space position of block `(0, 0, 0)` of the chunk at `coord`.
    pub fn origin_for(coord: ChunkCoord, dimensions: [usize; 3]) -> Point3<f32> {
        Point3::new(
            (i64::from(coord.x) * dimensions[0] as i64) as f32,
            0.0,
            (i64::from(coord.y) * dimensions[2] as i64) as f32,
        )
    }

    /// Writes world-space terrain blocks into the grid and marks the chunk dirty.
    ///
    /// Blocks outside this chunk's footprint or height are discarded without error.
    ///
    /// # Returns
    /// How many blocks were written and how many were dropped.
    pub fn populate(&mut self, blocks: &[TerrainBlock]) -> PopulateStats {
        let [sx, _, sz] = self.grid.dimensions();
        let base_x = i64::from(self.coord.x) * sx as i64;
        let base_z = i64::from(self.coord.y) * sz as i64;
        let local = |world: i32, base: i64| i32::try_from(i64::from(world) - base).ok();

        let mut stats = PopulateStats::default();
        for block in blocks {
            let y = block.position.y;
            match (local(block.position.x, base_x), local(block.position.z, base_z)) {
                (Some(x), Some(z)) if self.grid.in_bounds(x, y, z) => {
                    self.grid.set(x, y, z, block.block_type);
                    stats.written += 1;
                }
                _ => stats.discarded += 1,
            }
        }

        if stats.discarded > 0 {
            trace!(
                "Chunk {:?}: dropped {} out-of-bounds terrain blocks",
                self.coord,
                stats.discarded
            );
        }

        self.state = ChunkState::Dirty;
        stats
    }

    /// Applies an edit to the grid and marks the chunk dirty.
    pub fn edit_grid<R>(&mut self, edit: impl FnOnce(&mut VoxelGrid) -> R) -> R {
        let result = edit(&mut self.grid);
        self.mark_dirty();
        result
    }

    /// Convenience for a single-block edit.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockTypeId) {
        self.edit_grid(|grid| grid.set(x, y, z, id));
    }

    /// Forces a mesh rebuild on the next visible render.
    pub fn mark_dirty(&mut self) {
        if self.state != ChunkState::Evicted {
            self.state = ChunkState::Dirty;
        }
    }

    /// Whether the mesh is out of date.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        matches!(self.state, ChunkState::Dirty | ChunkState::Generating)
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Chunk coordinates.
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The chunk's block data.
    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// World-space bounding box.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// World-space offset of the chunk's local origin.
    pub fn origin(&self) -> Vector3<f32> {
        Vector3::new(self.bounds.min.x, self.bounds.min.y, self.bounds.min.z)
    }

    /// Per block type meshes from the last build.
    #[inline]
    pub fn meshes(&self) -> &ChunkMeshes {
        &self.meshes
    }

    /// Renderer handles for the uploaded meshes, one per block type.
    #[inline]
    pub fn handles(&self) -> &[MeshHandle] {
        &self.handles
    }

    /// Slot of this chunk's transform in the instance arena.
    #[inline]
    pub fn instance_slot(&self) -> Option<u32> {
        self.instance_slot
    }

    pub(crate) fn set_instance_slot(&mut self, slot: Option<u32>) {
        self.instance_slot = slot;
    }

    /// Stores a fresh mesh build and the handles it was uploaded under.
    ///
    /// # Returns
    /// The handles of the previous build, which the caller must release.
    pub(crate) fn finish_mesh(
        &mut self,
        meshes: ChunkMeshes,
        handles: Vec<MeshHandle>,
    ) -> Vec<MeshHandle> {
        self.meshes = meshes;
        self.state = ChunkState::Meshed;
        std::mem::replace(&mut self.handles, handles)
    }

    /// Moves the chunk into `Evicted`. Its handles stay attached until released.
    pub(crate) fn evict(&mut self) {
        self.state = ChunkState::Evicted;
        self.meshes.clear();
        self.instance_slot = None;
    }

    /// Hands the renderer handles over for release.
    pub(crate) fn take_handles(&mut self) -> Vec<MeshHandle> {
        std::mem::take(&mut self.handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_ids::STONE;

    fn block(x: i32, y: i32, z: i32) -> TerrainBlock {
        TerrainBlock {
            position: Point3::new(x, y, z),
            block_type: STONE,
        }
    }

    #[test]
    fn bounds_follow_coordinate() {
        let chunk = Chunk::new(ChunkCoord::new(-1, 2), [16, 256, 16]);
        assert_eq!(chunk.bounds().min, Point3::new(-16.0, 0.0, 32.0));
        assert_eq!(chunk.bounds().max, Point3::new(0.0, 256.0, 48.0));
        assert_eq!(chunk.state(), ChunkState::Generating);
        assert!(chunk.is_dirty());
    }

    #[test]
    fn populate_clips_foreign_blocks() {
        let mut chunk = Chunk::new(ChunkCoord::new(1, 0), [4, 4, 4]);
        let stats = chunk.populate(&[
            block(4, 0, 0),
            block(7, 3, 3),
            block(3, 0, 0),
            block(8, 0, 0),
            block(5, -1, 0),
            block(5, 4, 0),
            block(5, 0, 4),
        ]);
        assert_eq!(stats, PopulateStats { written: 2, discarded: 5 });
        assert_eq!(chunk.grid().get(0, 0, 0), STONE);
        assert_eq!(chunk.grid().get(3, 3, 3), STONE);
        assert_eq!(chunk.grid().count_non_air(), 2);
        assert_eq!(chunk.state(), ChunkState::Dirty);
    }

    #[test]
    fn extreme_coordinates_keep_a_finite_origin() {
        let mut chunk = Chunk::new(ChunkCoord::new(i32::MAX, i32::MIN), [16, 256, 16]);
        assert!(chunk.bounds().min.x > 3.0e10);
        assert!(chunk.bounds().min.z < -3.0e10);
        assert!(chunk.origin().x.is_finite());

        let stats = chunk.populate(&[block(0, 0, 0), block(i32::MAX, 0, i32::MIN)]);
        assert_eq!(stats, PopulateStats { written: 0, discarded: 2 });
    }

    #[test]
    fn edits_redirty_a_meshed_chunk() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), [2, 2, 2]);
        chunk.populate(&[]);
        let previous = chunk.finish_mesh(ChunkMeshes::new(), Vec::new());
        assert!(previous.is_empty());
        assert!(!chunk.is_dirty());

        chunk.set_block(0, 0, 0, STONE);
        assert_eq!(chunk.state(), ChunkState::Dirty);
    }

    #[test]
    fn evicted_chunks_stay_evicted() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), [2, 2, 2]);
        chunk.finish_mesh(ChunkMeshes::new(), vec![MeshHandle(4)]);
        chunk.evict();
        chunk.mark_dirty();
        assert_eq!(chunk.state(), ChunkState::Evicted);
        assert_eq!(chunk.take_handles(), vec![MeshHandle(4)]);
        assert!(chunk.handles().is_empty());
    }
}
