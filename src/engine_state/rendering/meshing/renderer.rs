//! Renderer seam for chunk meshes.
//!
//! The chunk manager never talks to the GPU directly. It hands each per block type
//! `MeshData` to a [`ChunkRenderer`], keeps the returned [`MeshHandle`], and later asks
//! the renderer to draw or release it.
//!
//! # Architecture
//!
//! - `upload` is called once per non-empty block type each time a chunk is re-meshed
//! - `draw` is called every frame for every handle of a chunk that passed culling
//! - `release` is called before a chunk's handles are replaced or the chunk is dropped
//!
//! [`HeadlessRenderer`] implements the trait without a device and records what it was
//! asked to do, which is what the demo binary and the tests use.

use std::collections::HashMap;

use cgmath::Vector3;
use log::warn;

use super::mesh::MeshData;
use crate::engine_state::voxels::{block::BlockTypeId, chunk::ChunkCoord};

/// Opaque reference to geometry owned by a renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// One block type's geometry for one chunk, ready for upload.
#[derive(Copy, Clone, Debug)]
pub struct DrawBatch<'a> {
    /// Chunk the geometry belongs to.
    pub coord: ChunkCoord,
    /// Block type shared by every quad in `mesh`.
    pub block_type: BlockTypeId,
    /// Chunk-local vertex and index data.
    pub mesh: &'a MeshData,
}

/// Where to draw an uploaded mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawPlacement {
    /// World-space offset of the chunk's block `(0, 0, 0)`.
    pub origin: Vector3<f32>,
    /// Slot of the chunk's transform in the instance arena, if it has one.
    pub instance_slot: Option<u32>,
}

/// Backend that owns uploaded chunk geometry.
pub trait ChunkRenderer {
    /// Uploads one batch and returns a handle to it.
    fn upload(&mut self, batch: &DrawBatch) -> MeshHandle;

    /// Draws previously uploaded geometry at `placement`.
    fn draw(&mut self, handle: MeshHandle, placement: &DrawPlacement);

    /// Frees the geometry behind `handle`. The handle is invalid afterwards.
    fn release(&mut self, handle: MeshHandle);
}

/// Bookkeeping for one uploaded batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedMesh {
    /// Chunk the batch came from.
    pub coord: ChunkCoord,
    /// Block type of the batch.
    pub block_type: BlockTypeId,
    /// Vertices uploaded.
    pub vertex_count: usize,
    /// Indices uploaded.
    pub index_count: usize,
}

/// Totals a [`HeadlessRenderer`] has seen since creation or the last `reset_frame`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RendererCounters {
    /// Calls to `upload`.
    pub uploads: usize,
    /// Calls to `draw` with a live handle.
    pub draws: usize,
    /// Calls to `release` with a live handle.
    pub releases: usize,
    /// Vertices passed to `upload`.
    pub uploaded_vertices: usize,
    /// Indices passed to `upload`.
    pub uploaded_indices: usize,
    /// Indices submitted through `draw`.
    pub drawn_indices: usize,
}

/// A renderer without a GPU that keeps track of live meshes and call counts.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_handle: u64,
    live: HashMap<MeshHandle, UploadedMesh>,
    totals: RendererCounters,
    frame: RendererCounters,
}

impl HeadlessRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles uploaded and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Whether `handle` refers to uploaded, unreleased geometry.
    pub fn is_live(&self, handle: MeshHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Details of a live handle.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&UploadedMesh> {
        self.live.get(&handle)
    }

    /// Vertices currently resident across all live handles.
    pub fn resident_vertices(&self) -> usize {
        self.live.values().map(|mesh| mesh.vertex_count).sum()
    }

    /// Counters accumulated over the renderer's lifetime.
    pub fn totals(&self) -> RendererCounters {
        self.totals
    }

    /// Counters accumulated since the last call to `reset_frame`.
    pub fn frame(&self) -> RendererCounters {
        self.frame
    }

    /// Starts a new frame, returning the counters of the one that just ended.
    pub fn reset_frame(&mut self) -> RendererCounters {
        std::mem::take(&mut self.frame)
    }
}

impl ChunkRenderer for HeadlessRenderer {
    fn upload(&mut self, batch: &DrawBatch) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;

        let vertex_count = batch.mesh.vertices.len();
        let index_count = batch.mesh.indices.len();
        self.live.insert(
            handle,
            UploadedMesh {
                coord: batch.coord,
                block_type: batch.block_type,
                vertex_count,
                index_count,
            },
        );

        for counters in [&mut self.totals, &mut self.frame] {
            counters.uploads += 1;
            counters.uploaded_vertices += vertex_count;
            counters.uploaded_indices += index_count;
        }
        handle
    }

    fn draw(&mut self, handle: MeshHandle, _placement: &DrawPlacement) {
        let Some(mesh) = self.live.get(&handle) else {
            warn!("Draw requested for released mesh {:?}", handle);
            return;
        };
        let index_count = mesh.index_count;
        for counters in [&mut self.totals, &mut self.frame] {
            counters.draws += 1;
            counters.drawn_indices += index_count;
        }
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.live.remove(&handle).is_none() {
            warn!("Release requested for unknown mesh {:?}", handle);
            return;
        }
        self.totals.releases += 1;
        self.frame.releases += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point2;

    fn quad() -> MeshData {
        let mut mesh = MeshData::new();
        mesh.push_quad(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            [0.0, 0.0, 1.0],
            [[0.0; 2]; 4],
            [0.0, 0.0, 1.0, 1.0],
        );
        mesh
    }

    fn placement() -> DrawPlacement {
        DrawPlacement {
            origin: Vector3::new(0.0, 0.0, 0.0),
            instance_slot: None,
        }
    }

    #[test]
    fn upload_draw_release_cycle() {
        let mesh = quad();
        let mut renderer = HeadlessRenderer::new();
        let handle = renderer.upload(&DrawBatch {
            coord: Point2::new(1, 2),
            block_type: 3,
            mesh: &mesh,
        });

        assert!(renderer.is_live(handle));
        assert_eq!(renderer.mesh(handle).map(|m| m.vertex_count), Some(4));
        assert_eq!(renderer.resident_vertices(), 4);

        renderer.draw(handle, &placement());
        assert_eq!(renderer.frame().drawn_indices, 6);

        renderer.release(handle);
        assert!(!renderer.is_live(handle));
        assert_eq!(renderer.totals().releases, 1);
        assert_eq!(renderer.live_handles(), 0);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut renderer = HeadlessRenderer::new();
        renderer.draw(MeshHandle(7), &placement());
        renderer.release(MeshHandle(7));
        assert_eq!(renderer.totals(), RendererCounters::default());
    }

    #[test]
    fn handles_are_unique() {
        let mesh = quad();
        let mut renderer = HeadlessRenderer::new();
        let batch = DrawBatch {
            coord: Point2::new(0, 0),
            block_type: 1,
            mesh: &mesh,
        };
        let a = renderer.upload(&batch);
        renderer.release(a);
        let b = renderer.upload(&batch);
        assert_ne!(a, b);
    }

    #[test]
    fn reset_frame_keeps_totals() {
        let mesh = quad();
        let mut renderer = HeadlessRenderer::new();
        let handle = renderer.upload(&DrawBatch {
            coord: Point2::new(0, 0),
            block_type: 1,
            mesh: &mesh,
        });
        renderer.draw(handle, &placement());

        let ended = renderer.reset_frame();
        assert_eq!(ended.uploads, 1);
        assert_eq!(ended.draws, 1);
        assert_eq!(renderer.frame(), RendererCounters::default());
        assert_eq!(renderer.totals().draws, 1);
    }
}
