//! Mesh generation and hand-off to the renderer.
//!
//! This module turns voxel data into GPU-friendly geometry and defines the boundary
//! between the chunk manager and whatever backend draws it.
//!
//! # Architecture
//! - `mesh/`: the meshers and the `MeshData` buffers they produce
//! - [`ChunkRenderer`]: upload, draw and release of per block type meshes
//! - [`InstanceArena`]: fixed table of per-chunk placement transforms
//!
//! # Performance Considerations
//! - Greedy meshing minimizes vertex count
//! - Meshes are grouped by block type, so each chunk costs one draw per material
//! - The transform table is preallocated and recycled, never reallocated per frame

mod instance_arena;

/// Core mesh generation algorithms and data structures.
///
/// This module contains the greedy and naive meshers and the buffers they fill.
mod mesh;
mod renderer;

pub use instance_arena::InstanceArena;
pub use mesh::*;
pub use renderer::*;
