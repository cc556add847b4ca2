//! # Voxel Engine Core
//!
//! This module contains the voxel data side of the renderer: what blocks exist, how a
//! chunk stores them, where terrain comes from, and the manager that streams chunks
//! around the player.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block type records, the catalog that owns them, and face geometry
//! * **Chunk**: A dense `VoxelGrid` plus lifecycle state and per-type meshes
//! * **Terrain**: Generators that turn a chunk coordinate into world-space blocks
//! * **World**: The `ChunkManager`, which loads, evicts, remeshes and draws chunks
//!
//! ## Data Flow
//!
//! 1. `ChunkManager::update` loads every chunk inside the render radius from the
//!    terrain generator and evicts chunks that drifted out of it
//! 2. `ChunkManager::render` culls chunks against the view frustum
//! 3. Visible dirty chunks are meshed and uploaded; every visible chunk is drawn
//!
//! ## Thread Safety
//!
//! The block catalog is read-only after startup and shared through an `Arc`. Each
//! grid is exclusively owned by its chunk, and meshers only borrow it for one build.

pub mod block;
pub mod chunk;
pub mod terrain;
pub mod world;
