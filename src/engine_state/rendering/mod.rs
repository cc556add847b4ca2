//! Rendering side of the voxel engine.
//!
//! Everything between a chunk's block grid and a draw call lives here: the meshers,
//! the vertex layout the GPU consumes, the texture atlas the UVs point into, and the
//! [`meshing::ChunkRenderer`] seam a backend implements.

pub mod meshing;
pub mod texture;
mod vertex;

// Re-export commonly used types
pub use texture::{TextureAtlas, UvRect};
pub use vertex::Vertex;
