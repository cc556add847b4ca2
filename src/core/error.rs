//! # Engine Error Types
//!
//! All errors that can surface from configuration, asset loading, block registration
//! and mesh validation.
//!
//! Note that several "soft" failure modes are intentionally absent here: out-of-range
//! voxel access reads as air, unregistered block ids are skipped while meshing, and
//! missing atlas textures fall back to a default tile. Those are logged, not returned.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or running the renderer core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A mesher was constructed against an atlas that holds no textures.
    #[error("texture atlas contains no textures")]
    EmptyAtlas,

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document (config or atlas metadata) failed to parse.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    /// A block type with this name was already registered.
    #[error("block type already registered: {0}")]
    DuplicateBlockType(String),

    /// No more block ids are available.
    #[error("block type catalog is full")]
    CatalogFull,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A mesh index points past the end of its vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A mesh index buffer does not describe whole triangles.
    #[error("index buffer length {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Wraps an IO error together with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
