//! # Core Module
//!
//! Ambient building blocks shared by every subsystem of the renderer core.
//!
//! ## Key Components
//! - `EngineError`: The crate-wide error enum, returned through `EngineResult`
//! - `EngineConfig`: Serde-backed runtime configuration with validated defaults
//!
//! ## Usage
//! ```rust
//! use voxel_renderer::core::{EngineConfig, MesherKind};
//!
//! let config = EngineConfig::from_json_str(r#"{ "render_distance": 3 }"#).unwrap();
//! assert_eq!(config.render_distance, 3);
//! assert_eq!(config.mesher, MesherKind::Greedy);
//! ```

pub mod config;
pub mod error;

pub use config::{EngineConfig, MesherKind, TerrainConfig, TerrainKind};
pub use error::{EngineError, EngineResult};
