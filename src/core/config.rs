//! # Engine Configuration
//!
//! Runtime settings for chunk sizing, streaming radius, mesher selection and terrain
//! generation. Every field has a default, so an empty JSON object (or no file at all)
//! yields a working configuration.
//!
//! ```json
//! {
//!     "render_distance": 4,
//!     "mesher": "greedy",
//!     "terrain": { "kind": "noise", "seed": 7 }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::error::{EngineError, EngineResult};

/// Which mesher the chunk manager uses when rebuilding dirty chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MesherKind {
    /// Merges coplanar faces into maximal rectangles.
    #[default]
    Greedy,
    /// One quad per exposed voxel face.
    Naive,
}

/// Which terrain generator new chunks are filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Fractal noise height field with biome layering.
    #[default]
    Noise,
    /// A uniform stone slab of `flat_height` blocks.
    Flat,
}

/// Terrain generator parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Generator selection.
    pub kind: TerrainKind,
    /// Noise seed.
    pub seed: u32,
    /// Horizontal noise frequency.
    pub scale: f64,
    /// Number of fractal octaves.
    pub octaves: usize,
    /// Amplitude falloff per octave.
    pub persistence: f64,
    /// Surface height where the noise is zero.
    pub base_height: i32,
    /// Maximum surface deviation from `base_height`.
    pub max_height: i32,
    /// Columns whose surface is below this level are flooded with water.
    pub water_level: i32,
    /// Slab height for the flat generator.
    pub flat_height: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            kind: TerrainKind::Noise,
            seed: 12345,
            scale: 0.05,
            octaves: 4,
            persistence: 0.5,
            base_height: 32,
            max_height: 32,
            water_level: 28,
            flat_height: 5,
        }
    }
}

/// Top level configuration for the renderer core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunk extents in blocks, `[x, y, z]`.
    pub chunk_size: [usize; 3],
    /// Generation radius in chunks.
    pub render_distance: i32,
    /// Extra chunks of slack beyond `render_distance` before a chunk is evicted.
    pub eviction_margin: i32,
    /// Hard cap on loaded chunks. Derived from the radius when unset.
    pub max_loaded_chunks: Option<usize>,
    /// Mesher used for dirty chunks.
    pub mesher: MesherKind,
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
    /// Optional atlas metadata file. An in-memory grid atlas is used when absent.
    pub atlas_path: Option<String>,
    /// Number of frames the headless demo simulates.
    pub frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: [16, 256, 16],
            render_distance: 8,
            eviction_margin: 1,
            max_loaded_chunks: None,
            mesher: MesherKind::Greedy,
            terrain: TerrainConfig::default(),
            atlas_path: None,
            frames: 120,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    ///
    /// # Returns
    /// `EngineError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.chunk_size.iter().any(|&d| d == 0) {
            return Err(EngineError::InvalidConfig(format!(
                "chunk_size must be non-zero in every dimension, got {:?}",
                self.chunk_size
            )));
        }
        if self.chunk_size[0] != self.chunk_size[2] {
            return Err(EngineError::InvalidConfig(format!(
                "chunk footprint must be square, got {}x{}",
                self.chunk_size[0], self.chunk_size[2]
            )));
        }
        if self.render_distance < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "render_distance must be >= 0, got {}",
                self.render_distance
            )));
        }
        if self.eviction_margin < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "eviction_margin must be >= 0, got {}",
                self.eviction_margin
            )));
        }
        if let Some(max) = self.max_loaded_chunks {
            let needed = chunks_within_radius(self.render_distance);
            if max < needed {
                return Err(EngineError::InvalidConfig(format!(
                    "max_loaded_chunks ({max}) is smaller than the {needed} chunks \
                     inside render_distance"
                )));
            }
        }
        if self.terrain.octaves == 0 {
            return Err(EngineError::InvalidConfig("terrain.octaves must be >= 1".into()));
        }
        if self.terrain.scale <= 0.0 {
            return Err(EngineError::InvalidConfig("terrain.scale must be positive".into()));
        }
        Ok(())
    }

    /// The effective loaded chunk cap.
    ///
    /// When unset, this is the number of chunks within `render_distance + eviction_margin`,
    /// which is the most that can ever be resident under eager eviction.
    pub fn chunk_capacity(&self) -> usize {
        self.max_loaded_chunks
            .unwrap_or_else(|| chunks_within_radius(self.render_distance + self.eviction_margin))
    }
}

/// Number of chunk coordinates `(x, z)` with `x*x + z*z <= radius*radius`.
pub fn chunks_within_radius(radius: i32) -> usize {
    let r2 = radius * radius;
    let mut count = 0;
    for x in -radius..=radius {
        for z in -radius..=radius {
            if x * x + z * z <= r2 {
                count += 1;
            }
        }
    }
    count
}
