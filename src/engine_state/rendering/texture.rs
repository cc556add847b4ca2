//! Texture atlas lookup for the meshers.
//!
//! The atlas image itself is a GPU concern; the meshers only need to know where each
//! named texture sits inside it. That mapping is loaded from the metadata JSON written
//! alongside the atlas image:
//!
//! ```json
//! {
//!     "texture_size": 16,
//!     "atlas_size": 256,
//!     "textures_per_row": 16,
//!     "textures": {
//!         "stone": { "index": 3, "uv": { "min": [0.1875, 0.0], "max": [0.25, 0.0625] } }
//!     }
//! }
//! ```

use std::{collections::BTreeMap, path::Path};

use log::{info, warn};
use serde::Deserialize;

use crate::core::{EngineError, EngineResult};

/// A texture's rectangle in normalized atlas coordinates.
///
/// Coordinates use a bottom-left origin (OpenGL convention): `v` grows upward, and
/// meshers map `min.v` to the lower world-Y edge of wall faces. A backend sampling
/// with a top-left origin must flip `v`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct UvRect {
    /// Bottom-left corner `(u, v)`.
    pub min: [f32; 2],
    /// Top-right corner `(u, v)`.
    pub max: [f32; 2],
}

impl UvRect {
    /// The whole atlas.
    pub const FULL: UvRect = UvRect {
        min: [0.0, 0.0],
        max: [1.0, 1.0],
    };

    /// Width and height of the rectangle.
    #[inline]
    pub fn span(&self) -> [f32; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Shrinks the rectangle by `epsilon` on every edge.
    #[inline]
    pub fn inset(&self, epsilon: f32) -> UvRect {
        UvRect {
            min: [self.min[0] + epsilon, self.min[1] + epsilon],
            max: [self.max[0] - epsilon, self.max[1] - epsilon],
        }
    }

    /// The rectangle packed as `(min_u, min_v, max_u, max_v)`.
    #[inline]
    pub fn as_bounds(&self) -> [f32; 4] {
        [self.min[0], self.min[1], self.max[0], self.max[1]]
    }
}

#[derive(Deserialize)]
struct AtlasEntry {
    #[allow(dead_code)]
    index: u32,
    uv: UvRect,
}

#[derive(Deserialize)]
struct AtlasMetadata {
    texture_size: u32,
    atlas_size: u32,
    textures_per_row: u32,
    textures: BTreeMap<String, AtlasEntry>,
}

/// Name to UV rectangle mapping for a packed texture atlas.
#[derive(Clone, Debug, Default)]
pub struct TextureAtlas {
    /// Kept ordered so the fallback texture is stable between runs.
    textures: BTreeMap<String, UvRect>,
    texture_size: u32,
    atlas_size: u32,
}

impl TextureAtlas {
    /// Creates an atlas with no textures.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses atlas metadata JSON.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let metadata: AtlasMetadata = serde_json::from_str(json)?;
        info!(
            "Loaded atlas metadata: {} textures, {}px tiles, {}px atlas, {} per row",
            metadata.textures.len(),
            metadata.texture_size,
            metadata.atlas_size,
            metadata.textures_per_row
        );

        Ok(Self {
            textures: metadata
                .textures
                .into_iter()
                .map(|(name, entry)| (name, entry.uv))
                .collect(),
            texture_size: metadata.texture_size,
            atlas_size: metadata.atlas_size,
        })
    }

    /// Reads and parses an atlas metadata file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Lays the given texture names out on a square grid, row-major in the given order.
    ///
    /// # Arguments
    /// * `names` - Texture names, one tile each
    /// * `textures_per_row` - Number of tiles per atlas row (clamped to at least 1)
    /// * `texture_size` - Tile edge length in pixels
    pub fn grid<S: AsRef<str>>(names: &[S], textures_per_row: u32, texture_size: u32) -> Self {
        let per_row = textures_per_row.max(1);
        let tile = 1.0 / per_row as f32;

        let textures = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let column = (index as u32 % per_row) as f32;
                let row = (index as u32 / per_row) as f32;
                let rect = UvRect {
                    min: [column * tile, row * tile],
                    max: [(column + 1.0) * tile, (row + 1.0) * tile],
                };
                (name.as_ref().to_owned(), rect)
            })
            .collect();

        Self {
            textures,
            texture_size,
            atlas_size: texture_size * per_row,
        }
    }

    /// Adds or replaces a single texture rectangle.
    pub fn insert(&mut self, name: &str, rect: UvRect) {
        self.textures.insert(name.to_owned(), rect);
    }

    /// Looks up a texture's rectangle.
    ///
    /// Unknown names log a warning and fall back to the first texture by name, or to
    /// the whole atlas if it holds no textures at all.
    pub fn uv(&self, name: &str) -> UvRect {
        if let Some(rect) = self.textures.get(name) {
            return *rect;
        }

        match self.textures.iter().next() {
            Some((fallback, rect)) => {
                warn!("Texture '{}' not found in atlas, using '{}'", name, fallback);
                *rect
            }
            None => {
                warn!("Texture '{}' requested from an empty atlas", name);
                UvRect::FULL
            }
        }
    }

    /// Whether the atlas knows this texture.
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Number of textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the atlas holds no textures.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Tile edge length in pixels.
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Atlas edge length in pixels.
    pub fn atlas_size(&self) -> u32 {
        self.atlas_size
    }
}
