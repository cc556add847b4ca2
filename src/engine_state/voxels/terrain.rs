//! # Terrain Generation
//!
//! Produces the world-space blocks that fill newly loaded chunks.
//!
//! ## Generators
//!
//! - `NoiseTerrainGenerator`: a fractal Perlin height field with layered columns
//!   (bedrock, stone, a dirt or sand band, then grass, sand or bare stone at the
//!   surface) and water flooding every column below the water line
//! - `FlatTerrainGenerator`: a uniform slab, handy for tests and benchmarks
//!
//! Generators work purely in world coordinates and are free to return blocks outside
//! the requested chunk. The chunk manager clips what it receives.

use cgmath::Point3;
use log::debug;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::block::{block_ids, BlockTypeId, AIR};
use crate::core::{TerrainConfig, TerrainKind};

/// A single generated block in world coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TerrainBlock {
    /// World-space position.
    pub position: Point3<i32>,
    /// Block type to place.
    pub block_type: BlockTypeId,
}

impl TerrainBlock {
    /// Creates a block at `(x, y, z)`.
    pub fn new(x: i32, y: i32, z: i32, block_type: BlockTypeId) -> Self {
        Self {
            position: Point3::new(x, y, z),
            block_type,
        }
    }
}

/// Source of terrain for new chunks.
pub trait TerrainGenerator {
    /// Generates the blocks of the chunk column at `(chunk_x, chunk_z)`.
    ///
    /// # Arguments
    /// * `chunk_x` - Chunk X index (world X is `chunk_x * chunk_size_xz`)
    /// * `chunk_z` - Chunk Z index
    /// * `chunk_size_xz` - Chunk footprint edge length in blocks
    ///
    /// # Returns
    /// Non-air blocks in world coordinates.
    fn generate_chunk_blocks(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        chunk_size_xz: i32,
    ) -> Vec<TerrainBlock>;
}

/// Fractal noise height field with biome layering.
pub struct NoiseTerrainGenerator {
    noise: Fbm<Perlin>,
    scale: f64,
    base_height: i32,
    max_height: i32,
    water_level: i32,
}

impl NoiseTerrainGenerator {
    /// Creates a generator from terrain settings.
    pub fn new(config: &TerrainConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves)
            .set_persistence(config.persistence)
            .set_frequency(1.0);

        Self {
            noise,
            scale: config.scale,
            base_height: config.base_height,
            max_height: config.max_height,
            water_level: config.water_level,
        }
    }

    /// The y coordinate of the surface block of the column at `(x, z)`.
    ///
    /// Noise in `[-1, 1]` maps linearly onto `base_height +/- max_height`.
    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        let sample = self
            .noise
            .get([x as f64 * self.scale, z as f64 * self.scale])
            .clamp(-1.0, 1.0);
        self.base_height + (sample * self.max_height as f64) as i32
    }

    /// Picks the block for height `y` in a column whose surface is `surface`.
    pub fn block_at(&self, y: i32, surface: i32) -> BlockTypeId {
        let beach = surface <= self.water_level + 2;

        if y == 0 {
            block_ids::STONE
        } else if y == surface {
            if surface as f64 > self.base_height as f64 + self.max_height as f64 * 0.7 {
                block_ids::STONE
            } else if beach {
                block_ids::SAND
            } else {
                block_ids::GRASS
            }
        } else if y < surface && y >= surface - 3 {
            if beach {
                block_ids::SAND
            } else {
                block_ids::DIRT
            }
        } else if y < surface {
            block_ids::STONE
        } else {
            AIR
        }
    }

    fn push_column(&self, blocks: &mut Vec<TerrainBlock>, x: i32, z: i32, with_water: bool) {
        let height = self.terrain_height(x, z);

        for y in 0..=height {
            let block_type = self.block_at(y, height);
            if block_type != AIR {
                blocks.push(TerrainBlock::new(x, y, z, block_type));
            }
        }

        if with_water && height < self.water_level {
            for y in (height + 1)..=self.water_level {
                blocks.push(TerrainBlock::new(x, y, z, block_ids::WATER));
            }
        }
    }

    /// Generates a rectangular patch of land centred on `(center_x, center_z)`.
    ///
    /// Unlike chunk generation, no water is placed.
    pub fn generate_region(
        &self,
        size_x: i32,
        size_z: i32,
        center_x: i32,
        center_z: i32,
    ) -> Vec<TerrainBlock> {
        let start_x = center_x - size_x / 2;
        let start_z = center_z - size_z / 2;

        let mut blocks = Vec::new();
        for x in 0..size_x {
            for z in 0..size_z {
                self.push_column(&mut blocks, start_x + x, start_z + z, false);
            }
        }
        blocks
    }
}

impl TerrainGenerator for NoiseTerrainGenerator {
    fn generate_chunk_blocks(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        chunk_size_xz: i32,
    ) -> Vec<TerrainBlock> {
        let start_x = chunk_x * chunk_size_xz;
        let start_z = chunk_z * chunk_size_xz;

        let mut blocks = Vec::new();
        for x in 0..chunk_size_xz {
            for z in 0..chunk_size_xz {
                self.push_column(&mut blocks, start_x + x, start_z + z, true);
            }
        }

        debug!(
            "Chunk ({}, {}) generated {} blocks",
            chunk_x,
            chunk_z,
            blocks.len()
        );
        blocks
    }
}

/// Builds the generator selected by `config.kind`.
pub fn terrain_from_config(config: &TerrainConfig) -> Box<dyn TerrainGenerator> {
    match config.kind {
        TerrainKind::Noise => Box::new(NoiseTerrainGenerator::new(config)),
        TerrainKind::Flat => Box::new(FlatTerrainGenerator::new(
            config.flat_height,
            block_ids::STONE,
        )),
    }
}

/// A uniform slab `height` blocks tall starting at y = 0.
#[derive(Copy, Clone, Debug)]
pub struct FlatTerrainGenerator {
    /// Number of block layers.
    pub height: i32,
    /// Block type of every layer.
    pub block_type: BlockTypeId,
}

impl FlatTerrainGenerator {
    /// Creates a slab generator.
    pub fn new(height: i32, block_type: BlockTypeId) -> Self {
        Self { height, block_type }
    }
}

impl TerrainGenerator for FlatTerrainGenerator {
    fn generate_chunk_blocks(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        chunk_size_xz: i32,
    ) -> Vec<TerrainBlock> {
        let start_x = chunk_x * chunk_size_xz;
        let start_z = chunk_z * chunk_size_xz;

        let mut blocks =
            Vec::with_capacity((chunk_size_xz * chunk_size_xz * self.height.max(0)) as usize);
        for x in 0..chunk_size_xz {
            for z in 0..chunk_size_xz {
                for y in 0..self.height {
                    blocks.push(TerrainBlock::new(start_x + x, y, start_z + z, self.block_type));
                }
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> NoiseTerrainGenerator {
        NoiseTerrainGenerator::new(&TerrainConfig::default())
    }

    #[test]
    fn heights_stay_within_configured_range() {
        let generator = generator();
        for x in -40..40 {
            for z in -40..40 {
                let h = generator.terrain_height(x, z);
                assert!((0..=64).contains(&h), "height {h} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generator().generate_chunk_blocks(3, -2, 16);
        let b = generator().generate_chunk_blocks(3, -2, 16);
        assert_eq!(a, b);
    }

    #[test]
    fn chunk_blocks_stay_in_footprint() {
        let blocks = generator().generate_chunk_blocks(-1, 2, 16);
        assert!(!blocks.is_empty());
        for block in blocks {
            assert!((-16..0).contains(&block.position.x));
            assert!((32..48).contains(&block.position.z));
            assert!(block.position.y >= 0);
        }
    }

    #[test]
    fn column_layering() {
        let generator = generator();
        // Inland plain: surface 40 is well above the beach band and below the peaks.
        assert_eq!(generator.block_at(0, 40), block_ids::STONE);
        assert_eq!(generator.block_at(20, 40), block_ids::STONE);
        assert_eq!(generator.block_at(37, 40), block_ids::DIRT);
        assert_eq!(generator.block_at(39, 40), block_ids::DIRT);
        assert_eq!(generator.block_at(40, 40), block_ids::GRASS);
        assert_eq!(generator.block_at(41, 40), AIR);

        // Beach.
        assert_eq!(generator.block_at(30, 30), block_ids::SAND);
        assert_eq!(generator.block_at(28, 30), block_ids::SAND);

        // Peak above 32 + 0.7 * 32.
        assert_eq!(generator.block_at(60, 60), block_ids::STONE);
        assert_eq!(generator.block_at(58, 60), block_ids::DIRT);
    }

    #[test]
    fn low_columns_are_flooded() {
        let generator = NoiseTerrainGenerator::new(&TerrainConfig {
            base_height: 5,
            max_height: 1,
            water_level: 28,
            ..TerrainConfig::default()
        });
        let blocks = generator.generate_chunk_blocks(0, 0, 1);
        let surface = generator.terrain_height(0, 0);
        let water: Vec<_> = blocks
            .iter()
            .filter(|b| b.block_type == block_ids::WATER)
            .collect();
        assert_eq!(water.len() as i32, 28 - surface);
        assert!(water.iter().all(|b| b.position.y > surface && b.position.y <= 28));
    }

    #[test]
    fn region_has_no_water() {
        let generator = NoiseTerrainGenerator::new(&TerrainConfig {
            base_height: 5,
            max_height: 1,
            ..TerrainConfig::default()
        });
        let blocks = generator.generate_region(4, 6, 10, 10);
        assert!(blocks.iter().all(|b| b.block_type != block_ids::WATER));
        assert!(blocks
            .iter()
            .all(|b| (8..12).contains(&b.position.x) && (7..13).contains(&b.position.z)));
    }

    #[test]
    fn flat_generator_fills_slab() {
        let blocks = FlatTerrainGenerator::new(5, block_ids::STONE).generate_chunk_blocks(1, 0, 16);
        assert_eq!(blocks.len(), 16 * 16 * 5);
        assert!(blocks.iter().all(|b| (16..32).contains(&b.position.x)
            && (0..5).contains(&b.position.y)
            && (0..16).contains(&b.position.z)));
    }
}
