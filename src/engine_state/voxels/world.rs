//! # World Module
//!
//! The `ChunkManager` decides which chunks exist, when they are re-meshed, and which
//! of them reach the renderer.
//!
//! ## Lifecycle
//!
//! - `update` loads every chunk inside the render radius around the player (nearest
//!   first) and evicts chunks beyond the radius plus the eviction margin (farthest
//!   first)
//! - `render` releases the GPU handles of chunks evicted since the last frame, culls
//!   the rest against the view frustum, re-meshes visible dirty chunks and draws them
//!
//! Culled chunks are left untouched, even when dirty, so meshing cost follows what
//! the player can actually see.
//!
//! ## Capacity
//!
//! The number of loaded chunks is capped. When a new chunk would exceed the cap, the
//! chunk drawn least recently is evicted first, tracked with an LRU cache the same
//! way GPU buckets are recycled.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use cgmath::{Matrix4, Point3};
use log::{debug, info, trace};
use lru::LruCache;
use web_time::Instant;

use super::{
    chunk::{Chunk, ChunkCoord},
    terrain::TerrainGenerator,
};
use crate::core::{config::chunks_within_radius, EngineConfig, EngineResult};
use crate::engine_state::{
    camera_state::frustum::Frustum,
    rendering::meshing::{
        ChunkMesher, ChunkRenderer, DrawBatch, DrawPlacement, InstanceArena, MeshHandle,
    },
};

/// What an `update` call changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UpdateStats {
    /// Chunk the player is standing in.
    pub player_chunk: ChunkCoord,
    /// Chunks generated this call.
    pub generated: usize,
    /// Chunks evicted this call, by distance or by the capacity cap.
    pub evicted: usize,
    /// Terrain blocks that fell outside the chunk they were generated for.
    pub discarded_blocks: usize,
}

impl UpdateStats {
    fn new(player_chunk: ChunkCoord) -> Self {
        Self {
            player_chunk,
            generated: 0,
            evicted: 0,
            discarded_blocks: 0,
        }
    }
}

/// What a `render` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Loaded chunks that passed the frustum test.
    pub visible_chunks: usize,
    /// Loaded chunks rejected by the frustum test.
    pub culled_chunks: usize,
    /// Chunks re-meshed this frame.
    pub meshed_chunks: usize,
    /// Draw calls issued, one per block type per visible chunk.
    pub draw_calls: usize,
    /// Handles released, from re-meshing and from evictions.
    pub released_handles: usize,
    /// Vertices uploaded this frame.
    pub uploaded_vertices: usize,
}

/// Streams chunks around the player and feeds visible ones to a renderer.
pub struct ChunkManager {
    chunk_size: [usize; 3],
    render_distance: i32,
    eviction_margin: i32,
    capacity_override: Option<usize>,
    center: ChunkCoord,
    terrain: Box<dyn TerrainGenerator>,
    mesher: Box<dyn ChunkMesher>,
    chunks: HashMap<ChunkCoord, Chunk>,
    recently_drawn: LruCache<ChunkCoord, ()>,
    pending_release: Vec<MeshHandle>,
    instances: InstanceArena,
}

impl ChunkManager {
    /// Creates an empty manager.
    ///
    /// # Arguments
    /// * `config` - Chunk size, radius, margin and capacity; validated here
    /// * `terrain` - Source of blocks for new chunks
    /// * `mesher` - Mesher used for every chunk build
    pub fn new(
        config: &EngineConfig,
        terrain: Box<dyn TerrainGenerator>,
        mesher: Box<dyn ChunkMesher>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let capacity = config.chunk_capacity();

        info!(
            "Chunk manager: {:?} chunks, radius {}, margin {}, capacity {}, {} mesher",
            config.chunk_size,
            config.render_distance,
            config.eviction_margin,
            capacity,
            mesher.name()
        );

        Ok(Self {
            chunk_size: config.chunk_size,
            render_distance: config.render_distance,
            eviction_margin: config.eviction_margin,
            capacity_override: config.max_loaded_chunks,
            center: ChunkCoord::new(0, 0),
            terrain,
            mesher,
            chunks: HashMap::with_capacity(capacity),
            recently_drawn: LruCache::new(non_zero(capacity)),
            pending_release: Vec::new(),
            instances: InstanceArena::new(capacity),
        })
    }

    /// Chunk containing the world-space `position`.
    ///
    /// Positions too far out for the chunks around them to have an `i32` world origin
    /// are clamped to the outermost usable chunk. A NaN coordinate maps to chunk 0.
    pub fn player_chunk(&self, position: Point3<f32>) -> ChunkCoord {
        let limit = f64::from(
            (self.max_chunk_index() - self.render_distance - self.eviction_margin).max(0),
        );
        let to_chunk = |world: f32, size: usize| -> i32 {
            let chunk = (f64::from(world) / size as f64).floor();
            if chunk.is_nan() {
                0
            } else {
                chunk.clamp(-limit, limit) as i32
            }
        };
        ChunkCoord::new(
            to_chunk(position.x, self.chunk_size[0]),
            to_chunk(position.z, self.chunk_size[2]),
        )
    }

    /// Loads chunks around `player_position` and evicts those that drifted away.
    pub fn update(&mut self, player_position: Point3<f32>) -> UpdateStats {
        let center = self.player_chunk(player_position);
        self.center = center;
        let mut stats = UpdateStats::new(center);

        let keep = i64::from(self.render_distance) + i64::from(self.eviction_margin);
        let mut far: Vec<(i64, ChunkCoord)> = self
            .chunks
            .keys()
            .map(|&coord| (distance_squared(coord, center), coord))
            .filter(|&(distance, _)| distance > keep * keep)
            .collect();
        far.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, coord) in far {
            if self.evict_chunk(coord) {
                stats.evicted += 1;
            }
        }

        let radius = self.render_distance;
        let radius_squared = i64::from(radius) * i64::from(radius);
        let max_index = self.max_chunk_index();
        let mut missing = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let (Some(x), Some(z)) = (center.x.checked_add(dx), center.y.checked_add(dz))
                else {
                    continue;
                };
                if x.abs() > max_index || z.abs() > max_index {
                    continue;
                }
                let coord = ChunkCoord::new(x, z);
                let distance = distance_squared(coord, center);
                if distance <= radius_squared && !self.chunks.contains_key(&coord) {
                    missing.push((distance, coord));
                }
            }
        }
        missing.sort_by_key(|&(distance, coord)| (distance, coord.x, coord.y));

        let capacity = self.capacity();
        for (_, coord) in missing {
            while self.chunks.len() >= capacity && self.evict_least_recent() {
                stats.evicted += 1;
            }
            stats.discarded_blocks += self.load_chunk(coord);
            stats.generated += 1;
        }

        if stats.generated > 0 || stats.evicted > 0 {
            debug!(
                "Update around {:?}: {} generated, {} evicted, {} loaded",
                center,
                stats.generated,
                stats.evicted,
                self.chunks.len()
            );
        }
        stats
    }

    /// Draws every loaded chunk that intersects `frustum`, re-meshing dirty ones first.
    pub fn render(&mut self, frustum: &Frustum, renderer: &mut dyn ChunkRenderer) -> RenderStats {
        let mut stats = RenderStats::default();

        for handle in self.pending_release.drain(..) {
            renderer.release(handle);
            stats.released_handles += 1;
        }

        for chunk in self.chunks.values_mut() {
            if !frustum.is_box_visible(chunk.bounds()) {
                stats.culled_chunks += 1;
                continue;
            }
            stats.visible_chunks += 1;

            if chunk.is_dirty() {
                let start = Instant::now();
                let meshes = self.mesher.generate_mesh(chunk.grid());

                let mut block_types: Vec<_> = meshes
                    .iter()
                    .filter(|(_, mesh)| !mesh.is_empty())
                    .map(|(&block_type, _)| block_type)
                    .collect();
                block_types.sort_unstable();

                let mut handles = Vec::with_capacity(block_types.len());
                let mut vertices = 0;
                for block_type in block_types {
                    let mesh = &meshes[&block_type];
                    vertices += mesh.vertices.len();
                    handles.push(renderer.upload(&DrawBatch {
                        coord: chunk.coord(),
                        block_type,
                        mesh,
                    }));
                }

                for handle in chunk.finish_mesh(meshes, handles) {
                    renderer.release(handle);
                    stats.released_handles += 1;
                }
                stats.meshed_chunks += 1;
                stats.uploaded_vertices += vertices;
                debug!(
                    "Meshed chunk {:?} with the {} mesher in {:?}: {} vertices",
                    chunk.coord(),
                    self.mesher.name(),
                    start.elapsed(),
                    vertices
                );
            }

            let placement = DrawPlacement {
                origin: chunk.origin(),
                instance_slot: chunk.instance_slot(),
            };
            for &handle in chunk.handles() {
                renderer.draw(handle, &placement);
                stats.draw_calls += 1;
            }
            self.recently_drawn.promote(&chunk.coord());
        }

        trace!("Render: {:?}", stats);
        stats
    }

    /// Number of chunks currently loaded.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Handles of evicted chunks that the next `render` will release.
    pub fn pending_release_count(&self) -> usize {
        self.pending_release.len()
    }

    /// The loaded chunk at `coord`.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Mutable access to the loaded chunk at `coord`, for grid edits.
    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Coordinates of every loaded chunk, in no particular order.
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Handles of every loaded chunk.
    pub fn live_handles(&self) -> impl Iterator<Item = MeshHandle> + '_ {
        self.chunks.values().flat_map(|chunk| chunk.handles().iter().copied())
    }

    /// Per-chunk placement transforms, indexed by instance slot.
    pub fn instances(&self) -> &InstanceArena {
        &self.instances
    }

    /// Current render radius in chunks.
    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// Maximum number of chunks kept loaded.
    pub fn capacity(&self) -> usize {
        self.capacity_override
            .unwrap_or_else(|| chunks_within_radius(self.render_distance + self.eviction_margin))
            .max(chunks_within_radius(self.render_distance))
    }

    /// Changes the render radius. Takes effect on the next `update`.
    ///
    /// Shrinking the radius below the loaded set lowers the cap immediately, evicting
    /// the least recently drawn chunks.
    pub fn set_render_distance(&mut self, render_distance: i32) {
        self.render_distance = render_distance.max(0);
        let capacity = self.capacity();

        while self.chunks.len() > capacity && self.evict_least_recent() {}
        self.recently_drawn.resize(non_zero(capacity));

        if capacity > self.instances.capacity() {
            let mut instances = InstanceArena::new(capacity);
            for chunk in self.chunks.values_mut() {
                let slot = instances.allocate(chunk.coord(), placement_transform(chunk));
                chunk.set_instance_slot(slot);
            }
            self.instances = instances;
        }

        info!(
            "Render distance set to {}, capacity {}",
            self.render_distance, capacity
        );
    }

    /// Generates and registers the chunk at `coord`.
    ///
    /// # Returns
    /// The number of terrain blocks that fell outside the chunk.
    fn load_chunk(&mut self, coord: ChunkCoord) -> usize {
        let mut chunk = Chunk::new(coord, self.chunk_size);
        let blocks =
            self.terrain
                .generate_chunk_blocks(coord.x, coord.y, self.chunk_size[0] as i32);
        let populated = chunk.populate(&blocks);

        let slot = self.instances.allocate(coord, placement_transform(&chunk));
        chunk.set_instance_slot(slot);

        trace!(
            "Loaded chunk {:?}: {} blocks, slot {:?}",
            coord,
            populated.written,
            slot
        );
        self.recently_drawn.put(coord, ());
        self.chunks.insert(coord, chunk);
        populated.discarded
    }

    /// Evicts the least recently drawn chunk, preferring chunks outside the render
    /// radius around the last known player chunk.
    fn evict_least_recent(&mut self) -> bool {
        let radius_squared = i64::from(self.render_distance) * i64::from(self.render_distance);
        let center = self.center;
        let victim = self
            .recently_drawn
            .iter()
            .rev()
            .map(|(&coord, _)| coord)
            .find(|&coord| distance_squared(coord, center) > radius_squared)
            .or_else(|| self.recently_drawn.peek_lru().map(|(&coord, _)| coord));

        match victim {
            Some(coord) => self.evict_chunk(coord),
            None => false,
        }
    }

    /// Removes `coord` from the loaded set and queues its handles for release.
    ///
    /// The chunk itself is dropped here; only its handles outlive it.
    fn evict_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(mut chunk) = self.chunks.remove(&coord) else {
            return false;
        };
        self.recently_drawn.pop(&coord);
        self.instances.release(coord);
        chunk.evict();
        self.pending_release.extend(chunk.take_handles());
        trace!("Evicted chunk {:?}", coord);
        true
    }

    /// Largest chunk index whose world origin and far edge both fit in an `i32`.
    fn max_chunk_index(&self) -> i32 {
        let size = self.chunk_size[0].max(self.chunk_size[2]).max(1);
        i32::try_from(size).map_or(0, |size| i32::MAX / size - 1)
    }
}

fn distance_squared(a: ChunkCoord, b: ChunkCoord) -> i64 {
    let dx = i64::from(a.x) - i64::from(b.x);
    let dz = i64::from(a.y) - i64::from(b.y);
    dx * dx + dz * dz
}

fn placement_transform(chunk: &Chunk) -> Matrix4<f32> {
    Matrix4::from_translation(chunk.origin())
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}
