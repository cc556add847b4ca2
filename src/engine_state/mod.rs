//! # Engine State Module
//!
//! The core engine module that wires the subsystems of the renderer together.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the camera, the chunk manager and the renderer for one view
//! * `camera_state` - Camera, projection and frustum culling
//! * `rendering` - Meshers, vertex layout, texture atlas and the renderer seam
//! * `voxels` - Block catalog, chunk storage, terrain and chunk streaming
//!
//! ## Frame Flow
//!
//! Each call to `EngineState::frame`:
//! 1. Streams chunks around the camera (`ChunkManager::update`)
//! 2. Builds the frustum from the camera and projection
//! 3. Meshes visible dirty chunks and draws every visible chunk (`ChunkManager::render`)

use std::sync::Arc;

use log::debug;

use crate::core::{EngineConfig, EngineResult};

use self::{
    camera_state::CameraState,
    rendering::{meshing::build_mesher, meshing::ChunkRenderer, TextureAtlas},
    voxels::{
        block::BlockTypeCatalog,
        terrain::terrain_from_config,
        world::{ChunkManager, RenderStats, UpdateStats},
    },
};

pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// What one frame did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunk streaming results.
    pub update: UpdateStats,
    /// Culling, meshing and drawing results.
    pub render: RenderStats,
}

/// The state container for one view of the world.
///
/// Generic over the renderer so a GPU backend and the headless recorder share the
/// same frame loop.
pub struct EngineState<R: ChunkRenderer> {
    /// Current camera and projection
    pub camera_state: CameraState,
    chunk_manager: ChunkManager,
    renderer: R,
}

impl<R: ChunkRenderer> EngineState<R> {
    /// Builds the terrain generator and mesher named in `config` and a chunk manager
    /// around them.
    ///
    /// # Returns
    /// An error if the configuration is invalid or the atlas is empty.
    pub fn new(
        config: &EngineConfig,
        catalog: Arc<BlockTypeCatalog>,
        atlas: Arc<TextureAtlas>,
        camera_state: CameraState,
        renderer: R,
    ) -> EngineResult<Self> {
        let mesher = build_mesher(config.mesher, catalog, atlas)?;
        let terrain = terrain_from_config(&config.terrain);
        let chunk_manager = ChunkManager::new(config, terrain, mesher)?;

        Ok(Self {
            camera_state,
            chunk_manager,
            renderer,
        })
    }

    /// Streams, culls, meshes and draws one frame from the current camera.
    pub fn frame(&mut self) -> FrameStats {
        let update = self.chunk_manager.update(self.camera_state.camera.position);
        let frustum = self.camera_state.frustum();
        let render = self.chunk_manager.render(&frustum, &mut self.renderer);

        debug!(
            "Frame at {:?}: {} loaded, {} visible, {} meshed, {} draws",
            update.player_chunk,
            self.chunk_manager.loaded_chunk_count(),
            render.visible_chunks,
            render.meshed_chunks,
            render.draw_calls
        );
        FrameStats { update, render }
    }

    /// The chunk manager.
    pub fn chunk_manager(&self) -> &ChunkManager {
        &self.chunk_manager
    }

    /// Mutable access to the chunk manager, for edits and radius changes.
    pub fn chunk_manager_mut(&mut self) -> &mut ChunkManager {
        &mut self.chunk_manager
    }

    /// The renderer frames are drawn with.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
