#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Renderer
//!
//! The chunk meshing and visibility core of a voxel renderer.
//!
//! Terrain is stored as dense grids of typed blocks, one grid per chunk column. Each
//! chunk is turned into GPU-ready geometry with a greedy mesher that merges coplanar
//! faces of the same block type into maximal rectangles, and chunks are streamed
//! around the player and culled against the view frustum before they are drawn.
//!
//! ## Key Modules
//!
//! * `core` - Configuration and the crate error type
//! * `engine_state` - Camera and frustum, meshing and rendering, voxel storage and
//!   chunk streaming
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use voxel_renderer::{
//!     block_ids, BlockTypeCatalog, ChunkMesher, GreedyMesher, NaiveMesher, TextureAtlas,
//!     VoxelGrid,
//! };
//!
//! let catalog = Arc::new(BlockTypeCatalog::with_default_blocks().unwrap());
//! let atlas = Arc::new(TextureAtlas::grid(&catalog.texture_names(), 4, 16));
//!
//! let mut grid = VoxelGrid::new(16, 1, 16);
//! grid.fill(block_ids::STONE);
//!
//! let greedy = GreedyMesher::new(catalog.clone(), atlas.clone()).unwrap();
//! let naive = NaiveMesher::new(catalog, atlas).unwrap();
//! let merged = &greedy.generate_mesh(&grid)[&block_ids::STONE];
//! let per_face = &naive.generate_mesh(&grid)[&block_ids::STONE];
//! assert_eq!(merged.quad_count(), 6);
//! assert_eq!(per_face.quad_count(), 16 * 16 * 2 + 4 * 16);
//! ```
//!
//! ## Performance Considerations
//!
//! * Greedy meshing keeps vertex counts proportional to surface rectangles
//! * Chunks are only re-meshed when dirty and in view
//! * Chunk transforms live in a preallocated, recycled instance table

use std::sync::Arc;

use cgmath::{Deg, Point3, Vector3};
use log::{error, info};
use web_time::Instant;

pub mod core;
pub mod engine_state;

pub use crate::core::{
    EngineConfig, EngineError, EngineResult, MesherKind, TerrainConfig, TerrainKind,
};
pub use engine_state::{
    camera_state::{
        camera::{Camera, Projection},
        frustum::{Aabb, Frustum, Plane},
        CameraState,
    },
    rendering::{
        meshing::{
            build_mesher, ChunkMesher, ChunkMeshes, ChunkRenderer, DrawBatch, DrawPlacement,
            GreedyMesher, HeadlessRenderer, InstanceArena, MeshData, MeshHandle, NaiveMesher,
        },
        TextureAtlas, UvRect, Vertex,
    },
    voxels::{
        block::{block_ids, BlockSide, BlockType, BlockTypeCatalog, BlockTypeId, AIR},
        chunk::{Chunk, ChunkCoord, ChunkState, VoxelGrid},
        terrain::{
            terrain_from_config, FlatTerrainGenerator, NoiseTerrainGenerator, TerrainBlock,
            TerrainGenerator,
        },
        world::{ChunkManager, RenderStats, UpdateStats},
    },
    EngineState, FrameStats,
};

/// Distance the demo camera travels along +X per frame, in blocks.
const DEMO_SPEED: f32 = 2.0;

/// Runs the headless demo.
///
/// Initializes logging from `RUST_LOG`, loads the configuration named by the first
/// command line argument (defaults otherwise), then flies a camera along +X for the
/// configured number of frames, streaming, meshing and drawing chunks into a
/// [`HeadlessRenderer`]. Finishes by comparing greedy and naive vertex counts over the
/// chunks that ended up loaded.
pub fn run() -> EngineResult<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            EngineConfig::from_json_file(path)?
        }
        None => EngineConfig::default(),
    };

    let catalog = Arc::new(BlockTypeCatalog::with_default_blocks()?);
    let atlas = Arc::new(match &config.atlas_path {
        Some(path) => TextureAtlas::from_json_file(path)?,
        None => TextureAtlas::grid(&catalog.texture_names(), 4, 16),
    });
    info!(
        "{} block types, {} atlas textures",
        catalog.len(),
        atlas.len()
    );

    let spawn_height = (config.terrain.base_height + config.terrain.max_height) as f32 + 8.0;
    let camera_state = CameraState::new(
        Camera::new(Point3::new(0.0, spawn_height, 0.0), Deg(0.0), Deg(-25.0)),
        Projection::new(1280, 720, Deg(70.0), 0.1, 1000.0),
    );
    let mut engine = EngineState::new(
        &config,
        catalog.clone(),
        atlas.clone(),
        camera_state,
        HeadlessRenderer::new(),
    )?;

    let start = Instant::now();
    for frame in 0..config.frames {
        let stats = engine.frame();
        let drawn = engine.renderer_mut().reset_frame();
        if frame % 30 == 0 {
            info!(
                "Frame {}: chunk {:?}, {} loaded, {} visible, {} meshed, {} indices drawn",
                frame,
                stats.update.player_chunk,
                engine.chunk_manager().loaded_chunk_count(),
                stats.render.visible_chunks,
                stats.render.meshed_chunks,
                drawn.drawn_indices
            );
        }
        engine
            .camera_state
            .camera
            .translate(Vector3::new(DEMO_SPEED, 0.0, 0.0));
    }
    let totals = engine.renderer().totals();
    info!(
        "{} frames in {:?}: {} uploads, {} draws, {} releases, {} meshes resident",
        config.frames,
        start.elapsed(),
        totals.uploads,
        totals.draws,
        totals.releases,
        engine.renderer().live_handles()
    );

    let greedy = build_mesher(MesherKind::Greedy, catalog.clone(), atlas.clone())?;
    let naive = build_mesher(MesherKind::Naive, catalog, atlas)?;
    let (greedy_vertices, naive_vertices) =
        compare_meshers(engine.chunk_manager(), greedy.as_ref(), naive.as_ref());
    if naive_vertices > 0 {
        let reduction = 100.0 * (1.0 - greedy_vertices as f64 / naive_vertices as f64);
        info!(
            "Greedy meshing: {} vertices vs {} naive ({:.1}% fewer)",
            greedy_vertices, naive_vertices, reduction
        );
    }

    Ok(())
}

/// Total vertices two meshers produce over every loaded chunk.
pub fn compare_meshers(
    manager: &ChunkManager,
    first: &dyn ChunkMesher,
    second: &dyn ChunkMesher,
) -> (usize, usize) {
    let vertex_total = |mesher: &dyn ChunkMesher| -> usize {
        manager
            .chunk_coords()
            .filter_map(|coord| manager.chunk(coord))
            .map(|chunk| {
                mesher
                    .generate_mesh(chunk.grid())
                    .values()
                    .map(|mesh| mesh.vertices.len())
                    .sum::<usize>()
            })
            .sum()
    };
    (vertex_total(first), vertex_total(second))
}

/// Logs `result`'s error, if any, and maps it to a process exit code.
pub fn report(result: EngineResult<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            std::process::ExitCode::FAILURE
        }
    }
}
