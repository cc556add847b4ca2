/// Integration tests for meshing correctness
/// These tests check the greedy mesher against the per-face mesher on random and
/// hand-built grids.
use std::collections::HashMap;
use std::sync::Arc;

use voxel_renderer::{
    block_ids, BlockSide, BlockTypeCatalog, BlockTypeId, ChunkMesher, ChunkMeshes, GreedyMesher,
    MeshData, NaiveMesher, NoiseTerrainGenerator, TerrainConfig, TerrainGenerator, TextureAtlas,
    VoxelGrid, AIR,
};

/// A unit face: outward normal plus the block cell it belongs to.
type UnitFace = ([i32; 3], [i32; 3]);

fn catalog() -> Arc<BlockTypeCatalog> {
    Arc::new(BlockTypeCatalog::with_default_blocks().unwrap())
}

fn meshers() -> (GreedyMesher, NaiveMesher) {
    let catalog = catalog();
    let atlas = Arc::new(TextureAtlas::grid(&catalog.texture_names(), 4, 16));
    (
        GreedyMesher::new(catalog.clone(), atlas.clone()).unwrap(),
        NaiveMesher::new(catalog, atlas).unwrap(),
    )
}

fn random_grid(seed: u64, dims: [usize; 3], fill: f64, palette: &[BlockTypeId]) -> VoxelGrid {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut grid = VoxelGrid::with_dimensions(dims);
    for z in 0..dims[2] as i32 {
        for y in 0..dims[1] as i32 {
            for x in 0..dims[0] as i32 {
                if rng.f64() < fill {
                    grid.set(x, y, z, palette[rng.usize(..palette.len())]);
                }
            }
        }
    }
    grid
}

fn round(position: [f32; 3]) -> [i32; 3] {
    position.map(|c| c.round() as i32)
}

/// Expands every quad of `mesh` into the unit faces it covers.
fn unit_faces(mesh: &MeshData) -> Vec<UnitFace> {
    let mut faces = Vec::new();
    for quad in mesh.vertices.chunks(4) {
        let normal = round(quad[0].normal);
        let axis = normal.iter().position(|&n| n != 0).unwrap();
        let positive = normal[axis] > 0;

        let mut min = [i32::MAX; 3];
        let mut max = [i32::MIN; 3];
        for vertex in quad {
            let p = round(vertex.position);
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        assert_eq!(min[axis], max[axis], "quad is not axis aligned");

        let plane = min[axis];
        let depth = if positive { plane - 1 } else { plane };
        let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);
        for i in min[a]..max[a] {
            for j in min[b]..max[b] {
                let mut cell = [0; 3];
                cell[axis] = depth;
                cell[a] = i;
                cell[b] = j;
                faces.push((normal, cell));
            }
        }
    }
    faces.sort();
    faces
}

fn surface(meshes: &ChunkMeshes) -> HashMap<BlockTypeId, Vec<UnitFace>> {
    meshes
        .iter()
        .map(|(&id, mesh)| (id, unit_faces(mesh)))
        .collect()
}

fn vertex_total(meshes: &ChunkMeshes) -> usize {
    meshes.values().map(|mesh| mesh.vertices.len()).sum()
}

#[test]
fn greedy_covers_the_same_faces_as_naive_on_random_grids() {
    let (greedy, naive) = meshers();
    let palette = [
        block_ids::STONE,
        block_ids::DIRT,
        block_ids::GRASS,
        block_ids::WATER,
        block_ids::LEAVES,
    ];

    for seed in 0..24u64 {
        let fill = [0.1, 0.5, 0.9][seed as usize % 3];
        let grid = random_grid(seed, [9, 7, 11], fill, &palette);
        let merged = greedy.generate_mesh(&grid);
        let per_face = naive.generate_mesh(&grid);

        assert_eq!(
            surface(&merged),
            surface(&per_face),
            "surface mismatch for seed {seed} at fill {fill}"
        );
        assert!(vertex_total(&merged) <= vertex_total(&per_face));
    }
}

#[test]
fn every_generated_mesh_has_valid_indices() {
    let (greedy, naive) = meshers();
    for seed in 100..110u64 {
        let grid = random_grid(seed, [16, 16, 16], 0.4, &[block_ids::STONE, block_ids::SAND]);
        for meshes in [greedy.generate_mesh(&grid), naive.generate_mesh(&grid)] {
            for mesh in meshes.values() {
                mesh.validate().unwrap();
                assert!(!mesh.is_empty());
            }
        }
    }
}

#[test]
fn triangles_wind_counter_clockwise_from_outside() {
    let (greedy, naive) = meshers();
    let grid = random_grid(7, [8, 8, 8], 0.5, &[block_ids::STONE, block_ids::DIRT]);

    for meshes in [greedy.generate_mesh(&grid), naive.generate_mesh(&grid)] {
        for mesh in meshes.values() {
            for triangle in mesh.indices.chunks(3) {
                let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[triangle[i] as usize].position);
                let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
                let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
                let cross = [
                    ab[1] * ac[2] - ab[2] * ac[1],
                    ab[2] * ac[0] - ab[0] * ac[2],
                    ab[0] * ac[1] - ab[1] * ac[0],
                ];
                let normal = mesh.vertices[triangle[0] as usize].normal;
                let facing = cross[0] * normal[0] + cross[1] * normal[1] + cross[2] * normal[2];
                assert!(facing > 0.0, "triangle {:?} winds clockwise", triangle);
            }
        }
    }
}

#[test]
fn slab_collapses_to_six_quads() {
    let (greedy, naive) = meshers();
    let mut grid = VoxelGrid::new(16, 1, 16);
    grid.fill(block_ids::STONE);

    let merged = greedy.generate_mesh(&grid);
    let per_face = naive.generate_mesh(&grid);

    assert_eq!(merged[&block_ids::STONE].quad_count(), 6);
    assert_eq!(per_face[&block_ids::STONE].quad_count(), 16 * 16 * 2 + 4 * 16);

    let reduction = 1.0 - vertex_total(&merged) as f64 / vertex_total(&per_face) as f64;
    assert!(reduction > 0.95, "reduction was {reduction}");
}

#[test]
fn generated_terrain_meshes_smaller_with_greedy() {
    let (greedy, naive) = meshers();
    let generator = NoiseTerrainGenerator::new(&TerrainConfig::default());
    let mut grid = VoxelGrid::new(16, 96, 16);
    for block in generator.generate_chunk_blocks(0, 0, 16) {
        grid.set(block.position.x, block.position.y, block.position.z, block.block_type);
    }

    let merged = greedy.generate_mesh(&grid);
    let per_face = naive.generate_mesh(&grid);
    assert_eq!(surface(&merged), surface(&per_face));
    assert!(vertex_total(&merged) < vertex_total(&per_face));
}

#[test]
fn all_air_grid_allocates_nothing() {
    let (greedy, naive) = meshers();
    let grid = VoxelGrid::new(16, 32, 16);
    assert!(greedy.generate_mesh(&grid).is_empty());
    assert!(naive.generate_mesh(&grid).is_empty());
}

#[test]
fn unregistered_ids_are_skipped() {
    let (greedy, naive) = meshers();
    let mut grid = VoxelGrid::new(3, 1, 1);
    grid.set(0, 0, 0, block_ids::STONE);
    grid.set(1, 0, 0, 42);
    grid.set(2, 0, 0, block_ids::STONE);

    for meshes in [greedy.generate_mesh(&grid), naive.generate_mesh(&grid)] {
        assert!(!meshes.contains_key(&42));
        // The unknown block is not solid, so both stones keep all six faces.
        assert_eq!(meshes[&block_ids::STONE].quad_count(), 12);
    }
}

#[test]
fn grid_access_out_of_bounds_is_air() {
    let catalog = catalog();
    let mut grid = VoxelGrid::new(4, 4, 4);
    grid.fill(block_ids::STONE);

    let outside = [
        (-1, 0, 0),
        (0, -1, 0),
        (0, 0, -1),
        (4, 0, 0),
        (0, 4, 0),
        (i32::MAX, 0, i32::MIN),
    ];
    for (x, y, z) in outside {
        assert_eq!(grid.get(x, y, z), AIR);
        assert!(!grid.is_solid(x, y, z, &catalog));
        grid.set(x, y, z, block_ids::DIRT);
    }
    assert_eq!(grid.count_non_air(), 64);
    assert!(grid.should_render_face(0, 0, 0, BlockSide::LEFT, &catalog));
    assert!(!grid.should_render_face(0, 0, 0, BlockSide::RIGHT, &catalog));
}

#[test]
fn merged_meshes_split_back_apart() {
    let (greedy, _) = meshers();
    let grid = random_grid(
        3,
        [12, 12, 12],
        0.5,
        &[block_ids::STONE, block_ids::DIRT, block_ids::GRASS],
    );
    let meshes = greedy.generate_mesh(&grid);

    let mut block_types: Vec<_> = meshes.keys().copied().collect();
    block_types.sort_unstable();

    let mut combined = MeshData::new();
    let ranges: Vec<_> = block_types
        .iter()
        .map(|id| (id, combined.append(&meshes[id])))
        .collect();
    combined.validate().unwrap();

    for (id, range) in ranges {
        assert_eq!(&combined.slice(range), &meshes[id]);
    }
}
