//! Dense block storage for a single chunk.
//!
//! Cells are stored x-fastest (`x + y * width + z * width * height`). Reads outside
//! the grid return air and writes outside it are ignored, so neighbour queries at chunk
//! edges never need a bounds branch at the call site.

use crate::engine_state::voxels::block::{BlockSide, BlockTypeCatalog, BlockTypeId, AIR};

/// A fixed-size 3D array of block ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    width: usize,
    height: usize,
    depth: usize,
    blocks: Vec<BlockTypeId>,
}

impl VoxelGrid {
    /// Creates a grid of the given extents filled with air.
    ///
    /// # Arguments
    /// * `width` - Extent along X
    /// * `height` - Extent along Y
    /// * `depth` - Extent along Z
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            blocks: vec![AIR; width * height * depth],
        }
    }

    /// Creates a grid from `[x, y, z]` extents.
    pub fn with_dimensions(dimensions: [usize; 3]) -> Self {
        Self::new(dimensions[0], dimensions[1], dimensions[2])
    }

    /// The grid extents as `[width, height, depth]`.
    #[inline]
    pub fn dimensions(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }

    /// Whether the coordinate lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    #[inline]
    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if self.in_bounds(x, y, z) {
            Some(x as usize + y as usize * self.width + z as usize * self.width * self.height)
        } else {
            None
        }
    }

    /// Reads the block at a coordinate. Out-of-range coordinates read as air.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeId {
        match self.index(x, y, z) {
            Some(i) => self.blocks[i],
            None => AIR,
        }
    }

    /// Writes the block at a coordinate. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, id: BlockTypeId) {
        if let Some(i) = self.index(x, y, z) {
            self.blocks[i] = id;
        }
    }

    /// Overwrites every cell with `id`.
    pub fn fill(&mut self, id: BlockTypeId) {
        self.blocks.fill(id);
    }

    /// Whether the cell holds a registered solid block.
    ///
    /// Air, unregistered ids and out-of-range coordinates are all non-solid.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32, catalog: &BlockTypeCatalog) -> bool {
        let id = self.get(x, y, z);
        id != AIR && catalog.is_solid(id)
    }

    /// The face culling predicate.
    ///
    /// A face is drawn when the cell is not air and the single neighbour it faces is
    /// not solid. Any non-solid neighbour exposes the face, including transparent
    /// non-solid blocks such as water. Transparency on its own is not consulted, so a
    /// solid transparent block (leaves) hides the faces behind it.
    #[inline]
    pub fn should_render_face(
        &self,
        x: i32,
        y: i32,
        z: i32,
        side: BlockSide,
        catalog: &BlockTypeCatalog,
    ) -> bool {
        if self.get(x, y, z) == AIR {
            return false;
        }
        let [dx, dy, dz] = side.offset();
        !self.is_solid(x + dx, y + dy, z + dz, catalog)
    }

    /// Whether every cell is air.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&id| id == AIR)
    }

    /// Number of cells that are not air.
    pub fn count_non_air(&self) -> usize {
        self.blocks.iter().filter(|&&id| id != AIR).count()
    }

    /// Iterates over every non-air cell as `([x, y, z], id)` in storage order.
    pub fn iter_non_air(&self) -> impl Iterator<Item = ([i32; 3], BlockTypeId)> + '_ {
        let width = self.width;
        let plane = self.width * self.height;
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, &id)| id != AIR)
            .map(move |(i, &id)| {
                let x = i % width;
                let y = (i % plane) / width;
                let z = i / plane;
                ([x as i32, y as i32, z as i32], id)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_ids::{LEAVES, STONE, WATER};

    fn catalog() -> BlockTypeCatalog {
        BlockTypeCatalog::with_default_blocks().unwrap()
    }

    #[test]
    fn starts_as_air() {
        let grid = VoxelGrid::new(4, 8, 4);
        assert!(grid.is_empty());
        assert_eq!(grid.dimensions(), [4, 8, 4]);
        assert_eq!(grid.count_non_air(), 0);
    }

    #[test]
    fn set_then_get() {
        let mut grid = VoxelGrid::new(4, 8, 4);
        grid.set(3, 7, 2, STONE);
        assert_eq!(grid.get(3, 7, 2), STONE);
        assert_eq!(grid.get(2, 7, 3), AIR);
        assert_eq!(grid.count_non_air(), 1);
    }

    #[test]
    fn out_of_range_reads_are_air() {
        let mut grid = VoxelGrid::new(4, 4, 4);
        grid.fill(STONE);
        let catalog = catalog();
        for (x, y, z) in [
            (-1, 0, 0),
            (0, -1, 0),
            (0, 0, -1),
            (4, 0, 0),
            (0, 4, 0),
            (0, 0, 4),
            (i32::MIN, i32::MAX, 0),
            (1_000_000, 2, 2),
        ] {
            assert_eq!(grid.get(x, y, z), AIR);
            assert!(!grid.is_solid(x, y, z, &catalog));
        }
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut grid = VoxelGrid::new(2, 2, 2);
        grid.set(-1, 0, 0, STONE);
        grid.set(2, 0, 0, STONE);
        grid.set(0, 0, 99, STONE);
        assert!(grid.is_empty());
    }

    #[test]
    fn unregistered_ids_are_not_solid() {
        let mut grid = VoxelGrid::new(2, 2, 2);
        grid.set(0, 0, 0, 999);
        assert!(!grid.is_solid(0, 0, 0, &catalog()));
    }

    #[test]
    fn faces_toward_air_and_water_render() {
        let catalog = catalog();
        let mut grid = VoxelGrid::new(3, 3, 3);
        grid.set(1, 1, 1, STONE);
        grid.set(1, 2, 1, WATER);
        grid.set(1, 1, 2, LEAVES);

        assert!(grid.should_render_face(1, 1, 1, BlockSide::TOP, &catalog));
        assert!(grid.should_render_face(1, 1, 1, BlockSide::RIGHT, &catalog));
        assert!(!grid.should_render_face(1, 1, 1, BlockSide::FRONT, &catalog));
        assert!(!grid.should_render_face(0, 0, 0, BlockSide::TOP, &catalog));
    }

    #[test]
    fn chunk_edge_faces_are_exposed() {
        let catalog = catalog();
        let mut grid = VoxelGrid::new(1, 1, 1);
        grid.set(0, 0, 0, STONE);
        for side in BlockSide::all() {
            assert!(grid.should_render_face(0, 0, 0, side, &catalog));
        }
    }

    #[test]
    fn iter_non_air_reports_coordinates() {
        let mut grid = VoxelGrid::new(3, 4, 5);
        grid.set(2, 3, 4, STONE);
        grid.set(0, 1, 0, WATER);
        let cells: Vec<_> = grid.iter_non_air().collect();
        assert_eq!(cells, vec![([0, 1, 0], WATER), ([2, 3, 4], STONE)]);
    }
}
