//! Mesh data structures and operations for voxel rendering.
//!
//! `MeshData` is the plain vertex and index buffer pair handed from the meshers to the
//! renderer. It is built quad by quad and can be concatenated with `append`, which
//! rebases the appended indices onto the existing vertices.

use crate::core::{EngineError, EngineResult};
use crate::engine_state::rendering::Vertex;

/// Indices of the two triangles of a quad, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Vertex and index buffers for one block type of one chunk.
///
/// Invariants: `indices.len() % 3 == 0` and every index is `< vertices.len()`.
/// Triangles wind counter-clockwise when viewed from the side their normal faces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex buffer contents
    pub vertices: Vec<Vertex>,
    /// Index buffer contents
    pub indices: Vec<u32>,
}

/// Where a block of data landed inside a `MeshData` after `append`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeshRange {
    /// First vertex of the appended block.
    pub vertex_offset: u32,
    /// Number of appended vertices.
    pub vertex_count: u32,
    /// First index of the appended block.
    pub index_offset: u32,
    /// Number of appended indices.
    pub index_count: u32,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mesh has no geometry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads, assuming the mesh was built from quads only.
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }

    /// Appends one quad.
    ///
    /// # Arguments
    /// * `corners` - Four positions, counter-clockwise seen from outside
    /// * `normal` - Shared outward normal
    /// * `tex_coords` - Atlas UV per corner
    /// * `texture_bounds` - Atlas tile shared by all four corners
    pub fn push_quad(
        &mut self,
        corners: [[f32; 3]; 4],
        normal: [f32; 3],
        tex_coords: [[f32; 2]; 4],
        texture_bounds: [f32; 4],
    ) {
        let base = self.vertices.len() as u32;
        for (position, uv) in corners.into_iter().zip(tex_coords) {
            self.vertices
                .push(Vertex::new(position, normal, uv, texture_bounds));
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Concatenates `other` onto this mesh.
    ///
    /// Every appended index is shifted by the number of vertices this mesh held
    /// before the call.
    ///
    /// # Returns
    /// The range the appended data occupies, usable with `slice`.
    pub fn append(&mut self, other: &MeshData) -> MeshRange {
        let range = MeshRange {
            vertex_offset: self.vertices.len() as u32,
            vertex_count: other.vertices.len() as u32,
            index_offset: self.indices.len() as u32,
            index_count: other.indices.len() as u32,
        };

        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|i| i + range.vertex_offset));

        range
    }

    /// Copies a previously appended block back out, with indices relative to its own
    /// first vertex again.
    ///
    /// Ranges that run past the end of the mesh are truncated.
    pub fn slice(&self, range: MeshRange) -> MeshData {
        let vertex_start = (range.vertex_offset as usize).min(self.vertices.len());
        let vertex_end = (vertex_start + range.vertex_count as usize).min(self.vertices.len());
        let index_start = (range.index_offset as usize).min(self.indices.len());
        let index_end = (index_start + range.index_count as usize).min(self.indices.len());

        MeshData {
            vertices: self.vertices[vertex_start..vertex_end].to_vec(),
            indices: self.indices[index_start..index_end]
                .iter()
                .map(|i| i.saturating_sub(range.vertex_offset))
                .collect(),
        }
    }

    /// Checks the buffer invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(EngineError::IncompleteTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(EngineError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh(count: usize, x: f32) -> MeshData {
        let mut mesh = MeshData::new();
        for i in 0..count {
            let z = i as f32;
            mesh.push_quad(
                [[x, 0.0, z], [x + 1.0, 0.0, z], [x + 1.0, 1.0, z], [x, 1.0, z]],
                [0.0, 0.0, 1.0],
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                [0.0, 0.0, 1.0, 1.0],
            );
        }
        mesh
    }

    #[test]
    fn push_quad_emits_two_triangles() {
        let mesh = quad_mesh(2, 0.0);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.quad_count(), 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn append_shifts_indices_by_prior_vertex_count() {
        let mut a = quad_mesh(3, 0.0);
        let b = quad_mesh(2, 5.0);
        let prior = a.vertices.len() as u32;

        let range = a.append(&b);

        assert_eq!(range.vertex_offset, prior);
        assert_eq!(range.index_offset, 18);
        let appended = &a.indices[range.index_offset as usize..];
        let expected: Vec<u32> = b.indices.iter().map(|i| i + prior).collect();
        assert_eq!(appended, expected.as_slice());
        a.validate().unwrap();
    }

    #[test]
    fn slice_restores_appended_mesh() {
        let mut a = quad_mesh(3, 0.0);
        let b = quad_mesh(2, 5.0);
        let range = a.append(&b);
        assert_eq!(a.slice(range), b);
    }

    #[test]
    fn append_onto_empty_is_identity() {
        let mut a = MeshData::new();
        let b = quad_mesh(1, 0.0);
        a.append(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn validate_catches_bad_buffers() {
        let mut mesh = quad_mesh(1, 0.0);
        mesh.indices.push(0);
        assert!(matches!(mesh.validate(), Err(EngineError::IncompleteTriangle(7))));

        let mut mesh = quad_mesh(1, 0.0);
        mesh.indices[5] = 4;
        assert!(matches!(
            mesh.validate(),
            Err(EngineError::IndexOutOfRange { index: 4, vertex_count: 4 })
        ));
    }
}
