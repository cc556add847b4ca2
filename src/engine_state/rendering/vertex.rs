//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format produced by the meshers and consumed by the
//! chunk shader.

/// A vertex in the voxel rendering pipeline.
///
/// Positions are chunk-local; the renderer adds the chunk origin from the draw
/// placement. `texture_bounds` carries the atlas tile a merged quad repeats, so the
/// shader can wrap tiled UVs back into the tile.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Bounds: [f32; 4] (16 bytes), `(min_u, min_v, max_u, max_v)`
///
/// Total size: 48 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Outward face normal
    pub normal: [f32; 3],
    /// Atlas UV, possibly beyond the tile for merged quads
    pub tex_coords: [f32; 2],
    /// Atlas tile this vertex samples from
    pub texture_bounds: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local position
    /// * `normal` - Outward normal of the face
    /// * `tex_coords` - Atlas texture coordinates
    /// * `texture_bounds` - Tile bounds `(min_u, min_v, max_u, max_v)`
    ///
    /// # Returns
    /// A new `Vertex` instance
    pub fn new(
        position: [f32; 3],
        normal: [f32; 3],
        tex_coords: [f32; 2],
        texture_bounds: [f32; 4],
    ) -> Self {
        Vertex {
            position,
            normal,
            tex_coords,
            texture_bounds,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Returns
    /// A `wgpu::VertexBufferLayout` describing the vertex format
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: tex_coords (vec2<f32>)
    /// - `location = 3`: texture_bounds (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32x4,
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 48);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[3].offset, 32);
    }

    #[test]
    fn casts_to_bytes() {
        let vertices = [Vertex::new(
            [1.0, 2.0, 3.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5],
            [0.0, 0.0, 1.0, 1.0],
        )];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 48);
    }
}
