//! # Camera State Management
//!
//! ## Core Components
//! - `Camera`: position and orientation in 3D space
//! - `Projection`: perspective settings
//! - `Frustum`: clip planes extracted from the combined view-projection matrix, used to
//!   decide which chunks are drawn
//! - `CameraState`: the pair of camera and projection a frame is rendered from

use cgmath::Matrix4;

use self::{
    camera::{Camera, Projection},
    frustum::Frustum,
};

pub mod camera;
pub mod frustum;

/// The camera and projection of the current view.
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Perspective settings of the viewport
    pub projection: Projection,
}

impl CameraState {
    /// Creates a camera state from its parts.
    pub fn new(camera: Camera, projection: Projection) -> Self {
        Self { camera, projection }
    }

    /// Combined view-projection matrix in OpenGL clip convention.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// Combined view-projection matrix with WGPU's depth range, for shader uniforms.
    pub fn wgpu_view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_wgpu_matrix() * self.camera.calc_matrix()
    }

    /// Frustum of the current view.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }
}
