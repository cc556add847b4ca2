//! # Camera Implementation
//!
//! - `Camera`: position and orientation of the viewer in world space
//! - `Projection`: perspective projection settings
//!
//! Yaw is measured from +X towards +Z, so a camera with zero yaw and pitch looks
//! along +X.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

/// Transformation matrix to convert from OpenGL's clip space to WGPU's.
///
/// Both use X right and Y up with X/Y in `[-1, 1]`, but WGPU's depth range is `[0, 1]`
/// instead of `[-1, 1]`:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// A first-person camera in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// Pitch is clamped just short of straight up or down.
    ///
    /// # Example
    /// ```
    /// use cgmath::{Deg, Point3};
    /// use voxel_renderer::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Point3::new(0.0, 80.0, 0.0), Deg(0.0), Deg(-20.0));
    /// assert!(camera.forward().x > 0.0);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix that transforms world space to camera space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    /// Moves the camera by `offset` without changing its orientation.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
    }

    /// Rotates the camera by the given yaw and pitch deltas.
    pub fn rotate<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.yaw += yaw.into();
        self.pitch += pitch.into();
        self.clamp_pitch();
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// A camera's projection matrix parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Far clipping plane distance.
    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    /// Perspective matrix in OpenGL clip convention, depth in `[-1, 1]`.
    ///
    /// This is the form frustum plane extraction expects.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Perspective matrix with depth remapped to WGPU's `[0, 1]`, ready for shaders.
    pub fn calc_wgpu_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.calc_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_yaw_looks_along_positive_x() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let forward = camera.forward();
        assert!((forward.x - 1.0).abs() < 1e-6);
        assert!(forward.y.abs() < 1e-6);
        assert!(forward.z.abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        camera.rotate(Deg(0.0), Deg(180.0));
        assert!(camera.pitch.0 < FRAC_PI_2);
        assert!(camera.forward().y > 0.99);
    }

    #[test]
    fn view_matrix_moves_target_onto_negative_z() {
        let camera = Camera::new(Point3::new(10.0, 5.0, 0.0), Deg(0.0), Deg(0.0));
        let target = camera.calc_matrix() * Vector4::new(20.0, 5.0, 0.0, 1.0);
        assert!((target.z + 10.0).abs() < 1e-4);
        assert!(target.x.abs() < 1e-4);
    }

    #[test]
    fn wgpu_matrix_maps_near_plane_to_zero_depth() {
        let projection = Projection::new(800, 600, Deg(60.0), 0.1, 100.0);
        let near = projection.calc_wgpu_matrix() * Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);

        let gl_near = projection.calc_matrix() * Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert!((gl_near.z / gl_near.w + 1.0).abs() < 1e-4);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut projection = Projection::new(100, 100, Deg(60.0), 0.1, 100.0);
        projection.resize(200, 100);
        assert!((projection.aspect() - 2.0).abs() < f32::EPSILON);
        projection.resize(200, 0);
        assert!(projection.aspect().is_finite());
    }
}
