//! Frustum culling for view-dependent rendering.
//!
//! Extracts the six clip planes from a view-projection matrix and tests bounding
//! volumes against them. The tests are conservative: a volume that merely straddles a
//! plane is reported visible, and only volumes entirely behind some plane are culled.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, Vector4};

/// A plane `normal . p + distance = 0`, with the normal pointing into the frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal facing the inside of the frustum.
    pub normal: Vector3<f32>,
    /// Signed offset from the origin.
    pub distance: f32,
}

impl Plane {
    /// Builds a normalized plane from `(a, b, c, d)` coefficients.
    pub fn from_coefficients(coefficients: Vector4<f32>) -> Self {
        let normal = coefficients.truncate();
        let length = normal.magnitude();
        if length > 0.0 {
            Self {
                normal: normal / length,
                distance: coefficients.w / length,
            }
        } else {
            Self {
                normal,
                distance: coefficients.w,
            }
        }
    }

    /// Signed distance from `point` to the plane. Positive is inside.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.x * point.x + self.normal.y * point.y + self.normal.z * point.z + self.distance
    }
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Centre of the box.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Half-size of the box along each axis.
    pub fn extent(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }

    /// The corner furthest along `normal`.
    #[inline]
    pub fn positive_vertex(&self, normal: Vector3<f32>) -> Point3<f32> {
        Point3::new(
            if normal.x >= 0.0 { self.max.x } else { self.min.x },
            if normal.y >= 0.0 { self.max.y } else { self.min.y },
            if normal.z >= 0.0 { self.max.z } else { self.min.z },
        )
    }
}

/// View frustum for culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Left plane index.
    pub const LEFT: usize = 0;
    /// Right plane index.
    pub const RIGHT: usize = 1;
    /// Bottom plane index.
    pub const BOTTOM: usize = 2;
    /// Top plane index.
    pub const TOP: usize = 3;
    /// Near plane index.
    pub const NEAR: usize = 4;
    /// Far plane index.
    pub const FAR: usize = 5;

    /// Extracts frustum planes from a view-projection matrix.
    ///
    /// The matrix is expected in OpenGL clip convention (depth in `[-1, 1]`), as
    /// produced by `Projection::calc_matrix`. A matrix with the wgpu depth remap
    /// applied still culls correctly, with a near plane slightly behind the real one.
    pub fn from_view_projection(m: &Matrix4<f32>) -> Self {
        let row = |i: usize| Vector4::new(m.x[i], m.y[i], m.z[i], m.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let mut planes = [Plane::from_coefficients(r3); 6];
        planes[Self::LEFT] = Plane::from_coefficients(r3 + r0);
        planes[Self::RIGHT] = Plane::from_coefficients(r3 - r0);
        planes[Self::BOTTOM] = Plane::from_coefficients(r3 + r1);
        planes[Self::TOP] = Plane::from_coefficients(r3 - r1);
        planes[Self::NEAR] = Plane::from_coefficients(r3 + r2);
        planes[Self::FAR] = Plane::from_coefficients(r3 - r2);

        Self { planes }
    }

    /// A frustum that accepts everything.
    pub fn unbounded() -> Self {
        let everywhere = Plane {
            normal: Vector3::new(0.0, 0.0, 0.0),
            distance: f32::MAX,
        };
        Self {
            planes: [everywhere; 6],
        }
    }

    /// Whether any part of `aabb` may be inside the frustum.
    ///
    /// For each plane, the box corner furthest along the plane normal is tested; if
    /// even that corner is behind the plane, the whole box is.
    pub fn is_box_visible(&self, aabb: &Aabb) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(aabb.positive_vertex(plane.normal)) >= 0.0)
    }

    /// Whether any part of the sphere may be inside the frustum.
    pub fn is_sphere_visible(&self, center: Point3<f32>, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{perspective, Deg};

    /// Camera at the origin looking down -Z, 90 degree square frustum, depth 1..100.
    fn frustum() -> Frustum {
        let projection = perspective(Deg(90.0), 1.0, 1.0, 100.0);
        let view = Matrix4::look_to_rh(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::unit_y(),
        );
        Frustum::from_view_projection(&(projection * view))
    }

    fn unit_box_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn planes_are_normalized() {
        for plane in frustum().planes {
            assert!((plane.normal.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn box_in_front_is_visible() {
        assert!(frustum().is_box_visible(&unit_box_at(-0.5, -0.5, -10.0)));
    }

    #[test]
    fn box_behind_camera_is_culled() {
        assert!(!frustum().is_box_visible(&unit_box_at(-0.5, -0.5, 5.0)));
    }

    #[test]
    fn box_beyond_far_plane_is_culled() {
        assert!(!frustum().is_box_visible(&unit_box_at(-0.5, -0.5, -200.0)));
    }

    #[test]
    fn box_outside_side_plane_is_culled() {
        // At depth 10 the right plane is at x = 10.
        assert!(!frustum().is_box_visible(&unit_box_at(20.0, 0.0, -10.5)));
    }

    #[test]
    fn straddling_box_is_visible() {
        let straddling = Aabb::new(Point3::new(5.0, -1.0, -11.0), Point3::new(15.0, 1.0, -9.0));
        assert!(frustum().is_box_visible(&straddling));
    }

    #[test]
    fn spheres() {
        let frustum = frustum();
        assert!(frustum.is_sphere_visible(Point3::new(0.0, 0.0, -50.0), 1.0));
        assert!(frustum.is_sphere_visible(Point3::new(0.0, 0.0, -0.5), 1.0));
        assert!(!frustum.is_sphere_visible(Point3::new(0.0, 0.0, 10.0), 1.0));
    }

    #[test]
    fn unbounded_accepts_everything() {
        let frustum = Frustum::unbounded();
        assert!(frustum.is_box_visible(&unit_box_at(1e6, -1e6, 1e6)));
        assert!(frustum.is_sphere_visible(Point3::new(-1e9, 0.0, 0.0), 0.0));
    }
}
