//! # Block Side Module
//!
//! The six faces of a voxel block, together with the per-face geometry every mesher
//! needs: outward normal, the axis it is perpendicular to, the two in-plane axes that
//! span a quad on it, and which face sits opposite.
//!
//! All of this lives in one table indexed by the variant, so a new per-face property is
//! added in exactly one place and the compiler checks that the match over sides is
//! exhaustive.

/// One of the three world axes.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Axis {
    /// The X axis.
    X = 0,
    /// The Y axis (up).
    Y = 1,
    /// The Z axis.
    Z = 2,
}

impl Axis {
    /// The component index of this axis in an `[x, y, z]` triple.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Represents the six possible faces of a voxel block.
///
/// The discriminants double as the texture slot of a block type, so the order here
/// is the order of `BlockType::textures`.
///
/// The order is: [FRONT, BACK, LEFT, RIGHT, TOP, BOTTOM]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The top face (facing positive Y)
    TOP = 4,

    /// The bottom face (facing negative Y)
    BOTTOM = 5,
}

/// Static geometry of one block side.
#[derive(Copy, Clone, Debug)]
pub struct SideGeometry {
    /// Outward unit normal.
    pub normal: [i32; 3],
    /// The axis this face is perpendicular to.
    pub axis: Axis,
    /// Whether the normal points along the positive direction of `axis`.
    pub positive: bool,
    /// The face on the other side of the block.
    pub opposite: BlockSide,
    /// In-plane axes `(u, v)` chosen so that `u x v` points along `+axis`.
    pub tangents: (Axis, Axis),
    /// Texture axes `(s, t)`: the world axes the atlas tile's horizontal and vertical
    /// directions follow on this face. `t` is world up on every vertical face.
    pub texture_axes: (Axis, Axis),
}

const SIDE_TABLE: [SideGeometry; 6] = [
    // FRONT
    SideGeometry {
        normal: [0, 0, 1],
        axis: Axis::Z,
        positive: true,
        opposite: BlockSide::BACK,
        tangents: (Axis::X, Axis::Y),
        texture_axes: (Axis::X, Axis::Y),
    },
    // BACK
    SideGeometry {
        normal: [0, 0, -1],
        axis: Axis::Z,
        positive: false,
        opposite: BlockSide::FRONT,
        tangents: (Axis::X, Axis::Y),
        texture_axes: (Axis::X, Axis::Y),
    },
    // LEFT
    SideGeometry {
        normal: [-1, 0, 0],
        axis: Axis::X,
        positive: false,
        opposite: BlockSide::RIGHT,
        tangents: (Axis::Y, Axis::Z),
        texture_axes: (Axis::Z, Axis::Y),
    },
    // RIGHT
    SideGeometry {
        normal: [1, 0, 0],
        axis: Axis::X,
        positive: true,
        opposite: BlockSide::LEFT,
        tangents: (Axis::Y, Axis::Z),
        texture_axes: (Axis::Z, Axis::Y),
    },
    // TOP
    SideGeometry {
        normal: [0, 1, 0],
        axis: Axis::Y,
        positive: true,
        opposite: BlockSide::BOTTOM,
        tangents: (Axis::Z, Axis::X),
        texture_axes: (Axis::X, Axis::Z),
    },
    // BOTTOM
    SideGeometry {
        normal: [0, -1, 0],
        axis: Axis::Y,
        positive: false,
        opposite: BlockSide::TOP,
        tangents: (Axis::Z, Axis::X),
        texture_axes: (Axis::X, Axis::Z),
    },
];

impl BlockSide {
    /// Returns an array containing all six block faces in texture-slot order.
    ///
    /// # Returns
    /// An array containing all `BlockSide` variants.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
        ]
    }

    /// The side whose normal points along `axis` in the given direction.
    pub fn from_axis(axis: Axis, positive: bool) -> BlockSide {
        match (axis, positive) {
            (Axis::X, true) => BlockSide::RIGHT,
            (Axis::X, false) => BlockSide::LEFT,
            (Axis::Y, true) => BlockSide::TOP,
            (Axis::Y, false) => BlockSide::BOTTOM,
            (Axis::Z, true) => BlockSide::FRONT,
            (Axis::Z, false) => BlockSide::BACK,
        }
    }

    /// The static geometry record for this side.
    #[inline]
    pub fn geometry(self) -> &'static SideGeometry {
        &SIDE_TABLE[self as usize]
    }

    /// Outward unit normal as integers.
    #[inline]
    pub fn normal(self) -> [i32; 3] {
        self.geometry().normal
    }

    /// Outward unit normal as floats, ready for a vertex.
    #[inline]
    pub fn normal_f32(self) -> [f32; 3] {
        let [x, y, z] = self.normal();
        [x as f32, y as f32, z as f32]
    }

    /// The face on the other side of the block.
    #[inline]
    pub fn opposite(self) -> BlockSide {
        self.geometry().opposite
    }

    /// Offset to the neighbouring cell this face looks at.
    #[inline]
    pub fn offset(self) -> [i32; 3] {
        self.normal()
    }

    /// Computes the four corners of a quad lying on this side.
    ///
    /// # Arguments
    /// * `cell` - Integer coordinates of the cell the quad starts in. The quad plane is
    ///   the cell's face in this side's direction.
    /// * `u_len` - Extent of the quad along the first tangent axis, in blocks
    /// * `v_len` - Extent of the quad along the second tangent axis, in blocks
    ///
    /// # Returns
    /// Four corners ordered counter-clockwise as seen from outside the block, so that
    /// triangles `(0, 1, 2)` and `(0, 2, 3)` face along the normal.
    pub fn quad_corners(self, cell: [i32; 3], u_len: i32, v_len: i32) -> [[i32; 3]; 4] {
        let geometry = self.geometry();
        let (u_axis, v_axis) = geometry.tangents;

        let mut origin = cell;
        if geometry.positive {
            origin[geometry.axis.index()] += 1;
        }

        let mut du = [0; 3];
        du[u_axis.index()] = u_len;
        let mut dv = [0; 3];
        dv[v_axis.index()] = v_len;

        let p0 = origin;
        let p1 = add(origin, du);
        let p2 = add(add(origin, du), dv);
        let p3 = add(origin, dv);

        if geometry.positive {
            [p0, p1, p2, p3]
        } else {
            [p0, p3, p2, p1]
        }
    }

    /// Texture-space offset `(s, t)` of `corner` relative to `origin`, in blocks.
    ///
    /// Used to tile an atlas tile across a merged quad: a corner 3 blocks along the
    /// face's `s` axis from the quad origin samples 3 tile widths across.
    pub fn texture_offset(self, origin: [i32; 3], corner: [i32; 3]) -> (f32, f32) {
        let (s_axis, t_axis) = self.geometry().texture_axes;
        (
            (corner[s_axis.index()] - origin[s_axis.index()]) as f32,
            (corner[t_axis.index()] - origin[t_axis.index()]) as f32,
        )
    }
}

#[inline]
fn add(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Returns the component-wise minimum of four corners.
pub fn corners_min(corners: &[[i32; 3]; 4]) -> [i32; 3] {
    let mut min = corners[0];
    for corner in &corners[1..] {
        for i in 0..3 {
            min[i] = min[i].min(corner[i]);
        }
    }
    min
}
