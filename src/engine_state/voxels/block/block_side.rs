//! # Block Side Module
//!
//! This module defines the six faces of a voxel cube. Faces are used both by the
//! picking engine (the face a ray entered decides where a new block goes) and by the
//! cube renderer (one quad per face).

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Outward unit normal of the face in grid units.
    pub fn normal(&self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward unit normal of the face as a float vector.
    pub fn normal_f32(&self) -> Vector3<f32> {
        let normal = self.normal();
        Vector3::new(normal.x as f32, normal.y as f32, normal.z as f32)
    }

    /// Returns the face whose outward normal points along `axis` (0 = X, 1 = Y, 2 = Z)
    /// in the positive or negative direction.
    ///
    /// # Returns
    /// `None` if `axis` is not 0, 1 or 2.
    pub fn from_axis(axis: usize, positive: bool) -> Option<BlockSide> {
        match (axis, positive) {
            (0, true) => Some(BlockSide::RIGHT),
            (0, false) => Some(BlockSide::LEFT),
            (1, true) => Some(BlockSide::TOP),
            (1, false) => Some(BlockSide::BOTTOM),
            (2, true) => Some(BlockSide::FRONT),
            (2, false) => Some(BlockSide::BACK),
            _ => None,
        }
    }

    /// Two in-plane tangents `(u, v)` with `u × v` equal to the face normal.
    ///
    /// Corners listed as `-u-v, +u-v, +u+v, -u+v` wind counter-clockwise when the
    /// face is viewed from outside the cube.
    pub fn tangents(&self) -> (Vector3<f32>, Vector3<f32>) {
        let x = Vector3::unit_x();
        let y = Vector3::unit_y();
        let z = Vector3::unit_z();
        match self {
            BlockSide::RIGHT => (y, z),
            BlockSide::LEFT => (z, y),
            BlockSide::TOP => (z, x),
            BlockSide::BOTTOM => (x, z),
            BlockSide::FRONT => (x, y),
            BlockSide::BACK => (y, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn tangents_wind_outwards() {
        for side in BlockSide::all() {
            let (u, v) = side.tangents();
            let n = u.cross(v);
            assert_eq!(n, side.normal_f32(), "{side:?}");
            assert_eq!(n.magnitude(), 1.0);
        }
    }

    #[test]
    fn axis_lookup_matches_normals() {
        for axis in 0..3 {
            for positive in [true, false] {
                let side = BlockSide::from_axis(axis, positive).unwrap();
                let expected = if positive { 1 } else { -1 };
                assert_eq!(side.normal()[axis], expected);
            }
        }
        assert_eq!(BlockSide::from_axis(3, true), None);
    }
}
