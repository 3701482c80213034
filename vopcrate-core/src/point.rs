//! Point types and voxel locations

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Discrete coordinate of a voxel in the scene's index space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VoxelLocation {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelLocation {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Location offset by the given number of voxels along each axis
    ///
    /// Returns `None` if the neighbour is not representable in the index space.
    pub fn checked_offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// Location containing a point given in voxel units
    ///
    /// Returns `None` for non-finite points and points outside the index space.
    pub fn containing(point: &Point3f) -> Option<Self> {
        let index = |v: f32| {
            let v = v.floor();
            // i32::MAX as f32 rounds up to 2^31
            (v.is_finite() && v >= i32::MIN as f32 && v < i32::MAX as f32).then(|| v as i32)
        };
        Some(Self::new(index(point.x)?, index(point.y)?, index(point.z)?))
    }

    /// Location as a floating point point in voxel units
    pub fn to_point(&self) -> Point3f {
        Point3f::new(self.x as f32, self.y as f32, self.z as f32)
    }
}
