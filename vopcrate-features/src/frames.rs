//! Tangent-plane coordinate frames

use vopcrate_core::Vector3f;

use crate::normals::DEFAULT_NORMAL;

/// Beyond this |n · up| the up axis is considered parallel to the normal
const PARALLEL_THRESHOLD: f32 = 0.9;

/// Orthonormal axes spanning the tangent plane of a surface
///
/// The frame is right-handed with respect to its normal: `x_axis × y_axis = normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub x_axis: Vector3f,
    pub y_axis: Vector3f,
}

impl TangentFrame {
    /// Build a frame perpendicular to `normal`
    ///
    /// The x axis is `up × normal` with world `+Z` as up, or `+X` when the normal is
    /// nearly vertical. A degenerate normal is replaced by the default normal.
    pub fn from_normal(normal: &Vector3f) -> Self {
        let normal = normal
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vector3f::from(DEFAULT_NORMAL));

        let reference = if normal.dot(&Vector3f::z()).abs() > PARALLEL_THRESHOLD {
            Vector3f::x()
        } else {
            Vector3f::z()
        };

        let x_axis = reference.cross(&normal).normalize();
        let y_axis = normal.cross(&x_axis);
        Self { x_axis, y_axis }
    }

    /// The surface normal the frame was built from
    pub fn normal(&self) -> Vector3f {
        self.x_axis.cross(&self.y_axis)
    }

    /// Rotate both axes by `angle` radians within the tangent plane
    ///
    /// Afterwards the x axis points along the direction that was at `angle` in the
    /// old frame.
    pub fn rotate(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let x_axis = self.x_axis * cos + self.y_axis * sin;
        let y_axis = self.y_axis * cos - self.x_axis * sin;
        self.x_axis = x_axis;
        self.y_axis = y_axis;
    }
}

impl Default for TangentFrame {
    fn default() -> Self {
        Self {
            x_axis: Vector3f::x(),
            y_axis: Vector3f::y(),
        }
    }
}
