//! TSDF voxel type

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::point::Vector3f;

/// A fused TSDF voxel with color information
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Voxel {
    /// Truncated signed distance to the nearest surface (world units)
    pub sdf: f32,
    /// Integration weight; zero means the voxel has never been observed
    pub weight: f32,
    pub color: [u8; 3],
    #[serde(skip)]
    pub _padding: u8,
}

impl Voxel {
    pub fn new(sdf: f32, weight: f32, color: [u8; 3]) -> Self {
        Self {
            sdf,
            weight,
            color,
            _padding: 0,
        }
    }

    /// A voxel integrated once with the given distance and color
    pub fn observed(sdf: f32, color: [u8; 3]) -> Self {
        Self::new(sdf, 1.0, color)
    }

    pub fn is_observed(&self) -> bool {
        self.weight > 0.0
    }

    /// Color as a float RGB vector in [0, 255]
    pub fn color_f32(&self) -> Vector3f {
        Vector3f::new(self.color[0] as f32, self.color[1] as f32, self.color[2] as f32)
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::new(1.0, 0.0, [0, 0, 0])
    }
}
