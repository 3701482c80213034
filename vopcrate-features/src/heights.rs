//! Height feature

use vopcrate_core::{VoxelLocation, VoxelScene};

/// Height of a voxel: its vertical (z) world coordinate
pub fn voxel_height(location: &VoxelLocation, scene: &dyn VoxelScene) -> f32 {
    scene.world_position(location).z
}
