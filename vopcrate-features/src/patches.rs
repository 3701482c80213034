//! Oriented RGB patch sampling

use vopcrate_core::{Vector3f, VoxelLocation, VoxelScene};

use crate::config::CHANNELS_PER_SAMPLE;
use crate::frames::TangentFrame;

/// Sample a `patch_size × patch_size` RGB patch around a voxel in its tangent plane
///
/// Sample `(row, col)` lies at `centre + ((col - h) * x_axis + (row - h) * y_axis) * spacing`
/// with `h = patch_size / 2`, and is written in row-major order into `patch`, three
/// channels per sample. Positions the scene cannot sample are written as black.
pub fn generate_rgb_patch(
    location: &VoxelLocation,
    scene: &dyn VoxelScene,
    frame: &TangentFrame,
    patch_size: usize,
    patch_spacing: f32,
    patch: &mut [f32],
) {
    debug_assert_eq!(patch.len(), patch_size * patch_size * CHANNELS_PER_SAMPLE);

    let centre = scene.world_position(location);
    let half = (patch_size / 2) as f32;
    let x_step = frame.x_axis * patch_spacing;
    let y_step = frame.y_axis * patch_spacing;

    for (index, sample) in patch.chunks_exact_mut(CHANNELS_PER_SAMPLE).enumerate() {
        let row = (index / patch_size) as f32 - half;
        let col = (index % patch_size) as f32 - half;
        let position = centre + x_step * col + y_step * row;

        let color = scene.sample_color(&position).unwrap_or_else(Vector3f::zeros);
        sample.copy_from_slice(color.as_slice());
    }
}
