//! Surface normal estimation from the scene's signed distance field

use vopcrate_core::{Vector3f, VoxelLocation, VoxelScene};

/// Normal used when a voxel has no usable neighbourhood
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Gradients shorter than this are treated as undefined
const MIN_GRADIENT_NORM: f32 = 1e-6;

/// Estimate the unit surface normal at a voxel location
///
/// The normal is the normalized central-difference gradient of the SDF over the six
/// face neighbours. If any neighbour is missing, unobserved or outside the index space,
/// or the gradient is degenerate, [`DEFAULT_NORMAL`] is returned instead, so the result
/// is always a finite unit vector.
pub fn calculate_surface_normal(location: &VoxelLocation, scene: &dyn VoxelScene) -> Vector3f {
    match sdf_gradient(location, scene) {
        Some(gradient)
            if gradient.iter().all(|c| c.is_finite()) && gradient.norm() > MIN_GRADIENT_NORM =>
        {
            gradient.normalize()
        }
        _ => Vector3f::from(DEFAULT_NORMAL),
    }
}

fn sdf_gradient(location: &VoxelLocation, scene: &dyn VoxelScene) -> Option<Vector3f> {
    let sdf = |dx: i32, dy: i32, dz: i32| {
        location
            .checked_offset(dx, dy, dz)
            .and_then(|neighbour| scene.sdf_at(&neighbour))
    };

    Some(Vector3f::new(
        sdf(1, 0, 0)? - sdf(-1, 0, 0)?,
        sdf(0, 1, 0)? - sdf(0, -1, 0)?,
        sdf(0, 0, 1)? - sdf(0, 0, -1)?,
    ))
}
