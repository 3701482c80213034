//! Core traits for VopCrate

use crate::{point::*, voxel::Voxel};

/// Read-only access to a volumetric scene
///
/// Implementors provide the spatial index lookup; the interpolated queries used by the
/// descriptor pipeline are derived from it. The pipeline never mutates a scene, so
/// implementations only need shared access and must be safe to query from many threads.
pub trait VoxelScene: Send + Sync {
    /// Side length of a voxel in world units
    fn voxel_size(&self) -> f32;

    /// Look up the voxel stored at a location, if the index contains one
    fn lookup(&self, location: &VoxelLocation) -> Option<Voxel>;

    /// World-space position of a voxel's center
    fn world_position(&self, location: &VoxelLocation) -> Point3f {
        location.to_point() * self.voxel_size()
    }

    /// Signed distance of an observed voxel
    fn sdf_at(&self, location: &VoxelLocation) -> Option<f32> {
        self.lookup(location)
            .filter(Voxel::is_observed)
            .map(|voxel| voxel.sdf)
    }

    /// Color at an arbitrary world-space position, trilinearly interpolated
    ///
    /// Returns `None` if any of the eight surrounding voxels is missing, unobserved or
    /// outside the index space.
    fn sample_color(&self, position: &Point3f) -> Option<Vector3f> {
        let p = *position / self.voxel_size();
        let origin = VoxelLocation::containing(&p)?;
        let frac = p - origin.to_point();

        let mut color = Vector3f::zeros();
        for corner in 0..8 {
            let (dx, dy, dz) = (corner & 1, (corner >> 1) & 1, (corner >> 2) & 1);
            let voxel = self
                .lookup(&origin.checked_offset(dx, dy, dz)?)
                .filter(Voxel::is_observed)?;

            let wx = if dx == 1 { frac.x } else { 1.0 - frac.x };
            let wy = if dy == 1 { frac.y } else { 1.0 - frac.y };
            let wz = if dz == 1 { frac.z } else { 1.0 - frac.z };
            color += voxel.color_f32() * (wx * wy * wz);
        }

        Some(color)
    }
}
