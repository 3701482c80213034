//! Execution backends for the VOP pipeline stages

use vopcrate_core::{Vector3f, VoxelLocation, VoxelScene};

use crate::color::convert_patch_to_lab;
use crate::config::VopConfig;
use crate::frames::TangentFrame;
use crate::heights::voxel_height;
use crate::normals::calculate_surface_normal;
use crate::orientation::{compute_histogram_for_patch, dominant_orientation};
use crate::patches::generate_rgb_patch;

/// The per-batch stages a VOP feature calculator delegates to
///
/// Every stage works on the first `N` entries of the calculator's scratch buffers, where
/// `N` is the number of voxel locations in the batch. `features` always holds exactly
/// `N` descriptors of `config.feature_count()` floats each. Stages are independent across
/// voxels: an implementation may process voxels in any order or concurrently, as long as
/// each voxel only writes its own slots.
pub trait VopBackend: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Write one unit surface normal per voxel location into `normals`
    fn calculate_surface_normals(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        normals: &mut [Vector3f],
    );

    /// Build a tangent frame for each normal
    fn generate_coordinate_systems(&self, normals: &[Vector3f], frames: &mut [TangentFrame]);

    /// Sample the RGB patch of each voxel into the patch segment of its descriptor
    fn generate_rgb_patches(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        frames: &[TangentFrame],
        config: &VopConfig,
        features: &mut [f32],
    );

    /// Rotate each frame to the dominant orientation of its voxel's RGB patch
    ///
    /// `histograms` holds `config.bin_count` accumulators per voxel.
    fn update_coordinate_systems(
        &self,
        features: &[f32],
        config: &VopConfig,
        histograms: &mut [f32],
        frames: &mut [TangentFrame],
    );

    /// Convert the patch segment of every descriptor from RGB to CIELab
    fn convert_patches_to_lab(&self, config: &VopConfig, features: &mut [f32]);

    /// Write each voxel's height into the last slot of its descriptor
    fn fill_in_heights(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        config: &VopConfig,
        features: &mut [f32],
    );
}

/// Backend that runs every stage on the calling thread, one voxel after another
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuSequentialBackend;

impl VopBackend for CpuSequentialBackend {
    fn name(&self) -> &'static str {
        "cpu-sequential"
    }

    fn calculate_surface_normals(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        normals: &mut [Vector3f],
    ) {
        for (normal, location) in normals.iter_mut().zip(locations) {
            *normal = calculate_surface_normal(location, scene);
        }
    }

    fn generate_coordinate_systems(&self, normals: &[Vector3f], frames: &mut [TangentFrame]) {
        for (frame, normal) in frames.iter_mut().zip(normals) {
            *frame = TangentFrame::from_normal(normal);
        }
    }

    fn generate_rgb_patches(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        frames: &[TangentFrame],
        config: &VopConfig,
        features: &mut [f32],
    ) {
        let patch_len = config.patch_feature_count();
        for ((descriptor, location), frame) in features
            .chunks_exact_mut(config.feature_count())
            .zip(locations)
            .zip(frames)
        {
            generate_rgb_patch(
                location,
                scene,
                frame,
                config.patch_size,
                config.patch_spacing,
                &mut descriptor[..patch_len],
            );
        }
    }

    fn update_coordinate_systems(
        &self,
        features: &[f32],
        config: &VopConfig,
        histograms: &mut [f32],
        frames: &mut [TangentFrame],
    ) {
        let patch_len = config.patch_feature_count();
        for ((descriptor, histogram), frame) in features
            .chunks_exact(config.feature_count())
            .zip(histograms.chunks_exact_mut(config.bin_count))
            .zip(frames.iter_mut())
        {
            compute_histogram_for_patch(&descriptor[..patch_len], config.patch_size, histogram);
            frame.rotate(dominant_orientation(histogram));
        }
    }

    fn convert_patches_to_lab(&self, config: &VopConfig, features: &mut [f32]) {
        let patch_len = config.patch_feature_count();
        for descriptor in features.chunks_exact_mut(config.feature_count()) {
            convert_patch_to_lab(&mut descriptor[..patch_len]);
        }
    }

    fn fill_in_heights(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        config: &VopConfig,
        features: &mut [f32],
    ) {
        let height_index = config.feature_count() - 1;
        for (descriptor, location) in features.chunks_exact_mut(config.feature_count()).zip(locations) {
            descriptor[height_index] = voxel_height(location, scene);
        }
    }
}
