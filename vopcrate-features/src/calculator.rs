//! VOP feature calculation
//!
//! [`VopFeatureCalculator`] owns the per-batch scratch buffers and runs the descriptor
//! pipeline through a [`VopBackend`]:
//!
//! 1. estimate a surface normal per voxel;
//! 2. build a tangent frame from each normal;
//! 3. sample an RGB patch in each tangent plane;
//! 4. rotate each frame to the dominant gradient orientation of its patch;
//! 5. re-sample the patch in the aligned frame;
//! 6. convert the retained patch to CIELab;
//! 7. append the voxel's height.
//!
//! Each stage completes for the whole batch before the next starts.

use log::{debug, trace, warn};
use vopcrate_core::{Error, Result, Vector3f, VoxelLocation, VoxelScene};

use crate::backend::VopBackend;
use crate::config::VopConfig;
use crate::diagnostics::{DiagnosticsPort, ImageDumpDiagnostics};
use crate::frames::TangentFrame;

/// Computes fixed-length descriptors for batches of voxels
pub trait FeatureCalculator: Send {
    /// Compute the descriptors of `locations` into `features`
    ///
    /// Descriptor `i` is written to `features[i * L..(i + 1) * L]` with
    /// `L = self.feature_count()`. `features` must hold at least `locations.len() * L`
    /// floats; anything beyond that is left untouched. On error nothing is written.
    fn calculate_features(
        &mut self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        features: &mut [f32],
    ) -> Result<()>;

    /// Length of a single descriptor
    fn feature_count(&self) -> usize;

    /// Compute the descriptors of `locations` into a freshly allocated buffer
    fn calculate_features_to_vec(
        &mut self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
    ) -> Result<Vec<f32>> {
        let mut features = vec![0.0; locations.len() * self.feature_count()];
        self.calculate_features(locations, scene, &mut features)?;
        Ok(features)
    }
}

/// VOP feature calculator generic over its execution backend
///
/// # Example
/// ```rust
/// use vopcrate_core::{SparseVoxelScene, Voxel, VoxelLocation};
/// use vopcrate_features::{CpuSequentialBackend, FeatureCalculator, VopConfig, VopFeatureCalculator};
///
/// fn main() -> vopcrate_core::Result<()> {
///     let scene = SparseVoxelScene::from_fn(
///         0.01,
///         VoxelLocation::new(-6, -6, -2),
///         VoxelLocation::new(6, 6, 2),
///         |loc| Some(Voxel::observed(loc.z as f32 * 0.01, [30, 160, 60])),
///     )?;
///
///     let config = VopConfig::new(16, 5, 0.01, 8);
///     let mut calculator = VopFeatureCalculator::new(CpuSequentialBackend, config)?;
///     assert_eq!(calculator.feature_count(), 76);
///
///     let features = calculator.calculate_features_to_vec(&[VoxelLocation::new(0, 0, 0)], &scene)?;
///     assert_eq!(features.len(), 76);
///     Ok(())
/// }
/// ```
pub struct VopFeatureCalculator<B: VopBackend> {
    backend: B,
    config: VopConfig,
    surface_normals: Vec<Vector3f>,
    frames: Vec<TangentFrame>,
    histograms: Vec<f32>,
    diagnostics: Option<Box<dyn DiagnosticsPort>>,
}

impl<B: VopBackend> VopFeatureCalculator<B> {
    /// Create a calculator, allocating scratch space for `config.max_voxel_location_count` voxels
    ///
    /// If the configuration enables diagnostics, an [`ImageDumpDiagnostics`] port is attached.
    pub fn new(backend: B, config: VopConfig) -> Result<Self> {
        config.validate()?;

        let capacity = config.max_voxel_location_count;
        let diagnostics: Option<Box<dyn DiagnosticsPort>> = if config.diagnostics.enabled {
            Some(Box::new(ImageDumpDiagnostics::from_config(&config.diagnostics)))
        } else {
            None
        };

        Ok(Self {
            backend,
            surface_normals: vec![Vector3f::zeros(); capacity],
            frames: vec![TangentFrame::default(); capacity],
            histograms: vec![0.0; capacity * config.bin_count],
            config,
            diagnostics,
        })
    }

    /// Attach a diagnostics port, replacing any existing one
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn DiagnosticsPort>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Detach the diagnostics port
    pub fn disable_diagnostics(&mut self) {
        self.diagnostics = None;
    }

    pub fn config(&self) -> &VopConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Maximum number of voxel locations per batch
    pub fn capacity(&self) -> usize {
        self.config.max_voxel_location_count
    }

    fn check_batch(&self, voxel_count: usize, buffer_len: usize) -> Result<usize> {
        if voxel_count > self.capacity() {
            return Err(Error::BatchTooLarge {
                count: voxel_count,
                capacity: self.capacity(),
            });
        }

        let required = voxel_count * self.config.feature_count();
        if buffer_len < required {
            return Err(Error::FeatureBufferTooSmall {
                required,
                actual: buffer_len,
            });
        }

        Ok(required)
    }
}

impl<B: VopBackend> FeatureCalculator for VopFeatureCalculator<B> {
    fn calculate_features(
        &mut self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        features: &mut [f32],
    ) -> Result<()> {
        let voxel_count = locations.len();
        let required = self.check_batch(voxel_count, features.len())?;
        if voxel_count == 0 {
            return Ok(());
        }

        debug!(
            "calculating VOP features for {} voxels on {}",
            voxel_count,
            self.backend.name()
        );

        let config = &self.config;
        let features = &mut features[..required];
        let normals = &mut self.surface_normals[..voxel_count];
        let frames = &mut self.frames[..voxel_count];
        let histograms = &mut self.histograms[..voxel_count * config.bin_count];

        trace!("estimating surface normals");
        self.backend.calculate_surface_normals(locations, scene, normals);

        trace!("building tangent frames");
        self.backend.generate_coordinate_systems(normals, frames);

        trace!("sampling patches in the initial frames");
        self.backend.generate_rgb_patches(locations, scene, frames, config, features);

        trace!("aligning frames to dominant orientations");
        self.backend.update_coordinate_systems(features, config, histograms, frames);

        trace!("sampling patches in the aligned frames");
        self.backend.generate_rgb_patches(locations, scene, frames, config, features);

        trace!("converting patches to CIELab");
        self.backend.convert_patches_to_lab(config, features);

        trace!("filling in heights");
        self.backend.fill_in_heights(locations, scene, config, features);

        if let Some(diagnostics) = self.diagnostics.as_mut() {
            if let Err(e) = diagnostics.on_features(features, voxel_count, config) {
                warn!("feature diagnostics failed: {}", e);
            }
        }

        Ok(())
    }

    fn feature_count(&self) -> usize {
        self.config.feature_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuSequentialBackend;
    use std::sync::{Arc, Mutex};
    use vopcrate_core::{SparseVoxelScene, Voxel};

    fn floor_scene() -> SparseVoxelScene {
        SparseVoxelScene::from_fn(
            0.01,
            VoxelLocation::new(-10, -10, -3),
            VoxelLocation::new(10, 10, 3),
            |loc| Some(Voxel::observed(loc.z as f32 * 0.01, [180, 90, 30])),
        )
        .unwrap()
    }

    fn calculator(capacity: usize) -> VopFeatureCalculator<CpuSequentialBackend> {
        VopFeatureCalculator::new(CpuSequentialBackend, VopConfig::new(capacity, 5, 0.01, 8)).unwrap()
    }

    #[derive(Clone, Default)]
    struct RecordingPort {
        batches: Arc<Mutex<Vec<usize>>>,
    }

    impl DiagnosticsPort for RecordingPort {
        fn on_features(&mut self, _features: &[f32], voxel_count: usize, _config: &VopConfig) -> Result<()> {
            self.batches.lock().unwrap().push(voxel_count);
            Ok(())
        }
    }

    struct FailingPort;

    impl DiagnosticsPort for FailingPort {
        fn on_features(&mut self, _features: &[f32], _voxel_count: usize, _config: &VopConfig) -> Result<()> {
            Err(Error::Visualization("no display".to_string()))
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = VopFeatureCalculator::new(CpuSequentialBackend, VopConfig::new(10, 4, 0.01, 8));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_scratch_buffers_sized_to_capacity() {
        let calc = calculator(7);
        assert_eq!(calc.surface_normals.len(), 7);
        assert_eq!(calc.frames.len(), 7);
        assert_eq!(calc.histograms.len(), 7 * 8);
    }

    #[test]
    fn test_batch_too_large_leaves_buffer_untouched() {
        let scene = floor_scene();
        let mut calc = calculator(2);
        let locations = vec![VoxelLocation::new(0, 0, 0); 3];
        let mut features = vec![-7.0; 3 * calc.feature_count()];

        let err = calc.calculate_features(&locations, &scene, &mut features).unwrap_err();
        assert!(matches!(err, Error::BatchTooLarge { count: 3, capacity: 2 }));
        assert!(features.iter().all(|v| *v == -7.0));
    }

    #[test]
    fn test_small_buffer_rejected() {
        let scene = floor_scene();
        let mut calc = calculator(4);
        let locations = vec![VoxelLocation::new(0, 0, 0); 2];
        let mut features = vec![0.0; 2 * calc.feature_count() - 1];

        let err = calc.calculate_features(&locations, &scene, &mut features).unwrap_err();
        assert!(matches!(err, Error::FeatureBufferTooSmall { required: 152, actual: 151 }));
    }

    #[test]
    fn test_oversized_buffer_tail_untouched() {
        let scene = floor_scene();
        let mut calc = calculator(4);
        let l = calc.feature_count();
        let mut features = vec![-1.0; 4 * l];

        calc.calculate_features(&[VoxelLocation::new(1, 1, 0)], &scene, &mut features).unwrap();
        assert!(features[l..].iter().all(|v| *v == -1.0));
        assert!(features[..l].iter().all(|v| *v != -1.0));
    }

    #[test]
    fn test_empty_batch() {
        let scene = floor_scene();
        let mut calc = calculator(4);
        let features = calc.calculate_features_to_vec(&[], &scene).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_diagnostics_receive_each_batch() {
        let scene = floor_scene();
        let port = RecordingPort::default();
        let mut calc = calculator(4).with_diagnostics(Box::new(port.clone()));

        calc.calculate_features_to_vec(&[VoxelLocation::new(0, 0, 0)], &scene).unwrap();
        calc.calculate_features_to_vec(&[VoxelLocation::new(0, 0, 0); 3], &scene).unwrap();
        assert_eq!(*port.batches.lock().unwrap(), vec![1, 3]);

        calc.disable_diagnostics();
        calc.calculate_features_to_vec(&[VoxelLocation::new(0, 0, 0)], &scene).unwrap();
        assert_eq!(port.batches.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_diagnostics_failure_does_not_affect_features() {
        let scene = floor_scene();
        let locations = [VoxelLocation::new(0, 0, 0), VoxelLocation::new(2, -3, 1)];

        let expected = calculator(4).calculate_features_to_vec(&locations, &scene).unwrap();
        let mut failing = calculator(4).with_diagnostics(Box::new(FailingPort));
        let actual = failing.calculate_features_to_vec(&locations, &scene).unwrap();
        assert_eq!(actual, expected);
    }
}
