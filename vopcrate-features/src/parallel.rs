//! Data-parallel backend built on rayon
//!
//! Every stage is embarrassingly parallel across voxels, so each one maps directly onto a
//! rayon parallel iterator over the per-voxel slices of the batch buffers. Stages can run
//! inside a dedicated thread pool configured through [`ThreadPoolConfig`], or on rayon's
//! global pool.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use vopcrate_core::{Error, Result, Vector3f, VoxelLocation, VoxelScene};

use crate::backend::{CpuSequentialBackend, VopBackend};
use crate::color::convert_patch_to_lab;
use crate::config::VopConfig;
use crate::frames::TangentFrame;
use crate::heights::voxel_height;
use crate::normals::calculate_surface_normal;
use crate::orientation::{compute_histogram_for_patch, dominant_orientation};
use crate::patches::generate_rgb_patch;

/// Thread pool configuration for the parallel backend
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = automatic)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
}

impl ThreadPoolConfig {
    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set stack size
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Set thread name prefix
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build a dedicated thread pool from this configuration
    pub fn build_pool(&self) -> Result<ThreadPool> {
        let mut builder = ThreadPoolBuilder::new();

        if let Some(num_threads) = self.num_threads {
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        if !self.thread_name_prefix.is_empty() {
            let prefix = self.thread_name_prefix.clone();
            builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
        }

        builder
            .build()
            .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: "vopcrate-features".to_string(),
            enabled: true,
        }
    }
}

/// Backend that spreads every stage across worker threads
///
/// Produces exactly the same descriptors as [`CpuSequentialBackend`]; only the scheduling
/// of voxels differs.
#[derive(Clone)]
pub struct CpuParallelBackend {
    pool: Option<Arc<ThreadPool>>,
    enabled: bool,
}

impl CpuParallelBackend {
    /// Parallel backend running on rayon's global thread pool
    pub fn new() -> Self {
        Self {
            pool: None,
            enabled: true,
        }
    }

    /// Parallel backend with a dedicated thread pool
    pub fn with_config(config: &ThreadPoolConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self {
                pool: None,
                enabled: false,
            });
        }

        Ok(Self {
            pool: Some(Arc::new(config.build_pool()?)),
            enabled: true,
        })
    }

    /// Number of worker threads stages are spread over
    pub fn num_threads(&self) -> usize {
        match (&self.pool, self.enabled) {
            (_, false) => 1,
            (Some(pool), true) => pool.current_num_threads(),
            (None, true) => rayon::current_num_threads(),
        }
    }

    fn execute<F>(&self, op: F)
    where
        F: FnOnce() + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for CpuParallelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuParallelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuParallelBackend")
            .field("num_threads", &self.num_threads())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl VopBackend for CpuParallelBackend {
    fn name(&self) -> &'static str {
        if self.enabled {
            "cpu-parallel"
        } else {
            "cpu-parallel (disabled)"
        }
    }

    fn calculate_surface_normals(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        normals: &mut [Vector3f],
    ) {
        if !self.enabled {
            return CpuSequentialBackend.calculate_surface_normals(locations, scene, normals);
        }

        self.execute(|| {
            normals
                .par_iter_mut()
                .zip(locations.par_iter())
                .for_each(|(normal, location)| *normal = calculate_surface_normal(location, scene));
        });
    }

    fn generate_coordinate_systems(&self, normals: &[Vector3f], frames: &mut [TangentFrame]) {
        if !self.enabled {
            return CpuSequentialBackend.generate_coordinate_systems(normals, frames);
        }

        self.execute(|| {
            frames
                .par_iter_mut()
                .zip(normals.par_iter())
                .for_each(|(frame, normal)| *frame = TangentFrame::from_normal(normal));
        });
    }

    fn generate_rgb_patches(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        frames: &[TangentFrame],
        config: &VopConfig,
        features: &mut [f32],
    ) {
        if !self.enabled {
            return CpuSequentialBackend.generate_rgb_patches(locations, scene, frames, config, features);
        }

        let patch_len = config.patch_feature_count();
        self.execute(|| {
            features
                .par_chunks_exact_mut(config.feature_count())
                .zip(locations.par_iter())
                .zip(frames.par_iter())
                .for_each(|((descriptor, location), frame)| {
                    generate_rgb_patch(
                        location,
                        scene,
                        frame,
                        config.patch_size,
                        config.patch_spacing,
                        &mut descriptor[..patch_len],
                    );
                });
        });
    }

    fn update_coordinate_systems(
        &self,
        features: &[f32],
        config: &VopConfig,
        histograms: &mut [f32],
        frames: &mut [TangentFrame],
    ) {
        if !self.enabled {
            return CpuSequentialBackend.update_coordinate_systems(features, config, histograms, frames);
        }

        let patch_len = config.patch_feature_count();
        self.execute(|| {
            features
                .par_chunks_exact(config.feature_count())
                .zip(histograms.par_chunks_exact_mut(config.bin_count))
                .zip(frames.par_iter_mut())
                .for_each(|((descriptor, histogram), frame)| {
                    compute_histogram_for_patch(&descriptor[..patch_len], config.patch_size, histogram);
                    frame.rotate(dominant_orientation(histogram));
                });
        });
    }

    fn convert_patches_to_lab(&self, config: &VopConfig, features: &mut [f32]) {
        if !self.enabled {
            return CpuSequentialBackend.convert_patches_to_lab(config, features);
        }

        let patch_len = config.patch_feature_count();
        self.execute(|| {
            features
                .par_chunks_exact_mut(config.feature_count())
                .for_each(|descriptor| convert_patch_to_lab(&mut descriptor[..patch_len]));
        });
    }

    fn fill_in_heights(
        &self,
        locations: &[VoxelLocation],
        scene: &dyn VoxelScene,
        config: &VopConfig,
        features: &mut [f32],
    ) {
        if !self.enabled {
            return CpuSequentialBackend.fill_in_heights(locations, scene, config, features);
        }

        let height_index = config.feature_count() - 1;
        self.execute(|| {
            features
                .par_chunks_exact_mut(config.feature_count())
                .zip(locations.par_iter())
                .for_each(|(descriptor, location)| {
                    descriptor[height_index] = voxel_height(location, scene);
                });
        });
    }
}
