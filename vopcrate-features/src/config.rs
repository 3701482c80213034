//! Configuration for VOP feature calculation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use vopcrate_core::{Error, Result};

/// Number of color channels stored per patch sample
pub const CHANNELS_PER_SAMPLE: usize = 3;

/// Construction-time parameters of a VOP feature calculator
///
/// A configuration is immutable once handed to a calculator; the descriptor length it
/// implies stays constant for the calculator's whole lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VopConfig {
    /// Maximum number of voxel locations per batch; scratch buffers are sized to this
    pub max_voxel_location_count: usize,
    /// Side length of a patch in samples (must be odd)
    pub patch_size: usize,
    /// Distance in world units between adjacent patch samples
    pub patch_spacing: f32,
    /// Number of orientation bins used when aligning patches
    pub bin_count: usize,
    /// Optional debugging output
    pub diagnostics: DiagnosticsConfig,
}

impl VopConfig {
    /// Create a configuration with diagnostics disabled
    pub fn new(max_voxel_location_count: usize, patch_size: usize, patch_spacing: f32, bin_count: usize) -> Self {
        Self {
            max_voxel_location_count,
            patch_size,
            patch_spacing,
            bin_count,
            diagnostics: DiagnosticsConfig::default(),
        }
    }

    /// Set the batch capacity
    pub fn with_max_voxel_location_count(mut self, count: usize) -> Self {
        self.max_voxel_location_count = count;
        self
    }

    /// Set the patch side length
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Set the world-space spacing between patch samples
    pub fn with_patch_spacing(mut self, patch_spacing: f32) -> Self {
        self.patch_spacing = patch_spacing;
        self
    }

    /// Set the number of orientation bins
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    /// Set the diagnostics configuration
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Number of floats in the patch segment of a descriptor
    pub fn patch_feature_count(&self) -> usize {
        self.patch_size * self.patch_size * CHANNELS_PER_SAMPLE
    }

    /// Length of a full descriptor: the patch segment followed by one height value
    pub fn feature_count(&self) -> usize {
        self.patch_feature_count() + 1
    }

    /// Check that the configuration describes a usable calculator
    pub fn validate(&self) -> Result<()> {
        if self.max_voxel_location_count == 0 {
            return Err(Error::InvalidData(
                "max_voxel_location_count must be greater than 0".to_string()
            ));
        }

        if self.patch_size == 0 || self.patch_size % 2 == 0 {
            return Err(Error::InvalidData(format!(
                "patch_size must be odd, got {}",
                self.patch_size
            )));
        }

        if !self.patch_spacing.is_finite() || self.patch_spacing <= 0.0 {
            return Err(Error::InvalidData(
                "patch_spacing must be positive and finite".to_string()
            ));
        }

        if self.bin_count == 0 {
            return Err(Error::InvalidData(
                "bin_count must be greater than 0".to_string()
            ));
        }

        self.diagnostics.validate()
    }
}

impl Default for VopConfig {
    fn default() -> Self {
        Self::new(8192, 13, 0.01, 36)
    }
}

/// Settings for the optional descriptor visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Render descriptors after every batch
    pub enabled: bool,
    /// Directory that receives the rendered mosaics
    pub output_dir: Option<PathBuf>,
    /// Delay after each rendered batch, in milliseconds (0 = no delay)
    pub frame_delay_ms: u64,
    /// Maximum mosaic width in pixels; descriptors that do not fit are not drawn
    pub max_mosaic_width: u32,
}

impl DiagnosticsConfig {
    /// Enabled diagnostics writing into `output_dir`
    pub fn to_directory(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            output_dir: Some(output_dir.into()),
            ..Self::default()
        }
    }

    /// Set the delay between consecutive batches
    pub fn with_frame_delay_ms(mut self, frame_delay_ms: u64) -> Self {
        self.frame_delay_ms = frame_delay_ms;
        self
    }

    /// Set the maximum mosaic width
    pub fn with_max_mosaic_width(mut self, width: u32) -> Self {
        self.max_mosaic_width = width;
        self
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.max_mosaic_width == 0 {
            return Err(Error::InvalidData(
                "max_mosaic_width must be greater than 0".to_string()
            ));
        }
        Ok(())
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: None,
            frame_delay_ms: 0,
            max_mosaic_width: 1024,
        }
    }
}
