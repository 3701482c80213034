//! Optional descriptor visualization
//!
//! Diagnostics are strictly best-effort: a calculator reports failures from its
//! [`DiagnosticsPort`] through the log and carries on, so descriptors never depend on
//! whether rendering worked.

use image::{Rgb, RgbImage};
use std::path::PathBuf;
use std::time::Duration;
use vopcrate_core::{Error, Result};

use crate::color::lab_to_rgb;
use crate::config::{DiagnosticsConfig, VopConfig, CHANNELS_PER_SAMPLE};

/// Receiver for the descriptors of each completed batch
pub trait DiagnosticsPort: Send {
    /// Called once per batch with the `voxel_count` finished descriptors
    fn on_features(&mut self, features: &[f32], voxel_count: usize, config: &VopConfig) -> Result<()>;
}

/// Renders the patch segments of a batch of descriptors as a tiled image
///
/// Each descriptor becomes a `patch_size × patch_size` tile, converted from Lab back to
/// RGB. Tiles are laid out left to right with a one pixel gap and wrap onto new rows.
/// The image is limited to `max_width` pixels in both directions; descriptors that do
/// not fit are not drawn.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMosaic {
    pub patch_size: usize,
    pub max_width: u32,
}

impl FeatureMosaic {
    pub fn new(patch_size: usize, max_width: u32) -> Self {
        Self { patch_size, max_width }
    }

    /// Number of tiles per row and the maximum number of rows
    pub fn grid(&self) -> Result<(usize, usize)> {
        let pitch = self.patch_size + 1;
        let tiles = (self.max_width as usize).saturating_sub(1) / pitch;
        if self.patch_size == 0 || tiles == 0 {
            return Err(Error::Visualization(format!(
                "a mosaic {} pixels wide cannot hold a {}x{} patch",
                self.max_width, self.patch_size, self.patch_size
            )));
        }
        Ok((tiles, tiles))
    }

    /// Render the first descriptors of `features` that fit into the mosaic
    pub fn render(&self, features: &[f32], voxel_count: usize, feature_count: usize) -> Result<RgbImage> {
        let (columns, max_rows) = self.grid()?;
        let shown = voxel_count.min(columns * max_rows);
        if shown == 0 {
            return Ok(RgbImage::new(1, 1));
        }

        let used_columns = shown.min(columns);
        let rows = shown.div_ceil(columns);
        let pitch = self.patch_size + 1;
        let mut image = RgbImage::new((used_columns * pitch + 1) as u32, (rows * pitch + 1) as u32);

        for (index, descriptor) in features.chunks_exact(feature_count).take(shown).enumerate() {
            let tile_x = (index % columns) * pitch + 1;
            let tile_y = (index / columns) * pitch + 1;

            for (sample_index, lab) in descriptor
                .chunks_exact(CHANNELS_PER_SAMPLE)
                .take(self.patch_size * self.patch_size)
                .enumerate()
            {
                let rgb = lab_to_rgb([lab[0], lab[1], lab[2]]);
                let x = tile_x + sample_index % self.patch_size;
                let y = tile_y + sample_index / self.patch_size;
                image.put_pixel(
                    x as u32,
                    y as u32,
                    Rgb([rgb[0].round() as u8, rgb[1].round() as u8, rgb[2].round() as u8]),
                );
            }
        }

        Ok(image)
    }
}

/// Diagnostics that save one mosaic image per batch into a directory
#[derive(Debug, Clone)]
pub struct ImageDumpDiagnostics {
    output_dir: PathBuf,
    frame_delay: Duration,
    max_width: u32,
    frame: u64,
}

impl ImageDumpDiagnostics {
    pub fn new(output_dir: impl Into<PathBuf>, frame_delay: Duration, max_width: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            frame_delay,
            max_width,
            frame: 0,
        }
    }

    /// Build from a diagnostics configuration, writing to the system temp directory
    /// when no output directory is given
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        let output_dir = config
            .output_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("vopcrate-diagnostics"));
        Self::new(output_dir, config.frame_delay(), config.max_mosaic_width)
    }

    /// Number of batches rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn frame_path(&self) -> PathBuf {
        self.output_dir.join(format!("features_{:06}.png", self.frame))
    }
}

impl DiagnosticsPort for ImageDumpDiagnostics {
    fn on_features(&mut self, features: &[f32], voxel_count: usize, config: &VopConfig) -> Result<()> {
        let mosaic = FeatureMosaic::new(config.patch_size, self.max_width);
        let image = mosaic.render(features, voxel_count, config.feature_count())?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.frame_path();
        image
            .save(&path)
            .map_err(|e| Error::Visualization(format!("failed to write {}: {}", path.display(), e)))?;
        log::debug!("wrote feature mosaic {}", path.display());

        self.frame += 1;
        if !self.frame_delay.is_zero() {
            std::thread::sleep(self.frame_delay);
        }
        Ok(())
    }
}
