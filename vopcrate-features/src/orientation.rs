//! Dominant orientation of a patch from its gradient histogram

use std::f32::consts::TAU;

use crate::config::CHANNELS_PER_SAMPLE;

/// Rec. 601 luma of an RGB sample
pub fn luminance(rgb: &[f32]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

/// Histogram bin containing an angle in radians
pub fn orientation_bin(angle: f32, bin_count: usize) -> usize {
    let angle = angle.rem_euclid(TAU);
    let bin = (angle / TAU * bin_count as f32) as usize;
    bin.min(bin_count - 1)
}

/// Angle at the centre of a histogram bin
pub fn bin_center(bin: usize, bin_count: usize) -> f32 {
    (bin as f32 + 0.5) * TAU / bin_count as f32
}

/// Accumulate the gradient orientation histogram of an RGB patch
///
/// Gradients are central differences of luminance over the interior samples, with
/// `dx` along the patch columns and `dy` along its rows. Each gradient adds its
/// magnitude to the bin of `atan2(dy, dx)`; `histogram.len()` is the bin count.
pub fn compute_histogram_for_patch(patch: &[f32], patch_size: usize, histogram: &mut [f32]) {
    histogram.fill(0.0);
    let bin_count = histogram.len();
    if bin_count == 0 || patch_size < 3 {
        return;
    }

    let intensity = |row: usize, col: usize| {
        let offset = (row * patch_size + col) * CHANNELS_PER_SAMPLE;
        luminance(&patch[offset..offset + CHANNELS_PER_SAMPLE])
    };

    for row in 1..patch_size - 1 {
        for col in 1..patch_size - 1 {
            let dx = intensity(row, col + 1) - intensity(row, col - 1);
            let dy = intensity(row + 1, col) - intensity(row - 1, col);
            let magnitude = (dx * dx + dy * dy).sqrt();
            if magnitude > 0.0 && magnitude.is_finite() {
                histogram[orientation_bin(dy.atan2(dx), bin_count)] += magnitude;
            }
        }
    }
}

/// Index of the bin with the largest accumulated magnitude, lowest index on ties
pub fn dominant_bin(histogram: &[f32]) -> usize {
    let mut best = 0;
    for (bin, value) in histogram.iter().enumerate().skip(1) {
        if *value > histogram[best] {
            best = bin;
        }
    }
    best
}

/// Centre angle of the dominant histogram bin
pub fn dominant_orientation(histogram: &[f32]) -> f32 {
    bin_center(dominant_bin(histogram), histogram.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    /// Patch whose luminance is a linear ramp rising towards `angle`
    fn ramp_patch(patch_size: usize, angle: f32) -> Vec<f32> {
        let half = (patch_size / 2) as f32;
        let (sin, cos) = angle.sin_cos();
        let mut patch = Vec::with_capacity(patch_size * patch_size * 3);
        for row in 0..patch_size {
            for col in 0..patch_size {
                let v = 128.0 + 10.0 * ((col as f32 - half) * cos + (row as f32 - half) * sin);
                patch.extend_from_slice(&[v, v, v]);
            }
        }
        patch
    }

    /// Patch with a soft edge through its centre whose bright side faces `angle`
    fn edge_patch(patch_size: usize, angle: f32) -> Vec<f32> {
        let half = (patch_size / 2) as f32;
        let (sin, cos) = angle.sin_cos();
        let mut patch = Vec::with_capacity(patch_size * patch_size * 3);
        for row in 0..patch_size {
            for col in 0..patch_size {
                let d = (col as f32 - half) * cos + (row as f32 - half) * sin;
                let v = 125.0 + 95.0 * (d / 2.0).tanh();
                patch.extend_from_slice(&[v, v, v]);
            }
        }
        patch
    }

    fn angular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_orientation_bin_wraps() {
        assert_eq!(orientation_bin(0.0, 8), 0);
        assert_eq!(orientation_bin(PI / 2.0, 8), 2);
        assert_eq!(orientation_bin(-PI / 8.0, 8), 7);
        assert_eq!(orientation_bin(-1e-9, 8), 7);
        assert_eq!(orientation_bin(TAU, 8), 0);
    }

    #[test]
    fn test_bin_center() {
        assert_relative_eq!(bin_center(0, 8), PI / 8.0);
        assert_relative_eq!(bin_center(7, 8), 15.0 * PI / 8.0);
    }

    #[test]
    fn test_ties_pick_lowest_bin() {
        assert_eq!(dominant_bin(&[0.0, 3.0, 1.0, 3.0]), 1);
        assert_eq!(dominant_bin(&[0.0; 6]), 0);
        assert_relative_eq!(dominant_orientation(&[0.0; 4]), PI / 4.0);
    }

    #[test]
    fn test_flat_patch_has_empty_histogram() {
        let patch = vec![50.0; 5 * 5 * 3];
        let mut histogram = vec![1.0; 8];
        compute_histogram_for_patch(&patch, 5, &mut histogram);
        assert!(histogram.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_ramp_orientation_within_one_bin() {
        let bin_count = 36;
        let bin_width = TAU / bin_count as f32;
        let mut histogram = vec![0.0; bin_count];

        for step in 0..24 {
            let angle = step as f32 * TAU / 24.0 + 0.05;
            compute_histogram_for_patch(&ramp_patch(9, angle), 9, &mut histogram);
            let found = dominant_orientation(&histogram);
            assert!(
                angular_distance(found, angle) <= bin_width,
                "angle {} found {}",
                angle,
                found
            );
        }
    }

    #[test]
    fn test_edge_orientation_within_one_bin() {
        let bin_count = 8;
        let bin_width = TAU / bin_count as f32;
        let mut histogram = vec![0.0; bin_count];

        for bin in [0, 2, 3, 5, 7] {
            let angle = bin_center(bin, bin_count) + 0.05;
            compute_histogram_for_patch(&edge_patch(11, angle), 11, &mut histogram);
            let found = dominant_orientation(&histogram);
            assert!(
                angular_distance(found, angle) <= bin_width,
                "angle {} found {}",
                angle,
                found
            );
        }
    }

    #[test]
    fn test_tiny_patch_has_no_interior() {
        let patch = ramp_patch(1, 0.0);
        let mut histogram = vec![5.0; 4];
        compute_histogram_for_patch(&patch, 1, &mut histogram);
        assert_eq!(histogram, vec![0.0; 4]);
    }
}
