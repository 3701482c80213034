//! RGB to CIELab conversion of patch samples

use nalgebra::Matrix3;
use vopcrate_core::Vector3f;

use crate::config::CHANNELS_PER_SAMPLE;

/// Reference white (D65, 2° observer) in XYZ
const D65_WHITE: [f32; 3] = [0.950_47, 1.0, 1.088_83];

/// CIE constant δ = 6/29
const LAB_DELTA: f32 = 6.0 / 29.0;

#[rustfmt::skip]
fn srgb_to_xyz() -> Matrix3<f32> {
    Matrix3::new(
        0.412_456_4, 0.357_576_1, 0.180_437_5,
        0.212_672_9, 0.715_152_2, 0.072_175_0,
        0.019_333_9, 0.119_192_0, 0.950_304_1,
    )
}

#[rustfmt::skip]
fn xyz_to_srgb() -> Matrix3<f32> {
    Matrix3::new(
         3.240_454_2, -1.537_138_5, -0.498_531_4,
        -0.969_266_0,  1.876_010_8,  0.041_556_0,
         0.055_643_4, -0.204_025_9,  1.057_225_2,
    )
}

fn srgb_to_linear(channel: f32) -> f32 {
    let c = (channel / 255.0).clamp(0.0, 1.0);
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(channel: f32) -> f32 {
    let c = channel.clamp(0.0, 1.0);
    let encoded = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    encoded * 255.0
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_DELTA.powi(3) {
        t.cbrt()
    } else {
        t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f32) -> f32 {
    if t > LAB_DELTA {
        t.powi(3)
    } else {
        3.0 * LAB_DELTA * LAB_DELTA * (t - 4.0 / 29.0)
    }
}

/// Convert an sRGB triplet in [0, 255] to CIELab (L in [0, 100])
///
/// # Example
/// ```rust
/// use vopcrate_features::rgb_to_lab;
///
/// let lab = rgb_to_lab([255.0, 255.0, 255.0]);
/// assert!((lab[0] - 100.0).abs() < 1e-2);
/// assert!(lab[1].abs() < 1e-2 && lab[2].abs() < 1e-2);
/// ```
pub fn rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let linear = Vector3f::new(srgb_to_linear(rgb[0]), srgb_to_linear(rgb[1]), srgb_to_linear(rgb[2]));
    let xyz = srgb_to_xyz() * linear;

    let fx = lab_f(xyz.x / D65_WHITE[0]);
    let fy = lab_f(xyz.y / D65_WHITE[1]);
    let fz = lab_f(xyz.z / D65_WHITE[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert CIELab back to sRGB in [0, 255], clamping out-of-gamut colors
///
/// Only used to display descriptors; the pipeline itself never converts back.
pub fn lab_to_rgb(lab: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = fy + lab[1] / 500.0;
    let fz = fy - lab[2] / 200.0;

    let xyz = Vector3f::new(
        D65_WHITE[0] * lab_f_inv(fx),
        D65_WHITE[1] * lab_f_inv(fy),
        D65_WHITE[2] * lab_f_inv(fz),
    );
    let linear = xyz_to_srgb() * xyz;

    [linear_to_srgb(linear.x), linear_to_srgb(linear.y), linear_to_srgb(linear.z)]
}

/// Convert every RGB sample of a patch segment to CIELab in place
pub fn convert_patch_to_lab(patch: &mut [f32]) {
    for sample in patch.chunks_exact_mut(CHANNELS_PER_SAMPLE) {
        let lab = rgb_to_lab([sample[0], sample[1], sample[2]]);
        sample.copy_from_slice(&lab);
    }
}
