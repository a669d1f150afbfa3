//! Color transfer helpers shared by the CPU model and the lit-material shaders.

use glam::{Mat3, Vec3};

/// Decodes an sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encodes a linear channel as sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn rrt_and_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + 0.024_578_6) - 0.000_090_537;
    let b = v * (0.983_729 * v + 0.432_951) + 0.238_081;
    a / b
}

/// ACES filmic tone mapping (Stephen Hill's fit) with an exposure multiplier.
///
/// Matches the curve used by `cloud.wgsl`. Output is clamped to `[0, 1]`.
pub fn aces_filmic(color: Vec3, exposure: f32) -> Vec3 {
    let input = Mat3::from_cols(
        Vec3::new(0.597_19, 0.076_00, 0.028_40),
        Vec3::new(0.354_58, 0.908_34, 0.133_83),
        Vec3::new(0.048_23, 0.015_66, 0.837_77),
    );
    let output = Mat3::from_cols(
        Vec3::new(1.604_75, -0.102_08, -0.003_27),
        Vec3::new(-0.531_08, 1.108_13, -0.072_76),
        Vec3::new(-0.073_67, -0.006_05, 1.076_02),
    );

    let scaled = color * (exposure / 0.6);
    let fitted = rrt_and_odt_fit(input * scaled);
    (output * fitted).clamp(Vec3::ZERO, Vec3::ONE)
}
