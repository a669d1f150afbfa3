//! The per-frame input bundle of the day/night shader and its GPU layout.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};

/// Everything the shading model reads besides textures and geometry.
///
/// Written once per tick by the animation loop; this is the only channel
/// from pointer handling and animation into the shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingInputs {
    /// Seconds since startup.
    pub time: f32,
    /// World-space light position.
    pub light_position: Vec3,
    /// Pointer in display UV space (v up).
    pub pointer_uv: Vec2,
    /// Viewport size in physical pixels.
    pub resolution: Vec2,
}

impl ShadingInputs {
    /// Inputs before any pointer or resize event arrives.
    pub fn new(pointer_uv: Vec2, resolution: Vec2) -> Self {
        Self {
            time: 0.0,
            light_position: Vec3::ZERO,
            pointer_uv,
            resolution,
        }
    }

    /// Packs the inputs together with the planet transform.
    ///
    /// `srgb_target` tells the shader to pre-linearize its output because the
    /// surface format re-encodes to sRGB on store.
    pub fn to_uniform(&self, model: Mat4, srgb_target: bool) -> ShadingUniform {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        ShadingUniform {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
            light_pos_time: self.light_position.extend(self.time).to_array(),
            pointer_resolution: [
                self.pointer_uv.x,
                self.pointer_uv.y,
                self.resolution.x,
                self.resolution.y,
            ],
            options: [if srgb_target { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// GPU-side `Shading` struct of `planet.wgsl`, 176 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadingUniform {
    /// Planet model matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, padded to 4x4.
    pub normal_matrix: [[f32; 4]; 4],
    /// xyz = light position, w = time.
    pub light_pos_time: [f32; 4],
    /// xy = pointer uv, zw = resolution.
    pub pointer_resolution: [f32; 4],
    /// x = sRGB target flag.
    pub options: [f32; 4],
}
