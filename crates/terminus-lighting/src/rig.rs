//! The fixed set of lights in the viewer's scene and its GPU packing.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use terminus_config::LightsConfig;
use terminus_shading::srgb_to_linear;

use crate::{DirectionalLight, PointLight, SpotLight};

/// Uniform fill light.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// How lit materials turn radiance into output color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputOptions {
    pub tone_mapping: bool,
    pub exposure: f32,
    /// The render target applies the sRGB transfer on store.
    pub srgb_target: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            tone_mapping: true,
            exposure: 1.2,
            srgb_target: true,
        }
    }
}

/// Every light the scene uses, in linear color.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    /// Travels with the sun marker.
    pub sun: PointLight,
    pub spot: SpotLight,
    /// Multiplies ambient when environment lighting is on. `ONE` otherwise.
    pub environment_tint: Vec3,
}

fn linear_color(srgb: [f32; 3]) -> Vec3 {
    Vec3::new(
        srgb_to_linear(srgb[0]),
        srgb_to_linear(srgb[1]),
        srgb_to_linear(srgb[2]),
    )
}

impl LightRig {
    /// Builds the rig from config. The sun starts at the origin until the
    /// pointer first moves.
    pub fn from_config(config: &LightsConfig) -> Self {
        Self {
            ambient: AmbientLight {
                color: linear_color(config.ambient_color),
                intensity: config.ambient_intensity,
            },
            directional: DirectionalLight {
                position: Vec3::from(config.directional_position),
                target: Vec3::ZERO,
                color: linear_color(config.directional_color),
                intensity: config.directional_intensity,
            },
            sun: PointLight {
                position: Vec3::ZERO,
                color: linear_color(config.sun_color),
                intensity: config.sun_intensity,
                distance: config.sun_distance,
                decay: config.sun_decay,
            },
            spot: SpotLight {
                position: Vec3::from(config.spot_position),
                target: Vec3::ZERO,
                color: linear_color(config.spot_color),
                intensity: config.spot_intensity,
                angle: config.spot_angle,
                penumbra: config.spot_penumbra,
                distance: 0.0,
                decay: config.spot_decay,
            },
            environment_tint: Vec3::ONE,
        }
    }

    /// Moves the sun light onto the marker and parks the directional light
    /// `directional_radius` out along the same bearing.
    pub fn follow_light_marker(&mut self, marker: Vec3, directional_radius: f32) {
        self.sun.position = marker;
        self.directional.park_along(marker, directional_radius);
    }

    pub fn set_environment_tint(&mut self, tint: Option<Vec3>) {
        self.environment_tint = tint.unwrap_or(Vec3::ONE);
    }

    pub fn to_uniform(&self, output: OutputOptions) -> LightRigUniform {
        let ambient = self.ambient.color * self.ambient.intensity;
        LightRigUniform {
            ambient: ambient.extend(0.0).to_array(),
            directional_direction: self.directional.direction_to_light().extend(0.0).to_array(),
            directional_color: (self.directional.color * self.directional.intensity)
                .extend(0.0)
                .to_array(),
            point_position: self.sun.position.extend(self.sun.distance).to_array(),
            point_color: (self.sun.color * self.sun.intensity)
                .extend(self.sun.decay)
                .to_array(),
            spot_position: self.spot.position.extend(self.spot.distance).to_array(),
            spot_direction: self.spot.axis().extend(self.spot.cone_cos()).to_array(),
            spot_color: (self.spot.color * self.spot.intensity)
                .extend(self.spot.decay)
                .to_array(),
            spot_params: Vec4::new(self.spot.penumbra_cos(), 0.0, 0.0, 0.0).to_array(),
            environment_tint: self.environment_tint.extend(0.0).to_array(),
            output: [
                output.exposure,
                if output.tone_mapping { 1.0 } else { 0.0 },
                if output.srgb_target { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// GPU layout of [`LightRig`], bound by the cloud pipeline.
///
/// `w` lanes carry the scalar that belongs with each vector: cutoff
/// distance next to positions, decay next to colors, cone cosine next to
/// the spot axis.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightRigUniform {
    pub ambient: [f32; 4],
    pub directional_direction: [f32; 4],
    pub directional_color: [f32; 4],
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_color: [f32; 4],
    pub spot_params: [f32; 4],
    pub environment_tint: [f32; 4],
    /// x exposure, y tone mapping flag, z sRGB target flag.
    pub output: [f32; 4],
}
