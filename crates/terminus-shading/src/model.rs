//! CPU reference of the planet's day/night blend.
//!
//! The GPU path in `planet.wgsl` evaluates the same steps per fragment. Tests
//! in this module pin the numeric behavior the shader must reproduce.

use glam::{Vec2, Vec3};

/// Exponent applied to the raw diffuse term before smoothing. A high exponent
/// pulls the lit region into a narrow band around the sub-light point.
pub const TERMINATOR_EXPONENT: f32 = 5.5;

/// Gain applied to the displaced diffuse term so the day side saturates quickly.
pub const NIGHT_FADE_GAIN: f32 = 5.0;

/// UV distance at which the pointer stops pushing back the night.
pub const POINTER_RADIUS: f32 = 0.3;

/// Hermite interpolation between two edges.
///
/// Works for reversed edges (`edge0 > edge1`), giving a falling curve. Equal
/// edges degenerate to a step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Interpolated surface attributes of one planet fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// World-space normal as interpolated across the triangle (not renormalized).
    pub normal: Vec3,
    /// World-space position.
    pub world_pos: Vec3,
    /// Texture coordinate.
    pub uv: Vec2,
}

/// Texture reads at a fragment's UV.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureSamples {
    /// Day texture RGB.
    pub day: Vec3,
    /// Night texture RGB.
    pub night: Vec3,
    /// Red channel of the displacement map.
    pub displacement: f32,
}

/// Every intermediate of the blend, exposed for inspection and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingTerms {
    /// `max(dot(normal, light_dir), 0)`.
    pub diff0: f32,
    /// `smoothstep(0, 1, diff0^5.5)`.
    pub diff1: f32,
    /// `diff1 * (0.5 + 0.5 * displacement)`.
    pub diff2: f32,
    /// `clamp(diff2 * 5, 0, 1)`.
    pub light_factor: f32,
    /// Euclidean UV distance between the fragment and the pointer.
    pub dist_to_pointer: f32,
    /// `smoothstep(0.3, 0, dist_to_pointer)`.
    pub pointer_influence: f32,
    /// Blend weight of the night texture, always in `[0, 1]`.
    pub night_fade: f32,
}

/// Computes the blend weights for one fragment.
pub fn shading_terms(
    surface: &SurfaceSample,
    light_pos: Vec3,
    pointer_uv: Vec2,
    displacement: f32,
) -> ShadingTerms {
    let to_light = light_pos - surface.world_pos;
    let len = to_light.length();
    let light_dir = if len > 0.0 { to_light / len } else { Vec3::ZERO };

    let diff0 = surface.normal.dot(light_dir).max(0.0);
    let diff1 = smoothstep(0.0, 1.0, diff0.powf(TERMINATOR_EXPONENT));
    let diff2 = diff1 * (0.5 + 0.5 * displacement);
    let light_factor = (diff2 * NIGHT_FADE_GAIN).clamp(0.0, 1.0);

    let dist_to_pointer = surface.uv.distance(pointer_uv);
    let pointer_influence = smoothstep(POINTER_RADIUS, 0.0, dist_to_pointer);
    let night_fade = (1.0 - light_factor - pointer_influence).clamp(0.0, 1.0);

    ShadingTerms {
        diff0,
        diff1,
        diff2,
        light_factor,
        dist_to_pointer,
        pointer_influence,
        night_fade,
    }
}

/// Final fragment color: day blended toward night by `night_fade`.
pub fn shade(
    surface: &SurfaceSample,
    light_pos: Vec3,
    pointer_uv: Vec2,
    samples: &TextureSamples,
) -> Vec3 {
    let terms = shading_terms(surface, light_pos, pointer_uv, samples.displacement);
    samples.day.lerp(samples.night, terms.night_fade)
}
