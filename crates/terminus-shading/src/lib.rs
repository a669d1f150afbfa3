//! Day/night shading for the planet surface.
//!
//! [`model`] is the CPU reference of the per-pixel blend between the day and
//! night textures. [`contract`] owns the WGSL asset that implements the same
//! function on the GPU and checks its interface before a pipeline is built.
//! [`uniform`] packs the per-frame inputs the shader reads.

pub mod contract;
pub mod model;
pub mod tonemap;
pub mod uniform;

pub use contract::{PLANET_CONTRACT, PLANET_SHADER_SOURCE, ShaderContract, ShaderError};
pub use model::{
    NIGHT_FADE_GAIN, POINTER_RADIUS, ShadingTerms, SurfaceSample, TERMINATOR_EXPONENT,
    TextureSamples, shade, shading_terms, smoothstep,
};
pub use tonemap::{aces_filmic, linear_to_srgb, srgb_to_linear};
pub use uniform::{ShadingInputs, ShadingUniform};
