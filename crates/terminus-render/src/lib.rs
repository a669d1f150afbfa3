//! wgpu rendering for the planet viewer: surface management, the sphere
//! mesh, camera and picking rays, texture loading, and one pipeline per
//! material (day/night planet, lit clouds, unlit glow shells).

pub mod basic_pipeline;
pub mod binding;
pub mod buffer;
pub mod camera;
pub mod cloud_pipeline;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod planet_pipeline;
pub mod shader;
pub mod sphere;
pub mod surface;
pub mod texture;

#[cfg(test)]
mod test_support;

pub use basic_pipeline::{
    BASIC_CONTRACT, BASIC_SHADER_SOURCE, BasicMaterial, BasicPipeline, BasicUniform, FaceSide,
    basic_display_color,
};
pub use binding::CameraBinding;
pub use buffer::{BufferAllocator, MeshBuffer};
pub use camera::{Camera, CameraUniform, Ray};
pub use cloud_pipeline::{
    CLOUD_CONTRACT, CLOUD_SHADER_SOURCE, CLOUD_SHININESS, CloudMaterial, CloudPipeline,
    CloudUniform,
};
pub use depth::DepthBuffer;
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, SurfaceOptions, init_render_context_blocking,
};
pub use pass::{FrameEncoder, RenderPassBuilder, TRANSPARENT, clear_color_from_rgba};
pub use planet_pipeline::{PlanetMaterial, PlanetPipeline, PlanetTexture};
pub use shader::ShaderLibrary;
pub use sphere::{SphereMesh, SphereVertex};
pub use surface::{PhysicalSize, SurfaceWrapper};
pub use texture::{
    EnvironmentSummary, GpuTexture, LoadOutcome, LoadedAsset, LoadedImage, TextureError,
    TextureLoader, TextureSlot, create_surface_sampler,
};
