//! GPU resources of the scene and the per-frame draw.

use std::collections::HashMap;
use std::sync::Arc;

use terminus_animation::AnimationState;
use terminus_config::Config;
use terminus_lighting::{LightRig, OutputOptions};
use terminus_render::{
    BASIC_CONTRACT, BASIC_SHADER_SOURCE, BasicMaterial, BasicPipeline, BasicUniform,
    BufferAllocator, CLOUD_CONTRACT, CLOUD_SHADER_SOURCE, Camera, CameraBinding, CloudMaterial,
    CloudPipeline, CloudUniform, DepthBuffer, FrameEncoder, GpuTexture, LoadOutcome, LoadedAsset,
    MeshBuffer, PlanetMaterial, PlanetPipeline, PlanetTexture, RenderPassBuilder, ShaderLibrary,
    SphereMesh, TextureSlot, clear_color_from_rgba, create_surface_sampler,
};
use terminus_shading::{PLANET_CONTRACT, PLANET_SHADER_SOURCE, ShaderError};
use tracing::{info, warn};

use crate::scene::{Scene, SceneMesh};

/// Meshes drawn with the unlit shell material.
const SHELLS: [SceneMesh; 3] = [SceneMesh::Sun, SceneMesh::SunGlow, SceneMesh::PlanetGlow];

fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue, slot: TextureSlot) -> GpuTexture {
    GpuTexture::solid(device, queue, slot.label(), slot.placeholder_texel())
}

/// Everything the scene needs on the GPU.
pub struct SceneRenderer {
    queue: Arc<wgpu::Queue>,
    camera_binding: CameraBinding,
    depth: DepthBuffer,
    sampler: wgpu::Sampler,
    planet_pipeline: PlanetPipeline,
    cloud_pipeline: CloudPipeline,
    basic_pipeline: BasicPipeline,
    meshes: HashMap<SceneMesh, MeshBuffer>,
    planet: PlanetMaterial,
    clouds: CloudMaterial,
    shells: HashMap<SceneMesh, BasicMaterial>,
    output: OutputOptions,
    clear_color: wgpu::Color,
    environment_lighting: bool,
}

impl SceneRenderer {
    /// Builds pipelines, meshes and placeholder-textured materials.
    ///
    /// Fails only when a shader does not satisfy its contract.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        config: &Config,
        scene: &Scene,
        camera: &Camera,
        state: &AnimationState,
        rig: &LightRig,
    ) -> Result<Self, ShaderError> {
        let mut shaders = ShaderLibrary::new().with_override_dir(config.assets.dir.join("shaders"));
        let planet_module = shaders.load(device, &PLANET_CONTRACT, PLANET_SHADER_SOURCE)?;
        let cloud_module = shaders.load(device, &CLOUD_CONTRACT, CLOUD_SHADER_SOURCE)?;
        let basic_module = shaders.load(device, &BASIC_CONTRACT, BASIC_SHADER_SOURCE)?;

        let camera_binding = CameraBinding::new(device, camera);
        let planet_pipeline =
            PlanetPipeline::new(device, &planet_module, surface_format, &camera_binding.layout);
        let cloud_pipeline =
            CloudPipeline::new(device, &cloud_module, surface_format, &camera_binding.layout);
        let basic_pipeline =
            BasicPipeline::new(device, &basic_module, surface_format, &camera_binding.layout);

        let output = OutputOptions {
            tone_mapping: config.render.tone_mapping,
            exposure: config.render.exposure,
            srgb_target: surface_format.is_srgb(),
        };

        let allocator = BufferAllocator::new(device);
        let meshes: HashMap<_, _> = SceneMesh::ALL
            .into_iter()
            .map(|mesh| {
                let spec = scene.spec(mesh);
                let sphere = SphereMesh::new(spec.radius, spec.width_segments, spec.height_segments);
                (mesh, allocator.create_sphere(&format!("{mesh:?}-mesh"), &sphere))
            })
            .collect();

        let sampler = create_surface_sampler(device);
        let planet = PlanetMaterial::new(
            device,
            &planet_pipeline,
            &sampler,
            &state
                .shading_inputs()
                .to_uniform(scene.model(SceneMesh::Planet), output.srgb_target),
            placeholder(device, &queue, TextureSlot::Day),
            placeholder(device, &queue, TextureSlot::Displacement),
            placeholder(device, &queue, TextureSlot::Night),
        );
        let clouds = CloudMaterial::new(
            device,
            &cloud_pipeline,
            &sampler,
            &CloudUniform::new(scene.model(SceneMesh::Clouds), state.cloud_opacity),
            &rig.to_uniform(output),
            placeholder(device, &queue, TextureSlot::Clouds),
        );
        let shells = SHELLS
            .into_iter()
            .map(|mesh| {
                let spec = scene.spec(mesh);
                let uniform =
                    BasicUniform::new(scene.model(mesh), spec.color, spec.opacity, output);
                let material =
                    BasicMaterial::new(device, &basic_pipeline, mesh.face_side(), &uniform);
                (mesh, material)
            })
            .collect();

        info!(
            "Scene ready: {} meshes, tone mapping {}, exposure {:.2}",
            meshes.len(),
            output.tone_mapping,
            output.exposure
        );

        Ok(Self {
            queue,
            camera_binding,
            depth: DepthBuffer::new(device, size.0, size.1),
            sampler,
            planet_pipeline,
            cloud_pipeline,
            basic_pipeline,
            meshes,
            planet,
            clouds,
            shells,
            output,
            clear_color: clear_color_from_rgba(config.render.clear_color),
            environment_lighting: config.render.environment_lighting,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Swaps a finished load into its material. Failures keep the
    /// placeholder and are logged.
    pub fn apply_texture(&mut self, device: &wgpu::Device, outcome: LoadOutcome, rig: &mut LightRig) {
        let asset = match outcome.result {
            Ok(asset) => asset,
            Err(e) => {
                warn!(
                    "Failed to load {:?} from {}: {e}; keeping placeholder",
                    outcome.slot,
                    outcome.path.display()
                );
                return;
            }
        };

        match (outcome.slot, asset) {
            (TextureSlot::Environment, LoadedAsset::Environment(summary)) => {
                info!(
                    "Environment map {} mean radiance {:?}",
                    outcome.path.display(),
                    summary.mean_radiance
                );
                if self.environment_lighting {
                    rig.set_environment_tint(Some(summary.mean_radiance));
                }
            }
            (slot, LoadedAsset::Image(image)) => {
                info!(
                    "Loaded {:?} texture {} ({}x{})",
                    slot,
                    outcome.path.display(),
                    image.width,
                    image.height
                );
                let texture = GpuTexture::from_image(device, &self.queue, slot.label(), &image);
                let which = match slot {
                    TextureSlot::Day => PlanetTexture::Day,
                    TextureSlot::Displacement => PlanetTexture::Displacement,
                    TextureSlot::Night => PlanetTexture::Night,
                    TextureSlot::Clouds => {
                        self.clouds
                            .set_texture(device, &self.cloud_pipeline, &self.sampler, texture);
                        return;
                    }
                    TextureSlot::Environment => return,
                };
                self.planet
                    .set_texture(device, &self.planet_pipeline, &self.sampler, which, texture);
            }
            (slot, LoadedAsset::Environment(_)) => {
                warn!("Environment data delivered for {slot:?}, ignoring");
            }
        }
    }

    /// Writes this frame's uniforms.
    pub fn update(&self, scene: &Scene, state: &AnimationState, rig: &LightRig, camera: &Camera) {
        let queue = &self.queue;
        self.camera_binding.update(queue, camera);
        self.planet.update(
            queue,
            &state.shading_inputs(),
            scene.model(SceneMesh::Planet),
            self.output.srgb_target,
        );
        self.clouds.update(
            queue,
            &CloudUniform::new(scene.model(SceneMesh::Clouds), state.cloud_opacity),
            &rig.to_uniform(self.output),
        );
        for (mesh, material) in &self.shells {
            let spec = scene.spec(*mesh);
            material.update(
                queue,
                &BasicUniform::new(scene.model(*mesh), spec.color, spec.opacity, self.output),
            );
        }
    }

    /// Clears the frame and draws `order`.
    pub fn render(&self, frame: &mut FrameEncoder, order: &[SceneMesh]) {
        let builder = RenderPassBuilder::new()
            .label("scene-pass")
            .clear_color(self.clear_color)
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE);
        let mut pass = frame.begin_render_pass(&builder);
        let camera_bg = &self.camera_binding.bind_group;

        for mesh in order {
            let Some(buffer) = self.meshes.get(mesh) else {
                continue;
            };
            match mesh {
                SceneMesh::Planet => {
                    self.planet
                        .render(&mut pass, &self.planet_pipeline, camera_bg, buffer)
                }
                SceneMesh::Clouds => {
                    self.clouds
                        .render(&mut pass, &self.cloud_pipeline, camera_bg, buffer)
                }
                shell => {
                    if let Some(material) = self.shells.get(shell) {
                        material.render(&mut pass, &self.basic_pipeline, camera_bg, buffer);
                    }
                }
            }
        }
    }
}
