//! Pipeline and material for the day/night planet surface.

use glam::Mat4;
use terminus_shading::{ShadingInputs, ShadingUniform};

use crate::buffer::{BufferAllocator, MeshBuffer, uniform_size};
use crate::depth::DepthBuffer;
use crate::sphere::SphereVertex;
use crate::texture::GpuTexture;

/// Opaque, back-face culled, depth-writing pipeline for `planet.wgsl`.
pub struct PlanetPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Group 1: shading uniform, day, displacement, night, sampler.
    pub material_layout: wgpu::BindGroupLayout,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl PlanetPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet-material-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_size::<ShadingUniform>(),
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("planet-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &material_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("planet-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[SphereVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::write_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            material_layout,
        }
    }
}

/// Which planet texture a [`PlanetMaterial::set_texture`] call replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanetTexture {
    Day,
    Displacement,
    Night,
}

/// Per-planet uniform buffer, textures and their bind group.
pub struct PlanetMaterial {
    pub uniform_buffer: wgpu::Buffer,
    day: GpuTexture,
    displacement: GpuTexture,
    night: GpuTexture,
    bind_group: wgpu::BindGroup,
}

impl PlanetMaterial {
    pub fn new(
        device: &wgpu::Device,
        pipeline: &PlanetPipeline,
        sampler: &wgpu::Sampler,
        initial: &ShadingUniform,
        day: GpuTexture,
        displacement: GpuTexture,
        night: GpuTexture,
    ) -> Self {
        let uniform_buffer = BufferAllocator::new(device).create_uniform("planet-shading", initial);
        let bind_group = Self::bind(
            device,
            pipeline,
            sampler,
            &uniform_buffer,
            [&day, &displacement, &night],
        );
        Self {
            uniform_buffer,
            day,
            displacement,
            night,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        pipeline: &PlanetPipeline,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        [day, displacement, night]: [&GpuTexture; 3],
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("planet-material-bg"),
            layout: &pipeline.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&day.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&displacement.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&night.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Swaps one texture and rebuilds the bind group.
    pub fn set_texture(
        &mut self,
        device: &wgpu::Device,
        pipeline: &PlanetPipeline,
        sampler: &wgpu::Sampler,
        which: PlanetTexture,
        texture: GpuTexture,
    ) {
        match which {
            PlanetTexture::Day => self.day = texture,
            PlanetTexture::Displacement => self.displacement = texture,
            PlanetTexture::Night => self.night = texture,
        }
        self.bind_group = Self::bind(
            device,
            pipeline,
            sampler,
            &self.uniform_buffer,
            [&self.day, &self.displacement, &self.night],
        );
    }

    pub fn update(&self, queue: &wgpu::Queue, inputs: &ShadingInputs, model: Mat4, srgb_target: bool) {
        let uniform = inputs.to_uniform(model, srgb_target);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a PlanetPipeline,
        camera_bind_group: &'a wgpu::BindGroup,
        mesh: &'a MeshBuffer,
    ) {
        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        mesh.bind(pass);
        mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::CameraBinding;
    use crate::camera::Camera;
    use crate::shader::ShaderLibrary;
    use crate::test_support::create_test_device;
    use crate::texture::create_surface_sampler;
    use glam::Vec2;
    use terminus_shading::{PLANET_CONTRACT, PLANET_SHADER_SOURCE};

    #[test]
    fn test_pipeline_and_material_build() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut shaders = ShaderLibrary::new();
        let module = shaders
            .load(&device, &PLANET_CONTRACT, PLANET_SHADER_SOURCE)
            .expect("planet shader");
        let camera = CameraBinding::new(&device, &Camera::default());
        let pipeline = PlanetPipeline::new(
            &device,
            &module,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &camera.layout,
        );
        let sampler = create_surface_sampler(&device);
        let solid = |label| GpuTexture::solid(&device, &queue, label, [0, 0, 0, 255]);
        let inputs = ShadingInputs::new(Vec2::splat(0.5), Vec2::new(64.0, 64.0));
        let mut material = PlanetMaterial::new(
            &device,
            &pipeline,
            &sampler,
            &inputs.to_uniform(Mat4::IDENTITY, true),
            solid("day"),
            solid("disp"),
            solid("night"),
        );
        material.set_texture(
            &device,
            &pipeline,
            &sampler,
            PlanetTexture::Night,
            GpuTexture::solid(&device, &queue, "night-2", [255, 255, 255, 255]),
        );
        material.update(&queue, &inputs, Mat4::IDENTITY, true);
        assert_eq!(
            material.uniform_buffer.size() as usize,
            std::mem::size_of::<ShadingUniform>()
        );
    }
}
