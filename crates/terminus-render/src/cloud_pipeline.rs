//! Lit, alpha-blended cloud shell.
//!
//! The clouds are the only surface lit by the [`LightRig`]: Lambert diffuse
//! plus a Blinn-Phong highlight from every light, on top of ambient. The
//! shell is drawn double-sided without writing depth so the far side shows
//! through the near side.
//!
//! [`LightRig`]: terminus_lighting::LightRig

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use terminus_lighting::LightRigUniform;
use terminus_shading::{ShaderContract, srgb_to_linear};

use crate::buffer::{BufferAllocator, MeshBuffer, uniform_size};
use crate::depth::DepthBuffer;
use crate::sphere::SphereVertex;
use crate::texture::GpuTexture;

pub const CLOUD_SHADER_SOURCE: &str = include_str!("cloud.wgsl");

pub const CLOUD_CONTRACT: ShaderContract = ShaderContract {
    name: "cloud",
    version: 1,
    entry_points: &["vs_main", "fs_main"],
    bindings: &[(0, 0), (1, 0), (1, 1), (1, 2), (1, 3)],
};

/// Highlight exponent of the cloud material.
pub const CLOUD_SHININESS: f32 = 30.0;

/// Gray `0x111111` specular color, linearized.
pub fn cloud_specular_reflectance() -> f32 {
    srgb_to_linear(17.0 / 255.0)
}

/// GPU `Cloud` struct of `cloud.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CloudUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// x opacity, y shininess, z specular reflectance.
    pub params: [f32; 4],
}

impl CloudUniform {
    pub fn new(model: Mat4, opacity: f32) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
            params: [opacity, CLOUD_SHININESS, cloud_specular_reflectance(), 0.0],
        }
    }
}

pub struct CloudPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Group 1: cloud uniform, texture, sampler, light rig.
    pub material_layout: wgpu::BindGroupLayout,
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: uniform_size::<T>(),
        },
        count: None,
    }
}

impl CloudPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cloud-material-bgl"),
            entries: &[
                uniform_entry::<CloudUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                uniform_entry::<LightRigUniform>(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cloud-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &material_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cloud-pipeline"),
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
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::read_only_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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

/// Cloud uniform, light rig uniform, cloud texture and their bind group.
pub struct CloudMaterial {
    pub uniform_buffer: wgpu::Buffer,
    pub lights_buffer: wgpu::Buffer,
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

impl CloudMaterial {
    pub fn new(
        device: &wgpu::Device,
        pipeline: &CloudPipeline,
        sampler: &wgpu::Sampler,
        initial: &CloudUniform,
        lights: &LightRigUniform,
        texture: GpuTexture,
    ) -> Self {
        let allocator = BufferAllocator::new(device);
        let uniform_buffer = allocator.create_uniform("cloud-material", initial);
        let lights_buffer = allocator.create_uniform("cloud-lights", lights);
        let bind_group = Self::bind(device, pipeline, sampler, &uniform_buffer, &lights_buffer, &texture);
        Self {
            uniform_buffer,
            lights_buffer,
            texture,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        pipeline: &CloudPipeline,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        lights_buffer: &wgpu::Buffer,
        texture: &GpuTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cloud-material-bg"),
            layout: &pipeline.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        })
    }

    pub fn set_texture(
        &mut self,
        device: &wgpu::Device,
        pipeline: &CloudPipeline,
        sampler: &wgpu::Sampler,
        texture: GpuTexture,
    ) {
        self.texture = texture;
        self.bind_group = Self::bind(
            device,
            pipeline,
            sampler,
            &self.uniform_buffer,
            &self.lights_buffer,
            &self.texture,
        );
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: &CloudUniform, lights: &LightRigUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(lights));
    }

    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a CloudPipeline,
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
    use glam::{EulerRot, Quat, Vec3};
    use terminus_config::LightsConfig;
    use terminus_lighting::{LightRig, OutputOptions};

    #[test]
    fn test_contract_accepts_embedded_source() {
        CLOUD_CONTRACT
            .validate(CLOUD_SHADER_SOURCE)
            .expect("cloud shader matches its contract");
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CloudUniform>(), 144);
        assert_eq!(std::mem::offset_of!(CloudUniform, params), 128);
    }

    #[test]
    fn test_specular_reflectance_matches_dark_gray() {
        let f0 = cloud_specular_reflectance();
        assert!((f0 - 0.00561).abs() < 1e-4, "f0 = {f0}");
    }

    #[test]
    fn test_normal_matrix_of_rotation_is_the_rotation() {
        let rotation = Quat::from_euler(EulerRot::XYZ, 0.3, 1.1, 0.0);
        let model = Mat4::from_quat(rotation);
        let u = CloudUniform::new(model, 0.25);
        let normal = Mat4::from_cols_array_2d(&u.normal_matrix);
        let n = normal.transform_vector3(Vec3::Y);
        assert!((n - rotation * Vec3::Y).length() < 1e-5);
        assert_eq!(u.params[0], 0.25);
        assert_eq!(u.params[1], CLOUD_SHININESS);
    }

    #[test]
    fn test_pipeline_and_material_build() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let module = ShaderLibrary::new()
            .load(&device, &CLOUD_CONTRACT, CLOUD_SHADER_SOURCE)
            .expect("cloud shader");
        let camera = CameraBinding::new(&device, &Camera::default());
        let pipeline = CloudPipeline::new(
            &device,
            &module,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &camera.layout,
        );
        let sampler = create_surface_sampler(&device);
        let lights = LightRig::from_config(&LightsConfig::default()).to_uniform(OutputOptions::default());
        let uniform = CloudUniform::new(Mat4::IDENTITY, 0.2);
        let mut material = CloudMaterial::new(
            &device,
            &pipeline,
            &sampler,
            &uniform,
            &lights,
            GpuTexture::solid(&device, &queue, "clouds", [0, 0, 0, 0]),
        );
        material.set_texture(
            &device,
            &pipeline,
            &sampler,
            GpuTexture::solid(&device, &queue, "clouds-2", [255, 255, 255, 128]),
        );
        material.update(&queue, &uniform, &lights);
        assert_eq!(material.lights_buffer.size(), 176);
    }
}
