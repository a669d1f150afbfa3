//! Unlit transparent solid-color material.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use terminus_lighting::OutputOptions;
use terminus_shading::{ShaderContract, aces_filmic, linear_to_srgb, srgb_to_linear};

use crate::buffer::{BufferAllocator, MeshBuffer, uniform_size};
use crate::depth::DepthBuffer;
use crate::sphere::SphereVertex;

pub const BASIC_SHADER_SOURCE: &str = include_str!("basic.wgsl");

pub const BASIC_CONTRACT: ShaderContract = ShaderContract {
    name: "basic",
    version: 1,
    entry_points: &["vs_main", "fs_main"],
    bindings: &[(0, 0), (1, 0)],
};

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSide {
    Front,
    /// Inside-out shells: only faces pointing away from the viewer.
    Back,
    Double,
}

impl FaceSide {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            FaceSide::Front => Some(wgpu::Face::Back),
            FaceSide::Back => Some(wgpu::Face::Front),
            FaceSide::Double => None,
        }
    }

    fn index(self) -> usize {
        match self {
            FaceSide::Front => 0,
            FaceSide::Back => 1,
            FaceSide::Double => 2,
        }
    }
}

/// GPU `Basic` struct of `basic.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BasicUniform {
    pub model: [[f32; 4]; 4],
    /// rgb linear color, a opacity.
    pub color: [f32; 4],
    /// x exposure, y tone mapping flag, z sRGB target flag.
    pub output: [f32; 4],
}

impl BasicUniform {
    /// `srgb_color` is a display-referred color such as a hex literal.
    pub fn new(model: Mat4, srgb_color: [f32; 3], opacity: f32, output: OutputOptions) -> Self {
        let linear = srgb_color.map(srgb_to_linear);
        Self {
            model: model.to_cols_array_2d(),
            color: [linear[0], linear[1], linear[2], opacity],
            output: [
                output.exposure,
                if output.tone_mapping { 1.0 } else { 0.0 },
                if output.srgb_target { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// What `basic.wgsl` displays for a color, as an sRGB-encoded value.
pub fn basic_display_color(srgb_color: [f32; 3], output: OutputOptions) -> Vec3 {
    let linear = Vec3::from(srgb_color.map(srgb_to_linear));
    let mapped = if output.tone_mapping {
        aces_filmic(linear, output.exposure)
    } else {
        linear
    };
    Vec3::new(
        linear_to_srgb(mapped.x),
        linear_to_srgb(mapped.y),
        linear_to_srgb(mapped.z),
    )
}

/// One alpha-blended pipeline per [`FaceSide`].
pub struct BasicPipeline {
    pipelines: [wgpu::RenderPipeline; 3],
    pub material_layout: wgpu::BindGroupLayout,
}

impl BasicPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("basic-material-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: uniform_size::<BasicUniform>(),
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("basic-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &material_layout],
            immediate_size: 0,
        });

        let build = |side: FaceSide| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(match side {
                    FaceSide::Front => "basic-pipeline-front",
                    FaceSide::Back => "basic-pipeline-back",
                    FaceSide::Double => "basic-pipeline-double",
                }),
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
                    cull_mode: side.cull_mode(),
                    ..Default::default()
                },
                depth_stencil: Some(DepthBuffer::write_state()),
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
            })
        };

        Self {
            pipelines: [
                build(FaceSide::Front),
                build(FaceSide::Back),
                build(FaceSide::Double),
            ],
            material_layout,
        }
    }

    pub fn pipeline(&self, side: FaceSide) -> &wgpu::RenderPipeline {
        &self.pipelines[side.index()]
    }
}

/// Uniform state of one basic-material mesh.
pub struct BasicMaterial {
    pub side: FaceSide,
    pub uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl BasicMaterial {
    pub fn new(
        device: &wgpu::Device,
        pipeline: &BasicPipeline,
        side: FaceSide,
        initial: &BasicUniform,
    ) -> Self {
        let uniform_buffer = BufferAllocator::new(device).create_uniform("basic-material", initial);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("basic-material-bg"),
            layout: &pipeline.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            side,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniform: &BasicUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
    }

    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a BasicPipeline,
        camera_bind_group: &'a wgpu::BindGroup,
        mesh: &'a MeshBuffer,
    ) {
        pass.set_pipeline(pipeline.pipeline(self.side));
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

    #[test]
    fn test_contract_accepts_embedded_source() {
        BASIC_CONTRACT
            .validate(BASIC_SHADER_SOURCE)
            .expect("basic shader matches its contract");
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<BasicUniform>(), 96);
        assert_eq!(std::mem::offset_of!(BasicUniform, color), 64);
        assert_eq!(std::mem::offset_of!(BasicUniform, output), 80);
    }

    #[test]
    fn test_cull_modes() {
        assert_eq!(FaceSide::Front.cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(FaceSide::Back.cull_mode(), Some(wgpu::Face::Front));
        assert_eq!(FaceSide::Double.cull_mode(), None);
    }

    #[test]
    fn test_uniform_linearizes_color() {
        let u = BasicUniform::new(Mat4::IDENTITY, [1.0, 0.8, 0.0], 0.9, OutputOptions::default());
        assert_eq!(u.color[0], 1.0);
        assert!((u.color[1] - srgb_to_linear(0.8)).abs() < 1e-6);
        assert_eq!(u.color[3], 0.9);
        assert_eq!(u.output, [1.2, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_display_color_without_tone_mapping_round_trips() {
        let output = OutputOptions {
            tone_mapping: false,
            ..OutputOptions::default()
        };
        let shown = basic_display_color([0.0, 0.667, 1.0], output);
        assert!((shown - Vec3::new(0.0, 0.667, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_tone_mapping_compresses_white() {
        let shown = basic_display_color([1.0, 1.0, 1.0], OutputOptions::default());
        assert!(shown.x < 1.0 && shown.x > 0.8);
    }

    #[test]
    fn test_pipelines_build() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let module = ShaderLibrary::new()
            .load(&device, &BASIC_CONTRACT, BASIC_SHADER_SOURCE)
            .expect("basic shader");
        let camera = CameraBinding::new(&device, &Camera::default());
        let pipeline = BasicPipeline::new(
            &device,
            &module,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &camera.layout,
        );
        let uniform = BasicUniform::new(Mat4::IDENTITY, [0.0, 0.667, 1.0], 0.2, OutputOptions::default());
        let material = BasicMaterial::new(&device, &pipeline, FaceSide::Back, &uniform);
        material.update(&queue, &uniform);
        assert_eq!(material.side, FaceSide::Back);
    }
}
