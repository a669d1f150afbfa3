//! GPU buffer creation for meshes and uniforms.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::sphere::{SphereMesh, SphereVertex};

/// Vertex and index buffers of one mesh.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Creates buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Uploads a sphere mesh.
    pub fn create_sphere(&self, label: &str, mesh: &SphereMesh) -> MeshBuffer {
        let vertices: Vec<SphereVertex> = mesh.vertices();
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// A uniform buffer initialised with `value` and writable via the queue.
    pub fn create_uniform<T: Pod>(&self, label: &str, value: &T) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(value),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }
}

/// `min_binding_size` for a uniform of type `T`.
pub fn uniform_size<T>() -> Option<wgpu::BufferSize> {
    wgpu::BufferSize::new(std::mem::size_of::<T>() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    #[test]
    fn test_uniform_size_is_nonzero_for_real_types() {
        assert_eq!(uniform_size::<[f32; 4]>().map(|s| s.get()), Some(16));
        assert!(uniform_size::<()>().is_none());
    }

    #[test]
    fn test_sphere_upload_sizes() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mesh = SphereMesh::new(1.0, 8, 6);
        let buffers = BufferAllocator::new(&device).create_sphere("test-sphere", &mesh);
        assert_eq!(buffers.index_count as usize, mesh.indices.len());
        assert_eq!(
            buffers.vertex_buffer.size() as usize,
            mesh.positions.len() * std::mem::size_of::<SphereVertex>()
        );
    }
}
