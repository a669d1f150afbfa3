//! Latitude/longitude sphere meshes.
//!
//! Vertex order, UVs and winding follow the usual web-graphics sphere: rows
//! run from the north pole (v = 1) to the south pole (v = 0), columns wrap
//! once around the equator with a duplicated seam column, and the pole rows
//! emit one triangle per quad. Texture images are flipped on upload so that
//! v = 1 samples the top row.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Interleaved vertex: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side sphere geometry.
#[derive(Clone, Debug)]
pub struct SphereMesh {
    pub radius: f32,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Segment counts below 3 (around) and 2 (pole to pole) are raised to those minimums.
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let columns = width_segments as usize + 1;
        let rows = height_segments as usize + 1;

        let mut positions = Vec::with_capacity(columns * rows);
        let mut normals = Vec::with_capacity(columns * rows);
        let mut uvs = Vec::with_capacity(columns * rows);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Pole vertices sit mid-column so each pole triangle gets its own u.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let theta = v * PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * TAU;
                let position = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                positions.push(position);
                normals.push(position.normalize_or_zero());
                uvs.push(Vec2::new(u + u_offset, 1.0 - v));
            }
        }

        let index = |iy: u32, ix: u32| iy * (width_segments + 1) + ix;
        let mut indices = Vec::with_capacity(6 * width_segments as usize * (rows - 2));
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = index(iy, ix + 1);
                let b = index(iy, ix);
                let c = index(iy + 1, ix);
                let d = index(iy + 1, ix + 1);
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            radius,
            positions,
            normals,
            uvs,
            indices,
        }
    }

    pub fn vertices(&self) -> Vec<SphereVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| SphereVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }
}
