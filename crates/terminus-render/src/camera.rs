//! Perspective camera and screen-to-world ray casting.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use terminus_config::CameraConfig;

/// Camera data bound at `@group(0) @binding(0)` by every pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position.
    pub position: [f32; 4],
}

/// A half-line from `origin` along unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// The point `distance` units along the ray.
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Right-handed perspective camera with a reverse-Z projection.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl Camera {
    /// Unrotated camera looking down -Z from the configured position.
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::from(config.position),
            rotation: Quat::IDENTITY,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect_ratio,
            near: config.near,
            far: config.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Near and far are swapped so the near plane lands on depth 1.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Zero heights are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection_matrix().inverse();
        let target = inverse * Vec4::new(ndc.x, ndc.y, 0.5, 1.0);
        let target = target.truncate() / target.w;
        Ray {
            origin: self.position,
            direction: (target - self.position).normalize_or_zero(),
        }
    }

    /// Depth of `point` in front of the camera.
    pub fn view_depth(&self, point: Vec3) -> f32 {
        -self.view_matrix().transform_point3(point).z
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}
