//! What the scene contains, where each mesh sits, and the order they draw in.
//!
//! The GPU side lives in [`crate::renderer`]; this module is plain data so
//! the transforms and the draw order can be tested without a device.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use terminus_animation::AnimationState;
use terminus_config::{SceneConfig, ShellConfig};
use terminus_render::{Camera, FaceSide};

/// The five meshes of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneMesh {
    Sun,
    SunGlow,
    PlanetGlow,
    Clouds,
    Planet,
}

impl SceneMesh {
    /// Creation order; breaks depth ties in the transparent sort.
    pub const ALL: [SceneMesh; 5] = [
        SceneMesh::Sun,
        SceneMesh::SunGlow,
        SceneMesh::PlanetGlow,
        SceneMesh::Clouds,
        SceneMesh::Planet,
    ];

    pub fn is_transparent(self) -> bool {
        !matches!(self, SceneMesh::Planet)
    }

    /// Culling of the unlit shells. The glows are seen from inside out.
    pub fn face_side(self) -> FaceSide {
        match self {
            SceneMesh::PlanetGlow | SceneMesh::SunGlow => FaceSide::Back,
            SceneMesh::Clouds => FaceSide::Double,
            SceneMesh::Sun | SceneMesh::Planet => FaceSide::Front,
        }
    }
}

/// Rotation about X then Y, as the planet and clouds spin.
pub fn spin_matrix(rotation: Vec2) -> Mat4 {
    Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, 0.0))
}

/// Sphere resolution and color of one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSpec {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// sRGB color and opacity of the unlit shells; unused by lit meshes.
    pub color: [f32; 3],
    pub opacity: f32,
}

impl From<&ShellConfig> for MeshSpec {
    fn from(shell: &ShellConfig) -> Self {
        Self {
            radius: shell.radius,
            width_segments: shell.segments,
            height_segments: shell.segments,
            color: shell.color,
            opacity: shell.opacity,
        }
    }
}

impl MeshSpec {
    fn lit(radius: f32, segments: u32) -> Self {
        Self {
            radius,
            width_segments: segments,
            height_segments: segments,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
        }
    }
}

/// Scene contents and per-mesh transforms.
#[derive(Clone, Debug)]
pub struct Scene {
    specs: [MeshSpec; 5],
    models: [Mat4; 5],
}

fn slot(mesh: SceneMesh) -> usize {
    match mesh {
        SceneMesh::Sun => 0,
        SceneMesh::SunGlow => 1,
        SceneMesh::PlanetGlow => 2,
        SceneMesh::Clouds => 3,
        SceneMesh::Planet => 4,
    }
}

impl Scene {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            specs: [
                MeshSpec::from(&config.sun),
                MeshSpec::from(&config.sun_glow),
                MeshSpec::from(&config.planet_glow),
                MeshSpec::lit(config.cloud_radius, config.cloud_segments),
                MeshSpec::lit(config.planet_radius, config.planet_segments),
            ],
            models: [Mat4::IDENTITY; 5],
        }
    }

    pub fn spec(&self, mesh: SceneMesh) -> &MeshSpec {
        &self.specs[slot(mesh)]
    }

    pub fn model(&self, mesh: SceneMesh) -> Mat4 {
        self.models[slot(mesh)]
    }

    /// Copies the animated transforms out of `state`.
    ///
    /// The sun and its glow sit at the light position. The planet glow
    /// stays at the origin unrotated.
    pub fn update(&mut self, state: &AnimationState) {
        let marker = Mat4::from_translation(state.light_position);
        self.models[slot(SceneMesh::Sun)] = marker;
        self.models[slot(SceneMesh::SunGlow)] = marker;
        self.models[slot(SceneMesh::PlanetGlow)] = Mat4::IDENTITY;
        self.models[slot(SceneMesh::Clouds)] = spin_matrix(state.cloud_rotation);
        self.models[slot(SceneMesh::Planet)] = spin_matrix(state.planet_rotation);
    }

    /// Opaque meshes nearest first, then transparent meshes farthest first.
    /// Equal depths keep creation order.
    pub fn draw_order(&self, camera: &Camera) -> Vec<SceneMesh> {
        let depth = |mesh: SceneMesh| {
            let origin = self.model(mesh).transform_point3(Vec3::ZERO);
            camera.view_depth(origin)
        };

        let (mut opaque, mut transparent): (Vec<_>, Vec<_>) = SceneMesh::ALL
            .into_iter()
            .map(|mesh| (mesh, depth(mesh)))
            .partition(|(mesh, _)| !mesh.is_transparent());

        // Stable sorts, so ties stay in creation order.
        opaque.sort_by(|a, b| a.1.total_cmp(&b.1));
        transparent.sort_by(|a, b| b.1.total_cmp(&a.1));

        opaque
            .into_iter()
            .chain(transparent)
            .map(|(mesh, _)| mesh)
            .collect()
    }
}
