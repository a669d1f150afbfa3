//! Directional light: parallel rays from `position` toward `target`.
//!
//! The viewer parks this light on the ray through the sun marker so its
//! rays roughly agree with the pointer-driven point light.

use glam::Vec3;

/// CPU-side directional light description.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Where the light sits. Only the direction to `target` matters.
    pub position: Vec3,
    /// Point the light aims at.
    pub target: Vec3,
    /// Linear RGB color (not premultiplied by intensity).
    pub color: Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 2.0, 5.0),
            target: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 0.8,
        }
    }
}

impl DirectionalLight {
    /// Unit vector from the surface toward the light.
    ///
    /// Zero when position and target coincide, which switches the light off.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    /// Places the light at `radius` along the direction of `anchor` from the origin.
    ///
    /// An anchor at the origin puts the light on its target, leaving it dark.
    pub fn park_along(&mut self, anchor: Vec3, radius: f32) {
        self.position = anchor.normalize_or_zero() * radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_direction_is_normalized() {
        let light = DirectionalLight::default();
        let dir = light.direction_to_light();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir - Vec3::new(2.0, 2.0, 5.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_park_along_scales_to_radius() {
        let mut light = DirectionalLight::default();
        light.park_along(Vec3::new(0.0, 0.3, 0.4), 5.0);
        assert!((light.position - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-5);
        assert!((light.position.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_anchor_at_origin_disables_light() {
        let mut light = DirectionalLight::default();
        light.park_along(Vec3::ZERO, 5.0);
        assert_eq!(light.position, Vec3::ZERO);
        assert_eq!(light.direction_to_light(), Vec3::ZERO);
    }
}
