//! Spot light: a point light restricted to a cone around its aim.

use glam::Vec3;
use terminus_shading::smoothstep;

use crate::point::distance_attenuation;

/// CPU-side spot light.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Cone half angle in radians.
    pub angle: f32,
    /// Fraction of the cone that fades toward the rim.
    pub penumbra: f32,
    /// Cutoff distance; `0` means unbounded.
    pub distance: f32,
    pub decay: f32,
}

/// Angular falloff for a fragment whose direction from the light makes
/// `angle_cos` with the spot axis.
///
/// With no penumbra the cone edge is a hard step.
pub fn cone_attenuation(angle_cos: f32, cone_cos: f32, penumbra_cos: f32) -> f32 {
    smoothstep(cone_cos, penumbra_cos, angle_cos)
}

impl SpotLight {
    /// Unit vector from the light toward its target.
    pub fn axis(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// `cos` of the cone half angle.
    pub fn cone_cos(&self) -> f32 {
        self.angle.cos()
    }

    /// `cos` of the fully lit inner angle.
    pub fn penumbra_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }

    /// Combined distance and cone attenuation at `point`.
    pub fn attenuation_at(&self, point: Vec3) -> f32 {
        let to_point = point - self.position;
        let d = to_point.length();
        let angle_cos = to_point.normalize_or_zero().dot(self.axis());
        cone_attenuation(angle_cos, self.cone_cos(), self.penumbra_cos())
            * distance_attenuation(d, self.distance, self.decay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overhead_spot(penumbra: f32) -> SpotLight {
        SpotLight {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra,
            distance: 0.0,
            decay: 2.0,
        }
    }

    #[test]
    fn test_target_is_inside_cone() {
        let spot = overhead_spot(0.0);
        let d2 = spot.position.length_squared();
        assert!((spot.attenuation_at(Vec3::ZERO) - 1.0 / d2).abs() < 1e-6);
    }

    #[test]
    fn test_point_behind_light_is_dark() {
        let spot = overhead_spot(0.0);
        assert_eq!(spot.attenuation_at(Vec3::new(0.0, 6.0, 6.0)), 0.0);
    }

    #[test]
    fn test_hard_edge_without_penumbra() {
        assert_eq!(cone_attenuation(0.6, 0.5, 0.5), 1.0);
        assert_eq!(cone_attenuation(0.4, 0.5, 0.5), 0.0);
    }

    #[test]
    fn test_penumbra_softens_edge() {
        let spot = overhead_spot(0.5);
        let mid = (spot.cone_cos() + spot.penumbra_cos()) * 0.5;
        let a = cone_attenuation(mid, spot.cone_cos(), spot.penumbra_cos());
        assert!((a - 0.5).abs() < 1e-4);
    }
}
