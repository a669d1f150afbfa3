//! Point light with a decay exponent and an optional cutoff distance.

use glam::Vec3;

/// CPU-side point light descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Luminous intensity.
    pub intensity: f32,
    /// Cutoff distance; `0` means unbounded.
    pub distance: f32,
    /// Falloff exponent, `2` for inverse-square.
    pub decay: f32,
}

/// Attenuation at `d` units from a light with the given cutoff and decay.
///
/// Inverse power falloff, floored at `0.01` to avoid a singularity at the
/// light, multiplied by a window `(1 - (d/cutoff)^4)^2` that reaches exactly
/// zero at the cutoff. The same expression is evaluated in `cloud.wgsl`.
pub fn distance_attenuation(d: f32, cutoff: f32, decay: f32) -> f32 {
    let falloff = 1.0 / d.powf(decay).max(0.01);
    if cutoff > 0.0 {
        let ratio = d / cutoff;
        let window = (1.0 - ratio * ratio * ratio * ratio).clamp(0.0, 1.0);
        falloff * window * window
    } else {
        falloff
    }
}

impl PointLight {
    /// Irradiance scale at `point`, before the cosine term.
    pub fn attenuation_at(&self, point: Vec3) -> f32 {
        distance_attenuation(self.position.distance(point), self.distance, self.decay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_square_without_cutoff() {
        assert!((distance_attenuation(2.0, 0.0, 2.0) - 0.25).abs() < 1e-6);
        assert!((distance_attenuation(4.0, 0.0, 2.0) - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_zero_at_and_beyond_cutoff() {
        assert_eq!(distance_attenuation(10.0, 10.0, 2.0), 0.0);
        assert_eq!(distance_attenuation(12.0, 10.0, 2.0), 0.0);
    }

    #[test]
    fn test_singularity_is_floored() {
        assert!((distance_attenuation(0.0, 10.0, 2.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_window_barely_affects_near_field() {
        let windowed = distance_attenuation(1.0, 10.0, 2.0);
        let raw = distance_attenuation(1.0, 0.0, 2.0);
        assert!((windowed - raw).abs() < 1e-3);
        assert!(windowed <= raw);
    }

    #[test]
    fn test_attenuation_decreases_with_distance() {
        let light = PointLight {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.5,
            distance: 10.0,
            decay: 2.0,
        };
        let mut prev = f32::INFINITY;
        for i in 1..=20 {
            let a = light.attenuation_at(Vec3::new(i as f32 * 0.5, 0.0, 0.0));
            assert!(a <= prev);
            prev = a;
        }
        assert_eq!(prev, 0.0);
    }
}
