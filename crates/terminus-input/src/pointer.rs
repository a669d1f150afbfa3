//! Screen-space pointer normalization.

use glam::Vec2;

/// One pointer position expressed in the two normalized spaces the viewer uses.
///
/// * `ndc`: x and y in `[-1, 1]`, y up. Feeds the camera ray cast.
/// * `uv`: u and v in `[0, 1]`, v up. Feeds the shader's pointer term.
///
/// Only the latest sample is kept; there is no history.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Normalized device coordinates.
    pub ndc: Vec2,
    /// Display UV coordinates.
    pub uv: Vec2,
}

impl PointerSample {
    /// Normalizes a screen position (origin top-left, y down) against the
    /// viewport size. Zero-sized viewports are treated as 1x1.
    pub fn from_screen(x: f32, y: f32, width: f32, height: f32) -> Self {
        let u = x / width.max(1.0);
        let t = y / height.max(1.0);
        Self {
            ndc: Vec2::new(u * 2.0 - 1.0, -t * 2.0 + 1.0),
            uv: Vec2::new(u, 1.0 - t),
        }
    }

    /// The viewport center.
    pub fn center() -> Self {
        Self {
            ndc: Vec2::ZERO,
            uv: Vec2::splat(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_maps_to_uv_zero_one() {
        let s = PointerSample::from_screen(0.0, 0.0, 1280.0, 720.0);
        assert_eq!(s.uv, Vec2::new(0.0, 1.0));
        assert_eq!(s.ndc, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_bottom_right_maps_to_uv_one_zero() {
        let s = PointerSample::from_screen(1280.0, 720.0, 1280.0, 720.0);
        assert_eq!(s.uv, Vec2::new(1.0, 0.0));
        assert_eq!(s.ndc, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_center_matches_helper() {
        let s = PointerSample::from_screen(640.0, 360.0, 1280.0, 720.0);
        assert_eq!(s, PointerSample::center());
    }

    #[test]
    fn test_ndc_and_uv_agree() {
        for &(x, y) in &[(13.0, 700.0), (1000.0, 5.0), (320.0, 480.0)] {
            let s = PointerSample::from_screen(x, y, 1280.0, 720.0);
            let from_uv = s.uv * 2.0 - Vec2::ONE;
            assert!((from_uv - s.ndc).length() < 1e-6);
        }
    }

    #[test]
    fn test_zero_viewport_does_not_divide_by_zero() {
        let s = PointerSample::from_screen(0.0, 0.0, 0.0, 0.0);
        assert!(s.ndc.is_finite());
        assert!(s.uv.is_finite());
    }
}
