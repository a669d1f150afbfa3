//! Tracks the window's physical size across resizes and DPI changes.
//!
//! Wayland can report a zero size before the compositor assigns one; the
//! tracker clamps to 1x1 and stays "unconfigured" until a real size arrives.

pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Current surface size and scale factor.
#[derive(Clone, Debug)]
pub struct SurfaceWrapper {
    size: PhysicalSize,
    scale_factor: f64,
    configured: bool,
}

impl SurfaceWrapper {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            size: PhysicalSize {
                width: physical_width.max(MIN_SURFACE_DIMENSION),
                height: physical_height.max(MIN_SURFACE_DIMENSION),
            },
            scale_factor,
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Records a resize. Returns the new size only if it changed.
    pub fn handle_resize(&mut self, physical_width: u32, physical_height: u32) -> Option<PhysicalSize> {
        let size = PhysicalSize {
            width: physical_width.max(MIN_SURFACE_DIMENSION),
            height: physical_height.max(MIN_SURFACE_DIMENSION),
        };
        if size == self.size {
            return None;
        }
        self.size = size;
        self.configured = true;
        Some(size)
    }

    /// Records a DPI change; the physical size changes with it.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<PhysicalSize> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Whether a non-zero size has been seen.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_waits_for_compositor() {
        let mut wrapper = SurfaceWrapper::new(0, 0, 1.0);
        assert!(!wrapper.is_configured());
        assert_eq!(
            wrapper.physical_size(),
            PhysicalSize {
                width: 1,
                height: 1
            }
        );

        let size = wrapper.handle_resize(1920, 1080).expect("size changed");
        assert_eq!(size.width, 1920);
        assert!(wrapper.is_configured());
    }

    #[test]
    fn test_same_size_is_not_reported() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0);
        assert!(wrapper.handle_resize(1280, 720).is_none());
    }

    #[test]
    fn test_zero_resize_clamps() {
        let mut wrapper = SurfaceWrapper::new(800, 600, 1.0);
        let size = wrapper.handle_resize(0, 0).expect("size changed");
        assert_eq!((size.width, size.height), (1, 1));
    }

    #[test]
    fn test_scale_factor_change() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0);
        let size = wrapper
            .handle_scale_factor_changed(2.0, 2560, 1440)
            .expect("size changed");
        assert_eq!(size.width, 2560);
        assert_eq!(wrapper.scale_factor(), 2.0);
        assert!((size.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}
