/// Viewport dimensions and perspective projection
use crate::config::ProjectionConfig;
use crate::transform::{Mat4, Transform};

/// Drawable area in backend units.
///
/// `pixel_aspect` is the height of one unit relative to its width: 1.0 for
/// square pixels, about 2.0 for terminal character cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_aspect: f32,
}

impl Viewport {
    /// Zero dimensions (a minimised host) are raised to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_aspect: 1.0,
        }
    }

    /// # Panics
    ///
    /// Panics if `pixel_aspect` is not positive.
    pub fn with_pixel_aspect(mut self, pixel_aspect: f32) -> Self {
        assert!(pixel_aspect > 0.0, "pixel aspect must be positive, got {pixel_aspect}");
        self.pixel_aspect = pixel_aspect;
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Physical width over physical height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / (self.height as f32 * self.pixel_aspect)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Create the projection matrix for a viewport
pub fn projection_matrix(config: &ProjectionConfig, viewport: &Viewport) -> Mat4 {
    Transform::perspective(config.fov_y, viewport.aspect(), config.near, config.far)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        let viewport = Viewport::new(800, 600);
        assert!((viewport.aspect() - 800.0 / 600.0).abs() < 1e-6);

        let cells = Viewport::new(120, 40).with_pixel_aspect(2.0);
        assert!((cells.aspect() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_is_raised() {
        let mut viewport = Viewport::new(0, 0);
        assert_eq!((viewport.width(), viewport.height()), (1, 1));
        viewport.resize(640, 0);
        assert_eq!((viewport.width(), viewport.height()), (640, 1));
        assert!(viewport.aspect() > 0.0);
    }

    #[test]
    fn test_projection_uses_viewport_aspect() {
        let config = ProjectionConfig::default();
        let wide = projection_matrix(&config, &Viewport::new(1600, 800));
        let square = projection_matrix(&config, &Viewport::new(800, 800));
        assert!((wide[(0, 0)] * 2.0 - square[(0, 0)]).abs() < 1e-5);
        assert_eq!(wide[(1, 1)], square[(1, 1)]);
    }
}
