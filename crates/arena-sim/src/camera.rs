//! Camera viewport for render snapshots.
//!
//! Follows the player and maps world points to screen pixels.

use arena_combat::Viewport;
use arena_common::Vec2;

/// Minimum zoom level (zoomed out).
pub const MIN_ZOOM: f32 = 0.25;

/// Maximum zoom level (zoomed in).
pub const MAX_ZOOM: f32 = 4.0;

/// 2D camera centred on a world point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world coordinates (center of view).
    pub position: Vec2,
    /// Zoom level (1.0 = 1:1 pixel mapping).
    pub zoom: f32,
    /// Viewport size in pixels.
    pub viewport_size: Vec2,
}

impl Camera {
    /// Creates a camera with the given viewport size and zoom.
    #[must_use]
    pub fn new(viewport_size: Vec2, zoom: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport_size,
        }
    }

    /// Center camera on world position.
    pub fn center_on(&mut self, world: Vec2) {
        self.position = world;
    }

    /// Convert screen coordinates to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.position + (screen - self.viewport_size / 2.0) / self.zoom
    }

    /// Check if a world point is visible on screen.
    #[must_use]
    pub fn is_visible(&self, world: Vec2) -> bool {
        self.is_on_screen(self.world_to_screen(world))
    }

    /// Check if a screen-space point lies inside the viewport.
    #[must_use]
    pub fn is_on_screen(&self, screen: Vec2) -> bool {
        screen.cmpge(Vec2::ZERO).all() && screen.cmple(self.viewport_size).all()
    }
}

impl Viewport for Camera {
    fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom + self.viewport_size / 2.0
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_round_trip() {
        let mut camera = Camera::new(Vec2::new(1280.0, 720.0), 2.0);
        camera.center_on(Vec2::new(100.0, 50.0));

        assert_eq!(camera.world_to_screen(Vec2::new(100.0, 50.0)), Vec2::new(640.0, 360.0));
        let world = camera.screen_to_world(Vec2::new(0.0, 0.0));
        assert_eq!(world, Vec2::new(-220.0, -130.0));
    }

    #[test]
    fn test_visibility() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0), 1.0);
        camera.center_on(Vec2::new(400.0, 300.0));
        assert!(camera.is_visible(Vec2::new(10.0, 10.0)));
        assert!(!camera.is_visible(Vec2::new(-10.0, 10.0)));
        assert!(camera.is_on_screen(Vec2::new(800.0, 600.0)));
        assert!(!camera.is_on_screen(Vec2::new(800.1, 0.0)));
    }

    #[test]
    fn test_zoom_is_clamped() {
        assert_eq!(Camera::new(Vec2::ONE, 100.0).zoom, MAX_ZOOM);
        assert_eq!(Camera::new(Vec2::ONE, 0.0).zoom, MIN_ZOOM);
    }
}
