//! Camera and projection utilities

use nalgebra::{Point2, Point3, Rotation3};

use crate::transform::{Orientation, Transform};

/// Visible world height at the focal plane
pub const FRAME_HEIGHT: f64 = 8.0;

/// Distance from the eye to the orbit center
pub const DEFAULT_FOCAL_DISTANCE: f64 = 20.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// A point mapped into pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub position: Point2<f64>,
    /// Camera-space depth; larger is nearer the eye
    pub depth: f64,
    /// Perspective magnification at this depth (1.0 for orthographic)
    pub scale: f64,
}

/// Camera orbiting the origin, described by `phi` and `theta`
#[derive(Debug, Clone)]
pub struct Camera {
    pub orientation: Orientation,
    pub focal_distance: f64,
    pub frame_height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            orientation: Orientation::default(),
            focal_distance: DEFAULT_FOCAL_DISTANCE,
            frame_height: FRAME_HEIGHT,
            pixel_width: width,
            pixel_height: height,
            mode: ProjectionMode::Perspective,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.pixel_width as f64 / self.pixel_height as f64
    }

    pub fn frame_width(&self) -> f64 {
        self.frame_height * self.aspect()
    }

    /// Pixels per world unit at the focal plane
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixel_height as f64 / self.frame_height
    }

    /// Current world-to-camera rotation
    pub fn view_rotation(&self) -> Rotation3<f64> {
        Transform::view_rotation(&self.orientation)
    }

    /// Project a 3D point to pixel space.
    ///
    /// Returns `None` when the point sits at or behind the eye.
    pub fn project_to_screen(&self, point: &Point3<f64>) -> Option<ScreenPoint> {
        let rotation = self.view_rotation();
        self.project_with(&rotation, point)
    }

    /// Same as [`Camera::project_to_screen`] with a precomputed rotation
    pub fn project_with(
        &self,
        rotation: &Rotation3<f64>,
        point: &Point3<f64>,
    ) -> Option<ScreenPoint> {
        let view = rotation * point;

        let scale = match self.mode {
            ProjectionMode::Orthographic => 1.0,
            ProjectionMode::Perspective => {
                let distance = self.focal_distance - view.z;
                // Prevent division by near-zero depth values
                if distance < 1e-6 {
                    return None;
                }
                self.focal_distance / distance
            }
        };

        let x = view.x * scale;
        let y = view.y * scale;

        // Convert to screen space
        let screen_x = (x / self.frame_width() + 0.5) * self.pixel_width as f64;
        let screen_y = (0.5 - y / self.frame_height) * self.pixel_height as f64;

        Some(ScreenPoint {
            position: Point2::new(screen_x, screen_y),
            depth: view.z,
            scale,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(1920, 1080);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-9);
        assert_relative_eq!(camera.pixels_per_unit(), 135.0);
    }

    #[test]
    fn test_origin_maps_to_frame_center() {
        let camera = Camera::new(1920, 1080);
        let p = camera.project_to_screen(&Point3::origin()).unwrap();
        assert_relative_eq!(p.position, Point2::new(960.0, 540.0), epsilon = 1e-9);
        assert_relative_eq!(p.scale, 1.0);
    }

    #[test]
    fn test_top_down_orthographic_axes() {
        let mut camera = Camera::new(1920, 1080);
        camera.mode = ProjectionMode::Orthographic;
        let right = camera.project_to_screen(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        let up = camera.project_to_screen(&Point3::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(right.position.x, 960.0 + 135.0, epsilon = 1e-9);
        assert_relative_eq!(up.position.y, 540.0 - 135.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perspective_magnifies_near_points() {
        let camera = Camera::new(1920, 1080);
        let near = camera.project_to_screen(&Point3::new(0.0, 0.0, 10.0)).unwrap();
        assert_relative_eq!(near.scale, 2.0, epsilon = 1e-12);
        assert!(near.depth > 0.0);
        assert!(camera.project_to_screen(&Point3::new(0.0, 0.0, 25.0)).is_none());
    }
}
