//! Rotations, translations and camera orientation state

use nalgebra::{Point3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Convert degrees to radians
pub fn degrees(value: f64) -> f64 {
    value.to_radians()
}

/// Camera orientation on its orbit around the origin (in radians)
///
/// `phi` is the polar angle measured from +Z, `theta` the azimuth measured
/// from +X in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub phi: f64,
    pub theta: f64,
}

impl Orientation {
    pub fn new(phi: f64, theta: f64) -> Self {
        Self { phi, theta }
    }

    pub fn from_degrees(phi: f64, theta: f64) -> Self {
        Self::new(degrees(phi), degrees(theta))
    }

    /// Looking straight down -Z with X to the right and Y up
    pub fn top_down() -> Self {
        Self::new(0.0, -FRAC_PI_2)
    }

    /// Linear interpolation between two orientations
    pub fn lerp(&self, to: &Orientation, alpha: f64) -> Orientation {
        Orientation {
            phi: self.phi + (to.phi - self.phi) * alpha,
            theta: self.theta + (to.theta - self.theta) * alpha,
        }
    }

    pub fn approx_eq(&self, other: &Orientation, eps: f64) -> bool {
        (self.phi - other.phi).abs() < eps && (self.theta - other.theta).abs() < eps
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::top_down()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation taking world space into camera space for an orientation.
    ///
    /// Applies a turn of `-(theta + 90°)` about Z, then `-phi` about X.
    pub fn view_rotation(orientation: &Orientation) -> Rotation3<f64> {
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), -orientation.theta - FRAC_PI_2);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), -orientation.phi);
        rx * rz
    }

    /// Rotation by `angle` radians about `axis`
    pub fn rotation_about(axis: &Unit<Vector3<f64>>, angle: f64) -> Rotation3<f64> {
        Rotation3::from_axis_angle(axis, angle)
    }

    /// Point part-way between `from` and `to`
    pub fn interpolate(from: &Point3<f64>, to: &Point3<f64>, alpha: f64) -> Point3<f64> {
        from + (to - from) * alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orientation_lerp() {
        let from = Orientation::from_degrees(75.0, -30.0);
        let to = Orientation::from_degrees(90.0, -90.0);
        let mid = from.lerp(&to, 0.5);
        assert_relative_eq!(mid.phi, degrees(82.5), epsilon = 1e-12);
        assert_relative_eq!(mid.theta, degrees(-60.0), epsilon = 1e-12);
        assert!(from.lerp(&to, 1.0).approx_eq(&to, 1e-12));
    }

    #[test]
    fn test_top_down_view_is_identity() {
        let rotation = Transform::view_rotation(&Orientation::top_down());
        assert_relative_eq!(rotation.matrix(), Rotation3::<f64>::identity().matrix(), epsilon = 1e-12);
    }

    #[test]
    fn test_head_on_view_looks_along_y() {
        // phi = 90°, theta = -90°: world +Z is screen up, world +Y points away.
        let rotation = Transform::view_rotation(&Orientation::from_degrees(90.0, -90.0));
        let up = rotation * Vector3::z();
        let away = rotation * Vector3::y();
        assert_relative_eq!(up, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(away, -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let from = Point3::new(0.0, 0.0, 0.0);
        let to = Point3::new(0.0, 3.0, 0.0);
        assert_relative_eq!(Transform::interpolate(&from, &to, 0.0), from);
        assert_relative_eq!(Transform::interpolate(&from, &to, 1.0), to);
        assert_relative_eq!(
            Transform::interpolate(&from, &to, 0.5),
            Point3::new(0.0, 1.5, 0.0)
        );
    }
}
