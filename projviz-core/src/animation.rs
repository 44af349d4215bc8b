//! Timed transitions played by a [`Scene`](crate::scene::Scene).
//!
//! An [`Animation`] names what should change. When a scene plays it, the
//! animation is resolved against the scene's current state into a
//! [`Transition`], which knows both endpoints and can be sampled at any
//! `alpha` in `[0, 1]`.

use nalgebra::Point3;

use crate::scene::{NodeId, Stage};
use crate::transform::{Orientation, Transform};

/// Easing curve mapping elapsed time `t` to interpolation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateFunc {
    Linear,
    #[default]
    Smooth,
}

impl RateFunc {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            RateFunc::Linear => linear(t),
            RateFunc::Smooth => smooth(t),
        }
    }
}

pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Sigmoid ease-in-out, rescaled so `smooth(0) == 0` and `smooth(1) == 1`
pub fn smooth(t: f64) -> f64 {
    const INFLECTION: f64 = 10.0;
    let sigmoid = |x: f64| 1.0 / (1.0 + (-x).exp());
    let error = sigmoid(-INFLECTION / 2.0);
    ((sigmoid(INFLECTION * (t - 0.5)) - error) / (1.0 - 2.0 * error)).clamp(0.0, 1.0)
}

/// A change requested of the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Draw a node's outline progressively and fade its fill in
    Create(NodeId),
    /// Reveal a label's text one character at a time
    Write(NodeId),
    /// Slide a node so its center ends at `target`
    MoveTo { node: NodeId, target: Point3<f64> },
    /// Swing the camera to a new orientation
    MoveCamera { phi: f64, theta: f64 },
}

impl Animation {
    /// Text is written at a constant pace; everything else eases in and out
    pub fn rate_func(&self) -> RateFunc {
        match self {
            Animation::Write(_) => RateFunc::Linear,
            _ => RateFunc::Smooth,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Animation::Create(id) => format!("Create({id})"),
            Animation::Write(id) => format!("Write({id})"),
            Animation::MoveTo { node, target } => {
                format!("MoveTo({node} -> [{:.2}, {:.2}, {:.2}])", target.x, target.y, target.z)
            }
            Animation::MoveCamera { phi, theta } => format!(
                "MoveCamera(phi={:.1}°, theta={:.1}°)",
                phi.to_degrees(),
                theta.to_degrees()
            ),
        }
    }
}

/// An animation bound to its start and end state
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Reveal {
        node: NodeId,
    },
    Move {
        node: NodeId,
        from: Point3<f64>,
        to: Point3<f64>,
    },
    Camera {
        from: Orientation,
        to: Orientation,
    },
}

impl Transition {
    /// Write the state at progress `alpha` into `stage`.
    ///
    /// `stage` must hold the state the transition started from.
    pub fn apply(&self, stage: &mut Stage, alpha: f64) {
        match self {
            Transition::Reveal { node } => {
                if let Some(node) = stage.node_mut(*node) {
                    node.reveal = alpha;
                }
            }
            Transition::Move { node, from, to } => {
                if let Some(node) = stage.node_mut(*node) {
                    let position = Transform::interpolate(from, to, alpha);
                    let delta = position - node.shape.center();
                    node.shape.shift(&delta);
                }
            }
            Transition::Camera { from, to } => {
                stage.camera.orientation = from.lerp(to, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rate_functions_hit_endpoints() {
        for rate in [RateFunc::Linear, RateFunc::Smooth] {
            assert_relative_eq!(rate.apply(0.0), 0.0, epsilon = 1e-12);
            assert_relative_eq!(rate.apply(1.0), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(smooth(0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rate_functions_are_monotonic() {
        for rate in [RateFunc::Linear, RateFunc::Smooth] {
            let samples: Vec<f64> = (0..=100).map(|i| rate.apply(i as f64 / 100.0)).collect();
            assert!(samples.windows(2).all(|w| w[1] >= w[0]), "{rate:?} is not monotonic");
        }
    }

    #[test]
    fn test_write_paces_linearly() {
        let label = Animation::Write(NodeId(0));
        assert_eq!(label.rate_func(), RateFunc::Linear);
        assert_eq!(Animation::Create(NodeId(0)).rate_func(), RateFunc::Smooth);
        assert_eq!(
            Animation::MoveCamera { phi: 0.0, theta: 0.0 }.rate_func(),
            RateFunc::Smooth
        );
    }

    #[test]
    fn test_smooth_eases_in() {
        assert!(smooth(0.1) < 0.1);
        assert!(smooth(0.9) > 0.9);
    }
}
