//! Explicit scene graph and playback.
//!
//! A [`Scene`] owns every node and the camera. Construction code receives it
//! by `&mut` and changes it through [`Scene::add`], [`Scene::play`],
//! [`Scene::wait`] and [`Scene::move_camera`]. Every sampled frame is handed
//! to a [`FrameSink`].

use std::fmt;

use log::{debug, info};
use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::animation::{Animation, RateFunc, Transition};
use crate::config::ResolvedConfig;
use crate::error::{Result, VizError};
use crate::geometry::{Axes, Cube, Plane};
use crate::projection::Camera;
use crate::render::{render_frame, Frame};
use crate::style::Style;
use crate::transform::Orientation;

/// Handle to a node owned by a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node looks like in world space
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Fixed at the origin; shifting axes has no effect
    Axes(Axes),
    Cube(Cube),
    Plane(Plane),
    Dot {
        center: Point3<f64>,
        radius: f64,
    },
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Label {
        text: String,
        anchor: Point3<f64>,
        font_size: f64,
    },
}

impl Shape {
    pub fn center(&self) -> Point3<f64> {
        match self {
            Shape::Axes(_) => Point3::origin(),
            Shape::Cube(cube) => cube.center,
            Shape::Plane(plane) => plane.center,
            Shape::Dot { center, .. } => *center,
            Shape::Line { start, end } => nalgebra::center(start, end),
            Shape::Label { anchor, .. } => *anchor,
        }
    }

    pub fn shift(&mut self, delta: &Vector3<f64>) {
        match self {
            Shape::Axes(_) => {}
            Shape::Cube(cube) => cube.center += delta,
            Shape::Plane(plane) => plane.center += delta,
            Shape::Dot { center, .. } => *center += delta,
            Shape::Line { start, end } => {
                *start += delta;
                *end += delta;
            }
            Shape::Label { anchor, .. } => *anchor += delta,
        }
    }
}

/// A shape plus its styling and how much of it has been drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub shape: Shape,
    pub style: Style,
    /// 0.0 is not yet drawn, 1.0 fully drawn
    pub reveal: f64,
    on_stage: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, shape: Shape, style: Style) -> Self {
        Self {
            name: name.into(),
            shape,
            style,
            reveal: 1.0,
            on_stage: false,
        }
    }

    pub fn is_on_stage(&self) -> bool {
        self.on_stage
    }
}

/// Everything a single frame is rendered from
#[derive(Debug, Clone)]
pub struct Stage {
    pub camera: Camera,
    nodes: Vec<Node>,
}

impl Stage {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            nodes: Vec::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Nodes that are on stage and at least partly drawn, in insertion order
    pub fn visible(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|node| node.on_stage && node.reveal > 0.0)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

/// Receives each frame as it is rendered
pub trait FrameSink {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()>;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()> {
        (**self).consume(index, frame)
    }
}

/// Feeds both sinks, first one first
impl<A: FrameSink, B: FrameSink> FrameSink for (A, B) {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()> {
        self.0.consume(index, frame)?;
        self.1.consume(index, frame)
    }
}

/// A disabled output
impl<T: FrameSink> FrameSink for Option<T> {
    fn consume(&mut self, index: usize, frame: &Frame) -> Result<()> {
        match self {
            Some(sink) => sink.consume(index, frame),
            None => Ok(()),
        }
    }
}

/// Keeps every frame in memory
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<Frame>,
}

impl FrameSink for FrameRecorder {
    fn consume(&mut self, _index: usize, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// One `play` or `wait` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRecord {
    pub label: String,
    pub start_frame: usize,
    pub frames: usize,
    pub duration_secs: f64,
}

/// What a finished scene produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    pub scene: String,
    pub frame_count: usize,
    pub duration_secs: f64,
    pub camera_history: Vec<Orientation>,
    pub segments: Vec<SegmentRecord>,
}

pub struct Scene<S: FrameSink> {
    name: String,
    config: ResolvedConfig,
    stage: Stage,
    sink: S,
    frames_emitted: usize,
    elapsed: f64,
    camera_history: Vec<Orientation>,
    segments: Vec<SegmentRecord>,
}

impl<S: FrameSink> Scene<S> {
    pub fn new(name: impl Into<String>, config: ResolvedConfig, sink: S) -> Self {
        let camera = Camera::new(config.pixel_width, config.pixel_height);
        Self {
            name: name.into(),
            config,
            stage: Stage::new(camera),
            sink,
            frames_emitted: 0,
            elapsed: 0.0,
            camera_history: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn camera_history(&self) -> &[Orientation] {
        &self.camera_history
    }

    pub fn frames_emitted(&self) -> usize {
        self.frames_emitted
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.stage.node(id).ok_or(VizError::UnknownNode(id))
    }

    /// Put a node on stage immediately, fully drawn
    pub fn add(&mut self, mut node: Node) -> NodeId {
        node.on_stage = true;
        node.reveal = 1.0;
        debug!("add {} ({})", node.name, self.stage.nodes.len());
        self.stage.push(node)
    }

    /// Register a node that stays hidden until a `Create` or `Write` draws it
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.on_stage = false;
        self.stage.push(node)
    }

    /// Play `animations` together over `run_time` seconds.
    ///
    /// Every animation is resolved before the stage is touched, so an error
    /// leaves the scene as it was.
    pub fn play(&mut self, animations: &[Animation], run_time: f64) -> Result<()> {
        let transitions = animations
            .iter()
            .map(|animation| {
                self.prepare(animation)
                    .map(|transition| (transition, animation.rate_func()))
            })
            .collect::<Result<Vec<(Transition, RateFunc)>>>()?;

        for (transition, _) in &transitions {
            if let Transition::Reveal { node } = transition {
                if let Some(node) = self.stage.node_mut(*node) {
                    node.on_stage = true;
                    node.reveal = 0.0;
                }
            }
        }

        let label = animations
            .iter()
            .map(Animation::describe)
            .collect::<Vec<_>>()
            .join(", ");
        let frames = self.frame_count(run_time);
        info!(
            "play [{}] over {run_time:.2}s ({frames} frames) at t={:.2}s",
            label, self.elapsed
        );

        let start_frame = self.frames_emitted;
        for k in 0..frames {
            let t = (k + 1) as f64 / frames as f64;
            let mut stage = self.stage.clone();
            for (transition, rate) in &transitions {
                transition.apply(&mut stage, rate.apply(t));
            }
            let frame = render_frame(&stage);
            self.emit(&frame)?;
        }

        for (transition, _) in &transitions {
            transition.apply(&mut self.stage, 1.0);
            if let Transition::Camera { to, .. } = transition {
                info!(
                    "camera at phi={:.1}°, theta={:.1}°",
                    to.phi.to_degrees(),
                    to.theta.to_degrees()
                );
                self.camera_history.push(*to);
            }
        }

        self.record(label, start_frame, run_time);
        Ok(())
    }

    /// Hold the current picture for `duration` seconds
    pub fn wait(&mut self, duration: f64) -> Result<()> {
        let frames = self.frame_count(duration);
        info!("wait {duration:.2}s ({frames} frames) at t={:.2}s", self.elapsed);

        let start_frame = self.frames_emitted;
        let frame = render_frame(&self.stage);
        for _ in 0..frames {
            self.emit(&frame)?;
        }

        self.record("Wait".to_string(), start_frame, duration);
        Ok(())
    }

    /// Swing the camera to `(phi, theta)` over `run_time` seconds
    pub fn move_camera(&mut self, phi: f64, theta: f64, run_time: f64) -> Result<()> {
        self.play(&[Animation::MoveCamera { phi, theta }], run_time)
    }

    /// Hand back the sink along with a summary of what was played
    pub fn finish(self) -> (S, RenderSummary) {
        let summary = RenderSummary {
            scene: self.name,
            frame_count: self.frames_emitted,
            duration_secs: self.elapsed,
            camera_history: self.camera_history,
            segments: self.segments,
        };
        info!(
            "scene {} finished: {} frames, {:.2}s",
            summary.scene, summary.frame_count, summary.duration_secs
        );
        (self.sink, summary)
    }

    fn prepare(&self, animation: &Animation) -> Result<Transition> {
        match animation {
            Animation::Create(id) | Animation::Write(id) => {
                self.node(*id)?;
                Ok(Transition::Reveal { node: *id })
            }
            Animation::MoveTo { node, target } => {
                let from = self.node(*node)?.shape.center();
                Ok(Transition::Move {
                    node: *node,
                    from,
                    to: *target,
                })
            }
            Animation::MoveCamera { phi, theta } => Ok(Transition::Camera {
                from: self.stage.camera.orientation,
                to: Orientation::new(*phi, *theta),
            }),
        }
    }

    fn frame_count(&self, seconds: f64) -> usize {
        if seconds <= 0.0 {
            return 0;
        }
        ((seconds * self.config.frame_rate as f64).round() as usize).max(1)
    }

    fn emit(&mut self, frame: &Frame) -> Result<()> {
        self.sink.consume(self.frames_emitted, frame)?;
        self.frames_emitted += 1;
        Ok(())
    }

    fn record(&mut self, label: String, start_frame: usize, duration: f64) {
        self.segments.push(SegmentRecord {
            label,
            start_frame,
            frames: self.frames_emitted - start_frame,
            duration_secs: duration,
        });
        self.elapsed += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::style::{BLUE, WHITE};
    use approx::assert_relative_eq;

    fn scene() -> Scene<FrameRecorder> {
        let config = RenderConfig {
            frame_rate: Some(10),
            pixel_width: Some(320),
            pixel_height: Some(180),
            ..RenderConfig::default()
        }
        .resolve()
        .unwrap();
        Scene::new("Test", config, FrameRecorder::default())
    }

    fn cube_node() -> Node {
        Node::new(
            "cube",
            Shape::Cube(Cube::new(2.0)),
            Style::filled(BLUE, 0.5, 1.0),
        )
    }

    #[test]
    fn test_play_emits_frames_and_commits() {
        let mut scene = scene();
        let cube = scene.insert(cube_node());
        assert!(!scene.node(cube).unwrap().is_on_stage());

        scene.play(&[Animation::Create(cube)], 1.0).unwrap();
        let node = scene.node(cube).unwrap();
        assert!(node.is_on_stage());
        assert_relative_eq!(node.reveal, 1.0);
        assert_eq!(scene.frames_emitted(), 10);

        let (recorder, summary) = scene.finish();
        assert_eq!(recorder.frames.len(), 10);
        assert_eq!(summary.segments.len(), 1);
        assert_eq!(summary.segments[0].frames, 10);
    }

    #[test]
    fn test_move_to_interpolates_from_start() {
        let mut scene = scene();
        let cube = scene.add(cube_node());
        let target = Point3::new(0.0, 3.0, 0.0);
        scene
            .play(&[Animation::MoveTo { node: cube, target }], 0.5)
            .unwrap();
        assert_relative_eq!(scene.node(cube).unwrap().shape.center(), target);
    }

    #[test]
    fn test_camera_history_records_each_move() {
        let mut scene = scene();
        scene.move_camera(1.0, -0.5, 0.2).unwrap();
        scene.wait(0.3).unwrap();
        scene.move_camera(0.5, -1.0, 0.2).unwrap();
        assert_eq!(
            scene.camera_history(),
            &[Orientation::new(1.0, -0.5), Orientation::new(0.5, -1.0)]
        );
        assert_eq!(scene.frames_emitted(), 2 + 3 + 2);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let mut scene = scene();
        let bogus = NodeId(42);
        let err = scene.play(&[Animation::Create(bogus)], 1.0).unwrap_err();
        assert!(matches!(err, VizError::UnknownNode(id) if id == bogus));
        assert_eq!(scene.frames_emitted(), 0);
    }

    #[test]
    fn test_failed_play_keeps_drawn_nodes() {
        let mut scene = scene();
        let cube = scene.add(cube_node());
        let err = scene
            .play(&[Animation::Create(cube), Animation::Create(NodeId(99))], 1.0)
            .unwrap_err();
        assert!(matches!(err, VizError::UnknownNode(NodeId(99))));

        let node = scene.node(cube).unwrap();
        assert!(node.is_on_stage());
        assert_relative_eq!(node.reveal, 1.0);
        assert_eq!(scene.stage().visible().count(), 1);
        assert_eq!(scene.frames_emitted(), 0);
    }

    #[test]
    fn test_hidden_nodes_are_not_visible() {
        let mut scene = scene();
        scene.insert(Node::new(
            "plane",
            Shape::Plane(Plane::new(7.0, 4.0)),
            Style::filled(WHITE, 0.5, 1.0),
        ));
        scene.add(cube_node());
        let names: Vec<_> = scene.stage().visible().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cube"]);
    }

    #[test]
    fn test_paired_sinks_both_receive_frames() {
        let config = RenderConfig {
            frame_rate: Some(10),
            ..RenderConfig::default()
        }
        .resolve()
        .unwrap();
        let sinks = (FrameRecorder::default(), None::<FrameRecorder>);
        let mut scene = Scene::new("Pair", config, sinks);
        scene.wait(0.5).unwrap();
        let ((recorder, disabled), summary) = scene.finish();
        assert_eq!(recorder.frames.len(), 5);
        assert!(disabled.is_none());
        assert_eq!(summary.frame_count, 5);
    }

    #[test]
    fn test_wait_zero_emits_nothing() {
        let mut scene = scene();
        scene.wait(0.0).unwrap();
        assert_eq!(scene.frames_emitted(), 0);
    }
}
