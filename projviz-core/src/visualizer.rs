//! The cube-to-screen projection animation.
//!
//! A cube ("Game Object") slides toward a rectangle ("Screen"). The four
//! corners of its face nearest the screen are dropped orthogonally onto the
//! screen and joined into the projected quadrilateral. The camera then turns
//! to face the screen head-on and finally to a second oblique angle.

use std::f64::consts::FRAC_PI_2;

use log::info;
use nalgebra::{Point3, Vector3};

use crate::animation::Animation;
use crate::error::{Result, VizError};
use crate::geometry::{
    loop_order, project_along_axis, Axes, Axis, Cube, Plane, LEFT, OUT, QUAD_EDGES, UP,
};
use crate::scene::{FrameSink, Node, NodeId, Scene, Shape};
use crate::style::{Style, BLUE, BLUE_E, GREEN, RED, WHITE, YELLOW};
use crate::transform::Orientation;

pub const SCENE_NAME: &str = "CubeProjectionScene";

pub const CUBE_SIDE: f64 = 2.0;
pub const PLANE_WIDTH: f64 = 7.0;
pub const PLANE_HEIGHT: f64 = 4.0;
pub const LABEL_FONT_SIZE: f64 = 20.0;
/// Gap between a label and the object it names
pub const LABEL_BUFF: f64 = 0.25;
pub const VERTEX_DOT_RADIUS: f64 = 0.05;
pub const PROJECTED_DOT_RADIUS: f64 = 0.08;
pub const EDGE_STROKE_WIDTH: f64 = 3.0;

/// Length of every transition and pause, in seconds
pub const STEP_SECONDS: f64 = 1.0;

pub fn plane_center() -> Point3<f64> {
    Point3::new(0.0, -3.0, 0.0)
}

pub fn cube_target() -> Point3<f64> {
    Point3::new(0.0, 3.0, 0.0)
}

/// First oblique view, before anything is drawn
pub fn oblique_start() -> Orientation {
    Orientation::from_degrees(75.0, -30.0)
}

/// Looking straight at the screen
pub fn head_on() -> Orientation {
    Orientation::from_degrees(90.0, -90.0)
}

/// Closing oblique view
pub fn oblique_end() -> Orientation {
    Orientation::from_degrees(60.0, -60.0)
}

/// Where the cube's label sits for a cube centered at `center`
fn cube_label_anchor(center: &Point3<f64>) -> Point3<f64> {
    center + UP * (CUBE_SIDE / 2.0 + LABEL_BUFF)
}

fn label(name: &str, text: &str, anchor: Point3<f64>) -> Node {
    Node::new(
        name,
        Shape::Label {
            text: text.to_string(),
            anchor,
            font_size: LABEL_FONT_SIZE,
        },
        Style::stroke(WHITE, 1.0),
    )
}

/// Node handles and geometry produced while the scene is built
#[derive(Debug, Clone)]
pub struct Construction {
    pub axes: NodeId,
    pub cube: NodeId,
    pub plane: NodeId,
    pub cube_label: NodeId,
    pub plane_label: NodeId,
    /// Corners of the cube face nearest the screen
    pub vertices: [Point3<f64>; 4],
    /// Each vertex dropped onto the screen
    pub projections: [Point3<f64>; 4],
    pub vertex_dots: Vec<NodeId>,
    pub projection_lines: Vec<NodeId>,
    pub projected_dots: Vec<NodeId>,
    pub projected_edges: Vec<NodeId>,
}

/// Builds and plays the projection scene
#[derive(Debug, Clone)]
pub struct ProjectionVisualizer {
    cube: Cube,
    plane: Plane,
}

impl Default for ProjectionVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionVisualizer {
    pub fn new() -> Self {
        let plane = Plane::new(PLANE_WIDTH, PLANE_HEIGHT)
            .move_to(plane_center())
            .rotate(FRAC_PI_2, &Vector3::x_axis());
        Self {
            cube: Cube::new(CUBE_SIDE),
            plane,
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Play the whole sequence into `scene`
    pub fn run<S: FrameSink>(&self, scene: &mut Scene<S>) -> Result<Construction> {
        info!("building {}", scene.name());

        let (axes, cube, plane, cube_label, plane_label) = self.add_objects(scene);

        let start = oblique_start();
        scene.move_camera(start.phi, start.theta, STEP_SECONDS)?;

        scene.play(
            &[
                Animation::Create(cube),
                Animation::Create(plane),
                Animation::Write(cube_label),
                Animation::Write(plane_label),
            ],
            STEP_SECONDS,
        )?;

        let target = cube_target();
        scene.play(
            &[
                Animation::MoveTo { node: cube, target },
                Animation::MoveTo {
                    node: cube_label,
                    target: cube_label_anchor(&target),
                },
            ],
            STEP_SECONDS,
        )?;

        let vertices = self.select_face(scene, cube)?;
        let vertex_dots = self.mark_vertices(scene, &vertices)?;
        let (projections, projection_lines, projected_dots) =
            self.project_vertices(scene, &vertices)?;
        let projected_edges = self.connect_projections(scene, &projections)?;

        self.present(scene)?;

        Ok(Construction {
            axes,
            cube,
            plane,
            cube_label,
            plane_label,
            vertices,
            projections,
            vertex_dots,
            projection_lines,
            projected_dots,
            projected_edges,
        })
    }

    /// Axes go on stage at once; cube, screen and labels wait to be drawn
    fn add_objects<S: FrameSink>(
        &self,
        scene: &mut Scene<S>,
    ) -> (NodeId, NodeId, NodeId, NodeId, NodeId) {
        let axes = scene.add(Node::new(
            "axes",
            Shape::Axes(Axes::default()),
            Style::stroke(WHITE, 2.0),
        ));
        let cube = scene.insert(Node::new(
            "cube",
            Shape::Cube(self.cube.clone()),
            Style::filled(BLUE, 0.5, 1.0),
        ));
        let plane = scene.insert(Node::new(
            "plane",
            Shape::Plane(self.plane.clone()),
            Style::filled(WHITE, 0.5, 1.0),
        ));
        let cube_label = scene.insert(label(
            "cube_label",
            "Game Object",
            cube_label_anchor(&self.cube.center),
        ));
        let plane_label = scene.insert(label(
            "plane_label",
            "Screen",
            self.plane.center + OUT * 1.5 + LEFT * 2.5,
        ));
        (axes, cube, plane, cube_label, plane_label)
    }

    /// Corners of the face that looks at the screen, read from the cube's
    /// current position
    pub fn select_face<S: FrameSink>(
        &self,
        scene: &Scene<S>,
        cube: NodeId,
    ) -> Result<[Point3<f64>; 4]> {
        let Shape::Cube(current) = &scene.node(cube)?.shape else {
            return Err(VizError::UnknownNode(cube));
        };
        let direction = current.face_toward(&self.plane);
        let vertices = current.face_corners(&direction)?;
        info!(
            "face toward screen: direction [{:.0}, {:.0}, {:.0}]",
            direction.x, direction.y, direction.z
        );
        Ok(vertices)
    }

    fn mark_vertices<S: FrameSink>(
        &self,
        scene: &mut Scene<S>,
        vertices: &[Point3<f64>; 4],
    ) -> Result<Vec<NodeId>> {
        let dots: Vec<NodeId> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                scene.insert(Node::new(
                    format!("vertex_dot_{i}"),
                    Shape::Dot {
                        center: *v,
                        radius: VERTEX_DOT_RADIUS,
                    },
                    Style::filled(RED, 1.0, 0.0),
                ))
            })
            .collect();
        scene.play(&create_all(&dots), STEP_SECONDS)?;
        Ok(dots)
    }

    /// Orthogonal projection of one vertex onto the screen: the coordinate
    /// along the screen's normal is replaced with the screen's own.
    pub fn project(&self, vertex: &Point3<f64>) -> Result<Point3<f64>> {
        let normal = self.plane.normal.into_inner();
        let (axis, _) = Axis::dominant(&normal)
            .ok_or(VizError::DegenerateDirection([normal.x, normal.y, normal.z]))?;
        Ok(project_along_axis(
            vertex,
            axis,
            self.plane.center[axis.index()],
        ))
    }

    #[allow(clippy::type_complexity)]
    fn project_vertices<S: FrameSink>(
        &self,
        scene: &mut Scene<S>,
        vertices: &[Point3<f64>; 4],
    ) -> Result<([Point3<f64>; 4], Vec<NodeId>, Vec<NodeId>)> {
        let mut projections = [Point3::origin(); 4];
        let mut lines = Vec::with_capacity(4);
        let mut dots = Vec::with_capacity(4);

        for (i, vertex) in vertices.iter().enumerate() {
            let projected = self.project(vertex)?;
            projections[i] = projected;

            lines.push(scene.insert(Node::new(
                format!("projection_line_{i}"),
                Shape::Line {
                    start: *vertex,
                    end: projected,
                },
                Style::stroke(YELLOW, 4.0).dashed(),
            )));
            dots.push(scene.insert(Node::new(
                format!("projected_dot_{i}"),
                Shape::Dot {
                    center: projected,
                    radius: PROJECTED_DOT_RADIUS,
                },
                Style::filled(GREEN, 1.0, 0.0),
            )));
        }

        scene.play(&create_all(&lines), STEP_SECONDS)?;
        scene.play(&create_all(&dots), STEP_SECONDS)?;
        Ok((projections, lines, dots))
    }

    fn connect_projections<S: FrameSink>(
        &self,
        scene: &mut Scene<S>,
        projections: &[Point3<f64>; 4],
    ) -> Result<Vec<NodeId>> {
        loop_order(&QUAD_EDGES, projections.len())?;

        let edges: Vec<NodeId> = QUAD_EDGES
            .iter()
            .map(|&(i, j)| {
                scene.insert(Node::new(
                    format!("projected_edge_{i}_{j}"),
                    Shape::Line {
                        start: projections[i],
                        end: projections[j],
                    },
                    Style::stroke(BLUE_E, EDGE_STROKE_WIDTH),
                ))
            })
            .collect();
        scene.play(&create_all(&edges), STEP_SECONDS)?;
        Ok(edges)
    }

    /// Head-on view of the screen, then the closing oblique view
    fn present<S: FrameSink>(&self, scene: &mut Scene<S>) -> Result<()> {
        for view in [head_on(), oblique_end()] {
            scene.move_camera(view.phi, view.theta, STEP_SECONDS)?;
            scene.wait(STEP_SECONDS)?;
        }
        Ok(())
    }
}

fn create_all(ids: &[NodeId]) -> Vec<Animation> {
    ids.iter().copied().map(Animation::Create).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_replaces_second_coordinate() {
        let visualizer = ProjectionVisualizer::new();
        let projected = visualizer.project(&Point3::new(-1.0, 2.0, -1.0)).unwrap();
        assert_relative_eq!(projected, Point3::new(-1.0, -3.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_camera_views_are_distinct() {
        assert!(!oblique_start().approx_eq(&head_on(), 1e-9));
        assert!(!head_on().approx_eq(&oblique_end(), 1e-9));
        assert_relative_eq!(head_on().phi, FRAC_PI_2, epsilon = 1e-12);
    }
}
