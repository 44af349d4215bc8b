//! Scene-to-frame rendering: projects every visible node into a
//! depth-sorted list of 2D drawing primitives

use nalgebra::{Point2, Point3, Rotation3};

use crate::projection::{Camera, ScreenPoint};
use crate::scene::{Node, Shape, Stage};
use crate::style::{Color, Style, BLACK, GREY};

/// Stroke widths are specified for this frame height
const REFERENCE_HEIGHT: f64 = 1080.0;

/// World units of text height per font point
const TEXT_UNITS_PER_POINT: f64 = 1.0 / 96.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Pixels
    pub width: f64,
    /// Dash length in pixels, `None` for solid
    pub dash: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon {
        points: Vec<Point2<f64>>,
        fill: Color,
        fill_opacity: f64,
        stroke: Option<Stroke>,
    },
    Segment {
        from: Point2<f64>,
        to: Point2<f64>,
        stroke: Stroke,
    },
    Disc {
        center: Point2<f64>,
        radius: f64,
        color: Color,
        opacity: f64,
    },
    Text {
        position: Point2<f64>,
        text: String,
        size: f64,
        color: Color,
    },
}

/// A primitive tagged with its camera-space depth (larger is nearer)
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub depth: f64,
    pub primitive: Primitive,
}

/// One rendered picture, items ordered back to front
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub items: Vec<DrawItem>,
}

/// Render the visible nodes of `stage` as seen by its camera
pub fn render_frame(stage: &Stage) -> Frame {
    let mut painter = Painter::new(&stage.camera);
    for node in stage.visible() {
        painter.node(node);
    }

    let mut items = painter.items;
    // Painter's algorithm: farthest first. The sort is stable, so equal
    // depths keep scene order.
    items.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    Frame {
        width: stage.camera.pixel_width,
        height: stage.camera.pixel_height,
        background: BLACK,
        items,
    }
}

/// The first `fraction` of a closed outline, by arc length
pub fn partial_outline(points: &[Point3<f64>], fraction: f64) -> Vec<(Point3<f64>, Point3<f64>)> {
    let edges: Vec<_> = (0..points.len())
        .map(|i| (points[i], points[(i + 1) % points.len()]))
        .collect();
    let perimeter: f64 = edges.iter().map(|(a, b)| (b - a).norm()).sum();

    let mut remaining = perimeter * fraction.clamp(0.0, 1.0);
    let mut drawn = Vec::new();
    for (a, b) in edges {
        if remaining <= 0.0 {
            break;
        }
        let length = (b - a).norm();
        if length <= remaining {
            drawn.push((a, b));
        } else {
            drawn.push((a, a + (b - a) * (remaining / length)));
        }
        remaining -= length;
    }
    drawn
}

struct Painter<'a> {
    camera: &'a Camera,
    rotation: Rotation3<f64>,
    unit: f64,
    stroke_scale: f64,
    items: Vec<DrawItem>,
}

impl<'a> Painter<'a> {
    fn new(camera: &'a Camera) -> Self {
        Self {
            camera,
            rotation: camera.view_rotation(),
            unit: camera.pixels_per_unit(),
            stroke_scale: camera.pixel_height as f64 / REFERENCE_HEIGHT,
            items: Vec::new(),
        }
    }

    fn project(&self, point: &Point3<f64>) -> Option<ScreenPoint> {
        self.camera.project_with(&self.rotation, point)
    }

    fn stroke(&self, style: &Style, scale: f64) -> Stroke {
        Stroke {
            color: style.color,
            width: (style.stroke_width * self.stroke_scale).max(0.5),
            dash: style.dash_length.map(|d| d * self.unit * scale),
        }
    }

    fn node(&mut self, node: &Node) {
        let reveal = node.reveal.clamp(0.0, 1.0);
        match &node.shape {
            Shape::Axes(axes) => {
                let style = Style {
                    color: GREY,
                    ..node.style
                };
                for (start, end) in axes.lines().into_iter().chain(axes.ticks()) {
                    let end = start + (end - start) * reveal;
                    self.segment(&start, &end, &style);
                }
            }
            Shape::Cube(cube) => {
                for face in cube.faces() {
                    self.polygon(&face, &node.style, reveal);
                }
            }
            Shape::Plane(plane) => self.polygon(&plane.corners(), &node.style, reveal),
            Shape::Dot { center, radius } => {
                if let Some(p) = self.project(center) {
                    self.items.push(DrawItem {
                        depth: p.depth,
                        primitive: Primitive::Disc {
                            center: p.position,
                            radius: radius * self.unit * p.scale,
                            color: node.style.color,
                            opacity: reveal,
                        },
                    });
                }
            }
            Shape::Line { start, end } => {
                let end = start + (end - start) * reveal;
                self.segment(start, &end, &node.style);
            }
            Shape::Label {
                text,
                anchor,
                font_size,
            } => {
                let count = text.chars().count();
                let shown = ((count as f64) * reveal).ceil() as usize;
                if let Some(p) = self.project(anchor) {
                    self.items.push(DrawItem {
                        depth: p.depth,
                        primitive: Primitive::Text {
                            position: p.position,
                            text: text.chars().take(shown).collect(),
                            size: font_size * TEXT_UNITS_PER_POINT * self.unit * p.scale,
                            color: node.style.color,
                        },
                    });
                }
            }
        }
    }

    fn segment(&mut self, start: &Point3<f64>, end: &Point3<f64>, style: &Style) {
        let (Some(a), Some(b)) = (self.project(start), self.project(end)) else {
            return;
        };
        let stroke = self.stroke(style, (a.scale + b.scale) / 2.0);
        self.items.push(DrawItem {
            depth: (a.depth + b.depth) / 2.0,
            primitive: Primitive::Segment {
                from: a.position,
                to: b.position,
                stroke,
            },
        });
    }

    /// Fill fades in with `reveal` while the outline is traced
    fn polygon(&mut self, corners: &[Point3<f64>], style: &Style, reveal: f64) {
        let projected: Option<Vec<ScreenPoint>> = corners.iter().map(|c| self.project(c)).collect();
        let Some(projected) = projected else {
            return;
        };
        let depth = projected.iter().map(|p| p.depth).sum::<f64>() / projected.len() as f64;
        let scale = projected.iter().map(|p| p.scale).sum::<f64>() / projected.len() as f64;

        let complete = reveal >= 1.0;
        let stroke = self.stroke(style, scale);
        self.items.push(DrawItem {
            depth,
            primitive: Primitive::Polygon {
                points: projected.iter().map(|p| p.position).collect(),
                fill: style.color,
                fill_opacity: style.fill_opacity * reveal,
                stroke: complete.then(|| stroke.clone()),
            },
        });

        if !complete {
            for (a, b) in partial_outline(corners, reveal) {
                if let (Some(pa), Some(pb)) = (self.project(&a), self.project(&b)) {
                    self.items.push(DrawItem {
                        depth,
                        primitive: Primitive::Segment {
                            from: pa.position,
                            to: pb.position,
                            stroke: stroke.clone(),
                        },
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axes, Cube};
    use crate::scene::{FrameRecorder, Scene};
    use crate::config::RenderConfig;
    use crate::style::{BLUE, WHITE, YELLOW};
    use approx::assert_relative_eq;

    fn scene() -> Scene<FrameRecorder> {
        let config = RenderConfig {
            pixel_width: Some(640),
            pixel_height: Some(360),
            frame_rate: Some(4),
            ..RenderConfig::default()
        }
        .resolve()
        .unwrap();
        Scene::new("RenderTest", config, FrameRecorder::default())
    }

    #[test]
    fn test_partial_outline_lengths() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(partial_outline(&square, 1.0).len(), 4);
        assert!(partial_outline(&square, 0.0).is_empty());

        let half = partial_outline(&square, 0.5);
        assert_eq!(half.len(), 2);
        assert_relative_eq!(half[1].1, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);

        let eighth = partial_outline(&square, 0.125);
        assert_relative_eq!(eighth[0].1, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_cube_renders_six_faces() {
        let mut scene = scene();
        scene.add(Node::new(
            "cube",
            Shape::Cube(Cube::new(2.0)),
            Style::filled(BLUE, 0.5, 1.0),
        ));
        let frame = render_frame(scene.stage());
        let polygons = frame
            .items
            .iter()
            .filter(|item| matches!(item.primitive, Primitive::Polygon { .. }))
            .count();
        assert_eq!(polygons, 6);
        assert_eq!((frame.width, frame.height), (640, 360));
    }

    #[test]
    fn test_items_sorted_back_to_front() {
        let mut scene = scene();
        scene.add(Node::new("axes", Shape::Axes(Axes::default()), Style::stroke(WHITE, 2.0)));
        scene.add(Node::new(
            "cube",
            Shape::Cube(Cube::new(2.0)),
            Style::filled(BLUE, 0.5, 1.0),
        ));
        let frame = render_frame(scene.stage());
        assert!(frame.items.windows(2).all(|w| w[0].depth <= w[1].depth));
    }

    #[test]
    fn test_partially_revealed_line_and_label() {
        let mut scene = scene();
        let line = scene.add(Node::new(
            "line",
            Shape::Line {
                start: Point3::new(0.0, 0.0, 0.0),
                end: Point3::new(2.0, 0.0, 0.0),
            },
            Style::stroke(YELLOW, 4.0).dashed(),
        ));
        let label = scene.add(Node::new(
            "label",
            Shape::Label {
                text: "Screen".into(),
                anchor: Point3::origin(),
                font_size: 20.0,
            },
            Style::stroke(WHITE, 1.0),
        ));

        let mut stage = scene.stage().clone();
        stage.node_mut(line).unwrap().reveal = 0.5;
        stage.node_mut(label).unwrap().reveal = 0.5;
        let frame = render_frame(&stage);

        let mut saw_line = false;
        let mut saw_text = false;
        for item in &frame.items {
            match &item.primitive {
                Primitive::Segment { from, to, stroke } => {
                    // Half of two units at 45 px per unit
                    assert_relative_eq!((to - from).norm(), 45.0, epsilon = 1e-9);
                    assert!(stroke.dash.is_some());
                    saw_line = true;
                }
                Primitive::Text { text, .. } => {
                    assert_eq!(text, "Scr");
                    saw_text = true;
                }
                other => panic!("unexpected primitive {other:?}"),
            }
        }
        assert!(saw_line && saw_text);
    }
}
