//! Geometry primitives for the projection scene

use nalgebra::{Point3, Unit, Vector3};

use crate::error::{Result, VizError};
use crate::transform::Transform;

pub const UP: Vector3<f64> = Vector3::new(0.0, 1.0, 0.0);
pub const DOWN: Vector3<f64> = Vector3::new(0.0, -1.0, 0.0);
pub const RIGHT: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);
pub const LEFT: Vector3<f64> = Vector3::new(-1.0, 0.0, 0.0);
pub const OUT: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
pub const IN: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);

/// Edge order joining the four corners returned by [`Cube::face_corners`]
/// into a closed quadrilateral.
pub const QUAD_EDGES: [(usize, usize); 4] = [(0, 1), (1, 3), (3, 2), (2, 0)];

/// A world axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vector3<f64> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// The two remaining axes, in X, Y, Z order
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Axis carrying the largest absolute component of `v`, with that
    /// component's sign. Returns `None` for the zero vector and for ties.
    pub fn dominant(v: &Vector3<f64>) -> Option<(Axis, f64)> {
        let abs = v.abs();
        let (index, largest) = abs.argmax();
        if largest < 1e-12 {
            return None;
        }
        let tied = (0..3).filter(|&i| (abs[i] - largest).abs() < 1e-12).count();
        if tied > 1 {
            return None;
        }
        let axis = match index {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        };
        Some((axis, v[index].signum()))
    }
}

/// Replace one coordinate of `point` with `value`, keeping the other two.
///
/// This is the orthogonal projection onto the axis-aligned plane
/// `axis = value`.
pub fn project_along_axis(point: &Point3<f64>, axis: Axis, value: f64) -> Point3<f64> {
    let mut projected = *point;
    projected[axis.index()] = value;
    projected
}

/// Walk an edge list and return the visiting order of its points.
///
/// Fails unless every point in `0..points` is the endpoint of exactly two
/// edges and the edges form one closed loop.
pub fn loop_order(edges: &[(usize, usize)], points: usize) -> Result<Vec<usize>> {
    let open = |reason: String| VizError::OpenLoop { points, reason };

    if edges.len() != points || points < 3 {
        return Err(open(format!("expected {points} edges, got {}", edges.len())));
    }

    let mut adjacency = vec![Vec::with_capacity(2); points];
    for &(a, b) in edges {
        if a >= points || b >= points {
            return Err(open(format!("edge ({a}, {b}) is out of range")));
        }
        if a == b {
            return Err(open(format!("edge ({a}, {b}) is degenerate")));
        }
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    if let Some(point) = adjacency.iter().position(|n| n.len() != 2) {
        return Err(open(format!(
            "point {point} is an endpoint of {} edges",
            adjacency[point].len()
        )));
    }

    let mut order = Vec::with_capacity(points);
    let mut previous = usize::MAX;
    let mut current = edges[0].0;
    loop {
        order.push(current);
        let next = if adjacency[current][0] != previous {
            adjacency[current][0]
        } else {
            adjacency[current][1]
        };
        previous = current;
        current = next;
        if current == order[0] {
            break;
        }
        if order.len() == points {
            return Err(open("walk did not return to its start".into()));
        }
    }

    if order.len() != points {
        return Err(open(format!(
            "loop visits {} of {points} points",
            order.len()
        )));
    }
    Ok(order)
}

/// An axis-aligned cube
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub side_length: f64,
    pub center: Point3<f64>,
}

impl Cube {
    /// A cube centered at the origin
    pub fn new(side_length: f64) -> Self {
        Self {
            side_length,
            center: Point3::origin(),
        }
    }

    pub fn at(mut self, center: Point3<f64>) -> Self {
        self.center = center;
        self
    }

    pub fn half(&self) -> f64 {
        self.side_length / 2.0
    }

    /// Corner picked by the sign of each component of `direction`.
    ///
    /// A zero component leaves that coordinate at the center, so
    /// `corner(&DOWN)` is the middle of the bottom face.
    pub fn corner(&self, direction: &Vector3<f64>) -> Point3<f64> {
        let half = self.half();
        let offset = direction.map(|c| {
            if c > 0.0 {
                half
            } else if c < 0.0 {
                -half
            } else {
                0.0
            }
        });
        self.center + offset
    }

    /// All eight corners
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let mut corners = [self.center; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
            *corner = self.corner(&Vector3::new(sign(4), sign(2), sign(1)));
        }
        corners
    }

    /// The four corners of the face whose outward normal is closest to
    /// `direction`.
    ///
    /// With `(u, v)` the two axes other than the face normal, in X, Y, Z
    /// order, the corners come back as `(-u,-v), (-u,+v), (+u,-v), (+u,+v)`.
    /// [`QUAD_EDGES`] joins them into a closed loop. For `DOWN` this is
    /// `DOWN+IN+LEFT, DOWN+OUT+LEFT, DOWN+IN+RIGHT, DOWN+OUT+RIGHT`.
    pub fn face_corners(&self, direction: &Vector3<f64>) -> Result<[Point3<f64>; 4]> {
        let (normal, sign) = Axis::dominant(direction)
            .ok_or(VizError::DegenerateDirection([direction.x, direction.y, direction.z]))?;
        let (u, v) = normal.others();
        let n = normal.unit() * sign;

        let corner = |su: f64, sv: f64| self.corner(&(n + u.unit() * su + v.unit() * sv));
        Ok([
            corner(-1.0, -1.0),
            corner(-1.0, 1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
        ])
    }

    /// Outward direction of the face that looks at `plane`
    pub fn face_toward(&self, plane: &Plane) -> Vector3<f64> {
        let normal = plane.normal.into_inner();
        let side = (plane.center - self.center).dot(&normal);
        if side >= 0.0 {
            normal
        } else {
            -normal
        }
    }

    /// The six faces as corner loops, ready to be drawn as polygons
    pub fn faces(&self) -> Vec<[Point3<f64>; 4]> {
        [RIGHT, LEFT, UP, DOWN, OUT, IN]
            .iter()
            .filter_map(|direction| self.face_corners(direction).ok())
            .map(|c| [c[0], c[1], c[3], c[2]])
            .collect()
    }
}

/// A flat rectangle, e.g. the "screen" the cube is projected onto
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub width: f64,
    pub height: f64,
    pub center: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
    /// Direction of the `width` side
    pub u_axis: Unit<Vector3<f64>>,
    /// Direction of the `height` side
    pub v_axis: Unit<Vector3<f64>>,
}

impl Plane {
    /// A rectangle in the XY plane centered at the origin, facing +Z
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            center: Point3::origin(),
            normal: Vector3::z_axis(),
            u_axis: Vector3::x_axis(),
            v_axis: Vector3::y_axis(),
        }
    }

    pub fn move_to(mut self, center: Point3<f64>) -> Self {
        self.center = center;
        self
    }

    /// Rotate about an axis through the plane's own center
    pub fn rotate(mut self, angle: f64, axis: &Unit<Vector3<f64>>) -> Self {
        let rotation = Transform::rotation_about(axis, angle);
        self.normal = rotation * self.normal;
        self.u_axis = rotation * self.u_axis;
        self.v_axis = rotation * self.v_axis;
        self
    }

    /// Corners in drawing order
    pub fn corners(&self) -> [Point3<f64>; 4] {
        let u = self.u_axis.into_inner() * (self.width / 2.0);
        let v = self.v_axis.into_inner() * (self.height / 2.0);
        [
            self.center - u - v,
            self.center + u - v,
            self.center + u + v,
            self.center - u + v,
        ]
    }

    /// Orthogonal projection of `point` onto the plane
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        let normal = self.normal.into_inner();
        let distance = (point - self.center).dot(&normal);
        point - normal * distance
    }

    /// Whether a point on the plane lies within the rectangle
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let offset = point - self.center;
        offset.dot(&self.normal.into_inner()).abs() < 1e-9
            && offset.dot(&self.u_axis.into_inner()).abs() <= self.width / 2.0 + 1e-9
            && offset.dot(&self.v_axis.into_inner()).abs() <= self.height / 2.0 + 1e-9
    }
}

/// Three coordinate axes through the origin
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub z_range: (f64, f64),
    pub tick_size: f64,
}

impl Axes {
    /// Coordinates are world units: `c2p(x, y, z)` is the point `(x, y, z)`
    pub fn c2p(&self, x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// Endpoints of the X, Y and Z axis lines
    pub fn lines(&self) -> [(Point3<f64>, Point3<f64>); 3] {
        [
            (self.c2p(self.x_range.0, 0.0, 0.0), self.c2p(self.x_range.1, 0.0, 0.0)),
            (self.c2p(0.0, self.y_range.0, 0.0), self.c2p(0.0, self.y_range.1, 0.0)),
            (self.c2p(0.0, 0.0, self.z_range.0), self.c2p(0.0, 0.0, self.z_range.1)),
        ]
    }

    /// Short tick segments at every non-zero integer coordinate
    pub fn ticks(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        let t = self.tick_size / 2.0;
        let integers = |(lo, hi): (f64, f64)| {
            (lo.ceil() as i64..=hi.floor() as i64)
                .filter(|&i| i != 0)
                .map(|i| i as f64)
        };

        let mut ticks = Vec::new();
        for x in integers(self.x_range) {
            ticks.push((self.c2p(x, -t, 0.0), self.c2p(x, t, 0.0)));
        }
        for y in integers(self.y_range) {
            ticks.push((self.c2p(-t, y, 0.0), self.c2p(t, y, 0.0)));
        }
        for z in integers(self.z_range) {
            ticks.push((self.c2p(-t, 0.0, z), self.c2p(t, 0.0, z)));
        }
        ticks
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            x_range: (-6.0, 6.0),
            y_range: (-5.0, 5.0),
            z_range: (-4.0, 4.0),
            tick_size: 0.2,
        }
    }
}
