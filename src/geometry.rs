//! Planar geometry used while a board is built.
//!
//! Nothing here is consulted during play: the blocking relation between tracks and
//! the river-crossing flags are derived once from these predicates and then frozen
//! on the [`crate::board::Board`].

use serde::{Deserialize, Serialize};

/// Tolerance applied to every floating-point comparison in this module.
pub const EPSILON: f64 = 1e-9;

/// A position on the board.
///
/// # JSON
/// Points are serialized as a two-element array `[x, y]`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates agree within [`EPSILON`].
    #[inline]
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// Euclidean distance between two points.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Turn direction of an ordered triplet of points.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Sign of the cross product of `q - p` and `r - q`.
///
/// Values within [`EPSILON`] of zero are treated as collinear.
///
/// # Example
/// ```
/// use london_system::geometry::{orientation, Orientation, Point};
///
/// let p = Point::new(0.0, 0.0);
/// let q = Point::new(1.0, 1.0);
///
/// assert_eq!(orientation(p, q, Point::new(2.0, 2.0)), Orientation::Collinear);
/// assert_eq!(orientation(p, q, Point::new(2.0, 0.0)), Orientation::Clockwise);
/// assert_eq!(orientation(p, q, Point::new(0.0, 2.0)), Orientation::CounterClockwise);
/// ```
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let value = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);

    if value.abs() <= EPSILON {
        Orientation::Collinear
    } else if value > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies within the bounding box of the segment `p`-`r`.
/// Only meaningful when the three points are collinear.
#[inline]
fn within_bounds(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) + EPSILON
        && q.x >= p.x.min(r.x) - EPSILON
        && q.y <= p.y.max(r.y) + EPSILON
        && q.y >= p.y.min(r.y) - EPSILON
}

#[inline]
fn is_endpoint_of(point: Point, start: Point, end: Point) -> bool {
    point.approx_eq(start) || point.approx_eq(end)
}

/// Whether segment `a1`-`a2` crosses segment `b1`-`b2`.
///
/// Two segments intersect if they cross transversally, or if an endpoint of one lies
/// on the other. Segments sharing an endpoint never intersect, even when they are
/// collinear and overlap: two tracks leaving the same station never block each other.
///
/// # Example
/// ```
/// use london_system::geometry::{segments_intersect, Point};
///
/// // An "X" crosses.
/// assert!(segments_intersect(
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 0.0),
/// ));
///
/// // A "V" only touches at its shared endpoint.
/// assert!(!segments_intersect(
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
/// ));
/// ```
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    // Segments leaving the same point only meet there, or overlap along a shared line.
    if is_endpoint_of(a1, b1, b2) || is_endpoint_of(a2, b1, b2) {
        return false;
    }

    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Collinear contact: an endpoint of one segment sits on the other one.
    (o1 == Orientation::Collinear && within_bounds(a1, b1, a2))
        || (o2 == Orientation::Collinear && within_bounds(a1, b2, a2))
        || (o3 == Orientation::Collinear && within_bounds(b1, a1, b2))
        || (o4 == Orientation::Collinear && within_bounds(b1, a2, b2))
}

/// Whether segment `start`-`end` intersects any consecutive pair of `polyline` points.
pub fn segment_crosses_polyline(start: Point, end: Point, polyline: &[Point]) -> bool {
    polyline
        .windows(2)
        .any(|pair| segments_intersect(start, end, pair[0], pair[1]))
}

/// A non-traversable curve over the board, stored as a densely sampled polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct River {
    polyline: Vec<Point>,
}

impl River {
    pub fn new(polyline: Vec<Point>) -> Self {
        Self { polyline }
    }

    /// Samples `y = curve(x)` at `samples` evenly spaced abscissas over `[start, end]`,
    /// both bounds included.
    ///
    /// # Example
    /// ```
    /// use london_system::geometry::{Point, River};
    ///
    /// let river = River::sample(|_| 1.0, 0.0, 4.0, 5);
    /// assert_eq!(river.polyline().len(), 5);
    /// assert_eq!(river.polyline()[4], Point::new(4.0, 1.0));
    /// ```
    pub fn sample(curve: impl Fn(f64) -> f64, start: f64, end: f64, samples: usize) -> Self {
        let step = (end - start) / (samples.max(2) - 1) as f64;

        Self::new(
            (0..samples)
                .map(|i| {
                    let x = start + step * i as f64;
                    Point::new(x, curve(x))
                })
                .collect(),
        )
    }

    #[inline]
    pub fn polyline(&self) -> &[Point] {
        &self.polyline
    }

    /// Length of the longest gap between two consecutive samples.
    ///
    /// A track shorter than this could slip through the river undetected.
    pub fn max_gap(&self) -> f64 {
        self.polyline
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .fold(0.0, f64::max)
    }

    /// Whether a track between `start` and `end` crosses this river.
    #[inline]
    pub fn is_crossed_by(&self, start: Point, end: Point) -> bool {
        segment_crosses_polyline(start, end, &self.polyline)
    }
}
