use serde::{Deserialize, Serialize};

use crate::geometry::curves::{BoundedCurve, PolylineOptions};
use crate::geometry::plane::Plane;
use crate::geometry::point::Point2d;

/// Where a point lies relative to a closed boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Chord-flattened shadow of a closed boundary in plane `(u, v)` coordinates.
///
/// Stored as an open ring: the closing edge from the last point back to the
/// first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2d>,
}

impl Polygon {
    pub fn new(mut points: Vec<Point2d>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Flatten curves that are ordered and oriented head to tail.
    pub fn from_curves(curves: &[BoundedCurve], plane: &Plane, options: &PolylineOptions) -> Self {
        let mut points = Vec::new();
        for curve in curves {
            let samples = curve.polyline(options);
            if let Some((_, leading)) = samples.split_last() {
                points.extend(leading.iter().map(|ev| plane.parameters_of(&ev.point)));
            }
        }
        Self::new(points)
    }

    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn segments(&self) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        self.segments().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance_to(&b)).sum()
    }

    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Area-weighted centroid from a triangle fan around the first point.
    /// Zero-area triangles are skipped; `None` when nothing is left.
    pub fn centroid(&self) -> Option<Point2d> {
        let origin = *self.points.first()?;
        let mut weight = 0.0;
        let (mut cx, mut cy) = (0.0, 0.0);
        for w in self.points.windows(2).skip(1) {
            let (b, c) = (w[0], w[1]);
            let area = origin.cross(&b, &c) / 2.0;
            if area == 0.0 {
                continue;
            }
            weight += area;
            cx += area * (origin.x + b.x + c.x) / 3.0;
            cy += area * (origin.y + b.y + c.y) / 3.0;
        }
        if weight == 0.0 {
            return None;
        }
        Some(Point2d::new(cx / weight, cy / weight))
    }

    /// All non-negligible turns share one sign.
    pub fn is_convex(&self, angular_tol: f64) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0;
        for i in 0..n {
            let prev = self.points[(i + n - 1) % n];
            let here = self.points[i];
            let next = self.points[(i + 1) % n];
            let (ix, iy) = (here.x - prev.x, here.y - prev.y);
            let (ox, oy) = (next.x - here.x, next.y - here.y);
            let turn = ix * oy - iy * ox;
            let scale = here.distance_to(&prev) * here.distance_to(&next);
            if turn.abs() <= angular_tol * scale {
                continue;
            }
            let s = turn.signum();
            if sign == 0.0 {
                sign = s;
            } else if s != sign {
                return false;
            }
        }
        true
    }

    fn on_boundary(&self, p: &Point2d, tol: f64) -> bool {
        self.segments().any(|(a, b)| segment_distance(p, &a, &b) <= tol)
    }

    /// Signed winding angle of the ring around `p`.
    fn winding_angle(&self, p: &Point2d) -> f64 {
        self.segments()
            .map(|(a, b)| {
                let (ax, ay) = (a.x - p.x, a.y - p.y);
                let (bx, by) = (b.x - p.x, b.y - p.y);
                (ax * by - ay * bx).atan2(ax * bx + ay * by)
            })
            .sum()
    }

    pub fn classify_point(&self, p: &Point2d, tol: f64) -> PointClassification {
        if self.on_boundary(p, tol) {
            PointClassification::OnBoundary
        } else if self.winding_angle(p).abs() > std::f64::consts::PI {
            PointClassification::Inside
        } else {
            PointClassification::Outside
        }
    }

    /// Inside or on the boundary.
    pub fn contains_point(&self, p: &Point2d, tol: f64) -> bool {
        self.classify_point(p, tol) != PointClassification::Outside
    }

    /// Every vertex and chord midpoint of `other` lies inside or on this ring,
    /// and at least one lies strictly inside.
    pub fn contains_polygon(&self, other: &Polygon, tol: f64) -> bool {
        let mut strictly_inside = false;
        for (a, b) in other.segments() {
            let mid = Point2d::new(0.5 * (a.x + b.x), 0.5 * (a.y + b.y));
            for probe in [a, mid] {
                match self.classify_point(&probe, tol) {
                    PointClassification::Outside => return false,
                    PointClassification::Inside => strictly_inside = true,
                    PointClassification::OnBoundary => {}
                }
            }
        }
        strictly_inside
    }
}

fn segment_distance(p: &Point2d, a: &Point2d, b: &Point2d) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point2d::new(a.x + t * dx, a.y + t * dy))
}
