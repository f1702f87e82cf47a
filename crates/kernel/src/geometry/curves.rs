use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::intersection::{self, CurveIntersection};
use super::interval::Interval;
use super::plane::Plane;
use super::point::Point3d;
use super::transform::{BoundingBox, Transform};
use super::vector::Vec3;
use super::GeometryError;
use crate::Tolerance;

/// Unbounded curve geometry. Every bounded curve in the kernel is one of
/// these trimmed by an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    Line(Line3d),
    Circle(Circle3d),
}

/// An infinite line; the parameter is arc length from `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    /// Unit direction.
    pub direction: Vec3,
}

impl Line3d {
    pub fn evaluate(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    pub fn closest_parameter(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.direction)
    }
}

/// A full circle; the parameter is the angle (radians) from `x_axis`,
/// counter-clockwise about `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle3d {
    pub center: Point3d,
    /// Unit normal.
    pub normal: Vec3,
    /// Unit reference direction in the circle's plane.
    pub x_axis: Vec3,
    pub radius: f64,
}

impl Circle3d {
    fn y_axis(&self) -> Vec3 {
        self.normal.cross(&self.x_axis)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.center + self.x_axis * (self.radius * t.cos()) + self.y_axis() * (self.radius * t.sin())
    }

    /// Unit tangent at angle `t`.
    pub fn tangent(&self, t: f64) -> Vec3 {
        self.x_axis * (-t.sin()) + self.y_axis() * t.cos()
    }

    /// Angle of the projection of `p` into the circle's plane, in `(-PI, PI]`.
    /// `None` when `p` projects onto the center.
    pub fn angle_of(&self, p: &Point3d) -> Option<f64> {
        let v = *p - self.center;
        let x = v.dot(&self.x_axis);
        let y = v.dot(&self.y_axis());
        if x.hypot(y) < 1e-15 {
            return None;
        }
        Some(y.atan2(x))
    }
}

/// A curve evaluated at one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveEvaluation {
    pub parameter: f64,
    pub point: Point3d,
    /// Unit tangent in the direction of increasing parameter.
    pub tangent: Vec3,
}

/// Upper bound on the chords used to flatten one arc.
pub const MAX_ARC_SEGMENTS: usize = 4096;

/// Budget for flattening curves into polylines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolylineOptions {
    /// Maximum angle (radians) swept by one arc chord.
    pub max_angle: f64,
    /// Maximum chord length on arcs; `None` for no limit.
    pub max_chord_length: Option<f64>,
}

impl Default for PolylineOptions {
    fn default() -> Self {
        Self {
            max_angle: PI / 36.0,
            max_chord_length: None,
        }
    }
}

/// An immutable curve trimmed to a parameter interval: a line segment or a
/// circular arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedCurve {
    curve: Curve,
    interval: Interval,
}

impl BoundedCurve {
    /// Straight segment from `start` to `end`.
    pub fn line(start: Point3d, end: Point3d, tol: &Tolerance) -> Result<Self, GeometryError> {
        let chord = end - start;
        let length = chord.length();
        if tol.is_zero_length(length) {
            return Err(GeometryError::DegenerateCurve {
                reason: format!("segment length {length} is below tolerance"),
            });
        }
        Ok(Self {
            curve: Curve::Line(Line3d {
                origin: start,
                direction: chord / length,
            }),
            interval: Interval::new(0.0, length)?,
        })
    }

    /// Circular arc from `start_angle` to `end_angle` (counter-clockwise
    /// about `normal`). The sweep may not exceed a full turn.
    pub fn arc(
        center: Point3d,
        normal: Vec3,
        x_axis: Vec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self, GeometryError> {
        if !(radius > 0.0) {
            return Err(GeometryError::DegenerateCurve {
                reason: format!("arc radius {radius} must be positive"),
            });
        }
        let normal = normal.normalized().ok_or_else(|| GeometryError::ZeroVector {
            what: "arc normal".into(),
        })?;
        let x_axis = (x_axis - normal * x_axis.dot(&normal))
            .normalized()
            .ok_or_else(|| GeometryError::ZeroVector {
                what: "arc reference direction".into(),
            })?;
        let interval = Interval::new(start_angle, end_angle)?;
        if interval.length() > TAU + 1e-12 {
            return Err(GeometryError::DegenerateCurve {
                reason: format!("arc sweep {} exceeds a full turn", interval.length()),
            });
        }
        Ok(Self {
            curve: Curve::Circle(Circle3d {
                center,
                normal,
                x_axis,
                radius,
            }),
            interval,
        })
    }

    /// Full circle starting and ending at angle 0.
    pub fn circle(center: Point3d, normal: Vec3, radius: f64) -> Result<Self, GeometryError> {
        let n = normal.normalized().ok_or_else(|| GeometryError::ZeroVector {
            what: "circle normal".into(),
        })?;
        Self::arc(center, n, n.any_perpendicular(), radius, 0.0, TAU)
    }

    /// Arc starting at `start`, passing through `through`, ending at `end`.
    pub fn arc_through(
        start: Point3d,
        through: Point3d,
        end: Point3d,
        tol: &Tolerance,
    ) -> Result<Self, GeometryError> {
        let u = through - start;
        let w = end - start;
        let n = u.cross(&w);
        let n_len_sq = n.length_squared();
        if n_len_sq.sqrt() <= tol.linear * (u.length() + w.length()) {
            return Err(GeometryError::DegenerateCurve {
                reason: "arc points are collinear".into(),
            });
        }
        let offset = (w.cross(&n) * u.length_squared() + n.cross(&u) * w.length_squared()) / (2.0 * n_len_sq);
        let center = start + offset;
        let radius = offset.length();
        let normal = n / n_len_sq.sqrt();
        let x_axis = (start - center) / radius;
        let sweep = x_axis.ccw_angle_about(&(end - center), &normal);
        Self::arc(center, normal, x_axis, radius, 0.0, sweep)
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn kind_name(&self) -> &'static str {
        match self.curve {
            Curve::Line(_) => "Line",
            Curve::Circle(_) => "Arc",
        }
    }

    /// Length per unit of parameter (1 for lines, the radius for arcs).
    pub fn parameter_scale(&self) -> f64 {
        match &self.curve {
            Curve::Line(_) => 1.0,
            Curve::Circle(c) => c.radius,
        }
    }

    pub fn point_at(&self, t: f64) -> Point3d {
        match &self.curve {
            Curve::Line(l) => l.evaluate(t),
            Curve::Circle(c) => c.evaluate(t),
        }
    }

    pub fn tangent_at(&self, t: f64) -> Vec3 {
        match &self.curve {
            Curve::Line(l) => l.direction,
            Curve::Circle(c) => c.tangent(t),
        }
    }

    /// Evaluate at `t`, which must lie in the interval.
    pub fn evaluate(&self, t: f64) -> Result<CurveEvaluation, GeometryError> {
        let slack = Tolerance::new(1e-12 * self.interval.length().max(1.0), 0.0);
        if !self.interval.contains(t, &slack) {
            return Err(GeometryError::ParameterOutOfRange { parameter: t });
        }
        Ok(self.evaluation(self.interval.clamp(t)))
    }

    fn evaluation(&self, t: f64) -> CurveEvaluation {
        CurveEvaluation {
            parameter: t,
            point: self.point_at(t),
            tangent: self.tangent_at(t),
        }
    }

    pub fn start_point(&self) -> Point3d {
        self.point_at(self.interval.start())
    }

    pub fn end_point(&self) -> Point3d {
        self.point_at(self.interval.end())
    }

    pub fn mid_point(&self) -> Point3d {
        self.point_at(self.interval.mid())
    }

    pub fn start_tangent(&self) -> Vec3 {
        self.tangent_at(self.interval.start())
    }

    pub fn end_tangent(&self) -> Vec3 {
        self.tangent_at(self.interval.end())
    }

    pub fn length(&self) -> f64 {
        self.interval.length() * self.parameter_scale()
    }

    pub fn is_closed(&self, tol: &Tolerance) -> bool {
        tol.points_equal(&self.start_point(), &self.end_point())
    }

    /// Nearest point on the bounded curve.
    pub fn project_point(&self, p: &Point3d) -> CurveEvaluation {
        match &self.curve {
            Curve::Line(l) => self.evaluation(self.interval.clamp(l.closest_parameter(p))),
            Curve::Circle(c) => {
                let Some(angle) = c.angle_of(p) else {
                    return self.evaluation(self.interval.start());
                };
                let start = self.interval.start();
                let t = start + (angle - start).rem_euclid(TAU);
                if t <= self.interval.end() {
                    return self.evaluation(t);
                }
                let to_start = p.distance_squared_to(&self.start_point());
                let to_end = p.distance_squared_to(&self.end_point());
                if to_start <= to_end {
                    self.evaluation(start)
                } else {
                    self.evaluation(self.interval.end())
                }
            }
        }
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        self.project_point(p).point.distance_to(p)
    }

    /// The evaluation at `p` when `p` lies on the curve within tolerance.
    pub fn locate(&self, p: &Point3d, tol: &Tolerance) -> Option<CurveEvaluation> {
        let ev = self.project_point(p);
        (ev.point.distance_to(p) <= tol.linear).then_some(ev)
    }

    /// `p` coincides with the start or end point.
    pub fn is_endpoint(&self, p: &Point3d, tol: &Tolerance) -> bool {
        tol.points_equal(p, &self.start_point()) || tol.points_equal(p, &self.end_point())
    }

    /// The same point set traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        let curve = match self.curve {
            Curve::Line(l) => Curve::Line(Line3d {
                origin: l.origin,
                direction: -l.direction,
            }),
            Curve::Circle(c) => Curve::Circle(Circle3d {
                normal: -c.normal,
                ..c
            }),
        };
        Self {
            curve,
            interval: self.interval.negated(),
        }
    }

    pub fn transformed(&self, t: &Transform) -> Self {
        let curve = match self.curve {
            Curve::Line(l) => Curve::Line(Line3d {
                origin: t.transform_point(&l.origin),
                direction: t.transform_vector(&l.direction),
            }),
            Curve::Circle(c) => Curve::Circle(Circle3d {
                center: t.transform_point(&c.center),
                normal: t.transform_vector(&c.normal),
                x_axis: t.transform_vector(&c.x_axis),
                radius: c.radius,
            }),
        };
        Self {
            curve,
            interval: self.interval,
        }
    }

    /// Same geometry and bounds, in either direction.
    pub fn is_coincident(&self, other: &BoundedCurve, tol: &Tolerance) -> bool {
        let same_ends = (tol.points_equal(&self.start_point(), &other.start_point())
            && tol.points_equal(&self.end_point(), &other.end_point()))
            || (tol.points_equal(&self.start_point(), &other.end_point())
                && tol.points_equal(&self.end_point(), &other.start_point()));
        same_ends && tol.points_equal(&self.mid_point(), &other.mid_point())
    }

    pub fn on_plane(&self, plane: &Plane, tol: &Tolerance) -> bool {
        let ends_on = plane.contains_point(&self.start_point(), tol)
            && plane.contains_point(&self.end_point(), tol)
            && plane.contains_point(&self.mid_point(), tol);
        match &self.curve {
            Curve::Line(_) => ends_on,
            Curve::Circle(c) => {
                ends_on
                    && plane.contains_point(&c.center, tol)
                    && c.normal.is_parallel_to(&plane.normal, tol.angular)
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::from_points(&[self.start_point(), self.end_point()]);
        if let Curve::Circle(c) = &self.curve {
            let y = c.y_axis();
            let axes = [
                (c.x_axis.x, y.x),
                (c.x_axis.y, y.y),
                (c.x_axis.z, y.z),
            ];
            for (xk, yk) in axes {
                if xk.hypot(yk) < 1e-15 {
                    continue;
                }
                let extreme = yk.atan2(xk);
                for angle in [extreme, extreme + PI] {
                    let start = self.interval.start();
                    let t = start + (angle - start).rem_euclid(TAU);
                    if t <= self.interval.end() {
                        bb.expand_to_include(&c.evaluate(t));
                    }
                }
            }
        }
        bb
    }

    /// All intersections with `other`, sorted by parameter on `self`.
    pub fn intersect(
        &self,
        other: &BoundedCurve,
        tol: &Tolerance,
    ) -> Result<Vec<CurveIntersection>, GeometryError> {
        intersection::intersect_curves(self, other, tol)
    }

    /// Cut at the given parameters. Parameters outside the interval or within
    /// tolerance of a bound or of each other are ignored; with no effective
    /// cut the curve is returned whole.
    pub fn split_at(&self, parameters: &[f64], tol: &Tolerance) -> Result<Vec<BoundedCurve>, GeometryError> {
        let min_gap = tol.linear / self.parameter_scale();
        let mut cuts: Vec<f64> = parameters
            .iter()
            .copied()
            .filter(|t| *t > self.interval.start() + min_gap && *t < self.interval.end() - min_gap)
            .collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|b, a| (*b - *a).abs() <= min_gap);

        if cuts.is_empty() {
            return Ok(vec![*self]);
        }

        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut lo = self.interval.start();
        for t in cuts.into_iter().chain(std::iter::once(self.interval.end())) {
            pieces.push(Self {
                curve: self.curve,
                interval: Interval::new(lo, t)?,
            });
            lo = t;
        }
        Ok(pieces)
    }

    /// Cut wherever any of `cutters` crosses or touches the curve.
    pub fn split_by(&self, cutters: &[BoundedCurve], tol: &Tolerance) -> Result<Vec<BoundedCurve>, GeometryError> {
        let mut params = Vec::new();
        for cutter in cutters {
            params.extend(self.intersect(cutter, tol)?.iter().map(|hit| hit.on_self.parameter));
        }
        self.split_at(&params, tol)
    }

    /// Ordered evaluations approximating the curve, first and last included.
    /// Lines are exact with two points; arcs use at most [`MAX_ARC_SEGMENTS`]
    /// chords whatever the budget asks for.
    pub fn polyline(&self, options: &PolylineOptions) -> Vec<CurveEvaluation> {
        let segments = match &self.curve {
            Curve::Line(_) => 1,
            Curve::Circle(c) => {
                // Rounding slack keeps exact multiples from gaining a segment.
                let by_angle = (self.interval.length() / options.max_angle.max(1e-6) - 1e-9).ceil();
                let by_chord = options
                    .max_chord_length
                    .filter(|len| *len > 0.0)
                    .map(|len| (self.interval.length() * c.radius / len).ceil())
                    .unwrap_or(1.0);
                by_angle.max(by_chord).clamp(2.0, MAX_ARC_SEGMENTS as f64) as usize
            }
        };
        (0..=segments)
            .map(|i| self.evaluation(self.interval.at_fraction(i as f64 / segments as f64)))
            .collect()
    }
}
