use serde::{Deserialize, Serialize};

use super::curves::{BoundedCurve, Circle3d, Curve, CurveEvaluation, Line3d};
use super::point::Point3d;
use super::GeometryError;
use crate::Tolerance;

/// One curve/curve contact: the same point evaluated on both curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveIntersection {
    pub on_self: CurveEvaluation,
    pub on_other: CurveEvaluation,
}

impl CurveIntersection {
    pub fn point(&self) -> Point3d {
        self.on_self.point
    }
}

/// Intersect two bounded curves.
///
/// Overlapping collinear segments and overlapping co-circular arcs report
/// the end points of the shared stretch. Curves that do not share a plane
/// are rejected as unsupported rather than reported as disjoint.
pub fn intersect_curves(
    a: &BoundedCurve,
    b: &BoundedCurve,
    tol: &Tolerance,
) -> Result<Vec<CurveIntersection>, GeometryError> {
    let candidates = match (a.curve(), b.curve()) {
        (Curve::Line(la), Curve::Line(lb)) => line_line_candidates(a, la, b, lb, tol),
        (Curve::Line(l), Curve::Circle(c)) => {
            ensure_line_in_circle_plane(l, c, tol)?;
            line_circle_candidates(l, c, tol)
        }
        (Curve::Circle(c), Curve::Line(l)) => {
            ensure_line_in_circle_plane(l, c, tol)?;
            line_circle_candidates(l, c, tol)
        }
        (Curve::Circle(ca), Curve::Circle(cb)) => {
            ensure_coplanar_circles(ca, cb, tol)?;
            circle_circle_candidates(a, ca, b, cb, tol)
        }
    };

    let mut hits: Vec<CurveIntersection> = Vec::new();
    for p in candidates {
        let (Some(on_self), Some(on_other)) = (a.locate(&p, tol), b.locate(&p, tol)) else {
            continue;
        };
        if hits.iter().any(|h| tol.points_equal(&h.on_self.point, &on_self.point)) {
            continue;
        }
        hits.push(CurveIntersection { on_self, on_other });
    }
    hits.sort_by(|x, y| x.on_self.parameter.total_cmp(&y.on_self.parameter));
    Ok(hits)
}

fn ensure_line_in_circle_plane(l: &Line3d, c: &Circle3d, tol: &Tolerance) -> Result<(), GeometryError> {
    let in_plane = l.direction.dot(&c.normal).abs() <= tol.angular
        && (l.origin - c.center).dot(&c.normal).abs() <= tol.linear;
    if in_plane {
        Ok(())
    } else {
        Err(GeometryError::Unsupported {
            operation: "intersection of a line and an arc in different planes".into(),
        })
    }
}

fn ensure_coplanar_circles(a: &Circle3d, b: &Circle3d, tol: &Tolerance) -> Result<(), GeometryError> {
    let coplanar = a.normal.is_parallel_to(&b.normal, tol.angular)
        && (b.center - a.center).dot(&a.normal).abs() <= tol.linear;
    if coplanar {
        Ok(())
    } else {
        Err(GeometryError::Unsupported {
            operation: "intersection of arcs in different planes".into(),
        })
    }
}

fn endpoints(curve: &BoundedCurve) -> [Point3d; 2] {
    [curve.start_point(), curve.end_point()]
}

// ─── Line-Line ───────────────────────────────────────────────────────────────

fn line_line_candidates(
    a: &BoundedCurve,
    la: &Line3d,
    b: &BoundedCurve,
    lb: &Line3d,
    tol: &Tolerance,
) -> Vec<Point3d> {
    let cross = la.direction.cross(&lb.direction);
    if cross.length() <= tol.angular {
        // Parallel: only collinear overlap produces contacts, at the ends of
        // the shared stretch.
        let offset = lb.origin - la.evaluate(la.closest_parameter(&lb.origin));
        if offset.length() > tol.linear {
            return vec![];
        }
        return endpoints(a).into_iter().chain(endpoints(b)).collect();
    }

    let w = la.origin - lb.origin;
    let bd = la.direction.dot(&lb.direction);
    let d = la.direction.dot(&w);
    let e = lb.direction.dot(&w);
    let denom = 1.0 - bd * bd;
    let t1 = (bd * e - d) / denom;
    let t2 = (e - bd * d) / denom;
    let p1 = la.evaluate(t1);
    let p2 = lb.evaluate(t2);
    if p1.distance_to(&p2) > tol.linear {
        return vec![];
    }
    vec![p1.midpoint(&p2)]
}

// ─── Line-Circle ─────────────────────────────────────────────────────────────

fn line_circle_candidates(l: &Line3d, c: &Circle3d, tol: &Tolerance) -> Vec<Point3d> {
    let w = l.origin - c.center;
    let t_foot = -w.dot(&l.direction);
    let foot = l.evaluate(t_foot);
    let dist = foot.distance_to(&c.center);

    if tol.lengths_equal(dist, c.radius) {
        return vec![foot];
    }
    if dist > c.radius {
        return vec![];
    }
    let half_chord = (c.radius * c.radius - dist * dist).sqrt();
    vec![
        l.evaluate(t_foot - half_chord),
        l.evaluate(t_foot + half_chord),
    ]
}

// ─── Circle-Circle ───────────────────────────────────────────────────────────

fn circle_circle_candidates(
    a: &BoundedCurve,
    ca: &Circle3d,
    b: &BoundedCurve,
    cb: &Circle3d,
    tol: &Tolerance,
) -> Vec<Point3d> {
    let between = cb.center - ca.center;
    let d = between.length();

    if d <= tol.linear {
        if tol.lengths_equal(ca.radius, cb.radius) {
            // Co-circular: contacts at the ends of the shared stretch.
            return endpoints(a).into_iter().chain(endpoints(b)).collect();
        }
        return vec![];
    }
    if d > ca.radius + cb.radius + tol.linear || d < (ca.radius - cb.radius).abs() - tol.linear {
        return vec![];
    }

    let e = between / d;
    let along = (d * d + ca.radius * ca.radius - cb.radius * cb.radius) / (2.0 * d);
    let h_sq = ca.radius * ca.radius - along * along;
    let base = ca.center + e * along;
    if h_sq <= tol.linear * tol.linear {
        return vec![base];
    }
    let h = h_sq.sqrt();
    let perp = ca.normal.cross(&e);
    vec![base + perp * h, base - perp * h]
}
