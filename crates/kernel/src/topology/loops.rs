use serde::{Deserialize, Serialize};

use crate::geometry::curves::BoundedCurve;
use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::Tolerance;

/// Which input curve set an edge or wire came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireOrigin {
    A,
    B,
    /// Coincident geometry present in both sets.
    Common,
}

/// One step of a walk: from `start` to `end` along `curve`.
///
/// The curve keeps its own parameter direction; `start`/`end` record the
/// walk direction, which may run against it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub start: Point3d,
    pub end: Point3d,
    pub curve: BoundedCurve,
    pub origin: WireOrigin,
}

impl DirectedEdge {
    /// True when the walk follows the curve's parameter direction.
    pub fn is_forward(&self) -> bool {
        self.curve.start_point().distance_squared_to(&self.start)
            <= self.curve.end_point().distance_squared_to(&self.start)
    }

    /// The curve re-parameterized to run from `start` to `end`.
    pub fn oriented_curve(&self) -> BoundedCurve {
        if self.is_forward() {
            self.curve
        } else {
            self.curve.reversed()
        }
    }

    /// Tangent leaving `start` in walk direction.
    pub fn start_tangent(&self) -> Vec3 {
        self.oriented_curve().start_tangent()
    }

    /// Tangent arriving at `end` in walk direction.
    pub fn end_tangent(&self) -> Vec3 {
        self.oriented_curve().end_tangent()
    }

    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            ..*self
        }
    }

    fn same_step(&self, other: &DirectedEdge, tol: &Tolerance) -> bool {
        tol.points_equal(&self.start, &other.start)
            && tol.points_equal(&self.end, &other.end)
            && self.curve.is_coincident(&other.curve, tol)
    }
}

/// A closed walk around one face of the arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    edges: Vec<DirectedEdge>,
}

impl Loop {
    pub(crate) fn new(edges: Vec<DirectedEdge>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Walk vertices in order, each once.
    pub fn vertices(&self) -> Vec<Point3d> {
        self.edges.iter().map(|e| e.start).collect()
    }

    /// Curves oriented along the walk.
    pub fn curves(&self) -> Vec<BoundedCurve> {
        self.edges.iter().map(DirectedEdge::oriented_curve).collect()
    }

    pub fn length(&self) -> f64 {
        self.edges.iter().map(|e| e.curve.length()).sum()
    }
}

/// A maximal run of loop edges between two shared nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    edges: Vec<DirectedEdge>,
    origin: WireOrigin,
}

impl Wire {
    pub(crate) fn new(edges: Vec<DirectedEdge>, origin: WireOrigin) -> Self {
        Self { edges, origin }
    }

    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    pub fn origin(&self) -> WireOrigin {
        self.origin
    }

    pub fn start_point(&self) -> Option<Point3d> {
        self.edges.first().map(|e| e.start)
    }

    pub fn end_point(&self) -> Option<Point3d> {
        self.edges.last().map(|e| e.end)
    }

    pub fn curves(&self) -> Vec<BoundedCurve> {
        self.edges.iter().map(|e| e.curve).collect()
    }

    /// The middle edge; its midpoint is never a wire vertex, which makes it
    /// the probe for inside/outside classification.
    pub fn middle_edge(&self) -> Option<&DirectedEdge> {
        self.edges.get(self.edges.len() / 2)
    }

    pub fn midpoint(&self) -> Option<Point3d> {
        self.middle_edge().map(|e| e.curve.mid_point())
    }

    pub fn length(&self) -> f64 {
        self.edges.iter().map(|e| e.curve.length()).sum()
    }

    pub fn reversed(&self) -> Self {
        Self {
            edges: self.edges.iter().rev().map(DirectedEdge::reversed).collect(),
            origin: self.origin,
        }
    }

    /// Same ordered edge sequence, in either direction.
    pub fn same_as(&self, other: &Wire, tol: &Tolerance) -> bool {
        if self.edges.len() != other.edges.len() {
            return false;
        }
        let forward = self
            .edges
            .iter()
            .zip(&other.edges)
            .all(|(a, b)| a.same_step(b, tol));
        forward
            || self
                .edges
                .iter()
                .zip(other.edges.iter().rev())
                .all(|(a, b)| a.same_step(&b.reversed(), tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(x0: f64, y0: f64, x1: f64, y1: f64) -> DirectedEdge {
        let tol = Tolerance::default();
        let start = Point3d::new(x0, y0, 0.0);
        let end = Point3d::new(x1, y1, 0.0);
        DirectedEdge {
            start,
            end,
            curve: BoundedCurve::line(start, end, &tol).unwrap(),
            origin: WireOrigin::A,
        }
    }

    #[test]
    fn test_oriented_curve_follows_walk() {
        let e = step(0.0, 0.0, 2.0, 0.0).reversed();
        assert!(!e.is_forward());
        let c = e.oriented_curve();
        assert!(c.start_point().distance_to(&e.start) < 1e-12);
        assert!((e.start_tangent().x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wire_equality_ignores_direction() {
        let tol = Tolerance::default();
        let w = Wire::new(
            vec![step(0.0, 0.0, 1.0, 0.0), step(1.0, 0.0, 1.0, 1.0)],
            WireOrigin::A,
        );
        assert!(w.same_as(&w.reversed(), &tol));
        let other = Wire::new(
            vec![step(0.0, 0.0, 1.0, 0.0), step(1.0, 0.0, 2.0, 1.0)],
            WireOrigin::A,
        );
        assert!(!w.same_as(&other, &tol));
    }

    #[test]
    fn test_wire_midpoint_uses_middle_edge() {
        let w = Wire::new(
            vec![step(0.0, 0.0, 1.0, 0.0), step(1.0, 0.0, 1.0, 2.0)],
            WireOrigin::B,
        );
        let m = w.midpoint().unwrap();
        assert!(m.distance_to(&Point3d::new(1.0, 1.0, 0.0)) < 1e-12);
        assert!((w.length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_loop_vertices() {
        let l = Loop::new(vec![
            step(0.0, 0.0, 1.0, 0.0),
            step(1.0, 0.0, 0.0, 1.0),
            step(0.0, 1.0, 0.0, 0.0),
        ]);
        assert_eq!(l.vertices().len(), 3);
        assert!((l.length() - (2.0 + 2f64.sqrt())).abs() < 1e-12);
    }
}
