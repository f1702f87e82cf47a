use tracing::debug;

use crate::geometry::point::Point3d;
use crate::region::{PointClassification, Region};
use crate::topology::{DirectedEdge, FaceWalkResult, Wire};

/// Which side of a shared wire the two operands' interiors lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonSide {
    /// Both interiors on the same side: the wire bounds A ∩ B and A ∪ B.
    Same,
    /// Interiors on opposite sides: the wire separates A from B.
    Opposite,
}

/// Solver wires sorted by where they lie relative to the other operand.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedWires {
    pub a_inside_b: Vec<Wire>,
    pub a_outside_b: Vec<Wire>,
    pub b_inside_a: Vec<Wire>,
    pub b_outside_a: Vec<Wire>,
    pub common_same: Vec<Wire>,
    pub common_opposite: Vec<Wire>,
}

/// Classify every wire of a two-operand solve.
pub fn classify_wires(solved: &FaceWalkResult, a: &Region, b: &Region) -> ClassifiedWires {
    let mut out = ClassifiedWires::default();

    for wire in &solved.wires_a {
        match classify_wire(wire, b) {
            Some(PointClassification::Inside) => out.a_inside_b.push(wire.clone()),
            Some(_) => out.a_outside_b.push(wire.clone()),
            None => debug!(edges = wire.edges().len(), "A wire lies on B's boundary; skipped"),
        }
    }
    for wire in &solved.wires_b {
        match classify_wire(wire, a) {
            Some(PointClassification::Inside) => out.b_inside_a.push(wire.clone()),
            Some(_) => out.b_outside_a.push(wire.clone()),
            None => debug!(edges = wire.edges().len(), "B wire lies on A's boundary; skipped"),
        }
    }
    for wire in &solved.common {
        match common_side(wire, a, b) {
            Some(CommonSide::Same) => out.common_same.push(wire.clone()),
            Some(CommonSide::Opposite) => out.common_opposite.push(wire.clone()),
            None => debug!(edges = wire.edges().len(), "common wire off one boundary; skipped"),
        }
    }

    debug!(
        a_in = out.a_inside_b.len(),
        a_out = out.a_outside_b.len(),
        b_in = out.b_inside_a.len(),
        b_out = out.b_outside_a.len(),
        same = out.common_same.len(),
        opposite = out.common_opposite.len(),
        "wires classified"
    );
    out
}

/// Inside or outside `other`, probed at edge midpoints starting from the
/// middle edge. `None` when every probe lands on the boundary.
pub fn classify_wire(wire: &Wire, other: &Region) -> Option<PointClassification> {
    probe_order(wire)
        .map(|e| other.classify_point(&e.curve.mid_point()))
        .find(|c| *c != PointClassification::OnBoundary)
}

/// Middle edge first, then outward in both directions.
fn probe_order(wire: &Wire) -> impl Iterator<Item = &DirectedEdge> {
    let edges = wire.edges();
    let mid = edges.len() / 2;
    (0..edges.len()).filter_map(move |k| {
        let offset = (k + 1) / 2;
        let idx = if k % 2 == 1 { mid.checked_sub(offset)? } else { mid + offset };
        edges.get(idx)
    })
}

/// Side test for a wire shared by both boundaries: step off the middle edge
/// to its left and ask both regions whether they contain the probe.
pub fn common_side(wire: &Wire, a: &Region, b: &Region) -> Option<CommonSide> {
    let tol = a.tolerance();
    let edge = wire.middle_edge()?;
    let m = edge.curve.mid_point();
    if !a.on_boundary(&m) || !b.on_boundary(&m) {
        return None;
    }

    let walked = edge.oriented_curve();
    let tangent = walked.tangent_at(walked.interval().mid());
    let left = a.plane().normal.cross(&tangent).normalized()?;
    let step = (1e-4 * edge.curve.length()).max(10.0 * tol.linear);
    let probe: Point3d = m + left * step;

    if a.contains_point(&probe) == b.contains_point(&probe) {
        Some(CommonSide::Same)
    } else {
        Some(CommonSide::Opposite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::geometry::plane::Plane;
    use crate::topology::{FaceWalkSolver, WireOrigin};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        let pts = [
            Point3d::new(x0, y0, 0.0),
            Point3d::new(x1, y0, 0.0),
            Point3d::new(x1, y1, 0.0),
            Point3d::new(x0, y1, 0.0),
        ];
        Region::from_polygon(&pts, &Plane::xy(), &RegionConfig::default()).unwrap()
    }

    fn solve(a: &Region, b: &Region) -> FaceWalkResult {
        let tol = *a.tolerance();
        let ca = a.boundary_curves();
        let cb = b.boundary_curves();
        let pa = super::super::engine::split_all(&ca, &cb, &tol).unwrap();
        let pb = super::super::engine::split_all(&cb, &ca, &tol).unwrap();
        FaceWalkSolver::new(*a.plane(), tol, pa).with_b(pb).solve().unwrap()
    }

    #[test]
    fn test_offset_squares_split_into_inside_and_outside() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(0.5, 0.5, 1.5, 1.5);
        let wires = classify_wires(&solve(&a, &b), &a, &b);
        assert_eq!(wires.a_inside_b.len(), 1);
        assert_eq!(wires.a_outside_b.len(), 1);
        assert_eq!(wires.b_inside_a.len(), 1);
        assert_eq!(wires.b_outside_a.len(), 1);
        assert!(wires.common_same.is_empty() && wires.common_opposite.is_empty());
        assert!((wires.a_inside_b[0].length() - 1.0).abs() < 1e-9);
        assert!((wires.a_outside_b[0].length() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_touching_squares_share_an_opposite_wire() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 0.0, 2.0, 1.0);
        let solved = solve(&a, &b);
        assert_eq!(solved.common.len(), 1);
        assert_eq!(solved.common[0].origin(), WireOrigin::Common);
        assert_eq!(common_side(&solved.common[0], &a, &b), Some(CommonSide::Opposite));
    }

    #[test]
    fn test_identical_squares_share_same_side_wires() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(0.0, 0.0, 1.0, 1.0);
        let wires = classify_wires(&solve(&a, &b), &a, &b);
        assert!(!wires.common_same.is_empty());
        assert!(wires.common_opposite.is_empty());
        assert!(wires.a_inside_b.is_empty() && wires.a_outside_b.is_empty());
        let total: f64 = wires.common_same.iter().map(Wire::length).sum();
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_common_wire_off_boundary_is_rejected() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 0.0, 2.0, 1.0);
        let far = square(5.0, 5.0, 6.0, 6.0);
        let solved = solve(&a, &b);
        assert_eq!(common_side(&solved.common[0], &a, &far), None);
    }

    #[test]
    fn test_probe_order_starts_in_the_middle() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(5.0, 5.0, 6.0, 6.0);
        let solved = solve(&a, &b);
        let wire = &solved.wires_a[0];
        let order: Vec<_> = probe_order(wire).collect();
        assert_eq!(order.len(), wire.edges().len());
        assert_eq!(order[0], wire.middle_edge().unwrap());
    }
}
