//! Property-based tests for planar region invariants using the `proptest` crate.

use proptest::prelude::*;

use planar_kernel::geometry::plane::Plane;
use planar_kernel::geometry::point::Point3d;
use planar_kernel::graph::Graph;
use planar_kernel::{RegionConfig, Region, Tolerance};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary 3D coordinate tuple in a reasonable floating-point range.
fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
}

/// Offset of B's lower-left corner inside the unit square.
fn arb_offset() -> impl Strategy<Value = f64> {
    0.1f64..0.9
}

/// B's extent; always reaches past the unit square.
fn arb_extent() -> impl Strategy<Value = f64> {
    1.0f64..2.0
}

const TOL: f64 = 1e-9;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
    let pts = [
        Point3d::new(x0, y0, 0.0),
        Point3d::new(x1, y0, 0.0),
        Point3d::new(x1, y1, 0.0),
        Point3d::new(x0, y1, 0.0),
    ];
    Region::from_polygon(&pts, &Plane::xy(), &RegionConfig::default()).unwrap()
}

fn total_area(regions: &[Region]) -> f64 {
    regions.iter().map(Region::area).sum()
}

// ---------------------------------------------------------------------------
// 1. Point identity: points within tolerance map to one graph node
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn nearby_points_share_a_node(
        (x, y, z) in arb_point(),
        (dx, dy, dz) in (-0.4f64..0.4, -0.4f64..0.4, -0.4f64..0.4),
    ) {
        let tol = Tolerance::default();
        let mut graph: Graph<()> = Graph::new(tol);
        let p = Point3d::new(x, y, z);
        let q = Point3d::new(x + dx * tol.linear, y + dy * tol.linear, z + dz * tol.linear);
        let a = graph.add_node(p);
        let b = graph.add_node(q);
        prop_assert_eq!(a, b);
        prop_assert_eq!(graph.node_count(), 1);
        prop_assert!(tol.points_equal(&p, &q));
        prop_assert!(tol.points_equal(&q, &p));
    }
}

proptest! {
    #[test]
    fn separated_points_get_distinct_nodes(
        (x, y, z) in arb_point(),
        gap in 2.0f64..100.0,
    ) {
        let tol = Tolerance::default();
        let mut graph: Graph<()> = Graph::new(tol);
        let a = graph.add_node(Point3d::new(x, y, z));
        let b = graph.add_node(Point3d::new(x + gap * tol.linear * 1e3, y, z));
        prop_assert_ne!(a, b);
        prop_assert_eq!(graph.node_count(), 2);
    }
}

// ---------------------------------------------------------------------------
// 2. Rectangle metrics
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rectangle_metrics(
        x0 in -50.0f64..50.0,
        y0 in -50.0f64..50.0,
        w in 0.1f64..20.0,
        h in 0.1f64..20.0,
    ) {
        let r = rect(x0, y0, x0 + w, y0 + h);
        prop_assert!((r.area() - w * h).abs() < 1e-9 * (1.0 + w * h));
        prop_assert!((r.perimeter() - 2.0 * (w + h)).abs() < 1e-9 * (1.0 + w + h));
        let c = r.centroid();
        prop_assert!((c.x - (x0 + w / 2.0)).abs() < 1e-7);
        prop_assert!((c.y - (y0 + h / 2.0)).abs() < 1e-7);
        prop_assert!(r.is_convex());
    }
}

// ---------------------------------------------------------------------------
// 3. Containment agrees with the boundary
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn boundary_midpoints_are_contained(
        x0 in -50.0f64..50.0,
        y0 in -50.0f64..50.0,
        w in 0.1f64..20.0,
        h in 0.1f64..20.0,
    ) {
        let r = rect(x0, y0, x0 + w, y0 + h);
        for curve in r.boundary_curves() {
            prop_assert!(r.contains_point(&curve.mid_point()));
        }
        prop_assert!(r.contains_point(&r.centroid()));
        prop_assert!(!r.contains_point(&Point3d::new(x0 - 1.0, y0, 0.0)));
    }
}

// ---------------------------------------------------------------------------
// 4. Rebuilding a region from its own boundary is idempotent
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn region_rebuild_is_idempotent(
        x0 in -50.0f64..50.0,
        y0 in -50.0f64..50.0,
        w in 0.1f64..20.0,
        h in 0.1f64..20.0,
    ) {
        let tol = Tolerance::default();
        let r = rect(x0, y0, x0 + w, y0 + h);
        let again = Region::new(r.boundary(), r.plane(), r.config()).unwrap();
        prop_assert_eq!(again.boundary().len(), r.boundary().len());
        for curve in again.boundary() {
            let p = curve.start_point();
            prop_assert!(r.boundary().iter().any(|c| tol.points_equal(&c.start_point(), &p)));
        }
        prop_assert!((again.area() - r.area()).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// 5. Boolean consistency on overlapping rectangles
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn intersection_area_matches_overlap(
        dx in arb_offset(),
        dy in arb_offset(),
        wb in arb_extent(),
        hb in arb_extent(),
    ) {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(dx, dy, dx + wb, dy + hb);
        let inter = a.intersect(&b).unwrap();
        prop_assert_eq!(inter.len(), 1);
        prop_assert!((inter[0].area() - (1.0 - dx) * (1.0 - dy)).abs() < TOL);
        for curve in inter[0].boundary() {
            prop_assert!(a.contains_point(&curve.mid_point()));
            prop_assert!(b.contains_point(&curve.mid_point()));
        }
    }

    #[test]
    fn inclusion_exclusion_holds(
        dx in arb_offset(),
        dy in arb_offset(),
        wb in arb_extent(),
        hb in arb_extent(),
    ) {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(dx, dy, dx + wb, dy + hb);
        let union = a.merge(&b).unwrap();
        let inter = total_area(&a.intersect(&b).unwrap());
        prop_assert!((a.area() + b.area() - union.area() - inter).abs() < TOL);
    }

    #[test]
    fn subtract_is_dual_to_merge(
        dx in arb_offset(),
        dy in arb_offset(),
        wb in arb_extent(),
        hb in arb_extent(),
    ) {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(dx, dy, dx + wb, dy + hb);
        let a_minus_b = total_area(&a.subtract(&b).unwrap());
        let b_minus_a = total_area(&b.subtract(&a).unwrap());
        let union = a.merge(&b).unwrap().area();
        let inter = total_area(&a.intersect(&b).unwrap());
        prop_assert!((a_minus_b - (a.area() - inter)).abs() < TOL);
        prop_assert!((union - (a_minus_b + b.area())).abs() < TOL);
        prop_assert!((union - (a_minus_b + b_minus_a + inter)).abs() < TOL);
    }
}
