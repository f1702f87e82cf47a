pub mod engine;
pub mod classify;
pub mod split;

use crate::geometry::curves::BoundedCurve;
use crate::region::{Region, RegionError};
use engine::BoolOp;

/// Trait for boolean operations on coplanar regions.
///
/// Provides `intersect`, `merge`, `subtract` and `split`. Implement this
/// trait to provide alternative backends or mock implementations.
pub trait RegionBooleans {
    /// Regions covered by both `a` and `b`; empty when they do not overlap.
    fn intersect(&self, a: &Region, b: &Region) -> Result<Vec<Region>, RegionError>;

    /// The union of `a` and `b`, which must come out as exactly one region.
    fn merge(&self, a: &Region, b: &Region) -> Result<Region, RegionError>;

    /// `a` with `b` removed.
    fn subtract(&self, a: &Region, b: &Region) -> Result<Vec<Region>, RegionError>;

    /// `a` cut along external curves.
    fn split(&self, a: &Region, cutters: &[BoundedCurve]) -> Result<Vec<Region>, RegionError>;
}

/// Default engine: split both boundaries, face-walk, classify wires, rebuild.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRegionBooleans;

impl RegionBooleans for DefaultRegionBooleans {
    fn intersect(&self, a: &Region, b: &Region) -> Result<Vec<Region>, RegionError> {
        engine::boolean_op(a, b, BoolOp::Intersect)
    }

    fn merge(&self, a: &Region, b: &Region) -> Result<Region, RegionError> {
        crate::region::single(engine::boolean_op(a, b, BoolOp::Merge)?)
    }

    fn subtract(&self, a: &Region, b: &Region) -> Result<Vec<Region>, RegionError> {
        engine::boolean_op(a, b, BoolOp::Subtract)
    }

    fn split(&self, a: &Region, cutters: &[BoundedCurve]) -> Result<Vec<Region>, RegionError> {
        split::split_region(a, cutters)
    }
}

impl Region {
    /// See [`RegionBooleans::intersect`].
    pub fn intersect(&self, other: &Region) -> Result<Vec<Region>, RegionError> {
        DefaultRegionBooleans.intersect(self, other)
    }

    /// See [`RegionBooleans::merge`].
    pub fn merge(&self, other: &Region) -> Result<Region, RegionError> {
        DefaultRegionBooleans.merge(self, other)
    }

    /// See [`RegionBooleans::subtract`].
    pub fn subtract(&self, other: &Region) -> Result<Vec<Region>, RegionError> {
        DefaultRegionBooleans.subtract(self, other)
    }

    /// See [`RegionBooleans::split`].
    pub fn split(&self, cutters: &[BoundedCurve]) -> Result<Vec<Region>, RegionError> {
        DefaultRegionBooleans.split(self, cutters)
    }
}

#[cfg(test)]
mod trait_tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::geometry::plane::Plane;
    use crate::geometry::point::Point3d;
    use crate::Tolerance;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        let pts = [
            Point3d::new(x0, y0, 0.0),
            Point3d::new(x1, y0, 0.0),
            Point3d::new(x1, y1, 0.0),
            Point3d::new(x0, y1, 0.0),
        ];
        Region::from_polygon(&pts, &Plane::xy(), &RegionConfig::default()).unwrap()
    }

    #[test]
    fn test_region_booleans_trait_intersect() {
        let engine = DefaultRegionBooleans;
        let result = engine.intersect(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 3.0, 3.0));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn test_region_booleans_trait_merge() {
        let engine = DefaultRegionBooleans;
        let merged = engine.merge(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 3.0, 3.0)).unwrap();
        assert!((merged.area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_booleans_trait_subtract() {
        let engine = DefaultRegionBooleans;
        let result = engine.subtract(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 3.0, 3.0));
        assert!(result.is_ok());
        assert!((result.unwrap()[0].area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_region_booleans_trait_split() {
        let engine = DefaultRegionBooleans;
        let cut = BoundedCurve::line(
            Point3d::new(1.0, -1.0, 0.0),
            Point3d::new(1.0, 3.0, 0.0),
            &Tolerance::default(),
        )
        .unwrap();
        let parts = engine.split(&rect(0.0, 0.0, 2.0, 2.0), &[cut]).unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_region_methods_delegate() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 0.0, 3.0, 2.0);
        let inter = a.intersect(&b).unwrap();
        assert!((inter[0].area() - 2.0).abs() < 1e-9);
        assert!((a.merge(&b).unwrap().area() - 6.0).abs() < 1e-9);
        assert!((a.subtract(&b).unwrap()[0].area() - 2.0).abs() < 1e-9);
    }
}
