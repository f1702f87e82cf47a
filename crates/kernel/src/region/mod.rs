//! Planar regions: a closed outer boundary with optional one-level holes,
//! plus the metrics derived from it.

pub mod polygon;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::RegionConfig;
use crate::geometry::curves::{BoundedCurve, Curve};
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform};
use crate::geometry::vector::Vec3;
use crate::geometry::GeometryError;
use crate::topology::{FaceWalkSolver, Loop, SolverError};
use crate::Tolerance;

pub use polygon::{PointClassification, Polygon};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegionError {
    #[error("Region boundary has no curves")]
    EmptyBoundary,

    #[error("Point {point:?} does not lie on the region plane")]
    PointNotOnPlane { point: Point3d },

    #[error("Boundary curves do not close into a loop")]
    OpenBoundary,

    #[error("Boundary intersects itself at {point:?}")]
    SelfIntersecting { point: Point3d },

    #[error("Regions lie on different planes")]
    DifferentPlanes,

    #[error("Expected exactly one region, found {found}")]
    ExpectedSingleRegion { found: usize },

    #[error("Region encloses no area")]
    Degenerate,

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// An immutable planar region.
///
/// The outer boundary is stored head to tail and counter-clockwise about the
/// plane normal. Holes are regions of their own (without further holes).
/// Area, perimeter, centroid and convexity are computed once, when the
/// region is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    plane: Plane,
    config: RegionConfig,
    boundary: Vec<BoundedCurve>,
    holes: Vec<Region>,
    polygon: Polygon,
    area: f64,
    perimeter: f64,
    centroid: Point3d,
    is_convex: bool,
}

impl Region {
    /// Build the single region bounded by `curves`.
    pub fn new(curves: &[BoundedCurve], plane: &Plane, config: &RegionConfig) -> Result<Self, RegionError> {
        single(create_regions(curves, plane, config)?)
    }

    /// Region bounded by the closed polyline through `points`.
    pub fn from_polygon(points: &[Point3d], plane: &Plane, config: &RegionConfig) -> Result<Self, RegionError> {
        let tol = &config.tolerance;
        let mut points = points.to_vec();
        if points.len() > 1 && points.first().zip(points.last()).is_some_and(|(a, b)| tol.points_equal(a, b)) {
            points.pop();
        }
        if points.len() < 3 {
            return Err(RegionError::OpenBoundary);
        }
        let n = points.len();
        let curves = (0..n)
            .map(|i| BoundedCurve::line(points[i], points[(i + 1) % n], tol))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&curves, plane, config)
    }

    pub(crate) fn assemble(
        plane: &Plane,
        config: &RegionConfig,
        boundary: Vec<BoundedCurve>,
        holes: Vec<Region>,
    ) -> Result<Self, RegionError> {
        let tol = &config.tolerance;
        let mut boundary = boundary;
        let mut polygon = Polygon::from_curves(&boundary, plane, &config.polyline);
        if polygon.signed_area() < 0.0 {
            boundary = boundary.iter().rev().map(BoundedCurve::reversed).collect();
            polygon = Polygon::from_curves(&boundary, plane, &config.polyline);
        }

        if config.check_self_intersection {
            let mut all = boundary.clone();
            for hole in &holes {
                all.extend(hole.boundary.iter().copied());
            }
            if let Some(point) = find_self_intersection(&all, tol)? {
                return Err(RegionError::SelfIntersecting { point });
            }
        }

        let min_area = tol.linear * tol.linear;
        let outer_area = polygon.area();
        if outer_area <= min_area {
            return Err(RegionError::Degenerate);
        }

        let area = outer_area - holes.iter().map(|h| h.area).sum::<f64>();
        if area <= min_area {
            return Err(RegionError::Degenerate);
        }

        let outer_centroid = polygon.centroid().ok_or(RegionError::Degenerate)?;
        let mut mx = outer_area * outer_centroid.x;
        let mut my = outer_area * outer_centroid.y;
        for hole in &holes {
            let c = plane.parameters_of(&hole.centroid);
            mx -= hole.area * c.x;
            my -= hole.area * c.y;
        }
        let centroid = plane.evaluate(mx / area, my / area);

        let perimeter = boundary.iter().map(BoundedCurve::length).sum::<f64>()
            + holes.iter().map(|h| h.perimeter).sum::<f64>();
        let is_convex = holes.is_empty() && polygon.is_convex(tol.angular);

        Ok(Self {
            plane: *plane,
            config: *config,
            boundary,
            holes,
            polygon,
            area,
            perimeter,
            centroid,
            is_convex,
        })
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.config.tolerance
    }

    /// Outer boundary, counter-clockwise and head to tail.
    pub fn boundary(&self) -> &[BoundedCurve] {
        &self.boundary
    }

    pub fn holes(&self) -> &[Region] {
        &self.holes
    }

    /// Chord-flattened outer boundary in plane coordinates.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Outer area minus the hole areas.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Exact length of the outer boundary plus all hole boundaries.
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    pub fn centroid(&self) -> Point3d {
        self.centroid
    }

    pub fn is_convex(&self) -> bool {
        self.is_convex
    }

    /// Outer boundary followed by every hole boundary.
    pub fn boundary_curves(&self) -> Vec<BoundedCurve> {
        let mut curves = self.boundary.clone();
        for hole in &self.holes {
            curves.extend(hole.boundary.iter().copied());
        }
        curves
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.boundary
            .iter()
            .fold(BoundingBox::empty(), |bb, c| bb.union(&c.bounding_box()))
    }

    pub(crate) fn on_boundary(&self, p: &Point3d) -> bool {
        let tol = self.config.tolerance.linear;
        self.boundary.iter().any(|c| c.distance_to_point(p) <= tol)
            || self.holes.iter().any(|h| h.on_boundary(p))
    }

    fn encloses(&self, p: &Point3d) -> bool {
        winding_angle(&self.boundary, p, &self.plane.normal).abs() > std::f64::consts::PI
    }

    /// Exact classification against the curved boundary.
    pub fn classify_point(&self, p: &Point3d) -> PointClassification {
        if !self.plane.contains_point(p, &self.config.tolerance) {
            return PointClassification::Outside;
        }
        if self.on_boundary(p) {
            return PointClassification::OnBoundary;
        }
        if !self.encloses(p) || self.holes.iter().any(|h| h.encloses(p)) {
            return PointClassification::Outside;
        }
        PointClassification::Inside
    }

    /// Inside or on the boundary.
    pub fn contains_point(&self, p: &Point3d) -> bool {
        self.classify_point(p) != PointClassification::Outside
    }

    /// `other` lies entirely within this region (shared boundary allowed).
    pub fn contains_region(&self, other: &Region) -> bool {
        if !self.plane.is_coplanar_with(&other.plane, &self.config.tolerance) {
            return false;
        }
        let boundary_inside = other
            .boundary
            .iter()
            .flat_map(|c| [c.start_point(), c.mid_point()])
            .all(|p| self.contains_point(&p));
        boundary_inside
            && !self.holes.iter().any(|h| {
                h.boundary
                    .iter()
                    .any(|c| other.classify_point(&c.mid_point()) == PointClassification::Inside)
            })
    }

    /// The region moved rigidly; metrics carry over unchanged.
    pub fn transformed(&self, t: &Transform) -> Region {
        Region {
            plane: self.plane.transformed(t),
            config: self.config,
            boundary: self.boundary.iter().map(|c| c.transformed(t)).collect(),
            holes: self.holes.iter().map(|h| h.transformed(t)).collect(),
            polygon: self.polygon.clone(),
            area: self.area,
            perimeter: self.perimeter,
            centroid: t.transform_point(&self.centroid),
            is_convex: self.is_convex,
        }
    }

    /// Same region with every arc replaced by its chords.
    pub fn to_polygon_region(&self) -> Result<Region, RegionError> {
        let holes = self
            .holes
            .iter()
            .map(|h| Region::assemble(&self.plane, &self.config, self.flatten(&h.boundary)?, Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Region::assemble(&self.plane, &self.config, self.flatten(&self.boundary)?, holes)
    }

    fn flatten(&self, curves: &[BoundedCurve]) -> Result<Vec<BoundedCurve>, RegionError> {
        let mut chords = Vec::new();
        for curve in curves {
            for pair in curve.polyline(&self.config.polyline).windows(2) {
                chords.push(BoundedCurve::line(pair[0].point, pair[1].point, &self.config.tolerance)?);
            }
        }
        Ok(chords)
    }
}

/// Exactly one region, or `ExpectedSingleRegion`.
pub(crate) fn single(mut regions: Vec<Region>) -> Result<Region, RegionError> {
    if regions.len() != 1 {
        return Err(RegionError::ExpectedSingleRegion { found: regions.len() });
    }
    regions.pop().ok_or(RegionError::ExpectedSingleRegion { found: 0 })
}

/// Build every region bounded by an unordered set of curves on `plane`.
///
/// Crossing curves are not split here; a boundary that crosses itself is
/// rejected when self-intersection checks are enabled.
#[instrument(skip(curves, plane, config), fields(curves = curves.len()))]
pub fn create_regions(
    curves: &[BoundedCurve],
    plane: &Plane,
    config: &RegionConfig,
) -> Result<Vec<Region>, RegionError> {
    if curves.is_empty() {
        return Err(RegionError::EmptyBoundary);
    }
    check_on_plane(curves, plane, &config.tolerance)?;
    let solved = FaceWalkSolver::new(*plane, config.tolerance, curves.to_vec()).solve()?;
    let regions = regions_from_loops(&solved.loops, plane, config)?;
    debug!(loops = solved.loops.len(), regions = regions.len(), "regions created");
    Ok(regions)
}

/// Nest loops by containment: uncontained loops become outer regions, loops
/// inside exactly one other become its holes, deeper loops are dropped.
pub(crate) fn regions_from_loops(
    loops: &[Loop],
    plane: &Plane,
    config: &RegionConfig,
) -> Result<Vec<Region>, RegionError> {
    if loops.is_empty() {
        return Err(RegionError::OpenBoundary);
    }
    let tol = config.tolerance.linear;
    let shapes: Vec<(Vec<BoundedCurve>, Polygon)> = loops
        .iter()
        .map(|l| {
            let curves = l.curves();
            let polygon = Polygon::from_curves(&curves, plane, &config.polyline);
            (curves, polygon)
        })
        .collect();

    let n = shapes.len();
    let containers: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i && shapes[j].1.contains_polygon(&shapes[i].1, tol))
                .collect()
        })
        .collect();

    let mut holes_of: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, found) in containers.iter().enumerate() {
        match found.as_slice() {
            [] => {}
            [parent] => holes_of[*parent].push(i),
            deeper => warn!(
                loop_index = i,
                depth = deeper.len(),
                "dropping loop nested more than one level deep"
            ),
        }
    }

    let mut regions = Vec::new();
    for i in (0..n).filter(|&i| containers[i].is_empty()) {
        let holes = holes_of[i]
            .iter()
            .map(|&h| Region::assemble(plane, config, shapes[h].0.clone(), Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        regions.push(Region::assemble(plane, config, shapes[i].0.clone(), holes)?);
    }
    Ok(regions)
}

pub(crate) fn check_on_plane(curves: &[BoundedCurve], plane: &Plane, tol: &Tolerance) -> Result<(), RegionError> {
    for curve in curves {
        for point in [curve.start_point(), curve.mid_point(), curve.end_point()] {
            if !plane.contains_point(&point, tol) {
                return Err(RegionError::PointNotOnPlane { point });
            }
        }
    }
    Ok(())
}

/// First crossing between two boundary curves that is not at an end point of
/// either curve.
fn find_self_intersection(curves: &[BoundedCurve], tol: &Tolerance) -> Result<Option<Point3d>, RegionError> {
    let boxes: Vec<BoundingBox> = curves
        .iter()
        .map(|c| c.bounding_box().expanded(tol.linear))
        .collect();
    for i in 0..curves.len() {
        for j in (i + 1)..curves.len() {
            if !boxes[i].intersects(&boxes[j]) {
                continue;
            }
            for hit in curves[i].intersect(&curves[j], tol)? {
                let p = hit.point();
                if curves[i].is_endpoint(&p, tol) || curves[j].is_endpoint(&p, tol) {
                    continue;
                }
                return Ok(Some(p));
            }
        }
    }
    Ok(None)
}

/// Signed angle swept around `p` by head-to-tail curves.
///
/// Arcs are handled exactly: seen from a point inside their circle an arc
/// turns monotonically in its own sense, otherwise it subtends the same
/// angle as its chord.
fn winding_angle(curves: &[BoundedCurve], p: &Point3d, normal: &Vec3) -> f64 {
    curves
        .iter()
        .map(|c| {
            let a = c.start_point() - *p;
            let b = c.end_point() - *p;
            match c.curve() {
                Curve::Circle(circle) if p.distance_to(&circle.center) < circle.radius => {
                    if circle.normal.dot(normal) > 0.0 {
                        a.ccw_angle_about(&b, normal)
                    } else {
                        -b.ccw_angle_about(&a, normal)
                    }
                }
                _ => a.signed_angle_about(&b, normal),
            }
        })
        .sum()
}
