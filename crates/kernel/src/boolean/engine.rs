use tracing::{debug, instrument};

use crate::geometry::curves::BoundedCurve;
use crate::geometry::GeometryError;
use crate::region::{create_regions, Region, RegionError};
use crate::topology::{FaceWalkSolver, Wire};
use crate::Tolerance;

use super::classify::{classify_wires, ClassifiedWires};

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Intersect,
    Merge,
    Subtract,
}

impl ClassifiedWires {
    /// Wires that bound the result of `op`.
    pub fn select(&self, op: BoolOp) -> Vec<&Wire> {
        let groups = match op {
            BoolOp::Intersect => [&self.a_inside_b, &self.b_inside_a, &self.common_same],
            BoolOp::Merge => [&self.a_outside_b, &self.b_outside_a, &self.common_same],
            BoolOp::Subtract => [&self.a_outside_b, &self.b_inside_a, &self.common_opposite],
        };
        groups.into_iter().flatten().collect()
    }
}

/// Cut every curve wherever any of `cutters` meets it.
pub fn split_all(
    curves: &[BoundedCurve],
    cutters: &[BoundedCurve],
    tol: &Tolerance,
) -> Result<Vec<BoundedCurve>, GeometryError> {
    let mut pieces = Vec::with_capacity(curves.len());
    for curve in curves {
        pieces.extend(curve.split_by(cutters, tol)?);
    }
    Ok(pieces)
}

/// Perform a boolean operation between two coplanar regions.
///
/// Strategy:
/// 1. Reject operands on different planes
/// 2. Bounding box check for the disjoint shortcut
/// 3. Cut each boundary (outer and holes) at the other's crossings
/// 4. Face-walk both piece sets and classify the resulting wires
/// 5. Rebuild regions from the wires the operation keeps
///
/// The result carries A's plane and configuration. An empty selection is an
/// empty result, not an error.
#[instrument(skip(a, b), fields(a_area = a.area(), b_area = b.area()))]
pub fn boolean_op(a: &Region, b: &Region, op: BoolOp) -> Result<Vec<Region>, RegionError> {
    let config = a.config();
    let tol = &config.tolerance;
    if !a.plane().is_coplanar_with(b.plane(), tol) {
        return Err(RegionError::DifferentPlanes);
    }

    let bb_a = a.bounding_box().expanded(tol.linear);
    let bb_b = b.bounding_box().expanded(tol.linear);
    if !bb_a.intersects(&bb_b) {
        debug!("operands are disjoint");
        return match op {
            BoolOp::Intersect => Ok(Vec::new()),
            BoolOp::Merge => Err(RegionError::ExpectedSingleRegion { found: 2 }),
            BoolOp::Subtract => Ok(vec![a.clone()]),
        };
    }

    let curves_a = a.boundary_curves();
    let curves_b = b.boundary_curves();
    let pieces_a = split_all(&curves_a, &curves_b, tol)?;
    let pieces_b = split_all(&curves_b, &curves_a, tol)?;
    debug!(pieces_a = pieces_a.len(), pieces_b = pieces_b.len(), "boundaries cut");

    let solved = FaceWalkSolver::new(*a.plane(), *tol, pieces_a)
        .with_b(pieces_b)
        .solve()?;
    let wires = classify_wires(&solved, a, b);
    let selected = wires.select(op);
    if selected.is_empty() {
        debug!("no wires selected; result is empty");
        return Ok(Vec::new());
    }

    let curves: Vec<BoundedCurve> = selected.iter().flat_map(|w| w.curves()).collect();
    let regions = create_regions(&curves, a.plane(), config)?;
    debug!(wires = selected.len(), regions = regions.len(), "boolean complete");
    Ok(regions)
}
