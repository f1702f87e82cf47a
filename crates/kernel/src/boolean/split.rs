use tracing::{debug, instrument};

use crate::geometry::curves::BoundedCurve;
use crate::region::{check_on_plane, regions_from_loops, PointClassification, Region, RegionError};
use crate::topology::FaceWalkSolver;

use super::engine::split_all;

/// Split a region along external curves.
///
/// The boundary is cut wherever a cutter meets it; each cutter is cut by the
/// boundary and by the other cutters, and only the pieces lying strictly
/// inside the region are kept. The pieces are face-walked again and nested.
/// Faces that fall inside an existing hole (bounded only by hole material)
/// are discarded.
#[instrument(skip(region, cutters), fields(cutters = cutters.len()))]
pub fn split_region(region: &Region, cutters: &[BoundedCurve]) -> Result<Vec<Region>, RegionError> {
    if cutters.is_empty() {
        return Ok(vec![region.clone()]);
    }
    let plane = region.plane();
    let config = region.config();
    let tol = &config.tolerance;
    check_on_plane(cutters, plane, tol)?;

    let boundary = region.boundary_curves();
    let mut curves = split_all(&boundary, cutters, tol)?;
    let boundary_pieces = curves.len();

    for (i, cutter) in cutters.iter().enumerate() {
        let mut others = boundary.clone();
        others.extend(
            cutters
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| *c),
        );
        curves.extend(
            cutter
                .split_by(&others, tol)?
                .into_iter()
                .filter(|piece| region.classify_point(&piece.mid_point()) == PointClassification::Inside),
        );
    }
    debug!(
        boundary = boundary_pieces,
        cutter = curves.len() - boundary_pieces,
        "curves cut"
    );

    let solved = FaceWalkSolver::new(*plane, *tol, curves).solve()?;
    let regions = regions_from_loops(&solved.loops, plane, config)?;
    let found = regions.len();

    let hole_curves: Vec<BoundedCurve> = region
        .holes()
        .iter()
        .flat_map(|h| h.boundary().iter().copied())
        .collect();
    let kept: Vec<Region> = regions
        .into_iter()
        .filter(|r| !is_hole_material(r, &hole_curves, tol.linear))
        .collect();
    debug!(found, kept = kept.len(), "region split");
    Ok(kept)
}

/// Every boundary curve of `region` runs along one of `hole_curves`.
fn is_hole_material(region: &Region, hole_curves: &[BoundedCurve], tol: f64) -> bool {
    !hole_curves.is_empty()
        && region.boundary().iter().all(|c| {
            let m = c.mid_point();
            hole_curves.iter().any(|h| h.distance_to_point(&m) <= tol)
        })
}
