use std::collections::HashMap;

use crate::geometry::point::Point3d;
use crate::Tolerance;

use super::NodeId;

type CellKey = (i64, i64, i64);

/// Grid hash from points to node handles.
///
/// Cells are larger than the linear tolerance, so every point that matches
/// a query under per-coordinate tolerance lives in one of the 27 cells
/// around the query's own cell.
#[derive(Debug, Clone)]
pub struct PointIndex {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<(NodeId, Point3d)>>,
}

impl PointIndex {
    pub fn new(tol: &Tolerance) -> Self {
        Self {
            cell_size: (4.0 * tol.linear).max(f64::MIN_POSITIVE),
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: &Point3d) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Node whose point equals `p` under `tol`. With several candidates the
    /// closest one wins.
    pub fn find(&self, p: &Point3d, tol: &Tolerance) -> Option<NodeId> {
        let (i, j, k) = self.key(p);
        let mut best: Option<(NodeId, f64)> = None;
        for di in -1..=1 {
            for dj in -1..=1 {
                for dk in -1..=1 {
                    let Some(bucket) = self.cells.get(&(i + di, j + dj, k + dk)) else {
                        continue;
                    };
                    for (id, q) in bucket {
                        if !tol.points_equal(p, q) {
                            continue;
                        }
                        let d = p.distance_squared_to(q);
                        if best.is_none_or(|(_, bd)| d < bd) {
                            best = Some((*id, d));
                        }
                    }
                }
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn insert(&mut self, id: NodeId, p: Point3d) {
        let key = self.key(&p);
        self.cells.entry(key).or_default().push((id, p));
    }

    pub fn remove(&mut self, id: NodeId, p: &Point3d) {
        let key = self.key(p);
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|(other, _)| *other != id);
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_find_across_cell_boundary() {
        let tol = Tolerance::default();
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let mut index = PointIndex::new(&tol);
        let id = ids.insert(());
        // Sits exactly on a cell edge; the query lands in the neighbouring cell.
        let p = Point3d::new(4e-8, 0.0, 0.0);
        index.insert(id, p);
        assert_eq!(index.find(&Point3d::new(4e-8 - 5e-9, 0.0, 0.0), &tol), Some(id));
        assert_eq!(index.find(&Point3d::new(4e-8 + 5e-9, -5e-9, 5e-9), &tol), Some(id));
        assert_eq!(index.find(&Point3d::new(4e-8 + 2e-8, 0.0, 0.0), &tol), None);
    }

    #[test]
    fn test_remove() {
        let tol = Tolerance::default();
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let mut index = PointIndex::new(&tol);
        let a = ids.insert(());
        let b = ids.insert(());
        index.insert(a, Point3d::new(1.0, 1.0, 0.0));
        index.insert(b, Point3d::new(2.0, 1.0, 0.0));
        index.remove(a, &Point3d::new(1.0, 1.0, 0.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(&Point3d::new(1.0, 1.0, 0.0), &tol), None);
        assert_eq!(index.find(&Point3d::new(2.0, 1.0, 0.0), &tol), Some(b));
    }
}
