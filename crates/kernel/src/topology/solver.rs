use std::collections::HashSet;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::loops::{DirectedEdge, Loop, Wire, WireOrigin};
use crate::geometry::curves::BoundedCurve;
use crate::geometry::plane::Plane;
use crate::geometry::vector::Vec3;
use crate::geometry::GeometryError;
use crate::graph::{Graph, GraphError, NodeId};
use crate::Tolerance;

/// Fraction of a curve's interval used to break ties between edges that
/// leave a node with the same tangent.
const CHORD_PROBE_FRACTION: f64 = 1e-3;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolverError {
    #[error("No curves to solve")]
    EmptyInput,

    #[error("Graph invariant violated: {0}")]
    Graph(#[from] GraphError),

    #[error("Geometry failure while building the graph: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Face walk did not terminate within {limit} iterations")]
    DidNotTerminate { limit: usize },
}

/// Which input sets touch a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeOrigin {
    A,
    B,
    Shared,
}

/// Output of one solve: the face loops and the wires cut from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceWalkResult {
    pub loops: Vec<Loop>,
    pub wires_a: Vec<Wire>,
    pub wires_b: Vec<Wire>,
    pub common: Vec<Wire>,
}

impl FaceWalkResult {
    pub fn wire_count(&self) -> usize {
        self.wires_a.len() + self.wires_b.len() + self.common.len()
    }
}

/// Turns an unordered set of planar curves into face loops.
///
/// Curve set A is required; curve set B is optional and only matters for
/// wire classification. The solver is consumed by [`FaceWalkSolver::solve`].
#[derive(Debug, Clone)]
pub struct FaceWalkSolver {
    plane: Plane,
    tolerance: Tolerance,
    curves_a: Vec<BoundedCurve>,
    curves_b: Vec<BoundedCurve>,
}

impl FaceWalkSolver {
    pub fn new(plane: Plane, tolerance: Tolerance, curves_a: Vec<BoundedCurve>) -> Self {
        Self {
            plane,
            tolerance,
            curves_a,
            curves_b: Vec::new(),
        }
    }

    pub fn with_b(mut self, curves_b: Vec<BoundedCurve>) -> Self {
        self.curves_b = curves_b;
        self
    }

    #[instrument(skip(self), fields(a = self.curves_a.len(), b = self.curves_b.len()))]
    pub fn solve(self) -> Result<FaceWalkResult, SolverError> {
        if self.curves_a.is_empty() {
            return Err(SolverError::EmptyInput);
        }
        let mut state = WalkState::new(self.plane, self.tolerance);
        for curve in &self.curves_a {
            state.insert_curve(*curve, WireOrigin::A)?;
        }
        for curve in &self.curves_b {
            state.insert_curve(*curve, WireOrigin::B)?;
        }
        debug!(
            nodes = state.graph.node_count(),
            edges = state.graph.edge_count(),
            shared = state.count_origin(NodeOrigin::Shared),
            "curve graph built"
        );
        state.run()
    }
}

// ─── Walk state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct SolverEdge {
    curve: BoundedCurve,
    origin: WireOrigin,
}

#[derive(Debug, Clone, Copy)]
enum Rotation {
    CounterClockwise,
    Clockwise,
}

/// Angular sort key for leaving a node along an edge.
#[derive(Debug, Clone, Copy)]
struct TurnKey {
    angle: f64,
    chord: f64,
}

impl TurnKey {
    fn precedes(&self, other: &TurnKey, angular_tol: f64) -> bool {
        if (self.angle - other.angle).abs() > angular_tol {
            self.angle < other.angle
        } else {
            self.chord < other.chord
        }
    }
}

struct Walk {
    /// Nodes in visiting order, without the closing repeat.
    raw: Vec<NodeId>,
    /// The closed cycle, when the walk produced one.
    cycle: Option<Vec<NodeId>>,
}

fn edge_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b { (a, b) } else { (b, a) }
}

struct WalkState {
    plane: Plane,
    tol: Tolerance,
    graph: Graph<SolverEdge>,
    /// (touched by A, touched by B)
    touched: SecondaryMap<NodeId, (bool, bool)>,
}

impl WalkState {
    fn new(plane: Plane, tol: Tolerance) -> Self {
        Self {
            plane,
            tol,
            graph: Graph::new(tol),
            touched: SecondaryMap::new(),
        }
    }

    fn halves(&self, curve: &BoundedCurve) -> Result<Vec<BoundedCurve>, SolverError> {
        let pieces = curve.split_at(&[curve.interval().mid()], &self.tol)?;
        if pieces.len() < 2 {
            return Err(GeometryError::DegenerateCurve {
                reason: format!("{} of length {} is too short to split", curve.kind_name(), curve.length()),
            }
            .into());
        }
        Ok(pieces)
    }

    fn insert_curve(&mut self, curve: BoundedCurve, side: WireOrigin) -> Result<(), SolverError> {
        if curve.is_closed(&self.tol) {
            for half in self.halves(&curve)? {
                self.insert_curve(half, side)?;
            }
            return Ok(());
        }

        let (p1, p2) = (curve.start_point(), curve.end_point());
        if let (Some(a), Some(b)) = (self.graph.find_node(&p1), self.graph.find_node(&p2)) {
            if self.graph.has_edge(a, b) {
                let existing = self.graph.edge(a, b)?.clone();
                if existing.curve.is_coincident(&curve, &self.tol) {
                    if existing.origin != side {
                        self.graph.replace_edge(
                            a,
                            b,
                            SolverEdge {
                                curve: existing.curve,
                                origin: WireOrigin::Common,
                            },
                        )?;
                    }
                    self.touch(a, side);
                    self.touch(b, side);
                } else {
                    // Keep the graph simple: a second curve between the same
                    // two nodes goes in as two halves.
                    for half in self.halves(&curve)? {
                        self.insert_curve(half, side)?;
                    }
                }
                return Ok(());
            }
        }

        let (a, b) = self.graph.add_edge(p1, p2, SolverEdge { curve, origin: side })?;
        self.touch(a, side);
        self.touch(b, side);
        Ok(())
    }

    fn touch(&mut self, id: NodeId, side: WireOrigin) {
        let mut flags = self.touched.get(id).copied().unwrap_or((false, false));
        match side {
            WireOrigin::A => flags.0 = true,
            WireOrigin::B => flags.1 = true,
            WireOrigin::Common => flags = (true, true),
        }
        self.touched.insert(id, flags);
    }

    fn node_origin(&self, id: NodeId) -> NodeOrigin {
        match self.touched.get(id) {
            Some((true, true)) => NodeOrigin::Shared,
            Some((false, true)) => NodeOrigin::B,
            _ => NodeOrigin::A,
        }
    }

    fn count_origin(&self, origin: NodeOrigin) -> usize {
        self.graph.node_ids().filter(|id| self.node_origin(*id) == origin).count()
    }

    fn run(mut self) -> Result<FaceWalkResult, SolverError> {
        let limit = self.graph.edge_count() + 1;
        let mut result = FaceWalkResult::default();
        let mut iterations = 0;

        while !self.graph.is_empty() {
            if iterations >= limit {
                return Err(SolverError::DidNotTerminate { limit });
            }
            iterations += 1;

            let start = self.start_node()?;
            let walk = self.walk(start)?;
            match &walk.cycle {
                Some(cycle) => {
                    let edges = self.directed_edges(cycle)?;
                    self.record_wires(cycle, &edges, &mut result);
                    debug!(edges = edges.len(), "extracted loop");
                    result.loops.push(Loop::new(edges));
                }
                None => debug!(steps = walk.raw.len(), "walk hit a dead end"),
            }
            self.cleanup(&walk)?;
        }

        debug!(
            loops = result.loops.len(),
            wires_a = result.wires_a.len(),
            wires_b = result.wires_b.len(),
            common = result.common.len(),
            iterations,
            "face walk finished"
        );
        Ok(result)
    }

    /// Lexicographically smallest node by plane `(u, v)`, `u` compared with
    /// tolerance.
    fn start_node(&self) -> Result<NodeId, SolverError> {
        let mut best: Option<(NodeId, f64, f64)> = None;
        for (id, p) in self.graph.nodes() {
            let uv = self.plane.parameters_of(p);
            let better = match best {
                None => true,
                Some((_, u, v)) => {
                    if (uv.x - u).abs() <= self.tol.linear {
                        uv.y < v
                    } else {
                        uv.x < u
                    }
                }
            };
            if better {
                best = Some((id, uv.x, uv.y));
            }
        }
        best.map(|(id, _, _)| id)
            .ok_or(SolverError::Graph(GraphError::EmptyGraph))
    }

    fn step(&self, from: NodeId, to: NodeId) -> Result<DirectedEdge, SolverError> {
        let label = self.graph.edge(from, to)?;
        Ok(DirectedEdge {
            start: self.graph.point(from)?,
            end: self.graph.point(to)?,
            curve: label.curve,
            origin: label.origin,
        })
    }

    fn turn_key(&self, step: &DirectedEdge, reference: Vec3, rotation: Rotation) -> TurnKey {
        let normal = self.plane.normal;
        let measure = |v: Vec3| match rotation {
            Rotation::CounterClockwise => reference.ccw_angle_about(&v, &normal),
            Rotation::Clockwise => v.ccw_angle_about(&reference, &normal),
        };
        let oriented = step.oriented_curve();
        let probe = oriented.point_at(oriented.interval().at_fraction(CHORD_PROBE_FRACTION));
        let chord = measure(probe - oriented.start_point());
        let mut angle = measure(oriented.start_tangent());
        // Leaving along the reference itself: only the chord tells which side
        // the curve bends to.
        if angle <= self.tol.angular || angle >= TAU - self.tol.angular {
            angle = chord;
        }
        TurnKey { angle, chord }
    }

    fn pick(
        &self,
        at: NodeId,
        reference: Vec3,
        used: &HashSet<(NodeId, NodeId)>,
        rotation: Rotation,
    ) -> Result<Option<NodeId>, SolverError> {
        let mut best: Option<(NodeId, TurnKey)> = None;
        for &next in self.graph.neighbors(at)? {
            if used.contains(&edge_key(at, next)) {
                continue;
            }
            let key = self.turn_key(&self.step(at, next)?, reference, rotation);
            if best.is_none_or(|(_, b)| key.precedes(&b, self.tol.angular)) {
                best = Some((next, key));
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Trace the bounded face on the left of the first edge out of `start`.
    fn walk(&self, start: NodeId) -> Result<Walk, SolverError> {
        let mut raw = vec![start];
        let mut used = HashSet::new();

        let reference = -self.plane.v_axis;
        let Some(mut next) = self.pick(start, reference, &used, Rotation::CounterClockwise)? else {
            return Ok(Walk { raw, cycle: None });
        };
        let mut prev = start;

        loop {
            used.insert(edge_key(prev, next));
            if next == start {
                let cycle = raw.clone();
                return Ok(Walk { raw, cycle: Some(cycle) });
            }
            if let Some(pos) = raw.iter().position(|n| *n == next) {
                let cycle = raw[pos..].to_vec();
                debug!(dropped = pos, "walk revisited a node; truncating to its cycle");
                return Ok(Walk { raw, cycle: Some(cycle) });
            }
            raw.push(next);

            let incoming = self.step(prev, next)?.end_tangent();
            match self.pick(next, -incoming, &used, Rotation::Clockwise)? {
                Some(after) => {
                    prev = next;
                    next = after;
                }
                None => return Ok(Walk { raw, cycle: None }),
            }
        }
    }

    fn directed_edges(&self, cycle: &[NodeId]) -> Result<Vec<DirectedEdge>, SolverError> {
        (0..cycle.len())
            .map(|i| self.step(cycle[i], cycle[(i + 1) % cycle.len()]))
            .collect()
    }

    fn record_wires(&self, cycle: &[NodeId], edges: &[DirectedEdge], result: &mut FaceWalkResult) {
        let shared: Vec<bool> = cycle
            .iter()
            .map(|id| self.node_origin(*id) == NodeOrigin::Shared)
            .collect();
        let offset = shared.iter().position(|s| *s).unwrap_or(0);

        let mut runs: Vec<Vec<DirectedEdge>> = Vec::new();
        let mut current = Vec::new();
        for i in 0..edges.len() {
            let idx = (offset + i) % edges.len();
            if i > 0 && shared[idx] {
                runs.push(std::mem::take(&mut current));
            }
            current.push(edges[idx]);
        }
        if !current.is_empty() {
            runs.push(current);
        }

        for run in runs {
            let origin = run
                .iter()
                .map(|e| e.origin)
                .find(|o| *o != WireOrigin::Common)
                .unwrap_or(WireOrigin::Common);
            if run.iter().any(|e| e.origin != origin) {
                warn!(?origin, edges = run.len(), "wire mixes edge origins");
            }
            let wire = Wire::new(run, origin);
            let target = match origin {
                WireOrigin::A => &mut result.wires_a,
                WireOrigin::B => &mut result.wires_b,
                WireOrigin::Common => &mut result.common,
            };
            if !target.iter().any(|w| w.same_as(&wire, &self.tol)) {
                target.push(wire);
            }
        }
    }

    /// Remove the traced face from the graph so the next walk finds a new one.
    fn cleanup(&mut self, walk: &Walk) -> Result<(), SolverError> {
        let nodes_before = self.graph.node_count();
        let edges_before = self.graph.edge_count();

        if let Some(cycle) = &walk.cycle {
            let degrees = cycle
                .iter()
                .map(|id| self.graph.degree(*id))
                .collect::<Result<Vec<_>, _>>()?;
            let doomed = degree_two_run(cycle, &degrees);
            if let [a, b, ..] = cycle.as_slice() {
                if self.graph.has_edge(*a, *b) {
                    self.graph.remove_edge(*a, *b)?;
                }
            }
            for id in doomed {
                if self.graph.contains_node(id) {
                    self.graph.remove_node(id)?;
                }
            }
        }
        self.prune()?;

        if self.graph.node_count() == nodes_before && self.graph.edge_count() == edges_before {
            warn!("cleanup removed nothing; dropping the first walked edge");
            match walk.raw.as_slice() {
                [a, b, ..] if self.graph.has_edge(*a, *b) => {
                    self.graph.remove_edge(*a, *b)?;
                }
                [a, ..] => {
                    self.graph.remove_node(*a)?;
                }
                [] => {}
            }
            self.prune()?;
        }

        debug!(
            removed_nodes = nodes_before - self.graph.node_count(),
            removed_edges = edges_before - self.graph.edge_count(),
            "cleanup"
        );
        Ok(())
    }

    /// Repeatedly drop nodes that cannot lie on a cycle.
    fn prune(&mut self) -> Result<(), SolverError> {
        loop {
            let mut doomed = Vec::new();
            for id in self.graph.node_ids() {
                if self.graph.degree(id)? < 2 {
                    doomed.push(id);
                }
            }
            if doomed.is_empty() {
                return Ok(());
            }
            for id in doomed {
                self.graph.remove_node(id)?;
            }
        }
    }
}

/// The run of degree-2 nodes through the start of the cycle: the prefix run
/// from the front and the suffix run wrapping in from the back.
fn degree_two_run(cycle: &[NodeId], degrees: &[usize]) -> Vec<NodeId> {
    if degrees.first() != Some(&2) {
        return Vec::new();
    }
    let prefix = degrees.iter().take_while(|d| **d == 2).count();
    if prefix == cycle.len() {
        return cycle.to_vec();
    }
    let suffix = degrees.iter().rev().take_while(|d| **d == 2).count();
    cycle[..prefix]
        .iter()
        .chain(&cycle[cycle.len() - suffix..])
        .copied()
        .collect()
}
