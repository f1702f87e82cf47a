//! Undirected labeled graph whose nodes are points under tolerance identity.
//!
//! Internal building block of the face-walk solver. Node handles are arena
//! keys; they stay valid across [`Graph::subgraph`] and [`Graph::split`].

pub mod index;

use std::collections::{HashMap, HashSet, VecDeque};

use slotmap::{new_key_type, SecondaryMap, SlotMap};
use thiserror::Error;

use crate::geometry::point::Point3d;
use crate::Tolerance;
use index::PointIndex;

new_key_type! {
    pub struct NodeId;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("No edge between {0:?} and {1:?}")]
    UnknownEdge(NodeId, NodeId),

    #[error("Unknown start node {0:?}")]
    UnknownStartNode(NodeId),

    #[error("Graph is empty")]
    EmptyGraph,

    #[error("Edge between {0:?} and {1:?} already exists")]
    DuplicateEdge(NodeId, NodeId),

    #[error("Edge endpoints collapse to a single node")]
    SelfLoop,
}

/// One tree edge reported by a traversal, in visitation order.
pub type TraversalStep<'a, E> = (NodeId, NodeId, &'a E);

#[derive(Debug, Clone)]
pub struct Graph<E: Clone> {
    tolerance: Tolerance,
    nodes: SlotMap<NodeId, Point3d>,
    index: PointIndex,
    adjacency: SecondaryMap<NodeId, Vec<NodeId>>,
    /// Both directions of every logical edge.
    edges: HashMap<(NodeId, NodeId), E>,
}

impl<E: Clone> Graph<E> {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            nodes: SlotMap::with_key(),
            index: PointIndex::new(&tolerance),
            adjacency: SecondaryMap::new(),
            edges: HashMap::new(),
        }
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of logical (undirected) edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn point(&self, id: NodeId) -> Result<Point3d, GraphError> {
        self.nodes.get(id).copied().ok_or(GraphError::UnknownNode(id))
    }

    pub fn find_node(&self, p: &Point3d) -> Option<NodeId> {
        self.index.find(p, &self.tolerance)
    }

    /// Node for `p`, created when no existing node matches.
    pub fn add_node(&mut self, p: Point3d) -> NodeId {
        if let Some(id) = self.find_node(&p) {
            return id;
        }
        let id = self.nodes.insert(p);
        self.index.insert(id, p);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Node handles in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Point3d)> + '_ {
        self.nodes.iter()
    }

    /// Each logical edge once, as `(lower, higher, label)`.
    pub fn edges(&self) -> impl Iterator<Item = TraversalStep<'_, E>> + '_ {
        self.nodes.keys().flat_map(move |a| {
            self.adjacent(a).iter().filter(move |b| a < **b).filter_map(move |b| {
                self.edges.get(&(a, *b)).map(|e| (a, *b, e))
            })
        })
    }

    fn adjacent(&self, id: NodeId) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neighbors(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        if !self.contains_node(id) {
            return Err(GraphError::UnknownNode(id));
        }
        Ok(self.adjacent(id))
    }

    pub fn degree(&self, id: NodeId) -> Result<usize, GraphError> {
        self.neighbors(id).map(<[NodeId]>::len)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&(a, b))
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Result<&E, GraphError> {
        self.edges.get(&(a, b)).ok_or(GraphError::UnknownEdge(a, b))
    }

    /// Add an edge between the nodes for `p1` and `p2`, creating them as
    /// needed.
    pub fn add_edge(&mut self, p1: Point3d, p2: Point3d, edge: E) -> Result<(NodeId, NodeId), GraphError> {
        let a = self.find_node(&p1);
        let b = self.find_node(&p2);
        if self.tolerance.points_equal(&p1, &p2) || (a.is_some() && a == b) {
            return Err(GraphError::SelfLoop);
        }
        if let (Some(a), Some(b)) = (a, b) {
            if self.has_edge(a, b) {
                return Err(GraphError::DuplicateEdge(a, b));
            }
        }
        let a = a.unwrap_or_else(|| self.add_node(p1));
        let b = b.unwrap_or_else(|| self.add_node(p2));
        self.connect(a, b, edge)?;
        Ok((a, b))
    }

    /// Add an edge between two existing nodes.
    pub fn connect(&mut self, a: NodeId, b: NodeId, edge: E) -> Result<(), GraphError> {
        for id in [a, b] {
            if !self.contains_node(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        if a == b {
            return Err(GraphError::SelfLoop);
        }
        if self.has_edge(a, b) {
            return Err(GraphError::DuplicateEdge(a, b));
        }
        self.edges.insert((a, b), edge.clone());
        self.edges.insert((b, a), edge);
        if let Some(list) = self.adjacency.get_mut(a) {
            list.push(b);
        }
        if let Some(list) = self.adjacency.get_mut(b) {
            list.push(a);
        }
        Ok(())
    }

    /// Replace the label of an existing edge, returning the old one.
    pub fn replace_edge(&mut self, a: NodeId, b: NodeId, edge: E) -> Result<E, GraphError> {
        if !self.has_edge(a, b) {
            return Err(GraphError::UnknownEdge(a, b));
        }
        self.edges.insert((b, a), edge.clone());
        self.edges.insert((a, b), edge).ok_or(GraphError::UnknownEdge(a, b))
    }

    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Result<E, GraphError> {
        let edge = self.edges.remove(&(a, b)).ok_or(GraphError::UnknownEdge(a, b))?;
        self.edges.remove(&(b, a));
        if let Some(list) = self.adjacency.get_mut(a) {
            list.retain(|n| *n != b);
        }
        if let Some(list) = self.adjacency.get_mut(b) {
            list.retain(|n| *n != a);
        }
        Ok(edge)
    }

    /// Remove `id` and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Point3d, GraphError> {
        let neighbors = self.neighbors(id)?.to_vec();
        for n in neighbors {
            self.remove_edge(id, n)?;
        }
        self.adjacency.remove(id);
        let p = self.nodes.remove(id).ok_or(GraphError::UnknownNode(id))?;
        self.index.remove(id, &p);
        Ok(p)
    }

    fn check_start(&self, start: NodeId) -> Result<(), GraphError> {
        if self.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        if !self.contains_node(start) {
            return Err(GraphError::UnknownStartNode(start));
        }
        Ok(())
    }

    /// Depth-first traversal from `start`; returns tree edges in visitation
    /// order.
    pub fn depth_traversal(&self, start: NodeId) -> Result<Vec<TraversalStep<'_, E>>, GraphError> {
        self.check_start(start)?;
        let mut visited = HashSet::from([start]);
        let mut steps = Vec::new();
        let mut stack = vec![(start, 0usize)];
        while let Some(&(node, cursor)) = stack.last() {
            let neighbors = self.adjacent(node);
            if cursor >= neighbors.len() {
                stack.pop();
                continue;
            }
            let top = stack.len() - 1;
            stack[top].1 += 1;
            let next = neighbors[cursor];
            if visited.insert(next) {
                steps.push((node, next, self.edge(node, next)?));
                stack.push((next, 0));
            }
        }
        Ok(steps)
    }

    /// Breadth-first traversal from `start`; returns tree edges in visitation
    /// order.
    pub fn breadth_traversal(&self, start: NodeId) -> Result<Vec<TraversalStep<'_, E>>, GraphError> {
        self.check_start(start)?;
        let mut visited = HashSet::from([start]);
        let mut steps = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in self.adjacent(node) {
                if visited.insert(next) {
                    steps.push((node, next, self.edge(node, next)?));
                    queue.push_back(next);
                }
            }
        }
        Ok(steps)
    }

    /// Induced subgraph on `keep`. Node handles are preserved.
    pub fn subgraph(&self, keep: &[NodeId]) -> Result<Self, GraphError> {
        let mut wanted = HashSet::with_capacity(keep.len());
        for &id in keep {
            if !self.contains_node(id) {
                return Err(GraphError::UnknownNode(id));
            }
            wanted.insert(id);
        }
        let mut copy = self.clone();
        let doomed: Vec<NodeId> = self.nodes.keys().filter(|id| !wanted.contains(id)).collect();
        for id in doomed {
            copy.remove_node(id)?;
        }
        Ok(copy)
    }

    /// Node sets of the connected components, in arena order of their first
    /// node.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let mut seen = HashSet::new();
        let mut components = Vec::new();
        for root in self.nodes.keys() {
            if !seen.insert(root) {
                continue;
            }
            let mut members = vec![root];
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                for &next in self.adjacent(node) {
                    if seen.insert(next) {
                        members.push(next);
                        queue.push_back(next);
                    }
                }
            }
            components.push(members);
        }
        components
    }

    /// Connected components as independent graphs.
    pub fn split(&self) -> Result<Vec<Self>, GraphError> {
        self.components().iter().map(|members| self.subgraph(members)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3d {
        Point3d::new(x, y, 0.0)
    }

    fn square() -> Graph<&'static str> {
        let mut g = Graph::new(Tolerance::default());
        g.add_edge(p(0.0, 0.0), p(1.0, 0.0), "bottom").unwrap();
        g.add_edge(p(1.0, 0.0), p(1.0, 1.0), "right").unwrap();
        g.add_edge(p(1.0, 1.0), p(0.0, 1.0), "top").unwrap();
        g.add_edge(p(0.0, 1.0), p(0.0, 0.0), "left").unwrap();
        g
    }

    #[test]
    fn test_nodes_are_shared_under_tolerance() {
        let mut g: Graph<u32> = Graph::new(Tolerance::default());
        let (a, b) = g.add_edge(p(0.0, 0.0), p(1.0, 0.0), 1).unwrap();
        let (b2, c) = g.add_edge(p(1.0 + 5e-9, -5e-9), p(2.0, 0.0), 2).unwrap();
        assert_eq!(b, b2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(b).unwrap(), 2);
        assert_eq!(g.neighbors(a).unwrap(), &[b]);
        assert_eq!(*g.edge(c, b).unwrap(), 2);
    }

    #[test]
    fn test_duplicate_and_self_loop_edges_are_rejected() {
        let mut g = square();
        assert!(matches!(
            g.add_edge(p(1.0, 0.0), p(0.0, 0.0), "again"),
            Err(GraphError::DuplicateEdge(..))
        ));
        assert_eq!(g.add_edge(p(3.0, 3.0), p(3.0, 3.0 + 1e-9), "dot"), Err(GraphError::SelfLoop));
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut g = square();
        let corner = g.find_node(&p(1.0, 1.0)).unwrap();
        g.remove_node(corner).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.find_node(&p(1.0, 1.0)).is_none());
        assert_eq!(g.remove_node(corner), Err(GraphError::UnknownNode(corner)));
        for (a, b, _) in g.edges() {
            assert!(g.contains_node(a) && g.contains_node(b));
        }
    }

    #[test]
    fn test_remove_edge() {
        let mut g = square();
        let a = g.find_node(&p(0.0, 0.0)).unwrap();
        let b = g.find_node(&p(1.0, 0.0)).unwrap();
        assert_eq!(g.remove_edge(b, a), Ok("bottom"));
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.remove_edge(a, b), Err(GraphError::UnknownEdge(a, b)));
    }

    #[test]
    fn test_traversals_visit_every_node_once() {
        let g = square();
        let start = g.find_node(&p(0.0, 0.0)).unwrap();
        let dfs = g.depth_traversal(start).unwrap();
        let bfs = g.breadth_traversal(start).unwrap();
        assert_eq!(dfs.len(), 3);
        assert_eq!(bfs.len(), 3);
        assert_eq!(dfs[0].0, start);
        // DFS walks a chain around the square; BFS fans out from the start.
        assert_eq!(dfs[1].0, dfs[0].1);
        assert_eq!(bfs[1].0, start);
    }

    #[test]
    fn test_traversal_errors() {
        let empty: Graph<u8> = Graph::new(Tolerance::default());
        let mut other = square();
        let stale = other.find_node(&p(0.0, 0.0)).unwrap();
        assert_eq!(empty.depth_traversal(stale), Err(GraphError::EmptyGraph));
        other.remove_node(stale).unwrap();
        assert_eq!(other.breadth_traversal(stale), Err(GraphError::UnknownStartNode(stale)));
    }

    #[test]
    fn test_split_preserves_handles() {
        let mut g = square();
        g.add_edge(p(5.0, 5.0), p(6.0, 5.0), "island").unwrap();
        let far = g.find_node(&p(6.0, 5.0)).unwrap();
        let parts = g.split().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].node_count(), 4);
        assert_eq!(parts[0].edge_count(), 4);
        assert_eq!(parts[1].edge_count(), 1);
        assert!(parts[1].contains_node(far));
        assert_eq!(parts[1].point(far).unwrap().x, 6.0);
    }

    #[test]
    fn test_subgraph_is_induced() {
        let g = square();
        let a = g.find_node(&p(0.0, 0.0)).unwrap();
        let b = g.find_node(&p(1.0, 0.0)).unwrap();
        let c = g.find_node(&p(1.0, 1.0)).unwrap();
        let sub = g.subgraph(&[a, b, c]).unwrap();
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert!(sub.has_edge(a, b) && sub.has_edge(b, c) && !sub.has_edge(a, c));
        // The original is untouched.
        assert_eq!(g.edge_count(), 4);
    }
}
