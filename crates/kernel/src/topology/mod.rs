//! Loops, wires and the face-walk solver that extracts them from a curve set.

pub mod loops;
pub mod solver;

pub use loops::{DirectedEdge, Loop, Wire, WireOrigin};
pub use solver::{FaceWalkResult, FaceWalkSolver, NodeOrigin, SolverError};
