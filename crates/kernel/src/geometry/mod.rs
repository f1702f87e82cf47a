pub mod point;
pub mod vector;
pub mod transform;
pub mod plane;
pub mod interval;
pub mod curves;
pub mod intersection;

use thiserror::Error;

/// Failures raised by curve construction and curve/curve queries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("Interval has zero length: [{start}, {end}]")]
    ZeroLengthInterval { start: f64, end: f64 },

    #[error("Interval bounds are reversed: [{start}, {end}]")]
    ReversedInterval { start: f64, end: f64 },

    #[error("Degenerate curve: {reason}")]
    DegenerateCurve { reason: String },

    #[error("Zero-length vector: {what}")]
    ZeroVector { what: String },

    #[error("Parameter {parameter} lies outside the curve interval")]
    ParameterOutOfRange { parameter: f64 },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },
}
