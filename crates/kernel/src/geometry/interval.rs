use serde::{Deserialize, Serialize};

use super::GeometryError;
use crate::Tolerance;

/// A closed parameter range `[start, end]` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    start: f64,
    end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Result<Self, GeometryError> {
        if start == end {
            return Err(GeometryError::ZeroLengthInterval { start, end });
        }
        if !(start < end) {
            return Err(GeometryError::ReversedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    /// Parameter at normalized position `s` in `[0, 1]`.
    pub fn at_fraction(&self, s: f64) -> f64 {
        self.start + s * (self.end - self.start)
    }

    /// `value` lies in the interval widened by the linear tolerance.
    pub fn contains(&self, value: f64, tol: &Tolerance) -> bool {
        tol.within_interval(self.start, self.end, value)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.start, self.end)
    }

    /// The interval traversed backwards, expressed as `[-end, -start]`.
    pub fn negated(&self) -> Self {
        Self {
            start: -self.end,
            end: -self.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_interval_is_rejected() {
        assert_eq!(
            Interval::new(2.0, 1.0),
            Err(GeometryError::ReversedInterval { start: 2.0, end: 1.0 })
        );
    }

    #[test]
    fn test_zero_length_interval_is_rejected() {
        assert!(matches!(
            Interval::new(1.0, 1.0),
            Err(GeometryError::ZeroLengthInterval { .. })
        ));
    }

    #[test]
    fn test_nan_bound_is_rejected() {
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_contains_with_tolerance() {
        let i = Interval::new(0.0, 2.0).unwrap();
        let tol = Tolerance::default();
        assert!(i.contains(2.0 + 1e-9, &tol));
        assert!(i.contains(-5e-9, &tol));
        assert!(!i.contains(2.1, &tol));
        assert!((i.mid() - 1.0).abs() < 1e-12);
        assert!((i.at_fraction(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_negated() {
        let i = Interval::new(1.0, 3.0).unwrap().negated();
        assert_eq!((i.start(), i.end()), (-3.0, -1.0));
    }
}
