//! Configuration for region construction and region booleans.

use serde::{Deserialize, Serialize};

pub use crate::geometry::curves::PolylineOptions;
use crate::Tolerance;

/// Settings carried by every region so that derived operations (booleans,
/// splitting, transforms) reuse the tolerances the region was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Linear and angular comparison tolerances.
    pub tolerance: Tolerance,
    /// Chord budget for the flattened polygon shadow.
    pub polyline: PolylineOptions,
    /// Whether construction rejects self-intersecting boundaries (all-pairs).
    pub check_self_intersection: bool,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            polyline: PolylineOptions::default(),
            check_self_intersection: true,
        }
    }
}

impl RegionConfig {
    /// Fine flattening of arcs; self-intersection checks on.
    pub fn strict() -> Self {
        Self {
            polyline: PolylineOptions {
                max_angle: std::f64::consts::PI / 180.0,
                max_chord_length: None,
            },
            check_self_intersection: true,
            ..Self::default()
        }
    }

    /// Coarse flattening and no self-intersection check.
    pub fn fast() -> Self {
        Self {
            polyline: PolylineOptions {
                max_angle: std::f64::consts::PI / 12.0,
                max_chord_length: None,
            },
            check_self_intersection: false,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_in_flattening() {
        assert!(RegionConfig::strict().polyline.max_angle < RegionConfig::default().polyline.max_angle);
        assert!(RegionConfig::fast().polyline.max_angle > RegionConfig::default().polyline.max_angle);
        assert!(!RegionConfig::fast().check_self_intersection);
    }

    #[test]
    fn test_with_tolerance() {
        let cfg = RegionConfig::default().with_tolerance(Tolerance::new(1e-4, 1e-3));
        assert_eq!(cfg.tolerance.linear, 1e-4);
        assert!(cfg.check_self_intersection);
    }
}
