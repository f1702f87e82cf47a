pub mod geometry;
pub mod graph;
pub mod topology;
pub mod region;
pub mod boolean;
pub mod config;

// Re-export the caller-facing surface at crate root for convenience.
pub use boolean::{DefaultRegionBooleans, RegionBooleans};
pub use config::RegionConfig;
pub use geometry::curves::BoundedCurve;
pub use geometry::plane::Plane;
pub use geometry::point::Point3d;
pub use region::{create_regions, Region, RegionError};

/// Tolerance configuration for geometric comparisons.
///
/// Passed explicitly to every comparison; there is no process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Points and lengths closer than this are considered equal.
    pub linear: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: 1e-8,
            angular: 1e-6,
        }
    }
}

impl Tolerance {
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Two points are equal iff every coordinate differs by at most `linear`.
    pub fn points_equal(&self, a: &geometry::point::Point3d, b: &geometry::point::Point3d) -> bool {
        (a.x - b.x).abs() <= self.linear
            && (a.y - b.y).abs() <= self.linear
            && (a.z - b.z).abs() <= self.linear
    }

    pub fn lengths_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.linear
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() <= self.linear
    }

    pub fn angle_is_zero(&self, angle: f64) -> bool {
        angle.abs() <= self.angular
    }

    /// `value` lies in `[start, end]` widened by the linear tolerance.
    pub fn within_interval(&self, start: f64, end: f64, value: f64) -> bool {
        value >= start - self.linear && value <= end + self.linear
    }
}
