use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A rigid transformation: a rotation followed by a translation.
///
/// Only rotations and translations are representable, so lengths, areas and
/// angles are preserved and the inverse always exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Row-major 3x3 rotation.
    pub rotation: [[f64; 3]; 3],
    pub translation: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let rotation = [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        Self {
            rotation,
            translation: Vec3::ZERO,
        }
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            translation: Vec3::new(dx, dy, dz),
            ..Self::identity()
        }
    }

    /// Rotation around the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        #[rustfmt::skip]
        let rotation = [
            [c,   -s,  0.0],
            [s,   c,   0.0],
            [0.0, 0.0, 1.0],
        ];
        Self {
            rotation,
            translation: Vec3::ZERO,
        }
    }

    /// Rotation around an arbitrary axis through the origin (Rodrigues' formula).
    /// Returns `None` for a zero-length axis.
    pub fn rotation_axis_angle(axis: Vec3, angle: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let c = angle.cos();
        let s = angle.sin();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let rotation = [
            [t*x*x + c,   t*x*y - s*z, t*x*z + s*y],
            [t*x*y + s*z, t*y*y + c,   t*y*z - s*x],
            [t*x*z - s*y, t*y*z + s*x, t*z*z + c  ],
        ];
        Some(Self {
            rotation,
            translation: Vec3::ZERO,
        })
    }

    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let r = self.transform_vector(&p.to_vec3());
        Point3d::new(
            r.x + self.translation.x,
            r.y + self.translation.y,
            r.z + self.translation.z,
        )
    }

    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let m = &self.rotation;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Apply `self` first, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        let mut rotation = [[0.0; 3]; 3];
        for (row, out) in rotation.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..3)
                    .map(|k| other.rotation[row][k] * self.rotation[k][col])
                    .sum();
            }
        }
        Transform {
            rotation,
            translation: other.transform_vector(&self.translation) + other.translation,
        }
    }

    pub fn inverse(&self) -> Self {
        let m = &self.rotation;
        #[rustfmt::skip]
        let rotation = [
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ];
        let inv = Self {
            rotation,
            translation: Vec3::ZERO,
        };
        Self {
            rotation,
            translation: -inv.transform_vector(&self.translation),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut bb = *self;
        bb.expand_to_include(&other.min);
        bb.expand_to_include(&other.max);
        bb
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point3d::new(
                self.min.x - margin,
                self.min.y - margin,
                self.min.z - margin,
            ),
            max: Point3d::new(
                self.max.x + margin,
                self.max.y + margin,
                self.max.z + margin,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let result = t.transform_point(&Point3d::new(1.0, 2.0, 3.0));
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_z(FRAC_PI_2);
        let result = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_angle_matches_rotation_z() {
        let a = Transform::rotation_axis_angle(Vec3::Z, 0.3).unwrap();
        let b = Transform::rotation_z(0.3);
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert!(a.transform_point(&p).distance_to(&b.transform_point(&p)) < 1e-12);
        assert!(Transform::rotation_axis_angle(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_then_applies_in_order() {
        let rotate = Transform::rotation_z(FRAC_PI_2);
        let shift = Transform::translation(1.0, 0.0, 0.0);
        let combined = rotate.then(&shift);
        let result = combined.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert!((result.x - 1.0).abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_undoes_rigid_motion() {
        let t = Transform::rotation_z(0.7).then(&Transform::translation(5.0, -3.0, 7.0));
        let p = Point3d::new(1.0, 2.0, 3.0);
        let back = t.inverse().transform_point(&t.transform_point(&p));
        assert!(back.distance_to(&p) < 1e-12);
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Point3d::new(1.0, 1.0, 1.0), Point3d::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.union(&c).contains_point(&Point3d::new(4.0, 4.0, 4.0)));
    }
}
