use serde::{Deserialize, Serialize};

use super::point::{Point2d, Point3d};
use super::transform::Transform;
use super::vector::Vec3;
use super::GeometryError;
use crate::Tolerance;

/// An infinite plane with a right-handed local frame `(u_axis, v_axis, normal)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl Plane {
    /// Plane through `origin` with the given normal; the u axis is chosen
    /// perpendicular to the normal.
    pub fn new(origin: Point3d, normal: Vec3) -> Result<Self, GeometryError> {
        let normal = normal
            .normalized()
            .ok_or_else(|| GeometryError::ZeroVector {
                what: "plane normal".into(),
            })?;
        let u_axis = normal.any_perpendicular();
        let v_axis = normal.cross(&u_axis);
        Ok(Self {
            origin,
            normal,
            u_axis,
            v_axis,
        })
    }

    /// Plane through `origin` whose u axis points along `u_direction`
    /// (projected into the plane).
    pub fn with_u_axis(origin: Point3d, normal: Vec3, u_direction: Vec3) -> Result<Self, GeometryError> {
        let normal = normal
            .normalized()
            .ok_or_else(|| GeometryError::ZeroVector {
                what: "plane normal".into(),
            })?;
        let in_plane = u_direction - normal * u_direction.dot(&normal);
        let u_axis = in_plane
            .normalized()
            .ok_or_else(|| GeometryError::ZeroVector {
                what: "u direction projected into the plane".into(),
            })?;
        Ok(Self {
            origin,
            normal,
            u_axis,
            v_axis: normal.cross(&u_axis),
        })
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            u_axis: Vec3::X,
            v_axis: Vec3::Y,
        }
    }

    pub fn xz() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: -Vec3::Y,
            u_axis: Vec3::X,
            v_axis: Vec3::Z,
        }
    }

    pub fn yz() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::X,
            u_axis: Vec3::Y,
            v_axis: Vec3::Z,
        }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    pub fn evaluate_2d(&self, p: &Point2d) -> Point3d {
        self.evaluate(p.x, p.y)
    }

    pub fn signed_distance_to_point(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn contains_point(&self, p: &Point3d, tol: &Tolerance) -> bool {
        self.signed_distance_to_point(p).abs() <= tol.linear
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        let dist = self.signed_distance_to_point(p);
        *p - self.normal * dist
    }

    /// Local `(u, v)` coordinates of the projection of `p`.
    pub fn parameters_of(&self, p: &Point3d) -> Point2d {
        let v = *p - self.origin;
        Point2d::new(v.dot(&self.u_axis), v.dot(&self.v_axis))
    }

    /// Same geometric plane (normals may point either way).
    pub fn is_coplanar_with(&self, other: &Plane, tol: &Tolerance) -> bool {
        self.normal.is_parallel_to(&other.normal, tol.angular) && self.contains_point(&other.origin, tol)
    }

    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            origin: t.transform_point(&self.origin),
            normal: t.transform_vector(&self.normal),
            u_axis: t.transform_vector(&self.u_axis),
            v_axis: t.transform_vector(&self.v_axis),
        }
    }
}
