#![warn(missing_docs)]

//! Math types for the partforge machining kernel.
//!
//! Thin aliases over nalgebra plus the handful of helpers every other
//! kernel crate leans on: placements ([`Frame`]), homogeneous transforms,
//! circle/arc/helix sampling and axis-aligned boxes.

mod aabb;
mod frame;
mod sampling;
mod transform;

pub use aabb::Aabb3;
pub use frame::Frame;
pub use sampling::{sample_arc, sample_circle, sample_helix};
pub use transform::Transform;

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in a 2D sketch or parameter plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Normalize `v`, falling back to +Z when it has no usable length.
pub fn direction(v: Vec3) -> Dir3 {
    if !v.iter().all(|c| c.is_finite()) {
        return Vec3::z_axis();
    }
    Unit::try_new(v, Tolerance::DEFAULT.linear * 1e-3).unwrap_or_else(Vec3::z_axis)
}

/// Any unit vector orthogonal to `axis`.
pub fn perpendicular(axis: &Dir3) -> Dir3 {
    let seed = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    direction(axis.cross(&seed))
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Kernel-wide tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
