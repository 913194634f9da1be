use nalgebra::{Matrix4, Vector4};

use crate::{Dir3, Point3, Vec3};

/// A 4x4 homogeneous transform. Placements are built from these but never
/// stored in the topology arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying matrix, column vectors on the right (`M * p`).
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `offset`.
    pub fn translation(offset: Vec3) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Uniform scale about the origin.
    pub fn uniform_scale(s: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(s),
        }
    }

    /// Rotation about an axis through the origin by `angle` radians
    /// (right-hand rule, Rodrigues' formula).
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Rotation about an axis through `center`.
    pub fn rotation_about_point(center: &Point3, axis: &Dir3, angle: f64) -> Self {
        Self::translation(center.coords)
            .then(&Self::rotation_about_axis(axis, angle))
            .then(&Self::translation(-center.coords))
    }

    /// Map local coordinates onto the basis `(x, y, z)` placed at `origin`.
    pub fn from_basis(origin: &Point3, x: &Vec3, y: &Vec3, z: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for row in 0..3 {
            m[(row, 0)] = x[row];
            m[(row, 1)] = y[row];
            m[(row, 2)] = z[row];
            m[(row, 3)] = origin[row];
        }
        Self { matrix: m }
    }

    /// Matrix product `self * other`: applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (translation ignored).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a surface normal with the inverse transpose of the linear part.
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3 = self.matrix.fixed_view::<3, 3>(0, 0);
        match m3.try_inverse() {
            Some(inv) => inv.transpose() * n,
            None => *n,
        }
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_translation() {
        let t = Transform::translation(Vec3::new(10.0, 20.0, 30.0));
        let p = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((p - Point3::new(11.0, 22.0, 33.0)).norm() < 1e-12);
        assert_eq!(t.apply_vec(&Vec3::x()), Vec3::x());
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let scale = Transform::uniform_scale(2.0);
        let shift = Transform::translation(Vec3::new(1.0, 0.0, 0.0));
        let p = scale.then(&shift).apply_point(&Point3::origin());
        assert!((p.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_about_point() {
        let t = Transform::rotation_about_point(&Point3::new(1.0, 0.0, 0.0), &Vec3::z_axis(), PI);
        let p = t.apply_point(&Point3::new(2.0, 0.0, 0.0));
        assert!((p - Point3::origin()).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_about_diagonal_axis() {
        let axis = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let p = Transform::rotation_about_axis(&axis, PI).apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_from_basis_and_inverse() {
        let t = Transform::from_basis(
            &Point3::new(5.0, 0.0, 0.0),
            &Vec3::y(),
            &-Vec3::x(),
            &Vec3::z(),
        );
        let p = t.apply_point(&Point3::new(1.0, 0.0, 2.0));
        assert!((p - Point3::new(5.0, 1.0, 2.0)).norm() < 1e-12);
        let back = t.inverse().unwrap().apply_point(&p);
        assert!((back - Point3::new(1.0, 0.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_apply_normal_under_nonuniform_scale() {
        let mut t = Transform::identity();
        t.matrix[(0, 0)] = 2.0;
        let n = t.apply_normal(&Vec3::new(1.0, 1.0, 0.0));
        assert!((n.x - 0.5).abs() < 1e-12);
        assert!((n.y - 1.0).abs() < 1e-12);
    }
}
