use crate::{direction, perpendicular, Dir3, Point3, Transform, Vec3};

/// A right-handed placement: local z is `axis`, local x is `ref_dir`.
///
/// This is the in-memory form of a STEP `AXIS2_PLACEMENT_3D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Placement origin.
    pub origin: Point3,
    /// Local z axis.
    pub axis: Dir3,
    /// Local x axis, orthogonal to `axis`.
    pub ref_dir: Dir3,
}

impl Frame {
    /// Build a frame, orthogonalizing `ref_hint` against `axis`.
    ///
    /// A hint parallel to the axis (or zero) is replaced by an arbitrary
    /// perpendicular.
    pub fn new(origin: Point3, axis: Vec3, ref_hint: Vec3) -> Self {
        let axis = direction(axis);
        let projected = ref_hint - axis.into_inner() * ref_hint.dot(axis.as_ref());
        let ref_dir = if projected.norm() > 1e-9 {
            direction(projected)
        } else {
            perpendicular(&axis)
        };
        Self {
            origin,
            axis,
            ref_dir,
        }
    }

    /// A frame with an arbitrary reference direction.
    pub fn from_axis(origin: Point3, axis: Vec3) -> Self {
        let axis = direction(axis);
        let hint = if axis.z.abs() > 0.9 { Vec3::x() } else { Vec3::z() };
        Self::new(origin, axis.into_inner(), hint)
    }

    /// The world frame (origin, +Z, +X).
    pub fn world() -> Self {
        Self {
            origin: Point3::origin(),
            axis: Vec3::z_axis(),
            ref_dir: Vec3::x_axis(),
        }
    }

    /// Local y axis (`axis × ref_dir`).
    pub fn y_dir(&self) -> Dir3 {
        direction(self.axis.cross(self.ref_dir.as_ref()))
    }

    /// Map a point given in local coordinates into world space.
    pub fn to_world(&self, local: &Point3) -> Point3 {
        self.origin
            + self.ref_dir.into_inner() * local.x
            + self.y_dir().into_inner() * local.y
            + self.axis.into_inner() * local.z
    }

    /// Express a world point in local coordinates.
    pub fn to_local(&self, world: &Point3) -> Point3 {
        let d = world - self.origin;
        Point3::new(
            d.dot(self.ref_dir.as_ref()),
            d.dot(self.y_dir().as_ref()),
            d.dot(self.axis.as_ref()),
        )
    }

    /// The same frame moved along its axis by `distance`.
    pub fn offset_along_axis(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.axis.into_inner() * distance,
            ..*self
        }
    }

    /// Local-to-world transform.
    pub fn to_transform(&self) -> Transform {
        Transform::from_basis(
            &self.origin,
            &self.ref_dir.into_inner(),
            &self.y_dir().into_inner(),
            &self.axis.into_inner(),
        )
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::world()
    }
}
