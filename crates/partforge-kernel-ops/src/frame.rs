//! Moving frames for orienting a profile along a path.

use partforge_kernel_math::{perpendicular, Dir3, Point2, Point3, Vec3};

use crate::Path;

/// An orthonormal frame at a point on a path. Profile x maps onto
/// `normal` and profile y onto `binormal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathFrame {
    /// Position on the path.
    pub position: Point3,
    /// Unit tangent.
    pub tangent: Dir3,
    /// Unit normal, carries profile x.
    pub normal: Dir3,
    /// `tangent × normal`, carries profile y.
    pub binormal: Dir3,
}

impl PathFrame {
    /// Frame at `position` with tangent `tangent`. The normal is `hint`
    /// made orthogonal to the tangent, or an arbitrary perpendicular when
    /// the hint is missing or parallel.
    pub fn new(position: Point3, tangent: Dir3, hint: Option<Vec3>) -> Self {
        let t = tangent.into_inner();
        let normal = hint
            .map(|h| h - t * h.dot(&t))
            .and_then(|n| Dir3::try_new(n, 1e-9))
            .unwrap_or_else(|| perpendicular(&tangent));
        let binormal = Dir3::new_normalize(t.cross(normal.as_ref()));
        Self {
            position,
            tangent,
            normal,
            binormal,
        }
    }

    /// Rotate normal and binormal about the tangent by `angle` radians.
    pub fn with_twist(&self, angle: f64) -> Self {
        if angle.abs() < 1e-12 {
            return *self;
        }
        let (sin_a, cos_a) = angle.sin_cos();
        let n = cos_a * self.normal.as_ref() + sin_a * self.binormal.as_ref();
        let b = -sin_a * self.normal.as_ref() + cos_a * self.binormal.as_ref();
        Self {
            normal: Dir3::new_normalize(n),
            binormal: Dir3::new_normalize(b),
            ..*self
        }
    }

    /// Place profile point `p`, scaled about the frame origin.
    pub fn place(&self, p: Point2, scale: f64) -> Point3 {
        self.position + scale * (p.x * self.normal.as_ref() + p.y * self.binormal.as_ref())
    }
}

/// `samples` frames at evenly spaced parameters along `path`, propagated
/// by double reflection so the normal does not spin about the tangent.
/// The first normal follows `initial_normal` when given.
pub fn rotation_minimizing_frames(path: &Path, samples: usize, initial_normal: Option<Vec3>) -> Vec<PathFrame> {
    if samples < 2 {
        return Vec::new();
    }
    let dt = 1.0 / (samples - 1) as f64;
    let mut frames: Vec<PathFrame> = Vec::with_capacity(samples);
    let start_tangent = Dir3::try_new(path.tangent_at(0.0), 1e-12).unwrap_or_else(Vec3::z_axis);
    frames.push(PathFrame::new(path.point_at(0.0), start_tangent, initial_normal));

    for i in 1..samples {
        let t = i as f64 * dt;
        let prev = frames[i - 1];
        let xi = path.point_at(t);

        let v1 = xi - prev.position;
        let c1 = v1.dot(&v1);
        let ti = Dir3::try_new(path.tangent_at(t), 1e-12);
        let (Some(ti), true) = (ti, c1 >= 1e-24) else {
            frames.push(PathFrame { position: xi, ..prev });
            continue;
        };

        let r_l = prev.normal.as_ref() - (2.0 / c1) * v1.dot(prev.normal.as_ref()) * v1;
        let t_l = prev.tangent.as_ref() - (2.0 / c1) * v1.dot(prev.tangent.as_ref()) * v1;
        let v2 = ti.as_ref() - t_l;
        let c2 = v2.dot(&v2);
        let r = if c2 < 1e-24 { r_l } else { r_l - (2.0 / c2) * v2.dot(&r_l) * v2 };

        frames.push(PathFrame::new(xi, ti, Some(r)));
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::Frame;
    use std::f64::consts::PI;

    fn z_frame() -> PathFrame {
        PathFrame::new(Point3::origin(), Vec3::z_axis(), Some(Vec3::x()))
    }

    #[test]
    fn test_hint_sets_normal() {
        let f = z_frame();
        assert!((f.normal.as_ref() - Vec3::x()).norm() < 1e-12);
        assert!((f.binormal.as_ref() - Vec3::y()).norm() < 1e-12);
    }

    #[test]
    fn test_place_point() {
        let f = PathFrame {
            position: Point3::new(10.0, 0.0, 0.0),
            ..z_frame()
        };
        let p = f.place(Point2::new(5.0, 3.0), 1.0);
        assert!((p - Point3::new(15.0, 3.0, 0.0)).norm() < 1e-12);
        let q = f.place(Point2::new(5.0, 3.0), 2.0);
        assert!((q - Point3::new(20.0, 6.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_with_twist() {
        let twisted = z_frame().with_twist(PI / 2.0);
        assert!((twisted.normal.as_ref().y - 1.0).abs() < 1e-9);
        assert!((twisted.binormal.as_ref().x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rmf_straight_line_keeps_normal() {
        let path = Path::Line {
            start: Point3::origin(),
            end: Point3::new(0.0, 0.0, 10.0),
        };
        let frames = rotation_minimizing_frames(&path, 5, Some(Vec3::x()));
        assert_eq!(frames.len(), 5);
        for f in &frames {
            assert!(f.normal.as_ref().dot(&Vec3::x()) > 1.0 - 1e-9);
        }
    }

    #[test]
    fn test_rmf_arc_stays_orthonormal() {
        let path = Path::Arc {
            frame: Frame::world(),
            radius: 10.0,
            start_angle: 0.0,
            sweep: PI,
        };
        let frames = rotation_minimizing_frames(&path, 33, Some(Vec3::z()));
        for f in &frames {
            assert!(f.tangent.as_ref().dot(f.normal.as_ref()).abs() < 1e-9);
        }
        // Planar path: the out-of-plane normal never leaves the axis.
        let last = frames[frames.len() - 1];
        assert!(last.normal.as_ref().z > 1.0 - 1e-6);
    }
}
