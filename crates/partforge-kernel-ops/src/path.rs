//! Sweep paths, parameterized over `t ∈ [0, 1]`.

use std::f64::consts::TAU;

use partforge_kernel_math::{Frame, Point3, Vec3};
use partforge_kernel_nurbs::BSplineCurve;

/// A curve a profile can be swept along.
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
    },
    /// Circular arc in the frame's xy plane, counter-clockwise about its axis.
    Arc {
        /// Center and plane of the arc.
        frame: Frame,
        /// Arc radius.
        radius: f64,
        /// Start angle from the frame's ref direction (radians).
        start_angle: f64,
        /// Swept angle (radians).
        sweep: f64,
    },
    /// Helix about the frame axis, starting at the ref direction.
    Helix {
        /// Base placement.
        frame: Frame,
        /// Helix radius.
        radius: f64,
        /// Rise per turn.
        pitch: f64,
        /// Number of turns.
        turns: f64,
    },
    /// Piecewise-linear path, parameterized by arc length.
    Polyline(Vec<Point3>),
    /// B-spline, parameterized over its knot domain.
    BSpline(BSplineCurve),
}

impl Path {
    /// Point at `t` (clamped to `[0, 1]`).
    pub fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Line { start, end } => start + (end - start) * t,
            Self::Arc {
                frame,
                radius,
                start_angle,
                sweep,
            } => {
                let a = start_angle + sweep * t;
                frame.to_world(&Point3::new(radius * a.cos(), radius * a.sin(), 0.0))
            }
            Self::Helix {
                frame,
                radius,
                pitch,
                turns,
            } => {
                let a = TAU * turns * t;
                frame.to_world(&Point3::new(
                    radius * a.cos(),
                    radius * a.sin(),
                    pitch * turns * t,
                ))
            }
            Self::Polyline(points) => match polyline_locate(points, t) {
                Some((i, s)) => points[i] + (points[i + 1] - points[i]) * s,
                None => points.first().copied().unwrap_or_else(Point3::origin),
            },
            Self::BSpline(curve) => {
                let (t0, t1) = curve.domain();
                curve.evaluate(t0 + (t1 - t0) * t)
            }
        }
    }

    /// First derivative with respect to `t`. Zero on degenerate paths.
    pub fn tangent_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Line { start, end } => end - start,
            Self::Arc {
                frame,
                radius,
                start_angle,
                sweep,
            } => {
                let a = start_angle + sweep * t;
                let local = Vec3::new(-a.sin(), a.cos(), 0.0) * *radius * *sweep;
                frame.to_transform().apply_vec(&local)
            }
            Self::Helix {
                frame,
                radius,
                pitch,
                turns,
            } => {
                let a = TAU * turns * t;
                let w = TAU * turns;
                let local = Vec3::new(-radius * w * a.sin(), radius * w * a.cos(), pitch * turns);
                frame.to_transform().apply_vec(&local)
            }
            Self::Polyline(points) => match polyline_locate(points, t) {
                Some((i, _)) => points[i + 1] - points[i],
                None => Vec3::zeros(),
            },
            Self::BSpline(curve) => {
                let (t0, t1) = curve.domain();
                curve.tangent(t0 + (t1 - t0) * t) * (t1 - t0)
            }
        }
    }

    /// Chord-length approximation of the path length.
    pub fn length(&self, samples: usize) -> f64 {
        match self {
            Self::Line { start, end } => (end - start).norm(),
            Self::Polyline(points) => points.windows(2).map(|w| (w[1] - w[0]).norm()).sum(),
            _ => {
                let n = samples.max(2);
                (1..=n)
                    .map(|i| {
                        let a = self.point_at((i - 1) as f64 / n as f64);
                        let b = self.point_at(i as f64 / n as f64);
                        (b - a).norm()
                    })
                    .sum()
            }
        }
    }
}

/// Segment index and local fraction for arc-length parameter `t`.
/// Zero-length segments are skipped.
fn polyline_locate(points: &[Point3], t: f64) -> Option<(usize, f64)> {
    let lengths: Vec<f64> = points.windows(2).map(|w| (w[1] - w[0]).norm()).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let mut remaining = t * total;
    let mut last = None;
    for (i, &len) in lengths.iter().enumerate() {
        if len <= 0.0 {
            continue;
        }
        if remaining <= len {
            return Some((i, remaining / len));
        }
        remaining -= len;
        last = Some(i);
    }
    last.map(|i| (i, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_line_path() {
        let p = Path::Line {
            start: Point3::origin(),
            end: Point3::new(0.0, 0.0, 10.0),
        };
        assert!((p.point_at(0.5).z - 5.0).abs() < 1e-12);
        assert!((p.tangent_at(0.3) - Vec3::new(0.0, 0.0, 10.0)).norm() < 1e-12);
        assert!((p.length(8) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_arc_path_quarter() {
        let p = Path::Arc {
            frame: Frame::world(),
            radius: 2.0,
            start_angle: 0.0,
            sweep: PI / 2.0,
        };
        let end = p.point_at(1.0);
        assert!(end.x.abs() < 1e-12 && (end.y - 2.0).abs() < 1e-12);
        let t0 = p.tangent_at(0.0);
        assert!(t0.x.abs() < 1e-12 && t0.y > 0.0);
        assert!((p.length(256) - PI).abs() < 1e-3);
    }

    #[test]
    fn test_arc_tangent_scales_with_radius_and_sweep() {
        let p = Path::Arc {
            frame: Frame::world(),
            radius: 3.0,
            start_angle: PI / 2.0,
            sweep: -PI,
        };
        // d/dt of a half turn clockwise at radius 3
        let t = p.tangent_at(0.0);
        assert!((t.norm() - 3.0 * PI).abs() < 1e-12);
        assert!(t.x > 0.0 && t.y.abs() < 1e-12);
        let mid = p.tangent_at(0.5);
        assert!((mid - Vec3::new(0.0, -3.0 * PI, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_helix_rises_by_pitch() {
        let p = Path::Helix {
            frame: Frame::world(),
            radius: 5.0,
            pitch: 2.0,
            turns: 3.0,
        };
        let end = p.point_at(1.0);
        assert!((end.z - 6.0).abs() < 1e-12);
        assert!((end.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_arc_length_parameter() {
        let p = Path::Polyline(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
        ]);
        let mid = p.point_at(0.5);
        assert!((mid - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
        assert!(p.tangent_at(0.1).x > 0.0);
        assert!(p.tangent_at(0.9).y > 0.0);
    }

    #[test]
    fn test_bspline_path_endpoints() {
        let curve = BSplineCurve::clamped(
            vec![
                Point3::origin(),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
            ],
            3,
        )
        .unwrap();
        let p = Path::BSpline(curve);
        assert!((p.point_at(0.0) - Point3::origin()).norm() < 1e-12);
        assert!((p.point_at(1.0) - Point3::new(3.0, 1.0, 0.0)).norm() < 1e-12);
    }
}
