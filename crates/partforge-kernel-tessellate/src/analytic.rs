//! Grid tessellation of curved surfaces.
//!
//! Each surface is sampled over the parametric window its boundary
//! occupies. Grids are wound so that `∂p/∂u × ∂p/∂v` points along the
//! natural surface normal; the caller flips faces with reversed sense.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use partforge_kernel_math::{Frame, Point3};
use partforge_kernel_nurbs::{expand_knots, BSplineSurface};
use partforge_kernel_topo::{BSplineSurfaceWithKnots, Handle, TopologyArena, TopologyError};

use crate::{TessellationParams, Triangle};

/// A half-open angular window `[start, start + span]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    start: f64,
    span: f64,
}

impl Window {
    const FULL: Window = Window { start: 0.0, span: TAU };

    fn at(&self, i: usize, n: usize) -> f64 {
        self.start + self.span * i as f64 / n as f64
    }
}

/// Segment count for `span` given `per_turn` segments over `turn`.
fn steps(per_turn: usize, span: f64, turn: f64) -> usize {
    ((per_turn.max(3) as f64) * span / turn).ceil().max(1.0) as usize
}

/// Smallest window containing every angle: the complement of the
/// largest gap between sorted samples. Gaps no wider than `full_gap`
/// mean the samples wrap all the way round.
fn angular_window(angles: &[f64], full_gap: f64) -> Window {
    if angles.len() < 2 {
        return Window::FULL;
    }
    let mut sorted: Vec<f64> = angles.iter().map(|a| a.rem_euclid(TAU)).collect();
    sorted.sort_by(f64::total_cmp);

    let last = sorted[sorted.len() - 1];
    let (mut gap, mut start) = (sorted[0] + TAU - last, sorted[0]);
    for pair in sorted.windows(2) {
        let g = pair[1] - pair[0];
        if g > gap {
            gap = g;
            start = pair[1];
        }
    }
    if gap <= full_gap {
        Window::FULL
    } else {
        Window { start, span: TAU - gap }
    }
}

/// Quad grid over `(nu + 1) × (nv + 1)` samples of `eval(i, j)`.
fn grid(nu: usize, nv: usize, eval: impl Fn(usize, usize) -> Point3) -> Vec<Triangle> {
    let rows: Vec<Vec<Point3>> = (0..=nv).map(|j| (0..=nu).map(|i| eval(i, j)).collect()).collect();
    let mut out = Vec::with_capacity(nu * nv * 2);
    for j in 0..nv {
        for i in 0..nu {
            let p00 = rows[j][i];
            let p10 = rows[j][i + 1];
            let p11 = rows[j + 1][i + 1];
            let p01 = rows[j + 1][i];
            out.push(Triangle::new(p00, p10, p11));
            out.push(Triangle::new(p00, p11, p01));
        }
    }
    out
}

/// Gap tolerance treating boundary samples as a complete turn.
fn full_gap(params: &TessellationParams) -> f64 {
    1.5 * TAU / params.circle_segments.max(3) as f64
}

/// Polar angles of the points in `frame`, skipping points on the axis.
fn axial_angles<'a>(frame: &Frame, points: impl Iterator<Item = &'a Point3>) -> Vec<f64> {
    points
        .map(|p| frame.to_local(p))
        .filter(|l| l.x.hypot(l.y) > 1e-9)
        .map(|l| l.y.atan2(l.x))
        .collect()
}

/// Cylinders (`tan_semi == 0`) and cones: radius `radius + v * tan_semi`
/// at axial offset `v`.
pub(crate) fn cone_like(
    frame: &Frame,
    radius: f64,
    tan_semi: f64,
    loops: &[Vec<Point3>],
    closed_circle: bool,
    params: &TessellationParams,
) -> Vec<Triangle> {
    let points = || loops.iter().flatten();
    let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points() {
        let z = frame.to_local(p).z;
        v_min = v_min.min(z);
        v_max = v_max.max(z);
    }
    if v_min > v_max {
        (v_min, v_max) = (0.0, 1.0);
    }

    let window = if closed_circle {
        Window::FULL
    } else {
        angular_window(&axial_angles(frame, points()), full_gap(params))
    };
    let nu = steps(params.circle_segments, window.span, TAU);

    // Ruled along the axis: one row of quads is exact.
    grid(nu, 1, |i, j| {
        let v = if j == 0 { v_min } else { v_max };
        let r = radius + v * tan_semi;
        let u = window.at(i, nu);
        frame.to_world(&Point3::new(r * u.cos(), r * u.sin(), v))
    })
}

/// Total signed turn of a loop about the frame axis.
fn winding(frame: &Frame, points: &[Point3]) -> f64 {
    let angles = axial_angles(frame, points.iter());
    let n = angles.len();
    (0..n)
        .map(|k| {
            let d = angles[(k + 1) % n] - angles[k];
            (d + PI).rem_euclid(TAU) - PI
        })
        .sum()
}

/// Spheres: longitude `u` about the frame axis, latitude `v` from the
/// equator. Pole rows collapse and their degenerate triangles are
/// dropped downstream.
pub(crate) fn sphere(
    frame: &Frame,
    radius: f64,
    loops: &[Vec<Point3>],
    closed_circle: bool,
    same_sense: bool,
    params: &TessellationParams,
) -> Vec<Triangle> {
    let (window, lat_min, lat_max) = if loops.is_empty() {
        (Window::FULL, -FRAC_PI_2, FRAC_PI_2)
    } else {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in loops.iter().flatten() {
            let lat = (frame.to_local(p).z / radius).clamp(-1.0, 1.0).asin();
            lo = lo.min(lat);
            hi = hi.max(lat);
        }
        // A loop circling the axis caps the face toward the pole on
        // its left.
        let turn = winding(frame, &loops[0]) * if same_sense { 1.0 } else { -1.0 };
        if turn > PI {
            hi = FRAC_PI_2;
        } else if turn < -PI {
            lo = -FRAC_PI_2;
        }
        let window = if closed_circle {
            Window::FULL
        } else {
            angular_window(&axial_angles(frame, loops.iter().flatten()), full_gap(params))
        };
        (window, lo, hi)
    };

    let nu = steps(params.sphere_segments, window.span, TAU);
    let nv = steps(params.sphere_rings, lat_max - lat_min, PI);
    grid(nu, nv, |i, j| {
        let u = window.at(i, nu);
        let lat = lat_min + (lat_max - lat_min) * j as f64 / nv as f64;
        let ring = radius * lat.cos();
        frame.to_world(&Point3::new(ring * u.cos(), ring * u.sin(), radius * lat.sin()))
    })
}

/// Tori: `u` about the frame axis, `v` around the tube.
pub(crate) fn torus(
    frame: &Frame,
    major: f64,
    minor: f64,
    loops: &[Vec<Point3>],
    closed_circle: bool,
    params: &TessellationParams,
) -> Vec<Triangle> {
    let (window_u, window_v) = if loops.is_empty() {
        (Window::FULL, Window::FULL)
    } else {
        let points = || loops.iter().flatten();
        let window_u = if closed_circle {
            Window::FULL
        } else {
            angular_window(&axial_angles(frame, points()), full_gap(params))
        };
        let tube: Vec<f64> = points()
            .map(|p| {
                let l = frame.to_local(p);
                l.z.atan2(l.x.hypot(l.y) - major)
            })
            .collect();
        (window_u, angular_window(&tube, full_gap(params)))
    };

    let nu = steps(params.torus_segments, window_u.span, TAU);
    let nv = steps(params.torus_rings, window_v.span, TAU);
    grid(nu, nv, |i, j| {
        let u = window_u.at(i, nu);
        let v = window_v.at(j, nv);
        let rho = major + minor * v.cos();
        frame.to_world(&Point3::new(rho * u.cos(), rho * u.sin(), minor * v.sin()))
    })
}

/// Free-form surfaces: a uniform grid over the full parameter domain.
pub(crate) fn bspline(
    arena: &TopologyArena,
    handle: Handle<BSplineSurfaceWithKnots>,
    params: &TessellationParams,
) -> Result<Vec<Triangle>, TopologyError> {
    let s = arena.get(handle)?;
    let net = s
        .control_points
        .iter()
        .map(|row| row.iter().map(|&p| arena.point(p)).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;
    let u_knots = expand_knots(&s.u_knots, &s.u_multiplicities);
    let v_knots = expand_knots(&s.v_knots, &s.v_multiplicities);
    let surface = match BSplineSurface::new(net, u_knots, v_knots, s.u_degree, s.v_degree) {
        Ok(surface) => surface,
        Err(err) => {
            tracing::warn!(surface = handle.id(), %err, "invalid spline surface, no triangles");
            return Ok(Vec::new());
        }
    };

    let nu = surface.control_points.len();
    let nv = surface.control_points[0].len();
    let (u0, u1) = (surface.u_knots[surface.u_degree], surface.u_knots[nu]);
    let (v0, v1) = (surface.v_knots[surface.v_degree], surface.v_knots[nv]);
    let n = params.bspline_samples.max(1);
    Ok(grid(n, n, |i, j| {
        let u = u0 + (u1 - u0) * i as f64 / n as f64;
        let v = v0 + (v1 - v0) * j as f64 / n as f64;
        surface.evaluate(u, v)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soup_volume;
    use partforge_kernel_math::Vec3;

    #[test]
    fn test_window_from_quarter_arc() {
        let angles: Vec<f64> = (0..=8).map(|i| FRAC_PI_2 * i as f64 / 8.0).collect();
        let w = angular_window(&angles, 0.3);
        assert!(w.start.abs() < 1e-12);
        assert!((w.span - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_window_wraps_through_zero() {
        let angles = [-0.5, -0.25, 0.0, 0.25, 0.5];
        let w = angular_window(&angles, 0.3);
        assert!((w.start - (TAU - 0.5)).abs() < 1e-12);
        assert!((w.span - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dense_samples_give_full_turn() {
        let angles: Vec<f64> = (0..32).map(|i| TAU * i as f64 / 32.0).collect();
        assert_eq!(angular_window(&angles, 1.5 * TAU / 32.0), Window::FULL);
    }

    #[test]
    fn test_grid_faces_outward_on_cylinder() {
        let tris = cone_like(&Frame::world(), 2.0, 0.0, &[], true, &TessellationParams::default());
        assert_eq!(tris.len(), 64);
        for t in &tris {
            let c = (t.v0.coords + t.v1.coords + t.v2.coords) / 3.0;
            let radial = Vec3::new(c.x, c.y, 0.0);
            assert!(t.normal().dot(&radial) > 0.0);
        }
    }

    #[test]
    fn test_full_sphere_encloses_positive_volume() {
        let tris = sphere(&Frame::world(), 1.0, &[], false, true, &TessellationParams::from_segments(64));
        let expected = 4.0 / 3.0 * PI;
        assert!((soup_volume(&tris) - expected).abs() < expected * 0.02);
    }

    #[test]
    fn test_northern_cap_from_equator_loop() {
        let equator: Vec<Point3> = (0..32)
            .map(|i| {
                let a = TAU * i as f64 / 32.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let params = TessellationParams::default();
        let tris = sphere(&Frame::world(), 1.0, &[equator.clone()], true, true, &params);
        assert!(tris.iter().all(|t| t.v0.z >= -1e-12 && t.v1.z >= -1e-12 && t.v2.z >= -1e-12));

        let reversed: Vec<Point3> = equator.into_iter().rev().collect();
        let tris = sphere(&Frame::world(), 1.0, &[reversed], true, true, &params);
        assert!(tris.iter().all(|t| t.v0.z <= 1e-12 && t.v1.z <= 1e-12 && t.v2.z <= 1e-12));
    }

    #[test]
    fn test_unbounded_torus_counts() {
        let params = TessellationParams::default();
        let tris = torus(&Frame::world(), 5.0, 1.0, &[], false, &params);
        assert_eq!(tris.len(), 32 * 16 * 2);
    }
}
