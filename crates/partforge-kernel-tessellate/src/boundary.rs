//! Face boundary extraction.

use std::f64::consts::TAU;

use partforge_kernel_math::{Frame, Point3};
use partforge_kernel_nurbs::{expand_knots, BSplineCurve};
use partforge_kernel_topo::{CurveRef, FaceBound, Handle, OrientedEdge, TopologyArena, TopologyError};

use crate::TessellationParams;

/// A face bound flattened to points in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundPolyline {
    /// Points in traversal order, no repeated closing point.
    pub points: Vec<Point3>,
    /// The bound contains a full circle edge (one vertex, closed curve).
    pub has_closed_circle: bool,
}

/// Flatten `bound` into a polyline.
///
/// Line edges contribute their start vertex. A circle edge whose start
/// and end vertex coincide is a full circle sampled at
/// `circle_segments`; other arcs get a proportional share of that count.
/// Each edge omits its end point, which the next edge starts with.
pub fn bound_polyline(
    arena: &TopologyArena,
    bound: Handle<FaceBound>,
    params: &TessellationParams,
) -> Result<BoundPolyline, TopologyError> {
    let mut out = BoundPolyline::default();
    for oe in arena.bound_edges(bound)? {
        let closed = edge_points(arena, &oe, params, &mut out.points)?;
        out.has_closed_circle |= closed;
    }
    out.points.dedup_by(|a, b| (*a - *b).norm() < 1e-9);
    while out.points.len() > 1 && (out.points[0] - out.points[out.points.len() - 1]).norm() < 1e-9 {
        out.points.pop();
    }
    Ok(out)
}

/// Append the samples of one oriented edge; returns whether the edge is
/// a closed circle.
fn edge_points(
    arena: &TopologyArena,
    oe: &OrientedEdge,
    params: &TessellationParams,
    out: &mut Vec<Point3>,
) -> Result<bool, TopologyError> {
    let edge = arena.get(oe.edge)?;
    let (from, to) = arena.traversal_vertices(oe)?;
    let start = arena.vertex_point(from)?;
    let end = arena.vertex_point(to)?;
    // Traversal runs along the curve's own parameter direction.
    let forward = oe.orientation == edge.same_sense;

    match edge.curve {
        CurveRef::Line(_) => out.push(start),
        CurveRef::Circle(h) => {
            let circle = arena.get(h)?;
            let frame = arena.placement_frame(circle.position)?;
            let closed = edge.start == edge.end;
            let sweep = arc_sweep(&frame, &start, &end, forward, closed);
            sample_conic(&frame, circle.radius, circle.radius, &start, sweep, params, out);
            return Ok(closed);
        }
        CurveRef::Ellipse(h) => {
            let ellipse = arena.get(h)?;
            let frame = arena.placement_frame(ellipse.position)?;
            let closed = edge.start == edge.end;
            let (a, b) = (ellipse.semi_axis_1, ellipse.semi_axis_2);
            let sweep = arc_sweep(&frame, &start, &end, forward, closed);
            sample_conic(&frame, a, b, &start, sweep, params, out);
            return Ok(closed);
        }
        CurveRef::BSpline(h) => {
            let spline = arena.get(h)?;
            let points = spline
                .control_points
                .iter()
                .map(|p| arena.point(*p))
                .collect::<Result<Vec<_>, _>>()?;
            let knots = expand_knots(&spline.knots, &spline.multiplicities);
            match BSplineCurve::new(points, knots, spline.degree) {
                Ok(curve) => {
                    let mut samples = curve.sample(params.circle_segments.max(2) + 1);
                    if !forward {
                        samples.reverse();
                    }
                    samples.pop();
                    out.extend(samples);
                }
                Err(err) => {
                    tracing::warn!(edge = oe.edge.id(), %err, "invalid spline edge, using chord");
                    out.push(start);
                }
            }
        }
    }
    Ok(false)
}

/// Parameter angle of `p` on a conic in `frame` with semi-axes `a`, `b`.
fn conic_angle(frame: &Frame, a: f64, b: f64, p: &Point3) -> f64 {
    let local = frame.to_local(p);
    (local.y / b).atan2(local.x / a)
}

/// Signed sweep from `start` to `end` in the traversal direction.
fn arc_sweep(frame: &Frame, start: &Point3, end: &Point3, forward: bool, closed: bool) -> f64 {
    let sign = if forward { 1.0 } else { -1.0 };
    if closed {
        return sign * TAU;
    }
    let a0 = conic_angle(frame, 1.0, 1.0, start);
    let a1 = conic_angle(frame, 1.0, 1.0, end);
    if forward {
        (a1 - a0).rem_euclid(TAU)
    } else {
        -(a0 - a1).rem_euclid(TAU)
    }
}

fn sample_conic(
    frame: &Frame,
    a: f64,
    b: f64,
    start: &Point3,
    sweep: f64,
    params: &TessellationParams,
    out: &mut Vec<Point3>,
) {
    let n = ((params.circle_segments as f64) * sweep.abs() / TAU).ceil().max(1.0) as usize;
    let t0 = conic_angle(frame, a, b, start);
    out.extend((0..n).map(|i| {
        let t = t0 + sweep * i as f64 / n as f64;
        frame.to_world(&Point3::new(a * t.cos(), b * t.sin(), 0.0))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::{Point2, Vec3};
    use partforge_kernel_ops::{revolve, Profile};
    use partforge_kernel_primitives::make_cylinder;
    use std::f64::consts::PI;

    #[test]
    fn test_full_circle_bound() {
        let mut arena = TopologyArena::new();
        let solid = make_cylinder(&mut arena, &Frame::world(), 2.0, 1.0).unwrap();
        let params = TessellationParams::default();
        let counts: Vec<(usize, bool)> = arena
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .flat_map(|f| arena.get(f).unwrap().bounds.clone())
            .map(|b| {
                let p = bound_polyline(&arena, b, &params).unwrap();
                (p.points.len(), p.has_closed_circle)
            })
            .collect();
        // lateral: 32 + seam start + 32 + seam start; caps: 32 each
        assert!(counts.contains(&(66, true)));
        assert_eq!(counts.iter().filter(|c| **c == (32, true)).count(), 2);
    }

    #[test]
    fn test_reversed_circle_runs_clockwise() {
        let mut arena = TopologyArena::new();
        let solid = make_cylinder(&mut arena, &Frame::world(), 1.0, 1.0).unwrap();
        let params = TessellationParams::default();
        // The bottom cap is the circle reversed: clockwise seen from +Z.
        let bottom = arena
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .flat_map(|f| arena.get(f).unwrap().bounds.clone())
            .find(|&b| {
                let edges = arena.bound_edges(b).unwrap();
                edges.len() == 1 && !edges[0].orientation
            })
            .unwrap();
        let pts = bound_polyline(&arena, bottom, &params).unwrap().points;
        let turn = (pts[1] - pts[0]).cross(&(pts[2] - pts[1]));
        assert!(turn.dot(&Vec3::z()) < 0.0);
    }

    #[test]
    fn test_partial_arc_sampled_proportionally() {
        let mut arena = TopologyArena::new();
        let frame = Frame::new(Point3::origin(), -Vec3::y(), Vec3::x());
        let profile = Profile::polygon(
            frame,
            &[Point2::new(1.0, 0.0), Point2::new(2.0, 0.0), Point2::new(2.0, 1.0), Point2::new(1.0, 1.0)],
        );
        let solid = revolve(&mut arena, &profile, Point3::origin(), Vec3::z(), PI / 2.0).unwrap();
        let params = TessellationParams::default();
        let max_len = arena
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .flat_map(|f| arena.get(f).unwrap().bounds.clone())
            .map(|b| bound_polyline(&arena, b, &params).unwrap().points.len())
            .max()
            .unwrap();
        // a quarter arc each way (8 chords) plus two line starts
        assert_eq!(max_len, 18);
    }
}
