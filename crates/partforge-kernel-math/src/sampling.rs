use std::f64::consts::TAU;

use crate::{Frame, Point3};

/// `segments` points evenly spaced around a full circle in the frame's
/// xy plane, starting on `ref_dir` and turning counter-clockwise about
/// the axis. The closing point is not repeated.
pub fn sample_circle(frame: &Frame, radius: f64, segments: usize) -> Vec<Point3> {
    let n = segments.max(3);
    (0..n)
        .map(|i| point_on_circle(frame, radius, TAU * i as f64 / n as f64))
        .collect()
}

/// `segments + 1` points along an arc from `start` sweeping by `sweep`
/// radians (negative sweeps run clockwise). Both end points are included.
pub fn sample_arc(frame: &Frame, radius: f64, start: f64, sweep: f64, segments: usize) -> Vec<Point3> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| point_on_circle(frame, radius, start + sweep * i as f64 / n as f64))
        .collect()
}

/// Points along a right-handed helix about the frame axis.
///
/// The helix starts on `ref_dir` at the frame origin and climbs `pitch`
/// per turn. Produces `ceil(turns * segments_per_turn) + 1` points.
pub fn sample_helix(
    frame: &Frame,
    radius: f64,
    pitch: f64,
    turns: f64,
    segments_per_turn: usize,
) -> Vec<Point3> {
    let per_turn = segments_per_turn.max(3) as f64;
    let steps = (turns.max(0.0) * per_turn).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| {
            let t = turns * i as f64 / steps as f64;
            let angle = TAU * t;
            let local = Point3::new(radius * angle.cos(), radius * angle.sin(), pitch * t);
            frame.to_world(&local)
        })
        .collect()
}

fn point_on_circle(frame: &Frame, radius: f64, angle: f64) -> Point3 {
    let (s, c) = angle.sin_cos();
    frame.origin + (frame.ref_dir.into_inner() * c + frame.y_dir().into_inner() * s) * radius
}
