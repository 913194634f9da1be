//! Sweep a closed profile along a path.

use partforge_kernel_primitives::ruled_solid;
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::frame::rotation_minimizing_frames;
use crate::{OperatorError, Path, Profile};

/// Options for [`sweep`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    /// Path parameter steps; the solid has `steps + 1` cross-sections.
    pub steps: usize,
    /// Total rotation of the profile about the path tangent (radians).
    pub twist: f64,
    /// Profile scale at the path start.
    pub scale_start: f64,
    /// Profile scale at the path end.
    pub scale_end: f64,
    /// Chords per full turn when discretizing profile arcs.
    pub arc_segments: usize,
    /// Close both ends with planar caps.
    pub caps: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            steps: 20,
            twist: 0.0,
            scale_start: 1.0,
            scale_end: 1.0,
            arc_segments: 32,
            caps: true,
        }
    }
}

/// Sweep `profile` along `path`.
///
/// The profile's 2D coordinates are carried by rotation-minimizing frames
/// whose first normal follows the profile frame's x direction, so a
/// profile lying across the start of the path keeps its orientation.
/// Consecutive cross-sections are joined by planar quads.
pub fn sweep(
    arena: &mut TopologyArena,
    profile: &Profile,
    path: &Path,
    options: &SweepOptions,
) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
    if options.steps == 0 {
        return Err(OperatorError::InvalidParameter {
            name: "steps",
            value: 0.0,
        });
    }
    for (name, value) in [
        ("scale_start", options.scale_start),
        ("scale_end", options.scale_end),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(OperatorError::InvalidParameter { name, value });
        }
    }
    if path.length(options.steps) < 1e-9 {
        return Err(OperatorError::ZeroLengthPath);
    }

    let points = profile.points_2d(options.arc_segments)?;
    let frames = rotation_minimizing_frames(path, options.steps + 1, Some(profile.frame.ref_dir.into_inner()));
    let rings: Vec<_> = frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let t = i as f64 / options.steps as f64;
            let scale = options.scale_start + (options.scale_end - options.scale_start) * t;
            let frame = frame.with_twist(options.twist * t);
            points.iter().map(|p| frame.place(*p, scale)).collect()
        })
        .collect();

    Ok(ruled_solid(arena, "Sweep", &rings, options.caps)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::{Frame, Point3, Vec3};
    use partforge_kernel_topo::{check_closure, EntityData, EntityKind};
    use std::f64::consts::PI;

    fn z_line(len: f64) -> Path {
        Path::Line {
            start: Point3::origin(),
            end: Point3::new(0.0, 0.0, len),
        }
    }

    #[test]
    fn test_sweep_rectangle_along_line() {
        let mut arena = TopologyArena::new();
        let profile = Profile::rectangle(Frame::world(), 4.0, 2.0);
        let solid = sweep(&mut arena, &profile, &z_line(10.0), &SweepOptions::default()).unwrap();
        // 20 steps x 4 sides + 2 caps
        assert_eq!(arena.solid_faces(solid).unwrap().len(), 82);
        assert!(check_closure(&arena, solid).unwrap().is_closed());
    }

    #[test]
    fn test_sweep_keeps_profile_orientation() {
        let mut arena = TopologyArena::new();
        let profile = Profile::rectangle(Frame::world(), 4.0, 2.0);
        let options = SweepOptions {
            steps: 1,
            ..SweepOptions::default()
        };
        sweep(&mut arena, &profile, &z_line(5.0), &options).unwrap();
        let xs: Vec<f64> = arena
            .entities()
            .filter_map(|e| match &e.data {
                EntityData::CartesianPoint(p) => Some(p.coords.x),
                _ => None,
            })
            .collect();
        assert!(xs.iter().all(|x| x.abs() <= 2.0 + 1e-9));
        assert!(xs.iter().any(|x| (x.abs() - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_sweep_twist_and_scale() {
        let mut arena = TopologyArena::new();
        let profile = Profile::rectangle(Frame::world(), 2.0, 2.0);
        let options = SweepOptions {
            steps: 8,
            twist: PI / 2.0,
            scale_end: 0.5,
            ..SweepOptions::default()
        };
        let solid = sweep(&mut arena, &profile, &z_line(4.0), &options).unwrap();
        assert!(check_closure(&arena, solid).unwrap().is_closed());
        assert_eq!(arena.count_kind(EntityKind::VertexPoint), 9 * 4);
    }

    #[test]
    fn test_sweep_along_arc_is_closed() {
        let mut arena = TopologyArena::new();
        let profile = Profile::circle(
            Frame::new(Point3::new(10.0, 0.0, 0.0), Vec3::y(), Vec3::x()),
            partforge_kernel_math::Point2::origin(),
            1.0,
        );
        let path = Path::Arc {
            frame: Frame::world(),
            radius: 10.0,
            start_angle: 0.0,
            sweep: PI / 2.0,
        };
        let options = SweepOptions {
            arc_segments: 16,
            ..SweepOptions::default()
        };
        let solid = sweep(&mut arena, &profile, &path, &options).unwrap();
        assert!(check_closure(&arena, solid).unwrap().is_closed());
    }

    #[test]
    fn test_sweep_zero_length_path() {
        let mut arena = TopologyArena::new();
        let profile = Profile::rectangle(Frame::world(), 1.0, 1.0);
        let err = sweep(&mut arena, &profile, &z_line(0.0), &SweepOptions::default()).unwrap_err();
        assert_eq!(err, OperatorError::ZeroLengthPath);
    }
}
