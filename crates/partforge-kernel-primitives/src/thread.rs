use partforge_kernel_math::{sample_helix, Frame, Point3};
use partforge_kernel_nurbs::{coalesce_knots, BSplineCurve};
use partforge_kernel_topo::{BSplineCurveWithKnots, Handle, ManifoldSolidBrep, TopologyArena};

use crate::solids::solid_of_revolution;
use crate::{positive, PrimitiveError};

/// ISO metric basic profile: minor diameter = major − 1.082532 × pitch.
const ISO_MINOR_FACTOR: f64 = 1.082_532;

/// Output of [`thread`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadFeature {
    /// Minor-diameter cylinder used for material removal.
    pub solid: Handle<ManifoldSolidBrep>,
    /// Cubic clamped B-spline through the major-diameter helix.
    pub curve: Handle<BSplineCurveWithKnots>,
    /// Helix samples at the major diameter.
    pub major_points: Vec<Point3>,
    /// Helix samples at the minor diameter.
    pub minor_points: Vec<Point3>,
    /// Number of revolutions, `length / pitch`.
    pub turns: f64,
}

/// Threaded bore along `frame`'s axis starting at its origin.
///
/// Flanks are not modelled as solid geometry: only the minor-diameter
/// cylinder is returned for booleans, with the helices kept alongside.
/// `minor_diameter` defaults to the ISO basic profile.
pub fn thread(
    arena: &mut TopologyArena,
    frame: &Frame,
    major_diameter: f64,
    pitch: f64,
    length: f64,
    minor_diameter: Option<f64>,
    segments_per_turn: usize,
) -> Result<ThreadFeature, PrimitiveError> {
    let major = positive("diameter", major_diameter)?;
    let pitch = positive("pitch", pitch)?;
    let length = positive("length", length)?;
    let minor = positive(
        "minor_diameter",
        minor_diameter.unwrap_or(major - ISO_MINOR_FACTOR * pitch),
    )?;
    if minor >= major {
        return Err(PrimitiveError::Degenerate(format!(
            "minor diameter {minor} must be below major diameter {major}"
        )));
    }

    let turns = length / pitch;
    let major_points = sample_helix(frame, major / 2.0, pitch, turns, segments_per_turn);
    let minor_points = sample_helix(frame, minor / 2.0, pitch, turns, segments_per_turn);

    let spline = BSplineCurve::clamped(major_points.clone(), 3)?;
    let (knots, multiplicities) = coalesce_knots(&spline.knots);
    let curve = arena.create_bspline_curve(spline.degree, &spline.control_points, knots, multiplicities);

    let solid = solid_of_revolution(arena, "Thread", frame, minor / 2.0, minor / 2.0, length)?;

    Ok(ThreadFeature {
        solid,
        curve,
        major_points,
        minor_points,
        turns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::Vec3;
    use partforge_kernel_topo::check_closure;

    #[test]
    fn test_m10_thread() {
        let mut arena = TopologyArena::new();
        let frame = Frame::from_axis(Point3::new(0.0, 0.0, 20.0), -Vec3::z());
        let t = thread(&mut arena, &frame, 10.0, 1.5, 15.0, None, 36).unwrap();
        assert!((t.turns - 10.0).abs() < 1e-12);
        assert_eq!(t.major_points.len(), 361);
        assert_eq!(t.minor_points.len(), 361);
        for p in &t.major_points {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 5.0).abs() < 1e-9);
        }

        let curve = arena.get(t.curve).unwrap();
        assert_eq!(curve.degree, 3);
        assert_eq!(curve.control_points.len(), 361);
        assert_eq!(curve.multiplicities.first(), Some(&4));
        assert_eq!(curve.multiplicities.last(), Some(&4));
        assert_eq!(curve.multiplicities.iter().sum::<usize>(), 361 + 4);
        assert!(check_closure(&arena, t.solid).unwrap().is_closed());
    }

    #[test]
    fn test_thread_rejects_inverted_diameters() {
        let mut arena = TopologyArena::new();
        let err = thread(&mut arena, &Frame::world(), 10.0, 1.5, 15.0, Some(12.0), 36);
        assert!(matches!(err, Err(PrimitiveError::Degenerate(_))));
    }
}
