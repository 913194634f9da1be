//! Thin stiffening walls.

use partforge_kernel_math::{direction, perpendicular, Point3, Vec3};
use partforge_kernel_primitives::ruled_solid;
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::OperatorError;

/// A wall of `thickness` standing `height` along `up` on the segment
/// from `start` to `end`, centered on the segment across its thickness.
pub fn rib(
    arena: &mut TopologyArena,
    start: Point3,
    end: Point3,
    up: Vec3,
    thickness: f64,
    height: f64,
) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
    for (name, value) in [("thickness", thickness), ("height", height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(OperatorError::InvalidParameter { name, value });
        }
    }
    let run = end - start;
    if run.norm() < 1e-9 {
        return Err(OperatorError::ZeroLengthPath);
    }
    let along = direction(run);
    let lifted = up - along.into_inner() * up.dot(along.as_ref());
    let up = if lifted.norm() > 1e-9 {
        direction(lifted)
    } else {
        perpendicular(&along)
    };
    let side = along.cross(up.as_ref()) * (thickness / 2.0);
    let rise = up.into_inner() * height;
    let section = |p: Point3| vec![p - side, p + side, p + side + rise, p - side + rise];
    Ok(ruled_solid(arena, "Rib", &[section(start), section(end)], true)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::Aabb3;
    use partforge_kernel_topo::{check_closure, EntityData};

    #[test]
    fn test_rib_extent() {
        let mut arena = TopologyArena::new();
        let solid = rib(
            &mut arena,
            Point3::origin(),
            Point3::new(10.0, 0.0, 0.0),
            Vec3::z(),
            2.0,
            5.0,
        )
        .unwrap();
        assert_eq!(arena.solid_faces(solid).unwrap().len(), 6);
        assert!(check_closure(&arena, solid).unwrap().is_closed());
        let points: Vec<Point3> = arena
            .entities()
            .filter_map(|e| match &e.data {
                EntityData::CartesianPoint(p) => Some(p.coords),
                _ => None,
            })
            .collect();
        let bounds = Aabb3::from_points(&points).unwrap();
        assert!((bounds.min - Point3::new(0.0, -1.0, 0.0)).norm() < 1e-9);
        assert!((bounds.max - Point3::new(10.0, 1.0, 5.0)).norm() < 1e-9);
    }

    #[test]
    fn test_rib_tilted_up_is_orthogonalized() {
        let mut arena = TopologyArena::new();
        let solid = rib(
            &mut arena,
            Point3::origin(),
            Point3::new(0.0, 4.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
            1.0,
            1.0,
        )
        .unwrap();
        assert!(check_closure(&arena, solid).unwrap().is_closed());
    }

    #[test]
    fn test_rib_zero_length() {
        let mut arena = TopologyArena::new();
        let err = rib(&mut arena, Point3::origin(), Point3::origin(), Vec3::z(), 1.0, 1.0).unwrap_err();
        assert_eq!(err, OperatorError::ZeroLengthPath);
    }
}
