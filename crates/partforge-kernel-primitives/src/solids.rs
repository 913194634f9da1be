use partforge_kernel_math::{Frame, Point3, Tolerance, Vec3};
use partforge_kernel_topo::{CurveRef, Handle, ManifoldSolidBrep, SurfaceRef, TopologyArena};

use crate::builder::{ruled_solid, SolidBuilder};
use crate::{non_negative, positive, PrimitiveError};

/// Axis-aligned box with its minimum corner at `origin`.
///
/// Eight vertices, twelve line edges, six planar faces. Every face loop
/// runs counter-clockwise seen from outside the box:
///
/// ```text
///      7----6
///     /|   /|      z
///    4----5 |      |  y
///    | 3--|-2      | /
///    |/   |/       |/
///    0----1        +---- x
/// ```
pub fn make_box(
    arena: &mut TopologyArena,
    origin: Point3,
    length: f64,
    width: f64,
    height: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let (l, w, h) = (
        positive("length", length)?,
        positive("width", width)?,
        positive("height", height)?,
    );
    let ring = |z: f64| {
        vec![
            origin + Vec3::new(0.0, 0.0, z),
            origin + Vec3::new(l, 0.0, z),
            origin + Vec3::new(l, w, z),
            origin + Vec3::new(0.0, w, z),
        ]
    };
    ruled_solid(arena, "box", &[ring(0.0), ring(h)], true)
}

/// Right circular cylinder standing on `frame` and extending `height`
/// along its axis.
pub fn make_cylinder(
    arena: &mut TopologyArena,
    frame: &Frame,
    radius: f64,
    height: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let r = positive("radius", radius)?;
    solid_of_revolution(arena, "cylinder", frame, r, r, positive("height", height)?)
}

/// Cone frustum from `base_radius` at the frame origin to `top_radius`
/// at `height` along the axis. A zero top radius gives a pointed cone.
pub fn make_cone(
    arena: &mut TopologyArena,
    frame: &Frame,
    base_radius: f64,
    top_radius: f64,
    height: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    solid_of_revolution(
        arena,
        "cone",
        frame,
        positive("base_radius", base_radius)?,
        non_negative("top_radius", top_radius)?,
        positive("height", height)?,
    )
}

/// Sphere: a single unbounded face on a spherical surface.
pub fn make_sphere(
    arena: &mut TopologyArena,
    center: Point3,
    radius: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let radius = positive("radius", radius)?;
    let surface = arena.create_spherical_surface(&Frame::from_axis(center, Vec3::z()), radius);
    let mut builder = SolidBuilder::new(arena);
    builder.face(Vec::new(), SurfaceRef::Sphere(surface), true);
    Ok(builder.finish("sphere"))
}

/// Torus about the frame axis: a single unbounded face.
pub fn make_torus(
    arena: &mut TopologyArena,
    frame: &Frame,
    major_radius: f64,
    minor_radius: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let major = positive("major_radius", major_radius)?;
    let minor = positive("minor_radius", minor_radius)?;
    if minor >= major {
        return Err(PrimitiveError::Degenerate(format!(
            "tube radius {minor} must be below major radius {major}"
        )));
    }
    let surface = arena.create_toroidal_surface(frame, major, minor);
    let mut builder = SolidBuilder::new(arena);
    builder.face(Vec::new(), SurfaceRef::Torus(surface), true);
    Ok(builder.finish("torus"))
}

/// Cylinder or cone between two circles on `frame`.
///
/// Each circle is a single edge whose start and end are the same vertex,
/// placed on the frame's reference direction. The lateral face is bounded
/// by bottom circle, seam up, top circle backwards, seam down. A top
/// radius of zero collapses the top circle into an apex vertex.
pub(crate) fn solid_of_revolution(
    arena: &mut TopologyArena,
    name: &str,
    frame: &Frame,
    bottom_radius: f64,
    top_radius: f64,
    height: f64,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let tol = Tolerance::DEFAULT;
    let top_frame = frame.offset_along_axis(height);
    let mut b = SolidBuilder::new(arena);

    let bottom_circle = b.arena().create_circle(frame, bottom_radius);
    let v_bottom = b
        .arena()
        .create_vertex(frame.to_world(&Point3::new(bottom_radius, 0.0, 0.0)));
    let e_bottom = b
        .arena()
        .create_edge(v_bottom, v_bottom, CurveRef::Circle(bottom_circle), true);

    let apex = tol.is_zero(top_radius);
    let v_top = b
        .arena()
        .create_vertex(top_frame.to_world(&Point3::new(top_radius, 0.0, 0.0)));
    let (seam, _) = b.line_edge(v_bottom, v_top)?;

    let lateral_surface = if tol.is_zero(top_radius - bottom_radius) {
        SurfaceRef::Cylinder(b.arena().create_cylindrical_surface(frame, bottom_radius))
    } else {
        let semi_angle = ((top_radius - bottom_radius) / height).atan();
        SurfaceRef::Cone(b.arena().create_conical_surface(frame, bottom_radius, semi_angle))
    };

    let mut lateral = vec![(e_bottom, true), (seam, true)];
    let e_top = if apex {
        None
    } else {
        let top_circle = b.arena().create_circle(&top_frame, top_radius);
        let e_top = b
            .arena()
            .create_edge(v_top, v_top, CurveRef::Circle(top_circle), true);
        lateral.push((e_top, false));
        Some(e_top)
    };
    lateral.push((seam, false));
    b.face(vec![lateral], lateral_surface, true);

    let bottom_frame = Frame {
        axis: -frame.axis,
        ..*frame
    };
    let bottom_plane = b.arena().create_plane(&bottom_frame);
    b.face(vec![vec![(e_bottom, false)]], SurfaceRef::Plane(bottom_plane), true);

    if let Some(e_top) = e_top {
        let top_plane = b.arena().create_plane(&top_frame);
        b.face(vec![vec![(e_top, true)]], SurfaceRef::Plane(top_plane), true);
    }

    Ok(b.finish(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_topo::{check_closure, EntityKind};

    #[test]
    fn test_box_topology() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 10.0, 20.0, 30.0).unwrap();
        assert_eq!(arena.count_kind(EntityKind::VertexPoint), 8);
        assert_eq!(arena.count_kind(EntityKind::EdgeCurve), 12);
        assert_eq!(arena.count_kind(EntityKind::AdvancedFace), 6);
        let report = check_closure(&arena, solid).unwrap();
        assert!(report.is_closed(), "{report:?}");
        assert_eq!(report.edges, 12);
        assert_eq!(arena.get(solid).unwrap().name, "box");
    }

    #[test]
    fn test_box_rejects_non_positive() {
        let mut arena = TopologyArena::new();
        let err = make_box(&mut arena, Point3::origin(), 10.0, 0.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            PrimitiveError::InvalidParameter {
                name: "width",
                value: 0.0
            }
        );
        assert!(make_box(&mut arena, Point3::origin(), f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_cylinder_topology() {
        let mut arena = TopologyArena::new();
        let solid = make_cylinder(&mut arena, &Frame::world(), 5.0, 10.0).unwrap();
        let report = check_closure(&arena, solid).unwrap();
        assert!(report.is_closed(), "{report:?}");
        assert_eq!(report.faces, 3);
        assert_eq!(report.edges, 3);
        assert_eq!(arena.count_kind(EntityKind::VertexPoint), 2);
        assert_eq!(arena.count_kind(EntityKind::CylindricalSurface), 1);
    }

    #[test]
    fn test_circle_edge_is_single_vertex_loop() {
        let mut arena = TopologyArena::new();
        make_cylinder(&mut arena, &Frame::world(), 5.0, 10.0).unwrap();
        let circle_edges: Vec<_> = arena
            .entities()
            .filter_map(|e| match &e.data {
                partforge_kernel_topo::EntityData::EdgeCurve(edge) => Some(*edge),
                _ => None,
            })
            .filter(|edge| matches!(edge.curve, CurveRef::Circle(_)))
            .collect();
        assert_eq!(circle_edges.len(), 2);
        assert!(circle_edges.iter().all(|e| e.start == e.end));
    }

    #[test]
    fn test_cone_frustum_and_pointed() {
        let mut arena = TopologyArena::new();
        let frustum = make_cone(&mut arena, &Frame::world(), 5.0, 2.0, 4.0).unwrap();
        let report = check_closure(&arena, frustum).unwrap();
        assert!(report.is_closed());
        assert_eq!(report.faces, 3);

        let pointed = make_cone(&mut arena, &Frame::world(), 5.0, 0.0, 4.0).unwrap();
        let report = check_closure(&arena, pointed).unwrap();
        assert!(report.is_closed(), "{report:?}");
        assert_eq!(report.faces, 2);
        assert_eq!(report.edges, 2);
    }

    #[test]
    fn test_sphere_and_torus_are_unbounded() {
        let mut arena = TopologyArena::new();
        let sphere = make_sphere(&mut arena, Point3::origin(), 3.0).unwrap();
        let torus = make_torus(&mut arena, &Frame::world(), 10.0, 2.0).unwrap();
        for solid in [sphere, torus] {
            let faces = arena.solid_faces(solid).unwrap();
            assert_eq!(faces.len(), 1);
            assert!(arena.get(faces[0]).unwrap().bounds.is_empty());
            let report = check_closure(&arena, solid).unwrap();
            assert!(report.is_closed());
            assert_eq!(report.edges, 0);
        }
        assert!(make_torus(&mut arena, &Frame::world(), 2.0, 3.0).is_err());
    }
}
