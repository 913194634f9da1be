#![warn(missing_docs)]

//! B-rep to triangle soup tessellation for the partforge kernel.
//!
//! Every face is converted by surface type:
//!
//! - planes: fan from the first boundary vertex when convex, ear clipping
//!   otherwise, ring stitching when the face has one hole
//! - cylinders and cones: an angular × axial grid spanning the boundary
//! - spheres and tori: a full parametric grid when unbounded, otherwise
//!   the parametric window occupied by the boundary
//! - B-spline surfaces: a uniform parameter grid
//!
//! The same [`TessellationParams`] feed both the boolean engine and mesh
//! export, so shared boundaries are sampled identically.

mod analytic;
mod boundary;
mod mesh;
mod planar;

pub use boundary::bound_polyline;
pub use mesh::RenderMesh;

use partforge_kernel_math::{Aabb3, Point3, Vec3};
use partforge_kernel_topo::{AdvancedFace, Handle, ManifoldSolidBrep, SurfaceRef, TopologyArena, TopologyError};
use serde::{Deserialize, Serialize};

/// A triangle in model space. Winding is counter-clockwise about the
/// outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3,
    /// Second vertex.
    pub v1: Point3,
    /// Third vertex.
    pub v2: Point3,
}

impl Triangle {
    /// Create a triangle.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit normal from the winding, or zero for a degenerate triangle.
    pub fn normal(&self) -> Vec3 {
        let n = (self.v1 - self.v0).cross(&(self.v2 - self.v0));
        let len = n.norm();
        if len < 1e-15 {
            Vec3::zeros()
        } else {
            n / len
        }
    }

    /// Area.
    pub fn area(&self) -> f64 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0)).norm() / 2.0
    }

    /// The same triangle with opposite winding.
    pub fn flipped(&self) -> Self {
        Self::new(self.v0, self.v2, self.v1)
    }

    /// Signed volume of the tetrahedron spanned with the origin.
    pub fn signed_volume(&self) -> f64 {
        self.v0.coords.dot(&self.v1.coords.cross(&self.v2.coords)) / 6.0
    }
}

/// Enclosed volume of a closed, outward-wound soup (signed-tetrahedron sum).
pub fn soup_volume(triangles: &[Triangle]) -> f64 {
    triangles.iter().map(Triangle::signed_volume).sum()
}

/// Total area of a soup.
pub fn soup_area(triangles: &[Triangle]) -> f64 {
    triangles.iter().map(Triangle::area).sum()
}

/// Bounds of a soup, `None` when it is empty.
pub fn soup_bounds(triangles: &[Triangle]) -> Option<Aabb3> {
    Aabb3::from_points(triangles.iter().flat_map(|t| [&t.v0, &t.v1, &t.v2]))
}

/// Sampling density for curved geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationParams {
    /// Segments per full turn for circles, cylinders and cones.
    pub circle_segments: usize,
    /// Segments around the sphere axis.
    pub sphere_segments: usize,
    /// Rings from pole to pole.
    pub sphere_rings: usize,
    /// Segments around the torus axis.
    pub torus_segments: usize,
    /// Segments around the torus tube.
    pub torus_rings: usize,
    /// Samples per parameter direction on B-spline surfaces.
    pub bspline_samples: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            circle_segments: 32,
            sphere_segments: 32,
            sphere_rings: 16,
            torus_segments: 32,
            torus_rings: 16,
            bspline_samples: 16,
        }
    }
}

impl TessellationParams {
    /// Params with every angular count derived from one segment hint.
    pub fn from_segments(segments: usize) -> Self {
        let segments = segments.max(3);
        Self {
            circle_segments: segments,
            sphere_segments: segments,
            sphere_rings: (segments / 2).max(4),
            torus_segments: segments,
            torus_rings: (segments / 2).max(4),
            bspline_samples: (segments / 2).max(4),
        }
    }
}

/// Tessellate every face of `solid`. Missing references yield no
/// triangles for the affected face.
pub fn tessellate_solid(
    arena: &TopologyArena,
    solid: Handle<ManifoldSolidBrep>,
    params: &TessellationParams,
) -> Vec<Triangle> {
    let faces = match arena.solid_faces(solid) {
        Ok(faces) => faces,
        Err(err) => {
            tracing::warn!(solid = solid.id(), %err, "cannot resolve solid, no triangles");
            return Vec::new();
        }
    };
    let triangles: Vec<Triangle> = faces
        .into_iter()
        .flat_map(|face| tessellate_face(arena, face, params))
        .collect();
    tracing::debug!(solid = solid.id(), triangles = triangles.len(), "tessellated solid");
    triangles
}

/// Tessellate a single face; a face that cannot be resolved yields no
/// triangles and a warning.
pub fn tessellate_face(arena: &TopologyArena, face: Handle<AdvancedFace>, params: &TessellationParams) -> Vec<Triangle> {
    match try_tessellate_face(arena, face, params) {
        Ok(triangles) => triangles
            .into_iter()
            .filter(|t| t.area() > DEGENERATE_AREA)
            .collect(),
        Err(err) => {
            tracing::warn!(face = face.id(), %err, "skipping face");
            Vec::new()
        }
    }
}

/// Triangles at or below this area are dropped.
const DEGENERATE_AREA: f64 = 1e-12;

fn try_tessellate_face(
    arena: &TopologyArena,
    face: Handle<AdvancedFace>,
    params: &TessellationParams,
) -> Result<Vec<Triangle>, TopologyError> {
    let face = arena.get(face)?;
    let mut loops = Vec::with_capacity(face.bounds.len());
    let mut closed_circle = false;
    for &bound in &face.bounds {
        let outer = arena.get(bound)?.outer;
        let polyline = bound_polyline(arena, bound, params)?;
        closed_circle |= polyline.has_closed_circle;
        loops.push((outer, polyline.points));
    }
    // Outer bound first.
    loops.sort_by_key(|(outer, _)| !outer);
    let loops: Vec<Vec<Point3>> = loops.into_iter().map(|(_, points)| points).collect();

    let triangles = match face.surface {
        SurfaceRef::Plane(h) => {
            let frame = arena.placement_frame(arena.get(h)?.position)?;
            let normal = if face.same_sense { frame.axis.into_inner() } else { -frame.axis.into_inner() };
            planar::tessellate_planar(&loops, &normal)
        }
        SurfaceRef::Cylinder(h) => {
            let s = arena.get(h)?;
            let frame = arena.placement_frame(s.position)?;
            analytic::cone_like(&frame, s.radius, 0.0, &loops, closed_circle, params)
        }
        SurfaceRef::Cone(h) => {
            let s = arena.get(h)?;
            let frame = arena.placement_frame(s.position)?;
            analytic::cone_like(&frame, s.radius, s.semi_angle.tan(), &loops, closed_circle, params)
        }
        SurfaceRef::Sphere(h) => {
            let s = arena.get(h)?;
            let frame = arena.placement_frame(s.position)?;
            analytic::sphere(&frame, s.radius, &loops, closed_circle, face.same_sense, params)
        }
        SurfaceRef::Torus(h) => {
            let s = arena.get(h)?;
            let frame = arena.placement_frame(s.position)?;
            analytic::torus(&frame, s.major_radius, s.minor_radius, &loops, closed_circle, params)
        }
        SurfaceRef::BSpline(h) => analytic::bspline(arena, h, params)?,
    };

    // Planar triangles are already wound about the outward normal.
    let flip = !face.same_sense && !matches!(face.surface, SurfaceRef::Plane(_));
    Ok(if flip {
        triangles.iter().map(Triangle::flipped).collect()
    } else {
        triangles
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use partforge_kernel_math::Frame;
    use partforge_kernel_primitives::{hole, make_box, make_cone, make_cylinder, make_sphere, make_torus, pocket};
    use std::f64::consts::PI;

    fn params() -> TessellationParams {
        TessellationParams::default()
    }

    #[test]
    fn test_box_volume_and_area() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 10.0, 10.0, 10.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &params());
        assert_eq!(tris.len(), 12);
        assert_relative_eq!(soup_volume(&tris), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(soup_area(&tris), 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_box_volume_scales() {
        for s in [1.0, 10.0, 100.0] {
            let mut arena = TopologyArena::new();
            let solid = make_box(&mut arena, Point3::new(-3.0, 2.0, 1.0), s, s * 2.0, s / 2.0).unwrap();
            let tris = tessellate_solid(&arena, solid, &params());
            let expected = s * s * s;
            assert!((soup_volume(&tris) - expected).abs() < expected * 0.01);
        }
    }

    #[test]
    fn test_cylinder_volume() {
        let mut arena = TopologyArena::new();
        let solid = make_cylinder(&mut arena, &Frame::world(), 5.0, 10.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &TessellationParams::from_segments(64));
        let expected = PI * 25.0 * 10.0;
        assert!((soup_volume(&tris) - expected).abs() < expected * 0.01);
        // 64 lateral quads plus two 62-triangle fans
        assert_eq!(tris.len(), 128 + 124);
    }

    #[test]
    fn test_hole_points_down() {
        let mut arena = TopologyArena::new();
        let solid = hole(&mut arena, Point3::new(0.0, 0.0, 20.0), 10.0, 20.0, -Vec3::z()).unwrap();
        let tris = tessellate_solid(&arena, solid, &params());
        let bounds = soup_bounds(&tris).unwrap();
        assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.z, 20.0, epsilon = 1e-9);
        assert!(soup_volume(&tris) > 0.0);
    }

    #[test]
    fn test_pointed_cone_volume() {
        let mut arena = TopologyArena::new();
        let solid = make_cone(&mut arena, &Frame::world(), 3.0, 0.0, 6.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &TessellationParams::from_segments(128));
        let expected = PI * 9.0 * 6.0 / 3.0;
        assert!((soup_volume(&tris) - expected).abs() < expected * 0.01);
    }

    #[test]
    fn test_sphere_volume() {
        let mut arena = TopologyArena::new();
        let solid = make_sphere(&mut arena, Point3::new(1.0, 2.0, 3.0), 10.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &TessellationParams::from_segments(64));
        let expected = 4.0 / 3.0 * PI * 1000.0;
        assert!((soup_volume(&tris) - expected).abs() < expected * 0.02);
    }

    #[test]
    fn test_sphere_default_counts() {
        let mut arena = TopologyArena::new();
        let solid = make_sphere(&mut arena, Point3::origin(), 1.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &params());
        // 32 x 16 quads, pole rows collapse to single triangles
        assert_eq!(tris.len(), 32 * 14 * 2 + 2 * 32);
    }

    #[test]
    fn test_torus_volume() {
        let mut arena = TopologyArena::new();
        let solid = make_torus(&mut arena, &Frame::world(), 5.0, 1.0).unwrap();
        let tris = tessellate_solid(&arena, solid, &TessellationParams::from_segments(64));
        let expected = 2.0 * PI * PI * 5.0;
        assert!((soup_volume(&tris) - expected).abs() < expected * 0.02);
    }

    #[test]
    fn test_pocket_volume_with_rounded_corners() {
        let mut arena = TopologyArena::new();
        let solid = pocket(&mut arena, Point3::new(30.0, 15.0, 20.0), 40.0, 20.0, 10.0, 4.0, 32).unwrap();
        let tris = tessellate_solid(&arena, solid, &params());
        let exact = (40.0 * 20.0 - (4.0 - PI) * 16.0) * 10.0;
        assert!((soup_volume(&tris) - exact).abs() < exact * 0.01);
    }

    #[test]
    fn test_stale_solid_yields_nothing() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 1.0, 1.0, 1.0).unwrap();
        arena.reset();
        assert!(tessellate_solid(&arena, solid, &params()).is_empty());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let p: TessellationParams = serde_json::from_str(r#"{"circle_segments": 48}"#).unwrap();
        assert_eq!(p.circle_segments, 48);
        assert_eq!(p.sphere_rings, 16);
    }
}
