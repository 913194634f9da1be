//! Hollow out a planar-faced solid.

use std::collections::{BTreeMap, HashMap};

use nalgebra::Matrix3;
use partforge_kernel_math::Vec3;
use partforge_kernel_primitives::{PrimitiveError, SolidBuilder};
use partforge_kernel_topo::{
    AdvancedFace, FaceBound, Handle, ManifoldSolidBrep, SurfaceRef, TopologyArena, TopologyError, VertexPoint,
};

use crate::OperatorError;

struct PlanarFace {
    handle: Handle<AdvancedFace>,
    ring: Vec<Handle<VertexPoint>>,
    normal: Vec3,
    distance: f64,
    removed: bool,
}

/// Hollow `solid` to a wall of `thickness`, leaving `faces_to_remove` open.
///
/// Every face must be planar with a single boundary loop. Each inner
/// vertex is the least-squares intersection of the planes of its adjacent
/// faces, with retained faces moved inward by `thickness` and removed
/// faces left in place. The result reuses the retained outer faces, adds
/// one reversed inner face per retained face and one rim wall along each
/// edge of an opening. Handles not on the solid are ignored.
pub fn shell(
    arena: &mut TopologyArena,
    solid: Handle<ManifoldSolidBrep>,
    thickness: f64,
    faces_to_remove: &[Handle<AdvancedFace>],
) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
    if !(thickness.is_finite() && thickness > 0.0) {
        return Err(OperatorError::InvalidParameter {
            name: "thickness",
            value: thickness,
        });
    }
    let faces = planar_faces(arena, solid, faces_to_remove)?;
    if faces.iter().all(|f| f.removed) {
        return Err(OperatorError::InvalidParameter {
            name: "faces_to_remove",
            value: faces.len() as f64,
        });
    }

    let mut incident: BTreeMap<u32, (Handle<VertexPoint>, Vec<usize>)> = BTreeMap::new();
    let mut opening_edges: HashMap<(u32, u32), usize> = HashMap::new();
    for (i, face) in faces.iter().enumerate() {
        for (k, &v) in face.ring.iter().enumerate() {
            incident.entry(v.id()).or_insert_with(|| (v, Vec::new())).1.push(i);
            if face.removed {
                let w = face.ring[(k + 1) % face.ring.len()];
                *opening_edges.entry(edge_key(v, w)).or_default() += 1;
            }
        }
    }

    let mut b = SolidBuilder::new(arena);
    for face in faces.iter().filter(|f| !f.removed) {
        let bound = first_bound(b.arena(), face.handle)?;
        for oe in b.arena().bound_edges(bound)? {
            b.register_edge(oe.edge)?;
        }
        b.push_face(face.handle);
    }

    let mut inner: HashMap<u32, Handle<VertexPoint>> = HashMap::with_capacity(incident.len());
    for (id, (vertex, adjacent)) in &incident {
        let p = b.arena().vertex_point(*vertex)?;
        let mut m = Matrix3::zeros();
        let mut rhs = Vec3::zeros();
        for &i in adjacent {
            let f = &faces[i];
            let target = if f.removed { f.distance } else { f.distance - thickness };
            m += f.normal * f.normal.transpose();
            rhs += f.normal * (target - f.normal.dot(&p.coords));
        }
        let delta = m
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|e| PrimitiveError::Degenerate(e.to_string()))?;
        inner.insert(*id, b.arena().create_vertex(p + delta));
    }
    let inner_of = |v: Handle<VertexPoint>| {
        inner
            .get(&v.id())
            .copied()
            .ok_or(OperatorError::Topology(TopologyError::NotFound(v.id())))
    };

    for face in &faces {
        let n = face.ring.len();
        if face.removed {
            for k in 0..n {
                let (a, c) = (face.ring[k], face.ring[(k + 1) % n]);
                if opening_edges.get(&edge_key(a, c)).copied().unwrap_or(0) > 1 {
                    continue;
                }
                b.polygon_face(&[a, c, inner_of(c)?, inner_of(a)?])?;
            }
        } else {
            let ring = face
                .ring
                .iter()
                .rev()
                .map(|&v| inner_of(v))
                .collect::<Result<Vec<_>, _>>()?;
            b.polygon_face(&ring)?;
        }
    }
    Ok(b.finish("Shell"))
}

fn edge_key(a: Handle<VertexPoint>, b: Handle<VertexPoint>) -> (u32, u32) {
    (a.id().min(b.id()), a.id().max(b.id()))
}

fn first_bound(
    arena: &TopologyArena,
    face: Handle<AdvancedFace>,
) -> Result<Handle<FaceBound>, OperatorError> {
    arena
        .get(face)?
        .bounds
        .first()
        .copied()
        .ok_or(OperatorError::UnsupportedFace(face.id()))
}

fn planar_faces(
    arena: &TopologyArena,
    solid: Handle<ManifoldSolidBrep>,
    faces_to_remove: &[Handle<AdvancedFace>],
) -> Result<Vec<PlanarFace>, OperatorError> {
    let mut out = Vec::new();
    for handle in arena.solid_faces(solid)? {
        let face = arena.get(handle)?;
        let SurfaceRef::Plane(plane) = face.surface else {
            return Err(OperatorError::UnsupportedFace(handle.id()));
        };
        if face.bounds.len() != 1 {
            return Err(OperatorError::UnsupportedFace(handle.id()));
        }
        let frame = arena.placement_frame(arena.get(plane)?.position)?;
        let normal = if face.same_sense {
            frame.axis.into_inner()
        } else {
            -frame.axis.into_inner()
        };
        let ring = arena
            .bound_edges(face.bounds[0])?
            .iter()
            .map(|oe| arena.traversal_vertices(oe).map(|(start, _)| start))
            .collect::<Result<Vec<_>, _>>()?;
        if ring.len() < 3 {
            return Err(OperatorError::UnsupportedFace(handle.id()));
        }
        out.push(PlanarFace {
            handle,
            ring,
            normal,
            distance: normal.dot(&frame.origin.coords),
            removed: faces_to_remove.contains(&handle),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::{Frame, Point3};
    use partforge_kernel_primitives::{make_box, make_cylinder};
    use partforge_kernel_topo::{check_closure, EntityData};

    fn top_face(arena: &TopologyArena, solid: Handle<ManifoldSolidBrep>) -> Handle<AdvancedFace> {
        arena
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .find(|&f| {
                let face = arena.get(f).unwrap();
                let SurfaceRef::Plane(p) = face.surface else { return false };
                let frame = arena.placement_frame(arena.get(p).unwrap().position).unwrap();
                face.same_sense && frame.axis.z > 0.99
            })
            .unwrap()
    }

    fn has_vertex_at(arena: &TopologyArena, p: Point3) -> bool {
        arena.entities().any(|e| match &e.data {
            EntityData::CartesianPoint(c) => (c.coords - p).norm() < 1e-9,
            _ => false,
        })
    }

    #[test]
    fn test_open_box() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 10.0, 10.0, 10.0).unwrap();
        let top = top_face(&arena, solid);
        let shelled = shell(&mut arena, solid, 1.0, &[top]).unwrap();
        // 5 outer + 5 inner + 4 rim
        assert_eq!(arena.solid_faces(shelled).unwrap().len(), 14);
        let report = check_closure(&arena, shelled).unwrap();
        assert!(report.is_closed(), "{report:?}");
        assert!(has_vertex_at(&arena, Point3::new(1.0, 1.0, 1.0)));
        assert!(has_vertex_at(&arena, Point3::new(9.0, 9.0, 10.0)));
    }

    #[test]
    fn test_closed_hollow_box() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 4.0, 6.0, 8.0).unwrap();
        let shelled = shell(&mut arena, solid, 0.5, &[]).unwrap();
        assert_eq!(arena.solid_faces(shelled).unwrap().len(), 12);
        assert!(check_closure(&arena, shelled).unwrap().is_closed());
        assert!(has_vertex_at(&arena, Point3::new(3.5, 5.5, 7.5)));
    }

    #[test]
    fn test_shell_rejects_curved_faces() {
        let mut arena = TopologyArena::new();
        let solid = make_cylinder(&mut arena, &Frame::world(), 2.0, 5.0).unwrap();
        assert!(matches!(
            shell(&mut arena, solid, 0.5, &[]),
            Err(OperatorError::UnsupportedFace(_))
        ));
    }

    #[test]
    fn test_shell_rejects_bad_thickness() {
        let mut arena = TopologyArena::new();
        let solid = make_box(&mut arena, Point3::origin(), 1.0, 1.0, 1.0).unwrap();
        assert!(matches!(
            shell(&mut arena, solid, 0.0, &[]),
            Err(OperatorError::InvalidParameter { name: "thickness", .. })
        ));
    }
}
