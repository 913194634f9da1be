//! Shared face/edge bookkeeping for generators.

use std::collections::HashMap;

use partforge_kernel_math::{Frame, Point3, Vec3};
use partforge_kernel_topo::{
    AdvancedFace, CurveRef, EdgeCurve, Handle, ManifoldSolidBrep, SurfaceRef, TopologyArena,
    TopologyError, VertexPoint,
};

use crate::PrimitiveError;

/// An edge plus the direction it is traversed in a loop.
pub type EdgeUse = (Handle<EdgeCurve>, bool);

/// Builds one solid's faces, sharing straight edges between faces that
/// meet along the same vertex pair so every edge ends up traversed once
/// in each direction.
pub struct SolidBuilder<'a> {
    arena: &'a mut TopologyArena,
    edges: HashMap<(u32, u32), Handle<EdgeCurve>>,
    faces: Vec<Handle<AdvancedFace>>,
}

impl<'a> SolidBuilder<'a> {
    /// Start a solid in `arena`.
    pub fn new(arena: &'a mut TopologyArena) -> Self {
        Self {
            arena,
            edges: HashMap::new(),
            faces: Vec::new(),
        }
    }

    /// The underlying arena.
    pub fn arena(&mut self) -> &mut TopologyArena {
        &mut *self.arena
    }

    /// Create one vertex per point.
    pub fn vertices(&mut self, points: &[Point3]) -> Vec<Handle<VertexPoint>> {
        points.iter().map(|p| self.arena.create_vertex(*p)).collect()
    }

    /// Make an existing edge available to [`line_edge`](Self::line_edge).
    pub fn register_edge(&mut self, edge: Handle<EdgeCurve>) -> Result<(), TopologyError> {
        let e = self.arena.get(edge)?;
        self.edges.insert(edge_key(e.start, e.end), edge);
        Ok(())
    }

    /// The straight edge from `a` to `b`, created on first use.
    pub fn line_edge(
        &mut self,
        a: Handle<VertexPoint>,
        b: Handle<VertexPoint>,
    ) -> Result<EdgeUse, TopologyError> {
        if let Some(&edge) = self.edges.get(&edge_key(a, b)) {
            return Ok((edge, self.arena.get(edge)?.start == a));
        }
        let pa = self.arena.vertex_point(a)?;
        let pb = self.arena.vertex_point(b)?;
        let origin = self.arena.get(a)?.point;
        let line = self.arena.create_line(origin, pb - pa);
        let edge = self.arena.create_edge(a, b, CurveRef::Line(line), true);
        self.edges.insert(edge_key(a, b), edge);
        Ok((edge, true))
    }

    /// A planar face bounded by the closed polygon `ring`, which must run
    /// counter-clockwise about the intended outward normal.
    pub fn polygon_face(&mut self, ring: &[Handle<VertexPoint>]) -> Result<Handle<AdvancedFace>, TopologyError> {
        let mut uses = Vec::with_capacity(ring.len());
        let mut points = Vec::with_capacity(ring.len());
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            uses.push(self.line_edge(a, b)?);
            points.push(self.arena.vertex_point(a)?);
        }
        let normal = newell_normal(&points);
        let frame = Frame::new(points[0], normal, points[1] - points[0]);
        let plane = self.arena.create_plane(&frame);
        Ok(self.face(vec![uses], SurfaceRef::Plane(plane), true))
    }

    /// A face over `surface` whose first loop is the outer bound.
    pub fn face(&mut self, loops: Vec<Vec<EdgeUse>>, surface: SurfaceRef, same_sense: bool) -> Handle<AdvancedFace> {
        let mut bounds = Vec::with_capacity(loops.len());
        for (i, uses) in loops.into_iter().enumerate() {
            let oriented = uses
                .into_iter()
                .map(|(edge, orientation)| self.arena.create_oriented_edge(edge, orientation))
                .collect();
            let edge_loop = self.arena.create_edge_loop(oriented);
            bounds.push(self.arena.create_face_bound(edge_loop, true, i == 0));
        }
        let face = self.arena.create_face(bounds, surface, same_sense);
        self.faces.push(face);
        face
    }

    /// Add a face built elsewhere to the shell.
    pub fn push_face(&mut self, face: Handle<AdvancedFace>) {
        self.faces.push(face);
    }

    /// Wrap the collected faces in a shell and solid.
    pub fn finish(self, name: &str) -> Handle<ManifoldSolidBrep> {
        let shell = self.arena.create_shell(self.faces);
        self.arena.create_solid(name, shell)
    }
}

fn edge_key(a: Handle<VertexPoint>, b: Handle<VertexPoint>) -> (u32, u32) {
    (a.id().min(b.id()), a.id().max(b.id()))
}

/// Area-weighted normal of a polygon (Newell's method), not normalized.
pub fn newell_normal(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

fn centroid(points: &[Point3]) -> Point3 {
    let sum = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Drop consecutive duplicates (including the wrap-around pair).
pub fn dedup_ring(points: Vec<Point3>) -> Vec<Point3> {
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |q| (p - q).norm() > 1e-9) {
            out.push(p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= 1e-9 {
        out.pop();
    }
    out
}

/// A solid ruled between consecutive point rings.
///
/// All rings need the same point count. Rings are reordered so they run
/// counter-clockwise about the direction from the first ring to the
/// second, which makes every side quad face outward. With `caps` the
/// first and last rings are closed by planar faces.
pub fn ruled_solid(
    arena: &mut TopologyArena,
    name: &str,
    rings: &[Vec<Point3>],
    caps: bool,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    if rings.len() < 2 {
        return Err(PrimitiveError::Degenerate("ruled solid needs at least two rings".into()));
    }
    let n = rings[0].len();
    if n < 3 || rings.iter().any(|r| r.len() != n) {
        return Err(PrimitiveError::Degenerate(
            "ruled solid rings need matching point counts of at least 3".into(),
        ));
    }

    let travel = centroid(&rings[1]) - centroid(&rings[0]);
    let flip = newell_normal(&rings[0]).dot(&travel) < 0.0;
    let mut builder = SolidBuilder::new(arena);
    let verts: Vec<Vec<Handle<VertexPoint>>> = rings
        .iter()
        .map(|ring| {
            let mut ring = ring.clone();
            if flip {
                ring.reverse();
            }
            builder.vertices(&ring)
        })
        .collect();

    for pair in verts.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        for i in 0..n {
            let j = (i + 1) % n;
            builder.polygon_face(&[lower[i], lower[j], upper[j], upper[i]])?;
        }
    }
    if caps {
        let mut bottom = verts[0].clone();
        bottom.reverse();
        builder.polygon_face(&bottom)?;
        builder.polygon_face(&verts[verts.len() - 1])?;
    }
    Ok(builder.finish(name))
}
