//! Revolve a closed profile about an axis.
//!
//! The profile is mapped into `(r, z)` half-plane coordinates around the
//! axis and normalized to run counter-clockwise there. Each segment then
//! sweeps one face:
//!
//! | segment | surface |
//! |---------|---------|
//! | parallel to the axis | cylinder |
//! | perpendicular to the axis | plane |
//! | other line | cone |
//! | arc centered on the axis | sphere |
//! | other arc | torus |
//!
//! Segments lying on the axis sweep nothing. A revolve short of a full
//! turn is closed by two planar caps.

use std::f64::consts::TAU;

use partforge_kernel_math::{direction, Frame, Point2, Point3, Vec3};
use partforge_kernel_primitives::builder::EdgeUse;
use partforge_kernel_primitives::SolidBuilder;
use partforge_kernel_topo::{CurveRef, EdgeCurve, Handle, ManifoldSolidBrep, SurfaceRef, TopologyArena, VertexPoint};

use crate::{OperatorError, Profile, ProfileSegment};

const EPS: f64 = 1e-9;

/// A profile segment in `(r, z)` coordinates.
#[derive(Debug, Clone, Copy)]
struct RzSegment {
    a: Point2,
    b: Point2,
    /// Arc center and direction in the `(r, z)` plane.
    arc: Option<(Point2, bool)>,
}

impl RzSegment {
    fn on_axis(&self) -> bool {
        self.arc.is_none() && self.a.x.abs() < EPS && self.b.x.abs() < EPS
    }

    fn reversed(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            arc: self.arc.map(|(c, ccw)| (c, !ccw)),
        }
    }
}

/// Revolve `profile` by `angle` radians about the axis through
/// `axis_origin` along `axis_dir`.
///
/// The profile plane must contain the axis and the profile must stay on
/// one side of it. Rotation is counter-clockwise about `axis_dir`; an
/// angle of 2π or more gives a full solid of revolution.
pub fn revolve(
    arena: &mut TopologyArena,
    profile: &Profile,
    axis_origin: Point3,
    axis_dir: Vec3,
    angle: f64,
) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
    if !(angle.is_finite() && angle > 0.0) {
        return Err(OperatorError::InvalidParameter { name: "angle", value: angle });
    }
    profile.validate()?;
    let full = angle >= TAU - EPS;
    let axis = direction(axis_dir).into_inner();

    let normal = profile.frame.axis.into_inner();
    if normal.dot(&axis).abs() > 1e-6 || (axis_origin - profile.frame.origin).dot(&normal).abs() > 1e-6 {
        return Err(OperatorError::ProfileOffAxis);
    }
    let world = |p: Point2| profile.frame.to_world(&Point3::new(p.x, p.y, 0.0));
    // Sampled, so arcs whose ends both sit on the axis still count.
    let sampled = profile.points_2d(64)?;
    let ref_dir = sampled
        .iter()
        .map(|&p| {
            let d = world(p) - axis_origin;
            d - axis * d.dot(&axis)
        })
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))
        .filter(|v| v.norm() > EPS)
        .ok_or(OperatorError::ProfileOffAxis)?;
    let frame = Frame::new(axis_origin, axis, ref_dir);
    let to_rz = |p: Point2| {
        let l = frame.to_local(&world(p));
        Point2::new(if l.x.abs() < EPS { 0.0 } else { l.x }, l.z)
    };

    let outline: Vec<Point2> = sampled.into_iter().map(to_rz).collect();
    if outline.iter().any(|p| p.x < -1e-6) {
        return Err(OperatorError::ProfileOffAxis);
    }
    let keep_sense = normal.dot(&frame.ref_dir.cross(&axis)) > 0.0;
    let mut segments: Vec<RzSegment> = profile
        .segments
        .iter()
        .filter_map(|s| match *s {
            ProfileSegment::Line { start, end } => {
                let (a, b) = (to_rz(start), to_rz(end));
                ((b - a).norm() > EPS).then_some(RzSegment { a, b, arc: None })
            }
            ProfileSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => Some(RzSegment {
                a: to_rz(start),
                b: to_rz(end),
                arc: Some((to_rz(center), ccw == keep_sense)),
            }),
        })
        .collect();
    if signed_area(&outline) < 0.0 {
        segments.reverse();
        segments = segments.iter().map(RzSegment::reversed).collect();
    }
    if segments.is_empty() {
        return Err(OperatorError::TooFewVertices(0));
    }

    let revolver = Revolver {
        frame,
        axis,
        angle: if full { TAU } else { angle },
        full,
    };
    revolver.build(arena, &segments)
}

fn signed_area(points: &[Point2]) -> f64 {
    (0..points.len())
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % points.len()]);
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
        / 2.0
}

struct Revolver {
    /// Axis frame; angle zero lies along `ref_dir`.
    frame: Frame,
    axis: Vec3,
    angle: f64,
    full: bool,
}

impl Revolver {
    fn at(&self, rz: Point2, theta: f64) -> Point3 {
        self.frame.to_world(&Point3::new(rz.x * theta.cos(), rz.x * theta.sin(), rz.y))
    }

    fn radial(&self, theta: f64) -> Vec3 {
        self.frame.ref_dir.into_inner() * theta.cos() + self.frame.y_dir().into_inner() * theta.sin()
    }

    fn axis_frame_at(&self, z: f64) -> Frame {
        Frame::new(self.frame.origin + self.axis * z, self.axis, self.frame.ref_dir.into_inner())
    }

    /// Edge along segment `seg` in the half-plane at `theta`, from `va` to `vb`.
    fn profile_edge(
        &self,
        b: &mut SolidBuilder<'_>,
        seg: &RzSegment,
        va: Handle<VertexPoint>,
        vb: Handle<VertexPoint>,
        theta: f64,
    ) -> Result<EdgeUse, OperatorError> {
        let Some((center, ccw)) = seg.arc else {
            return Ok(b.line_edge(va, vb)?);
        };
        let c = self.at(center, theta);
        let plane_normal = self.radial(theta).cross(&self.axis);
        let circle_axis = if ccw { plane_normal } else { -plane_normal };
        let start = self.at(seg.a, theta);
        let circle_frame = Frame::new(c, circle_axis, start - c);
        let circle = b.arena().create_circle(&circle_frame, (start - c).norm());
        Ok((b.arena().create_edge(va, vb, CurveRef::Circle(circle), true), true))
    }

    fn surface(&self, b: &mut SolidBuilder<'_>, seg: &RzSegment) -> (SurfaceRef, bool) {
        let (dr, dz) = (seg.b.x - seg.a.x, seg.b.y - seg.a.y);
        let arena = b.arena();
        match seg.arc {
            Some((center, ccw)) => {
                let frame = self.axis_frame_at(center.y);
                let radius = (seg.a - center).norm();
                if center.x.abs() < EPS {
                    (SurfaceRef::Sphere(arena.create_spherical_surface(&frame, radius)), ccw)
                } else {
                    (
                        SurfaceRef::Torus(arena.create_toroidal_surface(&frame, center.x, radius)),
                        ccw,
                    )
                }
            }
            None if dz.abs() < EPS => {
                let frame = Frame::new(
                    self.frame.origin + self.axis * seg.a.y,
                    self.axis * -dr.signum(),
                    self.frame.ref_dir.into_inner(),
                );
                (SurfaceRef::Plane(arena.create_plane(&frame)), true)
            }
            None if dr.abs() < EPS => (
                SurfaceRef::Cylinder(arena.create_cylindrical_surface(&self.frame, seg.a.x)),
                dz > 0.0,
            ),
            None => {
                let frame = self.axis_frame_at(seg.a.y);
                let semi_angle = (dr / dz).atan();
                (
                    SurfaceRef::Cone(arena.create_conical_surface(&frame, seg.a.x, semi_angle)),
                    dz > 0.0,
                )
            }
        }
    }

    fn build(&self, arena: &mut TopologyArena, segments: &[RzSegment]) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
        let n = segments.len();
        let mut b = SolidBuilder::new(arena);

        // Vertex k starts segment k. Off-axis vertices get a circular edge
        // swept from angle zero to the end angle.
        let mut v0 = Vec::with_capacity(n);
        let mut v1 = Vec::with_capacity(n);
        let mut sweeps: Vec<Option<Handle<EdgeCurve>>> = Vec::with_capacity(n);
        for seg in segments {
            let p = seg.a;
            let start = b.arena().create_vertex(self.at(p, 0.0));
            let on_axis = p.x.abs() < EPS;
            let end = if self.full || on_axis {
                start
            } else {
                b.arena().create_vertex(self.at(p, self.angle))
            };
            let sweep = if on_axis {
                None
            } else {
                let circle = b.arena().create_circle(&self.axis_frame_at(p.y), p.x);
                Some(b.arena().create_edge(start, end, CurveRef::Circle(circle), true))
            };
            v0.push(start);
            v1.push(end);
            sweeps.push(sweep);
        }

        let mut cap0 = Vec::with_capacity(n);
        let mut cap1 = Vec::with_capacity(n);
        for (k, seg) in segments.iter().enumerate() {
            let j = (k + 1) % n;
            let (sa, sb) = (sweeps[k], sweeps[j]);

            if self.full {
                if seg.on_axis() {
                    continue;
                }
                if sa.is_none() && sb.is_none() {
                    // Meridian from pole to pole: a closed sphere.
                    let (surface, same_sense) = self.surface(&mut b, seg);
                    b.face(Vec::new(), surface, same_sense);
                    continue;
                }
                let (surface, same_sense) = self.surface(&mut b, seg);
                if matches!(surface, SurfaceRef::Plane(_)) {
                    let mut loops: Vec<(f64, Vec<EdgeUse>)> = Vec::with_capacity(2);
                    if let Some(e) = sa {
                        loops.push((seg.a.x, vec![(e, true)]));
                    }
                    if let Some(e) = sb {
                        loops.push((seg.b.x, vec![(e, false)]));
                    }
                    loops.sort_by(|x, y| y.0.total_cmp(&x.0));
                    b.face(loops.into_iter().map(|(_, l)| l).collect(), surface, same_sense);
                    continue;
                }
                let seam = self.profile_edge(&mut b, seg, v0[k], v0[j], 0.0)?;
                let mut ring = Vec::with_capacity(4);
                ring.extend(sa.map(|e| (e, true)));
                ring.push(seam);
                ring.extend(sb.map(|e| (e, false)));
                ring.push((seam.0, !seam.1));
                b.face(vec![ring], surface, same_sense);
            } else {
                let s0 = self.profile_edge(&mut b, seg, v0[k], v0[j], 0.0)?;
                let s1 = self.profile_edge(&mut b, seg, v1[k], v1[j], self.angle)?;
                cap0.push(s0);
                cap1.push((s1.0, !s1.1));
                if seg.on_axis() {
                    continue;
                }
                let (surface, same_sense) = self.surface(&mut b, seg);
                let mut ring = Vec::with_capacity(4);
                ring.extend(sa.map(|e| (e, true)));
                ring.push(s1);
                ring.extend(sb.map(|e| (e, false)));
                ring.push((s0.0, !s0.1));
                b.face(vec![ring], surface, same_sense);
            }
        }

        if !self.full {
            let y = self.frame.y_dir().into_inner();
            let start_plane = b.arena().create_plane(&Frame::new(self.frame.origin, -y, self.radial(0.0)));
            b.face(vec![cap0], SurfaceRef::Plane(start_plane), true);

            cap1.reverse();
            let end_normal = self.axis.cross(&self.radial(self.angle));
            let end_plane = b
                .arena()
                .create_plane(&Frame::new(self.frame.origin, end_normal, self.radial(self.angle)));
            b.face(vec![cap1], SurfaceRef::Plane(end_plane), true);
        }

        Ok(b.finish("Revolve"))
    }
}
