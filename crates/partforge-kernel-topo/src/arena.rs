use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use partforge_kernel_math::{direction, Frame, Point3, Vec3};

use crate::entity::*;
use crate::{Handle, TopologyError};

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Retired generations remembered for stale-handle diagnostics. Handles
/// from older generations are still rejected, reported as foreign.
const RETIRED_GENERATIONS: usize = 16;

fn next_generation() -> u32 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Append-only store of B-rep entities for one part build.
///
/// Ids start at 1 and increase monotonically; entities are never mutated
/// or removed. Edits are expressed by creating new entities that reference
/// existing ones. [`reset`](Self::reset) empties the arena and moves it to
/// a fresh generation so that handles issued earlier are rejected.
#[derive(Debug)]
pub struct TopologyArena {
    generation: u32,
    retired: VecDeque<u32>,
    entities: Vec<Entity>,
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyArena {
    /// Create an empty arena with a process-unique generation.
    pub fn new() -> Self {
        Self {
            generation: next_generation(),
            retired: VecDeque::with_capacity(RETIRED_GENERATIONS),
            entities: Vec::new(),
        }
    }

    /// Drop every entity and restart id allocation at 1.
    pub fn reset(&mut self) {
        if self.retired.len() == RETIRED_GENERATIONS {
            self.retired.pop_front();
        }
        self.retired.push_back(self.generation);
        self.generation = next_generation();
        self.entities.clear();
    }

    /// Current generation tag.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if no entity has been created since the last reset.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of entities of the given kind.
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    /// Append an entity and return its handle.
    pub fn insert<T: EntityType>(&mut self, value: T) -> Handle<T> {
        let id = self.entities.len() as u32 + 1;
        self.entities.push(Entity {
            id,
            data: value.wrap(),
        });
        Handle::new(id, self.generation)
    }

    /// Look up an entity by raw id. Returns `None` when absent.
    pub fn get_entity(&self, id: u32) -> Option<&Entity> {
        let index = (id as usize).checked_sub(1)?;
        self.entities.get(index)
    }

    /// Resolve a typed handle.
    pub fn get<T: EntityType>(&self, handle: Handle<T>) -> Result<&T, TopologyError> {
        if handle.generation() != self.generation {
            return Err(if self.retired.contains(&handle.generation()) {
                TopologyError::StaleHandle {
                    id: handle.id(),
                    handle_generation: handle.generation(),
                    arena_generation: self.generation,
                }
            } else {
                TopologyError::ForeignHandle {
                    id: handle.id(),
                    handle_generation: handle.generation(),
                }
            });
        }
        let entity = self
            .get_entity(handle.id())
            .ok_or(TopologyError::NotFound(handle.id()))?;
        T::from_data(&entity.data).ok_or(TopologyError::KindMismatch {
            id: handle.id(),
            expected: T::KIND,
            found: entity.kind(),
        })
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Create a `CARTESIAN_POINT`.
    pub fn create_point(&mut self, coords: Point3) -> Handle<CartesianPoint> {
        self.insert(CartesianPoint { coords })
    }

    /// Create a `DIRECTION`; zero-length input becomes +Z.
    pub fn create_direction(&mut self, v: Vec3) -> Handle<Direction> {
        self.insert(Direction { dir: direction(v) })
    }

    /// Create an `AXIS2_PLACEMENT_3D` with its point and two directions.
    pub fn create_placement(&mut self, frame: &Frame) -> Handle<Axis2Placement3d> {
        let location = self.create_point(frame.origin);
        let axis = self.create_direction(frame.axis.into_inner());
        let ref_direction = self.create_direction(frame.ref_dir.into_inner());
        self.insert(Axis2Placement3d {
            location,
            axis,
            ref_direction,
        })
    }

    /// Create a `LINE` through an existing point.
    pub fn create_line(&mut self, origin: Handle<CartesianPoint>, dir: Vec3) -> Handle<Line> {
        let direction = self.create_direction(dir);
        self.insert(Line { origin, direction })
    }

    /// Create a `CIRCLE` in the frame's xy plane.
    pub fn create_circle(&mut self, frame: &Frame, radius: f64) -> Handle<Circle> {
        let position = self.create_placement(frame);
        self.insert(Circle { position, radius })
    }

    /// Create an `ELLIPSE` in the frame's xy plane.
    pub fn create_ellipse(&mut self, frame: &Frame, semi_axis_1: f64, semi_axis_2: f64) -> Handle<Ellipse> {
        let position = self.create_placement(frame);
        self.insert(Ellipse {
            position,
            semi_axis_1,
            semi_axis_2,
        })
    }

    /// Create a `B_SPLINE_CURVE_WITH_KNOTS` from control points and a
    /// knot vector already split into distinct values and multiplicities.
    pub fn create_bspline_curve(
        &mut self,
        degree: usize,
        control_points: &[Point3],
        knots: Vec<f64>,
        multiplicities: Vec<usize>,
    ) -> Handle<BSplineCurveWithKnots> {
        let control_points = control_points.iter().map(|p| self.create_point(*p)).collect();
        self.insert(BSplineCurveWithKnots {
            degree,
            control_points,
            knots,
            multiplicities,
        })
    }

    /// Create a `PLANE` whose normal is the frame axis.
    pub fn create_plane(&mut self, frame: &Frame) -> Handle<Plane> {
        let position = self.create_placement(frame);
        self.insert(Plane { position })
    }

    /// Create a `CYLINDRICAL_SURFACE` about the frame axis.
    pub fn create_cylindrical_surface(&mut self, frame: &Frame, radius: f64) -> Handle<CylindricalSurface> {
        let position = self.create_placement(frame);
        self.insert(CylindricalSurface { position, radius })
    }

    /// Create a `CONICAL_SURFACE` about the frame axis.
    pub fn create_conical_surface(
        &mut self,
        frame: &Frame,
        radius: f64,
        semi_angle: f64,
    ) -> Handle<ConicalSurface> {
        let position = self.create_placement(frame);
        self.insert(ConicalSurface {
            position,
            radius,
            semi_angle,
        })
    }

    /// Create a `SPHERICAL_SURFACE` centered on the frame origin.
    pub fn create_spherical_surface(&mut self, frame: &Frame, radius: f64) -> Handle<SphericalSurface> {
        let position = self.create_placement(frame);
        self.insert(SphericalSurface { position, radius })
    }

    /// Create a `TOROIDAL_SURFACE` about the frame axis.
    pub fn create_toroidal_surface(
        &mut self,
        frame: &Frame,
        major_radius: f64,
        minor_radius: f64,
    ) -> Handle<ToroidalSurface> {
        let position = self.create_placement(frame);
        self.insert(ToroidalSurface {
            position,
            major_radius,
            minor_radius,
        })
    }

    /// Create a `B_SPLINE_SURFACE_WITH_KNOTS` from a control net indexed `[u][v]`.
    pub fn create_bspline_surface(
        &mut self,
        degrees: (usize, usize),
        control_net: &[Vec<Point3>],
        u_knots: (Vec<f64>, Vec<usize>),
        v_knots: (Vec<f64>, Vec<usize>),
    ) -> Handle<BSplineSurfaceWithKnots> {
        let control_points = control_net
            .iter()
            .map(|row| row.iter().map(|p| self.create_point(*p)).collect::<Vec<_>>())
            .collect();
        self.insert(BSplineSurfaceWithKnots {
            u_degree: degrees.0,
            v_degree: degrees.1,
            control_points,
            u_knots: u_knots.0,
            u_multiplicities: u_knots.1,
            v_knots: v_knots.0,
            v_multiplicities: v_knots.1,
        })
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Create a `VERTEX_POINT` with its own point.
    pub fn create_vertex(&mut self, coords: Point3) -> Handle<VertexPoint> {
        let point = self.create_point(coords);
        self.insert(VertexPoint { point })
    }

    /// Create an `EDGE_CURVE`.
    pub fn create_edge(
        &mut self,
        start: Handle<VertexPoint>,
        end: Handle<VertexPoint>,
        curve: CurveRef,
        same_sense: bool,
    ) -> Handle<EdgeCurve> {
        self.insert(EdgeCurve {
            start,
            end,
            curve,
            same_sense,
        })
    }

    /// Create an `ORIENTED_EDGE`.
    pub fn create_oriented_edge(&mut self, edge: Handle<EdgeCurve>, orientation: bool) -> Handle<OrientedEdge> {
        self.insert(OrientedEdge { edge, orientation })
    }

    /// Create an `EDGE_LOOP`.
    pub fn create_edge_loop(&mut self, edges: Vec<Handle<OrientedEdge>>) -> Handle<EdgeLoop> {
        self.insert(EdgeLoop { edges })
    }

    /// Create a `FACE_BOUND` (or outer bound).
    pub fn create_face_bound(&mut self, bound: Handle<EdgeLoop>, orientation: bool, outer: bool) -> Handle<FaceBound> {
        self.insert(FaceBound {
            bound,
            orientation,
            outer,
        })
    }

    /// Create an `ADVANCED_FACE`.
    pub fn create_face(
        &mut self,
        bounds: Vec<Handle<FaceBound>>,
        surface: SurfaceRef,
        same_sense: bool,
    ) -> Handle<AdvancedFace> {
        self.insert(AdvancedFace {
            bounds,
            surface,
            same_sense,
        })
    }

    /// Create a `CLOSED_SHELL`.
    pub fn create_shell(&mut self, faces: Vec<Handle<AdvancedFace>>) -> Handle<ClosedShell> {
        self.insert(ClosedShell { faces })
    }

    /// Create a `MANIFOLD_SOLID_BREP`.
    pub fn create_solid(&mut self, name: impl Into<String>, outer: Handle<ClosedShell>) -> Handle<ManifoldSolidBrep> {
        self.insert(ManifoldSolidBrep {
            name: name.into(),
            outer,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Coordinates of a point.
    pub fn point(&self, handle: Handle<CartesianPoint>) -> Result<Point3, TopologyError> {
        Ok(self.get(handle)?.coords)
    }

    /// Coordinates of a vertex.
    pub fn vertex_point(&self, handle: Handle<VertexPoint>) -> Result<Point3, TopologyError> {
        self.point(self.get(handle)?.point)
    }

    /// Resolve a placement into a [`Frame`].
    pub fn placement_frame(&self, handle: Handle<Axis2Placement3d>) -> Result<Frame, TopologyError> {
        let p = self.get(handle)?;
        Ok(Frame {
            origin: self.point(p.location)?,
            axis: self.get(p.axis)?.dir,
            ref_dir: self.get(p.ref_direction)?.dir,
        })
    }

    /// Faces of a solid's outer shell.
    pub fn solid_faces(&self, solid: Handle<ManifoldSolidBrep>) -> Result<Vec<Handle<AdvancedFace>>, TopologyError> {
        let shell = self.get(self.get(solid)?.outer)?;
        Ok(shell.faces.clone())
    }

    /// Oriented edges of a face bound in boundary order, with the bound's
    /// own orientation folded in.
    pub fn bound_edges(&self, bound: Handle<FaceBound>) -> Result<Vec<OrientedEdge>, TopologyError> {
        let fb = self.get(bound)?;
        let edge_loop = self.get(fb.bound)?;
        let mut edges = edge_loop
            .edges
            .iter()
            .map(|h| self.get(*h).copied())
            .collect::<Result<Vec<_>, _>>()?;
        if !fb.orientation {
            edges.reverse();
            for oe in &mut edges {
                oe.orientation = !oe.orientation;
            }
        }
        Ok(edges)
    }

    /// Start and end vertices of an oriented edge in traversal order.
    pub fn traversal_vertices(
        &self,
        oe: &OrientedEdge,
    ) -> Result<(Handle<VertexPoint>, Handle<VertexPoint>), TopologyError> {
        let edge = self.get(oe.edge)?;
        Ok(if oe.orientation {
            (edge.start, edge.end)
        } else {
            (edge.end, edge.start)
        })
    }
}
