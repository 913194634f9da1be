//! Entity payloads stored in the topology arena.
//!
//! Names follow the STEP AP214 entities they are exported as.

use partforge_kernel_math::{Dir3, Point3};

use crate::Handle;

/// Implemented by every entity payload so handles can be resolved to
/// their concrete type.
pub trait EntityType: Sized {
    /// The kind tag stored alongside this payload.
    const KIND: EntityKind;

    /// Wrap the payload in the arena's closed enum.
    fn wrap(self) -> EntityData;

    /// Borrow the payload if `data` holds this type.
    fn from_data(data: &EntityData) -> Option<&Self>;
}

macro_rules! entity_types {
    ($($variant:ident($ty:ident) => $keyword:literal),* $(,)?) => {
        /// Kind tag of an entity.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EntityKind {
            $(
                #[doc = concat!("`", $keyword, "`")]
                $variant,
            )*
        }

        impl EntityKind {
            /// The STEP keyword this kind is written as.
            pub fn step_keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)*
                }
            }
        }

        /// An entity payload.
        #[derive(Debug, Clone, PartialEq)]
        pub enum EntityData {
            $(
                #[doc = concat!("`", $keyword, "`")]
                $variant($ty),
            )*
        }

        impl EntityData {
            /// The kind tag of this payload.
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Self::$variant(_) => EntityKind::$variant,)*
                }
            }
        }

        $(
            impl EntityType for $ty {
                const KIND: EntityKind = EntityKind::$variant;

                fn wrap(self) -> EntityData {
                    EntityData::$variant(self)
                }

                fn from_data(data: &EntityData) -> Option<&Self> {
                    match data {
                        EntityData::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

entity_types! {
    CartesianPoint(CartesianPoint) => "CARTESIAN_POINT",
    Direction(Direction) => "DIRECTION",
    Axis2Placement3d(Axis2Placement3d) => "AXIS2_PLACEMENT_3D",
    Line(Line) => "LINE",
    Circle(Circle) => "CIRCLE",
    Ellipse(Ellipse) => "ELLIPSE",
    BSplineCurve(BSplineCurveWithKnots) => "B_SPLINE_CURVE_WITH_KNOTS",
    Plane(Plane) => "PLANE",
    CylindricalSurface(CylindricalSurface) => "CYLINDRICAL_SURFACE",
    ConicalSurface(ConicalSurface) => "CONICAL_SURFACE",
    SphericalSurface(SphericalSurface) => "SPHERICAL_SURFACE",
    ToroidalSurface(ToroidalSurface) => "TOROIDAL_SURFACE",
    BSplineSurface(BSplineSurfaceWithKnots) => "B_SPLINE_SURFACE_WITH_KNOTS",
    VertexPoint(VertexPoint) => "VERTEX_POINT",
    EdgeCurve(EdgeCurve) => "EDGE_CURVE",
    OrientedEdge(OrientedEdge) => "ORIENTED_EDGE",
    EdgeLoop(EdgeLoop) => "EDGE_LOOP",
    FaceBound(FaceBound) => "FACE_BOUND",
    AdvancedFace(AdvancedFace) => "ADVANCED_FACE",
    ClosedShell(ClosedShell) => "CLOSED_SHELL",
    ManifoldSolid(ManifoldSolidBrep) => "MANIFOLD_SOLID_BREP",
}

/// An entity as stored in the arena: an immutable id plus its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Arena id, assigned at creation, never reused within a generation.
    pub id: u32,
    /// The payload.
    pub data: EntityData,
}

impl Entity {
    /// Kind tag of the payload.
    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }
}

// =============================================================================
// Geometry leaves
// =============================================================================

/// A point in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianPoint {
    /// Coordinates in mm.
    pub coords: Point3,
}

/// A unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    /// The normalized vector.
    pub dir: Dir3,
}

/// Origin + axis + reference direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis2Placement3d {
    /// Placement origin.
    pub location: Handle<CartesianPoint>,
    /// Local z.
    pub axis: Handle<Direction>,
    /// Local x.
    pub ref_direction: Handle<Direction>,
}

// =============================================================================
// Curves
// =============================================================================

/// An infinite line through a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// A point on the line.
    pub origin: Handle<CartesianPoint>,
    /// Line direction.
    pub direction: Handle<Direction>,
}

/// A circle in the xy plane of its placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center and orientation; the circle runs counter-clockwise about the placement axis.
    pub position: Handle<Axis2Placement3d>,
    /// Radius in mm.
    pub radius: f64,
}

/// An ellipse in the xy plane of its placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Center and orientation.
    pub position: Handle<Axis2Placement3d>,
    /// Semi-axis along the placement reference direction.
    pub semi_axis_1: f64,
    /// Semi-axis along the placement y direction.
    pub semi_axis_2: f64,
}

/// A B-spline curve with its knot vector stored as unique values plus multiplicities.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCurveWithKnots {
    /// Polynomial degree.
    pub degree: usize,
    /// Control polygon.
    pub control_points: Vec<Handle<CartesianPoint>>,
    /// Distinct knot values, ascending.
    pub knots: Vec<f64>,
    /// Multiplicity of each distinct knot.
    pub multiplicities: Vec<usize>,
}

/// Reference from an edge to its underlying curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveRef {
    /// Straight edge.
    Line(Handle<Line>),
    /// Circular edge (full circle or arc).
    Circle(Handle<Circle>),
    /// Elliptical edge.
    Ellipse(Handle<Ellipse>),
    /// Free-form edge.
    BSpline(Handle<BSplineCurveWithKnots>),
}

impl CurveRef {
    /// Id of the referenced curve entity.
    pub fn id(&self) -> u32 {
        match self {
            Self::Line(h) => h.id(),
            Self::Circle(h) => h.id(),
            Self::Ellipse(h) => h.id(),
            Self::BSpline(h) => h.id(),
        }
    }
}

// =============================================================================
// Surfaces
// =============================================================================

/// A plane through the placement origin, normal along the placement axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Placement of the plane.
    pub position: Handle<Axis2Placement3d>,
}

/// A cylinder about the placement axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylindricalSurface {
    /// Placement; the axis is the cylinder axis.
    pub position: Handle<Axis2Placement3d>,
    /// Radius in mm.
    pub radius: f64,
}

/// A cone about the placement axis.
///
/// The radius at axial offset `v` is `radius + v * tan(semi_angle)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicalSurface {
    /// Placement; the axis is the cone axis.
    pub position: Handle<Axis2Placement3d>,
    /// Radius at the placement origin.
    pub radius: f64,
    /// Half-angle in radians; negative values narrow along the axis.
    pub semi_angle: f64,
}

/// A sphere centered on the placement origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalSurface {
    /// Placement; the axis runs pole to pole.
    pub position: Handle<Axis2Placement3d>,
    /// Radius in mm.
    pub radius: f64,
}

/// A torus about the placement axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToroidalSurface {
    /// Placement; the axis is the torus axis.
    pub position: Handle<Axis2Placement3d>,
    /// Distance from the axis to the tube center.
    pub major_radius: f64,
    /// Tube radius.
    pub minor_radius: f64,
}

/// A tensor-product B-spline surface.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineSurfaceWithKnots {
    /// Degree in u.
    pub u_degree: usize,
    /// Degree in v.
    pub v_degree: usize,
    /// Control net, indexed `[u][v]`.
    pub control_points: Vec<Vec<Handle<CartesianPoint>>>,
    /// Distinct u knots.
    pub u_knots: Vec<f64>,
    /// Multiplicities of `u_knots`.
    pub u_multiplicities: Vec<usize>,
    /// Distinct v knots.
    pub v_knots: Vec<f64>,
    /// Multiplicities of `v_knots`.
    pub v_multiplicities: Vec<usize>,
}

/// Reference from a face to its underlying surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceRef {
    /// Planar face.
    Plane(Handle<Plane>),
    /// Cylindrical face.
    Cylinder(Handle<CylindricalSurface>),
    /// Conical face.
    Cone(Handle<ConicalSurface>),
    /// Spherical face.
    Sphere(Handle<SphericalSurface>),
    /// Toroidal face.
    Torus(Handle<ToroidalSurface>),
    /// Free-form face.
    BSpline(Handle<BSplineSurfaceWithKnots>),
}

impl SurfaceRef {
    /// Id of the referenced surface entity.
    pub fn id(&self) -> u32 {
        match self {
            Self::Plane(h) => h.id(),
            Self::Cylinder(h) => h.id(),
            Self::Cone(h) => h.id(),
            Self::Sphere(h) => h.id(),
            Self::Torus(h) => h.id(),
            Self::BSpline(h) => h.id(),
        }
    }
}

// =============================================================================
// Topology
// =============================================================================

/// A vertex at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPoint {
    /// Vertex location.
    pub point: Handle<CartesianPoint>,
}

/// An edge bounded by two vertices on a curve.
///
/// A full circle is an edge whose `start` and `end` are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCurve {
    /// Start vertex.
    pub start: Handle<VertexPoint>,
    /// End vertex.
    pub end: Handle<VertexPoint>,
    /// Underlying curve.
    pub curve: CurveRef,
    /// Whether start→end follows the curve's parametric direction.
    pub same_sense: bool,
}

/// An edge used in a loop, with a traversal direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedEdge {
    /// The edge.
    pub edge: Handle<EdgeCurve>,
    /// `true` traverses start→end.
    pub orientation: bool,
}

/// An ordered cycle of oriented edges.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLoop {
    /// Edges in traversal order.
    pub edges: Vec<Handle<OrientedEdge>>,
}

/// A loop bounding a face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBound {
    /// The loop.
    pub bound: Handle<EdgeLoop>,
    /// `false` reverses the loop when read as a boundary.
    pub orientation: bool,
    /// Outer boundary (`FACE_OUTER_BOUND`) vs hole.
    pub outer: bool,
}

/// A bounded region of a surface.
///
/// A face with no bounds covers a complete closed surface (sphere, torus).
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedFace {
    /// Boundary loops; empty for closed surfaces.
    pub bounds: Vec<Handle<FaceBound>>,
    /// Underlying surface.
    pub surface: SurfaceRef,
    /// Whether the surface normal points out of the solid.
    pub same_sense: bool,
}

/// An unordered set of faces enclosing a volume.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedShell {
    /// Shell faces.
    pub faces: Vec<Handle<AdvancedFace>>,
}

/// A named solid with one outer shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifoldSolidBrep {
    /// Solid name, e.g. `"box"` or `"Pocket"`.
    pub name: String,
    /// Outer shell.
    pub outer: Handle<ClosedShell>,
}

impl EntityData {
    /// Ids of every entity this payload references.
    pub fn references(&self) -> Vec<u32> {
        match self {
            Self::CartesianPoint(_) | Self::Direction(_) => Vec::new(),
            Self::Axis2Placement3d(p) => {
                vec![p.location.id(), p.axis.id(), p.ref_direction.id()]
            }
            Self::Line(l) => vec![l.origin.id(), l.direction.id()],
            Self::Circle(c) => vec![c.position.id()],
            Self::Ellipse(e) => vec![e.position.id()],
            Self::BSplineCurve(c) => c.control_points.iter().map(|h| h.id()).collect(),
            Self::Plane(s) => vec![s.position.id()],
            Self::CylindricalSurface(s) => vec![s.position.id()],
            Self::ConicalSurface(s) => vec![s.position.id()],
            Self::SphericalSurface(s) => vec![s.position.id()],
            Self::ToroidalSurface(s) => vec![s.position.id()],
            Self::BSplineSurface(s) => s
                .control_points
                .iter()
                .flat_map(|row| row.iter().map(|h| h.id()))
                .collect(),
            Self::VertexPoint(v) => vec![v.point.id()],
            Self::EdgeCurve(e) => vec![e.start.id(), e.end.id(), e.curve.id()],
            Self::OrientedEdge(o) => vec![o.edge.id()],
            Self::EdgeLoop(l) => l.edges.iter().map(|h| h.id()).collect(),
            Self::FaceBound(b) => vec![b.bound.id()],
            Self::AdvancedFace(f) => {
                let mut ids: Vec<u32> = f.bounds.iter().map(|h| h.id()).collect();
                ids.push(f.surface.id());
                ids
            }
            Self::ClosedShell(s) => s.faces.iter().map(|h| h.id()).collect(),
            Self::ManifoldSolid(s) => vec![s.outer.id()],
        }
    }
}
