#![warn(missing_docs)]

//! Topology arena for the partforge kernel.
//!
//! Every B-rep entity (points, directions, curves, surfaces, vertices,
//! edges, loops, faces, shells, solids) lives in a [`TopologyArena`] and
//! is referenced elsewhere by a typed [`Handle`]. The arena is created per
//! part build and passed explicitly to every generator; there is no
//! global store.

mod arena;
pub mod entity;
mod error;
mod handle;
pub mod validate;

pub use arena::TopologyArena;
pub use entity::{
    AdvancedFace, Axis2Placement3d, BSplineCurveWithKnots, BSplineSurfaceWithKnots, CartesianPoint,
    Circle, ClosedShell, ConicalSurface, CurveRef, CylindricalSurface, Direction, EdgeCurve, EdgeLoop,
    Ellipse, Entity, EntityData, EntityKind, EntityType, FaceBound, Line, ManifoldSolidBrep,
    OrientedEdge, Plane, SphericalSurface, SurfaceRef, ToroidalSurface, VertexPoint,
};
pub use error::TopologyError;
pub use handle::Handle;
pub use validate::{check_closure, ClosureReport};
