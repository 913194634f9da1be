#![warn(missing_docs)]

//! Parametric feature operators for the partforge kernel.
//!
//! - [`sweep`]: move a profile along a [`Path`] (fixed step count, optional
//!   twist and scale)
//! - [`loft`]: ruled or B-spline-blended skin through several profiles
//! - [`revolve`]: spin a profile about an axis, producing cylindrical,
//!   conical, planar and toroidal faces
//! - [`shell`]: hollow a planar-faced solid, opening selected faces
//! - [`rib`]: thin wall along a segment
//! - [`linear_pattern`], [`circular_pattern`], [`rectangular_pattern`]:
//!   replicate feature records
//!
//! All geometric operators write into a caller-owned
//! [`TopologyArena`](partforge_kernel_topo::TopologyArena).

mod frame;
mod loft;
mod path;
mod pattern;
mod profile;
mod revolve;
mod rib;
mod shell;
mod sweep;

pub use frame::{rotation_minimizing_frames, PathFrame};
pub use loft::{loft, LoftMode, LoftOptions};
pub use path::Path;
pub use pattern::{circular_pattern, expand_pattern, linear_pattern, rectangular_pattern};
pub use profile::{Profile, ProfileSegment};
pub use revolve::revolve;
pub use rib::rib;
pub use shell::shell;
pub use sweep::{sweep, SweepOptions};

use partforge_kernel_nurbs::NurbsError;
use partforge_kernel_primitives::PrimitiveError;
use partforge_kernel_topo::TopologyError;
use thiserror::Error;

/// Errors from feature operators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    /// A numeric argument is out of range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Consecutive profile segments do not meet, or the last does not
    /// return to the first.
    #[error("profile is not closed: gap of {0:.6} mm")]
    OpenProfile(f64),

    /// Profile has too few vertices to bound an area.
    #[error("profile needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Loft profiles discretize to different vertex counts.
    #[error("profiles have mismatched vertex counts: {0} vs {1}")]
    MismatchedProfiles(usize, usize),

    /// Loft needs at least two profiles.
    #[error("loft needs at least 2 profiles, got {0}")]
    TooFewProfiles(usize),

    /// Sweep path has no length.
    #[error("path has zero length")]
    ZeroLengthPath,

    /// Revolve profile is not in a half-plane bounded by the axis.
    #[error("profile must lie on one side of the revolve axis, in a plane containing it")]
    ProfileOffAxis,

    /// Shell only handles planar faces with a single boundary loop.
    #[error("face #{0} is not a single-loop planar face")]
    UnsupportedFace(u32),

    /// Generator failure.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// Arena lookup failure.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Spline construction failure.
    #[error(transparent)]
    Nurbs(#[from] NurbsError),
}
