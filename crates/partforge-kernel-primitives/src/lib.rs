#![warn(missing_docs)]

//! Primitive solids and machining features for the partforge kernel.
//!
//! Every generator writes its entities into a caller-owned
//! [`TopologyArena`](partforge_kernel_topo::TopologyArena) and returns a
//! handle to the resulting `MANIFOLD_SOLID_BREP`:
//!
//! - canonical solids: [`make_box`], [`make_cylinder`], [`make_cone`],
//!   [`make_sphere`], [`make_torus`]
//! - material-removal and additive features: [`pocket`], [`slot`], [`hole`],
//!   [`counterbore`], [`countersink`], [`boss`], [`thread`]
//! - edge treatments, kept as records: [`chamfer`], [`fillet`]

pub mod builder;
mod edge;
mod machining;
mod solids;
mod thread;

pub use builder::{ruled_solid, SolidBuilder};
pub use edge::{chamfer, fillet, ChamferRecord, FilletRecord};
pub use machining::{
    boss, counterbore, countersink, hole, pocket, rounded_rectangle, slot, CompoundFeature,
};
pub use solids::{make_box, make_cone, make_cylinder, make_sphere, make_torus};
pub use thread::{thread, ThreadFeature};

use partforge_kernel_nurbs::NurbsError;
use partforge_kernel_topo::TopologyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from primitive and feature generators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrimitiveError {
    /// A dimension was zero, negative or not finite.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Parameters are individually valid but describe no solid.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// Arena lookup failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Spline construction failed.
    #[error(transparent)]
    Nurbs(#[from] NurbsError),
}

/// Angular sampling used when generators discretize curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Segments per full circle for arcs (pocket corners use a quarter each).
    pub arc_segments: usize,
    /// Segments across a fillet cross-section.
    pub fillet_segments: usize,
    /// Helix samples per thread revolution.
    pub thread_segments_per_turn: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            arc_segments: 32,
            fillet_segments: 16,
            thread_segments_per_turn: 36,
        }
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, PrimitiveError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PrimitiveError::InvalidParameter { name, value })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, PrimitiveError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PrimitiveError::InvalidParameter { name, value })
    }
}
