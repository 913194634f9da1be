#![warn(missing_docs)]

//! STEP-like text export for the partforge kernel.
//!
//! Two subsets of ISO 10303-21 are written:
//!
//! - a point cloud of a triangle soup, one `CARTESIAN_POINT` and one
//!   `VERTEX_POINT` per distinct vertex
//! - a coarse B-rep of one solid, every entity reachable from the solid
//!   written once in arena order
//!
//! Neither is a conformant AP214 file: there is no product structure,
//! units context or representation item wrapping.

mod error;
mod writer;

pub use error::StepError;
pub use writer::{write_brep_to_string, write_mesh_to_string, write_step, StepOptions};
