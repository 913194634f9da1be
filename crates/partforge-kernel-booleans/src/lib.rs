#![warn(missing_docs)]

//! Constructive solid geometry on triangle soups for the partforge kernel.
//!
//! Both operands are tessellated, each soup is partitioned into a BSP
//! tree, and each operand's triangles are clipped against the other's
//! tree. Operands whose bounds do not touch skip the trees entirely.

mod api;
mod bbox;
pub mod bsp;
pub mod split;

pub use api::{boolean_op, boolean_solids, BooleanOp};
pub use bsp::{BspNode, BspTree};
pub use split::{split_triangle, Plane, EPSILON};
