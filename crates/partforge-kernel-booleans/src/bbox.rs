//! Bounding-box shortcut for operands that cannot interact.

use partforge_kernel_tessellate::{soup_bounds, Triangle};

use crate::split::EPSILON;
use crate::BooleanOp;

/// The result of `op` when the operands' bounds do not overlap (an empty
/// operand never overlaps anything), or `None` when the full clip is
/// needed. Touching bounds count as overlapping.
pub(crate) fn disjoint_result(a: &[Triangle], b: &[Triangle], op: BooleanOp) -> Option<Vec<Triangle>> {
    let disjoint = match (soup_bounds(a), soup_bounds(b)) {
        (Some(ba), Some(bb)) => !ba.overlaps(&bb, EPSILON),
        _ => true,
    };
    if !disjoint {
        return None;
    }
    Some(match op {
        BooleanOp::Union => a.iter().chain(b).copied().collect(),
        BooleanOp::Subtract => a.to_vec(),
        BooleanOp::Intersect => Vec::new(),
    })
}
