//! Boolean entry points.

use partforge_kernel_tessellate::{tessellate_solid, TessellationParams, Triangle};
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::bbox;
use crate::bsp::BspTree;

/// CSG boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Material of either operand.
    Union,
    /// Material of the first operand not in the second.
    Subtract,
    /// Material common to both.
    Intersect,
}

/// Combine two closed, outward-wound soups.
///
/// Union keeps A outside B and B outside A. Subtract keeps A outside B
/// plus the inverted part of B inside A. Intersect keeps A inside B and
/// B inside A.
pub fn boolean_op(a: &[Triangle], b: &[Triangle], op: BooleanOp) -> Vec<Triangle> {
    if let Some(result) = bbox::disjoint_result(a, b, op) {
        tracing::debug!(?op, triangles = result.len(), "operands disjoint");
        return result;
    }

    let (mut ta, mut tb) = rayon::join(|| BspTree::new(a), || BspTree::new(b));
    match op {
        BooleanOp::Union => {
            ta.clip_to(&tb);
            tb.clip_to(&ta);
            tb.invert();
            tb.clip_to(&ta);
            tb.invert();
            ta.build(tb.all_triangles());
        }
        BooleanOp::Subtract => {
            ta.invert();
            ta.clip_to(&tb);
            tb.clip_to(&ta);
            tb.invert();
            tb.clip_to(&ta);
            tb.invert();
            ta.build(tb.all_triangles());
            ta.invert();
        }
        BooleanOp::Intersect => {
            ta.invert();
            tb.clip_to(&ta);
            tb.invert();
            ta.clip_to(&tb);
            tb.clip_to(&ta);
            ta.build(tb.all_triangles());
            ta.invert();
        }
    }
    let result = ta.all_triangles();
    tracing::debug!(?op, a = a.len(), b = b.len(), triangles = result.len(), "boolean");
    result
}

/// Tessellate two solids (in parallel) and combine them.
pub fn boolean_solids(
    arena: &TopologyArena,
    a: Handle<ManifoldSolidBrep>,
    b: Handle<ManifoldSolidBrep>,
    op: BooleanOp,
    params: &TessellationParams,
) -> Vec<Triangle> {
    let (ta, tb) = rayon::join(|| tessellate_solid(arena, a, params), || tessellate_solid(arena, b, params));
    boolean_op(&ta, &tb, op)
}
