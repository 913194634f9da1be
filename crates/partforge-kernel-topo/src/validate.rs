//! Watertightness checks on solids.

use std::collections::BTreeMap;

use crate::{Handle, ManifoldSolidBrep, TopologyArena, TopologyError};

/// Result of [`check_closure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureReport {
    /// Faces in the outer shell.
    pub faces: usize,
    /// Distinct edges referenced by the faces.
    pub edges: usize,
    /// Edges not used exactly once in each direction.
    pub unpaired_edges: Vec<u32>,
    /// Loops whose consecutive edges do not meet head to tail.
    pub open_loops: Vec<u32>,
}

impl ClosureReport {
    /// True when every edge is traversed exactly twice with opposite
    /// orientation and every loop closes.
    pub fn is_closed(&self) -> bool {
        self.unpaired_edges.is_empty() && self.open_loops.is_empty()
    }
}

/// Count oriented-edge uses per edge over a solid's outer shell.
///
/// Faces with no bounds (closed analytic surfaces) contribute no edges.
pub fn check_closure(
    arena: &TopologyArena,
    solid: Handle<ManifoldSolidBrep>,
) -> Result<ClosureReport, TopologyError> {
    let faces = arena.solid_faces(solid)?;
    let mut uses: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    let mut open_loops = Vec::new();

    for face in &faces {
        for bound in &arena.get(*face)?.bounds {
            let edges = arena.bound_edges(*bound)?;
            for oe in &edges {
                let entry = uses.entry(oe.edge.id()).or_default();
                if oe.orientation {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
            for (i, oe) in edges.iter().enumerate() {
                let next = &edges[(i + 1) % edges.len()];
                let (_, end) = arena.traversal_vertices(oe)?;
                let (start, _) = arena.traversal_vertices(next)?;
                if end != start {
                    open_loops.push(arena.get(*bound)?.bound.id());
                    break;
                }
            }
        }
    }

    let unpaired_edges = uses
        .iter()
        .filter(|(_, (fwd, rev))| !(*fwd == 1 && *rev == 1))
        .map(|(id, _)| *id)
        .collect();

    Ok(ClosureReport {
        faces: faces.len(),
        edges: uses.len(),
        unpaired_edges,
        open_loops,
    })
}
