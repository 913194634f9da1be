//! Skin a solid through a sequence of profiles.

use partforge_kernel_math::Point3;
use partforge_kernel_nurbs::BSplineCurve;
use partforge_kernel_primitives::{builder::newell_normal, ruled_solid};
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::{OperatorError, Profile};

/// Blending between profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoftMode {
    /// Straight rulings between consecutive profiles.
    #[default]
    Ruled,
    /// A clamped B-spline through corresponding profile points.
    /// Interior profiles act as control sections, so the skin passes
    /// through the first and last profiles and near the others.
    Smooth,
}

/// Options for [`loft`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoftOptions {
    /// Blending mode.
    pub mode: LoftMode,
    /// Close the first and last profiles with planar caps.
    pub caps: bool,
    /// Cross-sections per profile span in smooth mode.
    pub samples_per_span: usize,
    /// Chords per full turn when discretizing profile arcs.
    pub arc_segments: usize,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            mode: LoftMode::Ruled,
            caps: true,
            samples_per_span: 8,
            arc_segments: 32,
        }
    }
}

/// Loft through `profiles`, which must discretize to equal point counts.
pub fn loft(
    arena: &mut TopologyArena,
    profiles: &[Profile],
    options: &LoftOptions,
) -> Result<Handle<ManifoldSolidBrep>, OperatorError> {
    if profiles.len() < 2 {
        return Err(OperatorError::TooFewProfiles(profiles.len()));
    }
    let mut rings = profiles
        .iter()
        .map(|p| p.to_points(options.arc_segments))
        .collect::<Result<Vec<_>, _>>()?;
    let n = rings[0].len();
    if let Some(ring) = rings.iter().find(|r| r.len() != n) {
        return Err(OperatorError::MismatchedProfiles(n, ring.len()));
    }

    // Match every ring's winding to the first, keeping point 0 in place.
    let reference = newell_normal(&rings[0]);
    for ring in rings.iter_mut().skip(1) {
        if newell_normal(ring).dot(&reference) < 0.0 {
            ring[1..].reverse();
        }
    }

    let sections = match options.mode {
        LoftMode::Ruled => rings,
        LoftMode::Smooth => smooth_sections(&rings, options.samples_per_span.max(1))?,
    };
    Ok(ruled_solid(arena, "Loft", &sections, options.caps)?)
}

fn smooth_sections(rings: &[Vec<Point3>], samples_per_span: usize) -> Result<Vec<Vec<Point3>>, OperatorError> {
    let count = (rings.len() - 1) * samples_per_span + 1;
    let degree = 3.min(rings.len() - 1);
    let mut columns = Vec::with_capacity(rings[0].len());
    for j in 0..rings[0].len() {
        let controls = rings.iter().map(|r| r[j]).collect();
        columns.push(BSplineCurve::clamped(controls, degree)?.sample(count));
    }
    Ok((0..count)
        .map(|i| columns.iter().map(|c| c[i]).collect())
        .collect())
}
