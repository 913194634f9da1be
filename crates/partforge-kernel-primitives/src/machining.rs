use std::f64::consts::{FRAC_PI_2, PI};

use partforge_kernel_math::{sample_arc, Frame, Point3, Vec3};
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::builder::{dedup_ring, ruled_solid};
use crate::solids::solid_of_revolution;
use crate::{positive, PrimitiveError};

/// Two solids to be subtracted one after the other (counterbore,
/// countersink).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundFeature {
    /// The wide upper cut.
    pub primary: Handle<ManifoldSolidBrep>,
    /// The through hole below it.
    pub secondary: Handle<ManifoldSolidBrep>,
}

/// Counter-clockwise rounded rectangle at height `z` spanning
/// `[corner.x, corner.x + length] × [corner.y, corner.y + width]`.
///
/// Each corner is a quarter arc of `arc_segments / 4` segments joined by
/// straight runs. A radius of zero yields the plain rectangle.
pub fn rounded_rectangle(
    corner: Point3,
    length: f64,
    width: f64,
    radius: f64,
    arc_segments: usize,
    z: f64,
) -> Vec<Point3> {
    let (x0, y0) = (corner.x, corner.y);
    let (x1, y1) = (x0 + length, y0 + width);
    let r = radius.clamp(0.0, length.min(width) / 2.0);
    if r <= 1e-9 {
        return vec![
            Point3::new(x0, y0, z),
            Point3::new(x1, y0, z),
            Point3::new(x1, y1, z),
            Point3::new(x0, y1, z),
        ];
    }
    let quarter = (arc_segments / 4).max(1);
    let centers = [
        (x1 - r, y0 + r, -FRAC_PI_2),
        (x1 - r, y1 - r, 0.0),
        (x0 + r, y1 - r, FRAC_PI_2),
        (x0 + r, y0 + r, PI),
    ];
    let mut ring = Vec::with_capacity(4 * (quarter + 1));
    for (cx, cy, start) in centers {
        let frame = Frame::new(Point3::new(cx, cy, z), Vec3::z(), Vec3::x());
        ring.extend(sample_arc(&frame, r, start, FRAC_PI_2, quarter));
    }
    dedup_ring(ring)
}

/// Rounded-rectangle pocket. `corner` is the minimum (x, y) of the
/// opening and its z is the top surface; the pocket cuts down by `depth`.
///
/// Corner walls are flat facets following the sampled arc, not
/// cylindrical surfaces.
pub fn pocket(
    arena: &mut TopologyArena,
    corner: Point3,
    length: f64,
    width: f64,
    depth: f64,
    corner_radius: f64,
    arc_segments: usize,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let (l, w, d) = (
        positive("length", length)?,
        positive("width", width)?,
        positive("depth", depth)?,
    );
    let r = corner_radius.max(0.0).min(l.min(w) / 2.0 - 1e-6).max(0.0);
    let top = corner.z;
    let rings = [
        rounded_rectangle(corner, l, w, r, arc_segments, top - d),
        rounded_rectangle(corner, l, w, r, arc_segments, top),
    ];
    ruled_solid(arena, "Pocket", &rings, true)
}

/// Slot with full semicircular ends along x. `corner` and `depth` as for
/// [`pocket`].
pub fn slot(
    arena: &mut TopologyArena,
    corner: Point3,
    length: f64,
    width: f64,
    depth: f64,
    arc_segments: usize,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let (l, w, d) = (
        positive("length", length)?,
        positive("width", width)?,
        positive("depth", depth)?,
    );
    let top = corner.z;
    let r = l.min(w) / 2.0;
    let rings = [
        rounded_rectangle(corner, l, w, r, arc_segments, top - d),
        rounded_rectangle(corner, l, w, r, arc_segments, top),
    ];
    ruled_solid(arena, "Slot", &rings, true)
}

/// Drilled hole. `top_center` is the center of the opening; the hole runs
/// `depth` along `axis` (pass `-Z` to drill down).
pub fn hole(
    arena: &mut TopologyArena,
    top_center: Point3,
    diameter: f64,
    depth: f64,
    axis: Vec3,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let r = positive("diameter", diameter)? / 2.0;
    let frame = Frame::from_axis(top_center, axis);
    solid_of_revolution(arena, "Hole", &frame, r, r, positive("depth", depth)?)
}

/// Raised cylindrical boss standing on `base_center` along `axis`.
pub fn boss(
    arena: &mut TopologyArena,
    base_center: Point3,
    diameter: f64,
    height: f64,
    axis: Vec3,
) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
    let r = positive("diameter", diameter)? / 2.0;
    let frame = Frame::from_axis(base_center, axis);
    solid_of_revolution(arena, "Boss", &frame, r, r, positive("height", height)?)
}

/// Counterbored hole: a wide shallow bore over a narrower hole.
#[allow(clippy::too_many_arguments)]
pub fn counterbore(
    arena: &mut TopologyArena,
    top_center: Point3,
    hole_diameter: f64,
    hole_depth: f64,
    bore_diameter: f64,
    bore_depth: f64,
    axis: Vec3,
) -> Result<CompoundFeature, PrimitiveError> {
    positive("hole_diameter", hole_diameter)?;
    if positive("counterbore_diameter", bore_diameter)? <= hole_diameter {
        return Err(PrimitiveError::Degenerate(format!(
            "counterbore diameter {bore_diameter} must exceed hole diameter {hole_diameter}"
        )));
    }
    let frame = Frame::from_axis(top_center, axis);
    let bore_r = bore_diameter / 2.0;
    let primary = solid_of_revolution(
        arena,
        "Counterbore",
        &frame,
        bore_r,
        bore_r,
        positive("counterbore_depth", bore_depth)?,
    )?;
    let secondary = hole(arena, top_center, hole_diameter, hole_depth, axis)?;
    Ok(CompoundFeature { primary, secondary })
}

/// Countersunk hole: a cone from `sink_diameter` at the surface narrowing
/// to the hole diameter, over the hole itself. `angle` is the included
/// cone angle in radians.
///
/// The cone depth is `(sink_diameter - hole_diameter) / 2 / tan(angle / 2)`.
#[allow(clippy::too_many_arguments)]
pub fn countersink(
    arena: &mut TopologyArena,
    top_center: Point3,
    hole_diameter: f64,
    hole_depth: f64,
    sink_diameter: f64,
    angle: f64,
    axis: Vec3,
) -> Result<CompoundFeature, PrimitiveError> {
    positive("hole_diameter", hole_diameter)?;
    if positive("countersink_diameter", sink_diameter)? <= hole_diameter {
        return Err(PrimitiveError::Degenerate(format!(
            "countersink diameter {sink_diameter} must exceed hole diameter {hole_diameter}"
        )));
    }
    if positive("countersink_angle", angle)? >= PI {
        return Err(PrimitiveError::InvalidParameter {
            name: "countersink_angle",
            value: angle,
        });
    }
    let taper = (sink_diameter - hole_diameter) / 2.0 / (angle / 2.0).tan();
    let frame = Frame::from_axis(top_center, axis);
    let primary = solid_of_revolution(
        arena,
        "Countersink",
        &frame,
        sink_diameter / 2.0,
        hole_diameter / 2.0,
        taper,
    )?;
    let secondary = hole(arena, top_center, hole_diameter, hole_depth, axis)?;
    Ok(CompoundFeature { primary, secondary })
}
