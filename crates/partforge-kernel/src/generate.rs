//! Feature record to generator dispatch.

use std::f64::consts::TAU;

use partforge_ir::{FeatureKind, FeatureSpec};
use partforge_kernel_math::{direction, perpendicular, Aabb3, Frame, Point3, Vec3};
use partforge_kernel_ops::{revolve, Profile};
use partforge_kernel_primitives::{
    boss, chamfer, counterbore, countersink, fillet, hole, make_box, pocket, slot, thread, ChamferRecord,
    FilletRecord, PrimitiveError,
};
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};

use crate::{FeatureError, KernelConfig};

/// Overshoot of the face-milling cutter past the model's sides and top.
const FACE_MARGIN: f64 = 1.0;

const DEFAULT_COUNTERSINK_ANGLE_DEG: f64 = 90.0;

/// Pocket corner radius as a fraction of the smaller side.
const DEFAULT_CORNER_RADIUS_FRACTION: f64 = 0.1;

/// A deferred edge treatment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EdgeTreatment {
    Fillet(FilletRecord),
    Chamfer(ChamferRecord),
}

pub(crate) fn to_point(v: partforge_ir::Vec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64, FeatureError> {
    value.ok_or(FeatureError::MissingDimension(name))
}

fn positive(name: &'static str, value: f64) -> Result<f64, FeatureError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PrimitiveError::InvalidParameter { name, value }.into())
    }
}

fn axis_or(feature: &FeatureSpec, default: Vec3) -> Vec3 {
    feature
        .direction
        .map(|d| Vec3::new(d.x, d.y, d.z))
        .filter(|v| v.norm() > 1e-12)
        .unwrap_or(default)
}

fn diameter(feature: &FeatureSpec) -> Result<f64, FeatureError> {
    let dims = &feature.dimensions;
    required(dims.diameter.or(dims.radius.map(|r| 2.0 * r)), "diameter")
}

/// Build the solids a material feature contributes, in the order they
/// are combined. Edge treatments contribute none.
pub(crate) fn feature_solids(
    arena: &mut TopologyArena,
    feature: &FeatureSpec,
    kind: FeatureKind,
    config: &KernelConfig,
    bounds: Option<&Aabb3>,
) -> Result<Vec<Handle<ManifoldSolidBrep>>, FeatureError> {
    let dims = &feature.dimensions;
    let at = to_point(feature.position());
    let arc_segments = config.segments.arc_segments;

    let solids = match kind {
        FeatureKind::Face => vec![face_cutter(arena, required(dims.depth, "depth")?, bounds)?],
        FeatureKind::Pocket => {
            let (length, width) = (required(dims.length, "length")?, required(dims.width, "width")?);
            let corner_radius = dims
                .corner_radius
                .unwrap_or(DEFAULT_CORNER_RADIUS_FRACTION * length.min(width));
            vec![pocket(
                arena,
                at,
                length,
                width,
                required(dims.depth, "depth")?,
                corner_radius,
                arc_segments,
            )?]
        }
        FeatureKind::Slot => vec![slot(
            arena,
            at,
            required(dims.length, "length")?,
            required(dims.width, "width")?,
            required(dims.depth, "depth")?,
            arc_segments,
        )?],
        FeatureKind::Hole => vec![hole(
            arena,
            at,
            diameter(feature)?,
            required(dims.depth, "depth")?,
            axis_or(feature, -Vec3::z()),
        )?],
        FeatureKind::Counterbore => {
            let cb = counterbore(
                arena,
                at,
                diameter(feature)?,
                required(dims.depth, "depth")?,
                required(dims.counterbore_diameter, "counterboreDiameter")?,
                required(dims.counterbore_depth, "counterboreDepth")?,
                axis_or(feature, -Vec3::z()),
            )?;
            vec![cb.primary, cb.secondary]
        }
        FeatureKind::Countersink => {
            let cs = countersink(
                arena,
                at,
                diameter(feature)?,
                required(dims.depth, "depth")?,
                required(dims.countersink_diameter, "countersinkDiameter")?,
                dims.countersink_angle
                    .unwrap_or(DEFAULT_COUNTERSINK_ANGLE_DEG)
                    .to_radians(),
                axis_or(feature, -Vec3::z()),
            )?;
            vec![cs.primary, cs.secondary]
        }
        FeatureKind::Boss => vec![boss(
            arena,
            at,
            diameter(feature)?,
            required(dims.height.or(dims.depth), "height")?,
            axis_or(feature, Vec3::z()),
        )?],
        FeatureKind::Thread => {
            let frame = Frame::from_axis(at, axis_or(feature, -Vec3::z()));
            let feature = thread(
                arena,
                &frame,
                diameter(feature)?,
                required(dims.pitch, "pitch")?,
                required(dims.length.or(dims.depth), "length")?,
                dims.minor_diameter,
                config.segments.thread_segments_per_turn,
            )?;
            vec![feature.solid]
        }
        FeatureKind::Groove => vec![groove(
            arena,
            at,
            axis_or(feature, Vec3::z()),
            diameter(feature)?,
            required(dims.depth, "depth")?,
            required(dims.width, "width")?,
        )?],
        FeatureKind::Fillet | FeatureKind::Chamfer => Vec::new(),
    };
    Ok(solids)
}

/// The deferred record for an edge treatment, `None` for material features.
pub(crate) fn edge_treatment(
    feature: &FeatureSpec,
    kind: FeatureKind,
    config: &KernelConfig,
) -> Result<Option<EdgeTreatment>, FeatureError> {
    let dims = &feature.dimensions;
    let edge = feature.edge.clone().unwrap_or_else(|| feature.label().to_string());
    let treatment = match kind {
        FeatureKind::Fillet => EdgeTreatment::Fillet(fillet(
            edge,
            required(dims.radius, "radius")?,
            config.segments.fillet_segments,
        )?),
        FeatureKind::Chamfer => EdgeTreatment::Chamfer(chamfer(
            edge,
            required(dims.distance.or(dims.length), "distance")?,
        )?),
        _ => return Ok(None),
    };
    Ok(Some(treatment))
}

/// Box covering the model footprint from the top surface down by `depth`.
fn face_cutter(
    arena: &mut TopologyArena,
    depth: f64,
    bounds: Option<&Aabb3>,
) -> Result<Handle<ManifoldSolidBrep>, FeatureError> {
    let bounds = bounds.ok_or(FeatureError::NoModel)?;
    let depth = positive("depth", depth)?;
    let size = bounds.size();
    let origin = Point3::new(
        bounds.min.x - FACE_MARGIN,
        bounds.min.y - FACE_MARGIN,
        bounds.max.z - depth,
    );
    Ok(make_box(
        arena,
        origin,
        size.x + 2.0 * FACE_MARGIN,
        size.y + 2.0 * FACE_MARGIN,
        depth + FACE_MARGIN,
    )?)
}

/// Ring cutter: a rectangle `depth` deep into a cylinder of `diameter`
/// and `width` wide along the axis, revolved a full turn about `axis`
/// through `center`.
fn groove(
    arena: &mut TopologyArena,
    center: Point3,
    axis: Vec3,
    diameter: f64,
    depth: f64,
    width: f64,
) -> Result<Handle<ManifoldSolidBrep>, FeatureError> {
    let radius = positive("diameter", diameter)? / 2.0;
    let depth = positive("depth", depth)?;
    let width = positive("width", width)?;
    if depth >= radius {
        return Err(PrimitiveError::Degenerate(format!(
            "groove depth {depth} reaches the axis of a {diameter} diameter"
        ))
        .into());
    }

    let axis = direction(axis);
    let radial = perpendicular(&axis);
    // Profile x runs outward, profile y runs along the axis.
    let normal = radial.cross(axis.as_ref());
    let frame = Frame::new(center + radial.into_inner() * radius, normal, radial.into_inner());
    let profile = Profile::rectangle(frame, 2.0 * depth, width);
    Ok(revolve(arena, &profile, center, axis.into_inner(), TAU)?)
}
