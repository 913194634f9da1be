//! STEP text generation.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use partforge_kernel_math::Point3;
use partforge_kernel_tessellate::Triangle;
use partforge_kernel_topo::{EntityData, Handle, ManifoldSolidBrep, TopologyArena};

use crate::StepError;

/// Header metadata for exported files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOptions {
    /// Model name, also used for the `FILE_NAME` entry.
    pub name: String,
    /// Author for file metadata.
    pub author: String,
    /// Organization for file metadata.
    pub organization: String,
    /// Fixed `FILE_NAME` timestamp; the current UTC time when `None`.
    pub timestamp: Option<String>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            name: "part".to_string(),
            author: "partforge".to_string(),
            organization: String::new(),
            timestamp: None,
        }
    }
}

impl StepOptions {
    fn timestamp(&self) -> String {
        self.timestamp.clone().unwrap_or_else(utc_now)
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS`.
fn utc_now() -> String {
    format_utc(Utc::now())
}

fn format_utc(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// A real with six decimals; negative zero prints as zero.
fn real(v: f64) -> String {
    let s = format!("{v:.6}");
    if s.trim_start_matches('-').bytes().all(|b| b == b'0' || b == b'.') {
        "0.000000".to_string()
    } else {
        s
    }
}

fn point(p: &Point3) -> String {
    format!("({},{},{})", real(p.x), real(p.y), real(p.z))
}

fn string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn flag(b: bool) -> &'static str {
    if b {
        ".T."
    } else {
        ".F."
    }
}

fn list<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
    let inner: Vec<String> = items.iter().map(f).collect();
    format!("({})", inner.join(","))
}

/// Accumulates numbered `DATA` lines.
struct StepBuilder<'a> {
    options: &'a StepOptions,
    entities: Vec<String>,
}

impl<'a> StepBuilder<'a> {
    fn new(options: &'a StepOptions) -> Self {
        Self {
            options,
            entities: Vec::new(),
        }
    }

    fn add_entity(&mut self, entity: String) -> usize {
        let id = self.entities.len() + 1;
        self.entities.push(format!("#{id}={entity};"));
        id
    }

    fn finish(self) -> String {
        let o = self.options;
        let mut lines = vec![
            "ISO-10303-21;".to_string(),
            "HEADER;".to_string(),
            "FILE_DESCRIPTION(('partforge model'),'2;1');".to_string(),
            format!(
                "FILE_NAME({},{},({}),({}),'partforge','partforge','');",
                string(&format!("{}.step", o.name)),
                string(&o.timestamp()),
                string(&o.author),
                string(&o.organization),
            ),
            "FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));".to_string(),
            "ENDSEC;".to_string(),
            "DATA;".to_string(),
        ];
        lines.extend(self.entities);
        lines.push("ENDSEC;".to_string());
        lines.push("END-ISO-10303-21;".to_string());
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Point-cloud export of a soup: one `CARTESIAN_POINT` and one
/// `VERTEX_POINT` per distinct vertex, keyed on six-decimal coordinates,
/// in first-seen order.
pub fn write_mesh_to_string(triangles: &[Triangle], options: &StepOptions) -> String {
    let mut builder = StepBuilder::new(options);
    let mut seen = HashSet::new();
    for p in triangles.iter().flat_map(|t| [t.v0, t.v1, t.v2]) {
        let key = point(&p);
        if !seen.insert(key.clone()) {
            continue;
        }
        let cp = builder.add_entity(format!("CARTESIAN_POINT('',{key})"));
        builder.add_entity(format!("VERTEX_POINT('',#{cp})"));
    }
    tracing::debug!(points = seen.len(), "exported point cloud");
    builder.finish()
}

/// Coarse B-rep export of one solid.
///
/// Every entity reachable from `solid` is written once, in arena order,
/// so references always point backwards. Angles are written in radians.
/// Dangling references are written as `$`.
pub fn write_brep_to_string(
    arena: &TopologyArena,
    solid: Handle<ManifoldSolidBrep>,
    options: &StepOptions,
) -> Result<String, StepError> {
    arena.get(solid)?;

    let mut reachable = BTreeSet::new();
    let mut stack = vec![solid.id()];
    while let Some(id) = stack.pop() {
        if reachable.contains(&id) {
            continue;
        }
        match arena.get_entity(id) {
            Some(entity) => {
                reachable.insert(id);
                stack.extend(entity.data.references());
            }
            None => tracing::warn!(id, "dangling reference, written as null"),
        }
    }

    let mut builder = StepBuilder::new(options);
    let mut numbers: HashMap<u32, usize> = HashMap::with_capacity(reachable.len());
    for id in reachable {
        let Some(entity) = arena.get_entity(id) else {
            continue;
        };
        let line = entity_line(&entity.data, &|r: u32| match numbers.get(&r) {
            Some(n) => format!("#{n}"),
            None => "$".to_string(),
        });
        let n = builder.add_entity(line);
        numbers.insert(id, n);
    }
    tracing::debug!(entities = numbers.len(), solid = solid.id(), "exported b-rep");
    Ok(builder.finish())
}

fn entity_line(data: &EntityData, r: &dyn Fn(u32) -> String) -> String {
    let keyword = data.kind().step_keyword();
    match data {
        EntityData::CartesianPoint(p) => format!("{keyword}('',{})", point(&p.coords)),
        EntityData::Direction(d) => format!("{keyword}('',{})", point(&Point3::from(d.dir.into_inner()))),
        EntityData::Axis2Placement3d(a) => format!(
            "{keyword}('',{},{},{})",
            r(a.location.id()),
            r(a.axis.id()),
            r(a.ref_direction.id())
        ),
        EntityData::Line(l) => format!("{keyword}('',{},{})", r(l.origin.id()), r(l.direction.id())),
        EntityData::Circle(c) => format!("{keyword}('',{},{})", r(c.position.id()), real(c.radius)),
        EntityData::Ellipse(e) => format!(
            "{keyword}('',{},{},{})",
            r(e.position.id()),
            real(e.semi_axis_1),
            real(e.semi_axis_2)
        ),
        EntityData::BSplineCurve(c) => format!(
            "{keyword}('',{},{},.UNSPECIFIED.,.F.,.F.,{},{},.UNSPECIFIED.)",
            c.degree,
            list(&c.control_points, |h| r(h.id())),
            list(&c.multiplicities, |m| m.to_string()),
            list(&c.knots, |k| real(*k)),
        ),
        EntityData::Plane(s) => format!("{keyword}('',{})", r(s.position.id())),
        EntityData::CylindricalSurface(s) => format!("{keyword}('',{},{})", r(s.position.id()), real(s.radius)),
        EntityData::ConicalSurface(s) => format!(
            "{keyword}('',{},{},{})",
            r(s.position.id()),
            real(s.radius),
            real(s.semi_angle)
        ),
        EntityData::SphericalSurface(s) => format!("{keyword}('',{},{})", r(s.position.id()), real(s.radius)),
        EntityData::ToroidalSurface(s) => format!(
            "{keyword}('',{},{},{})",
            r(s.position.id()),
            real(s.major_radius),
            real(s.minor_radius)
        ),
        EntityData::BSplineSurface(s) => format!(
            "{keyword}('',{},{},{},.UNSPECIFIED.,.F.,.F.,.F.,{},{},{},{},.UNSPECIFIED.)",
            s.u_degree,
            s.v_degree,
            list(&s.control_points, |row| list(row, |h| r(h.id()))),
            list(&s.u_multiplicities, |m| m.to_string()),
            list(&s.v_multiplicities, |m| m.to_string()),
            list(&s.u_knots, |k| real(*k)),
            list(&s.v_knots, |k| real(*k)),
        ),
        EntityData::VertexPoint(v) => format!("{keyword}('',{})", r(v.point.id())),
        EntityData::EdgeCurve(e) => format!(
            "{keyword}('',{},{},{},{})",
            r(e.start.id()),
            r(e.end.id()),
            r(e.curve.id()),
            flag(e.same_sense)
        ),
        EntityData::OrientedEdge(o) => format!("{keyword}('',*,*,{},{})", r(o.edge.id()), flag(o.orientation)),
        EntityData::EdgeLoop(l) => format!("{keyword}('',{})", list(&l.edges, |h| r(h.id()))),
        EntityData::FaceBound(b) => {
            let keyword = if b.outer { "FACE_OUTER_BOUND" } else { keyword };
            format!("{keyword}('',{},{})", r(b.bound.id()), flag(b.orientation))
        }
        EntityData::AdvancedFace(f) => format!(
            "{keyword}('',{},{},{})",
            list(&f.bounds, |h| r(h.id())),
            r(f.surface.id()),
            flag(f.same_sense)
        ),
        EntityData::ClosedShell(s) => format!("{keyword}('',{})", list(&s.faces, |h| r(h.id()))),
        EntityData::ManifoldSolid(s) => format!("{keyword}({},{})", string(&s.name), r(s.outer.id())),
    }
}

/// Write STEP text to `path`.
pub fn write_step(path: impl AsRef<Path>, step: &str) -> Result<(), StepError> {
    let path = path.as_ref();
    std::fs::write(path, step)?;
    tracing::debug!(path = %path.display(), bytes = step.len(), "wrote step file");
    Ok(())
}
