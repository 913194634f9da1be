//! Feature replication. Patterns only produce transformed feature
//! records; applying them is the pipeline's job.

use partforge_ir::{FeatureSpec, PatternSpec};
use partforge_kernel_math::{direction, Point3, Transform, Vec3};

use crate::OperatorError;

fn to_math(v: partforge_ir::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_ir(v: Vec3) -> partforge_ir::Vec3 {
    partforge_ir::Vec3::new(v.x, v.y, v.z)
}

fn check_count(name: &'static str, count: usize) -> Result<usize, OperatorError> {
    if count == 0 {
        return Err(OperatorError::InvalidParameter { name, value: 0.0 });
    }
    Ok(count)
}

fn check_finite(name: &'static str, value: f64) -> Result<f64, OperatorError> {
    if !value.is_finite() {
        return Err(OperatorError::InvalidParameter { name, value });
    }
    Ok(value)
}

/// Copy of `feature` moved by `transform`, with the pattern cleared and
/// the id suffixed by the instance index (instance 0 keeps its id).
fn instance(feature: &FeatureSpec, index: usize, transform: &Transform) -> FeatureSpec {
    let position = transform.apply_point(&Point3::from(to_math(feature.position())));
    FeatureSpec {
        position: Some(to_ir(position.coords)),
        direction: feature.direction.map(|d| to_ir(transform.apply_vec(&to_math(d)))),
        id: match (&feature.id, index) {
            (Some(id), 0) => Some(id.clone()),
            (Some(id), i) => Some(format!("{id}-{i}")),
            (None, _) => None,
        },
        pattern: None,
        ..feature.clone()
    }
}

/// `count` instances, each `spacing` further along `dir`.
pub fn linear_pattern(
    feature: &FeatureSpec,
    dir: Vec3,
    count: usize,
    spacing: f64,
) -> Result<Vec<FeatureSpec>, OperatorError> {
    let count = check_count("count", count)?;
    let step = direction(dir).into_inner() * check_finite("spacing", spacing)?;
    Ok((0..count)
        .map(|i| instance(feature, i, &Transform::translation(step * i as f64)))
        .collect())
}

/// `count` instances rotated about the axis through `center`.
///
/// A full turn spreads the instances evenly without duplicating the
/// first; a partial arc puts the last instance at `total_angle`.
pub fn circular_pattern(
    feature: &FeatureSpec,
    center: Point3,
    axis: Vec3,
    count: usize,
    total_angle: f64,
) -> Result<Vec<FeatureSpec>, OperatorError> {
    let count = check_count("count", count)?;
    let total_angle = check_finite("angle", total_angle)?;
    let full = (total_angle.abs() - std::f64::consts::TAU).abs() < 1e-9;
    let step = if full || count == 1 {
        total_angle / count as f64
    } else {
        total_angle / (count - 1) as f64
    };
    let axis = direction(axis);
    Ok((0..count)
        .map(|i| {
            let rotation = Transform::rotation_about_point(&center, &axis, step * i as f64);
            instance(feature, i, &rotation)
        })
        .collect())
}

/// A `count1 × count2` grid, first direction varying fastest.
pub fn rectangular_pattern(
    feature: &FeatureSpec,
    dir1: Vec3,
    count1: usize,
    spacing1: f64,
    dir2: Vec3,
    count2: usize,
    spacing2: f64,
) -> Result<Vec<FeatureSpec>, OperatorError> {
    let count1 = check_count("count1", count1)?;
    let count2 = check_count("count2", count2)?;
    let step1 = direction(dir1).into_inner() * check_finite("spacing1", spacing1)?;
    let step2 = direction(dir2).into_inner() * check_finite("spacing2", spacing2)?;
    Ok((0..count2)
        .flat_map(|j| (0..count1).map(move |i| (i, j)))
        .enumerate()
        .map(|(k, (i, j))| {
            let offset = step1 * i as f64 + step2 * j as f64;
            instance(feature, k, &Transform::translation(offset))
        })
        .collect())
}

/// Expand `feature.pattern` into instances, or return the feature alone.
/// Circular pattern angles are in degrees.
pub fn expand_pattern(feature: &FeatureSpec) -> Result<Vec<FeatureSpec>, OperatorError> {
    match &feature.pattern {
        None => Ok(vec![feature.clone()]),
        Some(PatternSpec::Linear {
            direction,
            count,
            spacing,
        }) => linear_pattern(feature, to_math(*direction), *count, *spacing),
        Some(PatternSpec::Circular {
            center,
            axis,
            count,
            angle,
        }) => circular_pattern(
            feature,
            Point3::from(to_math(*center)),
            to_math(*axis),
            *count,
            angle.to_radians(),
        ),
        Some(PatternSpec::Rectangular {
            direction1,
            count1,
            spacing1,
            direction2,
            count2,
            spacing2,
        }) => rectangular_pattern(
            feature,
            to_math(*direction1),
            *count1,
            *spacing1,
            to_math(*direction2),
            *count2,
            *spacing2,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn hole_at(x: f64, y: f64) -> FeatureSpec {
        FeatureSpec {
            kind: "hole".into(),
            id: Some("h".into()),
            position: Some(partforge_ir::Vec3::new(x, y, 20.0)),
            ..FeatureSpec::default()
        }
    }

    fn xy(f: &FeatureSpec) -> (f64, f64) {
        let p = f.position();
        (p.x, p.y)
    }

    #[test]
    fn test_linear_pattern() {
        let out = linear_pattern(&hole_at(10.0, 10.0), Vec3::x() * 3.0, 3, 15.0).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(xy(&out[2]), (40.0, 10.0));
        assert_eq!(out[0].id.as_deref(), Some("h"));
        assert_eq!(out[2].id.as_deref(), Some("h-2"));
        assert!(out.iter().all(|f| f.pattern.is_none()));
    }

    #[test]
    fn test_circular_pattern_full_turn() {
        let out = circular_pattern(&hole_at(10.0, 0.0), Point3::origin(), Vec3::z(), 4, 2.0 * PI).unwrap();
        assert_eq!(out.len(), 4);
        let (x, y) = xy(&out[1]);
        assert!(x.abs() < 1e-9 && (y - 10.0).abs() < 1e-9);
        let (x, y) = xy(&out[3]);
        assert!(x.abs() < 1e-9 && (y + 10.0).abs() < 1e-9);
        assert!(out.iter().all(|f| (f.position().z - 20.0).abs() < 1e-9));
    }

    #[test]
    fn test_circular_pattern_partial_arc_ends_at_angle() {
        let out = circular_pattern(&hole_at(10.0, 0.0), Point3::origin(), Vec3::z(), 3, PI).unwrap();
        let (x, y) = xy(&out[2]);
        assert!((x + 10.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_circular_pattern_rotates_direction() {
        let mut f = hole_at(10.0, 0.0);
        f.direction = Some(partforge_ir::Vec3::new(1.0, 0.0, 0.0));
        let out = circular_pattern(&f, Point3::origin(), Vec3::z(), 4, 2.0 * PI).unwrap();
        let d = out[1].direction.unwrap();
        assert!(d.x.abs() < 1e-9 && (d.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangular_pattern_grid() {
        let out = rectangular_pattern(&hole_at(0.0, 0.0), Vec3::x(), 3, 10.0, Vec3::y(), 2, 5.0).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(xy(&out[4]), (10.0, 5.0));
    }

    #[test]
    fn test_expand_without_pattern() {
        let f = hole_at(1.0, 2.0);
        assert_eq!(expand_pattern(&f).unwrap(), vec![f]);
    }

    #[test]
    fn test_expand_circular_in_degrees() {
        let mut f = hole_at(5.0, 0.0);
        f.pattern = Some(PatternSpec::Circular {
            center: partforge_ir::Vec3::default(),
            axis: partforge_ir::Vec3::new(0.0, 0.0, 1.0),
            count: 6,
            angle: 360.0,
        });
        let out = expand_pattern(&f).unwrap();
        assert_eq!(out.len(), 6);
        let (x, y) = xy(&out[1]);
        assert!((x - 2.5).abs() < 1e-9 && (y - 5.0 * (PI / 3.0).sin()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            linear_pattern(&hole_at(0.0, 0.0), Vec3::x(), 0, 1.0),
            Err(OperatorError::InvalidParameter { name: "count", .. })
        ));
    }
}
