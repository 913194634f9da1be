use approx::assert_relative_eq;
use partforge_ir::{BoundingBox, PartDefinition, Vec3};
use partforge_kernel::{build_model, order_features, KernelConfig};
use partforge_kernel_math::Point3;
use partforge_kernel_primitives::make_box;
use partforge_kernel_step::StepOptions;
use partforge_kernel_tessellate::{soup_volume, tessellate_solid};
use partforge_kernel_topo::TopologyArena;

/// Area of the 32-gon the tessellator inscribes in a circle of radius `r`.
fn polygon_area(r: f64) -> f64 {
    0.5 * 32.0 * (std::f64::consts::TAU / 32.0).sin() * r * r
}

/// Floor area of a rounded-rectangle pocket whose four quarter arcs
/// together form one such polygon.
fn pocket_area(length: f64, width: f64, radius: f64) -> f64 {
    length * width - 4.0 * radius * radius + polygon_area(radius)
}

fn part(json: &str) -> PartDefinition {
    serde_json::from_str(json).unwrap()
}

const BLOCK: &str = r#"{ "type": "rectangular", "dimensions": { "length": 100, "width": 50, "height": 20 } }"#;

fn block_with(features: &str) -> PartDefinition {
    part(&format!(r#"{{ "stock": {BLOCK}, "features": [{features}] }}"#))
}

const HOLE_A: &str = r#"{ "type": "hole", "id": "h1", "position": { "x": 20, "y": 25, "z": 20 },
    "dimensions": { "diameter": 10, "depth": 20 } }"#;
const HOLE_B: &str = r#"{ "type": "hole", "id": "h2", "position": { "x": 80, "y": 25, "z": 20 },
    "dimensions": { "diameter": 10, "depth": 20 } }"#;
const POCKET: &str = r#"{ "type": "pocket", "id": "p1", "position": { "x": 30, "y": 15, "z": 20 },
    "dimensions": { "length": 40, "width": 20, "depth": 10 } }"#;
const BOSS: &str = r#"{ "type": "boss", "id": "b1", "position": { "x": 50, "y": 25, "z": 10 },
    "dimensions": { "diameter": 8, "height": 5 } }"#;

#[test]
fn test_end_to_end_block_with_holes_and_pocket() {
    let result = build_model(&block_with(&[HOLE_A, HOLE_B, POCKET].join(",")), &KernelConfig::default());

    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.metadata.feature_count, 3);
    assert_eq!(
        result.metadata.bounding_box,
        Some(BoundingBox {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(100.0, 50.0, 20.0),
        })
    );
    let expected = 100.0 * 50.0 * 20.0 - pocket_area(40.0, 20.0, 2.0) * 10.0 - 2.0 * polygon_area(5.0) * 20.0;
    assert_relative_eq!(result.model.volume(), expected, max_relative = 1e-6);
}

#[test]
fn test_priority_order_regardless_of_input_order() {
    let part = block_with(&[BOSS, POCKET, HOLE_A].join(","));
    let ordered = order_features(&part.features);
    let ids: Vec<_> = ordered.iter().map(|f| f.id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["p1", "h1", "b1"]);
}

#[test]
fn test_shuffled_input_gives_identical_model() {
    let config = KernelConfig::default();
    let a = build_model(&block_with(&[BOSS, POCKET, HOLE_A].join(",")), &config);
    let b = build_model(&block_with(&[HOLE_A, BOSS, POCKET].join(",")), &config);
    let c = build_model(&block_with(&[POCKET, HOLE_A, BOSS].join(",")), &config);
    assert_eq!(a.metadata.feature_count, 3);
    assert_eq!(a.model, b.model);
    assert_eq!(a.model, c.model);
}

#[test]
fn test_unknown_feature_is_skipped() {
    let config = KernelConfig::default();
    let knurl = r#"{ "type": "knurl", "id": "k1", "dimensions": { "depth": 1 } }"#;
    let with = build_model(&block_with(&[HOLE_A, knurl, POCKET].join(",")), &config);
    let without = build_model(&block_with(&[HOLE_A, POCKET].join(",")), &config);

    assert_eq!(with.model, without.model);
    assert_eq!(with.metadata.feature_count, 2);
    assert_eq!(with.warnings.len(), 1);
    assert_eq!(with.warnings[0].id.as_deref(), Some("k1"));
    assert_eq!(with.warnings[0].kind, "knurl");
    assert!(with.metadata.warnings[0].contains("unknown feature type"));
}

#[test]
fn test_failing_feature_does_not_abort() {
    let bad = r#"{ "type": "hole", "id": "bad", "dimensions": { "diameter": -4, "depth": 5 } }"#;
    let result = build_model(&block_with(&[bad, POCKET].join(",")), &KernelConfig::default());
    assert_eq!(result.metadata.feature_count, 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("diameter"));
    assert_relative_eq!(
        result.model.volume(),
        100000.0 - pocket_area(40.0, 20.0, 2.0) * 10.0,
        max_relative = 1e-6
    );
}

#[test]
fn test_boss_adds_material() {
    let boss = r#"{ "type": "boss", "position": { "x": 50, "y": 25, "z": 20 },
        "dimensions": { "diameter": 8, "height": 5 } }"#;
    let result = build_model(&block_with(boss), &KernelConfig::default());
    assert_eq!(result.metadata.feature_count, 1);
    let bb = result.metadata.bounding_box.unwrap();
    assert_relative_eq!(bb.max.z, 25.0, epsilon = 1e-9);
    assert_relative_eq!(
        result.model.volume(),
        100000.0 + polygon_area(4.0) * 5.0,
        max_relative = 1e-6
    );
}

#[test]
fn test_face_milling_lowers_top() {
    let face = r#"{ "type": "face", "dimensions": { "depth": 2 } }"#;
    let result = build_model(&block_with(face), &KernelConfig::default());
    let bb = result.metadata.bounding_box.unwrap();
    assert_relative_eq!(bb.max.z, 18.0, epsilon = 1e-9);
    assert_eq!(bb.min, Vec3::new(0.0, 0.0, 0.0));
    assert_relative_eq!(result.model.volume(), 100.0 * 50.0 * 18.0, max_relative = 1e-6);
}

#[test]
fn test_pattern_expands_before_ordering() {
    let patterned = r#"{ "type": "hole", "id": "row", "position": { "x": 20, "y": 25, "z": 20 },
        "dimensions": { "diameter": 10, "depth": 20 },
        "pattern": { "type": "linear", "direction": { "x": 1, "y": 0, "z": 0 }, "count": 3, "spacing": 20 } }"#;
    let result = build_model(&block_with(patterned), &KernelConfig::default());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.metadata.feature_count, 3);
    let expected = 100000.0 - 3.0 * polygon_area(5.0) * 20.0;
    assert_relative_eq!(result.model.volume(), expected, max_relative = 1e-6);
}

#[test]
fn test_edge_features_are_deferred() {
    let config = KernelConfig::default();
    let fillet = r#"{ "type": "fillet", "edge": "top-front", "dimensions": { "radius": 2 } }"#;
    let chamfer = r#"{ "type": "chamfer", "id": "c1", "dimensions": { "distance": 0.5 } }"#;
    let with = build_model(&block_with(&[chamfer, POCKET, fillet].join(",")), &config);
    let without = build_model(&block_with(POCKET), &config);

    assert_eq!(with.model.triangles, without.model.triangles);
    assert_eq!(with.metadata.feature_count, 3);
    assert_eq!(with.model.fillets.len(), 1);
    assert_eq!(with.model.fillets[0].edge, "top-front");
    assert_eq!(with.model.chamfers.len(), 1);
    assert_eq!(with.model.chamfers[0].edge, "c1");
}

#[test]
fn test_counterbore_removes_both_steps() {
    let cb = r#"{ "type": "counterbore", "position": { "x": 50, "y": 25, "z": 20 },
        "dimensions": { "diameter": 6, "depth": 20, "cbDiameter": 12, "cbDepth": 5 } }"#;
    let result = build_model(&block_with(cb), &KernelConfig::default());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let expected = 100000.0 - polygon_area(6.0) * 5.0 - polygon_area(3.0) * 15.0;
    assert_relative_eq!(result.model.volume(), expected, max_relative = 1e-6);
}

#[test]
fn test_groove_on_round_stock() {
    let part = part(
        r#"{
        "stock": { "type": "cylindrical", "dimensions": { "diameter": 40, "length": 30 } },
        "features": [
            { "type": "groove", "position": { "x": 0, "y": 0, "z": 15 },
              "dimensions": { "diameter": 40, "depth": 2, "width": 3 } }
        ]
    }"#,
    );
    let result = build_model(&part, &KernelConfig::default());
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let stock = polygon_area(20.0) * 30.0;
    let removed = (polygon_area(20.0) - polygon_area(18.0)) * 3.0;
    assert_relative_eq!(result.model.volume(), stock - removed, max_relative = 1e-6);
}

#[test]
fn test_step_export_stable_apart_from_timestamp() {
    let config = KernelConfig::default();
    let first = build_model(&block_with(&[HOLE_A, POCKET].join(",")), &config);
    let second = build_model(&block_with(&[POCKET, HOLE_A].join(",")), &config);

    let pinned = StepOptions {
        timestamp: Some("2024-01-01T00:00:00".into()),
        ..Default::default()
    };
    assert_eq!(first.model.to_step(&pinned), second.model.to_step(&pinned));

    let strip = |s: String| -> Vec<String> { s.lines().filter(|l| !l.starts_with("FILE_NAME(")).map(String::from).collect() };
    let live = StepOptions::default();
    let later = StepOptions {
        timestamp: Some("2030-06-15T12:00:00".into()),
        ..Default::default()
    };
    assert_eq!(strip(first.model.to_step(&live)), strip(first.model.to_step(&later)));
}

#[test]
fn test_box_volume_scale() {
    for l in [1.0, 10.0, 100.0] {
        for w in [1.0, 10.0, 100.0] {
            for h in [1.0, 10.0, 100.0] {
                let mut arena = TopologyArena::new();
                let solid = make_box(&mut arena, Point3::new(-3.0, 2.0, 7.0), l, w, h).unwrap();
                let v = soup_volume(&tessellate_solid(&arena, solid, &Default::default()));
                assert_relative_eq!(v, l * w * h, max_relative = 0.01);
            }
        }
    }
}

#[test]
fn test_config_density_reaches_tessellation() {
    let config = KernelConfig::from_toml_str("[tessellation]\ncircle_segments = 8").unwrap();
    let part = part(r#"{ "stock": { "type": "round", "dimensions": { "diameter": 10, "height": 4 } } }"#);
    let coarse = build_model(&part, &config);
    let fine = build_model(&part, &KernelConfig::default());
    assert!(coarse.model.num_triangles() < fine.model.num_triangles());
}
