#![warn(missing_docs)]

//! Model-build pipeline and facade for the partforge machining kernel.
//!
//! [`build_model`] turns a [`PartDefinition`](partforge_ir::PartDefinition)
//! (a stock description plus machining features) into a [`Model`]: a
//! triangle soup carved by BSP booleans, with fillets and chamfers kept as
//! deferred records.
//!
//! # Example
//!
//! ```
//! use partforge_ir::PartDefinition;
//! use partforge_kernel::{build_model, KernelConfig};
//!
//! let part: PartDefinition = serde_json::from_str(r#"{
//!     "stock": { "type": "rectangular", "dimensions": { "length": 100, "width": 50, "height": 20 } },
//!     "features": [
//!         { "type": "hole", "position": { "x": 20, "y": 25, "z": 20 },
//!           "dimensions": { "diameter": 10, "depth": 20 } }
//!     ]
//! }"#).unwrap();
//!
//! let result = build_model(&part, &KernelConfig::default());
//! assert_eq!(result.metadata.feature_count, 1);
//! assert!(result.model.volume() < 100.0 * 50.0 * 20.0);
//! ```

pub use partforge_ir;
pub use partforge_kernel_booleans;
pub use partforge_kernel_math;
pub use partforge_kernel_nurbs;
pub use partforge_kernel_ops;
pub use partforge_kernel_primitives;
pub use partforge_kernel_step;
pub use partforge_kernel_tessellate;
pub use partforge_kernel_topo;

mod config;
mod error;
mod generate;
pub mod pipeline;

pub use config::{ConfigError, DefaultStock, KernelConfig};
pub use error::{BuildError, FeatureError, FeatureWarning};
pub use pipeline::{build_model, order_features, BuildResult, BuildStage, ModelBuilder};

use partforge_ir::{BoundingBox, Vec3 as IrVec3};
use partforge_kernel_primitives::{ChamferRecord, FilletRecord};
use partforge_kernel_step::{write_mesh_to_string, StepOptions};
use partforge_kernel_tessellate::{soup_bounds, soup_volume, RenderMesh, Triangle};

/// The outcome of a build: geometry plus deferred edge treatments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Triangle soup of the finished part.
    pub triangles: Vec<Triangle>,
    /// Fillets recorded but not applied to the geometry.
    pub fillets: Vec<FilletRecord>,
    /// Chamfers recorded but not applied to the geometry.
    pub chamfers: Vec<ChamferRecord>,
}

impl Model {
    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Flat-shaded render buffers.
    pub fn to_render_mesh(&self) -> RenderMesh {
        RenderMesh::from_triangles(&self.triangles)
    }

    /// STEP point-cloud text. Identical models give identical text apart
    /// from the timestamp, which `options` can pin.
    pub fn to_step(&self, options: &StepOptions) -> String {
        write_mesh_to_string(&self.triangles, options)
    }

    /// Axis-aligned bounds, `None` for an empty model.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        soup_bounds(&self.triangles).map(|bb| BoundingBox {
            min: IrVec3::new(bb.min.x, bb.min.y, bb.min.z),
            max: IrVec3::new(bb.max.x, bb.max.y, bb.max.z),
        })
    }

    /// Enclosed volume by signed-tetrahedron summation.
    pub fn volume(&self) -> f64 {
        soup_volume(&self.triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel_math::Point3;

    fn unit_cube() -> Model {
        let mut arena = partforge_kernel_topo::TopologyArena::new();
        let solid = partforge_kernel_primitives::make_box(&mut arena, Point3::origin(), 1.0, 2.0, 3.0).unwrap();
        Model {
            triangles: partforge_kernel_tessellate::tessellate_solid(&arena, solid, &Default::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        let model = Model::default();
        assert_eq!(model.bounding_box(), None);
        assert_eq!(model.volume(), 0.0);
        assert_eq!(model.to_render_mesh().num_triangles(), 0);
    }

    #[test]
    fn test_box_model_summary() {
        let model = unit_cube();
        let bb = model.bounding_box().unwrap();
        assert_eq!(bb.min, IrVec3::new(0.0, 0.0, 0.0));
        assert_eq!(bb.max, IrVec3::new(1.0, 2.0, 3.0));
        approx::assert_relative_eq!(model.volume(), 6.0, epsilon = 1e-9);
        let mesh = model.to_render_mesh();
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.positions.len(), 12 * 9);
    }

    #[test]
    fn test_step_contains_corners() {
        let options = StepOptions {
            timestamp: Some("2024-01-01T00:00:00".into()),
            ..Default::default()
        };
        let step = unit_cube().to_step(&options);
        assert!(step.starts_with("ISO-10303-21;"));
        assert_eq!(step.matches("CARTESIAN_POINT").count(), 8);
    }
}
