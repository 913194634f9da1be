//! The model-build pipeline.
//!
//! A build walks [`BuildStage`] in order: the stock solid is created,
//! material features are combined into it by subtraction or union, edge
//! treatments are recorded, and the result is summarized. Features are
//! applied in machining order (see [`order_features`]), and a feature
//! that fails is reported as a [`FeatureWarning`] without stopping the
//! build.

use std::cmp::Ordering;

use partforge_ir::{BuildMetadata, Combine, FeatureKind, FeatureSpec, PartDefinition, StockKind, StockSpec, UNKNOWN_PRIORITY};
use partforge_kernel_booleans::{boolean_op, BooleanOp};
use partforge_kernel_math::{Frame, Point3, Vec3};
use partforge_kernel_ops::expand_pattern;
use partforge_kernel_primitives::{make_box, make_cylinder, PrimitiveError};
use partforge_kernel_tessellate::{soup_bounds, tessellate_solid, Triangle};
use partforge_kernel_topo::{Handle, ManifoldSolidBrep, TopologyArena};
use serde::{Deserialize, Serialize};

use crate::generate::{edge_treatment, feature_solids, to_point, EdgeTreatment};
use crate::{BuildError, FeatureError, FeatureWarning, KernelConfig, Model};

/// Stages of a build, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildStage {
    /// Nothing built yet.
    Idle,
    /// Stock solid exists.
    StockCreated,
    /// Material features combined.
    FeaturesApplied,
    /// Fillets and chamfers recorded.
    EdgeFeaturesApplied,
    /// Result handed out.
    Done,
}

/// Everything a build produces.
#[derive(Debug)]
pub struct BuildResult {
    /// Final triangle soup plus deferred edge records.
    pub model: Model,
    /// Summary for downstream consumers.
    pub metadata: BuildMetadata,
    /// Skipped features and stock fallbacks, in the order they occurred.
    pub warnings: Vec<FeatureWarning>,
    /// Every entity generated during the build.
    pub arena: TopologyArena,
    /// The stock solid, if one was created.
    pub stock: Option<Handle<ManifoldSolidBrep>>,
}

fn priority(feature: &FeatureSpec) -> u8 {
    feature.feature_kind().map_or(UNKNOWN_PRIORITY, FeatureKind::priority)
}

fn machining_order(a: &FeatureSpec, b: &FeatureSpec) -> Ordering {
    let (pa, pb) = (a.position(), b.position());
    priority(a)
        .cmp(&priority(b))
        .then_with(|| b.dimensions.cut_depth().total_cmp(&a.dimensions.cut_depth()))
        .then_with(|| pa.x.total_cmp(&pb.x))
        .then_with(|| pa.y.total_cmp(&pb.y))
        .then_with(|| pa.z.total_cmp(&pb.z))
}

/// Sort features into machining order: ascending priority, deeper cuts
/// first within a priority, then by position. The sort is stable, so
/// records that compare equal keep their input order.
pub fn order_features(features: &[FeatureSpec]) -> Vec<FeatureSpec> {
    let mut ordered = features.to_vec();
    ordered.sort_by(machining_order);
    ordered
}

/// Stateful builder over one [`TopologyArena`].
///
/// Each stage method checks the current [`BuildStage`] and fails with
/// [`BuildError::Stage`] when called out of order.
#[derive(Debug)]
pub struct ModelBuilder {
    config: KernelConfig,
    arena: TopologyArena,
    stage: BuildStage,
    stock: Option<Handle<ManifoldSolidBrep>>,
    model: Model,
    warnings: Vec<FeatureWarning>,
    feature_count: usize,
}

impl ModelBuilder {
    /// A builder at [`BuildStage::Idle`] with a fresh arena.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            arena: TopologyArena::new(),
            stage: BuildStage::Idle,
            stock: None,
            model: Model::default(),
            warnings: Vec::new(),
            feature_count: 0,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// The model built so far.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[FeatureWarning] {
        &self.warnings
    }

    /// The arena holding every generated entity.
    pub fn arena(&self) -> &TopologyArena {
        &self.arena
    }

    fn require_stage(&self, expected: BuildStage) -> Result<(), BuildError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(BuildError::Stage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn enter(&mut self, next: BuildStage) {
        tracing::debug!(from = ?self.stage, to = ?next, triangles = self.model.triangles.len(), "build stage");
        self.stage = next;
    }

    fn skip(&mut self, feature: &FeatureSpec, err: FeatureError) {
        tracing::warn!(feature = feature.label(), kind = %feature.kind, %err, "skipping feature");
        self.warnings.push(FeatureWarning {
            id: feature.id.clone(),
            kind: feature.kind.clone(),
            message: err.to_string(),
        });
    }

    /// Expand patterns and sort the result into machining order. A
    /// pattern that cannot be expanded drops its feature with a warning.
    pub fn plan(&mut self, features: &[FeatureSpec]) -> Vec<FeatureSpec> {
        let mut expanded = Vec::with_capacity(features.len());
        for feature in features {
            match expand_pattern(feature) {
                Ok(instances) => expanded.extend(instances),
                Err(err) => self.skip(feature, err.into()),
            }
        }
        order_features(&expanded)
    }

    /// Create the stock solid. An unknown stock type or invalid stock
    /// dimensions fall back to the configured default block.
    pub fn create_stock(&mut self, stock: &StockSpec) -> Result<(), BuildError> {
        self.require_stage(BuildStage::Idle)?;
        let origin = stock.position.map_or_else(Point3::origin, to_point);
        let requested = match stock.stock_kind() {
            Some(kind) => self.requested_stock(kind, stock, origin).map_err(|err| err.to_string()),
            None => Err(format!("unknown stock type `{}`", stock.kind)),
        };
        let solid = match requested {
            Ok(solid) => solid,
            Err(message) => {
                tracing::warn!(stock = %stock.kind, %message, "using default stock");
                self.warnings.push(FeatureWarning {
                    id: None,
                    kind: stock.kind.clone(),
                    message: format!("{message}, using default block"),
                });
                let d = self.config.default_stock;
                make_box(&mut self.arena, origin, d.length, d.width, d.height)?
            }
        };
        self.model.triangles = tessellate_solid(&self.arena, solid, &self.config.tessellation);
        self.stock = Some(solid);
        self.enter(BuildStage::StockCreated);
        Ok(())
    }

    fn requested_stock(
        &mut self,
        kind: StockKind,
        stock: &StockSpec,
        origin: Point3,
    ) -> Result<Handle<ManifoldSolidBrep>, PrimitiveError> {
        let dims = &stock.dimensions;
        let fallback = self.config.default_stock;
        match kind {
            StockKind::Rectangular => make_box(
                &mut self.arena,
                origin,
                dims.length.unwrap_or(fallback.length),
                dims.width.unwrap_or(fallback.width),
                dims.height.unwrap_or(fallback.height),
            ),
            StockKind::Cylindrical => {
                let diameter = dims
                    .diameter
                    .or(dims.radius.map(|r| 2.0 * r))
                    .unwrap_or(fallback.width);
                let height = dims.height.or(dims.length).unwrap_or(fallback.height);
                make_cylinder(
                    &mut self.arena,
                    &Frame::from_axis(origin, Vec3::z()),
                    diameter / 2.0,
                    height,
                )
            }
        }
    }

    /// Generate and combine every material feature in `plan`, in order.
    /// Edge treatments are left for [`apply_edge_features`](Self::apply_edge_features).
    pub fn apply_features(&mut self, plan: &[FeatureSpec]) -> Result<(), BuildError> {
        self.require_stage(BuildStage::StockCreated)?;
        for feature in plan {
            let Some(kind) = feature.feature_kind() else {
                self.skip(feature, FeatureError::UnknownType(feature.kind.clone()));
                continue;
            };
            if kind.combine() == Combine::Deferred {
                continue;
            }
            match self.apply_feature(feature, kind) {
                Ok(triangles) => {
                    tracing::debug!(feature = feature.label(), kind = kind.as_str(), triangles, "applied feature");
                    self.feature_count += 1;
                }
                Err(err) => self.skip(feature, err),
            }
        }
        self.enter(BuildStage::FeaturesApplied);
        Ok(())
    }

    fn apply_feature(&mut self, feature: &FeatureSpec, kind: FeatureKind) -> Result<usize, FeatureError> {
        let bounds = soup_bounds(&self.model.triangles);
        let solids = feature_solids(&mut self.arena, feature, kind, &self.config, bounds.as_ref())?;
        let tools: Vec<Vec<Triangle>> = solids
            .into_iter()
            .map(|solid| tessellate_solid(&self.arena, solid, &self.config.tessellation))
            .collect();
        if tools.iter().any(Vec::is_empty) {
            return Err(FeatureError::EmptySolid);
        }

        let op = match kind.combine() {
            Combine::Union => BooleanOp::Union,
            Combine::Subtract | Combine::Deferred => BooleanOp::Subtract,
        };
        for tool in &tools {
            self.model.triangles = boolean_op(&self.model.triangles, tool, op);
        }
        Ok(self.model.triangles.len())
    }

    /// Record fillets and chamfers from `plan` as deferred metadata.
    pub fn apply_edge_features(&mut self, plan: &[FeatureSpec]) -> Result<(), BuildError> {
        self.require_stage(BuildStage::FeaturesApplied)?;
        for feature in plan {
            let Some(kind) = feature.feature_kind() else {
                continue;
            };
            match edge_treatment(feature, kind, &self.config) {
                Ok(Some(EdgeTreatment::Fillet(record))) => {
                    self.model.fillets.push(record);
                    self.feature_count += 1;
                }
                Ok(Some(EdgeTreatment::Chamfer(record))) => {
                    self.model.chamfers.push(record);
                    self.feature_count += 1;
                }
                Ok(None) => {}
                Err(err) => self.skip(feature, err),
            }
        }
        self.enter(BuildStage::EdgeFeaturesApplied);
        Ok(())
    }

    /// Summarize and hand out the result.
    pub fn finish(&mut self, part: &PartDefinition) -> Result<BuildResult, BuildError> {
        self.require_stage(BuildStage::EdgeFeaturesApplied)?;
        self.enter(BuildStage::Done);
        Ok(self.take_result(part))
    }

    fn take_result(&mut self, part: &PartDefinition) -> BuildResult {
        let model = std::mem::take(&mut self.model);
        let warnings = std::mem::take(&mut self.warnings);
        let metadata = BuildMetadata {
            feature_count: self.feature_count,
            material: part.material.clone(),
            tolerances: part.tolerances.clone(),
            bounding_box: model.bounding_box(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        };
        BuildResult {
            model,
            metadata,
            warnings,
            arena: std::mem::take(&mut self.arena),
            stock: self.stock.take(),
        }
    }
}

fn run_stages(builder: &mut ModelBuilder, part: &PartDefinition, plan: &[FeatureSpec]) -> Result<BuildResult, BuildError> {
    builder.create_stock(&part.stock)?;
    builder.apply_features(plan)?;
    builder.apply_edge_features(plan)?;
    builder.finish(part)
}

/// Build `part` from scratch. Never fails: bad features become
/// warnings, and if not even the fallback stock can be built the
/// result has an empty model.
pub fn build_model(part: &PartDefinition, config: &KernelConfig) -> BuildResult {
    let mut builder = ModelBuilder::new(*config);
    let plan = builder.plan(&part.features);
    tracing::debug!(features = part.features.len(), planned = plan.len(), "build started");
    match run_stages(&mut builder, part, &plan) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(%err, "build abandoned");
            builder.warnings.push(FeatureWarning {
                id: None,
                kind: part.stock.kind.clone(),
                message: err.to_string(),
            });
            builder.take_result(part)
        }
    }
}
