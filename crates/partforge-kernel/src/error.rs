use std::fmt;

use partforge_kernel_ops::OperatorError;
use partforge_kernel_primitives::PrimitiveError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::BuildStage;

/// Why a single feature could not be applied. Never aborts a build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// The `type` tag names no known feature.
    #[error("unknown feature type `{0}`")]
    UnknownType(String),

    /// A dimension the generator needs is absent.
    #[error("missing dimension `{0}`")]
    MissingDimension(&'static str),

    /// The generated solid tessellated to nothing.
    #[error("generated solid has no triangles")]
    EmptySolid,

    /// Face milling needs a model to measure the top surface from.
    #[error("no model to face")]
    NoModel,

    /// The generator rejected its parameters.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// Pattern expansion or a parametric operator failed.
    #[error(transparent)]
    Operator(#[from] OperatorError),
}

/// Misuse of [`ModelBuilder`](crate::ModelBuilder).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A stage method was called out of order.
    #[error("expected build stage {expected:?}, builder is at {actual:?}")]
    Stage {
        /// Stage the call requires.
        expected: BuildStage,
        /// Stage the builder is in.
        actual: BuildStage,
    },

    /// Neither the requested nor the fallback stock could be built.
    #[error("cannot create stock: {0}")]
    Stock(#[from] PrimitiveError),
}

/// A feature that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureWarning {
    /// Feature id, if the record carried one.
    pub id: Option<String>,
    /// Feature type tag as supplied.
    pub kind: String,
    /// Human-readable reason.
    pub message: String,
}

impl fmt::Display for FeatureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} `{}`: {}", self.kind, id, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}
