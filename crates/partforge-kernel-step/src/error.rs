//! Error types for STEP export.

use partforge_kernel_topo::TopologyError;
use thiserror::Error;

/// Errors that can occur while exporting STEP text.
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The solid to export cannot be resolved in the arena.
    #[error("cannot export solid: {0}")]
    Topology(#[from] TopologyError),
}
