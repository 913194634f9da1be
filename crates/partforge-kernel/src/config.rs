//! Kernel configuration, loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults, so an
//! empty document is a valid configuration:
//!
//! ```toml
//! [segments]
//! arc_segments = 48
//!
//! [tessellation]
//! circle_segments = 48
//!
//! [default_stock]
//! length = 120.0
//! ```

use std::path::{Path, PathBuf};

use partforge_kernel_primitives::SegmentConfig;
use partforge_kernel_tessellate::TessellationParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`KernelConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or has wrongly typed keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Block used when the stock type is not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultStock {
    /// Extent along x.
    pub length: f64,
    /// Extent along y.
    pub width: f64,
    /// Extent along z.
    pub height: f64,
}

impl Default for DefaultStock {
    fn default() -> Self {
        Self {
            length: 100.0,
            width: 100.0,
            height: 50.0,
        }
    }
}

/// Settings shared by every stage of a build.
///
/// The same [`TessellationParams`] drive both boolean operands and mesh
/// export, so shared boundaries are sampled identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Curve sampling used by feature generators.
    pub segments: SegmentConfig,
    /// Surface sampling used by the tessellator.
    pub tessellation: TessellationParams,
    /// Fallback stock block.
    pub default_stock: DefaultStock,
}

impl KernelConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
