//! Wire types for the partforge machining kernel.
//!
//! A [`PartDefinition`] (stock + feature list) comes in from a feature
//! planner; [`BuildMetadata`] goes out with the built model. The types
//! are purely declarative and serialize as camelCase JSON.
//!
//! Type tags stay strings on the wire so unknown feature or stock kinds
//! can be reported and skipped instead of failing the whole document.
//! [`FeatureKind::parse`] and [`StockKind::parse`] map them onto closed
//! enums for dispatch.

use serde::{Deserialize, Serialize};

/// 3D vector with f64 components (millimeters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// =============================================================================
// Input
// =============================================================================

/// A part to build: stock plus an ordered feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDefinition {
    /// Raw stock.
    pub stock: StockSpec,
    /// Features in the order the planner listed them.
    #[serde(default)]
    pub features: Vec<FeatureSpec>,
    /// Material name, passed through to metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Tolerance block, passed through to metadata untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerances: Option<serde_json::Value>,
}

/// Raw stock description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSpec {
    /// `rectangular`, `block`, `cylindrical` or `round`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Stock dimensions (length/width/height or diameter/length).
    #[serde(default)]
    pub dimensions: Dimensions,
    /// Minimum corner (block) or base center (round). Defaults to the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
}

impl StockSpec {
    /// The recognized stock kind, if any.
    pub fn stock_kind(&self) -> Option<StockKind> {
        StockKind::parse(&self.kind)
    }
}

/// Recognized stock shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockKind {
    /// Rectangular block.
    Rectangular,
    /// Round bar.
    Cylindrical,
}

impl StockKind {
    /// Parse a stock type tag (case-insensitive).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "block" => Some(Self::Rectangular),
            "cylindrical" | "round" => Some(Self::Cylindrical),
            _ => None,
        }
    }
}

/// One machining feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    /// Feature type tag, e.g. `"hole"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Feature anchor; meaning depends on the type. Defaults to the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Type-specific dimensions.
    #[serde(default)]
    pub dimensions: Dimensions,
    /// Caller-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool axis for axial features. Holes default to -Z, bosses to +Z.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Vec3>,
    /// Edge reference for fillets and chamfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
    /// Replicate this feature before it is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternSpec>,
}

impl FeatureSpec {
    /// The recognized feature kind, if any.
    pub fn feature_kind(&self) -> Option<FeatureKind> {
        FeatureKind::parse(&self.kind)
    }

    /// Anchor position, origin if unset.
    pub fn position(&self) -> Vec3 {
        self.position.unwrap_or_default()
    }

    /// Id if present, otherwise the type tag. Used in log lines.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.kind)
    }
}

/// Recognized feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    /// Face milling of the top surface.
    Face,
    /// Rounded-rectangle pocket.
    Pocket,
    /// Slot with round ends.
    Slot,
    /// Drilled hole.
    Hole,
    /// Counterbored hole.
    Counterbore,
    /// Countersunk hole.
    Countersink,
    /// Raised cylindrical boss.
    Boss,
    /// Threaded hole.
    Thread,
    /// Circumferential groove.
    Groove,
    /// Edge fillet (deferred).
    Fillet,
    /// Edge chamfer (deferred).
    Chamfer,
}

/// Priority assigned to unrecognized feature types when sorting.
pub const UNKNOWN_PRIORITY: u8 = 5;

/// How a feature's solid joins the running model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Material removal.
    Subtract,
    /// Material addition.
    Union,
    /// Recorded in metadata only.
    Deferred,
}

impl FeatureKind {
    /// Parse a feature type tag (case-insensitive).
    pub fn parse(tag: &str) -> Option<Self> {
        let kind = match tag.trim().to_ascii_lowercase().as_str() {
            "face" => Self::Face,
            "pocket" => Self::Pocket,
            "slot" => Self::Slot,
            "hole" => Self::Hole,
            "counterbore" => Self::Counterbore,
            "countersink" => Self::Countersink,
            "boss" => Self::Boss,
            "thread" => Self::Thread,
            "groove" => Self::Groove,
            "fillet" => Self::Fillet,
            "chamfer" => Self::Chamfer,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Pocket => "pocket",
            Self::Slot => "slot",
            Self::Hole => "hole",
            Self::Counterbore => "counterbore",
            Self::Countersink => "countersink",
            Self::Boss => "boss",
            Self::Thread => "thread",
            Self::Groove => "groove",
            Self::Fillet => "fillet",
            Self::Chamfer => "chamfer",
        }
    }

    /// Machining precedence, lowest first: roughing before finishing,
    /// removal before addition, edge treatments last.
    pub fn priority(self) -> u8 {
        match self {
            Self::Face => 1,
            Self::Pocket => 2,
            Self::Slot => 3,
            Self::Hole | Self::Counterbore | Self::Countersink => 4,
            Self::Boss => 5,
            Self::Thread => 6,
            Self::Groove => 7,
            Self::Fillet => 8,
            Self::Chamfer => 9,
        }
    }

    /// How the generated solid is combined.
    pub fn combine(self) -> Combine {
        match self {
            Self::Boss => Combine::Union,
            Self::Fillet | Self::Chamfer => Combine::Deferred,
            Self::Face
            | Self::Pocket
            | Self::Slot
            | Self::Hole
            | Self::Counterbore
            | Self::Countersink
            | Self::Thread
            | Self::Groove => Combine::Subtract,
        }
    }
}

/// Feature and stock dimensions. Every field is optional; generators
/// pick the ones they need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Extent along x.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Extent along y.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Extent along z for stock and bosses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Cut depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    /// Diameter (holes, bosses, round stock, thread major diameter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    /// Radius (fillets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Pocket corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    /// Counterbore diameter.
    #[serde(default, alias = "cbDiameter", skip_serializing_if = "Option::is_none")]
    pub counterbore_diameter: Option<f64>,
    /// Counterbore depth.
    #[serde(default, alias = "cbDepth", skip_serializing_if = "Option::is_none")]
    pub counterbore_depth: Option<f64>,
    /// Countersink diameter at the surface.
    #[serde(default, alias = "csDiameter", skip_serializing_if = "Option::is_none")]
    pub countersink_diameter: Option<f64>,
    /// Included countersink angle in degrees.
    #[serde(default, alias = "csAngle", skip_serializing_if = "Option::is_none")]
    pub countersink_angle: Option<f64>,
    /// Thread pitch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Thread minor diameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_diameter: Option<f64>,
    /// Chamfer distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Dimensions {
    /// Depth used to order features of equal priority: `depth`, else
    /// `height`, else zero.
    pub fn cut_depth(&self) -> f64 {
        self.depth.or(self.height).unwrap_or(0.0)
    }
}

/// Replication of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PatternSpec {
    /// `count` copies spaced along `direction`.
    #[serde(rename_all = "camelCase")]
    Linear {
        /// Step direction (normalized when applied).
        direction: Vec3,
        /// Number of instances including the original.
        count: usize,
        /// Distance between instances.
        spacing: f64,
    },
    /// `count` copies rotated about an axis through `center`.
    #[serde(rename_all = "camelCase")]
    Circular {
        /// Point on the rotation axis.
        center: Vec3,
        /// Rotation axis. Defaults to +Z.
        #[serde(default = "default_axis")]
        axis: Vec3,
        /// Number of instances including the original.
        count: usize,
        /// Total angle in degrees spanned by the instances.
        #[serde(default = "full_turn")]
        angle: f64,
    },
    /// A `count1 × count2` grid.
    #[serde(rename_all = "camelCase")]
    Rectangular {
        /// First grid direction.
        direction1: Vec3,
        /// Instances along the first direction.
        count1: usize,
        /// Spacing along the first direction.
        spacing1: f64,
        /// Second grid direction.
        direction2: Vec3,
        /// Instances along the second direction.
        count2: usize,
        /// Spacing along the second direction.
        spacing2: f64,
    },
}

fn default_axis() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

fn full_turn() -> f64 {
    360.0
}

// =============================================================================
// Output
// =============================================================================

/// Axis-aligned bounds of the built model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

/// Summary returned alongside the built model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    /// Recognized features that were applied or recorded.
    pub feature_count: usize,
    /// Material passed through from the part definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Tolerances passed through from the part definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerances: Option<serde_json::Value>,
    /// Model bounds; `None` when the model has no geometry.
    pub bounding_box: Option<BoundingBox>,
    /// One line per skipped or failed feature.
    #[serde(default)]
    pub warnings: Vec<String>,
}
