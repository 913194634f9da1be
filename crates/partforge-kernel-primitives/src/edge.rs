use std::f64::consts::FRAC_PI_2;

use partforge_kernel_math::Point2;
use serde::{Deserialize, Serialize};

use crate::{positive, PrimitiveError};

/// A chamfer request on a named edge. Not lowered to geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamferRecord {
    /// Edge reference as supplied by the part definition.
    pub edge: String,
    /// Setback distance along each adjacent face.
    pub distance: f64,
}

/// A fillet request on a named edge. Not lowered to geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilletRecord {
    /// Edge reference as supplied by the part definition.
    pub edge: String,
    /// Blend radius.
    pub radius: f64,
    /// Segments across the blend cross-section.
    pub segments: usize,
}

impl FilletRecord {
    /// Cross-section of the blend for a right-angle edge at the origin
    /// with faces along +x and +y: a quarter arc from `(r, 0)` to `(0, r)`
    /// about `(r, r)`, `segments + 1` points.
    pub fn cross_section(&self) -> Vec<Point2> {
        let r = self.radius;
        let n = self.segments.max(1);
        (0..=n)
            .map(|i| {
                let a = FRAC_PI_2 * i as f64 / n as f64;
                Point2::new(r - r * a.sin(), r - r * a.cos())
            })
            .collect()
    }
}

/// Describe a chamfer of `distance` on `edge`.
pub fn chamfer(edge: impl Into<String>, distance: f64) -> Result<ChamferRecord, PrimitiveError> {
    Ok(ChamferRecord {
        edge: edge.into(),
        distance: positive("distance", distance)?,
    })
}

/// Describe a fillet of `radius` on `edge`.
pub fn fillet(edge: impl Into<String>, radius: f64, segments: usize) -> Result<FilletRecord, PrimitiveError> {
    Ok(FilletRecord {
        edge: edge.into(),
        radius: positive("radius", radius)?,
        segments: segments.max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fillet_cross_section_endpoints() {
        let f = fillet("top-front", 2.0, 16).unwrap();
        let pts = f.cross_section();
        assert_eq!(pts.len(), 17);
        assert!((pts[0] - Point2::new(2.0, 0.0)).norm() < 1e-12);
        assert!((pts[16] - Point2::new(0.0, 2.0)).norm() < 1e-12);
        for p in &pts {
            assert!(((p - Point2::new(2.0, 2.0)).norm() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_records_validate() {
        assert!(chamfer("e1", 0.5).is_ok());
        assert!(chamfer("e1", -1.0).is_err());
        assert!(fillet("e1", 0.0, 16).is_err());
    }
}
