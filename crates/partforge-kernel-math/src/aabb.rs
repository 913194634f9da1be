use crate::{Point3, Vec3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// A box containing nothing; `include` grows it.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True until at least one point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Bounding box of a point set, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut bb = Self::empty();
        for p in points {
            bb.include(p);
        }
        (!bb.is_empty()).then_some(bb)
    }

    /// Edge lengths along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True if the two boxes share any volume, with `tol` slack.
    pub fn overlaps(&self, other: &Aabb3, tol: f64) -> bool {
        self.min.x <= other.max.x + tol
            && self.max.x + tol >= other.min.x
            && self.min.y <= other.max.y + tol
            && self.max.y + tol >= other.min.y
            && self.min.z <= other.max.z + tol
            && self.max.z + tol >= other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_no_box() {
        assert!(Aabb3::empty().is_empty());
        assert!(Aabb3::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_from_points() {
        let pts = [Point3::new(1.0, -2.0, 0.0), Point3::new(-1.0, 4.0, 3.0)];
        let bb = Aabb3::from_points(&pts).unwrap();
        assert_eq!(bb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bb.max, Point3::new(1.0, 4.0, 3.0));
        assert_eq!(bb.size(), Vec3::new(2.0, 6.0, 3.0));
    }

    #[test]
    fn test_overlaps() {
        let a = Aabb3::from_points(&[Point3::origin(), Point3::new(1.0, 1.0, 1.0)]).unwrap();
        let b = Aabb3::from_points(&[Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)]).unwrap();
        assert!(!a.overlaps(&b, 1e-6));
        assert!(a.overlaps(&a, 0.0));
    }
}
