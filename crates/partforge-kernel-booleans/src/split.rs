//! Plane classification and triangle splitting.

use partforge_kernel_math::{Point3, Vec3};
use partforge_kernel_tessellate::Triangle;

/// Distance within which a point counts as lying on a plane.
pub const EPSILON: f64 = 1e-6;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal; the front half-space is the side it points to.
    pub normal: Vec3,
    /// Offset along the normal.
    pub w: f64,
}

impl Plane {
    /// Plane through a triangle, `None` when the triangle is degenerate.
    pub fn from_triangle(tri: &Triangle) -> Option<Self> {
        let n = (tri.v1 - tri.v0).cross(&(tri.v2 - tri.v0));
        let len = n.norm();
        if len < 1e-12 {
            return None;
        }
        let normal = n / len;
        Some(Self {
            normal,
            w: normal.dot(&tri.v0.coords),
        })
    }

    /// Reverse the front and back half-spaces.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Signed distance of `p` from the plane.
    pub fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }

    fn side(&self, p: &Point3) -> u8 {
        let t = self.distance(p);
        if t < -EPSILON {
            BACK
        } else if t > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }
}

/// Sort `tri` against `plane` into the four output lists.
///
/// A coplanar triangle goes to `coplanar_front` when its own normal
/// agrees with the plane normal and to `coplanar_back` otherwise. A
/// spanning triangle is cut at the exact zero crossings of its edges;
/// each side's polygon is fanned from its first vertex.
pub fn split_triangle(
    plane: &Plane,
    tri: &Triangle,
    coplanar_front: &mut Vec<Triangle>,
    coplanar_back: &mut Vec<Triangle>,
    front: &mut Vec<Triangle>,
    back: &mut Vec<Triangle>,
) {
    let verts = [tri.v0, tri.v1, tri.v2];
    let sides = verts.map(|v| plane.side(&v));
    let kind = sides.iter().fold(COPLANAR, |acc, s| acc | s);

    match kind {
        COPLANAR => {
            if plane.normal.dot(&tri.normal()) > 0.0 {
                coplanar_front.push(*tri);
            } else {
                coplanar_back.push(*tri);
            }
        }
        FRONT => front.push(*tri),
        BACK => back.push(*tri),
        _ => {
            let mut f: Vec<Point3> = Vec::with_capacity(4);
            let mut b: Vec<Point3> = Vec::with_capacity(4);
            for i in 0..3 {
                let j = (i + 1) % 3;
                let (si, sj) = (sides[i], sides[j]);
                let (vi, vj) = (verts[i], verts[j]);
                if si != BACK {
                    f.push(vi);
                }
                if si != FRONT {
                    b.push(vi);
                }
                if si | sj == SPANNING {
                    let t = (plane.w - plane.normal.dot(&vi.coords)) / plane.normal.dot(&(vj - vi));
                    let v = vi + (vj - vi) * t;
                    f.push(v);
                    b.push(v);
                }
            }
            fan(&f, front);
            fan(&b, back);
        }
    }
}

fn fan(polygon: &[Point3], out: &mut Vec<Triangle>) {
    for i in 1..polygon.len().saturating_sub(1) {
        out.push(Triangle::new(polygon[0], polygon[i], polygon[i + 1]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xy_plane() -> Plane {
        Plane {
            normal: Vec3::z(),
            w: 0.0,
        }
    }

    #[derive(Default)]
    struct Buckets {
        cf: Vec<Triangle>,
        cb: Vec<Triangle>,
        f: Vec<Triangle>,
        b: Vec<Triangle>,
    }

    fn split(plane: &Plane, tri: &Triangle) -> Buckets {
        let mut out = Buckets::default();
        split_triangle(plane, tri, &mut out.cf, &mut out.cb, &mut out.f, &mut out.b);
        out
    }

    #[test]
    fn test_plane_from_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        );
        let plane = Plane::from_triangle(&tri).unwrap();
        assert_relative_eq!(plane.normal, Vec3::z());
        assert_relative_eq!(plane.w, 2.0);
        let p = Point3::new(3.0, 3.0, 3.0);
        assert_relative_eq!(plane.distance(&p), 1.0);
    }

    #[test]
    fn test_degenerate_triangle_has_no_plane() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(Plane::from_triangle(&Triangle::new(p, p, Point3::new(2.0, 4.0, 6.0))).is_none());
    }

    #[test]
    fn test_coplanar_sorted_by_orientation() {
        let up = Triangle::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        let out = split(&xy_plane(), &up);
        assert_eq!((out.cf.len(), out.cb.len()), (1, 0));
        let out = split(&xy_plane(), &up.flipped());
        assert_eq!((out.cf.len(), out.cb.len()), (0, 1));
    }

    #[test]
    fn test_one_sided_triangles_unsplit() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 2.0),
        );
        let out = split(&xy_plane(), &tri);
        assert_eq!((out.f.len(), out.b.len()), (1, 0));
        assert_eq!(out.f[0], tri);
    }

    #[test]
    fn test_spanning_triangle_split_preserves_area() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(2.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        let out = split(&xy_plane(), &tri);
        assert_eq!(out.f.len(), 1);
        assert_eq!(out.b.len(), 2);
        let area: f64 = out.f.iter().chain(&out.b).map(Triangle::area).sum();
        assert_relative_eq!(area, tri.area(), epsilon = 1e-12);
        assert!(out.f.iter().flat_map(|t| [t.v0, t.v1, t.v2]).all(|p| p.z >= -1e-12));
        assert!(out.b.iter().flat_map(|t| [t.v0, t.v1, t.v2]).all(|p| p.z <= 1e-12));
        for t in out.f.iter().chain(&out.b) {
            assert!(t.normal().dot(&tri.normal()) > 0.0);
        }
    }

    #[test]
    fn test_vertex_on_plane_splits_into_two() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, 1.0),
        );
        let out = split(&xy_plane(), &tri);
        assert_eq!((out.f.len(), out.b.len()), (1, 1));
    }
}
