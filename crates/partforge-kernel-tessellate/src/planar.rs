//! Planar face triangulation.

use partforge_kernel_math::{perpendicular, direction, Point3, Vec3};

use crate::Triangle;

/// Triangulate a planar face from its loops (outer first), wound about
/// the outward `normal`.
pub(crate) fn tessellate_planar(loops: &[Vec<Point3>], normal: &Vec3) -> Vec<Triangle> {
    match loops {
        [] => Vec::new(),
        [outer] => polygon(outer, normal),
        [outer, inner] => stitch_rings(outer, inner, normal),
        [outer, ..] => {
            tracing::warn!(holes = loops.len() - 1, "planar face with several holes, filling outer loop only");
            polygon(outer, normal)
        }
    }
}

fn newell(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n += p.coords.cross(&q.coords);
    }
    n
}

/// Copy of `points` running counter-clockwise about `normal`.
fn ccw(points: &[Point3], normal: &Vec3) -> Vec<Point3> {
    let mut out = points.to_vec();
    if newell(&out).dot(normal) < 0.0 {
        out.reverse();
    }
    out
}

fn is_convex(points: &[Point3], normal: &Vec3) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        let (a, b, c) = (points[(i + n - 1) % n], points[i], points[(i + 1) % n]);
        (b - a).cross(&(c - b)).dot(normal) >= -1e-12
    })
}

/// Simple polygon: a fan from the first vertex when convex, ear
/// clipping otherwise.
fn polygon(points: &[Point3], normal: &Vec3) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }
    let points = ccw(points, normal);
    if is_convex(&points, normal) {
        return (1..points.len() - 1)
            .map(|i| Triangle::new(points[0], points[i], points[i + 1]))
            .collect();
    }

    let axis = direction(*normal);
    let u = perpendicular(&axis).into_inner();
    let v = axis.cross(&u);
    let flat: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.coords.dot(&u), p.coords.dot(&v)))
        .collect();
    ear_clip(&flat)
        .into_iter()
        .map(|[a, b, c]| Triangle::new(points[a], points[b], points[c]))
        .collect()
}

/// Twice the signed area of triangle `abc`.
fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Ear clipping of a counter-clockwise 2D polygon, returning index triples.
/// Collinear vertices are dropped, so no triple has zero area.
fn ear_clip(verts: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..verts.len()).collect();
    let mut out = Vec::with_capacity(verts.len().saturating_sub(2));
    let corner = |remaining: &[usize], i: usize| {
        let n = remaining.len();
        (
            verts[remaining[(i + n - 1) % n]],
            verts[remaining[i]],
            verts[remaining[(i + 1) % n]],
        )
    };

    while remaining.len() > 3 {
        if let Some(i) = (0..remaining.len()).find(|&i| {
            let (a, b, c) = corner(&remaining, i);
            cross(a, b, c).abs() <= COLLINEAR_EPS
        }) {
            remaining.remove(i);
            continue;
        }

        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let (prev, next) = ((i + n - 1) % n, (i + 1) % n);
            let (a, b, c) = corner(&remaining, i);
            cross(a, b, c) > 0.0
                && (0..n)
                    .filter(|&j| j != prev && j != i && j != next)
                    .all(|j| !point_in_triangle(verts[remaining[j]], a, b, c))
        });
        let Some(i) = ear else {
            // Self-intersecting remainder: fan what is left.
            break;
        };
        out.push([remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]]);
        remaining.remove(i);
    }
    for i in 1..remaining.len().saturating_sub(1) {
        let tri = [remaining[0], remaining[i], remaining[i + 1]];
        if cross(verts[tri[0]], verts[tri[1]], verts[tri[2]]).abs() > COLLINEAR_EPS {
            out.push(tri);
        }
    }
    out
}

const COLLINEAR_EPS: f64 = 1e-12;

/// Whether `p` lies inside or on the boundary of `abc`. Points that
/// coincide with a corner do not count.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let same = |q: (f64, f64)| (p.0 - q.0).abs() < 1e-12 && (p.1 - q.1).abs() < 1e-12;
    if same(a) || same(b) || same(c) {
        return false;
    }
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (p.0 - a.0, p.1 - a.1);

    let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
    let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
    let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
    let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
    let dot12 = v1.0 * v2.0 + v1.1 * v2.1;

    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    let eps = 1e-10;
    u >= -eps && v >= -eps && (u + v) <= 1.0 + eps
}

/// Fill the region between an outer ring and one hole by walking both
/// rings in step. Equal point counts with aligned starts give the usual
/// quad strip split into triangles.
fn stitch_rings(outer: &[Point3], inner: &[Point3], normal: &Vec3) -> Vec<Triangle> {
    if outer.len() < 3 {
        return Vec::new();
    }
    if inner.len() < 3 {
        return polygon(outer, normal);
    }
    let outer = ccw(outer, normal);
    let mut inner = ccw(inner, normal);
    let nearest = (0..inner.len())
        .min_by(|&a, &b| (inner[a] - outer[0]).norm().total_cmp(&(inner[b] - outer[0]).norm()))
        .unwrap_or(0);
    inner.rotate_left(nearest);

    let (n, m) = (outer.len(), inner.len());
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(n + m);
    while i < n || j < m {
        let advance_outer = j == m || (i < n && (i + 1) as f64 / n as f64 <= (j + 1) as f64 / m as f64);
        if advance_outer {
            out.push(Triangle::new(outer[i], outer[(i + 1) % n], inner[j % m]));
            i += 1;
        } else {
            out.push(Triangle::new(outer[i % n], inner[(j + 1) % m], inner[j]));
            j += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64, z: f64) -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(size, 0.0, z),
            Point3::new(size, size, z),
            Point3::new(0.0, size, z),
        ]
    }

    fn area_along(tris: &[Triangle], normal: &Vec3) -> f64 {
        tris.iter().map(|t| t.normal().dot(normal) * t.area()).sum()
    }

    #[test]
    fn test_convex_fan() {
        let tris = tessellate_planar(&[square(2.0, 0.0)], &Vec3::z());
        assert_eq!(tris.len(), 2);
        assert!((area_along(&tris, &Vec3::z()) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_winding_follows_normal() {
        let tris = tessellate_planar(&[square(2.0, 0.0)], &-Vec3::z());
        assert!((area_along(&tris, &-Vec3::z()) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_concave_l_shape_ear_clipped() {
        let l = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let tris = tessellate_planar(&[l], &Vec3::z());
        assert_eq!(tris.len(), 4);
        assert!((area_along(&tris, &Vec3::z()) - 3.0).abs() < 1e-12);
        assert!(tris.iter().all(|t| t.normal().z > 0.0));
    }

    #[test]
    fn test_ear_clip_skips_collinear_vertices() {
        let u = [
            (0.0, 0.0),
            (1.5, 0.0),
            (3.0, 0.0),
            (3.0, 2.0),
            (2.0, 2.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ];
        let tris = ear_clip(&u);
        assert!(tris.iter().all(|&[a, b, c]| cross(u[a], u[b], u[c]) > COLLINEAR_EPS));
        let area: f64 = tris.iter().map(|&[a, b, c]| cross(u[a], u[b], u[c]) / 2.0).sum();
        assert!((area - 5.0).abs() < 1e-12);
        assert!(tris.iter().flatten().all(|&i| i != 1 && i != 9));
    }

    #[test]
    fn test_annulus_stitch() {
        let ring = |r: f64, n: usize, cw: bool| -> Vec<Point3> {
            (0..n)
                .map(|i| {
                    let a = std::f64::consts::TAU * i as f64 / n as f64 * if cw { -1.0 } else { 1.0 };
                    Point3::new(r * a.cos(), r * a.sin(), 0.0)
                })
                .collect()
        };
        let tris = tessellate_planar(&[ring(2.0, 64, false), ring(1.0, 64, true)], &Vec3::z());
        assert_eq!(tris.len(), 128);
        let expected = std::f64::consts::PI * 3.0;
        assert!((area_along(&tris, &Vec3::z()) - expected).abs() < expected * 0.01);
        assert!(tris.iter().all(|t| t.normal().z > 0.0));
    }

    #[test]
    fn test_stitch_uneven_rings() {
        let tris = tessellate_planar(
            &[
                square(4.0, 0.0),
                vec![
                    Point3::new(1.0, 1.0, 0.0),
                    Point3::new(1.0, 3.0, 0.0),
                    Point3::new(2.0, 3.0, 0.0),
                    Point3::new(3.0, 3.0, 0.0),
                    Point3::new(3.0, 1.0, 0.0),
                ],
            ],
            &Vec3::z(),
        );
        assert_eq!(tris.len(), 9);
        assert!((area_along(&tris, &Vec3::z()) - 12.0).abs() < 1e-9);
    }
}
