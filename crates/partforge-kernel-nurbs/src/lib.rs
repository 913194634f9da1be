#![warn(missing_docs)]

//! B-spline evaluation for the partforge kernel.
//!
//! Basis functions use the recursive Cox–de Boor definition:
//!
//! ```text
//! N(i,0)(t) = 1 if k[i] <= t < k[i+1], else 0
//! N(i,p)(t) = (t - k[i]) / (k[i+p] - k[i]) * N(i,p-1)(t)
//!           + (k[i+p+1] - t) / (k[i+p+1] - k[i+1]) * N(i+1,p-1)(t)
//! ```
//!
//! with `0/0` terms taken as zero. Curves and surfaces only sum the
//! `degree + 1` basis functions that are non-zero on the knot span
//! containing the parameter.

use partforge_kernel_math::{Point3, Vec3};
use thiserror::Error;

/// Errors constructing a B-spline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NurbsError {
    /// Fewer control points than `degree + 1`.
    #[error("degree {degree} needs at least {} control points, got {count}", .degree + 1)]
    TooFewControlPoints {
        /// Requested degree.
        degree: usize,
        /// Control points supplied.
        count: usize,
    },

    /// Knot vector length or ordering is wrong.
    #[error("invalid knot vector: {0}")]
    InvalidKnots(String),
}

// =============================================================================
// Knot vectors
// =============================================================================

fn validate_knots(knots: &[f64], n_points: usize, degree: usize) -> Result<(), NurbsError> {
    if knots.len() != n_points + degree + 1 {
        return Err(NurbsError::InvalidKnots(format!(
            "length {} but expected {} ({} points, degree {})",
            knots.len(),
            n_points + degree + 1,
            n_points,
            degree
        )));
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(NurbsError::InvalidKnots("knots must be non-decreasing".into()));
    }
    Ok(())
}

/// Clamped knot vector with uniform interior spacing on `[0, 1]`:
/// `degree + 1` zeros, evenly spaced interior knots, `degree + 1` ones.
pub fn clamped_uniform_knots(n_points: usize, degree: usize) -> Vec<f64> {
    let m = n_points + degree + 1;
    let interior = m.saturating_sub(2 * (degree + 1));
    let mut knots = Vec::with_capacity(m);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    knots.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

/// Split a knot vector into distinct values and their multiplicities.
///
/// Values closer than 1e-12 are treated as equal.
pub fn coalesce_knots(knots: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut values: Vec<f64> = Vec::new();
    let mut mults: Vec<usize> = Vec::new();
    for &k in knots {
        match values.last() {
            Some(&last) if (k - last).abs() < 1e-12 => {
                if let Some(m) = mults.last_mut() {
                    *m += 1;
                }
            }
            _ => {
                values.push(k);
                mults.push(1);
            }
        }
    }
    (values, mults)
}

/// Inverse of [`coalesce_knots`].
pub fn expand_knots(values: &[f64], multiplicities: &[usize]) -> Vec<f64> {
    values
        .iter()
        .zip(multiplicities)
        .flat_map(|(&v, &m)| std::iter::repeat(v).take(m))
        .collect()
}

/// Knot span index `i` with `knots[i] <= t < knots[i + 1]`, clamped to
/// `[degree, n_points - 1]`.
pub fn find_span(knots: &[f64], n_points: usize, degree: usize, t: f64) -> usize {
    let last = n_points - 1;
    if t >= knots[last + 1] {
        return last;
    }
    if t <= knots[degree] {
        return degree;
    }
    let (mut low, mut high) = (degree, last + 1);
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Cox–de Boor basis function `N(i, p)` at `t`.
pub fn basis(i: usize, p: usize, t: f64, knots: &[f64]) -> f64 {
    if p == 0 {
        return if knots[i] <= t && t < knots[i + 1] { 1.0 } else { 0.0 };
    }
    let mut value = 0.0;
    let left = knots[i + p] - knots[i];
    if left > 0.0 {
        value += (t - knots[i]) / left * basis(i, p - 1, t, knots);
    }
    let right = knots[i + p + 1] - knots[i + 1];
    if right > 0.0 {
        value += (knots[i + p + 1] - t) / right * basis(i + 1, p - 1, t, knots);
    }
    value
}

// =============================================================================
// Curves
// =============================================================================

/// A non-rational B-spline curve.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCurve {
    /// Control polygon.
    pub control_points: Vec<Point3>,
    /// Full knot vector, `control_points.len() + degree + 1` long.
    pub knots: Vec<f64>,
    /// Polynomial degree.
    pub degree: usize,
}

impl BSplineCurve {
    /// Create a curve, validating the knot vector.
    pub fn new(control_points: Vec<Point3>, knots: Vec<f64>, degree: usize) -> Result<Self, NurbsError> {
        if control_points.len() < degree + 1 {
            return Err(NurbsError::TooFewControlPoints {
                degree,
                count: control_points.len(),
            });
        }
        validate_knots(&knots, control_points.len(), degree)?;
        Ok(Self {
            control_points,
            knots,
            degree,
        })
    }

    /// Clamped uniform curve on `[0, 1]` using `points` as its control
    /// polygon. The degree drops to `points.len() - 1` when there are too
    /// few points for the requested degree.
    pub fn clamped(points: Vec<Point3>, degree: usize) -> Result<Self, NurbsError> {
        if points.len() < 2 {
            return Err(NurbsError::TooFewControlPoints {
                degree,
                count: points.len(),
            });
        }
        let degree = degree.min(points.len() - 1);
        let knots = clamped_uniform_knots(points.len(), degree);
        Self::new(points, knots, degree)
    }

    /// Parameter domain `[knots[p], knots[n]]`.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }

    /// Evaluate the curve at `t` (clamped to the domain).
    pub fn evaluate(&self, t: f64) -> Point3 {
        let (t0, t1) = self.domain();
        let t = t.clamp(t0, t1);
        let n = self.control_points.len();
        // The half-open indicator makes every basis function vanish at the
        // very end of a clamped domain.
        if t >= t1 {
            return self.control_points[n - 1];
        }
        let span = find_span(&self.knots, n, self.degree, t);
        let mut acc = Vec3::zeros();
        for i in span - self.degree..=span {
            acc += self.control_points[i].coords * basis(i, self.degree, t, &self.knots);
        }
        Point3::from(acc)
    }

    /// Tangent at `t` by central difference (not normalized).
    pub fn tangent(&self, t: f64) -> Vec3 {
        let (t0, t1) = self.domain();
        let h = (t1 - t0) * 1e-6;
        let a = (t - h).max(t0);
        let b = (t + h).min(t1);
        (self.evaluate(b) - self.evaluate(a)) / (b - a)
    }

    /// `count` points evenly spaced in parameter, end points included.
    pub fn sample(&self, count: usize) -> Vec<Point3> {
        let (t0, t1) = self.domain();
        let count = count.max(2);
        (0..count)
            .map(|i| self.evaluate(t0 + (t1 - t0) * i as f64 / (count - 1) as f64))
            .collect()
    }
}

// =============================================================================
// Surfaces
// =============================================================================

/// A non-rational tensor-product B-spline surface.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineSurface {
    /// Control net indexed `[u][v]`.
    pub control_points: Vec<Vec<Point3>>,
    /// Knot vector in u.
    pub u_knots: Vec<f64>,
    /// Knot vector in v.
    pub v_knots: Vec<f64>,
    /// Degree in u.
    pub u_degree: usize,
    /// Degree in v.
    pub v_degree: usize,
}

impl BSplineSurface {
    /// Create a surface, validating both knot vectors against the net.
    pub fn new(
        control_points: Vec<Vec<Point3>>,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
        u_degree: usize,
        v_degree: usize,
    ) -> Result<Self, NurbsError> {
        let nu = control_points.len();
        let nv = control_points.first().map_or(0, Vec::len);
        if nu < u_degree + 1 || nv < v_degree + 1 {
            return Err(NurbsError::TooFewControlPoints {
                degree: u_degree.max(v_degree),
                count: nu.min(nv),
            });
        }
        if control_points.iter().any(|row| row.len() != nv) {
            return Err(NurbsError::InvalidKnots("control net rows differ in length".into()));
        }
        validate_knots(&u_knots, nu, u_degree)?;
        validate_knots(&v_knots, nv, v_degree)?;
        Ok(Self {
            control_points,
            u_knots,
            v_knots,
            u_degree,
            v_degree,
        })
    }

    /// Evaluate at `(u, v)`; each parameter is clamped to its domain.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3 {
        // Evaluate each u-row as a curve in v, then the resulting column in u.
        let column: Vec<Point3> = self
            .control_points
            .iter()
            .map(|row| {
                BSplineCurve {
                    control_points: row.clone(),
                    knots: self.v_knots.clone(),
                    degree: self.v_degree,
                }
                .evaluate(v)
            })
            .collect();
        BSplineCurve {
            control_points: column,
            knots: self.u_knots.clone(),
            degree: self.u_degree,
        }
        .evaluate(u)
    }
}
