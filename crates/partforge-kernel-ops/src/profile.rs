//! Closed 2D profiles placed on a frame.

use std::f64::consts::TAU;

use partforge_kernel_math::{Frame, Point2, Point3, Vec2};

use crate::OperatorError;

/// One segment of a profile, in the profile frame's xy coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileSegment {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// Circular arc about `center`.
    Arc {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
        /// Arc center.
        center: Point2,
        /// Counter-clockwise from start to end.
        ccw: bool,
    },
}

impl ProfileSegment {
    /// Start point.
    pub fn start(&self) -> Point2 {
        match self {
            Self::Line { start, .. } | Self::Arc { start, .. } => *start,
        }
    }

    /// End point.
    pub fn end(&self) -> Point2 {
        match self {
            Self::Line { end, .. } | Self::Arc { end, .. } => *end,
        }
    }

    /// The same segment traversed end to start.
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line { start: end, end: start },
            Self::Arc {
                start,
                end,
                center,
                ccw,
            } => Self::Arc {
                start: end,
                end: start,
                center,
                ccw: !ccw,
            },
        }
    }

    /// Signed sweep of an arc in radians (positive counter-clockwise).
    /// A start equal to the end is a full circle.
    pub fn arc_sweep(&self) -> f64 {
        match *self {
            Self::Line { .. } => 0.0,
            Self::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let a0 = (start.y - center.y).atan2(start.x - center.x);
                let a1 = (end.y - center.y).atan2(end.x - center.x);
                let mut sweep = (a1 - a0).rem_euclid(TAU);
                if sweep < 1e-12 {
                    sweep = TAU;
                }
                if ccw {
                    sweep
                } else {
                    sweep - TAU
                }
            }
        }
    }

    /// Points along the segment excluding its end point. Arcs use
    /// `ceil(segments * |sweep| / 2π)` chords.
    fn points(&self, segments: usize) -> Vec<Point2> {
        match *self {
            Self::Line { start, .. } => vec![start],
            Self::Arc { start, center, .. } => {
                let sweep = self.arc_sweep();
                let r = (start - center).norm();
                let a0 = (start.y - center.y).atan2(start.x - center.x);
                let n = ((segments.max(4) as f64) * sweep.abs() / TAU).ceil().max(1.0) as usize;
                (0..n)
                    .map(|i| {
                        let a = a0 + sweep * i as f64 / n as f64;
                        center + Vec2::new(a.cos(), a.sin()) * r
                    })
                    .collect()
            }
        }
    }
}

/// A closed profile on a placement frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Placement; profile x/y map onto the frame's ref/y directions.
    pub frame: Frame,
    /// Segments, each starting where the previous ends.
    pub segments: Vec<ProfileSegment>,
}

impl Profile {
    /// Closed polygon through `points`.
    pub fn polygon(frame: Frame, points: &[Point2]) -> Self {
        let segments = (0..points.len())
            .map(|i| ProfileSegment::Line {
                start: points[i],
                end: points[(i + 1) % points.len()],
            })
            .collect();
        Self { frame, segments }
    }

    /// Axis-aligned rectangle centered on the frame origin.
    pub fn rectangle(frame: Frame, width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::polygon(
            frame,
            &[
                Point2::new(-hw, -hh),
                Point2::new(hw, -hh),
                Point2::new(hw, hh),
                Point2::new(-hw, hh),
            ],
        )
    }

    /// Circle of `radius` about `center`, as two half arcs.
    pub fn circle(frame: Frame, center: Point2, radius: f64) -> Self {
        let a = center + Vec2::new(radius, 0.0);
        let b = center - Vec2::new(radius, 0.0);
        Self {
            frame,
            segments: vec![
                ProfileSegment::Arc {
                    start: a,
                    end: b,
                    center,
                    ccw: true,
                },
                ProfileSegment::Arc {
                    start: b,
                    end: a,
                    center,
                    ccw: true,
                },
            ],
        }
    }

    /// Check that the segments chain end-to-start and close.
    pub fn validate(&self) -> Result<(), OperatorError> {
        if self.segments.is_empty() {
            return Err(OperatorError::TooFewVertices(0));
        }
        for (i, seg) in self.segments.iter().enumerate() {
            let next = &self.segments[(i + 1) % self.segments.len()];
            let gap = (seg.end() - next.start()).norm();
            if gap > 1e-6 {
                return Err(OperatorError::OpenProfile(gap));
            }
        }
        Ok(())
    }

    /// Discretized outline in profile coordinates, no repeated closing point.
    pub fn points_2d(&self, arc_segments: usize) -> Result<Vec<Point2>, OperatorError> {
        self.validate()?;
        let pts: Vec<Point2> = self
            .segments
            .iter()
            .flat_map(|s| s.points(arc_segments))
            .collect();
        if pts.len() < 3 {
            return Err(OperatorError::TooFewVertices(pts.len()));
        }
        Ok(pts)
    }

    /// Discretized outline in world coordinates.
    pub fn to_points(&self, arc_segments: usize) -> Result<Vec<Point3>, OperatorError> {
        Ok(self
            .points_2d(arc_segments)?
            .iter()
            .map(|p| self.frame.to_world(&Point3::new(p.x, p.y, 0.0)))
            .collect())
    }

    /// Signed area of the discretized outline (positive counter-clockwise).
    pub fn signed_area(&self, arc_segments: usize) -> Result<f64, OperatorError> {
        let pts = self.points_2d(arc_segments)?;
        let twice: f64 = (0..pts.len())
            .map(|i| {
                let (p, q) = (pts[i], pts[(i + 1) % pts.len()]);
                p.x * q.y - q.x * p.y
            })
            .sum();
        Ok(twice / 2.0)
    }
}
