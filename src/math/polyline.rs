use super::{project_local, rot90, Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;

/// A piecewise linear curve, parameterised by arc length.
#[derive(Clone, Debug)]
pub struct Polyline2d {
    points: Vec<Point2d>,
    /// The arc length at each point.
    dists: Vec<f64>,
}

/// The result of sampling a [Polyline2d].
#[derive(Clone, Copy, Debug)]
pub struct PolylineSample {
    /// The point on the curve.
    pub pos: Point2d,
    /// The tangent unit vector of the curve.
    pub tan: Vector2d,
}

/// The result of projecting a point onto a [Polyline2d].
#[derive(Clone, Copy, Debug)]
pub struct PolylineProjection {
    /// The nearest point on the curve.
    pub pos: Point2d,
    /// The arc length of the nearest point.
    pub s: f64,
    /// The signed lateral offset of the point from the curve, positive to the left.
    pub lat: f64,
}

impl Polyline2d {
    /// Creates a polyline through the given points.
    /// Consecutive duplicate points are discarded.
    ///
    /// # Panics
    /// If fewer than two distinct points are given.
    pub fn new(points: impl IntoIterator<Item = Point2d>) -> Self {
        let points = points
            .into_iter()
            .dedup_by(|a, b| a.distance2(*b) < 1e-12)
            .collect::<Vec<_>>();
        if points.len() < 2 {
            panic!("Polyline must contain at least two distinct points");
        }

        let dists = std::iter::once(0.0)
            .chain(points.iter().tuple_windows().scan(0.0, |s, (a, b)| {
                *s += a.distance(*b);
                Some(*s)
            }))
            .collect();

        Self { points, dists }
    }

    /// The points defining the polyline.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The total arc length of the polyline.
    pub fn length(&self) -> f64 {
        self.dists[self.dists.len() - 1]
    }

    /// Samples the polyline at arc length `s`, which is clamped to the polyline's extents.
    pub fn sample(&self, s: f64) -> PolylineSample {
        let s = s.clamp(0.0, self.length());
        let idx = self
            .dists
            .iter()
            .skip(1)
            .position(|d| *d >= s)
            .unwrap_or(self.points.len() - 2);
        let (a, b) = (self.points[idx], self.points[idx + 1]);
        let tan = (b - a).normalize();
        PolylineSample {
            pos: a + tan * (s - self.dists[idx]),
            tan,
        }
    }

    /// Finds the point on the polyline nearest to `point`.
    /// When two segments are equally near, the earlier one wins.
    pub fn project(&self, point: Point2d) -> PolylineProjection {
        let mut best: Option<(f64, PolylineProjection)> = None;

        for (idx, (&a, &b)) in self.points.iter().tuple_windows().enumerate() {
            let seg_len = self.dists[idx + 1] - self.dists[idx];
            let tan = (b - a) / seg_len;
            let local = project_local(point, a, rot90(tan), tan);
            let along = local.y.clamp(0.0, seg_len);
            let pos = a + tan * along;
            let dist2 = pos.distance2(point);
            if best.map_or(true, |(d, _)| dist2 < d) {
                best = Some((
                    dist2,
                    PolylineProjection {
                        pos,
                        s: self.dists[idx] + along,
                        lat: local.x,
                    },
                ));
            }
        }

        // A polyline always has at least one segment
        best.map(|(_, proj)| proj).unwrap_or(PolylineProjection {
            pos: self.points[0],
            s: 0.0,
            lat: 0.0,
        })
    }

    /// The arc length remaining between the projection of `point` and the end of the polyline.
    pub fn remaining_length(&self, point: Point2d) -> f64 {
        f64::max(self.length() - self.project(point).s, 0.0)
    }

    /// Offsets every point of the polyline laterally, positive to the left.
    /// Interior points are mitred so that each offset segment stays `offset` from its
    /// own segment; sharp bends are limited to four times the offset.
    pub fn offset_points(&self, offset: f64) -> Vec<Point2d> {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let prev = self.points[i.saturating_sub(1)];
                let curr = self.points[i];
                let next = self.points[usize::min(i + 1, n - 1)];
                if i == 0 || i == n - 1 {
                    return curr + rot90((next - prev).normalize()) * offset;
                }
                let tan_in = (curr - prev).normalize();
                let tan_out = (next - curr).normalize();
                let sum = tan_in + tan_out;
                if sum.magnitude2() < 1e-12 {
                    // The polyline doubles back on itself
                    return curr + rot90(tan_in) * offset;
                }
                let bisector = sum.normalize();
                let cos_half = f64::max(bisector.dot(tan_in), 0.25);
                curr + rot90(bisector) * (offset / cos_half)
            })
            .collect()
    }
}
