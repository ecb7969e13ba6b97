//! Single-stroke preprocessing: dedupe → resample → smooth.
//!
//! The resampling and smoothing steps follow Huang, Zhang & Kechadi,
//! "Preprocessing Techniques for Online Handwriting Recognition":
//! points are first spread at a uniform arc-length step, then corners
//! ("sharp points") are detected, terminal hooks dropped, and the curve is
//! re-drawn through the corners with Catmull-Rom splines.

use super::{SharpPoint, Stroke};
use crate::config::{
    DUPLICATE_SCAN_RATIO, HOOK_ANGLE, HOOK_LENGTH_RATIO, RESAMPLE_SPACING_RATIO,
    SHARP_POINT_ANGLE, SPLINE_SUBDIVISIONS,
};
use crate::geom::{angular_difference, catmull_rom, diagonal, slope_angle};

impl Stroke {
    /// Run the full preprocessing sequence.
    ///
    /// Dedupe, resample to uniform spacing, smooth through the sharp points,
    /// and dedupe again if interpolation produced coincident points.
    pub fn preprocess(&mut self) {
        let raw = self.len();
        self.remove_duplicated_points();
        self.add_missing_points();
        let resampled = self.len();
        self.apply_smoothing();
        if self.has_duplicated_points() {
            self.remove_duplicated_points();
        }
        log::debug!(
            "stroke {}: {} raw → {} resampled → {} smoothed points, {} sharp",
            self.id,
            raw,
            resampled,
            self.len(),
            self.sharp_points.as_ref().map_or(0, Vec::len),
        );
    }

    /// Delete points that exactly repeat a nearby earlier point.
    ///
    /// For each point the scan moves forward until a point lies farther
    /// than a tenth of the stroke diagonal; equal points met on the way are
    /// removed. Sharp-point indices are moved onto the surviving points.
    pub fn remove_duplicated_points(&mut self) {
        let threshold = diagonal(self.bounds) * DUPLICATE_SCAN_RATIO;
        let mut removed = 0usize;

        let mut i = 0;
        while i < self.points.len() {
            let mut j = i + 1;
            while j < self.points.len() {
                if self.distance(i, j) > threshold {
                    break;
                }
                if self.points[i] == self.points[j] {
                    self.points.remove(j);
                    self.shift_sharp_indices(j, i);
                    removed += 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }

        if removed > 0 {
            self.refresh_bounds();
        }
    }

    /// Resample the stroke at a uniform arc-length step.
    ///
    /// The step is 0.95 × the mean distance between points. Intermediate
    /// points skipped over by a step are removed; the first and last points
    /// are always kept.
    pub fn add_missing_points(&mut self) {
        self.remove_duplicated_points();

        let n = self.points.len();
        if n < 2 {
            return;
        }
        let total: f64 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let step = RESAMPLE_SPACING_RATIO * total / n as f64;
        if step <= 0.0 {
            return;
        }

        let mut i = 0;
        while i + 1 < self.points.len() {
            // Walk forward until the segment (i+n-1, i+n) contains the step mark.
            let mut n = 1;
            let mut length = self.distance(i, i + 1);
            let mut sum = 0.0;
            while sum + length < step && i + n + 1 < self.points.len() {
                n += 1;
                sum += length;
                length = self.distance(i + n - 1, i + n);
            }

            let weight = if length > 0.0 { (step - sum) / length } else { 1.0 };
            if weight < 1.0 {
                let inserted = self.points[i + n - 1].lerp(self.points[i + n], weight);
                // Rounding can land the new point on the next one.
                if inserted != self.points[i + n] {
                    self.points.insert(i + n, inserted);
                }
            }

            // Drop everything strictly between i and the next kept point.
            self.points.drain(i + 1..i + n);
            i += 1;
        }

        self.sharp_points = None;
        self.segments = None;
        self.refresh_bounds();
    }

    /// Detect corners along the stroke.
    ///
    /// A point is sharp when the writing direction reverses its rotation
    /// there, or when its direction differs from the direction at the last
    /// sharp point by at least pi/8. The first and last points are always
    /// sharp, so a two-point stroke yields both of its points.
    pub fn find_sharp_points(&self) -> Vec<SharpPoint> {
        let n = self.points.len();
        let mut sharp = vec![SharpPoint {
            index: 0,
            point: self.points[0],
        }];
        if n < 2 {
            return sharp;
        }

        let alpha: Vec<f64> = self
            .points
            .windows(2)
            .map(|w| slope_angle(w[0], w[1]))
            .collect();

        // theta[k] = alpha[k] - alpha[k + 1], defined for k < n - 2.
        let theta: Vec<f64> = alpha.windows(2).map(|w| w[0] - w[1]).collect();

        for k in 1..n - 1 {
            let mut add = false;

            if k < theta.len() && theta[k] != 0.0 {
                let previous = theta[k - 1];
                if previous != 0.0 && theta[k] * previous <= 0.0 {
                    add = true;
                }
            }

            let last = sharp[sharp.len() - 1].index;
            if angular_difference(alpha[last], alpha[k]) >= SHARP_POINT_ANGLE {
                add = true;
            }

            if add {
                sharp.push(SharpPoint {
                    index: k,
                    point: self.points[k],
                });
            }
        }

        sharp.push(SharpPoint {
            index: n - 1,
            point: self.points[n - 1],
        });
        sharp
    }

    /// Drop short, sharply turning sharp points at either end.
    ///
    /// Only applies with four or more sharp points. An end is a hook when
    /// its outermost segment turns more than pi/4 against the next one and
    /// is shorter than 7% of the stroke diagonal.
    pub fn remove_hooks(&self, sharp: &mut Vec<SharpPoint>) {
        if sharp.len() < 4 {
            return;
        }
        let limit = HOOK_LENGTH_RATIO * diagonal(self.bounds);
        let m = sharp.len();

        let begin_turn = angular_difference(
            slope_angle(sharp[0].point, sharp[1].point),
            slope_angle(sharp[1].point, sharp[2].point),
        );
        let begin_length = self.distance(sharp[0].index, sharp[1].index);

        let end_turn = angular_difference(
            slope_angle(sharp[m - 1].point, sharp[m - 2].point),
            slope_angle(sharp[m - 2].point, sharp[m - 3].point),
        );
        let end_length = self.distance(sharp[m - 1].index, sharp[m - 2].index);

        if end_turn > HOOK_ANGLE && end_length < limit {
            log::debug!("stroke {}: removing end hook", self.id);
            sharp.pop();
        }
        if begin_turn > HOOK_ANGLE && begin_length < limit {
            log::debug!("stroke {}: removing start hook", self.id);
            sharp.remove(0);
        }
    }

    /// Replace the points by a spline through the (hook-free) sharp points.
    pub fn apply_smoothing(&mut self) {
        let mut sharp = self.find_sharp_points();
        self.remove_hooks(&mut sharp);
        self.spline_resample(&sharp, SPLINE_SUBDIVISIONS);
    }

    /// Redraw the stroke through `sharp`.
    ///
    /// Each span between consecutive sharp points gets
    /// `index_gap * subdivisions - 1` new points. The first and last spans
    /// are straight; inner spans use Catmull-Rom over the four surrounding
    /// sharp points. A single sharp point collapses the stroke onto it.
    pub fn spline_resample(&mut self, sharp: &[SharpPoint], subdivisions: usize) {
        let Some(first) = sharp.first() else {
            return;
        };
        let m = sharp.len();

        let mut points = Vec::new();
        let mut corners = Vec::with_capacity(m);
        if m == 1 {
            points.push(first.point);
            corners.push(SharpPoint {
                index: 0,
                point: first.point,
            });
        }

        for i in 0..m.saturating_sub(1) {
            corners.push(SharpPoint {
                index: points.len(),
                point: sharp[i].point,
            });
            points.push(sharp[i].point);

            let inner = sharp[i + 1].index.saturating_sub(sharp[i].index).max(1) * subdivisions;
            let t_step = 1.0 / inner as f64;
            let (a, b) = (sharp[i].point, sharp[i + 1].point);
            for k in 1..inner {
                let t = t_step * k as f64;
                let p = if i == 0 || i == m - 2 {
                    a.lerp(b, t)
                } else {
                    catmull_rom(sharp[i - 1].point, a, b, sharp[i + 2].point, t)
                };
                points.push(p);
            }
        }
        if m > 1 {
            let last = sharp[m - 1].point;
            corners.push(SharpPoint {
                index: points.len(),
                point: last,
            });
            points.push(last);
        }

        self.points = points;
        self.sharp_points = Some(corners);
        self.segments = None;
        self.refresh_bounds();
    }

    /// Keep sharp-point indices valid after point `removed` was deleted as a
    /// duplicate of point `kept`.
    fn shift_sharp_indices(&mut self, removed: usize, kept: usize) {
        if let Some(sharp) = &mut self.sharp_points {
            for s in sharp.iter_mut() {
                if s.index == removed {
                    s.index = kept;
                } else if s.index > removed {
                    s.index -= 1;
                }
            }
            sharp.dedup_by_key(|s| s.index);
        }
        self.segments = None;
    }
}
