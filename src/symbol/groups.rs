//! Per-group feature computation over a normalized symbol.

use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{Line, Point, Vec2};

use super::Symbol;
use crate::config::{FeatureConfig, Grid, ANGULAR_PROBE_RADIUS, ASPECT_MIN_SPAN, PROBE_EXTENT};
use crate::layout::{FeatureGroup, FeatureValue};
use crate::stroke::{LineFeatures, ORIENTATIONS};

/// Crossing totals over the sub-probes of one band.
struct BandStats {
    total: usize,
    min_sum: f64,
    max_sum: f64,
}

impl Symbol {
    pub(super) fn group_values(
        &self,
        group: FeatureGroup,
        config: &FeatureConfig,
    ) -> Vec<FeatureValue> {
        match group {
            FeatureGroup::Crossings => self.crossings(config.crossings, config.sub_crossings),
            FeatureGroup::AngularCrossings => {
                self.angular_crossings(config.angular_crossings, config.angular_sub_crossings)
            }
            FeatureGroup::TraceCount => vec![FeatureValue::Scalar(self.strokes.len() as f64)],
            FeatureGroup::DistanceGrid => self.distance_grid(&config.distance_grids),
            FeatureGroup::LineFeatures => self.line_features(),
            FeatureGroup::ProjectionCdf => self.projection_cdf(config.projection_bins),
            FeatureGroup::Histogram2d => self.histogram_2d(&config.histogram_grids),
            FeatureGroup::Orientation => self.orientation(&config.orientation_grids),
            FeatureGroup::AspectRatio => vec![FeatureValue::Scalar(self.aspect_ratio())],
            FeatureGroup::PointAngular => {
                self.point_angular(config.angular_bins, config.angular_radius)
            }
            FeatureGroup::Subsegments => self.subsegments(),
            FeatureGroup::Eigen => self.eigen(),
            FeatureGroup::SizeRatio => vec![
                FeatureValue::Scalar(self.w_ratio),
                FeatureValue::Scalar(self.h_ratio),
            ],
        }
    }

    /// Crossings of every stroke with each probe line, measured by `measure`.
    ///
    /// A probe without crossings contributes `sentinel` to the minimum sum
    /// and `-sentinel` to the maximum sum.
    fn band_stats(
        &self,
        probes: impl Iterator<Item = Line>,
        measure: impl Fn(Line, Point) -> f64,
        sentinel: f64,
    ) -> BandStats {
        let mut stats = BandStats {
            total: 0,
            min_sum: 0.0,
            max_sum: 0.0,
        };
        for probe in probes {
            let (mut lo, mut hi) = (sentinel, -sentinel);
            for stroke in &self.strokes {
                for c in stroke.line_crossings(probe) {
                    let v = measure(probe, c);
                    lo = lo.min(v);
                    hi = hi.max(v);
                    stats.total += 1;
                }
            }
            stats.min_sum += lo;
            stats.max_sum += hi;
        }
        stats
    }

    // ── Crossings ─────────────────────────────────────────

    /// Horizontal then vertical bands: count, min, max per band.
    fn crossings(&self, bands: usize, sub: usize) -> Vec<FeatureValue> {
        let step = 2.0 / (bands + 1) as f64;
        let substep = step / (sub + 1) as f64;
        let offsets = |i: usize| {
            (1..=sub).map(move |k| -1.0 + (i as f64 - 0.5) * step + k as f64 * substep)
        };

        let band = |stats: BandStats| {
            let count = (stats.total as f64 * 2.0 / sub as f64).round() / 2.0;
            if stats.total > 0 {
                [count, stats.min_sum / sub as f64, stats.max_sum / sub as f64]
            } else {
                [count, PROBE_EXTENT, -PROBE_EXTENT]
            }
        };

        let mut horizontal = [Vec::new(), Vec::new(), Vec::new()];
        let mut vertical = [Vec::new(), Vec::new(), Vec::new()];
        for i in 1..=bands {
            let h = self.band_stats(
                offsets(i).map(|y| Line::new((-PROBE_EXTENT, y), (PROBE_EXTENT, y))),
                |_, c| c.x,
                PROBE_EXTENT,
            );
            let v = self.band_stats(
                offsets(i).map(|x| Line::new((x, -PROBE_EXTENT), (x, PROBE_EXTENT))),
                |_, c| c.y,
                PROBE_EXTENT,
            );
            for (slot, value) in horizontal.iter_mut().zip(band(h)) {
                slot.push(value);
            }
            for (slot, value) in vertical.iter_mut().zip(band(v)) {
                slot.push(value);
            }
        }
        horizontal
            .into_iter()
            .chain(vertical)
            .map(FeatureValue::Vector)
            .collect()
    }

    /// Probes through the ink centroid in the first and second quadrant.
    fn angular_crossings(&self, bands: usize, sub: usize) -> Vec<FeatureValue> {
        let center = self.unique_point_centroid();
        let step = FRAC_PI_2 / (bands + 1) as f64;
        let substep = step / (sub + 1) as f64;

        // [quadrant][count, min, max]
        let mut out: [[Vec<f64>; 3]; 2] = Default::default();
        for i in 1..=bands {
            for (r, quadrant) in out.iter_mut().enumerate() {
                let probes = (1..=sub).map(|k| {
                    let angle = FRAC_PI_2 * r as f64 + (i as f64 - 0.5) * step + k as f64 * substep;
                    let reach = Vec2::from_angle(angle) * ANGULAR_PROBE_RADIUS;
                    Line::new(center + reach, center - reach)
                });
                let stats = self.band_stats(
                    probes,
                    |probe, c| c.distance(probe.p0) - ANGULAR_PROBE_RADIUS,
                    ANGULAR_PROBE_RADIUS,
                );
                let count = (stats.total as f64 / sub as f64).round();
                let (lo, hi) = if stats.total > 0 {
                    (stats.min_sum / sub as f64, stats.max_sum / sub as f64)
                } else {
                    (ANGULAR_PROBE_RADIUS, -ANGULAR_PROBE_RADIUS)
                };
                quadrant[0].push(count);
                quadrant[1].push(lo);
                quadrant[2].push(hi);
            }
        }
        out.into_iter()
            .flatten()
            .map(FeatureValue::Vector)
            .collect()
    }

    /// Mean of the distinct points of all strokes.
    fn unique_point_centroid(&self) -> Point {
        let mut unique: Vec<Point> = Vec::new();
        for stroke in &self.strokes {
            for &p in stroke.points() {
                if !unique.contains(&p) {
                    unique.push(p);
                }
            }
        }
        mean_point(&unique).unwrap_or(Point::ZERO)
    }

    // ── Distances & shape ─────────────────────────────────

    /// Min, max and mean distance from each grid cell center to the ink.
    fn distance_grid(&self, grids: &[Grid]) -> Vec<FeatureValue> {
        let count = self.point_count() as f64;
        let mut out = Vec::new();
        for &(rows, cols) in grids {
            let step_x = 2.0 / cols as f64;
            let step_y = 2.0 / rows as f64;
            for x in 0..cols {
                for y in 0..rows {
                    let center = Point::new(
                        -1.0 + step_x * (x as f64 + 0.5),
                        -1.0 + step_y * (y as f64 + 0.5),
                    );
                    let (mut lo, mut hi, mut sum) = (f64::INFINITY, 0.0f64, 0.0);
                    for p in self.strokes.iter().flat_map(|s| s.points()) {
                        let d = p.distance(center);
                        lo = lo.min(d);
                        hi = hi.max(d);
                        sum += d;
                    }
                    out.extend([lo, hi, sum / count]);
                }
            }
        }
        vec![FeatureValue::Vector(out)]
    }

    /// Summed turn, length and sharp points, then their per-stroke averages.
    fn line_features(&self) -> Vec<FeatureValue> {
        let total = self
            .strokes
            .iter()
            .map(|s| s.line_cumulative_features())
            .fold(LineFeatures::default(), |acc, f| LineFeatures {
                turn: acc.turn + f.turn,
                length: acc.length + f.length,
                sharp_points: acc.sharp_points + f.sharp_points,
            });
        let n = self.strokes.len() as f64;
        let sums = total.to_array();
        vec![
            FeatureValue::Vector(sums.to_vec()),
            FeatureValue::Vector(sums.iter().map(|v| v / n).collect()),
        ]
    }

    /// Cumulative x and y projections, without the final (always 1) bin.
    fn projection_cdf(&self, bins: usize) -> Vec<FeatureValue> {
        let mut horizontal = vec![0.0; bins];
        let mut vertical = vec![0.0; bins];
        for stroke in &self.strokes {
            let (h, v) = stroke.histograms(bins);
            add_into(&mut horizontal, &h);
            add_into(&mut vertical, &v);
        }
        let count = self.point_count() as f64;
        let cdf = |hist: Vec<f64>| -> Vec<f64> {
            hist.iter()
                .take(bins.saturating_sub(1))
                .scan(0.0, |acc, v| {
                    *acc += v / count;
                    Some(*acc)
                })
                .collect()
        };
        vec![
            FeatureValue::Vector(cdf(horizontal)),
            FeatureValue::Vector(cdf(vertical)),
        ]
    }

    /// Bilinear occupancy per grid, as a share of all points.
    fn histogram_2d(&self, grids: &[Grid]) -> Vec<FeatureValue> {
        let count = self.point_count() as f64;
        grids
            .iter()
            .map(|&(rows, cols)| {
                let mut cells = vec![0.0; rows * cols];
                for stroke in &self.strokes {
                    let grid = stroke.histogram_2d(rows, cols);
                    add_into(&mut cells, &grid.concat());
                }
                FeatureValue::Vector(cells.into_iter().map(|v| v / count).collect())
            })
            .collect()
    }

    /// Orientation energy per grid, strokes weighted by their length share.
    fn orientation(&self, grids: &[Grid]) -> Vec<FeatureValue> {
        grids
            .iter()
            .map(|&(rows, cols)| {
                let mut cells = vec![0.0; rows * cols * ORIENTATIONS];
                let per_stroke: Vec<(Vec<f64>, f64)> =
                    self.strokes.iter().map(|s| s.gabor(rows, cols)).collect();
                let total: f64 = per_stroke.iter().map(|(_, len)| len).sum();
                if total > 0.0 {
                    for (dist, len) in &per_stroke {
                        let w = len / total;
                        for (cell, v) in cells.iter_mut().zip(dist) {
                            *cell += v * w;
                        }
                    }
                } else {
                    log::debug!("symbol {}: no ink length, orientation left at zero", self.id);
                }
                FeatureValue::Vector(cells)
            })
            .collect()
    }

    /// `w/h - 1` when wider than tall, `-(h/w - 1)` otherwise.
    fn aspect_ratio(&self) -> f64 {
        let b = self.bounds();
        let w = b.width().max(ASPECT_MIN_SPAN);
        let h = b.height().max(ASPECT_MIN_SPAN);
        if w > h {
            w / h - 1.0
        } else {
            -(h / w - 1.0)
        }
    }

    // ── Point distributions ───────────────────────────────

    /// Soft radial/angular histogram of all points around the sharp-point
    /// centroid, followed by that centroid.
    fn point_angular(&self, bins: usize, radius: f64) -> Vec<FeatureValue> {
        let sharp: Vec<Point> = self
            .strokes
            .iter()
            .flat_map(|s| s.sharp_points().unwrap_or_default())
            .map(|sp| sp.point)
            .collect();
        let center = mean_point(&sharp).unwrap_or_else(|| {
            log::debug!("symbol {}: no sharp points, centering on origin", self.id);
            Point::ZERO
        });

        let mut distribution = vec![0.0; 1 + bins];
        let point_w = 1.0 / self.point_count() as f64;
        let divisor = 2.0 * PI / bins as f64;
        for p in self.strokes.iter().flat_map(|s| s.points()) {
            let offset = *p - center;
            let w0 = 1.0 - offset.hypot().min(radius) / radius;

            let ang = (offset.atan2() + PI) / divisor;
            let base = ang.floor();
            let r0 = (base as usize) % bins;
            let r1 = (r0 + 1) % bins;
            let wr0 = ang - base;

            distribution[0] += w0 * point_w;
            distribution[1 + r0] += (1.0 - w0) * wr0 * point_w;
            distribution[1 + r1] += (1.0 - w0) * (1.0 - wr0) * point_w;
        }
        vec![
            FeatureValue::Vector(distribution),
            FeatureValue::Scalar(center.x),
            FeatureValue::Scalar(center.y),
        ]
    }

    /// Top and bottom rows of the positional orientation distribution.
    fn subsegments(&self) -> Vec<FeatureValue> {
        let mut straight = 0.0;
        let mut curve = 0.0;
        let mut rows = [[0.0; ORIENTATIONS]; 2];
        for stroke in &self.strokes {
            let info = stroke.subsegment_info();
            straight += info.straight_length;
            curve += info.curve_length;
            for (row, src) in rows.iter_mut().zip(&info.orientation) {
                add_into(row, src);
            }
        }
        let total = straight + curve;
        if straight > 0.0 {
            for v in rows.iter_mut().flatten() {
                *v /= total;
            }
        }
        rows.iter()
            .map(|row| FeatureValue::Vector(row.to_vec()))
            .collect()
    }

    /// Population variance of x and y and their covariance.
    fn eigen(&self) -> Vec<FeatureValue> {
        let points: Vec<Point> = self
            .strokes
            .iter()
            .flat_map(|s| s.points().iter().copied())
            .collect();
        let Some(mean) = mean_point(&points) else {
            return vec![FeatureValue::Vector(vec![0.0; 3])];
        };
        let n = points.len() as f64;
        let (mut var_x, mut var_y, mut cov) = (0.0, 0.0, 0.0);
        for p in &points {
            let d = *p - mean;
            var_x += d.x * d.x;
            var_y += d.y * d.y;
            cov += d.x * d.y;
        }
        vec![FeatureValue::Vector(vec![var_x / n, var_y / n, cov / n])]
    }
}

fn mean_point(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    Some((sum / points.len() as f64).to_point())
}

fn add_into(acc: &mut [f64], values: &[f64]) {
    for (a, v) in acc.iter_mut().zip(values) {
        *a += v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use crate::symbol::Label;

    fn normalized(strokes: &[&[(f64, f64)]]) -> Symbol {
        let strokes = strokes
            .iter()
            .enumerate()
            .map(|(i, xy)| Stroke::from_xy(i as u32, xy).unwrap())
            .collect();
        let mut s = Symbol::new(0, strokes, Label::Unknown).unwrap();
        s.normalize();
        s
    }

    fn flat(values: Vec<FeatureValue>) -> Vec<f64> {
        crate::layout::flatten(values)
    }

    #[test]
    fn single_horizontal_band_crossing() {
        // One band: the vertical probes around x = 0 all cross once.
        let s = normalized(&[&[(-1.0, 0.0), (1.0, 0.0)]]);
        let v = flat(s.crossings(1, 3));
        // h: count, min, max; v: count, min, max
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], 0.0);
        assert_eq!((v[1], v[2]), (PROBE_EXTENT, -PROBE_EXTENT));
        assert_eq!(v[3], 1.0);
        assert!(v[4].abs() < 1e-12 && v[5].abs() < 1e-12);
    }

    #[test]
    fn crossing_count_rounds_to_halves() {
        // A "V" is crossed twice by every horizontal probe.
        let s = normalized(&[&[(-1.0, 1.0), (0.0, -1.0), (1.0, 1.0)]]);
        let v = flat(s.crossings(3, 9));
        let h_counts = &v[0..3];
        assert!(h_counts.iter().all(|&c| c == 2.0));
        let h_min = &v[3..6];
        assert!(h_min.iter().all(|&x| x < 0.0));
    }

    #[test]
    fn aspect_of_horizontal_line() {
        let s = normalized(&[&[(0.0, 5.0), (10.0, 5.0)]]);
        assert!((s.aspect_ratio() - 199.0).abs() < 1e-9);
        let s = normalized(&[&[(5.0, 0.0), (5.0, 10.0)]]);
        assert!((s.aspect_ratio() + 199.0).abs() < 1e-9);
    }

    #[test]
    fn eigen_of_diagonal() {
        let s = normalized(&[&[(0.0, 0.0), (1.0, 1.0)]]);
        let v = flat(s.eigen());
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!((v[1] - 1.0).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_2d_sums_to_one() {
        let s = normalized(&[&[(0.0, 0.0), (3.0, 1.0)], &[(1.0, 2.0), (2.0, 0.5), (0.5, 0.5)]]);
        let v = flat(s.histogram_2d(&[(5, 5), (2, 3)]));
        assert_eq!(v.len(), 31);
        let first: f64 = v[..25].iter().sum();
        let second: f64 = v[25..].iter().sum();
        assert!((first - 1.0).abs() < 1e-12);
        assert!((second - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orientation_weights_by_length() {
        let s = normalized(&[&[(-1.0, 0.0), (1.0, 0.0)], &[(0.0, -1.0), (0.0, 1.0)]]);
        let v = flat(s.orientation(&[(1, 1)]));
        assert_eq!(v.len(), 4);
        let total: f64 = v.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        // Horizontal stroke: bin 0; vertical stroke: bin 2.
        assert!((v[0] - 0.5).abs() < 1e-12);
        assert!((v[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn line_features_average_over_strokes() {
        let s = normalized(&[&[(-1.0, 0.0), (1.0, 0.0)], &[(0.0, -1.0), (0.0, 1.0)]]);
        let v = flat(s.line_features());
        assert_eq!(v.len(), 6);
        assert!((v[1] - 4.0).abs() < 1e-12);
        assert!((v[4] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn projection_cdf_is_monotone() {
        let s = normalized(&[&[(0.0, 0.0), (1.0, 2.0), (2.0, 1.0), (3.0, 3.0)]]);
        let v = flat(s.projection_cdf(8));
        assert_eq!(v.len(), 14);
        for half in v.chunks(7) {
            assert!(half.windows(2).all(|w| w[0] <= w[1]));
            assert!(half[6] <= 1.0);
        }
    }

    #[test]
    fn point_angular_sums_to_one() {
        let mut s = normalized(&[&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 1.0)]]);
        for stroke in &mut s.strokes {
            stroke.apply_smoothing();
        }
        let v = flat(s.point_angular(8, 0.4));
        assert_eq!(v.len(), 11);
        let mass: f64 = v[..9].iter().sum();
        assert!((mass - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distance_grid_of_single_point() {
        let s = normalized(&[&[(0.0, 0.0)]]);
        let v = flat(s.distance_grid(&[(1, 1)]));
        // The single point sits at the origin, the only cell center.
        assert_eq!(v.len(), 3);
        assert!(v.iter().all(|d| d.abs() < 1e-9));
    }

    #[test]
    fn subsegments_of_straight_stroke() {
        let s = normalized(&[&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]]);
        let v = flat(s.subsegments());
        assert_eq!(v.len(), 8);
        let total: f64 = v.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
