//! Occupancy and orientation histograms over the normalized frame [-1, 1]².

use std::f64::consts::{FRAC_PI_4, PI};

use super::Stroke;
use crate::geom::slope_angle;

/// Number of canonical orientations (0°, 45°, 90°, 135°).
pub const ORIENTATIONS: usize = 4;

impl Stroke {
    /// Point counts of the x and y projections.
    ///
    /// `bins` bin centers are spread over [-1, 1]; the outermost bins hang
    /// half outside the frame.
    pub fn histograms(&self, bins: usize) -> (Vec<f64>, Vec<f64>) {
        let mut horizontal = vec![0.0; bins];
        let mut vertical = vec![0.0; bins];
        if bins < 2 {
            horizontal.fill(self.len() as f64);
            vertical.fill(self.len() as f64);
            return (horizontal, vertical);
        }

        let bin_size = 2.0 / (bins - 1) as f64;
        let start = -1.0 - bin_size * 0.5;
        let bin = |v: f64| (((v - start) / bin_size).floor().max(0.0) as usize).min(bins - 1);
        for p in &self.points {
            horizontal[bin(p.x)] += 1.0;
            vertical[bin(p.y)] += 1.0;
        }
        (horizontal, vertical)
    }

    /// Bilinear point occupancy on a `rows × cols` lattice over [-1, 1]².
    ///
    /// Indexed `[row][col]`; rows follow y. Both dimensions must be ≥ 2.
    pub fn histogram_2d(&self, rows: usize, cols: usize) -> Vec<Vec<f64>> {
        let mut grid = vec![vec![0.0; cols]; rows];
        if rows < 2 || cols < 2 {
            return grid;
        }
        for p in &self.points {
            let (c0, wx) = lattice_cell(p.x, cols);
            let (r0, wy) = lattice_cell(p.y, rows);
            grid[r0][c0] += (1.0 - wx) * (1.0 - wy);
            grid[r0][c0 + 1] += wx * (1.0 - wy);
            grid[r0 + 1][c0] += (1.0 - wx) * wy;
            grid[r0 + 1][c0 + 1] += wx * wy;
        }
        grid
    }

    /// Length-weighted orientation histogram, optionally spread over a grid.
    ///
    /// Each segment adds its share of the stroke length to the two nearest
    /// of the four canonical orientations. When `rows` or `cols` is at least
    /// 2, the segment midpoint also splats the energy bilinearly over the
    /// grid. Returns `rows * cols * 4` values (cell-major) and the stroke
    /// length.
    pub fn gabor(&self, rows: usize, cols: usize) -> (Vec<f64>, f64) {
        let mut distribution = vec![0.0; rows * cols * ORIENTATIONS];
        let length: f64 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
        if length <= 0.0 {
            return (distribution, length);
        }

        for seg in self.points.windows(2) {
            let weight = seg[0].distance(seg[1]) / length;
            let mid = seg[0].midpoint(seg[1]);

            let ys = axis_weights(mid.y, rows);
            let xs = axis_weights(mid.x, cols);

            let (p0, p1, w1) = orientation_bins(slope_angle(seg[0], seg[1]));
            let g0 = weight * (1.0 - w1);
            let g1 = weight * w1;

            for &(cy, wy) in &ys {
                for &(cx, wx) in &xs {
                    let cell = (cy * cols + cx) * ORIENTATIONS;
                    distribution[cell + p0] += g0 * wx * wy;
                    distribution[cell + p1] += g1 * wx * wy;
                }
            }
        }
        (distribution, length)
    }
}

/// Lower lattice index and weight of the upper neighbor for `v` in [-1, 1].
///
/// `cells` must be at least 2; the top edge maps to `(cells - 2, 1.0)`.
pub(crate) fn lattice_cell(v: f64, cells: usize) -> (usize, f64) {
    let pos = (v.clamp(-1.0, 1.0) + 1.0) / 2.0 * (cells - 1) as f64;
    let lower = (pos.floor() as usize).min(cells - 2);
    (lower, pos - lower as f64)
}

/// Orientation bin pair and weight of the second bin for a slope angle.
pub(crate) fn orientation_bins(angle: f64) -> (usize, usize, f64) {
    let p = (angle + PI) / FRAC_PI_4;
    let base = p.floor();
    let p0 = (base as i64).rem_euclid(ORIENTATIONS as i64) as usize;
    (p0, (p0 + 1) % ORIENTATIONS, p - base)
}

fn axis_weights(v: f64, cells: usize) -> Vec<(usize, f64)> {
    if cells >= 2 {
        let (c0, w1) = lattice_cell(v, cells);
        vec![(c0, 1.0 - w1), (c0 + 1, w1)]
    } else {
        vec![(0, 1.0)]
    }
}
