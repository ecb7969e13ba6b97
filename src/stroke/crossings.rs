//! Intersections between a stroke's polyline and probe lines.

use kurbo::{Line, Point};

use super::Stroke;

/// Summary of the crossings between a stroke and one probe line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingInfo {
    pub count: usize,
    /// Mean crossing position, or the probe midpoint without crossings.
    pub mean: Point,
    /// Crossing closest to the probe start (`line.p1` without crossings).
    pub closest: Point,
    /// Crossing farthest from the probe start (`line.p0` without crossings).
    pub farthest: Point,
}

impl Stroke {
    /// All points where the polyline meets the segment `line`.
    ///
    /// Segments lying on the probe (colinear overlap) report their midpoint.
    /// The result is in polyline order but callers should not rely on it.
    pub fn line_crossings(&self, line: Line) -> Vec<Point> {
        let (l0, l1) = (line.p0, line.p1);
        let (x_min, x_max) = (l0.x.min(l1.x), l0.x.max(l1.x));
        let (y_min, y_max) = (l0.y.min(l1.y), l0.y.max(l1.y));

        let b = self.bounds;
        if !(b.x0 < x_max && b.x1 > x_min && b.y0 < y_max && b.y1 > y_min) {
            return Vec::new();
        }
        if l0 == l1 {
            return Vec::new();
        }

        let mut crossings = Vec::new();
        if l0.x != l1.x {
            let l_m = (l1.y - l0.y) / (l1.x - l0.x);
            let l_b = l0.y - l_m * l0.x;

            for seg in self.points.windows(2) {
                let (s0, s1) = (seg[0], seg[1]);
                if s0.x == s1.x {
                    if x_min <= s0.x && s0.x <= x_max {
                        let y = s0.x * l_m + l_b;
                        if s0.y.min(s1.y) <= y && y <= s0.y.max(s1.y) {
                            crossings.push(Point::new(s0.x, y));
                        }
                    }
                    continue;
                }

                let s_m = (s1.y - s0.y) / (s1.x - s0.x);
                let s_b = s0.y - s_m * s0.x;
                if s_m == l_m {
                    // Parallel: only the same line with overlapping ranges meets.
                    if l_b == s_b && x_min <= s0.x.max(s1.x) && s0.x.min(s1.x) <= x_max {
                        crossings.push(s0.midpoint(s1));
                    }
                } else {
                    let x = (s_b - l_b) / (l_m - s_m);
                    let y = x * l_m + l_b;
                    if x_min <= x && x <= x_max && s0.x.min(s1.x) <= x && x <= s0.x.max(s1.x) {
                        crossings.push(Point::new(x, y));
                    }
                }
            }
        } else {
            // Vertical probe: no slope, intersect each segment at x = l0.x.
            let x = l0.x;
            for seg in self.points.windows(2) {
                let (s0, s1) = (seg[0], seg[1]);
                if s0.x == s1.x {
                    if s0.x == x && s0.y.min(s1.y) < y_max && y_min < s0.y.max(s1.y) {
                        crossings.push(s0.midpoint(s1));
                    }
                } else if s0.x.min(s1.x) <= x && x <= s0.x.max(s1.x) {
                    let s_m = (s1.y - s0.y) / (s1.x - s0.x);
                    let s_b = s0.y - s_m * s0.x;
                    let y = x * s_m + s_b;
                    if y_min <= y && y <= y_max {
                        crossings.push(Point::new(x, y));
                    }
                }
            }
        }
        crossings
    }

    /// Count, mean, closest and farthest crossing along `line`.
    pub fn crossing_info(&self, line: Line) -> CrossingInfo {
        let crossings = self.line_crossings(line);
        let Some(&first) = crossings.first() else {
            return CrossingInfo {
                count: 0,
                mean: line.p0.midpoint(line.p1),
                closest: line.p1,
                farthest: line.p0,
            };
        };

        let mut sum = Point::ZERO.to_vec2();
        let (mut closest, mut farthest) = (first, first);
        let start_dist = first.distance(line.p0);
        let (mut closest_dist, mut farthest_dist) = (start_dist, start_dist);
        for &c in &crossings {
            sum += c.to_vec2();
            let d = c.distance(line.p0);
            if d < closest_dist {
                closest_dist = d;
                closest = c;
            }
            if d > farthest_dist {
                farthest_dist = d;
                farthest = c;
            }
        }

        CrossingInfo {
            count: crossings.len(),
            mean: (sum / crossings.len() as f64).to_point(),
            closest,
            farthest,
        }
    }
}
