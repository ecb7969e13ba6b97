//! Coarse decomposition of a stroke into straight and curved runs.

use super::histogram::{orientation_bins, ORIENTATIONS};
use super::Stroke;
use crate::config::{
    SANDWICH_MAX_SPAN, SANDWICH_TURN, STRAIGHT_MERGE_ANGLE, STRAIGHT_REMERGE_ANGLE,
};
use crate::geom::{signed_angular_difference, slope_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Straight,
    Curve,
}

/// A run of consecutive inter-point segments, `start..=end` point indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    /// Accumulated turn along the run.
    pub turn: f64,
    pub kind: SegmentKind,
    pub length: f64,
}

/// Lengths of straight/curved runs and a positional orientation histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsegmentInfo {
    pub straight_length: f64,
    pub curve_length: f64,
    /// Length per orientation, weighted by position: rows are
    /// top, bottom, left, right.
    pub orientation: [[f64; ORIENTATIONS]; 4],
}

impl Stroke {
    /// Classify the stroke into runs and keep them on the stroke.
    pub fn classify_segments(&mut self) -> &[Segment] {
        let (segments, _) = self.decompose();
        self.segments.insert(segments)
    }

    /// Straight/curve lengths and the positional orientation distribution.
    pub fn subsegment_info(&self) -> SubsegmentInfo {
        let (segments, slopes) = self.decompose();

        let mut info = SubsegmentInfo {
            straight_length: 0.0,
            curve_length: 0.0,
            orientation: [[0.0; ORIENTATIONS]; 4],
        };
        for seg in &segments {
            match seg.kind {
                SegmentKind::Straight => info.straight_length += seg.length,
                SegmentKind::Curve => info.curve_length += seg.length,
            }
        }

        for (i, pair) in self.points.windows(2).enumerate() {
            let length = pair[0].distance(pair[1]);
            let (p0, p1, w1) = orientation_bins(slopes[i]);
            let g0 = length * (1.0 - w1);
            let g1 = length * w1;

            let right = (pair[0].x + 1.0) / 2.0;
            let bottom = (pair[0].y + 1.0) / 2.0;
            for (row, w) in [(0, 1.0 - bottom), (1, bottom), (2, 1.0 - right), (3, right)] {
                info.orientation[row][p0] += g0 * w;
                info.orientation[row][p1] += g1 * w;
            }
        }
        info
    }

    /// Greedy merge of inter-point segments into straight and curved runs.
    ///
    /// Returns the runs and the per-segment slopes.
    fn decompose(&self) -> (Vec<Segment>, Vec<f64>) {
        let slopes: Vec<f64> = self
            .points
            .windows(2)
            .map(|w| slope_angle(w[0], w[1]))
            .collect();
        // turns[k] is the turn from segment k to segment k + 1.
        let turns: Vec<f64> = slopes
            .windows(2)
            .map(|w| signed_angular_difference(w[1], w[0]))
            .collect();

        let mut segments: Vec<Segment> = self
            .points
            .windows(2)
            .enumerate()
            .map(|(i, w)| Segment {
                start: i,
                end: i + 1,
                turn: 0.0,
                kind: SegmentKind::Curve,
                length: w[0].distance(w[1]),
            })
            .collect();

        // Grow straight runs while the accumulated turn stays small.
        let mut pos = 0;
        for &turn in &turns {
            let run_turn = segments[pos].turn + turn;
            if run_turn.abs() < STRAIGHT_MERGE_ANGLE {
                let next = segments.remove(pos + 1);
                let run = &mut segments[pos];
                run.end = next.end;
                run.turn = run_turn;
                run.kind = SegmentKind::Straight;
                run.length += next.length;
            } else {
                pos += 1;
            }
        }

        // Join neighbouring curves.
        let mut pos = 0;
        while pos + 1 < segments.len() {
            let next = segments[pos + 1];
            if segments[pos].kind == SegmentKind::Curve && next.kind == SegmentKind::Curve {
                let run = &mut segments[pos];
                run.end = next.end;
                run.turn += turns[next.start - 1].abs();
                run.length += next.length;
                segments.remove(pos + 1);
            } else {
                pos += 1;
            }
        }

        // Re-join straight runs broken by a small bend.
        let mut pos = 0;
        while pos + 1 < segments.len() {
            let next = segments[pos + 1];
            if segments[pos].kind == SegmentKind::Straight
                && next.kind == SegmentKind::Straight
                && turns[next.start - 1] < STRAIGHT_REMERGE_ANGLE
            {
                let run = &mut segments[pos];
                run.end = next.end;
                run.turn += next.turn;
                run.length += next.length;
                segments.remove(pos + 1);
            } else {
                pos += 1;
            }
        }

        // A short or bent straight run between two curves belongs to the curve.
        let mut pos = 0;
        while pos + 2 < segments.len() {
            let (a, b, c) = (segments[pos], segments[pos + 1], segments[pos + 2]);
            let sandwiched = a.kind == SegmentKind::Curve
                && b.kind == SegmentKind::Straight
                && c.kind == SegmentKind::Curve;
            let absorbable = ((b.length < a.length || b.length < c.length)
                && b.end - b.start <= SANDWICH_MAX_SPAN)
                || b.turn.abs() > SANDWICH_TURN;
            if sandwiched && absorbable {
                let inner: f64 = (b.start..=c.start).map(|i| turns[i - 1].abs()).sum();
                segments[pos] = Segment {
                    start: a.start,
                    end: c.end,
                    turn: a.turn + inner + c.turn,
                    kind: SegmentKind::Curve,
                    length: a.length + b.length + c.length,
                };
                segments.drain(pos + 1..pos + 3);
            } else {
                pos += 1;
            }
        }

        (segments, slopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(xy: &[(f64, f64)]) -> Stroke {
        Stroke::from_xy(0, xy).unwrap()
    }

    #[test]
    fn straight_line_is_one_straight_run() {
        let mut s = stroke(&[(-1.0, 0.0), (-0.5, 0.0), (0.0, 0.0), (0.5, 0.0), (1.0, 0.0)]);
        let segments = s.classify_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Straight);
        assert_eq!((segments[0].start, segments[0].end), (0, 4));
        assert!((segments[0].length - 2.0).abs() < 1e-12);
    }

    #[test]
    fn corner_splits_two_straight_runs() {
        let mut s = stroke(&[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (1.0, 0.5), (1.0, 1.0)]);
        let segments = s.classify_segments().to_vec();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|seg| seg.kind == SegmentKind::Straight));
        assert_eq!(segments[0].end, segments[1].start);
        assert!(s.segments().is_some());
    }

    #[test]
    fn arc_is_a_curve() {
        let points: Vec<(f64, f64)> = (0..=12)
            .map(|k| {
                let a = std::f64::consts::PI * k as f64 / 12.0;
                (a.cos(), a.sin())
            })
            .collect();
        let mut s = stroke(&points);
        let segments = s.classify_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Curve);
        assert_eq!((segments[0].start, segments[0].end), (0, 12));
    }

    #[test]
    fn info_splits_lengths() {
        let s = stroke(&[(-1.0, 0.0), (0.0, 0.0), (1.0, 0.0)]);
        let info = s.subsegment_info();
        assert!((info.straight_length - 2.0).abs() < 1e-12);
        assert_eq!(info.curve_length, 0.0);
        // Horizontal: everything in orientation 0, half top / half bottom.
        assert!((info.orientation[0][0] - 1.0).abs() < 1e-12);
        assert!((info.orientation[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_has_no_runs() {
        let mut s = stroke(&[(0.0, 0.0)]);
        assert!(s.classify_segments().is_empty());
        let info = s.subsegment_info();
        assert_eq!(info.straight_length + info.curve_length, 0.0);
    }
}
