//! A single pen-down trajectory and its geometry.
//!
//! Strokes are built from raw points, run once through the preprocessing
//! sequence ([`Stroke::preprocess`]), optionally relocated by their owning symbol,
//! and then queried read-only by the feature groups.

mod crossings;
mod histogram;
mod preprocess;
mod segments;

pub use crossings::CrossingInfo;
pub use histogram::ORIENTATIONS;
pub use segments::{Segment, SegmentKind, SubsegmentInfo};

use kurbo::{Point, Rect};

use crate::config::DEGENERATE_HALF_SPAN;
use crate::error::FeatureError;
use crate::geom::{angular_difference, bounds_of, slope_angle};

/// A corner of the stroke: its index into the current points and position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpPoint {
    pub index: usize,
    pub point: Point,
}

/// Totals that can be summed across the strokes of a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineFeatures {
    /// Sum of absolute direction changes between consecutive segments.
    pub turn: f64,
    /// Polyline length.
    pub length: f64,
    /// Number of sharp points (0 before smoothing).
    pub sharp_points: f64,
}

impl LineFeatures {
    pub fn to_array(self) -> [f64; 3] {
        [self.turn, self.length, self.sharp_points]
    }
}

/// One continuous pen motion.
#[derive(Debug, Clone)]
pub struct Stroke {
    id: u32,
    points: Vec<Point>,
    original_points: Vec<Point>,
    /// Always matches `points`; refreshed by every mutating method.
    bounds: Rect,
    /// Set by smoothing; indices always refer to `points`.
    sharp_points: Option<Vec<SharpPoint>>,
    /// Set by [`Stroke::classify_segments`].
    segments: Option<Vec<Segment>>,
}

impl Stroke {
    /// Build a stroke from raw points.
    ///
    /// Fails on an empty point list or non-finite coordinates.
    pub fn new(id: u32, points: Vec<Point>) -> Result<Self, FeatureError> {
        if points.is_empty() {
            return Err(FeatureError::MalformedStroke {
                stroke: id,
                reason: "no points".into(),
            });
        }
        if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
            return Err(FeatureError::MalformedStroke {
                stroke: id,
                reason: format!("point {bad} has non-finite coordinates"),
            });
        }
        let bounds = bounds_of(&points);
        Ok(Self {
            id,
            original_points: points.clone(),
            points,
            bounds,
            sharp_points: None,
            segments: None,
        })
    }

    /// Build a stroke from `(x, y)` pairs.
    pub fn from_xy(id: u32, xy: &[(f64, f64)]) -> Result<Self, FeatureError> {
        Self::new(id, xy.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The points exactly as supplied at construction.
    pub fn original_points(&self) -> &[Point] {
        &self.original_points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a stroke keeps at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Current bounding box (x0 = minX, x1 = maxX, y0 = minY, y1 = maxY).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Sharp points found by the last smoothing pass.
    pub fn sharp_points(&self) -> Option<&[SharpPoint]> {
        self.sharp_points.as_deref()
    }

    /// Segments stored by the last [`Stroke::classify_segments`] call.
    pub fn segments(&self) -> Option<&[Segment]> {
        self.segments.as_deref()
    }

    /// Euclidean distance between points `i` and `j`.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.points[i].distance(self.points[j])
    }

    /// True if any two points (not necessarily adjacent) coincide.
    pub fn has_duplicated_points(&self) -> bool {
        self.points
            .iter()
            .enumerate()
            .any(|(i, a)| self.points[i + 1..].iter().any(|b| a == b))
    }

    /// Exchange processed and original points.
    ///
    /// Debugging aid for visualizing the raw ink: sharp points and
    /// segments no longer describe `points` afterwards.
    pub fn swap_points(&mut self) {
        std::mem::swap(&mut self.points, &mut self.original_points);
        self.refresh_bounds();
    }

    /// Clamp all points into `input` and map them affinely onto `output`.
    ///
    /// A zero-width or zero-height `input` is widened to a small span so
    /// the mapping stays finite.
    pub fn relocate(&mut self, input: Rect, output: Rect) {
        let input = widen_degenerate(input);
        let (in_w, in_h) = (input.width(), input.height());
        let (out_w, out_h) = (output.width(), output.height());

        let map = |p: Point| {
            let x = p.x.clamp(input.x0, input.x1);
            let y = p.y.clamp(input.y0, input.y1);
            Point::new(
                (x - input.x0) / in_w * out_w + output.x0,
                (y - input.y0) / in_h * out_h + output.y0,
            )
        };

        for p in &mut self.points {
            *p = map(*p);
        }
        if let Some(sharp) = &mut self.sharp_points {
            for s in sharp.iter_mut() {
                s.point = map(s.point);
            }
        }
        self.refresh_bounds();
    }

    /// Distance from `target` to the nearest point of the stroke, and that point.
    pub fn closest_distance_to_point(&self, target: Point) -> (f64, Point) {
        self.points
            .iter()
            .map(|&p| (p.distance(target), p))
            .fold((f64::INFINITY, self.points[0]), |best, cur| {
                if cur.0 < best.0 {
                    cur
                } else {
                    best
                }
            })
    }

    /// Minimum distance between the sharp points of two strokes.
    ///
    /// `None` if either stroke has not been smoothed.
    pub fn trace_distance(&self, other: &Stroke) -> Option<f64> {
        let ours = self.sharp_points.as_deref()?;
        let theirs = other.sharp_points.as_deref()?;
        ours.iter()
            .flat_map(|a| theirs.iter().map(move |b| (a.point - b.point).hypot2()))
            .min_by(f64::total_cmp)
            .map(f64::sqrt)
    }

    /// Total turn, path length and sharp-point count.
    pub fn line_cumulative_features(&self) -> LineFeatures {
        let mut turn = 0.0;
        let mut length = 0.0;
        let mut previous: Option<f64> = None;
        for pair in self.points.windows(2) {
            let angle = slope_angle(pair[0], pair[1]);
            length += pair[0].distance(pair[1]);
            if let Some(prev) = previous {
                turn += angular_difference(angle, prev);
            }
            previous = Some(angle);
        }
        LineFeatures {
            turn,
            length,
            sharp_points: self.sharp_points.as_ref().map_or(0, Vec::len) as f64,
        }
    }

    fn refresh_bounds(&mut self) {
        self.bounds = bounds_of(&self.points);
    }
}

fn widen_degenerate(rect: Rect) -> Rect {
    let mut rect = rect;
    if rect.width() < f64::EPSILON {
        log::debug!("widening zero-width box at x={}", rect.x0);
        rect.x0 -= DEGENERATE_HALF_SPAN;
        rect.x1 += DEGENERATE_HALF_SPAN;
    }
    if rect.height() < f64::EPSILON {
        log::debug!("widening zero-height box at y={}", rect.y0);
        rect.y0 -= DEGENERATE_HALF_SPAN;
        rect.y1 += DEGENERATE_HALF_SPAN;
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(matches!(
            Stroke::new(3, vec![]),
            Err(FeatureError::MalformedStroke { stroke: 3, .. })
        ));
        assert!(matches!(
            Stroke::from_xy(4, &[(0.0, 0.0), (f64::NAN, 1.0)]),
            Err(FeatureError::MalformedStroke { stroke: 4, .. })
        ));
    }

    #[test]
    fn bounds_follow_points() {
        let stroke = Stroke::from_xy(0, &[(0.0, 1.0), (2.0, -1.0), (1.0, 3.0)]).unwrap();
        assert_eq!(stroke.bounds(), Rect::new(0.0, -1.0, 2.0, 3.0));
    }

    #[test]
    fn relocate_maps_into_output_box() {
        let mut stroke = Stroke::from_xy(0, &[(0.0, 0.0), (10.0, 5.0)]).unwrap();
        stroke.relocate(
            Rect::new(0.0, -2.5, 10.0, 7.5),
            Rect::new(-1.0, -1.0, 1.0, 1.0),
        );
        assert_eq!(stroke.points()[0], Point::new(-1.0, -0.5));
        assert_eq!(stroke.points()[1], Point::new(1.0, 0.5));
        assert_eq!(stroke.bounds(), Rect::new(-1.0, -0.5, 1.0, 0.5));
    }

    #[test]
    fn relocate_widens_degenerate_box() {
        let mut stroke = Stroke::from_xy(0, &[(3.0, 3.0)]).unwrap();
        stroke.relocate(stroke.bounds(), Rect::new(-1.0, -1.0, 1.0, 1.0));
        let p = stroke.points()[0];
        assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
    }

    #[test]
    fn relocate_clamps_outside_points() {
        let mut stroke = Stroke::from_xy(0, &[(-5.0, 0.5), (5.0, 0.5)]).unwrap();
        stroke.relocate(Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(stroke.points()[0], Point::new(0.0, 1.0));
        assert_eq!(stroke.points()[1], Point::new(2.0, 1.0));
    }

    #[test]
    fn closest_point_scans_every_point() {
        let stroke = Stroke::from_xy(0, &[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]).unwrap();
        let (dist, p) = stroke.closest_distance_to_point(Point::new(9.0, 0.0));
        assert!((dist - 1.0).abs() < 1e-12);
        assert_eq!(p, Point::new(10.0, 0.0));
    }

    #[test]
    fn trace_distance_needs_smoothing() {
        let mut a = Stroke::from_xy(0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).unwrap();
        let mut b = Stroke::from_xy(1, &[(0.0, 3.0), (1.0, 3.0), (2.0, 3.0)]).unwrap();
        assert_eq!(a.trace_distance(&b), None);
        a.apply_smoothing();
        b.apply_smoothing();
        let d = a.trace_distance(&b).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn line_features_of_right_angle() {
        let stroke = Stroke::from_xy(0, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
        let f = stroke.line_cumulative_features();
        assert!((f.turn - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((f.length - 2.0).abs() < 1e-12);
        assert_eq!(f.sharp_points, 0.0);
    }

    #[test]
    fn swap_restores_raw_ink() {
        let mut stroke = Stroke::from_xy(0, &[(0.0, 0.0), (0.0, 0.0), (4.0, 0.0)]).unwrap();
        stroke.remove_duplicated_points();
        assert_eq!(stroke.len(), 2);
        stroke.swap_points();
        assert_eq!(stroke.len(), 3);
        assert_eq!(stroke.original_points().len(), 2);
    }
}
