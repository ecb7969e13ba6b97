//! A handwritten symbol: a group of strokes sharing one label.

mod groups;

use std::fmt;

use kurbo::Rect;

use crate::config::FeatureConfig;
use crate::error::FeatureError;
use crate::geom::{bounds_of, squared};
use crate::layout::{self, FeatureType};
use crate::stroke::Stroke;

/// The normalized frame every symbol is mapped into.
pub const CANONICAL_FRAME: Rect = Rect::new(-1.0, -1.0, 1.0, 1.0);

/// Ground-truth class of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Known(String),
    Unknown,
}

impl From<Option<String>> for Label {
    fn from(truth: Option<String>) -> Self {
        truth.map_or(Label::Unknown, Label::Known)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Known(s) => f.write_str(s),
            Label::Unknown => f.write_str("{Unknown}"),
        }
    }
}

/// Strokes of one symbol plus its label.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: u32,
    strokes: Vec<Stroke>,
    truth: Label,
    /// Box of the strokes as originally drawn.
    original_box: Rect,
    w_ratio: f64,
    h_ratio: f64,
    normalized: bool,
}

impl Symbol {
    /// Group `strokes` into a symbol. Fails when there are no strokes.
    pub fn new(id: u32, strokes: Vec<Stroke>, truth: Label) -> Result<Self, FeatureError> {
        if strokes.is_empty() {
            return Err(FeatureError::EmptySymbol);
        }
        let original_box = strokes
            .iter()
            .map(|s| bounds_of(s.original_points()))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        Ok(Self {
            id,
            strokes,
            truth,
            original_box,
            w_ratio: 1.0,
            h_ratio: 1.0,
            normalized: false,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn truth(&self) -> &Label {
        &self.truth
    }

    pub fn original_box(&self) -> Rect {
        self.original_box
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Union of the current stroke bounds.
    pub fn bounds(&self) -> Rect {
        self.strokes
            .iter()
            .map(Stroke::bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// Current bounds grown along the shorter side into a centered square.
    pub fn squared_bounds(&self) -> Rect {
        squared(self.bounds())
    }

    /// Total number of points over all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Map every stroke from the squared bounds into [-1, 1]².
    ///
    /// Runs once; later calls leave the geometry untouched.
    pub fn normalize(&mut self) {
        if self.normalized {
            log::warn!("symbol {} is already normalized", self.id);
            return;
        }
        let input = self.squared_bounds();
        for stroke in &mut self.strokes {
            stroke.relocate(input, CANONICAL_FRAME);
        }
        self.normalized = true;
    }

    /// Record the size of the original ink relative to page averages.
    ///
    /// A non-positive average leaves the ratio at 1.
    pub fn set_size_ratio(&mut self, avg_width: f64, avg_height: f64) {
        self.w_ratio = if avg_width > 0.0 {
            self.original_box.width() / avg_width
        } else {
            1.0
        };
        self.h_ratio = if avg_height > 0.0 {
            self.original_box.height() / avg_height
        } else {
            1.0
        };
    }

    /// `(width ratio, height ratio)`; `(1, 1)` unless set.
    pub fn size_ratio(&self) -> (f64, f64) {
        (self.w_ratio, self.h_ratio)
    }

    /// Classify the segments of every stroke (used by [`Symbol::to_svg`]).
    pub fn classify_segments(&mut self) {
        for stroke in &mut self.strokes {
            stroke.classify_segments();
        }
    }

    /// Exchange processed and original points on every stroke.
    pub fn swap_points(&mut self) {
        for stroke in &mut self.strokes {
            stroke.swap_points();
        }
    }

    /// The feature vector for `config`.
    ///
    /// Meant for normalized symbols; its length always equals
    /// `config.len()`. Fails with `InvalidConfig` when `config` does not
    /// validate.
    pub fn features(&self, config: &FeatureConfig) -> Result<Vec<f64>, FeatureError> {
        config.validate()?;
        Ok(self.feature_vector(config))
    }

    /// [`Symbol::features`] for a config the caller already validated.
    pub(crate) fn feature_vector(&self, config: &FeatureConfig) -> Vec<f64> {
        if !self.normalized {
            log::debug!("symbol {}: extracting features before normalization", self.id);
        }
        let values = layout::enabled_groups(config).flat_map(|g| {
            let values = self.group_values(g, config);
            log::trace!("symbol {}: {} -> {} values", self.id, g.name(), values.len());
            values
        });
        let features = layout::flatten(values);
        debug_assert_eq!(features.len(), config.len());
        features
    }

    /// Types of the slots returned by [`Symbol::features`].
    pub fn feature_types(&self, config: &FeatureConfig) -> Vec<FeatureType> {
        layout::feature_types(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn symbol(strokes: &[&[(f64, f64)]]) -> Symbol {
        let strokes = strokes
            .iter()
            .enumerate()
            .map(|(i, xy)| Stroke::from_xy(i as u32, xy).unwrap())
            .collect();
        Symbol::new(7, strokes, Label::Known("x".into())).unwrap()
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            Symbol::new(0, vec![], Label::Unknown).unwrap_err(),
            FeatureError::EmptySymbol
        );
    }

    #[test]
    fn squared_bounds_center_the_short_side() {
        let s = symbol(&[&[(0.0, 0.0), (4.0, 1.0)]]);
        assert_eq!(s.squared_bounds(), Rect::new(0.0, -1.5, 4.0, 2.5));
        let s = symbol(&[&[(0.0, 0.0), (1.0, 4.0)]]);
        assert_eq!(s.squared_bounds(), Rect::new(-1.5, 0.0, 2.5, 4.0));
    }

    #[test]
    fn normalize_fills_the_frame_once() {
        let mut s = symbol(&[&[(10.0, 10.0), (30.0, 20.0)], &[(20.0, 0.0), (20.0, 5.0)]]);
        s.normalize();
        let b = s.bounds();
        assert!((b.x0 + 1.0).abs() < 1e-12 && (b.x1 - 1.0).abs() < 1e-12);
        assert!(b.y0 >= -1.0 && b.y1 <= 1.0);

        let before: Vec<Point> = s.strokes()[0].points().to_vec();
        s.normalize();
        assert_eq!(s.strokes()[0].points(), &before[..]);
        assert!(s.is_normalized());
    }

    #[test]
    fn original_box_survives_normalization() {
        let mut s = symbol(&[&[(10.0, 10.0), (30.0, 20.0)]]);
        s.normalize();
        assert_eq!(s.original_box(), Rect::new(10.0, 10.0, 30.0, 20.0));
    }

    #[test]
    fn size_ratio_uses_original_box() {
        let mut s = symbol(&[&[(0.0, 0.0), (10.0, 4.0)]]);
        assert_eq!(s.size_ratio(), (1.0, 1.0));
        s.set_size_ratio(5.0, 0.0);
        assert_eq!(s.size_ratio(), (2.0, 1.0));
    }

    #[test]
    fn features_reject_zero_angular_bins() {
        let mut s = symbol(&[&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]]);
        s.normalize();
        let config = FeatureConfig {
            use_point_angular: true,
            angular_bins: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(
            s.features(&config),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn features_reject_zero_sub_crossings() {
        let mut s = symbol(&[&[(0.0, 0.0), (1.0, 1.0)]]);
        s.normalize();
        let config = FeatureConfig {
            sub_crossings: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(
            s.features(&config),
            Err(FeatureError::InvalidConfig(_))
        ));
        let features = s.features(&FeatureConfig::default()).unwrap();
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn label_display() {
        assert_eq!(Label::Known("\\alpha".into()).to_string(), "\\alpha");
        assert_eq!(Label::Unknown.to_string(), "{Unknown}");
        assert_eq!(Label::from(None), Label::Unknown);
    }
}
