use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

// -- Stroke preprocessing --

/// Duplicate scan stops once a point is farther than this fraction of the
/// stroke diagonal from the point being deduplicated.
pub const DUPLICATE_SCAN_RATIO: f64 = 0.1;
/// Resampling step as a fraction of the mean inter-point distance.
pub const RESAMPLE_SPACING_RATIO: f64 = 0.95;
/// Direction change (relative to the last sharp point) that makes a corner.
pub const SHARP_POINT_ANGLE: f64 = PI / 8.0;
/// Minimum turn between the outermost segments for a hook.
pub const HOOK_ANGLE: f64 = PI / 4.0;
/// Maximum hook length as a fraction of the stroke diagonal.
pub const HOOK_LENGTH_RATIO: f64 = 0.07;
/// Points generated per original index step between sharp points.
pub const SPLINE_SUBDIVISIONS: usize = 2;

// -- Segment classification --

/// Accumulated turn below which consecutive segments form a straight run.
pub const STRAIGHT_MERGE_ANGLE: f64 = PI * 0.0125;
/// Turn between two straight runs below which they are re-joined.
pub const STRAIGHT_REMERGE_ANGLE: f64 = PI * 0.025;
/// Straight runs spanning at most this many points may be absorbed by
/// the curves around them.
pub const SANDWICH_MAX_SPAN: usize = 4;
/// Straight runs turning more than this are always absorbed.
pub const SANDWICH_TURN: f64 = 0.1;

// -- Geometry --

/// Half-span used to widen a zero-width or zero-height box.
pub const DEGENERATE_HALF_SPAN: f64 = 0.01;
/// Smallest width/height used by the aspect ratio feature.
pub const ASPECT_MIN_SPAN: f64 = 0.01;
/// Probe lines reach slightly past the normalized frame.
pub const PROBE_EXTENT: f64 = 1.1;
/// Half-length of the angular probe lines.
pub const ANGULAR_PROBE_RADIUS: f64 = 3.0;

/// A `(rows, cols)` grid.
pub type Grid = (usize, usize);

/// Which feature groups are active and how they are shaped.
///
/// The same value must be used for every extraction whose outputs are
/// compared (training and inference): it fixes the vector layout.
/// Serializable so it can be shipped next to a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    // -- Groups --
    pub use_crossings: bool,
    pub use_angular_crossings: bool,
    pub use_trace_count: bool,
    pub use_distance_grid: bool,
    pub use_line_features: bool,
    pub use_projection_cdf: bool,
    pub use_histogram_2d: bool,
    pub use_orientation: bool,
    pub use_aspect_ratio: bool,
    pub use_point_angular: bool,
    pub use_subsegments: bool,
    pub use_eigen: bool,
    pub use_size_ratio: bool,

    // -- Crossings --
    /// Number of horizontal (and vertical) probe bands.
    pub crossings: usize,
    /// Probe lines sampled inside each band.
    pub sub_crossings: usize,

    // -- Angular crossings --
    /// Number of angular bands per quadrant.
    pub angular_crossings: usize,
    /// Probe lines sampled inside each angular band.
    pub angular_sub_crossings: usize,

    // -- Grids --
    pub distance_grids: Vec<Grid>,
    pub histogram_grids: Vec<Grid>,
    pub orientation_grids: Vec<Grid>,

    // -- Projections --
    /// Bins of the 1-D projection histograms.
    pub projection_bins: usize,

    // -- Point angular distribution --
    pub angular_bins: usize,
    /// Radius around the sharp-point centroid inside which points count
    /// towards the central bin.
    pub angular_radius: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            use_crossings: true,
            use_angular_crossings: false,
            use_trace_count: true,
            use_distance_grid: false,
            use_line_features: true,
            use_projection_cdf: false,
            use_histogram_2d: true,
            use_orientation: true,
            use_aspect_ratio: true,
            use_point_angular: false,
            use_subsegments: false,
            use_eigen: true,
            use_size_ratio: false,
            crossings: 5,
            sub_crossings: 9,
            angular_crossings: 4,
            angular_sub_crossings: 1,
            distance_grids: vec![(3, 3)],
            histogram_grids: vec![(5, 5)],
            orientation_grids: vec![(3, 3)],
            projection_bins: 8,
            angular_bins: 8,
            angular_radius: 0.4,
        }
    }
}

impl FeatureConfig {
    /// Every group switched on, default parameters.
    pub fn all() -> Self {
        Self {
            use_crossings: true,
            use_angular_crossings: true,
            use_trace_count: true,
            use_distance_grid: true,
            use_line_features: true,
            use_projection_cdf: true,
            use_histogram_2d: true,
            use_orientation: true,
            use_aspect_ratio: true,
            use_point_angular: true,
            use_subsegments: true,
            use_eigen: true,
            use_size_ratio: true,
            ..Self::default()
        }
    }

    /// Check the parameters of every enabled group.
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.use_crossings && (self.crossings == 0 || self.sub_crossings == 0) {
            return Err(invalid("crossings and sub_crossings must be positive"));
        }
        if self.use_angular_crossings
            && (self.angular_crossings == 0 || self.angular_sub_crossings == 0)
        {
            return Err(invalid(
                "angular_crossings and angular_sub_crossings must be positive",
            ));
        }
        if self.use_distance_grid {
            check_grids("distance_grids", &self.distance_grids, 1)?;
        }
        if self.use_histogram_2d {
            // Bin width is 2 / (n - 1).
            check_grids("histogram_grids", &self.histogram_grids, 2)?;
        }
        if self.use_orientation {
            check_grids("orientation_grids", &self.orientation_grids, 1)?;
        }
        if self.use_projection_cdf && self.projection_bins < 2 {
            return Err(invalid("projection_bins must be at least 2"));
        }
        if self.use_point_angular {
            if self.angular_bins == 0 {
                return Err(invalid("angular_bins must be positive"));
            }
            if self.angular_radius.is_nan() || self.angular_radius <= 0.0 {
                return Err(invalid("angular_radius must be positive"));
            }
        }
        Ok(())
    }

    /// Length of the feature vector produced with this configuration.
    pub fn len(&self) -> usize {
        crate::layout::feature_types(self).len()
    }

    /// True when no group is enabled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_grids(name: &str, grids: &[Grid], min: usize) -> Result<(), FeatureError> {
    if grids.is_empty() {
        return Err(invalid(&format!("{name} needs at least one grid")));
    }
    for &(rows, cols) in grids {
        if rows < min || cols < min {
            return Err(invalid(&format!(
                "{name} grid {rows}x{cols} is smaller than {min}x{min}"
            )));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> FeatureError {
    FeatureError::InvalidConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FeatureConfig::default().validate().is_ok());
        assert!(FeatureConfig::all().validate().is_ok());
    }

    #[test]
    fn default_layout_length() {
        // 30 crossings + 1 count + 6 line + 25 hist + 36 orientation + 1 aspect + 3 eigen
        assert_eq!(FeatureConfig::default().len(), 102);
    }

    #[test]
    fn rejects_single_column_histogram() {
        let config = FeatureConfig {
            histogram_grids: vec![(5, 1)],
            ..FeatureConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn disabled_groups_are_not_validated() {
        let config = FeatureConfig {
            use_projection_cdf: false,
            projection_bins: 0,
            ..FeatureConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_round_trip_keeps_missing_fields_at_default() {
        let config: FeatureConfig =
            serde_json::from_str(r#"{ "use_subsegments": true, "crossings": 3 }"#).unwrap();
        assert!(config.use_subsegments);
        assert_eq!(config.crossings, 3);
        assert_eq!(config.sub_crossings, 9);
    }
}
