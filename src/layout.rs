//! Fixed ordering and sizing of the feature vector.
//!
//! Every group contributes a [`FeatureValue`] per output slot; the values
//! are flattened in [`FeatureGroup::ALL`] order. [`feature_types`] walks the
//! same table, so vector and type list always have the same length.

use crate::config::FeatureConfig;
use crate::stroke::ORIENTATIONS;

/// How a downstream learner should treat one slot of the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    Continuous,
    Discrete,
}

impl FeatureType {
    /// Single-letter tag used in dataset headers.
    pub fn tag(self) -> char {
        match self {
            FeatureType::Continuous => 'C',
            FeatureType::Discrete => 'D',
        }
    }
}

/// One contribution of a feature group.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl FeatureValue {
    pub fn len(&self) -> usize {
        match self {
            FeatureValue::Scalar(_) => 1,
            FeatureValue::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Scalar(v)
    }
}

impl From<Vec<f64>> for FeatureValue {
    fn from(v: Vec<f64>) -> Self {
        FeatureValue::Vector(v)
    }
}

/// Flatten group contributions into the final vector.
pub fn flatten(values: impl IntoIterator<Item = FeatureValue>) -> Vec<f64> {
    let mut out = Vec::new();
    for value in values {
        match value {
            FeatureValue::Scalar(v) => out.push(v),
            FeatureValue::Vector(v) => out.extend(v),
        }
    }
    out
}

/// Feature groups, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Crossings,
    AngularCrossings,
    TraceCount,
    DistanceGrid,
    LineFeatures,
    ProjectionCdf,
    Histogram2d,
    Orientation,
    AspectRatio,
    PointAngular,
    Subsegments,
    Eigen,
    SizeRatio,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 13] = [
        FeatureGroup::Crossings,
        FeatureGroup::AngularCrossings,
        FeatureGroup::TraceCount,
        FeatureGroup::DistanceGrid,
        FeatureGroup::LineFeatures,
        FeatureGroup::ProjectionCdf,
        FeatureGroup::Histogram2d,
        FeatureGroup::Orientation,
        FeatureGroup::AspectRatio,
        FeatureGroup::PointAngular,
        FeatureGroup::Subsegments,
        FeatureGroup::Eigen,
        FeatureGroup::SizeRatio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureGroup::Crossings => "crossings",
            FeatureGroup::AngularCrossings => "angular crossings",
            FeatureGroup::TraceCount => "trace count",
            FeatureGroup::DistanceGrid => "distance grid",
            FeatureGroup::LineFeatures => "line features",
            FeatureGroup::ProjectionCdf => "projection cdf",
            FeatureGroup::Histogram2d => "2d histogram",
            FeatureGroup::Orientation => "orientation",
            FeatureGroup::AspectRatio => "aspect ratio",
            FeatureGroup::PointAngular => "point angular distribution",
            FeatureGroup::Subsegments => "subsegments",
            FeatureGroup::Eigen => "eigen",
            FeatureGroup::SizeRatio => "size ratio",
        }
    }

    pub fn is_enabled(self, config: &FeatureConfig) -> bool {
        match self {
            FeatureGroup::Crossings => config.use_crossings,
            FeatureGroup::AngularCrossings => config.use_angular_crossings,
            FeatureGroup::TraceCount => config.use_trace_count,
            FeatureGroup::DistanceGrid => config.use_distance_grid,
            FeatureGroup::LineFeatures => config.use_line_features,
            FeatureGroup::ProjectionCdf => config.use_projection_cdf,
            FeatureGroup::Histogram2d => config.use_histogram_2d,
            FeatureGroup::Orientation => config.use_orientation,
            FeatureGroup::AspectRatio => config.use_aspect_ratio,
            FeatureGroup::PointAngular => config.use_point_angular,
            FeatureGroup::Subsegments => config.use_subsegments,
            FeatureGroup::Eigen => config.use_eigen,
            FeatureGroup::SizeRatio => config.use_size_ratio,
        }
    }

    /// Number of vector slots this group produces under `config`.
    pub fn len(self, config: &FeatureConfig) -> usize {
        match self {
            FeatureGroup::Crossings => 6 * config.crossings,
            FeatureGroup::AngularCrossings => 6 * config.angular_crossings,
            FeatureGroup::TraceCount => 1,
            FeatureGroup::DistanceGrid => {
                config.distance_grids.iter().map(|(r, c)| 3 * r * c).sum()
            }
            FeatureGroup::LineFeatures => 6,
            FeatureGroup::ProjectionCdf => 2 * config.projection_bins.saturating_sub(1),
            FeatureGroup::Histogram2d => config.histogram_grids.iter().map(|(r, c)| r * c).sum(),
            FeatureGroup::Orientation => config
                .orientation_grids
                .iter()
                .map(|(r, c)| ORIENTATIONS * r * c)
                .sum(),
            FeatureGroup::AspectRatio => 1,
            FeatureGroup::PointAngular => 1 + config.angular_bins + 2,
            FeatureGroup::Subsegments => 2 * ORIENTATIONS,
            FeatureGroup::Eigen => 3,
            FeatureGroup::SizeRatio => 2,
        }
    }

    pub fn feature_type(self) -> FeatureType {
        FeatureType::Continuous
    }
}

/// Groups enabled by `config`, in vector order.
pub fn enabled_groups(config: &FeatureConfig) -> impl Iterator<Item = FeatureGroup> + '_ {
    FeatureGroup::ALL
        .into_iter()
        .filter(move |g| g.is_enabled(config))
}

/// Type of every slot of the vector produced with `config`.
pub fn feature_types(config: &FeatureConfig) -> Vec<FeatureType> {
    enabled_groups(config)
        .flat_map(|g| std::iter::repeat(g.feature_type()).take(g.len(config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_keeps_order() {
        let values = vec![
            FeatureValue::Scalar(1.0),
            FeatureValue::Vector(vec![2.0, 3.0]),
            FeatureValue::Vector(vec![]),
            4.0.into(),
        ];
        assert_eq!(flatten(values), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn default_groups() {
        let config = FeatureConfig::default();
        let groups: Vec<_> = enabled_groups(&config).collect();
        assert_eq!(
            groups,
            vec![
                FeatureGroup::Crossings,
                FeatureGroup::TraceCount,
                FeatureGroup::LineFeatures,
                FeatureGroup::Histogram2d,
                FeatureGroup::Orientation,
                FeatureGroup::AspectRatio,
                FeatureGroup::Eigen,
            ]
        );
    }

    #[test]
    fn all_groups_length() {
        let config = FeatureConfig::all();
        // 102 default + 24 angular + 27 distance + 14 cdf + 11 angular dist
        // + 8 subsegments + 2 size ratio
        assert_eq!(feature_types(&config).len(), 188);
    }

    #[test]
    fn multiple_grids_add_up() {
        let config = FeatureConfig {
            histogram_grids: vec![(5, 5), (2, 3)],
            ..FeatureConfig::default()
        };
        assert_eq!(FeatureGroup::Histogram2d.len(&config), 31);
    }

    #[test]
    fn header_tags() {
        assert_eq!(FeatureType::Continuous.tag(), 'C');
        assert_eq!(FeatureType::Discrete.tag(), 'D');
    }
}
