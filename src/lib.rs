//! inkfeat: online handwriting strokes → fixed-length symbol features.
//!
//! Raw pen trajectories are cleaned (deduplicated, resampled, smoothed
//! through their corners), grouped into a symbol, normalized into
//! [-1, 1]², and described by a configurable set of feature groups.
//!
//! # Example
//!
//! ```
//! use inkfeat::{extract, FeatureConfig, SymbolInput};
//!
//! let input = SymbolInput {
//!     id: 0,
//!     truth: Some("x".into()),
//!     strokes: vec![
//!         vec![[0.0, 0.0], [1.0, 1.0]],
//!         vec![[1.0, 0.0], [0.0, 1.0]],
//!     ],
//! };
//! let config = FeatureConfig::default();
//! let features = extract(&input, &config)?;
//! assert_eq!(features.len(), config.len());
//! # Ok::<(), inkfeat::FeatureError>(())
//! ```

#![forbid(unsafe_code)]

mod batch;
mod config;
mod geom;
mod layout;
mod stroke;
mod svg;
mod symbol;

pub mod error;

// Re-export kurbo so callers build points and boxes with the same version.
pub use kurbo;

pub use batch::{
    assign_size_ratios, extract_batch, extract_features, prepare_batch, prepare_symbol,
    SymbolInput,
};
pub use config::{FeatureConfig, Grid};
pub use error::FeatureError;
pub use geom::{angular_difference, signed_angular_difference, slope_angle};
pub use layout::{feature_types, FeatureGroup, FeatureType, FeatureValue};
pub use stroke::{
    CrossingInfo, LineFeatures, Segment, SegmentKind, SharpPoint, Stroke, SubsegmentInfo,
};
pub use svg::SymbolSvg;
pub use symbol::{Label, Symbol, CANONICAL_FRAME};

/// Full pipeline for one symbol: raw strokes → feature vector.
///
/// Validates `config`, then preprocesses every stroke, normalizes the
/// symbol and extracts its features.
pub fn extract(input: &SymbolInput, config: &FeatureConfig) -> Result<Vec<f64>, FeatureError> {
    config.validate()?;
    let symbol = prepare_symbol(input)?;
    log::debug!(
        "symbol {}: {} strokes, {} points after preprocessing",
        symbol.id(),
        symbol.strokes().len(),
        symbol.point_count(),
    );
    Ok(symbol.feature_vector(config))
}
