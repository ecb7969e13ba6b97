use thiserror::Error;

/// Errors that can occur while building strokes and symbols.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FeatureError {
    #[error("a symbol needs at least one stroke")]
    EmptySymbol,

    #[error("malformed stroke {stroke}: {reason}")]
    MalformedStroke { stroke: u32, reason: String },

    #[error("invalid feature configuration: {0}")]
    InvalidConfig(String),
}
