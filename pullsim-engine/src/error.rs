//! Error types raised by the estimator.

use thiserror::Error;

use crate::banner::Color;

/// Errors raised when banner or goal invariants are violated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a probability between 0 and 1 (got {value})")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },
    #[error("{color} focus goal needs at least one {color} focus unit on the banner")]
    MissingFocusColor { color: Color },
    #[error("focus goals can never complete when the focus rate is 0")]
    UnreachableFocusGoal,
    #[error("focus rate {rate} needs at least one focus unit on the banner")]
    FocusWithoutUnits { rate: f64 },
    #[error("generic five-star pool has no units")]
    EmptyGenericPool,
    #[error("pity interval must be at least 1 pull")]
    ZeroPityInterval,
    #[error("pity step must be between 0 and 1 (got {0})")]
    PityStepOutOfRange(f64),
    #[error("pity ramp never guarantees a five-star from base rate {base}")]
    UnboundedPity { base: f64 },
    #[error("pity guarantees a five-star only after {pulls} pulls (limit {max})")]
    PityTooLong { pulls: u32, max: u32 },
    #[error("goal count must be between 1 and {max} (got {value})")]
    GoalCountOutOfRange { value: i64, max: u32 },
    #[error("unrecognized banner description {0:?} (expected r/b/g/c (focus%, offbanner%))")]
    UnparseableBanner(String),
    #[error("unrecognized goal {0:?}")]
    UnknownGoal(String),
    #[error("unrecognized color {0:?}")]
    UnknownColor(String),
    #[error("unknown banner preset {0:?}")]
    UnknownPreset(String),
    #[error("banner preset catalog is malformed: {0}")]
    InvalidPresetCatalog(String),
}

/// Errors raised by distribution reads.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum DistributionError {
    #[error("no samples recorded")]
    Empty,
    #[error("percentile {0} is outside [0, 1]")]
    PercentileOutOfRange(f64),
}

/// Errors surfaced at the estimator boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("batch size must be positive (got {requested})")]
    InvalidBatchSize { requested: i64 },
    #[error("no samples recorded since the last reset")]
    EmptyDistribution,
    #[error("percentile {0} is outside [0, 1]")]
    InvalidPercentile(f64),
}

impl From<DistributionError> for EngineError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::Empty => Self::EmptyDistribution,
            DistributionError::PercentileOutOfRange(p) => Self::InvalidPercentile(p),
        }
    }
}
