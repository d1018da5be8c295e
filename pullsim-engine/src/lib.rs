//! Pullsim Engine
//!
//! Monte Carlo estimator for how many pulls a gacha goal takes on a banner
//! with a pity ramp. This crate holds the rate model, session simulation,
//! batched trial execution and the percentile aggregator, without any
//! front-end concerns.

pub mod banner;
pub mod batch;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod estimator;
pub mod goal;
pub mod numbers;
pub mod presets;
pub mod rates;
pub mod scenario;
pub mod seed;
pub mod session;

// Re-export commonly used types
pub use banner::{BannerConfig, Color, ColorCounts, PityRamp};
pub use batch::{BatchReport, TrialBatchRunner};
pub use distribution::{CurvePoint, Distribution, DistributionSummary, Histogram};
pub use error::{ConfigError, DistributionError, EngineError};
pub use estimator::Estimator;
pub use goal::{Goal, GoalKind, available_goal_kinds};
pub use presets::{BannerPreset, PresetCatalog, preset_catalog};
pub use rates::{DrawOutcome, RateModel};
pub use scenario::Scenario;
pub use seed::{SeedSequence, StreamBlock, derive_stream_seed};
pub use session::{PityState, SessionOutcome, simulate_session};
