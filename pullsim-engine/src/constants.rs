//! Centralized rate and tuning constants for the pull simulation.
//!
//! The pity schedule mirrors the summoning rules the estimator was built for:
//! every five pulls without a five-star add half a percentage point, and the
//! hundred-and-twentieth dry pull is a guaranteed five-star.

// Pity ramp ----------------------------------------------------------------
pub const DEFAULT_PITY_STEP: f64 = 0.005;
pub const DEFAULT_PITY_INTERVAL: u32 = 5;
pub const DEFAULT_HARD_PITY: u32 = 120;
/// Longest accepted dry streak before a five-star is certain.
pub const MAX_GUARANTEED_PITY: u32 = 65_535;

// Banner defaults ----------------------------------------------------------
pub const DEFAULT_FOCUS_COUNTS: [u32; 4] = [1, 1, 1, 1];
/// Starting focus / off-banner five-star percentages of a regular banner.
pub const DEFAULT_STARTING_PERCENTS: (f64, f64) = (3.0, 3.0);
/// Red/blue/green/colorless weights of the permanent five-star pool.
pub const GENERIC_FIVESTAR_POOL: [u32; 4] = [41, 28, 21, 17];

// Batching -----------------------------------------------------------------
/// Trials simulated per independent RNG stream in a parallel batch.
pub const TRIALS_PER_CHUNK: u64 = 1_024;
