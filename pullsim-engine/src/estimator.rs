//! Estimator facade: configuration, batched sampling and percentile reads.
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

use crate::banner::{BannerConfig, ColorCounts};
use crate::batch::{BatchReport, TrialBatchRunner};
use crate::distribution::{CurvePoint, Distribution, DistributionSummary, Histogram};
use crate::error::EngineError;
use crate::goal::{Goal, GoalKind, available_goal_kinds};
use crate::scenario::Scenario;
use crate::seed::SeedSequence;

/// Long-lived estimator for one banner/goal pair at a time.
///
/// All methods take `&self`; batches, reads and reconfiguration may come
/// from different threads. A reconfiguration swaps the scenario and clears
/// the samples under one write lock, and any batch that started before it
/// has its samples discarded.
#[derive(Debug)]
pub struct Estimator {
    scenario: RwLock<Arc<Scenario>>,
    samples: Distribution,
    seeds: Mutex<SeedSequence>,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator {
    /// Regular banner, `Any 5* x1`, entropy-seeded.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Scenario::default(), SeedSequence::from_entropy())
    }

    /// Regular banner, `Any 5* x1`, reproducible from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_parts(Scenario::default(), SeedSequence::new(seed))
    }

    /// # Errors
    ///
    /// Returns an error if the goal cannot be completed on the banner.
    pub fn with_scenario(banner: BannerConfig, goal: Goal, seed: u64) -> Result<Self, EngineError> {
        Ok(Self::from_parts(
            Scenario::new(banner, goal)?,
            SeedSequence::new(seed),
        ))
    }

    fn from_parts(scenario: Scenario, seeds: SeedSequence) -> Self {
        log::debug!(
            "estimator ready: banner {} goal {} root seed {:#x}",
            scenario.banner(),
            scenario.goal(),
            seeds.root()
        );
        Self {
            scenario: RwLock::new(Arc::new(scenario)),
            samples: Distribution::new(),
            seeds: Mutex::new(seeds),
        }
    }

    /// Replace the banner from raw counts and percent rates.
    ///
    /// `base_focus_rate_percent` is the chance (in percent) that a five-star
    /// is a focus unit; `base_fivestar_rate_percent` is the starting
    /// five-star chance per pull. Samples are cleared on success.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the banner is invalid
    /// or cannot satisfy the current goal; nothing changes in that case.
    pub fn configure(
        &self,
        red: u32,
        blue: u32,
        green: u32,
        colorless: u32,
        base_focus_rate_percent: f64,
        base_fivestar_rate_percent: f64,
    ) -> Result<(), EngineError> {
        let banner = BannerConfig::new(
            ColorCounts::new(red, blue, green, colorless),
            base_focus_rate_percent / 100.0,
            base_fivestar_rate_percent / 100.0,
        )?;
        self.configure_banner(banner)
    }

    /// Replace the banner, keeping the goal. Samples are cleared on success.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the banner is invalid
    /// or cannot satisfy the current goal.
    pub fn configure_banner(&self, banner: BannerConfig) -> Result<(), EngineError> {
        let mut current = self.scenario.write();
        let next = current.with_banner(banner)?;
        *current = Arc::new(next);
        let epoch = self.samples.reset();
        log::debug!("banner set to {banner}; samples cleared (epoch {epoch})");
        Ok(())
    }

    /// Replace the goal and clear the samples.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if `target_count` is not
    /// positive or the banner cannot complete the goal; the previous goal and
    /// samples are kept.
    pub fn set_goal_and_reset(&self, kind: GoalKind, target_count: i64) -> Result<(), EngineError> {
        let goal = Goal::new(kind, target_count)?;
        let mut current = self.scenario.write();
        let next = current.with_goal(goal)?;
        *current = Arc::new(next);
        let epoch = self.samples.reset();
        log::debug!("goal set to {goal}; samples cleared (epoch {epoch})");
        Ok(())
    }

    /// Simulate `trial_count` more sessions in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBatchSize`] if `trial_count <= 0`.
    pub fn run_batch(&self, trial_count: i64) -> Result<BatchReport, EngineError> {
        let trials = positive_trials(trial_count)?;
        let started = Instant::now();
        let (scenario, epoch) = self.capture();
        let runner = TrialBatchRunner::new(&scenario);
        let streams = self.seeds.lock().reserve(runner.chunks_for(trials));
        let histogram = runner.run_streams(trials, streams);
        Ok(self.finish_batch(trials, epoch, &histogram, started))
    }

    /// Simulate `trial_count` more sessions serially from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBatchSize`] if `trial_count <= 0`.
    pub fn run_batch_with_rng<R: Rng + ?Sized>(
        &self,
        trial_count: i64,
        rng: &mut R,
    ) -> Result<BatchReport, EngineError> {
        let trials = positive_trials(trial_count)?;
        let started = Instant::now();
        let (scenario, epoch) = self.capture();
        let histogram = TrialBatchRunner::new(&scenario).run_with_rng(trials, rng);
        Ok(self.finish_batch(trials, epoch, &histogram, started))
    }

    fn capture(&self) -> (Arc<Scenario>, u64) {
        let guard = self.scenario.read();
        (Arc::clone(&guard), self.samples.epoch())
    }

    fn finish_batch(
        &self,
        trials: u64,
        epoch: u64,
        histogram: &Histogram,
        started: Instant,
    ) -> BatchReport {
        let recorded = if self.samples.absorb(epoch, histogram) {
            trials
        } else {
            log::debug!("discarded {trials} samples from a batch that raced a reset");
            0
        };
        let report = BatchReport {
            requested: trials,
            recorded,
            elapsed: started.elapsed(),
        };
        log::trace!(
            "batch of {} done in {:?}; {} samples total",
            report.requested,
            report.elapsed,
            self.samples.count()
        );
        report
    }

    /// Pull counts at each percentile, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPercentile`] for a percentile outside
    /// `[0, 1]` and [`EngineError::EmptyDistribution`] if nothing was sampled.
    pub fn query_quantiles(&self, percentiles: &[f64]) -> Result<Vec<u64>, EngineError> {
        Ok(self.samples.quantiles(percentiles)?)
    }

    /// Sessions recorded since the last reset.
    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.samples.count()
    }

    /// Clear the samples without touching the configuration.
    pub fn reset(&self) {
        let _guard = self.scenario.write();
        let epoch = self.samples.reset();
        log::debug!("samples cleared (epoch {epoch})");
    }

    #[must_use]
    pub fn histogram(&self) -> Histogram {
        self.samples.snapshot()
    }

    #[must_use]
    pub fn summary(&self) -> Option<DistributionSummary> {
        self.samples.summary()
    }

    /// # Errors
    ///
    /// Returns [`EngineError::EmptyDistribution`] if nothing was sampled.
    pub fn curve(&self, points: usize) -> Result<Vec<CurvePoint>, EngineError> {
        Ok(self.samples.curve(points)?)
    }

    #[must_use]
    pub fn scenario(&self) -> Arc<Scenario> {
        Arc::clone(&self.scenario.read())
    }

    /// Goal kinds the current banner can complete.
    #[must_use]
    pub fn available_goals(&self) -> Vec<GoalKind> {
        available_goal_kinds(self.scenario.read().banner())
    }

    #[must_use]
    pub fn root_seed(&self) -> u64 {
        self.seeds.lock().root()
    }
}

fn positive_trials(trial_count: i64) -> Result<u64, EngineError> {
    u64::try_from(trial_count)
        .ok()
        .filter(|&n| n > 0)
        .ok_or(EngineError::InvalidBatchSize {
            requested: trial_count,
        })
}
