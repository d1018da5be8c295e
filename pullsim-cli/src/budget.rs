//! Time-budgeted doubling schedule for estimator batches.
use anyhow::{Result, bail};
use pullsim_engine::Estimator;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSchedule {
    pub initial_batch: i64,
    pub budget: Duration,
    pub max_rounds: u32,
}

impl BatchSchedule {
    pub fn new(initial_batch: i64, budget: Duration, max_rounds: u32) -> Result<Self> {
        if initial_batch <= 0 {
            bail!("initial batch must be positive (got {initial_batch})");
        }
        if max_rounds == 0 {
            bail!("at least one round is required");
        }
        Ok(Self {
            initial_batch,
            budget,
            max_rounds,
        })
    }

    /// Batch size of round `round` (0-based): `initial * 2^round`, saturating.
    pub fn batch_size(&self, round: u32) -> i64 {
        self.initial_batch
            .checked_mul(1_i64.checked_shl(round).unwrap_or(i64::MAX))
            .filter(|n| *n > 0)
            .unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    pub round: u32,
    pub batch: u64,
    pub elapsed_ms: u64,
    pub total_samples: u64,
}

/// Run doubling batches until the budget is spent or `max_rounds` ran.
/// The first round always runs.
pub fn run_schedule(estimator: &Estimator, schedule: &BatchSchedule) -> Result<Vec<RoundRecord>> {
    let started = Instant::now();
    let mut rounds = Vec::new();
    for round in 0..schedule.max_rounds {
        if round > 0 && started.elapsed() >= schedule.budget {
            log::debug!("budget of {:?} spent after {round} rounds", schedule.budget);
            break;
        }
        let report = estimator.run_batch(schedule.batch_size(round))?;
        rounds.push(RoundRecord {
            round,
            batch: report.requested,
            elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            total_samples: estimator.sample_count(),
        });
        log::debug!(
            "round {round}: {} trials in {:?}",
            report.requested,
            report.elapsed
        );
    }
    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_sizes_double_and_saturate() {
        let schedule = BatchSchedule::new(1_024, Duration::from_millis(500), 6).unwrap();
        let sizes: Vec<_> = (0..4).map(|r| schedule.batch_size(r)).collect();
        assert_eq!(sizes, vec![1_024, 2_048, 4_096, 8_192]);
        assert_eq!(schedule.batch_size(62), i64::MAX);
        assert_eq!(schedule.batch_size(200), i64::MAX);
    }

    #[test]
    fn rejects_empty_schedules() {
        assert!(BatchSchedule::new(0, Duration::from_millis(1), 3).is_err());
        assert!(BatchSchedule::new(16, Duration::from_millis(1), 0).is_err());
    }

    #[test]
    fn runs_every_round_within_generous_budget() {
        let estimator = Estimator::with_seed(8);
        let schedule = BatchSchedule::new(32, Duration::from_secs(600), 3).unwrap();
        let rounds = run_schedule(&estimator, &schedule).unwrap();
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[2].total_samples, 32 + 64 + 128);
        assert_eq!(estimator.sample_count(), 224);
    }

    #[test]
    fn zero_budget_still_runs_first_round() {
        let estimator = Estimator::with_seed(9);
        let schedule = BatchSchedule::new(16, Duration::ZERO, 6).unwrap();
        let rounds = run_schedule(&estimator, &schedule).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(estimator.sample_count(), 16);
    }
}
