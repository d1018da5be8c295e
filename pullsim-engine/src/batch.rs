//! Batched trial execution.
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::TRIALS_PER_CHUNK;
use crate::distribution::Histogram;
use crate::scenario::Scenario;
use crate::seed::{SeedSequence, StreamBlock};
use crate::session::simulate_session;

/// Outcome of one `run_batch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub requested: u64,
    /// Samples that reached the distribution; 0 if a reset raced the batch.
    pub recorded: u64,
    pub elapsed: Duration,
}

/// Runs independent sessions of one scenario into a local histogram.
#[derive(Debug, Clone, Copy)]
pub struct TrialBatchRunner<'a> {
    scenario: &'a Scenario,
    chunk_size: u64,
}

impl<'a> TrialBatchRunner<'a> {
    #[must_use]
    pub const fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            chunk_size: TRIALS_PER_CHUNK,
        }
    }

    #[must_use]
    pub const fn with_chunk_size(self, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 { 1 } else { chunk_size };
        Self { chunk_size, ..self }
    }

    /// Streams needed to run `trials` sessions in parallel.
    #[must_use]
    pub const fn chunks_for(&self, trials: u64) -> u64 {
        trials.div_ceil(self.chunk_size)
    }

    /// Serial run drawing every session from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, trials: u64, rng: &mut R) -> Histogram {
        let mut histogram = Histogram::new();
        for _ in 0..trials {
            histogram.record(simulate_session(self.scenario, rng).pulls);
        }
        histogram
    }

    /// Parallel run of all `trials` sessions on fresh streams reserved from
    /// `seeds`.
    ///
    /// The result depends only on the scenario, `trials` and the state of
    /// `seeds`.
    #[must_use]
    pub fn run(&self, trials: u64, seeds: &mut SeedSequence) -> Histogram {
        let streams = seeds.reserve(self.chunks_for(trials));
        self.run_streams(trials, streams)
    }

    /// Parallel run; chunk `i` draws from stream `i` of `streams`, which must
    /// hold at least [`Self::chunks_for`] streams.
    pub(crate) fn run_streams(&self, trials: u64, streams: StreamBlock) -> Histogram {
        let chunks = self.chunks_for(trials);
        debug_assert!(streams.len() >= chunks, "stream block too short for batch");
        let chunk_size = self.chunk_size;
        (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let start = chunk * chunk_size;
                let len = chunk_size.min(trials - start);
                let mut rng = streams.rng(chunk);
                self.run_with_rng(len, &mut rng)
            })
            .reduce(Histogram::new, |mut acc, part| {
                acc.merge(&part);
                acc
            })
    }
}
