//! Empirical pull-count distribution and percentile queries.
//!
//! Samples are stored as a dense histogram indexed by pull count, so a
//! record is an increment and every quantile read is one ordered walk.
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::DistributionError;
use crate::numbers::{ceil_f64_to_u64, index_to_u64, u64_to_f64, u64_to_index};

/// Dense `pull count -> occurrences` table.
///
/// Memory grows with the largest pull count recorded, one `u64` per slot.
/// Session lengths are bounded by the goal count times the banner's
/// guaranteed pull, which validation caps at [`MAX_GUARANTEED_PITY`].
///
/// [`MAX_GUARANTEED_PITY`]: crate::constants::MAX_GUARANTEED_PITY
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
    total: u64,
}

/// Headline numbers of a non-empty distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

/// One point of the percentile curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub percentile: f64,
    pub pulls: u64,
}

fn check_percentile(p: f64) -> Result<(), DistributionError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(DistributionError::PercentileOutOfRange(p))
    }
}

impl Histogram {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: Vec::new(),
            total: 0,
        }
    }

    pub fn record(&mut self, pulls: u64) {
        self.record_n(pulls, 1);
    }

    pub fn record_n(&mut self, pulls: u64, occurrences: u64) {
        if occurrences == 0 {
            return;
        }
        let slot = u64_to_index(pulls);
        if slot >= self.counts.len() {
            self.counts.resize(slot + 1, 0);
        }
        self.counts[slot] += occurrences;
        self.total += occurrences;
    }

    /// Append every sample of `other`.
    pub fn merge(&mut self, other: &Self) {
        if other.counts.len() > self.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
        self.total += other.total;
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Occupied `(pulls, occurrences)` pairs in ascending pull order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(slot, &n)| (index_to_u64(slot), n))
    }

    #[must_use]
    pub fn min(&self) -> Option<u64> {
        self.iter().next().map(|(pulls, _)| pulls)
    }

    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.counts
            .iter()
            .rposition(|&n| n > 0)
            .map(index_to_u64)
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let weighted: f64 = self
            .iter()
            .map(|(pulls, n)| u64_to_f64(pulls) * u64_to_f64(n))
            .sum();
        Some(weighted / u64_to_f64(self.total))
    }

    /// Nearest-rank rank of `p`: the `ceil(p * n)`-th smallest, at least the first.
    ///
    /// Products within rounding error of a whole rank snap to it, so `0.07`
    /// of 100 samples is rank 7 even though `0.07 * 100.0 > 7.0` in binary.
    fn rank(&self, p: f64) -> u64 {
        let n = u64_to_f64(self.total);
        let exact = p * n;
        let nearest = exact.round();
        let rank = if (exact - nearest).abs() <= n * f64::EPSILON {
            nearest
        } else {
            exact
        };
        ceil_f64_to_u64(rank).clamp(1, self.total)
    }

    /// Nearest-rank quantile.
    ///
    /// # Errors
    ///
    /// Returns an error if `p` is outside `[0, 1]` or nothing was recorded.
    pub fn quantile(&self, p: f64) -> Result<u64, DistributionError> {
        self.quantiles(&[p]).map(|values| values[0])
    }

    /// Answer several quantiles, in request order, with one walk over the table.
    ///
    /// # Errors
    ///
    /// Returns an error if any percentile is outside `[0, 1]` or nothing was
    /// recorded.
    pub fn quantiles(&self, percentiles: &[f64]) -> Result<Vec<u64>, DistributionError> {
        for &p in percentiles {
            check_percentile(p)?;
        }
        if self.is_empty() {
            return Err(DistributionError::Empty);
        }

        let mut order: Vec<(u64, usize)> = percentiles
            .iter()
            .enumerate()
            .map(|(idx, &p)| (self.rank(p), idx))
            .collect();
        order.sort_unstable();

        let mut answers = vec![0; percentiles.len()];
        let mut pending = order.into_iter().peekable();
        let mut seen = 0u64;
        for (pulls, n) in self.iter() {
            seen += n;
            while let Some(&(rank, idx)) = pending.peek() {
                if rank > seen {
                    break;
                }
                answers[idx] = pulls;
                pending.next();
            }
            if pending.peek().is_none() {
                break;
            }
        }
        Ok(answers)
    }

    /// Percentile curve sampled at `i / points` for `i in 0..points`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was recorded.
    pub fn curve(&self, points: usize) -> Result<Vec<CurvePoint>, DistributionError> {
        let step = u64_to_f64(index_to_u64(points.max(1)));
        let percentiles: Vec<f64> = (0..points)
            .map(|i| u64_to_f64(index_to_u64(i)) / step)
            .collect();
        let values = self.quantiles(&percentiles)?;
        Ok(percentiles
            .into_iter()
            .zip(values)
            .map(|(percentile, pulls)| CurvePoint { percentile, pulls })
            .collect())
    }

    #[must_use]
    pub fn summary(&self) -> Option<DistributionSummary> {
        Some(DistributionSummary {
            count: self.total,
            min: self.min()?,
            max: self.max()?,
            mean: self.mean()?,
        })
    }
}

impl Extend<u64> for Histogram {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for pulls in iter {
            self.record(pulls);
        }
    }
}

impl FromIterator<u64> for Histogram {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut histogram = Self::new();
        histogram.extend(iter);
        histogram
    }
}

#[derive(Debug, Default)]
struct EpochHistogram {
    epoch: u64,
    histogram: Histogram,
}

/// Thread-safe sample set with generation tracking.
///
/// Every [`Distribution::reset`] starts a new epoch; bulk appends tagged
/// with an older epoch are dropped.
#[derive(Debug, Default)]
pub struct Distribution {
    inner: RwLock<EpochHistogram>,
}

impl Distribution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, pulls: u64) {
        self.inner.write().histogram.record(pulls);
    }

    /// Append a batch-local histogram collected under `epoch`.
    ///
    /// Returns `false` (and records nothing) if the set was reset since.
    pub fn absorb(&self, epoch: u64, batch: &Histogram) -> bool {
        let mut inner = self.inner.write();
        if inner.epoch != epoch {
            return false;
        }
        inner.histogram.merge(batch);
        true
    }

    /// Drop every sample; returns the new epoch.
    pub fn reset(&self) -> u64 {
        let mut inner = self.inner.write();
        inner.histogram.clear();
        inner.epoch = inner.epoch.wrapping_add(1);
        inner.epoch
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.read().histogram.count()
    }

    /// # Errors
    ///
    /// See [`Histogram::quantile`].
    pub fn quantile(&self, p: f64) -> Result<u64, DistributionError> {
        self.inner.read().histogram.quantile(p)
    }

    /// # Errors
    ///
    /// See [`Histogram::quantiles`].
    pub fn quantiles(&self, percentiles: &[f64]) -> Result<Vec<u64>, DistributionError> {
        self.inner.read().histogram.quantiles(percentiles)
    }

    /// # Errors
    ///
    /// See [`Histogram::curve`].
    pub fn curve(&self, points: usize) -> Result<Vec<CurvePoint>, DistributionError> {
        self.inner.read().histogram.curve(points)
    }

    #[must_use]
    pub fn summary(&self) -> Option<DistributionSummary> {
        self.inner.read().histogram.summary()
    }

    #[must_use]
    pub fn snapshot(&self) -> Histogram {
        self.inner.read().histogram.clone()
    }
}
