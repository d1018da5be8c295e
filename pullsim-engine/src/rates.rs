//! Per-pull rate model: live five-star chance and focus/color split.
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::banner::{BannerConfig, Color, ColorCounts, PityRamp};
use crate::constants::DEFAULT_HARD_PITY;
use crate::error::ConfigError;

/// Classification of a single pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawOutcome {
    Fivestar {
        is_focus: bool,
        color: Option<Color>,
    },
    NonFivestar,
}

impl DrawOutcome {
    #[must_use]
    pub const fn is_fivestar(self) -> bool {
        matches!(self, Self::Fivestar { .. })
    }
}

/// Rate tables resolved once per banner.
///
/// Building the weighted color tables is the only allocation; `draw` itself
/// only consumes randomness.
#[derive(Debug, Clone)]
pub struct RateModel {
    base_fivestar_rate: f64,
    base_focus_rate: f64,
    pity: PityRamp,
    guaranteed_by: u32,
    focus_shares: [f64; 4],
    focus_colors: Option<WeightedIndex<u32>>,
    generic_colors: Option<WeightedIndex<u32>>,
}

fn color_table(counts: ColorCounts) -> Option<WeightedIndex<u32>> {
    if counts.total() == 0 {
        return None;
    }
    WeightedIndex::new(counts.as_array()).ok()
}

fn focus_shares(banner: &BannerConfig) -> [f64; 4] {
    Color::ALL.map(|color| banner.focus_share(color))
}

impl Default for RateModel {
    /// Rates of [`BannerConfig::default`].
    fn default() -> Self {
        let banner = BannerConfig::default();
        Self {
            base_fivestar_rate: banner.base_fivestar_rate,
            base_focus_rate: banner.base_focus_rate,
            pity: banner.pity,
            guaranteed_by: DEFAULT_HARD_PITY,
            focus_shares: focus_shares(&banner),
            focus_colors: color_table(banner.focus_counts),
            generic_colors: banner.generic_pool.and_then(color_table),
        }
    }
}

impl RateModel {
    /// # Errors
    ///
    /// Returns an error if the banner fails validation.
    pub fn new(banner: &BannerConfig) -> Result<Self, ConfigError> {
        banner.validate()?;
        let guaranteed_by = banner
            .pity
            .guaranteed_at(banner.base_fivestar_rate)
            .ok_or(ConfigError::UnboundedPity {
                base: banner.base_fivestar_rate,
            })?;
        Ok(Self {
            base_fivestar_rate: banner.base_fivestar_rate,
            base_focus_rate: banner.base_focus_rate,
            pity: banner.pity,
            guaranteed_by,
            focus_shares: focus_shares(banner),
            focus_colors: color_table(banner.focus_counts),
            generic_colors: banner.generic_pool.and_then(color_table),
        })
    }

    /// Five-star chance for the next pull after `pulls_since_fivestar` dry pulls.
    #[must_use]
    pub fn fivestar_rate(&self, pulls_since_fivestar: u32) -> f64 {
        if pulls_since_fivestar >= self.guaranteed_by {
            return 1.0;
        }
        self.pity
            .rate_at(self.base_fivestar_rate, pulls_since_fivestar)
    }

    /// Pity count at which a five-star is certain.
    #[must_use]
    pub const fn guaranteed_by(&self) -> u32 {
        self.guaranteed_by
    }

    #[must_use]
    pub const fn focus_rate(&self) -> f64 {
        self.base_focus_rate
    }

    /// Chance that a five-star is a focus unit of `color`.
    #[must_use]
    pub const fn focus_share(&self, color: Color) -> f64 {
        self.focus_shares[color.index()]
    }

    /// Resolve one pull.
    pub fn draw<R: Rng + ?Sized>(&self, pulls_since_fivestar: u32, rng: &mut R) -> DrawOutcome {
        if !rng.gen_bool(self.fivestar_rate(pulls_since_fivestar)) {
            return DrawOutcome::NonFivestar;
        }
        let is_focus = rng.gen_bool(self.base_focus_rate);
        let table = if is_focus {
            self.focus_colors.as_ref()
        } else {
            self.generic_colors.as_ref()
        };
        let color = table.and_then(|t| Color::from_index(t.sample(rng)));
        DrawOutcome::Fivestar { is_focus, color }
    }
}
