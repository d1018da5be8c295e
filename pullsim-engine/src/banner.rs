//! Banner rate configuration: focus pools, starting rates and the pity ramp.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::constants::{
    DEFAULT_FOCUS_COUNTS, DEFAULT_HARD_PITY, DEFAULT_PITY_INTERVAL, DEFAULT_PITY_STEP,
    DEFAULT_STARTING_PERCENTS, GENERIC_FIVESTAR_POOL, MAX_GUARANTEED_PITY,
};
use crate::error::ConfigError;
use crate::numbers::ceil_f64_to_u32;

/// Unit color; focus goals target one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Green,
    Colorless,
}

impl Color {
    pub const ALL: [Self; 4] = [Self::Red, Self::Blue, Self::Green, Self::Colorless];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Blue),
            2 => Some(Self::Green),
            3 => Some(Self::Colorless),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Colorless => "Colorless",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "blue" | "b" => Ok(Self::Blue),
            "green" | "g" => Ok(Self::Green),
            "colorless" | "c" => Ok(Self::Colorless),
            _ => Err(ConfigError::UnknownColor(s.to_string())),
        }
    }
}

/// Per-color unit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorCounts {
    pub red: u32,
    pub blue: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ColorCounts {
    #[must_use]
    pub const fn new(red: u32, blue: u32, green: u32, colorless: u32) -> Self {
        Self {
            red,
            blue,
            green,
            colorless,
        }
    }

    #[must_use]
    pub const fn from_array(counts: [u32; 4]) -> Self {
        Self::new(counts[0], counts[1], counts[2], counts[3])
    }

    #[must_use]
    pub const fn as_array(&self) -> [u32; 4] {
        [self.red, self.blue, self.green, self.colorless]
    }

    #[must_use]
    pub const fn get(&self, color: Color) -> u32 {
        match color {
            Color::Red => self.red,
            Color::Blue => self.blue,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.as_array().iter().map(|&c| u64::from(c)).sum()
    }

    /// Colors with at least one unit, in canonical order.
    pub fn present_colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|&c| self.get(c) > 0)
    }
}

impl fmt::Display for ColorCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.red, self.blue, self.green, self.colorless
        )
    }
}

/// Pity escalation of the five-star rate.
///
/// Every `interval` consecutive pulls without a five-star add `step` to the
/// rate. Reaching `hard_pity` dry pulls forces a five-star. A valid ramp
/// guarantees a five-star within [`MAX_GUARANTEED_PITY`] pulls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PityRamp {
    pub step: f64,
    pub interval: u32,
    #[serde(default)]
    pub hard_pity: Option<u32>,
}

impl Default for PityRamp {
    fn default() -> Self {
        Self::standard()
    }
}

impl PityRamp {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            step: DEFAULT_PITY_STEP,
            interval: DEFAULT_PITY_INTERVAL,
            hard_pity: Some(DEFAULT_HARD_PITY),
        }
    }

    /// No gradual ramp; the rate stays flat until the hard pity pull.
    #[must_use]
    pub const fn flat(hard_pity: u32) -> Self {
        Self {
            step: 0.0,
            interval: 1,
            hard_pity: Some(hard_pity),
        }
    }

    /// First pity count at which the five-star rate is 1.0, if any.
    #[must_use]
    pub fn guaranteed_at(&self, base: f64) -> Option<u32> {
        if base >= 1.0 {
            return Some(0);
        }
        let ramp = if self.step > 0.0 && self.interval > 0 {
            ceil_f64_to_u32((1.0 - base) / self.step).checked_mul(self.interval)
        } else {
            None
        };
        match (ramp, self.hard_pity) {
            (Some(ramp), Some(hard)) => Some(ramp.min(hard)),
            (ramp, hard) => ramp.or(hard),
        }
    }

    /// Five-star rate after `pulls_since_fivestar` dry pulls.
    #[must_use]
    pub fn rate_at(&self, base: f64, pulls_since_fivestar: u32) -> f64 {
        if self
            .guaranteed_at(base)
            .is_some_and(|limit| pulls_since_fivestar >= limit)
        {
            return 1.0;
        }
        let steps = pulls_since_fivestar / self.interval.max(1);
        (base + f64::from(steps) * self.step).min(1.0)
    }

    fn validate(&self, base: f64) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::ZeroPityInterval);
        }
        if !self.step.is_finite() || !(0.0..=1.0).contains(&self.step) {
            return Err(ConfigError::PityStepOutOfRange(self.step));
        }
        match self.guaranteed_at(base) {
            None => Err(ConfigError::UnboundedPity { base }),
            Some(pulls) if pulls > MAX_GUARANTEED_PITY => Err(ConfigError::PityTooLong {
                pulls,
                max: MAX_GUARANTEED_PITY,
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Draw-rate description of one banner.
///
/// `base_fivestar_rate` is the chance that a pull at zero pity is a five-star;
/// `base_focus_rate` is the chance that a five-star is one of the focus units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BannerConfig {
    pub focus_counts: ColorCounts,
    pub base_focus_rate: f64,
    pub base_fivestar_rate: f64,
    #[serde(default)]
    pub pity: PityRamp,
    #[serde(default = "BannerConfig::default_generic_pool")]
    pub generic_pool: Option<ColorCounts>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        let (focus, offbanner) = DEFAULT_STARTING_PERCENTS;
        let total = (focus + offbanner) / 100.0;
        Self {
            focus_counts: ColorCounts::from_array(DEFAULT_FOCUS_COUNTS),
            base_focus_rate: focus / (focus + offbanner),
            base_fivestar_rate: total,
            pity: PityRamp::standard(),
            generic_pool: Self::default_generic_pool(),
        }
    }
}

impl BannerConfig {
    #[allow(clippy::unnecessary_wraps)]
    const fn default_generic_pool() -> Option<ColorCounts> {
        Some(ColorCounts::from_array(GENERIC_FIVESTAR_POOL))
    }

    /// Build a banner with the standard pity ramp and generic pool.
    ///
    /// # Errors
    ///
    /// Returns an error if either rate is not a probability or the focus
    /// rate is positive while the banner has no focus units.
    pub fn new(
        focus_counts: ColorCounts,
        base_focus_rate: f64,
        base_fivestar_rate: f64,
    ) -> Result<Self, ConfigError> {
        let banner = Self {
            focus_counts,
            base_focus_rate,
            base_fivestar_rate,
            pity: PityRamp::standard(),
            generic_pool: Self::default_generic_pool(),
        };
        banner.validate()?;
        Ok(banner)
    }

    /// Build a banner from the focus and off-banner starting percentages
    /// quoted on summoning screens, e.g. `(3, 3)` for a regular banner.
    ///
    /// # Errors
    ///
    /// Returns an error if a percentage is outside `[0, 100]`, their sum
    /// exceeds 100, or the resulting banner fails validation.
    pub fn from_starting_percents(
        focus_counts: ColorCounts,
        focus_percent: f64,
        offbanner_percent: f64,
    ) -> Result<Self, ConfigError> {
        check_probability("focus_percent", focus_percent / 100.0)?;
        check_probability("offbanner_percent", offbanner_percent / 100.0)?;
        let combined = focus_percent + offbanner_percent;
        let share = if combined > 0.0 {
            focus_percent / combined
        } else {
            0.0
        };
        Self::new(focus_counts, share, combined / 100.0)
    }

    /// Replace the pity ramp, revalidating the banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the ramp never guarantees a five-star, or only
    /// after more than [`MAX_GUARANTEED_PITY`] dry pulls.
    pub fn with_pity(self, pity: PityRamp) -> Result<Self, ConfigError> {
        let banner = Self { pity, ..self };
        banner.validate()?;
        Ok(banner)
    }

    /// Replace the generic five-star color pool, revalidating the banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is empty while generic five-stars can occur.
    pub fn with_generic_pool(self, generic_pool: Option<ColorCounts>) -> Result<Self, ConfigError> {
        let banner = Self {
            generic_pool,
            ..self
        };
        banner.validate()?;
        Ok(banner)
    }

    /// Focus and off-banner starting rates in percent.
    #[must_use]
    pub fn starting_percents(&self) -> (f64, f64) {
        let total = self.base_fivestar_rate * 100.0;
        (
            total * self.base_focus_rate,
            total * (1.0 - self.base_focus_rate),
        )
    }

    /// Chance that a five-star is a focus unit of `color`.
    #[must_use]
    pub fn focus_share(&self, color: Color) -> f64 {
        let total = self.focus_counts.total();
        if total == 0 {
            return 0.0;
        }
        self.base_focus_rate * f64::from(self.focus_counts.get(color))
            / crate::numbers::u64_to_f64(total)
    }

    /// Check every rate invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("base_focus_rate", self.base_focus_rate)?;
        check_probability("base_fivestar_rate", self.base_fivestar_rate)?;
        self.pity.validate(self.base_fivestar_rate)?;
        if self.base_focus_rate > 0.0 && self.focus_counts.total() == 0 {
            return Err(ConfigError::FocusWithoutUnits {
                rate: self.base_focus_rate,
            });
        }
        if self.base_focus_rate < 1.0 && self.generic_pool.is_some_and(|pool| pool.total() == 0) {
            return Err(ConfigError::EmptyGenericPool);
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for BannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (focus, offbanner) = self.starting_percents();
        write!(
            f,
            "{} ({}, {})",
            self.focus_counts,
            format_percent(focus),
            format_percent(offbanner)
        )
    }
}

fn banner_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^\s*(\d+)\s*/\s*(\d+)\s*/\s*(\d+)\s*/\s*(\d+)\s*\(\s*(\d+(?:\.\d+)?)\s*,\s*(\d+(?:\.\d+)?)\s*\)\s*$",
            )
            .ok()
        })
        .as_ref()
}

impl FromStr for BannerConfig {
    type Err = ConfigError;

    /// Parse `r/b/g/c (focus%, offbanner%)`, e.g. `1/1/1/1 (5, 3)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || ConfigError::UnparseableBanner(s.to_string());
        let caps = banner_pattern()
            .and_then(|re| re.captures(s))
            .ok_or_else(unparseable)?;
        let mut counts = [0u32; 4];
        for (slot, count) in counts.iter_mut().enumerate() {
            *count = caps[slot + 1].parse().map_err(|_| unparseable())?;
        }
        let focus: f64 = caps[5].parse().map_err(|_| unparseable())?;
        let offbanner: f64 = caps[6].parse().map_err(|_| unparseable())?;
        Self::from_starting_percents(ColorCounts::from_array(counts), focus, offbanner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_banner_matches_regular_rates() {
        let banner = BannerConfig::default();
        assert!((banner.base_fivestar_rate - 0.06).abs() < 1e-12);
        assert!((banner.base_focus_rate - 0.5).abs() < 1e-12);
        assert_eq!(banner.to_string(), "1/1/1/1 (3, 3)");
        assert!(banner.validate().is_ok());
    }

    #[test]
    fn standard_ramp_steps_every_five_pulls() {
        let ramp = PityRamp::standard();
        assert!((ramp.rate_at(0.06, 0) - 0.06).abs() < 1e-12);
        assert!((ramp.rate_at(0.06, 4) - 0.06).abs() < 1e-12);
        assert!((ramp.rate_at(0.06, 5) - 0.065).abs() < 1e-12);
        assert!((ramp.rate_at(0.06, 119) - (0.06 + 23.0 * 0.005)).abs() < 1e-12);
        assert!((ramp.rate_at(0.06, 120) - 1.0).abs() < f64::EPSILON);
        assert_eq!(ramp.guaranteed_at(0.06), Some(120));
    }

    #[test]
    fn ramp_is_monotonic_and_capped() {
        let ramp = PityRamp {
            step: 0.25,
            interval: 2,
            hard_pity: None,
        };
        let mut previous = 0.0;
        for pity in 0..20 {
            let rate = ramp.rate_at(0.1, pity);
            assert!(rate >= previous);
            assert!(rate <= 1.0);
            previous = rate;
        }
        assert_eq!(ramp.guaranteed_at(0.1), Some(8));
        assert!((ramp.rate_at(0.1, 8) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_ramp_holds_rate_until_hard_pity() {
        let ramp = PityRamp::flat(40);
        assert!((ramp.rate_at(0.08, 39) - 0.08).abs() < 1e-12);
        assert!((ramp.rate_at(0.08, 40) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_ramp_without_guarantee() {
        let banner = BannerConfig::default().with_pity(PityRamp {
            step: 0.0,
            interval: 5,
            hard_pity: None,
        });
        assert_eq!(banner, Err(ConfigError::UnboundedPity { base: 0.06 }));
        let zero_interval = BannerConfig::default().with_pity(PityRamp {
            step: 0.1,
            interval: 0,
            hard_pity: None,
        });
        assert_eq!(zero_interval, Err(ConfigError::ZeroPityInterval));
    }

    #[test]
    fn rejects_guarantee_beyond_pity_limit() {
        let too_long = BannerConfig::new(ColorCounts::new(1, 1, 1, 1), 0.5, 0.0)
            .and_then(|banner| banner.with_pity(PityRamp::flat(u32::MAX)));
        assert_eq!(
            too_long,
            Err(ConfigError::PityTooLong {
                pulls: u32::MAX,
                max: MAX_GUARANTEED_PITY,
            })
        );
        let slow_ramp = BannerConfig::default().with_pity(PityRamp {
            step: 1e-9,
            interval: 1,
            hard_pity: None,
        });
        assert!(matches!(slow_ramp, Err(ConfigError::PityTooLong { .. })));
        let at_limit = BannerConfig::new(ColorCounts::new(1, 1, 1, 1), 0.5, 0.0)
            .and_then(|banner| banner.with_pity(PityRamp::flat(MAX_GUARANTEED_PITY)));
        assert!(at_limit.is_ok());
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        let counts = ColorCounts::new(1, 1, 1, 1);
        assert!(matches!(
            BannerConfig::new(counts, 1.5, 0.03),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "base_focus_rate",
                ..
            })
        ));
        assert!(matches!(
            BannerConfig::new(counts, 0.5, -0.01),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "base_fivestar_rate",
                ..
            })
        ));
        assert!(BannerConfig::new(counts, f64::NAN, 0.03).is_err());
    }

    #[test]
    fn focus_rate_needs_focus_units() {
        let empty = ColorCounts::default();
        assert_eq!(
            BannerConfig::new(empty, 0.5, 0.03),
            Err(ConfigError::FocusWithoutUnits { rate: 0.5 })
        );
        assert!(BannerConfig::new(empty, 0.0, 0.03).is_ok());
    }

    #[test]
    fn empty_generic_pool_only_matters_with_generic_pulls() {
        let counts = ColorCounts::new(1, 0, 0, 0);
        let generic = BannerConfig::new(counts, 0.5, 0.03)
            .unwrap()
            .with_generic_pool(Some(ColorCounts::default()));
        assert_eq!(generic, Err(ConfigError::EmptyGenericPool));
        let all_focus = BannerConfig::new(counts, 1.0, 0.08)
            .unwrap()
            .with_generic_pool(Some(ColorCounts::default()));
        assert!(all_focus.is_ok());
    }

    #[test]
    fn parses_and_displays_text_form() {
        let banner: BannerConfig = "3/3/3/3 (8, 0)".parse().unwrap();
        assert_eq!(banner.focus_counts, ColorCounts::new(3, 3, 3, 3));
        assert!((banner.base_fivestar_rate - 0.08).abs() < 1e-12);
        assert!((banner.base_focus_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(banner.to_string(), "3/3/3/3 (8, 0)");

        let spaced: BannerConfig = " 2 / 0 / 1 / 0 ( 5 , 3 ) ".parse().unwrap();
        assert_eq!(spaced.to_string(), "2/0/1/0 (5, 3)");

        let fractional: BannerConfig = "1/1/1/1 (1.5, 3)".parse().unwrap();
        assert_eq!(fractional.to_string(), "1/1/1/1 (1.5, 3)");
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "1/1/1 (3, 3)", "1/1/1/1 3, 3", "a/b/c/d (3, 3)", "1/1/1/1 (60, 50)"] {
            assert!(text.parse::<BannerConfig>().is_err(), "{text} parsed");
        }
    }

    #[test]
    fn focus_share_weights_by_color_count() {
        let banner = BannerConfig::new(ColorCounts::new(3, 1, 0, 0), 0.5, 0.03).unwrap();
        assert!((banner.focus_share(Color::Red) - 0.375).abs() < 1e-12);
        assert!((banner.focus_share(Color::Blue) - 0.125).abs() < 1e-12);
        assert!(banner.focus_share(Color::Green).abs() < f64::EPSILON);
    }

    #[test]
    fn colors_parse_from_names_and_initials() {
        assert_eq!("Red".parse::<Color>(), Ok(Color::Red));
        assert_eq!("c".parse::<Color>(), Ok(Color::Colorless));
        assert!("purple".parse::<Color>().is_err());
        assert_eq!(Color::from_index(2), Some(Color::Green));
        assert_eq!(Color::from_index(4), None);
    }
}
