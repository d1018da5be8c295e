//! Validated banner + goal pair used by every simulation.
use crate::banner::BannerConfig;
use crate::error::ConfigError;
use crate::goal::Goal;
use crate::rates::RateModel;

/// Frozen simulation input. Replace it wholesale to change anything.
#[derive(Debug, Clone)]
pub struct Scenario {
    banner: BannerConfig,
    goal: Goal,
    rates: RateModel,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            banner: BannerConfig::default(),
            goal: Goal::default(),
            rates: RateModel::default(),
        }
    }
}

impl Scenario {
    /// # Errors
    ///
    /// Returns an error if the banner is invalid or the goal cannot be
    /// completed on it.
    pub fn new(banner: BannerConfig, goal: Goal) -> Result<Self, ConfigError> {
        let rates = RateModel::new(&banner)?;
        goal.kind.check_reachable(&banner)?;
        Ok(Self {
            banner,
            goal,
            rates,
        })
    }

    /// Same banner, different goal.
    ///
    /// # Errors
    ///
    /// Returns an error if the goal cannot be completed on this banner.
    pub fn with_goal(&self, goal: Goal) -> Result<Self, ConfigError> {
        goal.kind.check_reachable(&self.banner)?;
        Ok(Self {
            banner: self.banner,
            goal,
            rates: self.rates.clone(),
        })
    }

    /// Same goal, different banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the banner is invalid or no longer supports the goal.
    pub fn with_banner(&self, banner: BannerConfig) -> Result<Self, ConfigError> {
        Self::new(banner, self.goal)
    }

    #[must_use]
    pub const fn banner(&self) -> &BannerConfig {
        &self.banner
    }

    #[must_use]
    pub const fn goal(&self) -> &Goal {
        &self.goal
    }

    #[must_use]
    pub const fn rates(&self) -> &RateModel {
        &self.rates
    }
}
