//! Player goals: what a session keeps pulling for.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::banner::{BannerConfig, Color};
use crate::error::ConfigError;
use crate::rates::DrawOutcome;

/// Which pulls count toward a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    AnyFivestar,
    AnyFocus,
    ColorFocus(Color),
}

impl GoalKind {
    pub const ALL: [Self; 6] = [
        Self::AnyFivestar,
        Self::AnyFocus,
        Self::ColorFocus(Color::Red),
        Self::ColorFocus(Color::Blue),
        Self::ColorFocus(Color::Green),
        Self::ColorFocus(Color::Colorless),
    ];

    /// Whether a single pull counts toward this goal.
    #[must_use]
    pub fn matches(self, outcome: DrawOutcome) -> bool {
        match (self, outcome) {
            (_, DrawOutcome::NonFivestar) => false,
            (Self::AnyFivestar, DrawOutcome::Fivestar { .. }) => true,
            (Self::AnyFocus, DrawOutcome::Fivestar { is_focus, .. }) => is_focus,
            (
                Self::ColorFocus(target),
                DrawOutcome::Fivestar {
                    is_focus,
                    color: Some(color),
                },
            ) => is_focus && target == color,
            (Self::ColorFocus(_), DrawOutcome::Fivestar { color: None, .. }) => false,
        }
    }

    #[must_use]
    pub const fn color(self) -> Option<Color> {
        match self {
            Self::ColorFocus(color) => Some(color),
            Self::AnyFivestar | Self::AnyFocus => None,
        }
    }

    #[must_use]
    pub const fn requires_focus(self) -> bool {
        !matches!(self, Self::AnyFivestar)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AnyFivestar => "Any 5*",
            Self::AnyFocus => "Any Focus",
            Self::ColorFocus(Color::Red) => "Red Focus",
            Self::ColorFocus(Color::Blue) => "Blue Focus",
            Self::ColorFocus(Color::Green) => "Green Focus",
            Self::ColorFocus(Color::Colorless) => "Colorless Focus",
        }
    }

    /// Check that a session chasing this goal on `banner` can finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the goal needs focus pulls the banner cannot give.
    pub fn check_reachable(self, banner: &BannerConfig) -> Result<(), ConfigError> {
        if let Some(color) = self.color()
            && banner.focus_counts.get(color) == 0
        {
            return Err(ConfigError::MissingFocusColor { color });
        }
        if self.requires_focus() && banner.base_focus_rate <= 0.0 {
            return Err(ConfigError::UnreachableFocusGoal);
        }
        Ok(())
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GoalKind {
    type Err = ConfigError;

    /// Accepts display labels (`Red Focus`) as well as short keys
    /// (`any-fivestar`, `anyfocus`, `red`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        let kind = match key.as_str() {
            "any5*" | "anyfivestar" | "fivestar" => Self::AnyFivestar,
            "anyfocus" | "focus" => Self::AnyFocus,
            other => {
                let color = other.strip_suffix("focus").unwrap_or(other);
                let color = color
                    .parse::<Color>()
                    .map_err(|_| ConfigError::UnknownGoal(s.to_string()))?;
                Self::ColorFocus(color)
            }
        };
        Ok(kind)
    }
}

/// A goal kind plus the number of matching pulls required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Goal {
    pub kind: GoalKind,
    count: NonZeroU32,
}

impl Default for Goal {
    fn default() -> Self {
        Self {
            kind: GoalKind::AnyFivestar,
            count: NonZeroU32::MIN,
        }
    }
}

impl Goal {
    /// # Errors
    ///
    /// Returns an error if `count` is not in `1..=u32::MAX`.
    pub fn new(kind: GoalKind, count: i64) -> Result<Self, ConfigError> {
        let count = u32::try_from(count)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ConfigError::GoalCountOutOfRange {
                value: count,
                max: u32::MAX,
            })?;
        Ok(Self { kind, count })
    }

    #[must_use]
    pub const fn single(kind: GoalKind) -> Self {
        Self {
            kind,
            count: NonZeroU32::MIN,
        }
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count.get()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.kind, self.count)
    }
}

/// Goal kinds a session on `banner` can complete, in menu order.
#[must_use]
pub fn available_goal_kinds(banner: &BannerConfig) -> Vec<GoalKind> {
    GoalKind::ALL
        .into_iter()
        .filter(|kind| kind.check_reachable(banner).is_ok())
        .collect()
}
