//! Single-player session: pull until the goal is met.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rates::DrawOutcome;
use crate::scenario::Scenario;

/// Pity counter owned by one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PityState {
    pulls_since_fivestar: u32,
}

impl PityState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pulls_since_fivestar: 0,
        }
    }

    #[must_use]
    pub const fn pulls_since_fivestar(&self) -> u32 {
        self.pulls_since_fivestar
    }

    /// Fold one pull into the counter: any five-star resets it.
    pub const fn advance(&mut self, outcome: DrawOutcome) {
        if outcome.is_fivestar() {
            self.pulls_since_fivestar = 0;
        } else {
            self.pulls_since_fivestar = self.pulls_since_fivestar.saturating_add(1);
        }
    }
}

/// What one completed session consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Total pulls until the goal was met.
    pub pulls: u64,
    pub fivestars: u64,
    pub matches: u32,
    /// Longest run of pulls without a five-star.
    pub longest_drought: u32,
}

/// Simulate one session from zero pity until `scenario`'s goal is satisfied.
///
/// Termination follows from scenario validation: the ramp reaches 1.0 and
/// every five-star has a positive chance of matching the goal.
pub fn simulate_session<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> SessionOutcome {
    let rates = scenario.rates();
    let goal = scenario.goal();
    let target = goal.count();
    let mut pity = PityState::new();
    let mut outcome = SessionOutcome::default();

    while outcome.matches < target {
        let draw = rates.draw(pity.pulls_since_fivestar(), rng);
        outcome.pulls += 1;
        pity.advance(draw);
        outcome.longest_drought = outcome.longest_drought.max(pity.pulls_since_fivestar());
        if draw.is_fivestar() {
            outcome.fivestars += 1;
        }
        if goal.kind.matches(draw) {
            outcome.matches += 1;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{BannerConfig, Color, ColorCounts, PityRamp};
    use crate::goal::{Goal, GoalKind};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn scenario(banner: BannerConfig, kind: GoalKind, count: i64) -> Scenario {
        Scenario::new(banner, Goal::new(kind, count).unwrap()).unwrap()
    }

    #[test]
    fn pity_resets_on_fivestar_only() {
        let mut pity = PityState::new();
        pity.advance(DrawOutcome::NonFivestar);
        pity.advance(DrawOutcome::NonFivestar);
        assert_eq!(pity.pulls_since_fivestar(), 2);
        pity.advance(DrawOutcome::Fivestar {
            is_focus: false,
            color: Some(Color::Green),
        });
        assert_eq!(pity.pulls_since_fivestar(), 0);
    }

    #[test]
    fn certain_fivestars_take_exactly_count_pulls() {
        let banner = BannerConfig::new(ColorCounts::new(1, 1, 1, 1), 0.5, 1.0).unwrap();
        let scenario = scenario(banner, GoalKind::AnyFivestar, 7);
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = simulate_session(&scenario, &mut rng);
        assert_eq!(outcome.pulls, 7);
        assert_eq!(outcome.fivestars, 7);
        assert_eq!(outcome.longest_drought, 0);
    }

    #[test]
    fn any_fivestar_never_exceeds_guarantee_per_match() {
        let scenario = scenario(BannerConfig::default(), GoalKind::AnyFivestar, 3);
        let bound = 3 * u64::from(scenario.rates().guaranteed_by() + 1);
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..2_000 {
            let outcome = simulate_session(&scenario, &mut rng);
            assert!(outcome.pulls >= 3);
            assert!(outcome.pulls <= bound, "{} pulls", outcome.pulls);
            assert!(outcome.longest_drought <= scenario.rates().guaranteed_by());
        }
    }

    #[test]
    fn color_goal_counts_only_that_color() {
        let banner = BannerConfig::new(ColorCounts::new(1, 1, 0, 0), 1.0, 1.0).unwrap();
        let scenario = scenario(banner, GoalKind::ColorFocus(Color::Red), 4);
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = simulate_session(&scenario, &mut rng);
        assert_eq!(outcome.matches, 4);
        assert!(outcome.pulls >= 4);
        assert_eq!(outcome.fivestars, outcome.pulls);
    }

    #[test]
    fn flat_rate_sessions_finish_at_hard_pity() {
        let banner = BannerConfig::new(ColorCounts::new(1, 0, 0, 0), 0.0, 0.0)
            .unwrap()
            .with_pity(PityRamp::flat(25))
            .unwrap();
        let scenario = scenario(banner, GoalKind::AnyFivestar, 2);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = simulate_session(&scenario, &mut rng);
        assert_eq!(outcome.pulls, 52);
        assert_eq!(outcome.longest_drought, 25);
    }
}
