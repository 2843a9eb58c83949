use analytics::stats::{is_constant, mean, std_dev};
use core_types::{Direction, SignalKind};
use serde::Serialize;

/// Mean and sample standard deviation of one lookback window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std: f64,
}

impl WindowStats {
    /// `None` when the window is too short or has no variance.
    pub fn from_window(window: &[f64]) -> Option<Self> {
        if window.len() < 2 || is_constant(window) {
            return None;
        }
        let std = std_dev(window);
        if std == 0.0 || !std.is_finite() {
            return None;
        }
        Some(Self {
            mean: mean(window),
            std,
        })
    }

    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Position held by the z-score strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SignalState {
    Flat,
    /// Holding since a signal whose z-score is recorded here.
    Holding(f64),
}

/// The two-state entry/exit machine of the spread strategy.
///
/// A position opens when `|z| >= threshold` and closes the first time the
/// z-score has the opposite sign to the one recorded at entry. Exiting and
/// entering never happen on the same observation.
#[derive(Debug, Clone)]
pub struct ZScoreReversion {
    threshold: f64,
    state: SignalState,
}

impl ZScoreReversion {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: SignalState::Flat,
        }
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn evaluate(&mut self, z_score: f64) -> Option<SignalKind> {
        match self.state {
            SignalState::Holding(entry) if entry * z_score < 0.0 => {
                self.state = SignalState::Flat;
                Some(SignalKind::Exit)
            }
            SignalState::Flat if z_score.abs() >= self.threshold => {
                let direction = if z_score <= -self.threshold {
                    Direction::LongAShortB
                } else {
                    Direction::LongBShortA
                };
                self.state = SignalState::Holding(z_score);
                Some(SignalKind::Enter(direction))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_standard_deviations_above_enters_long_b() {
        let stats = WindowStats {
            mean: 10.0,
            std: 2.0,
        };
        let z = stats.z_score(14.0);
        assert_eq!(z, 2.0);

        let mut machine = ZScoreReversion::new(2.0);
        assert_eq!(
            machine.evaluate(z),
            Some(SignalKind::Enter(Direction::LongBShortA))
        );
        assert_eq!(machine.state(), SignalState::Holding(2.0));
    }

    #[test]
    fn low_spread_goes_long_a() {
        let mut machine = ZScoreReversion::new(2.0);
        assert_eq!(machine.evaluate(-1.99), None);
        assert_eq!(
            machine.evaluate(-2.0),
            Some(SignalKind::Enter(Direction::LongAShortB))
        );
    }

    #[test]
    fn exits_on_first_sign_flip() {
        let mut machine = ZScoreReversion::new(2.0);
        assert!(machine.evaluate(2.3).is_some());
        assert_eq!(machine.evaluate(1.0), None);
        assert_eq!(machine.evaluate(3.5), None);
        assert_eq!(machine.evaluate(0.0), None);
        assert_eq!(machine.evaluate(-0.1), Some(SignalKind::Exit));
        assert_eq!(machine.state(), SignalState::Flat);
    }

    #[test]
    fn exit_and_entry_are_separate_steps() {
        let mut machine = ZScoreReversion::new(2.0);
        machine.evaluate(2.3);
        assert_eq!(machine.evaluate(-3.0), Some(SignalKind::Exit));
        assert_eq!(
            machine.evaluate(-3.0),
            Some(SignalKind::Enter(Direction::LongAShortB))
        );
    }

    #[test]
    fn constant_window_has_no_stats() {
        assert_eq!(WindowStats::from_window(&[4.0; 10]), None);
        assert_eq!(WindowStats::from_window(&[4.0]), None);
    }

    #[test]
    fn window_stats_use_sample_deviation() {
        let stats = WindowStats::from_window(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std, 1.0);
    }

    proptest! {
        #[test]
        fn z_score_at_window_mean_is_zero(
            window in prop::collection::vec(-1_000.0f64..1_000.0, 2..200)
        ) {
            if let Some(stats) = WindowStats::from_window(&window) {
                prop_assert_eq!(stats.z_score(stats.mean), 0.0);
            }
        }

        #[test]
        fn never_enters_twice(
            z_scores in prop::collection::vec(-5.0f64..5.0, 0..300),
            threshold in 0.5f64..3.0,
        ) {
            let mut machine = ZScoreReversion::new(threshold);
            let mut holding = false;
            for z in z_scores {
                match machine.evaluate(z) {
                    Some(SignalKind::Enter(_)) => {
                        prop_assert!(!holding);
                        holding = true;
                    }
                    Some(SignalKind::Exit) => {
                        prop_assert!(holding);
                        holding = false;
                    }
                    None => {}
                }
                prop_assert_eq!(holding, matches!(machine.state(), SignalState::Holding(_)));
            }
        }
    }
}
