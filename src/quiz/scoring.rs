use serde::{Deserialize, Serialize};

use super::ruleset::QuizRules;

/// Experience needed to hold each level; index 0 is level 1. Thresholds are
/// inclusive: sitting exactly on a threshold grants that level.
pub const LEVEL_THRESHOLDS: [i64; 15] = [
    0, 200, 450, 800, 1250, 1800, 2450, 3200, 4050, 5000, 6200, 7500, 8900, 10400, 12000,
];

/// Level is a pure function of cumulative experience.
pub fn level_for_exp(exp: i64) -> i32 {
    let mut level = 1;
    for (idx, threshold) in LEVEL_THRESHOLDS.iter().enumerate() {
        if exp >= *threshold {
            level = idx as i32 + 1;
        }
    }
    level
}

/// Session-local tallies. Accumulated per submission, applied to the user
/// record only when the session finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub quiz_points: i32,
}

impl SessionTotals {
    pub fn record(&mut self, is_correct: bool, points: i32) {
        if is_correct {
            self.correct_count += 1;
        } else {
            self.incorrect_count += 1;
        }
        self.quiz_points += points;
    }
}

/// Increments applied to the user aggregate at session finish. All fields are
/// non-negative, so the aggregate only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionDelta {
    pub points: i64,
    pub experience: i64,
    pub correct_answers: i32,
}

impl ProgressionDelta {
    /// `None` for rulesets that do not feed the progression economy.
    ///
    /// Experience counts every in-session correct answer, including repeats
    /// of previously answered questions; only per-question points carry the
    /// duplicate guard. The original scored it this way and the asymmetry is
    /// kept rather than corrected.
    pub fn from_session(rules: &QuizRules, totals: &SessionTotals) -> Option<Self> {
        if !rules.awards_progression() {
            return None;
        }
        Some(Self {
            points: totals.quiz_points as i64,
            experience: totals.correct_count as i64 * rules.exp_per_correct(),
            correct_answers: totals.correct_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds_are_strictly_increasing() {
        for pair in LEVEL_THRESHOLDS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_exp(0), 1);
        assert_eq!(level_for_exp(150), 1);
        assert_eq!(level_for_exp(199), 1);
        assert_eq!(level_for_exp(200), 2);
        assert_eq!(level_for_exp(5000), 10);
        assert_eq!(level_for_exp(5999), 10);
        assert_eq!(level_for_exp(6200), 11);
        assert_eq!(level_for_exp(12000), 15);
        assert_eq!(level_for_exp(1_000_000), 15);
    }

    #[test]
    fn totals_accumulate() {
        let mut totals = SessionTotals::default();
        totals.record(true, 10);
        totals.record(false, 0);
        totals.record(true, 5);
        assert_eq!(totals.correct_count, 2);
        assert_eq!(totals.incorrect_count, 1);
        assert_eq!(totals.quiz_points, 15);
    }

    #[test]
    fn delta_only_for_progression_rulesets() {
        let totals = SessionTotals {
            correct_count: 3,
            incorrect_count: 1,
            quiz_points: 30,
        };
        let delta = ProgressionDelta::from_session(&QuizRules::timed(), &totals).unwrap();
        assert_eq!(delta.points, 30);
        assert_eq!(delta.experience, 150);
        assert_eq!(delta.correct_answers, 3);

        assert!(ProgressionDelta::from_session(&QuizRules::Untimed, &totals).is_none());
    }

    #[test]
    fn empty_session_delta_is_zero() {
        let delta =
            ProgressionDelta::from_session(&QuizRules::timed(), &SessionTotals::default()).unwrap();
        assert_eq!(delta.points, 0);
        assert_eq!(delta.experience, 0);
        assert_eq!(delta.correct_answers, 0);
    }
}
